//! # Business Repository
//!
//! Business (tenant) creation and lookup.
//!
//! ## Onboarding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              create_with_owner (one transaction)                    │
//! │                                                                     │
//! │  Sign-up from the identity provider                                 │
//! │       │                                                             │
//! │  BEGIN                                                              │
//! │    ├── INSERT user   (role = admin, business_id = NULL)             │
//! │    ├── INSERT business (owner_id = user)                            │
//! │    └── UPDATE user SET business_id = business                       │
//! │  COMMIT                                                             │
//! │                                                                     │
//! │  Any failure rolls all three back: no half-onboarded tenants.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use dukaan_core::validation::validate_name;
use dukaan_core::{Business, CoreError, User, UserRole};

/// Repository for business database operations.
#[derive(Debug, Clone)]
pub struct BusinessRepository {
    pool: SqlitePool,
}

impl BusinessRepository {
    /// Creates a new BusinessRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BusinessRepository { pool }
    }

    /// Creates a business with its admin owner, atomically.
    ///
    /// The user row, the business row and the user's back-reference are one
    /// unit: either the tenant exists fully or not at all.
    ///
    /// ## Arguments
    /// * `name` - Business display name
    /// * `auth_id` - The owner's subject id from the identity provider
    /// * `email` - The owner's email
    pub async fn create_with_owner(
        &self,
        name: &str,
        auth_id: &str,
        email: &str,
    ) -> DbResult<(User, Business)> {
        validate_name(name).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            auth_id: auth_id.to_string(),
            email: email.to_string(),
            role: UserRole::Admin,
            business_id: None,
        };

        debug!(user_id = %user.id, "Creating owner user");

        sqlx::query(
            "INSERT INTO users (id, auth_id, email, role, business_id)
             VALUES (?1, ?2, ?3, ?4, NULL)",
        )
        .bind(&user.id)
        .bind(&user.auth_id)
        .bind(&user.email)
        .bind(user.role)
        .execute(&mut *tx)
        .await?;

        let business = Business {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            owner_id: user.id.clone(),
            created_at: Utc::now(),
        };

        debug!(business_id = %business.id, "Creating business");

        sqlx::query(
            "INSERT INTO businesses (id, name, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&business.id)
        .bind(&business.name)
        .bind(&business.owner_id)
        .bind(business.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET business_id = ?2 WHERE id = ?1")
            .bind(&user.id)
            .bind(&business.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            business_id = %business.id,
            name = %business.name,
            "Business onboarded"
        );

        Ok((
            User {
                business_id: Some(business.id.clone()),
                ..user
            },
            business,
        ))
    }

    /// Creates a business for an existing user.
    ///
    /// Used when the owner account already exists (e.g. resuming an
    /// interrupted onboarding). The caller is responsible for attaching the
    /// user via [`UserRepository::assign_business`](crate::UserRepository::assign_business).
    pub async fn create(&self, name: &str, owner_id: &str) -> DbResult<Business> {
        validate_name(name).map_err(CoreError::from)?;

        let business = Business {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        };

        debug!(business_id = %business.id, "Creating business");

        sqlx::query(
            "INSERT INTO businesses (id, name, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&business.id)
        .bind(&business.name)
        .bind(&business.owner_id)
        .bind(business.created_at)
        .execute(&self.pool)
        .await?;

        Ok(business)
    }

    /// Gets a business by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Business>> {
        let business = sqlx::query_as::<_, Business>(
            "SELECT id, name, owner_id, created_at FROM businesses WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    /// Gets the business owned by a given user, if any.
    pub async fn get_by_owner(&self, owner_id: &str) -> DbResult<Option<Business>> {
        let business = sqlx::query_as::<_, Business>(
            "SELECT id, name, owner_id, created_at FROM businesses WHERE owner_id = ?1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::testutil::test_db;
    use crate::DbError;
    use dukaan_core::UserRole;

    #[tokio::test]
    async fn test_create_with_owner_links_both_ways() {
        let db = test_db().await;
        let (owner, business) = db
            .businesses()
            .create_with_owner("Sharma General Store", "auth|sharma", "sharma@example.in")
            .await
            .unwrap();

        assert_eq!(owner.role, UserRole::Admin);
        assert_eq!(owner.business_id.as_deref(), Some(business.id.as_str()));
        assert_eq!(business.owner_id, owner.id);

        let fetched = db.businesses().get_by_id(&business.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Sharma General Store");

        let stored_owner = db.users().get_by_auth_id("auth|sharma").await.unwrap().unwrap();
        assert_eq!(stored_owner.business_id.as_deref(), Some(business.id.as_str()));
    }

    #[tokio::test]
    async fn test_duplicate_auth_id_rejected() {
        let db = test_db().await;
        db.businesses()
            .create_with_owner("First", "auth|dup", "a@example.in")
            .await
            .unwrap();

        let err = db
            .businesses()
            .create_with_owner("Second", "auth|dup", "b@example.in")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // Rollback left no orphan business behind.
        let owner = db.users().get_by_auth_id("auth|dup").await.unwrap().unwrap();
        let business = db
            .businesses()
            .get_by_id(owner.business_id.as_deref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(business.name, "First");
    }

    #[tokio::test]
    async fn test_get_by_owner() {
        let db = test_db().await;
        let (owner, business) = db
            .businesses()
            .create_with_owner("Kirana", "auth|k", "k@example.in")
            .await
            .unwrap();

        let found = db.businesses().get_by_owner(&owner.id).await.unwrap().unwrap();
        assert_eq!(found.id, business.id);
        assert!(db.businesses().get_by_owner("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_for_existing_user_and_assign() {
        let db = test_db().await;
        let (owner, _) = db
            .businesses()
            .create_with_owner("Main Branch", "auth|branch", "b@example.in")
            .await
            .unwrap();

        let second = db.businesses().create("Second Branch", &owner.id).await.unwrap();
        db.users().assign_business(&owner.id, &second.id).await.unwrap();

        let user = db.users().get_by_id(&owner.id).await.unwrap().unwrap();
        assert_eq!(user.business_id.as_deref(), Some(second.id.as_str()));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let db = test_db().await;
        let err = db
            .businesses()
            .create_with_owner("   ", "auth|x", "x@example.in")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
    }
}
