//! # User Repository
//!
//! User accounts linked to the external identity provider.
//!
//! Authentication happens outside this system; rows here carry the
//! provider's subject id (`auth_id`) so sessions can be mapped to a user and
//! their business. Admins own their business and cannot be deleted; team
//! members are invited into an existing business and can be removed.

use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use dukaan_core::{CoreError, User, UserRole};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

const USER_COLUMNS: &str = "id, auth_id, email, role, business_id";

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a team member inside an existing business.
    ///
    /// Owners are never created here; they come from
    /// [`BusinessRepository::create_with_owner`](crate::BusinessRepository::create_with_owner).
    pub async fn create_team_member(
        &self,
        auth_id: &str,
        email: &str,
        business_id: &str,
    ) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            auth_id: auth_id.to_string(),
            email: email.to_string(),
            role: UserRole::TeamMember,
            business_id: Some(business_id.to_string()),
        };

        debug!(user_id = %user.id, business_id = %business_id, "Creating team member");

        sqlx::query(
            "INSERT INTO users (id, auth_id, email, role, business_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&user.id)
        .bind(&user.auth_id)
        .bind(&user.email)
        .bind(user.role)
        .bind(&user.business_id)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by their ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by their identity-provider subject id.
    ///
    /// This is the session lookup: every authenticated request resolves its
    /// subject to a row here.
    pub async fn get_by_auth_id(&self, auth_id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE auth_id = ?1"
        ))
        .bind(auth_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists all users of a business.
    pub async fn list_by_business(&self, business_id: &str) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE business_id = ?1"
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Attaches a user to a business.
    pub async fn assign_business(&self, user_id: &str, business_id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET business_id = ?2 WHERE id = ?1")
            .bind(user_id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", user_id));
        }

        Ok(())
    }

    /// Deletes a team member.
    ///
    /// ## Returns
    /// * `Err(Domain(Forbidden))` - The user is an admin; owners cannot be
    ///   removed from their own business
    pub async fn delete(&self, user_id: &str) -> DbResult<()> {
        let user = self
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(user_id.to_string()))?;

        if user.role == UserRole::Admin {
            return Err(CoreError::Forbidden("cannot delete admin users".to_string()).into());
        }

        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!(user_id = %user_id, "Team member deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::testutil::{seed_business, test_db};
    use crate::DbError;
    use dukaan_core::{CoreError, UserRole};

    #[tokio::test]
    async fn test_create_and_lookup_team_member() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;

        let member = db
            .users()
            .create_team_member("auth|staff1", "staff@example.in", &business_id)
            .await
            .unwrap();
        assert_eq!(member.role, UserRole::TeamMember);

        let found = db.users().get_by_auth_id("auth|staff1").await.unwrap().unwrap();
        assert_eq!(found.id, member.id);
        assert_eq!(found.business_id.as_deref(), Some(business_id.as_str()));
    }

    #[tokio::test]
    async fn test_list_by_business_includes_owner_and_members() {
        let db = test_db().await;
        let (business_id, owner_id) = seed_business(&db).await;
        db.users()
            .create_team_member("auth|staff1", "staff@example.in", &business_id)
            .await
            .unwrap();

        let users = db.users().list_by_business(&business_id).await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.id == owner_id));
    }

    #[tokio::test]
    async fn test_delete_admin_is_forbidden() {
        let db = test_db().await;
        let (_, owner_id) = seed_business(&db).await;

        let err = db.users().delete(&owner_id).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden(_))));
        // The owner still exists.
        assert!(db.users().get_by_id(&owner_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_team_member() {
        let db = test_db().await;
        let (business_id, _) = seed_business(&db).await;
        let member = db
            .users()
            .create_team_member("auth|staff1", "staff@example.in", &business_id)
            .await
            .unwrap();

        db.users().delete(&member.id).await.unwrap();
        assert!(db.users().get_by_id(&member.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let db = test_db().await;
        let err = db.users().delete("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::UserNotFound(_))));
    }
}
