//! # Seed Data Generator
//!
//! Populates the database with a demo business for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p dukaan-db --bin seed
//!
//! # Specify database path
//! cargo run -p dukaan-db --bin seed -- --db ./data/dukaan.db
//! ```
//!
//! ## Generated Data
//! - One business ("Sharma General Store") with an admin owner and one
//!   team member
//! - A kirana stock catalog (staples, snacks, household)
//! - A handful of customers, one with special prices
//! - Orders and payments so customer balances are non-trivial

use std::env;

use dukaan_core::pricing::MissingStockPolicy;
use dukaan_core::{NewCustomer, NewOrder, NewPayment, NewStock, OrderLineInput, PaymentMethod};
use dukaan_db::{Database, DbConfig};

/// Catalog of (name, price_paise, quantity) seeded as stock.
const CATALOG: &[(&str, i64, i64)] = &[
    ("Basmati Rice 1kg", 12000, 40),
    ("Basmati Rice 5kg", 55000, 15),
    ("Atta 5kg", 25000, 25),
    ("Toor Dal 1kg", 16000, 30),
    ("Sugar 1kg", 4500, 50),
    ("Chai Patti 250g", 9000, 35),
    ("Mustard Oil 1L", 18000, 20),
    ("Ghee 500ml", 32000, 12),
    ("Salt 1kg", 2500, 60),
    ("Besan 500g", 6000, 28),
    ("Parle-G Biscuits", 1000, 100),
    ("Namkeen Mix 400g", 5500, 45),
    ("Detergent Bar", 3000, 70),
    ("Dishwash Soap", 2000, 55),
    ("Agarbatti Pack", 3500, 40),
];

/// Seeded customers: (name, phone).
const CUSTOMERS: &[(&str, &str)] = &[
    ("Asha Devi", "+91 98765 43210"),
    ("Bilal Khan", "+91 91234 56789"),
    ("Chitra Nair", "+91 99887 76655"),
    ("Devendra Singh", "+91 90909 80807"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./dukaan_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Dukaan Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./dukaan_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Dukaan Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Refuse to double-seed.
    if db.users().get_by_auth_id("seed|owner").await?.is_some() {
        println!("⚠ Database already seeded.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let (owner, business) = db
        .businesses()
        .create_with_owner("Sharma General Store", "seed|owner", "owner@dukaan.dev")
        .await?;
    db.users()
        .create_team_member("seed|staff", "staff@dukaan.dev", &business.id)
        .await?;
    println!("✓ Business: {} ({})", business.name, business.id);

    let mut stocks = Vec::with_capacity(CATALOG.len());
    for (name, price_paise, quantity) in CATALOG {
        let stock = db
            .stocks()
            .create(&NewStock {
                business_id: business.id.clone(),
                name: name.to_string(),
                regular_price_paise: *price_paise,
                quantity_available: *quantity,
                image: String::new(),
            })
            .await?;
        stocks.push(stock);
    }
    println!("✓ Stock items: {}", stocks.len());

    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (name, phone) in CUSTOMERS {
        let customer = db
            .customers()
            .create(&NewCustomer {
                business_id: business.id.clone(),
                name: name.to_string(),
                phone: Some(phone.to_string()),
                email: None,
            })
            .await?;
        customers.push(customer);
    }
    println!("✓ Customers: {}", customers.len());

    // Asha gets regular-customer rates on staples.
    db.customers()
        .set_special_price(&business.id, &customers[0].id, &stocks[0].id, 11000)
        .await?;
    db.customers()
        .set_special_price(&business.id, &customers[0].id, &stocks[4].id, 4200)
        .await?;
    println!("✓ Special prices for {}", customers[0].name);

    // Each customer takes a small basket; walk-in sales mixed in.
    let mut orders = 0;
    for (idx, customer) in customers.iter().enumerate() {
        let order = db
            .orders()
            .create_order(
                &NewOrder {
                    business_id: business.id.clone(),
                    customer_id: Some(customer.id.clone()),
                    created_by: owner.id.clone(),
                    items: vec![
                        OrderLineInput {
                            stock_id: stocks[idx % stocks.len()].id.clone(),
                            quantity: 1 + (idx as i64 % 3),
                        },
                        OrderLineInput {
                            stock_id: stocks[(idx + 4) % stocks.len()].id.clone(),
                            quantity: 2,
                        },
                    ],
                },
                MissingStockPolicy::Skip,
            )
            .await?;
        orders += 1;

        // Everyone pays off roughly half their khata.
        db.payments()
            .create(&NewPayment {
                business_id: business.id.clone(),
                customer_id: customer.id.clone(),
                amount_paise: order.total_amount_paise / 2,
                method: if idx % 2 == 0 {
                    PaymentMethod::Cash
                } else {
                    PaymentMethod::Upi
                },
                note: None,
            })
            .await?;
    }

    db.orders()
        .create_order(
            &NewOrder {
                business_id: business.id.clone(),
                customer_id: None,
                created_by: owner.id.clone(),
                items: vec![OrderLineInput {
                    stock_id: stocks[10].id.clone(),
                    quantity: 5,
                }],
            },
            MissingStockPolicy::Skip,
        )
        .await?;
    orders += 1;
    println!("✓ Orders: {} (incl. one walk-in)", orders);

    let bal = db
        .payments()
        .get_customer_balance(&business.id, &customers[0].id)
        .await?;
    println!();
    println!(
        "  {} balance: debit {} / credit {} / owes {}",
        customers[0].name,
        bal.total_debit_paise,
        bal.total_credit_paise,
        bal.balance_paise
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
