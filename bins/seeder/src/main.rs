//! Database seeder for Tesoro development and testing.
//!
//! Seeds two sites with workers and clients (one designated for bulk
//! closeout), a handful of cash and credit orders, installments, and an
//! unassigned expense, so every endpoint has data to chew on.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use tesoro_core::credit::types::{OrderKind, PaymentMethod};
use tesoro_core::payment::PaymentInput;
use tesoro_db::entities::{clients, sites, workers};
use tesoro_db::repositories::credit::CreditRepository;
use tesoro_db::repositories::expense::ExpenseRepository;
use tesoro_db::repositories::sale_order::{CreateSaleOrderInput, SaleOrderRepository};

/// Main site ID (consistent for all seeds).
const MAIN_SITE_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Branch site ID.
const BRANCH_SITE_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Main site cashier ID.
const CASHIER_ID: &str = "00000000-0000-0000-0000-000000000011";
/// Branch salesperson ID.
const SALESPERSON_ID: &str = "00000000-0000-0000-0000-000000000012";
/// Walk-in client ID.
const CLIENT_ID: &str = "00000000-0000-0000-0000-000000000021";
/// Designated (special) client ID.
const SPECIAL_CLIENT_ID: &str = "00000000-0000-0000-0000-000000000022";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tesoro_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    if sites::Entity::find_by_id(id(MAIN_SITE_ID))
        .one(&db)
        .await
        .expect("Failed to query sites")
        .is_some()
    {
        println!("Database already seeded, nothing to do.");
        return;
    }

    println!("Seeding directory...");
    seed_directory(&db).await;

    println!("Seeding orders and installments...");
    seed_ledger(&db).await;

    println!("Seeding expenses...");
    seed_expenses(&db).await;

    println!("Seeding complete!");
}

fn id(fixed: &str) -> Uuid {
    Uuid::parse_str(fixed).unwrap()
}

async fn seed_directory(db: &DatabaseConnection) {
    let now = Utc::now().into();

    sites::ActiveModel {
        id: Set(id(MAIN_SITE_ID)),
        name: Set("Sede Principal".to_string()),
        city: Set(Some("Bogota".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed main site");

    sites::ActiveModel {
        id: Set(id(BRANCH_SITE_ID)),
        name: Set("Sede Norte".to_string()),
        city: Set(Some("Medellin".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed branch site");

    workers::ActiveModel {
        id: Set(id(CASHIER_ID)),
        site_id: Set(id(MAIN_SITE_ID)),
        full_name: Set("Marta Quintero".to_string()),
        role: Set(Some("cashier".to_string())),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed cashier");

    workers::ActiveModel {
        id: Set(id(SALESPERSON_ID)),
        site_id: Set(id(BRANCH_SITE_ID)),
        full_name: Set("Julian Pardo".to_string()),
        role: Set(Some("salesperson".to_string())),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed salesperson");

    clients::ActiveModel {
        id: Set(id(CLIENT_ID)),
        name: Set("Comercial La Octava".to_string()),
        tax_id: Set(Some("900123456-1".to_string())),
        is_special: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed client");

    clients::ActiveModel {
        id: Set(id(SPECIAL_CLIENT_ID)),
        name: Set("Distribuidora El Llano".to_string()),
        tax_id: Set(Some("901987654-2".to_string())),
        is_special: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed special client");
}

async fn seed_ledger(db: &DatabaseConnection) {
    let orders = SaleOrderRepository::new(db.clone());
    let credits = CreditRepository::new(db.clone());
    let today = Utc::now().date_naive();

    // A few cash sales at the main site, claimable by a delivery batch.
    for (days_ago, subtotal) in [(3, dec!(50000)), (2, dec!(120000)), (1, dec!(80000))] {
        orders
            .create_finalized(CreateSaleOrderInput {
                site_id: id(MAIN_SITE_ID),
                worker_id: Some(id(CASHIER_ID)),
                client_id: None,
                kind: OrderKind::Cash,
                issued_on: today - Duration::days(days_ago),
                subtotal,
                discount_total: dec!(0),
                tax_total: dec!(0),
                source_retention_enabled: false,
                source_retention_percent: dec!(0),
                ica_retention_enabled: false,
                ica_retention_percent: dec!(0),
                notes: None,
            })
            .await
            .expect("Failed to seed cash order");
    }

    // A credit sale with a partial installment.
    let (_, credit) = orders
        .create_finalized(CreateSaleOrderInput {
            site_id: id(MAIN_SITE_ID),
            worker_id: Some(id(CASHIER_ID)),
            client_id: Some(id(CLIENT_ID)),
            kind: OrderKind::Credit,
            issued_on: today - Duration::days(10),
            subtotal: dec!(1000000),
            discount_total: dec!(0),
            tax_total: dec!(0),
            source_retention_enabled: false,
            source_retention_percent: dec!(0),
            ica_retention_enabled: false,
            ica_retention_percent: dec!(0),
            notes: Some("pagadero en dos cuotas".to_string()),
        })
        .await
        .expect("Failed to seed credit order");
    let credit = credit.expect("credit order should open a credit");

    credits
        .register_payment(
            credit.id,
            PaymentInput {
                amount: dec!(400000),
                paid_on: today - Duration::days(4),
                method: PaymentMethod::Cash,
                receipt_ref: Some("RC-0001".to_string()),
            },
        )
        .await
        .expect("Failed to seed installment");

    // Open credits for the special client, ready for a bulk closeout.
    for (days_ago, subtotal) in [(40, dec!(500000)), (25, dec!(300000))] {
        orders
            .create_finalized(CreateSaleOrderInput {
                site_id: id(BRANCH_SITE_ID),
                worker_id: Some(id(SALESPERSON_ID)),
                client_id: Some(id(SPECIAL_CLIENT_ID)),
                kind: OrderKind::Credit,
                issued_on: today - Duration::days(days_ago),
                subtotal,
                discount_total: dec!(0),
                tax_total: dec!(0),
                source_retention_enabled: true,
                source_retention_percent: dec!(4),
                ica_retention_enabled: false,
                ica_retention_percent: dec!(0),
                notes: None,
            })
            .await
            .expect("Failed to seed special client credit");
    }
}

async fn seed_expenses(db: &DatabaseConnection) {
    let expenses = ExpenseRepository::new(db.clone());
    let today = Utc::now().date_naive();

    expenses
        .create(
            id(MAIN_SITE_ID),
            "papeleria y tintas".to_string(),
            dec!(15000),
            today - Duration::days(2),
        )
        .await
        .expect("Failed to seed expense");
}
