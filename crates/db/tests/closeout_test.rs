//! Integration tests for special client closeouts.
//!
//! Requires a migrated Postgres database; set DATABASE_URL to run.
//! Without it the tests are skipped.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use std::env;
use uuid::Uuid;

use tesoro_core::closeout::CloseoutError;
use tesoro_core::credit::types::{CreditStatus, OrderKind};
use tesoro_db::entities::{clients, sites, workers};
use tesoro_db::repositories::closeout::{CloseoutRepoError, CloseoutRepository};
use tesoro_db::repositories::credit::CreditRepository;
use tesoro_db::repositories::sale_order::{CreateSaleOrderInput, SaleOrderRepository};

async fn connect() -> Option<DatabaseConnection> {
    let Ok(url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return None;
    };
    Some(
        Database::connect(&url)
            .await
            .expect("Failed to connect to database"),
    )
}

struct TestSite {
    site_id: Uuid,
    worker_id: Uuid,
}

async fn setup_site(db: &DatabaseConnection) -> TestSite {
    let site_id = Uuid::new_v4();
    let worker_id = Uuid::new_v4();
    let now = Utc::now().into();

    sites::ActiveModel {
        id: Set(site_id),
        name: Set(format!("Site {site_id}")),
        city: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create site");

    workers::ActiveModel {
        id: Set(worker_id),
        site_id: Set(site_id),
        full_name: Set("Test Treasurer".to_string()),
        role: Set(Some("treasurer".to_string())),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create worker");

    TestSite { site_id, worker_id }
}

async fn create_client(db: &DatabaseConnection, is_special: bool) -> Uuid {
    let client_id = Uuid::new_v4();
    let now = Utc::now().into();
    clients::ActiveModel {
        id: Set(client_id),
        name: Set("Closeout Client".to_string()),
        tax_id: Set(None),
        is_special: Set(is_special),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create client");
    client_id
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn open_credit(
    db: &DatabaseConnection,
    site: &TestSite,
    client_id: Uuid,
    subtotal: Decimal,
) -> tesoro_db::entities::credits::Model {
    let orders = SaleOrderRepository::new(db.clone());
    let (_, credit) = orders
        .create_finalized(CreateSaleOrderInput {
            site_id: site.site_id,
            worker_id: Some(site.worker_id),
            client_id: Some(client_id),
            kind: OrderKind::Credit,
            issued_on: today(),
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
        .expect("Failed to create credit order");
    credit.expect("credit order must open a credit")
}

#[tokio::test]
async fn test_closeout_snapshots_without_touching_credits() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let client_id = create_client(&db, true).await;
    let closeouts = CloseoutRepository::new(db.clone());
    let credits = CreditRepository::new(db.clone());

    let credit_a = open_credit(&db, &site, client_id, dec!(500000)).await;
    let credit_b = open_credit(&db, &site, client_id, dec!(300000)).await;

    let recorded = closeouts
        .create(
            client_id,
            site.worker_id,
            &[credit_a.id, credit_b.id],
            Some("consolidated balance".to_string()),
        )
        .await
        .expect("closeout failed");

    assert_eq!(recorded.items.len(), 2);
    let snapshot_a = recorded
        .items
        .iter()
        .find(|item| item.credit_id == credit_a.id)
        .unwrap();
    assert_eq!(snapshot_a.credit_total, dec!(500000.00));
    assert_eq!(snapshot_a.prior_balance, dec!(500000.00));

    // The credits themselves are untouched: still open, same balance.
    for credit in [&credit_a, &credit_b] {
        let found = credits.find_with_payments(credit.id).await.unwrap();
        assert_eq!(
            CreditStatus::from(found.credit.status),
            CreditStatus::Open
        );
        assert_eq!(found.credit.pending_balance, credit.pending_balance);
    }

    // And the record is retrievable by client.
    let listed = closeouts.list_for_client(client_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, recorded.closeout.id);
}

#[tokio::test]
async fn test_empty_request_rejected() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let client_id = create_client(&db, true).await;
    let closeouts = CloseoutRepository::new(db.clone());

    let result = closeouts.create(client_id, site.worker_id, &[], None).await;
    assert!(matches!(
        result,
        Err(CloseoutRepoError::Core(CloseoutError::EmptyRequest))
    ));
}

#[tokio::test]
async fn test_non_designated_client_rejected() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let client_id = create_client(&db, false).await;
    let closeouts = CloseoutRepository::new(db.clone());

    let credit = open_credit(&db, &site, client_id, dec!(100000)).await;
    let result = closeouts
        .create(client_id, site.worker_id, &[credit.id], None)
        .await;
    assert!(matches!(
        result,
        Err(CloseoutRepoError::Core(CloseoutError::NotDesignatedClient(_)))
    ));
}

#[tokio::test]
async fn test_foreign_credit_rejected() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let special = create_client(&db, true).await;
    let other = create_client(&db, false).await;
    let closeouts = CloseoutRepository::new(db.clone());

    let foreign = open_credit(&db, &site, other, dec!(100000)).await;
    let result = closeouts
        .create(special, site.worker_id, &[foreign.id], None)
        .await;
    assert!(matches!(
        result,
        Err(CloseoutRepoError::Core(CloseoutError::ForeignCredit { .. }))
    ));
}

#[tokio::test]
async fn test_unknown_credit_rejected() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let client_id = create_client(&db, true).await;
    let closeouts = CloseoutRepository::new(db.clone());

    let result = closeouts
        .create(client_id, site.worker_id, &[Uuid::new_v4()], None)
        .await;
    assert!(matches!(
        result,
        Err(CloseoutRepoError::Core(CloseoutError::CreditNotFound(_)))
    ));
}
