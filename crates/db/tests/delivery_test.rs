//! Integration tests for delivery batch assembly and confirmation.
//!
//! Requires a migrated Postgres database; set DATABASE_URL to run.
//! Without it the tests are skipped.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use std::env;
use uuid::Uuid;

use tesoro_core::credit::types::{OrderKind, PaymentMethod};
use tesoro_core::delivery::types::{DeclaredAmounts, DeliveryStatus};
use tesoro_core::delivery::DeliveryError;
use tesoro_core::payment::PaymentInput;
use tesoro_core::reconciliation::ReconciliationError;
use tesoro_db::entities::{clients, sites, workers};
use tesoro_db::repositories::credit::CreditRepository;
use tesoro_db::repositories::delivery::{
    CreateBatchInput, DeliveryRepoError, DeliveryRepository,
};
use tesoro_db::repositories::expense::ExpenseRepository;
use tesoro_db::repositories::sale_order::{CreateSaleOrderInput, SaleOrderRepository};
use tesoro_db::repositories::sales_return::SalesReturnRepository;

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
    client_id: Uuid,
}

async fn setup_site(db: &DatabaseConnection) -> TestSite {
    let site_id = Uuid::new_v4();
    let worker_id = Uuid::new_v4();
    let client_id = Uuid::new_v4();
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
        full_name: Set("Test Cashier".to_string()),
        role: Set(Some("cashier".to_string())),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create worker");

    clients::ActiveModel {
        id: Set(client_id),
        name: Set("Test Client".to_string()),
        tax_id: Set(None),
        is_special: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to create client");

    TestSite {
        site_id,
        worker_id,
        client_id,
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn cash_order(
    db: &DatabaseConnection,
    site: &TestSite,
    subtotal: Decimal,
) -> tesoro_db::entities::sale_orders::Model {
    let orders = SaleOrderRepository::new(db.clone());
    let (order, _) = orders
        .create_finalized(CreateSaleOrderInput {
            site_id: site.site_id,
            worker_id: Some(site.worker_id),
            client_id: None,
            kind: OrderKind::Cash,
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
        .expect("Failed to create cash order");
    order
}

async fn installment(
    db: &DatabaseConnection,
    site: &TestSite,
    credit_total: Decimal,
    amount: Decimal,
) -> tesoro_db::entities::payments::Model {
    let orders = SaleOrderRepository::new(db.clone());
    let credits = CreditRepository::new(db.clone());
    let (_, credit) = orders
        .create_finalized(CreateSaleOrderInput {
            site_id: site.site_id,
            worker_id: Some(site.worker_id),
            client_id: Some(site.client_id),
            kind: OrderKind::Credit,
            issued_on: today(),
            subtotal: credit_total,
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
    let (payment, _) = credits
        .register_payment(
            credit.unwrap().id,
            PaymentInput {
                amount,
                paid_on: today(),
                method: PaymentMethod::Cash,
                receipt_ref: None,
            },
        )
        .await
        .expect("Failed to register installment");
    payment
}

async fn draft_batch(
    db: &DatabaseConnection,
    site: &TestSite,
) -> tesoro_db::entities::delivery_batches::Model {
    DeliveryRepository::new(db.clone())
        .create_draft(CreateBatchInput {
            site_id: site.site_id,
            employee_id: site.worker_id,
            delivery_date: today(),
            period_start: today() - Duration::days(7),
            period_end: today(),
            notes: None,
        })
        .await
        .expect("Failed to create draft batch")
}

#[tokio::test]
async fn test_batch_lifecycle_with_negative_variance() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let deliveries = DeliveryRepository::new(db.clone());
    let expenses = ExpenseRepository::new(db.clone());

    // Expected: 50,000 + 120,000 + 40,000 - 10,000 = 200,000.
    let order_a = cash_order(&db, &site, dec!(50000)).await;
    let order_b = cash_order(&db, &site, dec!(120000)).await;
    let payment = installment(&db, &site, dec!(200000), dec!(40000)).await;
    let expense = expenses
        .create(site.site_id, "fletes".to_string(), dec!(10000), today())
        .await
        .unwrap();

    let batch = draft_batch(&db, &site).await;
    deliveries.add_order_item(batch.id, order_a.id).await.unwrap();
    deliveries.add_order_item(batch.id, order_b.id).await.unwrap();
    let (_, updated) = deliveries.add_payment_item(batch.id, payment.id).await.unwrap();
    assert_eq!(updated.expected_amount, dec!(210000.00));

    let updated = deliveries.attach_expense(batch.id, expense.id).await.unwrap();
    assert_eq!(updated.expected_amount, dec!(200000.00));
    assert_eq!(updated.expense_total, dec!(10000.00));

    // Declared 150,000 cash + 40,000 transfer: 10,000 short.
    let confirmed = deliveries
        .confirm(
            batch.id,
            DeclaredAmounts {
                cash: dec!(150000),
                transfer: dec!(40000),
                check: dec!(0),
                deposit: dec!(0),
            },
            None,
        )
        .await
        .expect("confirmation failed");

    assert_eq!(
        DeliveryStatus::from(confirmed.status),
        DeliveryStatus::Confirmed
    );
    assert_eq!(confirmed.declared_total, dec!(190000.00));
    assert_eq!(confirmed.variance, Some(dec!(-10000.00)));
    assert!(confirmed.voucher_number.is_some());
    assert!(confirmed.confirmed_at.is_some());
}

#[tokio::test]
async fn test_cross_batch_claim_rejected() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let deliveries = DeliveryRepository::new(db.clone());

    let order = cash_order(&db, &site, dec!(50000)).await;
    let batch_a = draft_batch(&db, &site).await;
    let batch_b = draft_batch(&db, &site).await;

    deliveries.add_order_item(batch_a.id, order.id).await.unwrap();

    let result = deliveries.add_order_item(batch_b.id, order.id).await;
    match result {
        Err(DeliveryRepoError::Claim(ReconciliationError::AlreadyClaimed {
            batch_id, ..
        })) => assert_eq!(batch_id, batch_a.id),
        other => panic!("expected AlreadyClaimed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_released_order_claimable_elsewhere() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let deliveries = DeliveryRepository::new(db.clone());

    let order = cash_order(&db, &site, dec!(80000)).await;
    let batch_a = draft_batch(&db, &site).await;
    let batch_b = draft_batch(&db, &site).await;

    let (item, updated) = deliveries.add_order_item(batch_a.id, order.id).await.unwrap();
    assert_eq!(updated.expected_amount, dec!(80000.00));

    let updated = deliveries.remove_item(batch_a.id, item.id).await.unwrap();
    assert_eq!(updated.expected_amount, dec!(0.00));

    // The claim is free again.
    let (_, updated) = deliveries.add_order_item(batch_b.id, order.id).await.unwrap();
    assert_eq!(updated.expected_amount, dec!(80000.00));
}

#[tokio::test]
async fn test_confirm_misuse_rejected() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let deliveries = DeliveryRepository::new(db.clone());

    // Empty batch cannot be confirmed.
    let empty = draft_batch(&db, &site).await;
    let result = deliveries
        .confirm(empty.id, DeclaredAmounts::default(), None)
        .await;
    assert!(matches!(
        result,
        Err(DeliveryRepoError::Core(DeliveryError::EmptyBatch))
    ));

    // A confirmed batch rejects a second confirmation and any mutation.
    let order = cash_order(&db, &site, dec!(50000)).await;
    let batch = draft_batch(&db, &site).await;
    let (item, _) = deliveries.add_order_item(batch.id, order.id).await.unwrap();
    let confirmed = deliveries
        .confirm(
            batch.id,
            DeclaredAmounts {
                cash: dec!(50000),
                ..DeclaredAmounts::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(confirmed.variance, Some(dec!(0.00)));

    let again = deliveries
        .confirm(batch.id, DeclaredAmounts::default(), None)
        .await;
    assert!(matches!(
        again,
        Err(DeliveryRepoError::Core(DeliveryError::AlreadyConfirmed))
    ));

    let mutate = deliveries.remove_item(batch.id, item.id).await;
    assert!(matches!(
        mutate,
        Err(DeliveryRepoError::Claim(ReconciliationError::BatchNotDraft))
    ));

    let delete = deliveries.delete_draft(batch.id).await;
    assert!(matches!(
        delete,
        Err(DeliveryRepoError::Core(DeliveryError::BatchNotDraft))
    ));
}

#[tokio::test]
async fn test_delete_draft_releases_claims_and_expenses() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let deliveries = DeliveryRepository::new(db.clone());
    let expenses = ExpenseRepository::new(db.clone());

    let order = cash_order(&db, &site, dec!(60000)).await;
    let expense = expenses
        .create(site.site_id, "aseo".to_string(), dec!(5000), today())
        .await
        .unwrap();

    let batch = draft_batch(&db, &site).await;
    deliveries.add_order_item(batch.id, order.id).await.unwrap();
    deliveries.attach_expense(batch.id, expense.id).await.unwrap();

    deliveries.delete_draft(batch.id).await.expect("delete failed");

    // Expense back in the unassigned pool, order claimable again.
    let expense = expenses.find(expense.id).await.unwrap();
    assert!(expense.batch_id.is_none());

    let batch_b = draft_batch(&db, &site).await;
    assert!(deliveries.add_order_item(batch_b.id, order.id).await.is_ok());
}

#[tokio::test]
async fn test_site_mismatch_rejected() {
    let Some(db) = connect().await else { return };
    let site_a = setup_site(&db).await;
    let site_b = setup_site(&db).await;
    let deliveries = DeliveryRepository::new(db.clone());

    let order = cash_order(&db, &site_a, dec!(30000)).await;
    let batch = draft_batch(&db, &site_b).await;

    let result = deliveries.add_order_item(batch.id, order.id).await;
    assert!(matches!(
        result,
        Err(DeliveryRepoError::Claim(ReconciliationError::SiteMismatch { .. }))
    ));
}

#[tokio::test]
async fn test_eligibility_reflects_claims_and_returns() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let deliveries = DeliveryRepository::new(db.clone());
    let returns = SalesReturnRepository::new(db.clone());

    let order_a = cash_order(&db, &site, dec!(50000)).await;
    let order_b = cash_order(&db, &site, dec!(90000)).await;
    let payment = installment(&db, &site, dec!(500000), dec!(100000)).await;

    // A partial return nets order B down to 70,000.
    returns
        .create(order_b.id, dec!(20000), Some("damaged".to_string()), today())
        .await
        .unwrap();

    let eligible = deliveries
        .list_eligible_cash_orders(site.site_id, today() - Duration::days(1), today())
        .await
        .unwrap();
    assert_eq!(eligible.len(), 2);
    let b = eligible.iter().find(|e| e.order.id == order_b.id).unwrap();
    assert_eq!(b.returns_total, dec!(20000));
    assert_eq!(b.net_total, dec!(70000.00));

    let eligible_payments = deliveries
        .list_eligible_payments(site.site_id, today() - Duration::days(1), today())
        .await
        .unwrap();
    assert_eq!(eligible_payments.len(), 1);
    assert_eq!(eligible_payments[0].id, payment.id);

    // Claiming order A removes it from the listing; the claimed amount
    // snapshots the net total.
    let batch = draft_batch(&db, &site).await;
    deliveries.add_order_item(batch.id, order_a.id).await.unwrap();
    let (item, _) = deliveries.add_order_item(batch.id, order_b.id).await.unwrap();
    assert_eq!(item.amount, dec!(70000.00));

    let eligible = deliveries
        .list_eligible_cash_orders(site.site_id, today() - Duration::days(1), today())
        .await
        .unwrap();
    assert!(eligible.is_empty());
}

#[tokio::test]
async fn test_return_rejected_once_order_claimed() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let deliveries = DeliveryRepository::new(db.clone());
    let returns = SalesReturnRepository::new(db.clone());

    let order = cash_order(&db, &site, dec!(40000)).await;
    let batch = draft_batch(&db, &site).await;
    deliveries.add_order_item(batch.id, order.id).await.unwrap();

    let result = returns.create(order.id, dec!(10000), None, today()).await;
    assert!(result.is_err(), "claimed order must not accept returns");
}
