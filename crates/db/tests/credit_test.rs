//! Integration tests for the credit ledger.
//!
//! Requires a migrated Postgres database; set DATABASE_URL to run.
//! Without it the tests are skipped.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use std::env;
use uuid::Uuid;

use tesoro_core::credit::types::{CreditStatus, OrderKind, PaymentMethod};
use tesoro_core::credit::OverduePolicy;
use tesoro_core::payment::PaymentInput;
use tesoro_db::entities::{clients, sites, workers};
use tesoro_db::repositories::credit::{CreditRepoError, CreditRepository, UpdateWithholdingInput};
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

fn credit_order_input(site: &TestSite, subtotal: rust_decimal::Decimal) -> CreateSaleOrderInput {
    CreateSaleOrderInput {
        site_id: site.site_id,
        worker_id: Some(site.worker_id),
        client_id: Some(site.client_id),
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
    }
}

fn payment(amount: rust_decimal::Decimal) -> PaymentInput {
    PaymentInput {
        amount,
        paid_on: today(),
        method: PaymentMethod::Cash,
        receipt_ref: None,
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[tokio::test]
async fn test_two_payments_close_the_credit() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let orders = SaleOrderRepository::new(db.clone());
    let credits = CreditRepository::new(db.clone());

    let (_, credit) = orders
        .create_finalized(credit_order_input(&site, dec!(1000000)))
        .await
        .expect("Failed to create credit order");
    let credit = credit.expect("credit order must open a credit");
    assert_eq!(credit.pending_balance, dec!(1000000.00));

    let (_, credit) = credits
        .register_payment(credit.id, payment(dec!(400000)))
        .await
        .expect("first installment failed");
    assert_eq!(credit.pending_balance, dec!(600000.00));
    assert_eq!(CreditStatus::from(credit.status.clone()), CreditStatus::Open);

    let (last_payment, credit) = credits
        .register_payment(credit.id, payment(dec!(600000)))
        .await
        .expect("second installment failed");
    assert_eq!(credit.pending_balance, dec!(0.00));
    assert_eq!(CreditStatus::from(credit.status), CreditStatus::Closed);
    assert!(credit.closed_on.is_some());
    assert_eq!(last_payment.balance_after, dec!(0.00));
}

#[tokio::test]
async fn test_overpayment_rejected_and_state_unchanged() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let orders = SaleOrderRepository::new(db.clone());
    let credits = CreditRepository::new(db.clone());

    let (_, credit) = orders
        .create_finalized(credit_order_input(&site, dec!(100000)))
        .await
        .expect("Failed to create credit order");
    let credit = credit.unwrap();

    let result = credits
        .register_payment(credit.id, payment(dec!(100000.02)))
        .await;
    assert!(matches!(
        result,
        Err(CreditRepoError::Payment(_)) | Err(CreditRepoError::Core(_))
    ));

    let found = credits
        .find_with_payments(credit.id)
        .await
        .expect("credit must still exist");
    assert_eq!(found.credit.pending_balance, dec!(100000.00));
    assert_eq!(found.credit.paid_total, dec!(0.00));
    assert!(found.payments.is_empty());
}

#[tokio::test]
async fn test_withholding_reversibility() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let orders = SaleOrderRepository::new(db.clone());
    let credits = CreditRepository::new(db.clone());

    let (_, credit) = orders
        .create_finalized(credit_order_input(&site, dec!(1000000)))
        .await
        .expect("Failed to create credit order");
    let credit = credit.unwrap();

    let with_retention = credits
        .update_withholding(
            credit.id,
            UpdateWithholdingInput {
                source_enabled: true,
                source_percent: dec!(4),
                source_amount: dec!(40000),
                ica_enabled: false,
                ica_percent: dec!(0),
                ica_amount: dec!(0),
            },
        )
        .await
        .expect("enabling withholding failed");
    assert_eq!(with_retention.pending_balance, dec!(960000.00));

    let without_retention = credits
        .update_withholding(
            credit.id,
            UpdateWithholdingInput {
                source_enabled: false,
                source_percent: dec!(0),
                source_amount: dec!(0),
                ica_enabled: false,
                ica_percent: dec!(0),
                ica_amount: dec!(0),
            },
        )
        .await
        .expect("disabling withholding failed");
    assert_eq!(
        without_retention.pending_balance - with_retention.pending_balance,
        dec!(40000.00)
    );
}

#[tokio::test]
async fn test_rebuild_reproduces_stored_balance() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let orders = SaleOrderRepository::new(db.clone());
    let credits = CreditRepository::new(db.clone());

    let (_, credit) = orders
        .create_finalized(credit_order_input(&site, dec!(750000)))
        .await
        .expect("Failed to create credit order");
    let credit = credit.unwrap();

    for amount in [dec!(100000), dec!(250000), dec!(33333.33)] {
        credits
            .register_payment(credit.id, payment(amount))
            .await
            .expect("installment failed");
    }

    let before = credits.find_with_payments(credit.id).await.unwrap();
    let rebuilt = credits.rebuild(credit.id).await.expect("rebuild failed");
    assert_eq!(rebuilt.pending_balance, before.credit.pending_balance);
    assert_eq!(rebuilt.paid_total, dec!(383333.33));
}

#[tokio::test]
async fn test_voided_credit_rejects_payments() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let orders = SaleOrderRepository::new(db.clone());
    let credits = CreditRepository::new(db.clone());

    let (_, credit) = orders
        .create_finalized(credit_order_input(&site, dec!(50000)))
        .await
        .expect("Failed to create credit order");
    let credit = credit.unwrap();

    let voided = credits.void(credit.id).await.expect("void failed");
    assert_eq!(CreditStatus::from(voided.status), CreditStatus::Voided);

    let result = credits.register_payment(credit.id, payment(dec!(1000))).await;
    assert!(result.is_err(), "voided credit must reject payments");
}

#[tokio::test]
async fn test_overdue_sweep_marks_old_open_credits() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let orders = SaleOrderRepository::new(db.clone());
    let credits = CreditRepository::new(db.clone());

    let mut input = credit_order_input(&site, dec!(200000));
    input.issued_on = today() - Duration::days(45);
    let (_, credit) = orders
        .create_finalized(input)
        .await
        .expect("Failed to create credit order");
    let credit = credit.unwrap();

    let marked = credits
        .overdue_sweep(OverduePolicy::new(30), today(), Some(site.site_id))
        .await
        .expect("sweep failed");
    assert_eq!(marked, 1);

    let found = credits.find_with_payments(credit.id).await.unwrap();
    assert_eq!(
        CreditStatus::from(found.credit.status),
        CreditStatus::Overdue
    );

    // Overdue credits still close through payments.
    let (_, credit) = credits
        .register_payment(credit.id, payment(dec!(200000)))
        .await
        .expect("payment on overdue credit failed");
    assert_eq!(CreditStatus::from(credit.status), CreditStatus::Closed);
}

#[tokio::test]
async fn test_order_numbers_are_site_scoped_and_sequential() {
    let Some(db) = connect().await else { return };
    let site = setup_site(&db).await;
    let orders = SaleOrderRepository::new(db.clone());

    let (first, _) = orders
        .create_finalized(credit_order_input(&site, dec!(10000)))
        .await
        .unwrap();
    let (second, _) = orders
        .create_finalized(credit_order_input(&site, dec!(10000)))
        .await
        .unwrap();
    assert_eq!(second.order_number, first.order_number + 1);

    // A fresh site starts its own sequence.
    let other = setup_site(&db).await;
    let (third, _) = orders
        .create_finalized(credit_order_input(&other, dec!(10000)))
        .await
        .unwrap();
    assert_eq!(third.order_number, 1);
}
