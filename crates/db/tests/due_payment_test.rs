//! Integration tests for DuePaymentRepository.

mod common;

use chrono::{Duration, Utc};
use kasira_core::dues::{DueError, DueKind, DueRef, DueStatus, PaymentMethod};
use kasira_db::repositories::{
    CreateDueInput, DueLedgerRepository, DuePaymentRepository, DueStoreError, NewPayment,
    PaymentError, UpdatePayment,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

async fn create_due(db: &DatabaseConnection, total: Decimal) -> DueRef {
    let supplier_id = common::create_supplier(db, "Supplier").await;
    let branch_id = common::create_branch(db, "Branch").await;
    let repo = DueLedgerRepository::new(db.clone());
    let due = repo
        .create(CreateDueInput {
            kind: DueKind::Supplier,
            counterparty_id: supplier_id,
            branch_id,
            stock_movement_id: None,
            due_type: "stock_purchase".to_owned(),
            total_amount: total,
            paid_amount: Decimal::ZERO,
            due_date: Utc::now().date_naive() + Duration::days(30),
            description: None,
        })
        .await
        .expect("create due failed");
    due.due_ref()
}

fn payment(due: DueRef, amount: Decimal) -> NewPayment {
    NewPayment {
        due,
        amount,
        payment_method: PaymentMethod::BankTransfer,
        payment_date: Utc::now().date_naive(),
        reference_number: None,
        description: None,
        created_by: None,
    }
}

#[tokio::test]
async fn test_partial_payment_updates_due() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(1000)).await;
    let repo = DuePaymentRepository::new(db.clone());

    let record = repo.add(payment(due_ref, dec!(400))).await.expect("add failed");
    assert_eq!(record.payment.amount, dec!(400));
    assert_eq!(record.due.paid_amount, dec!(400));
    assert_eq!(record.due.remaining_amount, dec!(600));
    assert_eq!(record.due.status, DueStatus::Partial);
    assert!(record.due.payment_date.is_none());

    let history = repo.list_for_due(due_ref).await.expect("list failed");
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_exact_settlement_marks_paid() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(250)).await;
    let repo = DuePaymentRepository::new(db.clone());

    repo.add(payment(due_ref, dec!(100))).await.expect("add failed");
    let record = repo.add(payment(due_ref, dec!(150))).await.expect("add failed");
    assert_eq!(record.due.status, DueStatus::Paid);
    assert_eq!(record.due.remaining_amount, Decimal::ZERO);
    assert_eq!(record.due.payment_date, Some(Utc::now().date_naive()));
}

#[tokio::test]
async fn test_overpayment_rejected_and_due_unchanged() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(500)).await;
    let payments = DuePaymentRepository::new(db.clone());
    let dues = DueLedgerRepository::new(db.clone());

    payments
        .add(payment(due_ref, dec!(300)))
        .await
        .expect("add failed");

    let result = payments.add(payment(due_ref, dec!(300))).await;
    assert!(matches!(
        result,
        Err(PaymentError::Due(DueStoreError::Due(
            DueError::ExceedsRemaining { .. }
        )))
    ));

    // The failed payment must leave both the due and the history untouched.
    let details = dues.get(due_ref).await.expect("get failed");
    assert_eq!(details.due.paid_amount, dec!(300));
    assert_eq!(details.due.remaining_amount, dec!(200));
    let history = payments.list_for_due(due_ref).await.expect("list failed");
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_non_positive_amount_rejected() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(100)).await;
    let repo = DuePaymentRepository::new(db.clone());

    let result = repo.add(payment(due_ref, Decimal::ZERO)).await;
    assert!(matches!(
        result,
        Err(PaymentError::Due(DueStoreError::Due(DueError::InvalidAmount)))
    ));

    // A negative amount would silently reduce the paid amount.
    let result = repo.add(payment(due_ref, dec!(-50))).await;
    assert!(matches!(
        result,
        Err(PaymentError::Due(DueStoreError::Due(DueError::InvalidAmount)))
    ));

    let dues = DueLedgerRepository::new(db);
    let details = dues.get(due_ref).await.expect("get failed");
    assert_eq!(details.due.paid_amount, Decimal::ZERO);
    assert_eq!(details.due.status, DueStatus::Pending);
}

#[tokio::test]
async fn test_payment_on_cancelled_due_rejected() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(100)).await;
    let dues = DueLedgerRepository::new(db.clone());
    dues.cancel(due_ref).await.expect("cancel failed");

    let payments = DuePaymentRepository::new(db);
    let result = payments.add(payment(due_ref, dec!(50))).await;
    assert!(matches!(
        result,
        Err(PaymentError::Due(DueStoreError::Due(
            DueError::AlreadyCancelled
        )))
    ));
}

#[tokio::test]
async fn test_delete_payment_restores_balance() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(400)).await;
    let repo = DuePaymentRepository::new(db.clone());

    let record = repo.add(payment(due_ref, dec!(400))).await.expect("add failed");
    assert_eq!(record.due.status, DueStatus::Paid);

    let due = repo
        .delete(record.payment.id)
        .await
        .expect("delete failed");
    assert_eq!(due.paid_amount, Decimal::ZERO);
    assert_eq!(due.remaining_amount, dec!(400));
    assert_eq!(due.status, DueStatus::Pending);
    assert!(due.payment_date.is_none());

    let history = repo.list_for_due(due_ref).await.expect("list failed");
    assert!(history.is_empty());

    let missing = repo.delete(record.payment.id).await;
    assert!(matches!(missing, Err(PaymentError::NotFound(_))));
}

#[tokio::test]
async fn test_update_payment_amount_reapplies_delta() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(1000)).await;
    let repo = DuePaymentRepository::new(db.clone());

    let record = repo.add(payment(due_ref, dec!(200))).await.expect("add failed");

    let updated = repo
        .update(
            record.payment.id,
            UpdatePayment {
                amount: Some(dec!(500)),
                ..UpdatePayment::default()
            },
        )
        .await
        .expect("update failed");
    assert_eq!(updated.payment.amount, dec!(500));
    assert_eq!(updated.due.paid_amount, dec!(500));
    assert_eq!(updated.due.remaining_amount, dec!(500));

    // Raising the amount beyond the balance must fail and change nothing.
    let result = repo
        .update(
            record.payment.id,
            UpdatePayment {
                amount: Some(dec!(1200)),
                ..UpdatePayment::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(PaymentError::Due(DueStoreError::Due(
            DueError::ExceedsRemaining { .. }
        )))
    ));
    let history = repo.list_for_due(due_ref).await.expect("list failed");
    assert_eq!(history[0].amount, dec!(500));
}

#[tokio::test]
async fn test_concurrent_full_payments_settle_once() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(800)).await;
    let repo = DuePaymentRepository::new(db.clone());

    let (first, second) = futures::join!(
        repo.add(payment(due_ref, dec!(800))),
        repo.add(payment(due_ref, dec!(800))),
    );

    // Exactly one of the two full payments can land.
    assert!(first.is_ok() ^ second.is_ok());

    let dues = DueLedgerRepository::new(db);
    let details = dues.get(due_ref).await.expect("get failed");
    assert_eq!(details.due.paid_amount, dec!(800));
    assert_eq!(details.due.status, DueStatus::Paid);
}

#[tokio::test]
async fn test_delete_payment_keeps_cancelled_status() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(1000)).await;
    let payments = DuePaymentRepository::new(db.clone());
    let dues = DueLedgerRepository::new(db);

    let record = payments
        .add(payment(due_ref, dec!(400)))
        .await
        .expect("add failed");
    dues.cancel(due_ref).await.expect("cancel failed");

    // Reversal restores the amounts but never resurrects the due.
    let due = payments
        .delete(record.payment.id)
        .await
        .expect("delete failed");
    assert_eq!(due.paid_amount, Decimal::ZERO);
    assert_eq!(due.remaining_amount, dec!(1000));
    assert_eq!(due.status, DueStatus::Cancelled);
}

#[tokio::test]
async fn test_update_payment_on_cancelled_due_rejected() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(1000)).await;
    let payments = DuePaymentRepository::new(db.clone());
    let dues = DueLedgerRepository::new(db);

    let record = payments
        .add(payment(due_ref, dec!(400)))
        .await
        .expect("add failed");
    dues.cancel(due_ref).await.expect("cancel failed");

    let result = payments
        .update(
            record.payment.id,
            UpdatePayment {
                amount: Some(dec!(500)),
                ..UpdatePayment::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(PaymentError::Due(DueStoreError::Due(
            DueError::AlreadyCancelled
        )))
    ));
}

#[tokio::test]
async fn test_update_payment_to_non_positive_rejected() {
    let db = common::setup_db().await;
    let due_ref = create_due(&db, dec!(1000)).await;
    let repo = DuePaymentRepository::new(db);

    let record = repo.add(payment(due_ref, dec!(200))).await.expect("add failed");

    let result = repo
        .update(
            record.payment.id,
            UpdatePayment {
                amount: Some(Decimal::ZERO),
                ..UpdatePayment::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(PaymentError::Due(DueStoreError::Due(DueError::InvalidAmount)))
    ));

    let history = repo.list_for_due(due_ref).await.expect("list failed");
    assert_eq!(history[0].amount, dec!(200));
}

#[tokio::test]
async fn test_payment_carries_owning_branch() {
    let db = common::setup_db().await;
    let supplier_id = common::create_supplier(&db, "Supplier").await;
    let branch_id = common::create_branch(&db, "Branch").await;
    let dues = DueLedgerRepository::new(db.clone());
    let due = dues
        .create(CreateDueInput {
            kind: DueKind::Supplier,
            counterparty_id: supplier_id,
            branch_id,
            stock_movement_id: None,
            due_type: "stock_purchase".to_owned(),
            total_amount: dec!(500),
            paid_amount: Decimal::ZERO,
            due_date: Utc::now().date_naive() + Duration::days(30),
            description: None,
        })
        .await
        .expect("create due failed");

    let payments = DuePaymentRepository::new(db);
    let record = payments
        .add(payment(due.due_ref(), dec!(100)))
        .await
        .expect("add failed");
    assert_eq!(record.payment.branch_id, branch_id);
}

#[tokio::test]
async fn test_payment_on_missing_due_rejected() {
    let db = common::setup_db().await;
    let repo = DuePaymentRepository::new(db);

    let result = repo
        .add(payment(DueRef::new(DueKind::Customer, Uuid::new_v4()), dec!(10)))
        .await;
    assert!(matches!(
        result,
        Err(PaymentError::Due(DueStoreError::NotFound { .. }))
    ));
}
