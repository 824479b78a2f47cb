//! Integration tests for StockMovementRepository.
//!
//! These cover the transactional coupling between movements, branch
//! stock, and the due ledgers.

mod common;

use chrono::{Duration, Utc};
use kasira_core::dues::{DueError, DueKind, DueStatus, PaymentMethod};
use kasira_core::stock::{MovementError, MovementType, NewMovement};
use kasira_db::repositories::{
    DueLedgerRepository, DuePaymentRepository, DueStoreError, MovementListFilter,
    MovementStoreError, NewPayment, StockMovementRepository, UpdateMovement,
};
use kasira_shared::types::PageRequest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

struct Fixture {
    db: DatabaseConnection,
    branch_id: Uuid,
    product_id: Uuid,
    supplier_id: Uuid,
}

async fn fixture() -> Fixture {
    let db = common::setup_db().await;
    let branch_id = common::create_branch(&db, "Main Branch").await;
    let product_id = common::create_product(&db, dec!(10)).await;
    let supplier_id = common::create_supplier(&db, "Acme Wholesale").await;
    Fixture {
        db,
        branch_id,
        product_id,
        supplier_id,
    }
}

fn movement(fx: &Fixture, movement_type: MovementType, quantity: Decimal) -> NewMovement {
    NewMovement {
        movement_type,
        product_id: fx.product_id,
        branch_id: fx.branch_id,
        reference_branch_id: None,
        supplier_id: None,
        quantity,
        unit_price: dec!(10),
        total_amount: None,
        paid_amount: Decimal::ZERO,
        auto_update_product: true,
        description: None,
    }
}

#[tokio::test]
async fn test_arrival_credits_stock_and_creates_supplier_due() {
    let fx = fixture().await;
    let repo = StockMovementRepository::new(fx.db.clone());

    let mut input = movement(&fx, MovementType::Arrival, dec!(50));
    input.supplier_id = Some(fx.supplier_id);
    input.paid_amount = dec!(100);
    let record = repo.record(input, None).await.expect("record failed");

    assert_eq!(record.movement.total_amount, dec!(500));
    let stock = repo
        .stock_level(fx.product_id, fx.branch_id)
        .await
        .expect("stock failed");
    assert_eq!(stock, dec!(50));

    let due = record.due.expect("due not created");
    assert_eq!(due.kind, DueKind::Supplier);
    assert_eq!(due.counterparty_id, fx.supplier_id);
    assert_eq!(due.branch_id, fx.branch_id);
    assert_eq!(due.due_type, "stock_purchase");
    assert_eq!(due.total_amount, dec!(500));
    assert_eq!(due.paid_amount, dec!(100));
    assert_eq!(due.remaining_amount, dec!(400));
    assert_eq!(due.status, DueStatus::Partial);
    assert_eq!(
        due.due_date,
        Utc::now().date_naive() + Duration::days(30)
    );
    assert_eq!(due.stock_movement_id, Some(record.movement.id));

    let dues = DueLedgerRepository::new(fx.db.clone());
    let details = dues.get(due.due_ref()).await.expect("get failed");
    assert_eq!(details.branch_name.as_deref(), Some("Main Branch"));
    assert_eq!(details.movement_type.as_deref(), Some("arrival"));
}

#[tokio::test]
async fn test_arrival_without_supplier_creates_no_due() {
    let fx = fixture().await;
    let repo = StockMovementRepository::new(fx.db.clone());

    let record = repo
        .record(movement(&fx, MovementType::Arrival, dec!(10)), None)
        .await
        .expect("record failed");
    assert!(record.due.is_none());
}

#[tokio::test]
async fn test_dispatch_rejected_on_insufficient_stock() {
    let fx = fixture().await;
    let repo = StockMovementRepository::new(fx.db.clone());

    repo.record(movement(&fx, MovementType::Arrival, dec!(5)), None)
        .await
        .expect("record failed");

    let result = repo
        .record(movement(&fx, MovementType::Dispatch, dec!(8)), None)
        .await;
    assert!(matches!(
        result,
        Err(MovementStoreError::Movement(
            MovementError::InsufficientStock { .. }
        ))
    ));

    // The failed dispatch must not be persisted and stock must be intact.
    let stock = repo
        .stock_level(fx.product_id, fx.branch_id)
        .await
        .expect("stock failed");
    assert_eq!(stock, dec!(5));
    let page = repo
        .list(&MovementListFilter::default(), &PageRequest::default())
        .await
        .expect("list failed");
    assert_eq!(page.meta.total, 1);
}

#[tokio::test]
async fn test_transfer_out_moves_stock_and_creates_payable() {
    let fx = fixture().await;
    let other_branch = common::create_branch(&fx.db, "East Branch").await;
    let repo = StockMovementRepository::new(fx.db.clone());

    repo.record(movement(&fx, MovementType::Arrival, dec!(30)), None)
        .await
        .expect("record failed");

    let mut input = movement(&fx, MovementType::TransferOut, dec!(12));
    input.reference_branch_id = Some(other_branch);
    let record = repo.record(input, None).await.expect("record failed");

    let source = repo
        .stock_level(fx.product_id, fx.branch_id)
        .await
        .expect("stock failed");
    let destination = repo
        .stock_level(fx.product_id, other_branch)
        .await
        .expect("stock failed");
    assert_eq!(source, dec!(18));
    assert_eq!(destination, dec!(12));

    let due = record.due.expect("due not created");
    assert_eq!(due.kind, DueKind::Branch);
    assert_eq!(due.counterparty_id, other_branch);
    assert_eq!(due.branch_id, fx.branch_id);
    assert_eq!(due.due_type, "payable");
    assert_eq!(
        due.due_date,
        Utc::now().date_naive() + Duration::days(15)
    );
}

#[tokio::test]
async fn test_transfer_in_creates_receivable() {
    let fx = fixture().await;
    let other_branch = common::create_branch(&fx.db, "West Branch").await;
    let repo = StockMovementRepository::new(fx.db.clone());

    let mut input = movement(&fx, MovementType::TransferIn, dec!(7));
    input.reference_branch_id = Some(other_branch);
    let record = repo.record(input, None).await.expect("record failed");

    let due = record.due.expect("due not created");
    assert_eq!(due.kind, DueKind::Branch);
    assert_eq!(due.due_type, "receivable");
    let stock = repo
        .stock_level(fx.product_id, fx.branch_id)
        .await
        .expect("stock failed");
    assert_eq!(stock, dec!(7));
}

#[tokio::test]
async fn test_adjustment_sets_absolute_and_cancel_restores() {
    let fx = fixture().await;
    let repo = StockMovementRepository::new(fx.db.clone());

    repo.record(movement(&fx, MovementType::Arrival, dec!(40)), None)
        .await
        .expect("record failed");

    let record = repo
        .record(movement(&fx, MovementType::Adjustment, dec!(25)), None)
        .await
        .expect("record failed");
    assert_eq!(record.movement.previous_quantity, Some(dec!(40)));
    assert_eq!(
        repo.stock_level(fx.product_id, fx.branch_id)
            .await
            .expect("stock failed"),
        dec!(25)
    );

    repo.cancel(record.movement.id).await.expect("cancel failed");
    assert_eq!(
        repo.stock_level(fx.product_id, fx.branch_id)
            .await
            .expect("stock failed"),
        dec!(40)
    );
}

#[tokio::test]
async fn test_cancel_reverts_stock_and_deletes_due_cascade() {
    let fx = fixture().await;
    let repo = StockMovementRepository::new(fx.db.clone());
    let dues = DueLedgerRepository::new(fx.db.clone());
    let payments = DuePaymentRepository::new(fx.db.clone());

    let mut input = movement(&fx, MovementType::Arrival, dec!(20));
    input.supplier_id = Some(fx.supplier_id);
    let record = repo.record(input, None).await.expect("record failed");
    let due = record.due.expect("due not created");

    payments
        .add(NewPayment {
            due: due.due_ref(),
            amount: dec!(50),
            payment_method: PaymentMethod::Cash,
            payment_date: Utc::now().date_naive(),
            reference_number: None,
            description: None,
            created_by: None,
        })
        .await
        .expect("payment failed");

    let cancelled = repo.cancel(record.movement.id).await.expect("cancel failed");
    assert_eq!(cancelled.status, "cancelled");

    assert_eq!(
        repo.stock_level(fx.product_id, fx.branch_id)
            .await
            .expect("stock failed"),
        Decimal::ZERO
    );
    let linked = dues
        .get_by_movement(record.movement.id)
        .await
        .expect("get_by_movement failed");
    assert!(linked.is_empty());
    let history = payments
        .list_for_due(due.due_ref())
        .await
        .expect("list failed");
    assert!(history.is_empty());

    let again = repo.cancel(record.movement.id).await;
    assert!(matches!(again, Err(MovementStoreError::AlreadyCancelled(_))));
}

#[tokio::test]
async fn test_update_quantity_resyncs_stock_and_due() {
    let fx = fixture().await;
    let repo = StockMovementRepository::new(fx.db.clone());

    let mut input = movement(&fx, MovementType::Arrival, dec!(10));
    input.supplier_id = Some(fx.supplier_id);
    let record = repo.record(input, None).await.expect("record failed");

    let updated = repo
        .update(
            record.movement.id,
            UpdateMovement {
                quantity: Some(dec!(15)),
                ..UpdateMovement::default()
            },
        )
        .await
        .expect("update failed");

    assert_eq!(updated.movement.quantity, dec!(15));
    assert_eq!(updated.movement.total_amount, dec!(150));
    assert_eq!(
        repo.stock_level(fx.product_id, fx.branch_id)
            .await
            .expect("stock failed"),
        dec!(15)
    );
    let due = updated.due.expect("due missing");
    assert_eq!(due.total_amount, dec!(150));
    assert_eq!(due.remaining_amount, dec!(150));
}

#[tokio::test]
async fn test_update_below_paid_amount_rejected() {
    let fx = fixture().await;
    let repo = StockMovementRepository::new(fx.db.clone());
    let payments = DuePaymentRepository::new(fx.db.clone());
    let dues = DueLedgerRepository::new(fx.db.clone());

    let mut input = movement(&fx, MovementType::Arrival, dec!(10));
    input.supplier_id = Some(fx.supplier_id);
    let record = repo.record(input, None).await.expect("record failed");
    let due = record.due.expect("due not created");

    payments
        .add(NewPayment {
            due: due.due_ref(),
            amount: dec!(80),
            payment_method: PaymentMethod::Cash,
            payment_date: Utc::now().date_naive(),
            reference_number: None,
            description: None,
            created_by: None,
        })
        .await
        .expect("payment failed");

    // New total of 50 would sit below the 80 already paid.
    let result = repo
        .update(
            record.movement.id,
            UpdateMovement {
                quantity: Some(dec!(5)),
                ..UpdateMovement::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(MovementStoreError::Due(DueStoreError::Due(
            DueError::PaidExceedsTotal { .. }
        )))
    ));

    // Rollback must leave the movement, stock, and due untouched.
    let reloaded = repo.get(record.movement.id).await.expect("get failed");
    assert_eq!(reloaded.movement.quantity, dec!(10));
    assert_eq!(
        repo.stock_level(fx.product_id, fx.branch_id)
            .await
            .expect("stock failed"),
        dec!(10)
    );
    let details = dues.get(due.due_ref()).await.expect("get failed");
    assert_eq!(details.due.total_amount, dec!(100));
    assert_eq!(details.due.paid_amount, dec!(80));
}

#[tokio::test]
async fn test_due_failure_rolls_back_movement() {
    let fx = fixture().await;
    let repo = StockMovementRepository::new(fx.db.clone());

    // Paid amount above the movement total violates the ledger invariant,
    // so the movement itself must not survive.
    let mut input = movement(&fx, MovementType::Arrival, dec!(10));
    input.supplier_id = Some(fx.supplier_id);
    input.paid_amount = dec!(500);
    let result = repo.record(input, None).await;
    assert!(matches!(
        result,
        Err(MovementStoreError::Due(DueStoreError::Due(
            DueError::PaidExceedsTotal { .. }
        )))
    ));

    let page = repo
        .list(&MovementListFilter::default(), &PageRequest::default())
        .await
        .expect("list failed");
    assert_eq!(page.meta.total, 0);
    assert_eq!(
        repo.stock_level(fx.product_id, fx.branch_id)
            .await
            .expect("stock failed"),
        Decimal::ZERO
    );
}

#[tokio::test]
async fn test_manual_stock_mode_skips_quantities_and_due() {
    let fx = fixture().await;
    let repo = StockMovementRepository::new(fx.db.clone());

    let mut input = movement(&fx, MovementType::Arrival, dec!(10));
    input.supplier_id = Some(fx.supplier_id);
    input.auto_update_product = false;
    let record = repo.record(input, None).await.expect("record failed");

    // With auto-update off the movement is a bare record: no stock
    // adjustment and no derived due.
    assert_eq!(
        repo.stock_level(fx.product_id, fx.branch_id)
            .await
            .expect("stock failed"),
        Decimal::ZERO
    );
    assert!(record.due.is_none());

    let dues = DueLedgerRepository::new(fx.db.clone());
    let linked = dues
        .get_by_movement(record.movement.id)
        .await
        .expect("get_by_movement failed");
    assert!(linked.is_empty());
}

#[tokio::test]
async fn test_record_rejects_unknown_references() {
    let fx = fixture().await;
    let repo = StockMovementRepository::new(fx.db.clone());

    let mut input = movement(&fx, MovementType::Arrival, dec!(10));
    input.product_id = Uuid::new_v4();
    let result = repo.record(input, None).await;
    assert!(matches!(
        result,
        Err(MovementStoreError::InvalidReference("Product", _))
    ));

    let mut input = movement(&fx, MovementType::Arrival, dec!(10));
    input.supplier_id = Some(Uuid::new_v4());
    let result = repo.record(input, None).await;
    assert!(matches!(
        result,
        Err(MovementStoreError::InvalidReference("Supplier", _))
    ));
}

#[tokio::test]
async fn test_list_filters_by_type_and_branch() {
    let fx = fixture().await;
    let other_branch = common::create_branch(&fx.db, "South Branch").await;
    let repo = StockMovementRepository::new(fx.db.clone());

    repo.record(movement(&fx, MovementType::Arrival, dec!(10)), None)
        .await
        .expect("record failed");
    let mut elsewhere = movement(&fx, MovementType::Arrival, dec!(5));
    elsewhere.branch_id = other_branch;
    repo.record(elsewhere, None).await.expect("record failed");

    let page = repo
        .list(
            &MovementListFilter {
                branch_id: Some(fx.branch_id),
                ..MovementListFilter::default()
            },
            &PageRequest::default(),
        )
        .await
        .expect("list failed");
    assert_eq!(page.meta.total, 1);

    let page = repo
        .list(
            &MovementListFilter {
                movement_type: Some(MovementType::Dispatch),
                ..MovementListFilter::default()
            },
            &PageRequest::default(),
        )
        .await
        .expect("list failed");
    assert_eq!(page.meta.total, 0);
}
