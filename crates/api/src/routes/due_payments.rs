//! Due payment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Response,
    routing::{get, patch},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::routes::dues::parse_kind;
use crate::{AppState, middleware::AuthUser};
use crate::response::{app_failure, created, ok, repo_failure};
use kasira_core::dues::{DueRef, PaymentMethod};
use kasira_db::repositories::{
    DueLedgerRepository, DuePaymentRepository, NewPayment, PaymentError, UpdatePayment,
};

/// Creates the due payment routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/due-payments", get(list_payments).post(create_payment))
        .route("/due-payments/{id}", patch(update_payment).delete(delete_payment))
}

fn payment_failure(e: &PaymentError) -> Response {
    repo_failure(e.http_status_code(), e.error_code(), &e.to_string())
}

/// Loads the owning due and checks the caller may act within its
/// branch. Scoped roles may only touch payments of their own branch.
async fn authorize_due(state: &AppState, auth: &AuthUser, due: DueRef) -> Result<(), Response> {
    let repo = DueLedgerRepository::new((*state.db).clone());
    let details = repo.get(due).await.map_err(|e| {
        error!(error = %e, due_id = %due.id, "Failed to load due for payment access check");
        payment_failure(&PaymentError::from(e))
    })?;
    auth.context()
        .scoped_branch(Some(details.due.branch_id))
        .map(|_| ())
        .map_err(|e| app_failure(&e))
}

/// Checks the caller may touch an existing payment. Payments carry the
/// branch of the due they were recorded against.
async fn authorize_payment(
    repo: &DuePaymentRepository,
    auth: &AuthUser,
    id: Uuid,
) -> Result<(), Response> {
    let payment = repo.get(id).await.map_err(|e| {
        error!(error = %e, payment_id = %id, "Failed to load payment for access check");
        payment_failure(&e)
    })?;
    auth.context()
        .scoped_branch(Some(payment.branch_id))
        .map(|_| ())
        .map_err(|e| app_failure(&e))
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// Which ledger the due lives in: supplier, branch, or customer.
    pub due_kind: String,
    /// The due being paid.
    pub due_id: Uuid,
    /// Payment amount. Must be positive and within the remaining balance.
    pub amount: Decimal,
    /// How the payment was made.
    pub payment_method: PaymentMethod,
    /// When the payment was made. Defaults to today.
    pub payment_date: Option<NaiveDate>,
    /// External reference (receipt or transfer number).
    pub reference_number: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Query parameters for listing a due's payment history.
#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    /// Which ledger the due lives in.
    pub due_kind: String,
    /// The due whose history to list.
    pub due_id: Uuid,
}

/// Request body for correcting a payment. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    /// New payment amount.
    pub amount: Option<Decimal>,
    /// New payment method.
    pub payment_method: Option<PaymentMethod>,
    /// New payment date.
    pub payment_date: Option<NaiveDate>,
    /// New external reference.
    pub reference_number: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// POST `/due-payments` - Record a payment against a due.
async fn create_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> Response {
    let kind = match parse_kind(&payload.due_kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    if let Err(response) = authorize_due(&state, &auth, DueRef::new(kind, payload.due_id)).await {
        return response;
    }

    let repo = DuePaymentRepository::new((*state.db).clone());
    let input = NewPayment {
        due: DueRef::new(kind, payload.due_id),
        amount: payload.amount,
        payment_method: payload.payment_method,
        payment_date: payload
            .payment_date
            .unwrap_or_else(|| Utc::now().date_naive()),
        reference_number: payload.reference_number,
        description: payload.description,
        created_by: Some(auth.user_id()),
    };

    match repo.add(input).await {
        Ok(record) => created("Payment recorded", record),
        Err(e) => {
            error!(error = %e, due_id = %payload.due_id, "Failed to record payment");
            payment_failure(&e)
        }
    }
}

/// GET `/due-payments` - List a due's payment history, newest first.
async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListPaymentsQuery>,
) -> Response {
    let kind = match parse_kind(&query.due_kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    if let Err(response) = authorize_due(&state, &auth, DueRef::new(kind, query.due_id)).await {
        return response;
    }

    let repo = DuePaymentRepository::new((*state.db).clone());
    match repo.list_for_due(DueRef::new(kind, query.due_id)).await {
        Ok(payments) => ok("Payments retrieved", payments),
        Err(e) => {
            error!(error = %e, due_id = %query.due_id, "Failed to list payments");
            payment_failure(&e)
        }
    }
}

/// PATCH `/due-payments/{id}` - Correct a payment; the due is re-balanced.
async fn update_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> Response {
    let repo = DuePaymentRepository::new((*state.db).clone());
    if let Err(response) = authorize_payment(&repo, &auth, id).await {
        return response;
    }
    let changes = UpdatePayment {
        amount: payload.amount,
        payment_method: payload.payment_method,
        payment_date: payload.payment_date,
        reference_number: payload.reference_number.map(Some),
        description: payload.description.map(Some),
    };

    match repo.update(id, changes).await {
        Ok(record) => ok("Payment updated", record),
        Err(e) => {
            error!(error = %e, payment_id = %id, "Failed to update payment");
            payment_failure(&e)
        }
    }
}

/// DELETE `/due-payments/{id}` - Reverse a payment and restore the due's balance.
async fn delete_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    let repo = DuePaymentRepository::new((*state.db).clone());
    if let Err(response) = authorize_payment(&repo, &auth, id).await {
        return response;
    }
    match repo.delete(id).await {
        Ok(due) => ok("Payment reversed", due),
        Err(e) => {
            error!(error = %e, payment_id = %id, "Failed to delete payment");
            payment_failure(&e)
        }
    }
}
