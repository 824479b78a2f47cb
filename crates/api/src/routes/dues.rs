//! Due ledger routes.
//!
//! All three ledgers share one route surface; the `{kind}` path segment
//! selects supplier, branch, or customer dues.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use crate::response::{app_failure, created, failure, ok, ok_message, repo_failure};
use kasira_core::dues::{DueKind, DueRef, DueStatus};
use kasira_db::repositories::{
    CreateDueInput, DueLedgerRepository, DueListFilter, DueStoreError,
};
use kasira_shared::CallerContext;
use kasira_shared::types::PageRequest;

/// Creates the due ledger routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dues/{kind}", get(list_dues).post(create_due))
        .route("/dues/{kind}/summary", get(due_summary))
        .route("/dues/{kind}/{id}", get(get_due).delete(delete_due))
        .route("/dues/{kind}/{id}/cancel", post(cancel_due))
}

/// Parses the `{kind}` path segment into a ledger selector.
pub(crate) fn parse_kind(raw: &str) -> Result<DueKind, Response> {
    DueKind::from_str(raw).map_err(|_| {
        failure(
            400,
            "INVALID_DUE_KIND",
            &format!("'{raw}' is not a valid due kind (supplier, branch, customer)"),
        )
    })
}

fn due_store_failure(e: &DueStoreError) -> Response {
    repo_failure(e.http_status_code(), e.error_code(), &e.to_string())
}

/// Narrows the branch filter to what the caller may see. Scoped roles
/// are pinned to their own branch; super-admins pass through.
fn scoped_branch(ctx: &CallerContext, requested: Option<Uuid>) -> Result<Option<Uuid>, Response> {
    ctx.scoped_branch(requested).map_err(|e| app_failure(&e))
}

/// Query parameters for listing dues.
#[derive(Debug, Deserialize)]
pub struct ListDuesQuery {
    /// Page number (1-based).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
    /// Only dues against this counterparty.
    pub counterparty_id: Option<Uuid>,
    /// Only dues belonging to this branch.
    pub branch_id: Option<Uuid>,
    /// Only dues in this status.
    pub status: Option<DueStatus>,
    /// Only dues of this classification.
    pub due_type: Option<String>,
}

/// Query parameters for the ledger summary.
#[derive(Debug, Deserialize)]
pub struct DueSummaryQuery {
    /// Only dues against this counterparty.
    pub counterparty_id: Option<Uuid>,
    /// Only dues belonging to this branch.
    pub branch_id: Option<Uuid>,
}

/// Request body for creating a due directly.
#[derive(Debug, Deserialize)]
pub struct CreateDueRequest {
    /// The supplier, branch, or customer the due is against.
    pub counterparty_id: Uuid,
    /// The branch where the obligation arose.
    pub branch_id: Uuid,
    /// The movement that derived this due, if any.
    pub stock_movement_id: Option<Uuid>,
    /// Ledger-specific classification (stock_purchase, receivable, ...).
    pub due_type: String,
    /// The full obligated amount. Must be positive.
    pub total_amount: Decimal,
    /// Amount already paid. Defaults to zero.
    #[serde(default)]
    pub paid_amount: Decimal,
    /// When the due must be settled.
    pub due_date: NaiveDate,
    /// Free-text description.
    pub description: Option<String>,
}

/// GET `/dues/{kind}` - List dues within one ledger.
async fn list_dues(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(kind): Path<String>,
    Query(query): Query<ListDuesQuery>,
) -> Response {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let branch_id = match scoped_branch(&auth.context(), query.branch_id) {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = DueLedgerRepository::new((*state.db).clone());
    let filter = DueListFilter {
        counterparty_id: query.counterparty_id,
        branch_id,
        status: query.status,
        due_type: query.due_type,
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    };

    match repo.list(kind, &filter, &page).await {
        Ok(page) => ok("Dues retrieved", page),
        Err(e) => {
            error!(error = %e, %kind, "Failed to list dues");
            due_store_failure(&e)
        }
    }
}

/// POST `/dues/{kind}` - Create a due directly, without a backing movement.
async fn create_due(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(kind): Path<String>,
    Json(payload): Json<CreateDueRequest>,
) -> Response {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    if let Err(response) = scoped_branch(&auth.context(), Some(payload.branch_id)) {
        return response;
    }

    let repo = DueLedgerRepository::new((*state.db).clone());
    let input = CreateDueInput {
        kind,
        counterparty_id: payload.counterparty_id,
        branch_id: payload.branch_id,
        stock_movement_id: payload.stock_movement_id,
        due_type: payload.due_type,
        total_amount: payload.total_amount,
        paid_amount: payload.paid_amount,
        due_date: payload.due_date,
        description: payload.description,
    };

    match repo.create(input).await {
        Ok(due) => created("Due created", due),
        Err(e) => {
            error!(error = %e, %kind, "Failed to create due");
            due_store_failure(&e)
        }
    }
}

/// GET `/dues/{kind}/summary` - Aggregate totals over one ledger.
async fn due_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(kind): Path<String>,
    Query(query): Query<DueSummaryQuery>,
) -> Response {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let branch_id = match scoped_branch(&auth.context(), query.branch_id) {
        Ok(scope) => scope,
        Err(response) => return response,
    };

    let repo = DueLedgerRepository::new((*state.db).clone());
    let filter = DueListFilter {
        counterparty_id: query.counterparty_id,
        branch_id,
        ..DueListFilter::default()
    };
    match repo.summary(kind, &filter).await {
        Ok(summary) => ok("Due summary retrieved", summary),
        Err(e) => {
            error!(error = %e, %kind, "Failed to summarize dues");
            due_store_failure(&e)
        }
    }
}

/// GET `/dues/{kind}/{id}` - Fetch one due with its display labels.
async fn get_due(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Response {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    let repo = DueLedgerRepository::new((*state.db).clone());
    match repo.get(DueRef::new(kind, id)).await {
        Ok(due) => {
            if let Err(response) = scoped_branch(&auth.context(), Some(due.due.branch_id)) {
                return response;
            }
            ok("Due retrieved", due)
        }
        Err(e) => {
            error!(error = %e, %kind, %id, "Failed to get due");
            due_store_failure(&e)
        }
    }
}

/// POST `/dues/{kind}/{id}/cancel` - Cancel an unsettled due.
async fn cancel_due(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Response {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    let repo = DueLedgerRepository::new((*state.db).clone());
    let due = DueRef::new(kind, id);
    match repo.get(due).await {
        Ok(details) => {
            if let Err(response) = scoped_branch(&auth.context(), Some(details.due.branch_id)) {
                return response;
            }
        }
        Err(e) => {
            error!(error = %e, %kind, %id, "Failed to load due for cancel");
            return due_store_failure(&e);
        }
    }

    match repo.cancel(due).await {
        Ok(due) => ok("Due cancelled", due),
        Err(e) => {
            error!(error = %e, %kind, %id, "Failed to cancel due");
            due_store_failure(&e)
        }
    }
}

/// DELETE `/dues/{kind}/{id}` - Delete a due and its payment history.
///
/// Restricted to super-admins; deletion erases the audit trail.
async fn delete_due(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Response {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    if !auth.context().role.is_super_admin() {
        return failure(403, "PERMISSION_DENIED", "Only super-admins may delete dues");
    }

    let repo = DueLedgerRepository::new((*state.db).clone());
    match repo.delete(DueRef::new(kind, id)).await {
        Ok(()) => ok_message("Due deleted"),
        Err(e) => {
            error!(error = %e, %kind, %id, "Failed to delete due");
            due_store_failure(&e)
        }
    }
}
