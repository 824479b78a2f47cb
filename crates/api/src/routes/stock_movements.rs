//! Stock movement routes.
//!
//! Recording, correcting, and cancelling movements; each mutation keeps
//! stock quantities and the derived dues consistent in one transaction.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Response,
    routing::{get, patch, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use crate::response::{app_failure, created, ok, repo_failure};
use kasira_core::stock::{MovementType, NewMovement};
use kasira_db::repositories::{
    DueLedgerRepository, MovementStoreError, StockMovementRepository, UpdateMovement,
};
use kasira_shared::CallerContext;

/// Creates the stock movement routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stock-movements", post(create_movement))
        .route("/stock-movements/{id}", patch(update_movement))
        .route("/stock-movements/{id}/cancel", post(cancel_movement))
        .route("/stock-movements/{id}/due", get(get_movement_due))
}

fn movement_failure(e: &MovementStoreError) -> Response {
    repo_failure(e.http_status_code(), e.error_code(), &e.to_string())
}

/// Rejects callers operating on a branch outside their scope.
fn check_branch_scope(ctx: &CallerContext, branch_id: Uuid) -> Result<(), Response> {
    ctx.scoped_branch(Some(branch_id))
        .map(|_| ())
        .map_err(|e| app_failure(&e))
}

/// Request body for recording a stock movement.
#[derive(Debug, Deserialize)]
pub struct CreateMovementRequest {
    /// The kind of movement: arrival, dispatch, transfer_in, transfer_out,
    /// adjustment.
    pub movement_type: MovementType,
    /// The product being moved.
    pub product_id: Uuid,
    /// The branch the movement happens at.
    pub branch_id: Uuid,
    /// The other branch for transfer types.
    pub reference_branch_id: Option<Uuid>,
    /// The supplier for arrivals that obligate a due.
    pub supplier_id: Option<Uuid>,
    /// Quantity moved (absolute quantity for adjustments).
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Explicit total; computed as `quantity * unit_price` when absent.
    pub total_amount: Option<Decimal>,
    /// Amount already paid at recording time. Defaults to zero.
    #[serde(default)]
    pub paid_amount: Decimal,
    /// Whether stock quantities are updated automatically. Defaults to true.
    #[serde(default = "default_auto_update")]
    pub auto_update_product: bool,
    /// Free-text description.
    pub description: Option<String>,
}

const fn default_auto_update() -> bool {
    true
}

/// Request body for correcting a movement. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateMovementRequest {
    /// New quantity.
    pub quantity: Option<Decimal>,
    /// New unit price.
    pub unit_price: Option<Decimal>,
    /// Explicit new total. Otherwise recomputed when quantity or price change.
    pub total_amount: Option<Decimal>,
    /// New description.
    pub description: Option<String>,
}

/// POST `/stock-movements` - Record a movement with its stock effects and
/// derived due.
async fn create_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateMovementRequest>,
) -> Response {
    if let Err(response) = check_branch_scope(&auth.context(), payload.branch_id) {
        return response;
    }

    let repo = StockMovementRepository::new((*state.db).clone());
    let input = NewMovement {
        movement_type: payload.movement_type,
        product_id: payload.product_id,
        branch_id: payload.branch_id,
        reference_branch_id: payload.reference_branch_id,
        supplier_id: payload.supplier_id,
        quantity: payload.quantity,
        unit_price: payload.unit_price,
        total_amount: payload.total_amount,
        paid_amount: payload.paid_amount,
        auto_update_product: payload.auto_update_product,
        description: payload.description,
    };

    match repo.record(input, Some(auth.user_id())).await {
        Ok(record) => {
            info!(
                movement_id = %record.movement.id,
                movement_type = %record.movement.movement_type,
                "Stock movement recorded"
            );
            created("Stock movement recorded", record)
        }
        Err(e) => {
            error!(error = %e, "Failed to record stock movement");
            movement_failure(&e)
        }
    }
}

/// PATCH `/stock-movements/{id}` - Correct quantity, price, or total; stock
/// and the linked due are resynced.
async fn update_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMovementRequest>,
) -> Response {
    let repo = StockMovementRepository::new((*state.db).clone());
    if let Err(response) = check_movement_scope(&repo, &auth.context(), id).await {
        return response;
    }

    let changes = UpdateMovement {
        quantity: payload.quantity,
        unit_price: payload.unit_price,
        total_amount: payload.total_amount,
        description: payload.description.map(Some),
    };

    match repo.update(id, changes).await {
        Ok(record) => ok("Stock movement updated", record),
        Err(e) => {
            error!(error = %e, movement_id = %id, "Failed to update stock movement");
            movement_failure(&e)
        }
    }
}

/// POST `/stock-movements/{id}/cancel` - Cancel a movement; stock effects
/// are reverted and the derived dues removed.
async fn cancel_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    let repo = StockMovementRepository::new((*state.db).clone());
    if let Err(response) = check_movement_scope(&repo, &auth.context(), id).await {
        return response;
    }

    match repo.cancel(id).await {
        Ok(movement) => {
            info!(movement_id = %id, "Stock movement cancelled");
            ok("Stock movement cancelled", movement)
        }
        Err(e) => {
            error!(error = %e, movement_id = %id, "Failed to cancel stock movement");
            movement_failure(&e)
        }
    }
}

/// GET `/stock-movements/{id}/due` - The dues a movement derived, if any.
async fn get_movement_due(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    let movements = StockMovementRepository::new((*state.db).clone());
    if let Err(response) = check_movement_scope(&movements, &auth.context(), id).await {
        return response;
    }

    let dues = DueLedgerRepository::new((*state.db).clone());
    match dues.get_by_movement(id).await {
        Ok(linked) => ok("Linked dues retrieved", linked),
        Err(e) => {
            error!(error = %e, movement_id = %id, "Failed to get linked dues");
            repo_failure(e.http_status_code(), e.error_code(), &e.to_string())
        }
    }
}

/// Loads the movement and rejects callers outside its branch scope.
async fn check_movement_scope(
    repo: &StockMovementRepository,
    ctx: &CallerContext,
    movement_id: Uuid,
) -> Result<(), Response> {
    match repo.get(movement_id).await {
        Ok(record) => check_branch_scope(ctx, record.movement.branch_id),
        Err(e) => {
            error!(error = %e, %movement_id, "Failed to load stock movement");
            Err(movement_failure(&e))
        }
    }
}
