//! Owner/operator surface: trigger billing outside the schedule.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::transactions::TransactionSchema;
use crate::AppState;

/// Run the full billing batch immediately.
pub async fn run_billing(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = state.billing.run_batch().await?;

    Ok(Json(summary))
}

/// Issue an invoice for a single rental now, e.g. after fixing its data.
/// Responds 400 when the rental is not due for billing.
pub async fn bill_rental(
    State(state): State<AppState>,
    Path(rental_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let issued = state.billing.bill_rental(rental_id).await?;

    match issued {
        Some(tx) => Ok(Json(TransactionSchema::from(tx))),
        None => Err(AppError::BadRequest(format!(
            "rental {} is not due for billing",
            rental_id
        ))),
    }
}
