use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::services::reconciliation::{GatewayNotification, ReconcileError};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
}

/// Inbound payment-gateway webhook. The gateway delivers at-least-once;
/// replays are safe because the reconciler only writes when the status
/// actually changes.
pub async fn callback(
    State(state): State<AppState>,
    Json(payload): Json<GatewayNotification>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        "Gateway webhook for order {} ({})",
        payload.order_id,
        payload.transaction_status
    );

    match state.reconciler.process(&payload).await {
        Ok(outcome) => {
            let message = match (outcome.status, outcome.changed) {
                (Some(status), true) => format!("order {} is now {}", outcome.order_id, status),
                (Some(status), false) => format!("order {} already {}", outcome.order_id, status),
                (None, _) => format!("order {} unchanged", outcome.order_id),
            };
            Ok(Json(WebhookResponse {
                success: true,
                message,
            }))
        }
        Err(ReconcileError::InvalidSignature(order_id)) => Err(AppError::Unauthorized(format!(
            "invalid signature for order {}",
            order_id
        ))),
        Err(ReconcileError::UnknownOrder(order_id)) => Err(AppError::NotFound(format!(
            "no transaction for order {}",
            order_id
        ))),
        Err(ReconcileError::Store(e)) => Err(e.into()),
    }
}
