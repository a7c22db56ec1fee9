//! Payment reconciliation for inbound gateway webhooks.
//!
//! The gateway signs each notification with
//! SHA-512(order_id + status_code + gross_amount + server_key); a payload
//! that fails verification is rejected before any lookup. Status updates go
//! through the store's conditional transition, so replayed or concurrently
//! delivered webhooks collapse to a single effective change.

use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha512};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{map_gateway_status, TransactionStatus};
use crate::ports::{StoreError, TransactionStore};

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayNotification {
    pub order_id: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    pub signature_key: String,
    pub status_code: String,
    pub gross_amount: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("webhook signature mismatch for order {0}")]
    InvalidSignature(String),
    #[error("no transaction for order {0}")]
    UnknownOrder(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// What a processed webhook did.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub order_id: String,
    /// Mapped internal status; `None` when the gateway status was unknown.
    pub status: Option<TransactionStatus>,
    /// Whether a row actually transitioned.
    pub changed: bool,
}

pub struct PaymentReconciler {
    store: Arc<dyn TransactionStore>,
    server_key: String,
}

impl PaymentReconciler {
    pub fn new(store: Arc<dyn TransactionStore>, server_key: String) -> Self {
        Self { store, server_key }
    }

    pub async fn process(
        &self,
        notification: &GatewayNotification,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let expected = self.expected_signature(
            &notification.order_id,
            &notification.status_code,
            &notification.gross_amount,
        );
        if !constant_time_eq(expected.as_bytes(), notification.signature_key.as_bytes()) {
            return Err(ReconcileError::InvalidSignature(
                notification.order_id.clone(),
            ));
        }

        let tx = self
            .store
            .find_by_order_id(&notification.order_id)
            .await?
            .ok_or_else(|| ReconcileError::UnknownOrder(notification.order_id.clone()))?;

        let mapped = match map_gateway_status(
            &notification.transaction_status,
            notification.fraud_status.as_deref(),
        ) {
            Some(status) => status,
            None => {
                warn!(
                    "Unknown gateway status '{}' for order {}, leaving transaction untouched",
                    notification.transaction_status, notification.order_id
                );
                return Ok(ReconcileOutcome {
                    order_id: notification.order_id.clone(),
                    status: None,
                    changed: false,
                });
            }
        };

        if mapped == tx.status {
            return Ok(ReconcileOutcome {
                order_id: notification.order_id.clone(),
                status: Some(mapped),
                changed: false,
            });
        }

        let changed = self
            .store
            .transition_status(
                &notification.order_id,
                mapped,
                notification.transaction_id.as_deref(),
                Utc::now(),
            )
            .await?;

        if changed {
            info!(
                "Order {} reconciled: {} -> {}",
                notification.order_id, tx.status, mapped
            );
        }

        Ok(ReconcileOutcome {
            order_id: notification.order_id.clone(),
            status: Some(mapped),
            changed,
        })
    }

    fn expected_signature(&self, order_id: &str, status_code: &str, gross_amount: &str) -> String {
        sign_notification(order_id, status_code, gross_amount, &self.server_key)
    }
}

/// Compare two byte strings without an early exit on the first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Signature a gateway would attach; exposed for tests and tooling.
pub fn sign_notification(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}
