//! Transaction (invoice) domain entity.
//! One billing period's payment obligation and its lifecycle status.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lifecycle status of an invoice. `Paid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Paid,
    Unpaid,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Unpaid => "unpaid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "paid" => Some(TransactionStatus::Paid),
            "unpaid" => Some(TransactionStatus::Unpaid),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a gateway notification to an internal status.
///
/// `capture` only settles when the fraud screen accepted it; a challenged
/// capture stays pending until a later notification resolves it. Unknown
/// statuses return `None` and must cause no state change.
pub fn map_gateway_status(
    transaction_status: &str,
    fraud_status: Option<&str>,
) -> Option<TransactionStatus> {
    match transaction_status {
        "capture" => match fraud_status {
            Some("accept") => Some(TransactionStatus::Paid),
            Some("challenge") => Some(TransactionStatus::Pending),
            Some("deny") => Some(TransactionStatus::Unpaid),
            _ => None,
        },
        "settlement" => Some(TransactionStatus::Paid),
        "pending" => Some(TransactionStatus::Pending),
        "deny" | "cancel" | "expire" => Some(TransactionStatus::Unpaid),
        _ => None,
    }
}

/// Domain entity representing one billing cycle's obligation.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub tenant_id: Uuid,
    /// Total owed: base price plus attached add-ons, in integer minor units.
    pub amount: i64,
    pub status: TransactionStatus,
    pub due_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    /// Our order identifier sent to the gateway; unique per issuance.
    pub order_id: String,
    /// Gateway-side transaction identifier, filled in by webhook payloads.
    pub gateway_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        rental_id: Uuid,
        tenant_id: Uuid,
        amount: i64,
        due_at: DateTime<Utc>,
        order_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            rental_id,
            tenant_id,
            amount,
            status: TransactionStatus::Pending,
            due_at,
            paid_at: None,
            order_id,
            gateway_ref: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Build the order identifier for a new invoice: rental id plus issue time,
/// unique per call since a rental is billed at most once per period.
pub fn build_order_id(rental_id: Uuid, now: DateTime<Utc>) -> String {
    format!("INV-{}-{}", rental_id.simple(), now.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_transaction_new_is_pending() {
        let due = Utc::now() + Duration::days(1);
        let tx = Transaction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            1_050_000,
            due,
            "INV-abc-123".to_string(),
        );

        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.amount, 1_050_000);
        assert_eq!(tx.due_at, due);
        assert!(tx.paid_at.is_none());
        assert!(tx.gateway_ref.is_none());
        assert!(tx.created_at <= Utc::now());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Paid,
            TransactionStatus::Unpaid,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TransactionStatus::parse("PAID"), None);
    }

    #[test]
    fn test_map_settlement_is_paid() {
        assert_eq!(
            map_gateway_status("settlement", None),
            Some(TransactionStatus::Paid)
        );
    }

    #[test]
    fn test_map_capture_follows_fraud_status() {
        assert_eq!(
            map_gateway_status("capture", Some("accept")),
            Some(TransactionStatus::Paid)
        );
        assert_eq!(
            map_gateway_status("capture", Some("challenge")),
            Some(TransactionStatus::Pending)
        );
        assert_eq!(
            map_gateway_status("capture", Some("deny")),
            Some(TransactionStatus::Unpaid)
        );
        assert_eq!(map_gateway_status("capture", None), None);
    }

    #[test]
    fn test_map_terminal_failures_are_unpaid() {
        for s in ["deny", "cancel", "expire"] {
            assert_eq!(map_gateway_status(s, None), Some(TransactionStatus::Unpaid));
        }
    }

    #[test]
    fn test_map_unknown_status_is_none() {
        assert_eq!(map_gateway_status("refund", None), None);
        assert_eq!(map_gateway_status("", None), None);
    }

    #[test]
    fn test_order_id_embeds_rental_and_time() {
        let rental_id = Uuid::new_v4();
        let now = Utc::now();
        let order_id = build_order_id(rental_id, now);
        assert!(order_id.starts_with("INV-"));
        assert!(order_id.contains(&rental_id.simple().to_string()));
        assert!(order_id.ends_with(&now.timestamp().to_string()));
    }
}
