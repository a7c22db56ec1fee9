mod common;

use chrono::{Duration, Utc};
use common::MemoryStore;
use std::sync::Arc;
use uuid::Uuid;

use pondok_core::domain::{Transaction, TransactionStatus};
use pondok_core::services::reconciliation::{
    sign_notification, GatewayNotification, PaymentReconciler, ReconcileError,
};

const SERVER_KEY: &str = "test-server-key";

fn pending_transaction(order_id: &str) -> Transaction {
    Transaction::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        1_050_000,
        Utc::now() + Duration::days(1),
        order_id.to_string(),
    )
}

fn notification(order_id: &str, transaction_status: &str) -> GatewayNotification {
    let status_code = "200";
    let gross_amount = "1050000.00";
    GatewayNotification {
        order_id: order_id.to_string(),
        transaction_status: transaction_status.to_string(),
        fraud_status: None,
        signature_key: sign_notification(order_id, status_code, gross_amount, SERVER_KEY),
        status_code: status_code.to_string(),
        gross_amount: gross_amount.to_string(),
        transaction_id: Some("gw-tx-1".to_string()),
    }
}

fn reconciler(store: Arc<MemoryStore>) -> PaymentReconciler {
    PaymentReconciler::new(store, SERVER_KEY.to_string())
}

#[tokio::test]
async fn test_settlement_marks_paid_and_stamps_paid_at() {
    let store = Arc::new(MemoryStore::new());
    store.add_transaction(pending_transaction("order-1"));

    let outcome = reconciler(store.clone())
        .process(&notification("order-1", "settlement"))
        .await
        .unwrap();

    assert!(outcome.changed);
    assert_eq!(outcome.status, Some(TransactionStatus::Paid));

    let tx = store.transaction_by_order("order-1").unwrap();
    assert_eq!(tx.status, TransactionStatus::Paid);
    assert!(tx.paid_at.is_some());
    assert_eq!(tx.gateway_ref.as_deref(), Some("gw-tx-1"));
}

#[tokio::test]
async fn test_settlement_replay_is_noop() {
    let store = Arc::new(MemoryStore::new());
    store.add_transaction(pending_transaction("order-1"));
    let reconciler = reconciler(store.clone());
    let payload = notification("order-1", "settlement");

    let first = reconciler.process(&payload).await.unwrap();
    assert!(first.changed);
    let paid_at = store.transaction_by_order("order-1").unwrap().paid_at;

    let second = reconciler.process(&payload).await.unwrap();
    assert!(!second.changed);
    // Exactly one transition, one timestamp assignment.
    assert_eq!(store.transaction_by_order("order-1").unwrap().paid_at, paid_at);
}

#[tokio::test]
async fn test_expire_marks_unpaid_without_paid_at() {
    let store = Arc::new(MemoryStore::new());
    store.add_transaction(pending_transaction("order-2"));

    let outcome = reconciler(store.clone())
        .process(&notification("order-2", "expire"))
        .await
        .unwrap();

    assert!(outcome.changed);
    let tx = store.transaction_by_order("order-2").unwrap();
    assert_eq!(tx.status, TransactionStatus::Unpaid);
    assert!(tx.paid_at.is_none());
}

#[tokio::test]
async fn test_capture_requires_fraud_accept() {
    let store = Arc::new(MemoryStore::new());
    store.add_transaction(pending_transaction("order-3"));
    let reconciler = reconciler(store.clone());

    let mut challenged = notification("order-3", "capture");
    challenged.fraud_status = Some("challenge".to_string());
    let outcome = reconciler.process(&challenged).await.unwrap();
    assert!(!outcome.changed);
    assert_eq!(
        store.transaction_by_order("order-3").unwrap().status,
        TransactionStatus::Pending
    );

    let mut accepted = notification("order-3", "capture");
    accepted.fraud_status = Some("accept".to_string());
    let outcome = reconciler.process(&accepted).await.unwrap();
    assert!(outcome.changed);
    assert_eq!(
        store.transaction_by_order("order-3").unwrap().status,
        TransactionStatus::Paid
    );
}

#[tokio::test]
async fn test_invalid_signature_rejected_without_state_change() {
    let store = Arc::new(MemoryStore::new());
    store.add_transaction(pending_transaction("order-4"));

    let mut payload = notification("order-4", "settlement");
    payload.signature_key = "deadbeef".to_string();

    let err = reconciler(store.clone()).process(&payload).await.unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidSignature(_)));
    assert_eq!(
        store.transaction_by_order("order-4").unwrap().status,
        TransactionStatus::Pending
    );
}

#[tokio::test]
async fn test_unknown_order_rejected() {
    let store = Arc::new(MemoryStore::new());

    let err = reconciler(store)
        .process(&notification("no-such-order", "settlement"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::UnknownOrder(_)));
}

#[tokio::test]
async fn test_unknown_gateway_status_leaves_state_untouched() {
    let store = Arc::new(MemoryStore::new());
    store.add_transaction(pending_transaction("order-5"));

    let outcome = reconciler(store.clone())
        .process(&notification("order-5", "refund"))
        .await
        .unwrap();

    assert!(!outcome.changed);
    assert_eq!(outcome.status, None);
    assert_eq!(
        store.transaction_by_order("order-5").unwrap().status,
        TransactionStatus::Pending
    );
}

#[tokio::test]
async fn test_paid_is_terminal() {
    let store = Arc::new(MemoryStore::new());
    store.add_transaction(pending_transaction("order-6"));
    let reconciler = reconciler(store.clone());

    reconciler
        .process(&notification("order-6", "settlement"))
        .await
        .unwrap();

    // A late expire for an already-settled order must not regress it.
    let outcome = reconciler
        .process(&notification("order-6", "expire"))
        .await
        .unwrap();
    assert!(!outcome.changed);
    assert_eq!(
        store.transaction_by_order("order-6").unwrap().status,
        TransactionStatus::Paid
    );
}
