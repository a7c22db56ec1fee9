//! Repository interfaces the services depend on.
//! Concrete stores (Postgres in production, in-memory in tests) implement
//! these; callers never touch a database client directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AddOnCharge, Rental, Room, Tenant, Transaction, TransactionStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".to_string()),
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Read access to rental agreements and the entities they reference.
#[async_trait]
pub trait RentalStore: Send + Sync {
    /// All rentals with no leave timestamp.
    async fn list_active_rentals(&self) -> Result<Vec<Rental>, StoreError>;

    /// Add-on charges attached to a rental, in attachment order.
    async fn addons_for_rental(&self, rental_id: Uuid) -> Result<Vec<AddOnCharge>, StoreError>;

    async fn get_tenant(&self, tenant_id: Uuid) -> Result<Tenant, StoreError>;

    async fn get_room(&self, room_id: Uuid) -> Result<Room, StoreError>;
}

/// Persistence for invoices.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert_transaction(&self, tx: &Transaction) -> Result<(), StoreError>;

    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, StoreError>;

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Transaction>, StoreError>;

    async fn list_transactions(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// Whether any invoice was issued for `rental_id` at or after `since`.
    /// Scopes the duplicate-invoice guard to the current billing period.
    async fn has_transaction_since(
        &self,
        rental_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Atomically move the invoice identified by `order_id` to `status`,
    /// stamping `paid_at` when entering `Paid`. Must be a single conditional
    /// write: no change when the stored status already equals `status` or is
    /// already `Paid`. Returns whether a row actually changed.
    async fn transition_status(
        &self,
        order_id: &str,
        status: TransactionStatus,
        gateway_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}
