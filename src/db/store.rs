//! Postgres implementation of the store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{AddOnRow, RentalRow, RoomRow, TenantRow, TransactionRow};
use crate::domain::{AddOnCharge, Rental, Room, Tenant, Transaction, TransactionStatus};
use crate::ports::{RentalStore, StoreError, TransactionStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RentalStore for PgStore {
    async fn list_active_rentals(&self) -> Result<Vec<Rental>, StoreError> {
        let rows = sqlx::query_as::<_, RentalRow>(
            r#"
            SELECT r.id, r.room_id, r.tenant_id, r.base_price, r.joined_at, r.left_at,
                   COALESCE(
                       array_agg(ra.addon_id ORDER BY ra.position)
                           FILTER (WHERE ra.addon_id IS NOT NULL),
                       '{}'
                   ) AS addon_ids
            FROM rentals r
            LEFT JOIN rental_addons ra ON ra.rental_id = r.id
            WHERE r.left_at IS NULL
            GROUP BY r.id
            ORDER BY r.joined_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Rental::from).collect())
    }

    async fn addons_for_rental(&self, rental_id: Uuid) -> Result<Vec<AddOnCharge>, StoreError> {
        let rows = sqlx::query_as::<_, AddOnRow>(
            r#"
            SELECT a.id, a.name, a.price
            FROM addons a
            JOIN rental_addons ra ON ra.addon_id = a.id
            WHERE ra.rental_id = $1
            ORDER BY ra.position
            "#,
        )
        .bind(rental_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AddOnCharge::from).collect())
    }

    async fn get_tenant(&self, tenant_id: Uuid) -> Result<Tenant, StoreError> {
        let row = sqlx::query_as::<_, TenantRow>(
            "SELECT id, name, email, phone FROM tenants WHERE id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("tenant {} not found", tenant_id)))?;

        Ok(row.into())
    }

    async fn get_room(&self, room_id: Uuid) -> Result<Room, StoreError> {
        let row = sqlx::query_as::<_, RoomRow>(
            "SELECT id, hostel_name, number FROM rooms WHERE id = $1",
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("room {} not found", room_id)))?;

        Ok(row.into())
    }
}

#[async_trait]
impl TransactionStore for PgStore {
    async fn insert_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions
                (id, rental_id, tenant_id, amount, status, due_at, paid_at,
                 order_id, gateway_ref, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(tx.id)
        .bind(tx.rental_id)
        .bind(tx.tenant_id)
        .bind(tx.amount)
        .bind(tx.status.as_str())
        .bind(tx.due_at)
        .bind(tx.paid_at)
        .bind(&tx.order_id)
        .bind(&tx.gateway_ref)
        .bind(tx.created_at)
        .bind(tx.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, StoreError> {
        let row = sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("transaction {} not found", id)))?;

        row.try_into()
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Transaction>, StoreError> {
        let row =
            sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE order_id = $1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn list_transactions(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn has_transaction_since(
        &self,
        rental_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE rental_id = $1 AND created_at >= $2)",
        )
        .bind(rental_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn transition_status(
        &self,
        order_id: &str,
        status: TransactionStatus,
        gateway_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        // Single conditional write: replayed webhooks and concurrent
        // deliveries collapse to one effective transition, and 'paid' stays
        // terminal.
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = $2,
                paid_at = CASE WHEN $2 = 'paid' THEN $3 ELSE paid_at END,
                gateway_ref = COALESCE($4, gateway_ref),
                updated_at = $3
            WHERE order_id = $1 AND status <> $2 AND status <> 'paid'
            "#,
        )
        .bind(order_id)
        .bind(status.as_str())
        .bind(now)
        .bind(gateway_ref)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
