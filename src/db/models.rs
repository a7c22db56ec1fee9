//! Row types for sqlx. Kept separate from the domain entities so the
//! canonical definitions stay free of persistence concerns.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{AddOnCharge, Rental, Room, Tenant, Transaction, TransactionStatus};
use crate::ports::StoreError;

#[derive(Debug, FromRow)]
pub struct RentalRow {
    pub id: Uuid,
    pub room_id: Uuid,
    pub tenant_id: Uuid,
    pub base_price: i64,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub addon_ids: Vec<Uuid>,
}

impl From<RentalRow> for Rental {
    fn from(row: RentalRow) -> Self {
        Rental {
            id: row.id,
            room_id: row.room_id,
            tenant_id: row.tenant_id,
            base_price: row.base_price,
            joined_at: row.joined_at,
            left_at: row.left_at,
            addon_ids: row.addon_ids,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct AddOnRow {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
}

impl From<AddOnRow> for AddOnCharge {
    fn from(row: AddOnRow) -> Self {
        AddOnCharge {
            id: row.id,
            name: row.name,
            price: row.price,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct TenantRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct RoomRow {
    pub id: Uuid,
    pub hostel_name: String,
    pub number: String,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            hostel_name: row.hostel_name,
            number: row.number,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub tenant_id: Uuid,
    pub amount: i64,
    pub status: String,
    pub due_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub order_id: String,
    pub gateway_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, StoreError> {
        let status = TransactionStatus::parse(&row.status).ok_or_else(|| {
            StoreError::Database(format!(
                "transaction {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;

        Ok(Transaction {
            id: row.id,
            rental_id: row.rental_id,
            tenant_id: row.tenant_id,
            amount: row.amount,
            status,
            due_at: row.due_at,
            paid_at: row.paid_at,
            order_id: row.order_id,
            gateway_ref: row.gateway_ref,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
