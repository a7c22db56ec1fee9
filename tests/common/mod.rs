#![allow(dead_code)]

//! In-memory store shared by the integration tests. Implements the same
//! port traits as `PgStore`, including the conditional status transition.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use pondok_core::domain::{
    AddOnCharge, Rental, Room, Tenant, Transaction, TransactionStatus,
};
use pondok_core::ports::{RentalStore, StoreError, TransactionStore};

#[derive(Default)]
pub struct MemoryStore {
    pub rentals: Mutex<Vec<Rental>>,
    pub rental_addons: Mutex<HashMap<Uuid, Vec<AddOnCharge>>>,
    pub tenants: Mutex<HashMap<Uuid, Tenant>>,
    pub rooms: Mutex<HashMap<Uuid, Room>>,
    pub transactions: Mutex<Vec<Transaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rental(&self, rental: Rental) {
        self.rentals.lock().unwrap().push(rental);
    }

    pub fn add_tenant(&self, tenant: Tenant) {
        self.tenants.lock().unwrap().insert(tenant.id, tenant);
    }

    pub fn add_room(&self, room: Room) {
        self.rooms.lock().unwrap().insert(room.id, room);
    }

    pub fn attach_addon(&self, rental_id: Uuid, addon: AddOnCharge) {
        self.rental_addons
            .lock()
            .unwrap()
            .entry(rental_id)
            .or_default()
            .push(addon);
    }

    pub fn add_transaction(&self, tx: Transaction) {
        self.transactions.lock().unwrap().push(tx);
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.lock().unwrap().len()
    }

    pub fn transaction_by_order(&self, order_id: &str) -> Option<Transaction> {
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.order_id == order_id)
            .cloned()
    }
}

#[async_trait]
impl RentalStore for MemoryStore {
    async fn list_active_rentals(&self) -> Result<Vec<Rental>, StoreError> {
        Ok(self
            .rentals
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_active())
            .cloned()
            .collect())
    }

    async fn addons_for_rental(&self, rental_id: Uuid) -> Result<Vec<AddOnCharge>, StoreError> {
        Ok(self
            .rental_addons
            .lock()
            .unwrap()
            .get(&rental_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_tenant(&self, tenant_id: Uuid) -> Result<Tenant, StoreError> {
        self.tenants
            .lock()
            .unwrap()
            .get(&tenant_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("tenant {} not found", tenant_id)))
    }

    async fn get_room(&self, room_id: Uuid) -> Result<Room, StoreError> {
        self.rooms
            .lock()
            .unwrap()
            .get(&room_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("room {} not found", room_id)))
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn insert_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        self.transactions.lock().unwrap().push(tx.clone());
        Ok(())
    }

    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, StoreError> {
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("transaction {} not found", id)))
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Transaction>, StoreError> {
        Ok(self.transaction_by_order(order_id))
    }

    async fn list_transactions(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, StoreError> {
        let txs = self.transactions.lock().unwrap();
        Ok(txs
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn has_transaction_since(
        &self,
        rental_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .any(|t| t.rental_id == rental_id && t.created_at >= since))
    }

    async fn transition_status(
        &self,
        order_id: &str,
        status: TransactionStatus,
        gateway_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut txs = self.transactions.lock().unwrap();
        let Some(tx) = txs.iter_mut().find(|t| t.order_id == order_id) else {
            return Ok(false);
        };

        if tx.status == status || tx.status == TransactionStatus::Paid {
            return Ok(false);
        }

        tx.status = status;
        if status == TransactionStatus::Paid {
            tx.paid_at = Some(now);
        }
        if let Some(gateway_ref) = gateway_ref {
            tx.gateway_ref = Some(gateway_ref.to_string());
        }
        tx.updated_at = now;
        Ok(true)
    }
}

pub fn sample_tenant() -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        name: "Siti Rahma".to_string(),
        email: "siti@example.com".to_string(),
        phone: "0812345678".to_string(),
    }
}

pub fn sample_room() -> Room {
    Room {
        id: Uuid::new_v4(),
        hostel_name: "Pondok Melati".to_string(),
        number: "A-12".to_string(),
    }
}

pub fn sample_rental(tenant_id: Uuid, room_id: Uuid, joined_days_ago: i64) -> Rental {
    Rental {
        id: Uuid::new_v4(),
        room_id,
        tenant_id,
        base_price: 1_000_000,
        joined_at: Utc::now() - Duration::days(joined_days_ago),
        left_at: None,
        addon_ids: vec![],
    }
}
