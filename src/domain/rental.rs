//! Rental aggregate and the entities it references.
//! Canonical definitions; the persistence layer maps rows into these.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One tenant occupying one room at an agreed monthly price.
/// `left_at = None` means the rental is active. Rentals are never deleted;
/// vacating a room sets `left_at`.
#[derive(Debug, Clone)]
pub struct Rental {
    pub id: Uuid,
    pub room_id: Uuid,
    pub tenant_id: Uuid,
    /// Base monthly price in integer minor units (IDR).
    pub base_price: i64,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    /// Add-on charges attached to this rental, in attachment order.
    pub addon_ids: Vec<Uuid>,
}

impl Rental {
    pub fn is_active(&self) -> bool {
        self.left_at.is_none()
    }
}

/// Named recurring charge attachable to any number of rentals.
#[derive(Debug, Clone)]
pub struct AddOnCharge {
    pub id: Uuid,
    pub name: String,
    /// Price per billing period in integer minor units.
    pub price: i64,
}

#[derive(Debug, Clone)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: Uuid,
    pub hostel_name: String,
    pub number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rental(left_at: Option<DateTime<Utc>>) -> Rental {
        Rental {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            base_price: 1_000_000,
            joined_at: Utc::now() - Duration::days(40),
            left_at,
            addon_ids: vec![],
        }
    }

    #[test]
    fn test_rental_active_without_leave_date() {
        assert!(rental(None).is_active());
    }

    #[test]
    fn test_rental_inactive_after_leaving() {
        assert!(!rental(Some(Utc::now())).is_active());
    }
}
