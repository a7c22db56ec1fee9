pub mod rental;
pub mod transaction;

pub use rental::{AddOnCharge, Rental, Room, Tenant};
pub use transaction::{map_gateway_status, Transaction, TransactionStatus};
