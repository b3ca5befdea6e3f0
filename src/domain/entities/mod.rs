pub mod amount;
pub mod mandate;
pub mod payment_mode;
pub mod payment_status;
pub mod pending_transaction;
pub mod recurring_type;
pub mod sequence_type;
pub mod subscription;
