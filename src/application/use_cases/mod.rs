pub mod callback;
pub mod charge;
pub mod recurring;
