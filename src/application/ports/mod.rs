pub mod ledger;
pub mod payment_provider;
