pub mod app_error;
pub mod helpers;
pub mod ports;
pub mod use_cases;
