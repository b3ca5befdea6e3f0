//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid payment fixtures
//! - In-memory implementations of the provider, ledger and store traits
//! - A builder for constructing `AppState` on top of those mocks

mod app_state_builder;
mod factories;
mod ledger_mock;
mod provider_mock;
mod store_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use ledger_mock::*;
pub use provider_mock::*;
pub use store_mocks::*;
