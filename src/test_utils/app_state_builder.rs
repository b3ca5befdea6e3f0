//! Test app state builder for HTTP-level integration testing.
//!
//! This module provides `TestAppStateBuilder` which wires the use cases
//! exactly like startup does, but on in-memory mocks instead of Postgres
//! and the live provider client.

use std::sync::Arc;

use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::helpers::audit::AuditLog,
    application::use_cases::callback::CallbackProcessor,
    application::use_cases::charge::ChargeRequestHandler,
    application::use_cases::recurring::RecurringEngine,
    domain::entities::recurring_type::RecurringType,
    infra::config::GatewayConfig,
    test_utils::{
        InMemoryLedger, InMemoryMandateStore, InMemoryPendingStore, InMemorySubscriptionStore,
        MockPaymentProvider,
    },
};

/// Builder for creating `AppState` backed by in-memory mocks.
///
/// The mocks are created up front and shared with the built state, so a
/// test can keep handles for seeding and assertions:
///
/// ```ignore
/// let builder = TestAppStateBuilder::new();
/// let ledger = builder.ledger();
/// ledger.add_invoice(42, 7, "mollie");
///
/// let app_state = builder.build();
/// ```
pub struct TestAppStateBuilder {
    provider: Arc<MockPaymentProvider>,
    mandates: Arc<InMemoryMandateStore>,
    subscriptions: Arc<InMemorySubscriptionStore>,
    pending: Arc<InMemoryPendingStore>,
    ledger: Arc<InMemoryLedger>,
    active: bool,
    sandbox: bool,
    enable_recurring: bool,
    recurring_type: RecurringType,
}

impl TestAppStateBuilder {
    /// Create a builder for an active live-mode gateway with recurring
    /// payments enabled in manual mode.
    pub fn new() -> Self {
        Self {
            provider: Arc::new(MockPaymentProvider::new()),
            mandates: Arc::new(InMemoryMandateStore::new()),
            subscriptions: Arc::new(InMemorySubscriptionStore::new()),
            pending: Arc::new(InMemoryPendingStore::new()),
            ledger: Arc::new(InMemoryLedger::new()),
            active: true,
            sandbox: false,
            enable_recurring: true,
            recurring_type: RecurringType::Manual,
        }
    }

    /// Build a gateway with no usable API key for its mode.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Route everything through sandbox mode; audit lines get the sandbox
    /// marker and status overrides are honored for test transactions.
    pub fn sandbox(mut self) -> Self {
        self.sandbox = true;
        self
    }

    /// Provider mock handle, for scripting API responses.
    pub fn provider(&self) -> Arc<MockPaymentProvider> {
        self.provider.clone()
    }

    /// Ledger mock handle, for seeding invoices and reading postings.
    pub fn ledger(&self) -> Arc<InMemoryLedger> {
        self.ledger.clone()
    }

    /// Subscription store handle, for seeding and reading local rows.
    pub fn subscriptions(&self) -> Arc<InMemorySubscriptionStore> {
        self.subscriptions.clone()
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> AppState {
        let (live_key, test_key) = if self.active {
            ("live_dHar4XY7LxsDOtmnkVtjNVWXLSlXsM", "test_dHar4XY7LxsDOtmnkVtjNVWXLSlXsM")
        } else {
            ("", "")
        };
        let config = GatewayConfig {
            live_api_key: SecretString::new(live_key.into()),
            test_api_key: SecretString::new(test_key.into()),
            sandbox: self.sandbox,
            enable_recurring: self.enable_recurring,
            recurring_type: self.recurring_type,
            gateway_name: "mollie".to_string(),
            app_origin: "https://billing.example.com".parse().unwrap(),
            bind_addr: "127.0.0.1:3001".parse().unwrap(),
            database_url: String::new(),
        };

        let audit = AuditLog::new(self.ledger.clone(), config.gateway_name.clone(), self.sandbox);
        let engine = Arc::new(RecurringEngine::new(
            self.provider.clone(),
            self.mandates.clone(),
            self.subscriptions.clone(),
            self.pending.clone(),
            self.ledger.clone(),
            audit.clone(),
            config.webhook_url(),
        ));
        let callback = Arc::new(CallbackProcessor::new(
            self.provider.clone(),
            self.ledger.clone(),
            engine.clone(),
            self.subscriptions.clone(),
            self.pending.clone(),
            audit.clone(),
            config.gateway_name.clone(),
            self.active,
            self.sandbox,
            self.enable_recurring,
        ));
        let charges = Arc::new(ChargeRequestHandler::new(
            engine.clone(),
            self.subscriptions.clone(),
            self.ledger.clone(),
            audit,
            config.gateway_name.clone(),
            self.active,
            self.enable_recurring,
            self.recurring_type,
        ));

        AppState {
            config: Arc::new(config),
            callback,
            recurring: engine,
            charges,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
