use std::net::SocketAddr;

use env_helpers::{get_env, get_env_default};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::domain::entities::payment_mode::PaymentMode;
use crate::domain::entities::recurring_type::RecurringType;

pub struct GatewayConfig {
    pub live_api_key: SecretString,
    pub test_api_key: SecretString,
    /// Sandbox routes every provider call to the test key and prefixes
    /// audit-log lines with a sandbox marker.
    pub sandbox: bool,
    pub enable_recurring: bool,
    pub recurring_type: RecurringType,
    /// Payment method name invoices are bound to in the billing host.
    pub gateway_name: String,
    /// Public origin of this service; the provider calls the webhook
    /// endpoint under it.
    pub app_origin: Url,
    pub bind_addr: SocketAddr,
    pub database_url: String,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let live_api_key: String = get_env_default("MOLLIE_LIVE_API_KEY", String::new());
        if let Err(e) = PaymentMode::validate_api_key(&live_api_key, PaymentMode::Live) {
            panic!("{e}");
        }
        let test_api_key: String = get_env_default("MOLLIE_TEST_API_KEY", String::new());
        if let Err(e) = PaymentMode::validate_api_key(&test_api_key, PaymentMode::Test) {
            panic!("{e}");
        }

        let sandbox: bool = get_env_default("MOLLIE_SANDBOX", false);
        let enable_recurring: bool = get_env_default("MOLLIE_ENABLE_RECURRING", true);
        let recurring_type: RecurringType =
            get_env_default("MOLLIE_RECURRING_TYPE", RecurringType::Manual);
        let gateway_name: String = get_env_default("GATEWAY_NAME", "mollie".to_string());

        let app_origin: Url = get_env("APP_ORIGIN");
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let database_url: String = get_env("DATABASE_URL");

        Self {
            live_api_key: SecretString::new(live_api_key.into()),
            test_api_key: SecretString::new(test_api_key.into()),
            sandbox,
            enable_recurring,
            recurring_type,
            gateway_name,
            app_origin,
            bind_addr,
            database_url,
        }
    }

    /// Key used for provider calls; sandbox always selects the test key.
    pub fn api_key(&self) -> &SecretString {
        if self.sandbox {
            &self.test_api_key
        } else {
            &self.live_api_key
        }
    }

    /// A gateway with no usable credential for its mode is inactive: the
    /// webhook answers 503 and charges are refused.
    pub fn is_active(&self) -> bool {
        !self.api_key().expose_secret().is_empty()
    }

    pub fn webhook_url(&self) -> String {
        self.app_origin
            .join("api/webhooks/mollie")
            .expect("APP_ORIGIN must be a valid base URL")
            .to_string()
    }
}
