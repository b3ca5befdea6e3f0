use serde::{Deserialize, Serialize};
use std::fmt;

/// Test or live processing mode.
///
/// Every provider object carries the mode it was created in, and the
/// configured API key decides which mode this gateway operates in. Test
/// mode never moves real money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    #[default]
    Test,
    Live,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Test => "test",
            PaymentMode::Live => "live",
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, PaymentMode::Test)
    }

    /// Infer the mode from an API key prefix (`test_…` / `live_…`).
    /// Unrecognized prefixes are treated as test keys.
    pub fn from_api_key(key: &str) -> Self {
        if key.starts_with("live_") {
            PaymentMode::Live
        } else {
            PaymentMode::Test
        }
    }

    /// Check that a configured key carries the prefix expected for its
    /// slot. Empty keys pass: an unconfigured slot just leaves the gateway
    /// inactive in that mode.
    pub fn validate_api_key(key: &str, expected: PaymentMode) -> Result<(), String> {
        if key.is_empty() {
            return Ok(());
        }
        let prefix = match expected {
            PaymentMode::Test => "test_",
            PaymentMode::Live => "live_",
        };
        if key.starts_with(prefix) {
            Ok(())
        } else {
            Err(format!(
                "Mollie {} API key must start with '{}'",
                expected, prefix
            ))
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "test" => Ok(PaymentMode::Test),
            "live" => Ok(PaymentMode::Live),
            _ => Err(format!("Unknown payment mode: {}", s)),
        }
    }
}
