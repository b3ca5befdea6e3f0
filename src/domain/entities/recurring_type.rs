use serde::{Deserialize, Serialize};
use std::fmt;

/// How due invoices are charged when recurring support is enabled:
/// individual mandate-backed payments per invoice, or one provider
/// subscription that pays them automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecurringType {
    #[default]
    Manual,
    Subscription,
}

impl RecurringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringType::Manual => "manual",
            RecurringType::Subscription => "subscription",
        }
    }
}

impl fmt::Display for RecurringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RecurringType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(RecurringType::Manual),
            "subscription" => Ok(RecurringType::Subscription),
            _ => Err(format!("Unknown recurring type: {}", s)),
        }
    }
}
