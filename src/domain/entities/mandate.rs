use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored mandate row: the local mirror of a provider-side authorization to
/// charge a billing client's payment method without re-authentication.
#[derive(Debug, Clone)]
pub struct Mandate {
    pub id: i64,
    pub client_id: i64,
    /// Provider-assigned mandate id (`mdt_…`), unique.
    pub mandate_id: String,
    pub method: MandateMethod,
    pub status: MandateStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Payment methods the provider can attach a mandate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "mandate_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MandateMethod {
    CreditCard,
    DirectDebit,
    PayPal,
}

impl MandateMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MandateMethod::CreditCard => "creditcard",
            MandateMethod::DirectDebit => "directdebit",
            MandateMethod::PayPal => "paypal",
        }
    }
}

impl fmt::Display for MandateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MandateMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "creditcard" => Ok(MandateMethod::CreditCard),
            "directdebit" => Ok(MandateMethod::DirectDebit),
            "paypal" => Ok(MandateMethod::PayPal),
            _ => Err(format!("Unknown mandate method: {}", s)),
        }
    }
}

/// Mandate lifecycle: `pending` until the first payment settles, then
/// `valid` (chargeable) or `invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "mandate_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MandateStatus {
    Valid,
    Pending,
    Invalid,
}

impl MandateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MandateStatus::Valid => "valid",
            MandateStatus::Pending => "pending",
            MandateStatus::Invalid => "invalid",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, MandateStatus::Valid)
    }
}

impl fmt::Display for MandateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MandateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "valid" => Ok(MandateStatus::Valid),
            "pending" => Ok(MandateStatus::Pending),
            "invalid" => Ok(MandateStatus::Invalid),
            _ => Err(format!("Unknown mandate status: {}", s)),
        }
    }
}
