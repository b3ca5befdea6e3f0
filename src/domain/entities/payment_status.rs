use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment status as reported by the provider.
///
/// The provider is the single source of truth; this enum is parsed strictly
/// from its responses and an unrecognized value is a provider error, never a
/// silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created, awaiting payer action.
    #[default]
    Open,
    /// Canceled by the payer or by the provider before settlement.
    Canceled,
    /// Submitted, provider is processing.
    Pending,
    /// Authorized but not yet captured.
    Authorized,
    /// Payer never completed the checkout in time.
    Expired,
    Failed,
    Paid,
    /// Previously settled, then reversed by the payer's bank.
    ChargedBack,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Open => "open",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Paid => "paid",
            PaymentStatus::ChargedBack => "charged_back",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }

    /// Whether the provider can still move this payment to another status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Paid
                | PaymentStatus::Canceled
                | PaymentStatus::Expired
                | PaymentStatus::Failed
                | PaymentStatus::ChargedBack
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(PaymentStatus::Open),
            "canceled" => Ok(PaymentStatus::Canceled),
            "pending" => Ok(PaymentStatus::Pending),
            "authorized" => Ok(PaymentStatus::Authorized),
            "expired" => Ok(PaymentStatus::Expired),
            "failed" => Ok(PaymentStatus::Failed),
            "paid" => Ok(PaymentStatus::Paid),
            "charged_back" => Ok(PaymentStatus::ChargedBack),
            _ => Err(format!("Unknown payment status: {}", s)),
        }
    }
}
