//! Payment provider port.
//!
//! The typed boundary this system consumes the external payment API
//! through. The provider is the single source of truth for payment and
//! subscription state; everything here is parsed strictly, and a response
//! that does not fit the typed model surfaces as a provider error rather
//! than a silent default.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::application::app_error::AppResult;
use crate::domain::entities::amount::Amount;
use crate::domain::entities::mandate::{MandateMethod, MandateStatus};
use crate::domain::entities::payment_mode::PaymentMode;
use crate::domain::entities::payment_status::PaymentStatus;
use crate::domain::entities::sequence_type::SequenceType;
use crate::domain::entities::subscription::SubscriptionStatus;

// ============================================================================
// Identifiers
// ============================================================================

/// Provider-side customer identifier (`cst_…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        CustomerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Provider objects
// ============================================================================

/// A provider payment in typed form.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: String,
    pub mode: PaymentMode,
    pub status: PaymentStatus,
    pub amount: Amount,
    pub customer_id: Option<CustomerId>,
    pub mandate_id: Option<String>,
    pub sequence_type: Option<SequenceType>,
    pub metadata: PaymentMetadata,
    /// Hosted checkout URL, present while the payer still has to act.
    pub checkout_url: Option<String>,
}

/// Metadata stamped on payments created by this system.
///
/// `invoice_id` is the only binding between a provider payment and a ledger
/// invoice, so it must be present on every payment this gateway creates;
/// the callback refuses to reconcile a payment without it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<i64>,
    /// Marks a recurring-bootstrap payment; the callback captures the
    /// resulting mandate when it settles.
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub first_payment: bool,
}

/// Mandate as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct MandateInfo {
    pub id: String,
    pub status: MandateStatus,
    pub method: MandateMethod,
}

/// Subscription as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionInfo {
    pub id: String,
    pub status: SubscriptionStatus,
    pub next_payment_date: Option<NaiveDate>,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePaymentRequest {
    pub amount: Amount,
    pub description: String,
    /// Where the payer lands after checkout. Machine-initiated recurring
    /// charges have none.
    pub redirect_url: Option<String>,
    pub webhook_url: String,
    pub sequence_type: SequenceType,
    /// Required when `sequence_type` is `recurring`.
    pub mandate_id: Option<String>,
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubscriptionRequest {
    pub amount: Amount,
    /// Provider interval grammar, e.g. "1 month" or "14 days".
    pub interval: String,
    pub description: String,
    pub webhook_url: String,
    pub start_date: Option<NaiveDate>,
    pub metadata: SubscriptionMetadata,
}

/// Metadata binding a provider subscription back to the billing client and
/// service it pays for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionMetadata {
    #[serde(default)]
    pub client_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<i64>,
}

// ============================================================================
// Port
// ============================================================================

/// Typed client boundary for the external payment API.
///
/// Every operation fails with `AppError::Provider` on non-2xx responses,
/// network failures, and responses that do not parse into the typed model.
#[async_trait]
pub trait PaymentProviderPort: Send + Sync {
    async fn get_payment(&self, payment_id: &str) -> AppResult<Payment>;

    /// Create a payment for a customer.
    ///
    /// # Provider Behavior
    ///
    /// The payment usually starts `open`; settlement is reported
    /// asynchronously to the webhook URL carried in the request. Some push
    /// methods settle immediately and come back `paid`.
    async fn create_payment(
        &self,
        customer_id: &CustomerId,
        request: &CreatePaymentRequest,
    ) -> AppResult<Payment>;

    /// List a customer's mandates, in the order the provider returns them.
    async fn list_mandates(&self, customer_id: &CustomerId) -> AppResult<Vec<MandateInfo>>;

    /// Fetch one subscription. Subscriptions are scoped to their owning
    /// customer at the provider, so lookups need both ids.
    async fn get_subscription(
        &self,
        customer_id: &CustomerId,
        subscription_id: &str,
    ) -> AppResult<SubscriptionInfo>;

    async fn create_subscription(
        &self,
        customer_id: &CustomerId,
        request: &CreateSubscriptionRequest,
    ) -> AppResult<SubscriptionInfo>;

    /// Cancel a subscription at the provider. Success means the provider
    /// confirmed the cancellation.
    async fn cancel_subscription(
        &self,
        customer_id: &CustomerId,
        subscription_id: &str,
    ) -> AppResult<()>;
}
