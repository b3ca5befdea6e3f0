//! Recurring payment lifecycle engine.
//!
//! Owns mandate bootstrap (first payment → callback-captured mandate),
//! manual mandate-backed charges, and provider subscriptions. Provider
//! failures inside the engine are logged to the gateway audit log and
//! surfaced as "nothing created" rather than errors; the webhook callback
//! is the path that eventually reconciles whatever did get created.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::application::app_error::{AppError, AppResult};
use crate::application::helpers::audit::AuditLog;
use crate::application::ports::ledger::LedgerGateway;
use crate::application::ports::ledger::AuditStatus;
use crate::application::ports::payment_provider::{
    CreatePaymentRequest, CreateSubscriptionRequest, CustomerId, MandateInfo, Payment,
    PaymentMetadata, PaymentProviderPort, SubscriptionInfo, SubscriptionMetadata,
};
use crate::domain::entities::amount::Amount;
use crate::domain::entities::mandate::{Mandate, MandateMethod, MandateStatus};
use crate::domain::entities::sequence_type::SequenceType;
use crate::domain::entities::subscription::{Subscription, SubscriptionStatus};

// ============================================================================
// Input Types
// ============================================================================

/// Parameters for a payment created on behalf of an invoice.
#[derive(Debug, Clone)]
pub struct ChargeParams {
    pub invoice_id: i64,
    pub service_id: Option<i64>,
    pub amount: Amount,
    pub description: String,
    pub return_url: Option<String>,
}

/// Parameters for a provider subscription covering a client's service.
#[derive(Debug, Clone)]
pub struct SubscriptionParams {
    pub client_id: i64,
    pub service_id: Option<i64>,
    pub amount: Amount,
    /// Provider interval grammar, e.g. "1 month".
    pub interval: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
}

/// New local subscription row, seeded from provider-reported state.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub client_id: i64,
    pub service_id: i64,
    pub subscription_id: String,
    pub status: SubscriptionStatus,
    pub next_payment_date: Option<NaiveDate>,
}

// ============================================================================
// Store Traits
// ============================================================================

#[async_trait]
pub trait MandateStore: Send + Sync {
    /// First `valid` mandate for a client, optionally restricted to a
    /// payment method.
    async fn get_valid_mandate(
        &self,
        client_id: i64,
        method: Option<MandateMethod>,
    ) -> AppResult<Option<Mandate>>;

    /// Upsert by mandate id: update method, status and timestamp when the
    /// id exists, insert otherwise. Never deletes.
    async fn upsert_mandate(
        &self,
        client_id: i64,
        mandate_id: &str,
        method: MandateMethod,
        status: MandateStatus,
    ) -> AppResult<()>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn insert_subscription(&self, subscription: &NewSubscription) -> AppResult<()>;

    async fn get_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> AppResult<Option<Subscription>>;

    async fn get_active_for_client(&self, client_id: i64) -> AppResult<Option<Subscription>>;

    /// Overwrite status and next payment date with provider-reported
    /// values. Returns whether a row matched.
    async fn update_provider_state(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
        next_payment_date: Option<NaiveDate>,
    ) -> AppResult<bool>;

    /// Set the local status to canceled. Returns whether a row matched.
    async fn mark_canceled(&self, subscription_id: &str) -> AppResult<bool>;
}

#[async_trait]
pub trait PendingTransactionStore: Send + Sync {
    /// Record or replace the awaiting-callback marker for an invoice.
    async fn upsert_pending(&self, invoice_id: i64, transaction_id: &str) -> AppResult<()>;

    /// Clear the marker. Returns whether a row existed.
    async fn delete_pending(&self, invoice_id: i64) -> AppResult<bool>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct RecurringEngine {
    provider: Arc<dyn PaymentProviderPort>,
    mandates: Arc<dyn MandateStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    pending: Arc<dyn PendingTransactionStore>,
    ledger: Arc<dyn LedgerGateway>,
    audit: AuditLog,
    webhook_url: String,
}

impl RecurringEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<dyn PaymentProviderPort>,
        mandates: Arc<dyn MandateStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        pending: Arc<dyn PendingTransactionStore>,
        ledger: Arc<dyn LedgerGateway>,
        audit: AuditLog,
        webhook_url: String,
    ) -> Self {
        Self {
            provider,
            mandates,
            subscriptions,
            pending,
            ledger,
            audit,
            webhook_url,
        }
    }

    /// First `valid` mandate of the provider customer, optionally filtered
    /// by method.
    ///
    /// `None` means the caller must bootstrap one via a first payment.
    /// Provider failures also come back as `None`, after an audit line.
    pub async fn get_or_create_mandate(
        &self,
        customer_id: &CustomerId,
        method: Option<MandateMethod>,
    ) -> Option<MandateInfo> {
        let mandates = match self.provider.list_mandates(customer_id).await {
            Ok(mandates) => mandates,
            Err(e) => {
                self.audit
                    .write(&format!("Error getting mandate: {e}"), AuditStatus::Error)
                    .await;
                return None;
            }
        };

        mandates
            .into_iter()
            .find(|m| m.status.is_valid() && method.is_none_or(|wanted| m.method == wanted))
    }

    /// Create the mandate-establishing payment (`sequenceType=first`).
    ///
    /// The payment settles asynchronously; the webhook callback is what
    /// actually captures and persists the resulting mandate.
    pub async fn create_first_payment(
        &self,
        customer_id: &CustomerId,
        params: &ChargeParams,
    ) -> Option<Payment> {
        let request = CreatePaymentRequest {
            amount: params.amount.clone(),
            description: params.description.clone(),
            redirect_url: params.return_url.clone(),
            webhook_url: self.webhook_url.clone(),
            sequence_type: SequenceType::First,
            mandate_id: None,
            metadata: PaymentMetadata {
                invoice_id: Some(params.invoice_id),
                service_id: params.service_id,
                recurring: true,
                first_payment: true,
            },
        };

        let payment = match self.provider.create_payment(customer_id, &request).await {
            Ok(payment) => payment,
            Err(e) => {
                self.audit
                    .write(
                        &format!("Error creating first payment for mandate: {e}"),
                        AuditStatus::Error,
                    )
                    .await;
                return None;
            }
        };

        self.record_pending(params.invoice_id, &payment.id).await;
        self.audit
            .write(
                &format!(
                    "First payment for recurring mandate attempted for invoice {}. \
                     Awaiting payment confirmation from callback for transaction {}.",
                    params.invoice_id, payment.id
                ),
                AuditStatus::Success,
            )
            .await;

        Some(payment)
    }

    /// Charge an existing mandate (`sequenceType=recurring`). Machine
    /// initiated; no payer interaction happens.
    pub async fn create_recurring_payment(
        &self,
        customer_id: &CustomerId,
        mandate_id: &str,
        params: &ChargeParams,
    ) -> Option<Payment> {
        let request = CreatePaymentRequest {
            amount: params.amount.clone(),
            description: params.description.clone(),
            redirect_url: params.return_url.clone(),
            webhook_url: self.webhook_url.clone(),
            sequence_type: SequenceType::Recurring,
            mandate_id: Some(mandate_id.to_string()),
            metadata: PaymentMetadata {
                invoice_id: Some(params.invoice_id),
                service_id: params.service_id,
                ..PaymentMetadata::default()
            },
        };

        let payment = match self.provider.create_payment(customer_id, &request).await {
            Ok(payment) => payment,
            Err(e) => {
                self.audit
                    .write(
                        &format!("Error creating recurring payment: {e}"),
                        AuditStatus::Error,
                    )
                    .await;
                return None;
            }
        };

        self.record_pending(params.invoice_id, &payment.id).await;
        self.audit
            .write(
                &format!(
                    "Recurring payment attempted for invoice {}. Transaction ID: {}.",
                    params.invoice_id, payment.id
                ),
                AuditStatus::Success,
            )
            .await;

        Some(payment)
    }

    /// Create a provider subscription and seed the local row with the
    /// provider's initial status and next payment date.
    pub async fn create_subscription(
        &self,
        customer_id: &CustomerId,
        params: &SubscriptionParams,
    ) -> Option<SubscriptionInfo> {
        let request = CreateSubscriptionRequest {
            amount: params.amount.clone(),
            interval: params.interval.clone(),
            description: params.description.clone(),
            webhook_url: self.webhook_url.clone(),
            start_date: params.start_date,
            metadata: SubscriptionMetadata {
                client_id: params.client_id,
                service_id: params.service_id,
            },
        };

        let subscription = match self.provider.create_subscription(customer_id, &request).await {
            Ok(subscription) => subscription,
            Err(e) => {
                self.audit
                    .write(
                        &format!("Error creating subscription: {e}"),
                        AuditStatus::Error,
                    )
                    .await;
                return None;
            }
        };

        let row = NewSubscription {
            client_id: params.client_id,
            service_id: params.service_id.unwrap_or(0),
            subscription_id: subscription.id.clone(),
            status: subscription.status,
            next_payment_date: subscription.next_payment_date,
        };
        if let Err(e) = self.subscriptions.insert_subscription(&row).await {
            self.audit
                .write(
                    &format!("Error creating subscription: {e}"),
                    AuditStatus::Error,
                )
                .await;
            return None;
        }

        self.audit
            .write(
                &format!(
                    "Subscription created: {} for client {}.",
                    subscription.id, params.client_id
                ),
                AuditStatus::Success,
            )
            .await;

        Some(subscription)
    }

    /// Cancel at the provider, then mirror the cancellation locally.
    ///
    /// When the provider call fails the local row is left untouched and
    /// `false` is returned; local state never claims a cancellation the
    /// provider did not confirm.
    pub async fn cancel_subscription(
        &self,
        customer_id: &CustomerId,
        subscription_id: &str,
    ) -> bool {
        if let Err(e) = self
            .provider
            .cancel_subscription(customer_id, subscription_id)
            .await
        {
            self.audit
                .write(
                    &format!("Error canceling subscription {subscription_id}: {e}"),
                    AuditStatus::Error,
                )
                .await;
            return false;
        }

        match self.subscriptions.mark_canceled(subscription_id).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(subscription_id, "no local subscription row to cancel"),
            Err(e) => {
                // Provider-side cancellation stands; the subscription
                // refresh path converges the local row later.
                tracing::warn!(error = %e, subscription_id, "local cancel update failed");
            }
        }

        self.audit
            .write(
                &format!("Subscription {subscription_id} canceled successfully."),
                AuditStatus::Success,
            )
            .await;

        true
    }

    /// Upsert the local row for a provider mandate. Returns whether the
    /// mandate was stored.
    pub async fn store_mandate(&self, client_id: i64, mandate: &MandateInfo) -> bool {
        if let Err(e) = self
            .mandates
            .upsert_mandate(client_id, &mandate.id, mandate.method, mandate.status)
            .await
        {
            self.audit
                .write(
                    &format!("Error storing mandate {}: {e}", mandate.id),
                    AuditStatus::Error,
                )
                .await;
            return false;
        }
        true
    }

    /// Host-facing mandate bootstrap: resolve the provider customer for a
    /// billing client, then create the first payment.
    pub async fn start_first_payment(
        &self,
        client_id: i64,
        params: &ChargeParams,
    ) -> AppResult<Payment> {
        let customer_id = self
            .ledger
            .customer_reference(client_id)
            .await?
            .ok_or(AppError::NoCustomer(client_id))?;

        self.create_first_payment(&customer_id, params)
            .await
            .ok_or_else(|| AppError::Provider("First payment creation failed".to_string()))
    }

    /// Host-facing cancellation: resolve the local row and its customer,
    /// then run the provider-first cancel.
    pub async fn cancel_client_subscription(&self, subscription_id: &str) -> AppResult<bool> {
        let subscription = self
            .subscriptions
            .get_by_subscription_id(subscription_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let customer_id = self
            .ledger
            .customer_reference(subscription.client_id)
            .await?
            .ok_or(AppError::NoCustomer(subscription.client_id))?;

        Ok(self.cancel_subscription(&customer_id, subscription_id).await)
    }

    async fn record_pending(&self, invoice_id: i64, transaction_id: &str) {
        if let Err(e) = self.pending.upsert_pending(invoice_id, transaction_id).await {
            tracing::warn!(
                error = %e,
                invoice_id,
                transaction_id,
                "failed to record pending transaction marker"
            );
        }
    }
}
