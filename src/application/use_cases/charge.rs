//! Synchronous "charge this invoice now" entry point.
//!
//! Called by the billing host when an invoice becomes due. Every outcome,
//! including failure, is a structured result the host renders directly to
//! an operator; nothing here is allowed to escape as an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::app_error::{AppError, AppResult};
use crate::application::helpers::audit::AuditLog;
use crate::application::ports::ledger::{AuditStatus, LedgerGateway, PaymentPosting};
use crate::application::ports::payment_provider::{CustomerId, Payment};
use crate::application::use_cases::recurring::{
    ChargeParams, RecurringEngine, SubscriptionParams, SubscriptionStore,
};
use crate::domain::entities::amount::Amount;
use crate::domain::entities::recurring_type::RecurringType;

/// Interval used when a charge request has to create a subscription; the
/// billing host invoices monthly.
const DEFAULT_SUBSCRIPTION_INTERVAL: &str = "1 month";

// ============================================================================
// Request / Outcome Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeRequest {
    pub invoice_id: i64,
    pub client_id: i64,
    pub amount: Amount,
    pub description: String,
    #[serde(default)]
    pub service_id: Option<i64>,
    #[serde(default)]
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    Success,
    Pending,
    Error,
}

impl ChargeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeStatus::Success => "success",
            ChargeStatus::Pending => "pending",
            ChargeStatus::Error => "error",
        }
    }
}

/// What the billing host shows for a charge attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeOutcome {
    pub status: ChargeStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

impl ChargeOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self::with_status(ChargeStatus::Success, message)
    }

    pub fn pending(message: impl Into<String>) -> Self {
        Self::with_status(ChargeStatus::Pending, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_status(ChargeStatus::Error, message)
    }

    pub fn with_transaction(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_subscription(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    fn with_status(status: ChargeStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            transaction_id: None,
            subscription_id: None,
        }
    }
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct ChargeRequestHandler {
    recurring: Arc<RecurringEngine>,
    subscriptions: Arc<dyn SubscriptionStore>,
    ledger: Arc<dyn LedgerGateway>,
    audit: AuditLog,
    gateway_name: String,
    active: bool,
    enable_recurring: bool,
    recurring_type: RecurringType,
}

impl ChargeRequestHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        recurring: Arc<RecurringEngine>,
        subscriptions: Arc<dyn SubscriptionStore>,
        ledger: Arc<dyn LedgerGateway>,
        audit: AuditLog,
        gateway_name: String,
        active: bool,
        enable_recurring: bool,
        recurring_type: RecurringType,
    ) -> Self {
        Self {
            recurring,
            subscriptions,
            ledger,
            audit,
            gateway_name,
            active,
            enable_recurring,
            recurring_type,
        }
    }

    /// Charge the invoice with the configured recurring strategy.
    pub async fn run(&self, request: &ChargeRequest) -> ChargeOutcome {
        if !self.active {
            return ChargeOutcome::error(format!(
                "Failed to process recurring payment for invoice {} - API key is missing!",
                request.invoice_id
            ));
        }
        if !self.enable_recurring {
            return ChargeOutcome::error("Recurring payments are not enabled for this gateway.");
        }

        let result = match self.recurring_type {
            RecurringType::Manual => self.charge_manual(request).await,
            RecurringType::Subscription => self.charge_subscription(request).await,
        };
        match result {
            Ok(outcome) => outcome,
            Err(e) => self.outcome_for(request, e),
        }
    }

    /// Manual strategy: charge the client's valid mandate directly, one
    /// payment per invoice.
    async fn charge_manual(&self, request: &ChargeRequest) -> AppResult<ChargeOutcome> {
        let customer_id = self.customer_for(request.client_id).await?;
        let mandate = self
            .recurring
            .get_or_create_mandate(&customer_id, None)
            .await
            .ok_or(AppError::NoMandate(request.client_id))?;

        let params = ChargeParams {
            invoice_id: request.invoice_id,
            service_id: request.service_id,
            amount: request.amount.clone(),
            description: request.description.clone(),
            return_url: request.return_url.clone(),
        };
        let Some(payment) = self
            .recurring
            .create_recurring_payment(&customer_id, &mandate.id, &params)
            .await
        else {
            return Ok(ChargeOutcome::error(format!(
                "Failed to create recurring payment for invoice {}.",
                request.invoice_id
            )));
        };

        if payment.status.is_paid() {
            self.post_immediate(request, &payment).await?;
            return Ok(ChargeOutcome::success(format!(
                "Successfully processed recurring payment for invoice {}.",
                request.invoice_id
            ))
            .with_transaction(&payment.id));
        }

        Ok(ChargeOutcome::pending(format!(
            "Recurring payment initiated for invoice {}. Awaiting processing by Mollie.",
            request.invoice_id
        ))
        .with_transaction(&payment.id))
    }

    /// Subscription strategy: one provider subscription per client keeps
    /// paying subsequent invoices out-of-band.
    async fn charge_subscription(&self, request: &ChargeRequest) -> AppResult<ChargeOutcome> {
        if let Some(existing) = self
            .subscriptions
            .get_active_for_client(request.client_id)
            .await?
        {
            return Ok(ChargeOutcome::pending(format!(
                "Client already has an active subscription. Invoice {} will be paid automatically.",
                request.invoice_id
            ))
            .with_subscription(&existing.subscription_id));
        }

        let customer_id = self.customer_for(request.client_id).await?;
        self.recurring
            .get_or_create_mandate(&customer_id, None)
            .await
            .ok_or(AppError::NoMandate(request.client_id))?;

        let params = SubscriptionParams {
            client_id: request.client_id,
            service_id: request.service_id,
            amount: request.amount.clone(),
            interval: DEFAULT_SUBSCRIPTION_INTERVAL.to_string(),
            description: request.description.clone(),
            start_date: None,
        };
        let Some(subscription) = self
            .recurring
            .create_subscription(&customer_id, &params)
            .await
        else {
            return Ok(ChargeOutcome::error(format!(
                "Failed to create subscription for client {}.",
                request.client_id
            )));
        };

        Ok(ChargeOutcome::success(format!(
            "Successfully created subscription for client {}.",
            request.client_id
        ))
        .with_subscription(&subscription.id))
    }

    /// Some push methods settle synchronously. Post through the same
    /// check-and-claim the webhook uses; when the callback got there first
    /// the posting is skipped and the charge still reports success.
    async fn post_immediate(&self, request: &ChargeRequest, payment: &Payment) -> AppResult<()> {
        let posting = PaymentPosting {
            invoice_id: request.invoice_id,
            transaction_id: payment.id.clone(),
            amount: payment.amount.clone(),
            fee: Amount::zero(&payment.amount.currency),
            payment_method: self.gateway_name.clone(),
        };
        if self.ledger.post_payment(&posting).await? {
            self.audit
                .write(
                    &format!(
                        "Payment {} completed successfully - invoice {}.",
                        payment.id, request.invoice_id
                    ),
                    AuditStatus::Success,
                )
                .await;
        } else {
            tracing::debug!(
                transaction_id = %payment.id,
                "callback already posted this transaction"
            );
        }
        Ok(())
    }

    async fn customer_for(&self, client_id: i64) -> AppResult<CustomerId> {
        self.ledger
            .customer_reference(client_id)
            .await?
            .ok_or(AppError::NoCustomer(client_id))
    }

    /// Errors never escape the entry point; the host renders the outcome
    /// message as-is.
    fn outcome_for(&self, request: &ChargeRequest, error: AppError) -> ChargeOutcome {
        match &error {
            AppError::NoCustomer(_) | AppError::NoMandate(_) => {
                ChargeOutcome::error(error.to_string())
            }
            _ => {
                tracing::error!(
                    error = %error,
                    invoice_id = request.invoice_id,
                    "charge request failed"
                );
                ChargeOutcome::error(format!(
                    "Failed to process recurring payment for invoice {}.",
                    request.invoice_id
                ))
            }
        }
    }
}
