//! Webhook callback state machine.
//!
//! The provider delivers only an opaque reference; everything else is
//! re-fetched from the provider API, which is the sole source of truth for
//! payment status. Processing is side-effecting only: the HTTP layer
//! responds success no matter what happened here, because a failure status
//! would make the provider retry-storm a delivery this service has already
//! given up on reconciling automatically. Operators reconcile from the
//! gateway audit log.

use std::sync::Arc;

use crate::application::app_error::{AppError, AppResult};
use crate::application::helpers::audit::AuditLog;
use crate::application::ports::ledger::{
    AuditStatus, LedgerGateway, PaymentPosting, TransactionRecord,
};
use crate::application::ports::payment_provider::{Payment, PaymentProviderPort};
use crate::application::use_cases::recurring::{
    PendingTransactionStore, RecurringEngine, SubscriptionStore,
};
use crate::domain::entities::amount::Amount;
use crate::domain::entities::payment_status::PaymentStatus;

/// References carrying this provider prefix are subscription ids, not
/// payment ids.
const SUBSCRIPTION_ID_PREFIX: &str = "sub_";

#[derive(Clone)]
pub struct CallbackProcessor {
    provider: Arc<dyn PaymentProviderPort>,
    ledger: Arc<dyn LedgerGateway>,
    recurring: Arc<RecurringEngine>,
    subscriptions: Arc<dyn SubscriptionStore>,
    pending: Arc<dyn PendingTransactionStore>,
    audit: AuditLog,
    gateway_name: String,
    active: bool,
    sandbox: bool,
    enable_recurring: bool,
}

impl CallbackProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<dyn PaymentProviderPort>,
        ledger: Arc<dyn LedgerGateway>,
        recurring: Arc<RecurringEngine>,
        subscriptions: Arc<dyn SubscriptionStore>,
        pending: Arc<dyn PendingTransactionStore>,
        audit: AuditLog,
        gateway_name: String,
        active: bool,
        sandbox: bool,
        enable_recurring: bool,
    ) -> Self {
        Self {
            provider,
            ledger,
            recurring,
            subscriptions,
            pending,
            audit,
            gateway_name,
            active,
            sandbox,
            enable_recurring,
        }
    }

    /// Whether a usable API credential is configured. Pure precondition
    /// check; the HTTP layer turns `false` into the only non-success
    /// webhook response this service ever sends.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handle one webhook delivery.
    ///
    /// Infallible from the caller's point of view: every internal error
    /// ends up in the gateway audit log, and duplicate deliveries are
    /// logged at debug level and otherwise ignored.
    pub async fn process(&self, reference: &str, status_override: Option<&str>) {
        if reference.is_empty() {
            tracing::debug!("webhook delivered an empty reference, nothing to do");
            return;
        }

        if reference.starts_with(SUBSCRIPTION_ID_PREFIX) {
            if let Err(e) = self.refresh_subscription(reference).await {
                self.audit
                    .write(
                        &format!("Error processing subscription notification: {e}"),
                        AuditStatus::Error,
                    )
                    .await;
            }
            return;
        }

        match self.handle_payment(reference, status_override).await {
            Ok(()) => {}
            Err(AppError::AlreadyProcessed(id)) => {
                tracing::debug!(
                    transaction_id = %id,
                    "duplicate delivery, transaction already processed"
                );
            }
            Err(e) => {
                self.audit
                    .write(
                        &format!("Payment {reference} failed with an error - {e}."),
                        AuditStatus::Error,
                    )
                    .await;
            }
        }
    }

    /// Mirror provider-reported subscription state into the local row.
    ///
    /// Status and next payment date are overwritten with exactly what the
    /// provider reports; this path never invents a local status.
    async fn refresh_subscription(&self, subscription_id: &str) -> AppResult<()> {
        let row = self
            .subscriptions
            .get_by_subscription_id(subscription_id)
            .await?
            .ok_or_else(|| AppError::UnknownSubscription(subscription_id.to_string()))?;
        let customer_id = self
            .ledger
            .customer_reference(row.client_id)
            .await?
            .ok_or(AppError::NoCustomer(row.client_id))?;

        let info = self
            .provider
            .get_subscription(&customer_id, subscription_id)
            .await?;
        self.subscriptions
            .update_provider_state(subscription_id, info.status, info.next_payment_date)
            .await?;

        self.audit
            .write(
                &format!(
                    "Subscription {subscription_id} status updated to {}.",
                    info.status
                ),
                AuditStatus::Success,
            )
            .await;
        Ok(())
    }

    async fn handle_payment(
        &self,
        transaction_id: &str,
        status_override: Option<&str>,
    ) -> AppResult<()> {
        let payment = self.provider.get_payment(transaction_id).await?;
        let invoice_id = payment.metadata.invoice_id.ok_or(AppError::MissingBinding)?;
        self.ledger
            .validate_invoice_binding(invoice_id, &self.gateway_name)
            .await?;

        match self.effective_status(&payment, status_override) {
            PaymentStatus::Paid => self.handle_paid(invoice_id, &payment).await?,
            PaymentStatus::ChargedBack => self.handle_charged_back(invoice_id, &payment).await?,
            other => {
                tracing::debug!(
                    transaction_id = %payment.id,
                    invoice_id,
                    status = %other,
                    "no ledger action for this status"
                );
            }
        }

        self.clear_pending(invoice_id).await;
        Ok(())
    }

    /// The status override is an operator QA affordance: honored only in
    /// sandbox mode, and only when the fetched transaction itself reports
    /// test mode. Live transactions always use the provider-reported
    /// status.
    fn effective_status(&self, payment: &Payment, status_override: Option<&str>) -> PaymentStatus {
        if !self.sandbox || !payment.mode.is_test() {
            return payment.status;
        }
        let Some(raw) = status_override else {
            return payment.status;
        };
        match raw.parse::<PaymentStatus>() {
            Ok(status) => {
                tracing::info!(
                    transaction_id = %payment.id,
                    %status,
                    "status override applied to test transaction"
                );
                status
            }
            Err(e) => {
                tracing::warn!(transaction_id = %payment.id, error = %e, "ignoring status override");
                payment.status
            }
        }
    }

    /// Idempotent payment acceptance, then mandate capture for recurring
    /// bootstrap payments.
    ///
    /// The posting and the mandate capture are independent effects: once
    /// the payment is posted, nothing in mandate bookkeeping may undo it.
    async fn handle_paid(&self, invoice_id: i64, payment: &Payment) -> AppResult<()> {
        if self.ledger.is_known_transaction(&payment.id).await? {
            return Err(AppError::AlreadyProcessed(payment.id.clone()));
        }

        let posting = PaymentPosting {
            invoice_id,
            transaction_id: payment.id.clone(),
            amount: payment.amount.clone(),
            fee: Amount::zero(&payment.amount.currency),
            payment_method: self.gateway_name.clone(),
        };
        if !self.ledger.post_payment(&posting).await? {
            // Lost the claim race with a concurrent duplicate delivery.
            return Err(AppError::AlreadyProcessed(payment.id.clone()));
        }

        self.audit
            .write(
                &format!(
                    "Payment {} completed successfully - invoice {invoice_id}.",
                    payment.id
                ),
                AuditStatus::Success,
            )
            .await;

        if payment.metadata.recurring && self.enable_recurring {
            if let Err(e) = self.capture_mandate(invoice_id, payment).await {
                self.audit
                    .write(
                        &format!("Error processing recurring payment mandate: {e}"),
                        AuditStatus::Error,
                    )
                    .await;
            }
        }
        Ok(())
    }

    /// A paid bootstrap payment should have left a valid mandate behind at
    /// the provider; find it and persist it for the invoice's owner.
    async fn capture_mandate(&self, invoice_id: i64, payment: &Payment) -> AppResult<()> {
        let Some(customer_id) = payment.customer_id.as_ref() else {
            tracing::debug!(
                transaction_id = %payment.id,
                "paid bootstrap payment carries no customer, skipping mandate capture"
            );
            return Ok(());
        };
        let Some(mandate) = self.recurring.get_or_create_mandate(customer_id, None).await else {
            return Ok(());
        };

        let client_id = self.ledger.invoice_owner(invoice_id).await?;
        if self.recurring.store_mandate(client_id, &mandate).await {
            self.audit
                .write(
                    &format!(
                        "Valid mandate {} created for customer {} with method {}.",
                        mandate.id, customer_id, mandate.method
                    ),
                    AuditStatus::Success,
                )
                .await;
        }
        Ok(())
    }

    /// Reverse a previously settled payment: the invoice goes back to
    /// unpaid and a zero-fee debit record is written against the original
    /// amount.
    async fn handle_charged_back(&self, invoice_id: i64, payment: &Payment) -> AppResult<()> {
        let client_id = self.ledger.invoice_owner(invoice_id).await?;
        self.ledger.mark_invoice_unpaid(invoice_id).await?;

        let description = format!(
            "Payment {} charged back by customer - invoice {invoice_id}.",
            payment.id
        );
        let record = TransactionRecord {
            client_id,
            invoice_id,
            transaction_id: payment.id.clone(),
            amount: payment.amount.clone(),
            fee: Amount::zero(&payment.amount.currency),
            payment_method: self.gateway_name.clone(),
            description: description.clone(),
        };
        if !self.ledger.record_transaction(&record).await? {
            return Err(AppError::AlreadyProcessed(payment.id.clone()));
        }

        self.audit.write(&description, AuditStatus::ChargedBack).await;
        Ok(())
    }

    async fn clear_pending(&self, invoice_id: i64) {
        if let Err(e) = self.pending.delete_pending(invoice_id).await {
            tracing::warn!(error = %e, invoice_id, "failed to clear pending transaction marker");
        }
    }
}
