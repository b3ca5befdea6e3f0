//! Billing ledger port.
//!
//! Narrow interface to the externally-owned billing ledger: invoice
//! ownership and gateway binding, payment posting behind the idempotency
//! gate, chargeback reversal records, and the gateway audit log. The ledger
//! keeps its own bookkeeping rules; this port only names the operations the
//! gateway needs.

use async_trait::async_trait;

use crate::application::app_error::AppResult;
use crate::application::ports::payment_provider::CustomerId;
use crate::domain::entities::amount::Amount;

/// A payment to post against an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentPosting {
    pub invoice_id: i64,
    pub transaction_id: String,
    pub amount: Amount,
    pub fee: Amount,
    pub payment_method: String,
}

/// A reversing ledger record, used for chargebacks. This is a debit record
/// against the client's history, not a payment posting.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub client_id: i64,
    pub invoice_id: i64,
    pub transaction_id: String,
    pub amount: Amount,
    pub fee: Amount,
    pub payment_method: String,
    pub description: String,
}

/// Status column of a gateway audit log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    Success,
    Error,
    ChargedBack,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Success => "Success",
            AuditStatus::Error => "Error",
            AuditStatus::ChargedBack => "Charged Back",
        }
    }
}

#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Whether any ledger entry already references this provider
    /// transaction id. Fast-path idempotency probe; the authoritative gate
    /// is inside [`post_payment`](Self::post_payment).
    async fn is_known_transaction(&self, transaction_id: &str) -> AppResult<bool>;

    /// Post a payment against its invoice.
    ///
    /// Atomic check-and-claim on the transaction id: returns `true` when
    /// this call claimed the id and posted, `false` when another delivery
    /// already did. Duplicate webhook delivery is expected steady-state, so
    /// `false` is not an error.
    async fn post_payment(&self, posting: &PaymentPosting) -> AppResult<bool>;

    /// Record a reversing transaction. Check-and-claim on the transaction
    /// id the same way `post_payment` is, so a redelivered chargeback
    /// cannot produce two reversing records.
    async fn record_transaction(&self, record: &TransactionRecord) -> AppResult<bool>;

    async fn mark_invoice_unpaid(&self, invoice_id: i64) -> AppResult<()>;

    /// Billing client that owns the invoice. Fails with `InvalidInvoice`
    /// when the invoice does not exist.
    async fn invoice_owner(&self, invoice_id: i64) -> AppResult<i64>;

    /// Verify the invoice exists and is assigned to this gateway. Fails
    /// with `InvalidInvoice` otherwise.
    async fn validate_invoice_binding(&self, invoice_id: i64, gateway: &str) -> AppResult<()>;

    /// Provider customer id stored for a billing client, if any.
    async fn customer_reference(&self, client_id: i64) -> AppResult<Option<CustomerId>>;

    /// Append a line to the host's gateway log.
    async fn write_audit_log(
        &self,
        gateway: &str,
        description: &str,
        status: AuditStatus,
    ) -> AppResult<()>;
}
