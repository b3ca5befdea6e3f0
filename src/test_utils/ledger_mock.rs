//! In-memory mock of the host billing ledger.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    application::app_error::{AppError, AppResult},
    application::ports::ledger::{AuditStatus, LedgerGateway, PaymentPosting, TransactionRecord},
    application::ports::payment_provider::CustomerId,
};

/// Audit line captured by [`InMemoryLedger`].
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub gateway: String,
    pub description: String,
    pub status: AuditStatus,
}

#[derive(Clone)]
struct InvoiceRow {
    client_id: i64,
    gateway: String,
    status: String,
}

/// In-memory implementation of LedgerGateway for testing.
///
/// Invoices seeded with `add_invoice` start out "Unpaid". The unique
/// `(transaction, entry type)` index of the real ledger table is modeled
/// with a claim set, so a duplicate posting reports `false` exactly like
/// the conflicting database insert does.
#[derive(Default)]
pub struct InMemoryLedger {
    invoices: Mutex<HashMap<i64, InvoiceRow>>,
    customer_references: Mutex<HashMap<i64, String>>,
    claims: Mutex<HashSet<(String, String)>>,
    postings: Mutex<Vec<PaymentPosting>>,
    records: Mutex<Vec<TransactionRecord>>,
    audit: Mutex<Vec<AuditEntry>>,
    invoice_owner_error: Mutex<Option<String>>,
    customer_reference_error: Mutex<Option<String>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an unpaid invoice owned by a client and assigned to a gateway.
    pub fn add_invoice(&self, invoice_id: i64, client_id: i64, gateway: &str) {
        self.invoices.lock().unwrap().insert(
            invoice_id,
            InvoiceRow {
                client_id,
                gateway: gateway.to_string(),
                status: "Unpaid".to_string(),
            },
        );
    }

    /// Seed the provider customer reference stored for a client.
    pub fn set_customer_reference(&self, client_id: i64, reference: &str) {
        self.customer_references
            .lock()
            .unwrap()
            .insert(client_id, reference.to_string());
    }

    /// Force `invoice_owner` to fail with a database error.
    pub fn fail_invoice_owner(&self, message: &str) {
        *self.invoice_owner_error.lock().unwrap() = Some(message.to_string());
    }

    /// Force `customer_reference` to fail with a database error.
    pub fn fail_customer_reference(&self, message: &str) {
        *self.customer_reference_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn postings(&self) -> Vec<PaymentPosting> {
        self.postings.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<TransactionRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.lock().unwrap().clone()
    }

    pub fn invoice_status(&self, invoice_id: i64) -> Option<String> {
        self.invoices
            .lock()
            .unwrap()
            .get(&invoice_id)
            .map(|row| row.status.clone())
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn is_known_transaction(&self, transaction_id: &str) -> AppResult<bool> {
        Ok(self
            .claims
            .lock()
            .unwrap()
            .iter()
            .any(|(tx, _)| tx == transaction_id))
    }

    async fn post_payment(&self, posting: &PaymentPosting) -> AppResult<bool> {
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices
            .get_mut(&posting.invoice_id)
            .ok_or(AppError::InvalidInvoice(posting.invoice_id))?;

        let claimed = self
            .claims
            .lock()
            .unwrap()
            .insert((posting.transaction_id.clone(), "payment".to_string()));
        if !claimed {
            return Ok(false);
        }

        self.postings.lock().unwrap().push(posting.clone());
        invoice.status = "Paid".to_string();
        Ok(true)
    }

    async fn record_transaction(&self, record: &TransactionRecord) -> AppResult<bool> {
        let claimed = self
            .claims
            .lock()
            .unwrap()
            .insert((record.transaction_id.clone(), "chargeback".to_string()));
        if !claimed {
            return Ok(false);
        }

        self.records.lock().unwrap().push(record.clone());
        Ok(true)
    }

    async fn mark_invoice_unpaid(&self, invoice_id: i64) -> AppResult<()> {
        if let Some(invoice) = self.invoices.lock().unwrap().get_mut(&invoice_id) {
            invoice.status = "Unpaid".to_string();
        }
        Ok(())
    }

    async fn invoice_owner(&self, invoice_id: i64) -> AppResult<i64> {
        if let Some(message) = self.invoice_owner_error.lock().unwrap().clone() {
            return Err(AppError::Database(message));
        }
        self.invoices
            .lock()
            .unwrap()
            .get(&invoice_id)
            .map(|row| row.client_id)
            .ok_or(AppError::InvalidInvoice(invoice_id))
    }

    async fn validate_invoice_binding(&self, invoice_id: i64, gateway: &str) -> AppResult<()> {
        match self.invoices.lock().unwrap().get(&invoice_id) {
            Some(row) if row.gateway == gateway => Ok(()),
            _ => Err(AppError::InvalidInvoice(invoice_id)),
        }
    }

    async fn customer_reference(&self, client_id: i64) -> AppResult<Option<CustomerId>> {
        if let Some(message) = self.customer_reference_error.lock().unwrap().clone() {
            return Err(AppError::Database(message));
        }
        Ok(self
            .customer_references
            .lock()
            .unwrap()
            .get(&client_id)
            .map(|reference| CustomerId::new(reference.as_str())))
    }

    async fn write_audit_log(
        &self,
        gateway: &str,
        description: &str,
        status: AuditStatus,
    ) -> AppResult<()> {
        self.audit.lock().unwrap().push(AuditEntry {
            gateway: gateway.to_string(),
            description: description.to_string(),
            status,
        });
        Ok(())
    }
}
