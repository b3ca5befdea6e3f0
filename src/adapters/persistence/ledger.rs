//! Postgres implementation of the billing-host ledger boundary.
//!
//! The idempotency gate lives in the schema: `ledger_entries` is unique on
//! `(transaction_id, entry_type)`, and both posting paths insert with
//! `ON CONFLICT DO NOTHING`, so the claim is atomic under concurrent
//! duplicate webhook delivery without any explicit locking.

use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    application::app_error::{AppError, AppResult},
    application::ports::ledger::{
        AuditStatus, LedgerGateway, PaymentPosting, TransactionRecord,
    },
    application::ports::payment_provider::CustomerId,
};

const ENTRY_TYPE_PAYMENT: &str = "payment";
const ENTRY_TYPE_CHARGEBACK: &str = "chargeback";

const INVOICE_STATUS_PAID: &str = "Paid";
const INVOICE_STATUS_UNPAID: &str = "Unpaid";

#[async_trait]
impl LedgerGateway for PostgresPersistence {
    async fn is_known_transaction(&self, transaction_id: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM ledger_entries WHERE transaction_id = $1)",
        )
        .bind(transaction_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(exists)
    }

    async fn post_payment(&self, posting: &PaymentPosting) -> AppResult<bool> {
        let client_id = self.invoice_owner(posting.invoice_id).await?;
        let amount_cents = posting
            .amount
            .minor_units()
            .map_err(AppError::InvalidInput)?;
        let fee_cents = posting.fee.minor_units().map_err(AppError::InvalidInput)?;

        let result = sqlx::query(
            r#"
            INSERT INTO ledger_entries
                (client_id, invoice_id, transaction_id, entry_type,
                 amount_cents, fee_cents, currency, payment_method)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (transaction_id, entry_type) DO NOTHING
            "#,
        )
        .bind(client_id)
        .bind(posting.invoice_id)
        .bind(&posting.transaction_id)
        .bind(ENTRY_TYPE_PAYMENT)
        .bind(amount_cents)
        .bind(fee_cents)
        .bind(&posting.amount.currency)
        .bind(&posting.payment_method)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE invoices SET status = $2 WHERE id = $1")
            .bind(posting.invoice_id)
            .bind(INVOICE_STATUS_PAID)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(true)
    }

    async fn record_transaction(&self, record: &TransactionRecord) -> AppResult<bool> {
        let amount_cents = record
            .amount
            .minor_units()
            .map_err(AppError::InvalidInput)?;
        let fee_cents = record.fee.minor_units().map_err(AppError::InvalidInput)?;

        let result = sqlx::query(
            r#"
            INSERT INTO ledger_entries
                (client_id, invoice_id, transaction_id, entry_type,
                 amount_cents, fee_cents, currency, payment_method, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (transaction_id, entry_type) DO NOTHING
            "#,
        )
        .bind(record.client_id)
        .bind(record.invoice_id)
        .bind(&record.transaction_id)
        .bind(ENTRY_TYPE_CHARGEBACK)
        .bind(amount_cents)
        .bind(fee_cents)
        .bind(&record.amount.currency)
        .bind(&record.payment_method)
        .bind(&record.description)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_invoice_unpaid(&self, invoice_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE invoices SET status = $2 WHERE id = $1")
            .bind(invoice_id)
            .bind(INVOICE_STATUS_UNPAID)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn invoice_owner(&self, invoice_id: i64) -> AppResult<i64> {
        let row = sqlx::query("SELECT client_id FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        match row {
            Some(row) => Ok(row.get("client_id")),
            None => Err(AppError::InvalidInvoice(invoice_id)),
        }
    }

    async fn validate_invoice_binding(&self, invoice_id: i64, gateway: &str) -> AppResult<()> {
        let row = sqlx::query("SELECT payment_method FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        let method: String = match row {
            Some(row) => row.get("payment_method"),
            None => return Err(AppError::InvalidInvoice(invoice_id)),
        };
        if method != gateway {
            return Err(AppError::InvalidInvoice(invoice_id));
        }
        Ok(())
    }

    async fn customer_reference(&self, client_id: i64) -> AppResult<Option<CustomerId>> {
        let reference: Option<Option<String>> =
            sqlx::query_scalar("SELECT provider_customer_id FROM clients WHERE id = $1")
                .bind(client_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::from)?;
        Ok(reference.flatten().map(CustomerId::new))
    }

    async fn write_audit_log(
        &self,
        gateway: &str,
        description: &str,
        status: AuditStatus,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO gateway_log (gateway, description, status) VALUES ($1, $2, $3)")
            .bind(gateway)
            .bind(description)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
