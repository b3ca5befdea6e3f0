use async_trait::async_trait;

use crate::{
    adapters::persistence::PostgresPersistence,
    application::app_error::{AppError, AppResult},
    application::use_cases::recurring::PendingTransactionStore,
};

#[async_trait]
impl PendingTransactionStore for PostgresPersistence {
    async fn upsert_pending(&self, invoice_id: i64, transaction_id: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO mollie_pending_transactions (invoice_id, transaction_id)
            VALUES ($1, $2)
            ON CONFLICT (invoice_id) DO UPDATE
                SET transaction_id = EXCLUDED.transaction_id,
                    created_at = now()
            "#,
        )
        .bind(invoice_id)
        .bind(transaction_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn delete_pending(&self, invoice_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM mollie_pending_transactions WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
