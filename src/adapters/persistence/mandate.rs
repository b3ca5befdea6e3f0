use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    application::app_error::{AppError, AppResult},
    application::use_cases::recurring::MandateStore,
    domain::entities::mandate::{Mandate, MandateMethod, MandateStatus},
};

fn row_to_mandate(row: sqlx::postgres::PgRow) -> Mandate {
    Mandate {
        id: row.get("id"),
        client_id: row.get("client_id"),
        mandate_id: row.get("mandate_id"),
        method: row.get("method"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = "id, client_id, mandate_id, method, status, created_at, updated_at";

#[async_trait]
impl MandateStore for PostgresPersistence {
    async fn get_valid_mandate(
        &self,
        client_id: i64,
        method: Option<MandateMethod>,
    ) -> AppResult<Option<Mandate>> {
        let row = match method {
            Some(method) => {
                sqlx::query(&format!(
                    "SELECT {} FROM mollie_mandates \
                     WHERE client_id = $1 AND status = $2 AND method = $3 \
                     ORDER BY id LIMIT 1",
                    SELECT_COLS
                ))
                .bind(client_id)
                .bind(MandateStatus::Valid)
                .bind(method)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM mollie_mandates \
                     WHERE client_id = $1 AND status = $2 \
                     ORDER BY id LIMIT 1",
                    SELECT_COLS
                ))
                .bind(client_id)
                .bind(MandateStatus::Valid)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(AppError::from)?;
        Ok(row.map(row_to_mandate))
    }

    async fn upsert_mandate(
        &self,
        client_id: i64,
        mandate_id: &str,
        method: MandateMethod,
        status: MandateStatus,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO mollie_mandates (client_id, mandate_id, method, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (mandate_id) DO UPDATE
                SET method = EXCLUDED.method,
                    status = EXCLUDED.status,
                    updated_at = now()
            "#,
        )
        .bind(client_id)
        .bind(mandate_id)
        .bind(method)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }
}
