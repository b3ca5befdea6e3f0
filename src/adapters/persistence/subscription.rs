use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    application::app_error::{AppError, AppResult},
    application::use_cases::recurring::{NewSubscription, SubscriptionStore},
    domain::entities::subscription::{Subscription, SubscriptionStatus},
};

fn row_to_subscription(row: sqlx::postgres::PgRow) -> Subscription {
    Subscription {
        id: row.get("id"),
        client_id: row.get("client_id"),
        service_id: row.get("service_id"),
        subscription_id: row.get("subscription_id"),
        status: row.get("status"),
        next_payment_date: row.get("next_payment_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = "id, client_id, service_id, subscription_id, status, \
                           next_payment_date, created_at, updated_at";

#[async_trait]
impl SubscriptionStore for PostgresPersistence {
    async fn insert_subscription(&self, subscription: &NewSubscription) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO mollie_subscriptions
                (client_id, service_id, subscription_id, status, next_payment_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(subscription.client_id)
        .bind(subscription.service_id)
        .bind(&subscription.subscription_id)
        .bind(subscription.status)
        .bind(subscription.next_payment_date)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn get_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM mollie_subscriptions WHERE subscription_id = $1",
            SELECT_COLS
        ))
        .bind(subscription_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_subscription))
    }

    async fn get_active_for_client(&self, client_id: i64) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM mollie_subscriptions \
             WHERE client_id = $1 AND status = $2 \
             ORDER BY id LIMIT 1",
            SELECT_COLS
        ))
        .bind(client_id)
        .bind(SubscriptionStatus::Active)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_subscription))
    }

    async fn update_provider_state(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
        next_payment_date: Option<NaiveDate>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE mollie_subscriptions
            SET status = $2, next_payment_date = $3, updated_at = now()
            WHERE subscription_id = $1
            "#,
        )
        .bind(subscription_id)
        .bind(status)
        .bind(next_payment_date)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_canceled(&self, subscription_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE mollie_subscriptions
            SET status = $2, updated_at = now()
            WHERE subscription_id = $1
            "#,
        )
        .bind(subscription_id)
        .bind(SubscriptionStatus::Canceled)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }
}
