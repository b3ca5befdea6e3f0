//! In-memory mocks for the gateway's local persistence stores.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    application::app_error::{AppError, AppResult},
    application::use_cases::recurring::{
        MandateStore, NewSubscription, PendingTransactionStore, SubscriptionStore,
    },
    domain::entities::{
        mandate::{Mandate, MandateMethod, MandateStatus},
        pending_transaction::PendingTransaction,
        subscription::{Subscription, SubscriptionStatus},
    },
};

/// In-memory implementation of MandateStore for testing.
#[derive(Default)]
pub struct InMemoryMandateStore {
    mandates: Mutex<Vec<Mandate>>,
}

impl InMemoryMandateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored mandates, in insertion order (for test assertions).
    pub fn get_all(&self) -> Vec<Mandate> {
        self.mandates.lock().unwrap().clone()
    }
}

#[async_trait]
impl MandateStore for InMemoryMandateStore {
    async fn get_valid_mandate(
        &self,
        client_id: i64,
        method: Option<MandateMethod>,
    ) -> AppResult<Option<Mandate>> {
        Ok(self
            .mandates
            .lock()
            .unwrap()
            .iter()
            .find(|m| {
                m.client_id == client_id
                    && m.status.is_valid()
                    && method.is_none_or(|wanted| m.method == wanted)
            })
            .cloned())
    }

    async fn upsert_mandate(
        &self,
        client_id: i64,
        mandate_id: &str,
        method: MandateMethod,
        status: MandateStatus,
    ) -> AppResult<()> {
        let mut mandates = self.mandates.lock().unwrap();
        let now = chrono::Utc::now().naive_utc();
        if let Some(existing) = mandates.iter_mut().find(|m| m.mandate_id == mandate_id) {
            existing.method = method;
            existing.status = status;
            existing.updated_at = Some(now);
        } else {
            let id = mandates.len() as i64 + 1;
            mandates.push(Mandate {
                id,
                client_id,
                mandate_id: mandate_id.to_string(),
                method,
                status,
                created_at: now,
                updated_at: None,
            });
        }
        Ok(())
    }
}

/// In-memory implementation of SubscriptionStore for testing.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    rows: Mutex<Vec<Subscription>>,
    insert_conflict: Mutex<bool>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing local subscription row.
    pub fn seed(&self, subscription: Subscription) {
        self.rows.lock().unwrap().push(subscription);
    }

    /// Make inserts fail the way a unique constraint violation does.
    pub fn set_insert_conflict(&self, conflict: bool) {
        *self.insert_conflict.lock().unwrap() = conflict;
    }

    /// All stored rows, in insertion order (for test assertions).
    pub fn get_all(&self) -> Vec<Subscription> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn insert_subscription(&self, subscription: &NewSubscription) -> AppResult<()> {
        if *self.insert_conflict.lock().unwrap() {
            return Err(AppError::InvalidInput(
                "subscription already exists".to_string(),
            ));
        }
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(Subscription {
            id,
            client_id: subscription.client_id,
            service_id: subscription.service_id,
            subscription_id: subscription.subscription_id.clone(),
            status: subscription.status,
            next_payment_date: subscription.next_payment_date,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: None,
        });
        Ok(())
    }

    async fn get_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> AppResult<Option<Subscription>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.subscription_id == subscription_id)
            .cloned())
    }

    async fn get_active_for_client(&self, client_id: i64) -> AppResult<Option<Subscription>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.client_id == client_id && s.status.is_active())
            .cloned())
    }

    async fn update_provider_state(
        &self,
        subscription_id: &str,
        status: SubscriptionStatus,
        next_payment_date: Option<NaiveDate>,
    ) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|s| s.subscription_id == subscription_id) {
            Some(row) => {
                row.status = status;
                row.next_payment_date = next_payment_date;
                row.updated_at = Some(chrono::Utc::now().naive_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_canceled(&self, subscription_id: &str) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|s| s.subscription_id == subscription_id) {
            Some(row) => {
                row.status = SubscriptionStatus::Canceled;
                row.updated_at = Some(chrono::Utc::now().naive_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory implementation of PendingTransactionStore for testing.
#[derive(Default)]
pub struct InMemoryPendingStore {
    rows: Mutex<Vec<PendingTransaction>>,
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an awaiting-callback marker.
    pub fn seed(&self, invoice_id: i64, transaction_id: &str) {
        self.rows.lock().unwrap().push(PendingTransaction {
            invoice_id,
            transaction_id: transaction_id.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        });
    }

    /// All stored markers (for test assertions).
    pub fn get_all(&self) -> Vec<PendingTransaction> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl PendingTransactionStore for InMemoryPendingStore {
    async fn upsert_pending(&self, invoice_id: i64, transaction_id: &str) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.invoice_id == invoice_id) {
            row.transaction_id = transaction_id.to_string();
            row.created_at = chrono::Utc::now().naive_utc();
        } else {
            rows.push(PendingTransaction {
                invoice_id,
                transaction_id: transaction_id.to_string(),
                created_at: chrono::Utc::now().naive_utc(),
            });
        }
        Ok(())
    }

    async fn delete_pending(&self, invoice_id: i64) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.invoice_id != invoice_id);
        Ok(rows.len() != before)
    }
}
