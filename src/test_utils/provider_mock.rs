//! Scriptable in-memory mock of the payment provider port.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    application::app_error::{AppError, AppResult},
    application::ports::payment_provider::{
        CreatePaymentRequest, CreateSubscriptionRequest, CustomerId, MandateInfo, Payment,
        PaymentProviderPort, SubscriptionInfo,
    },
};

/// In-memory stand-in for the Mollie API.
///
/// Lookups read seeded state; create calls return the scripted next value
/// and record the request they were given so tests can assert on it. Each
/// write operation can be forced to fail with a provider error.
#[derive(Default)]
pub struct MockPaymentProvider {
    payments: Mutex<HashMap<String, Payment>>,
    next_payment: Mutex<Option<Payment>>,
    mandates: Mutex<HashMap<String, Vec<MandateInfo>>>,
    subscriptions: Mutex<HashMap<String, SubscriptionInfo>>,
    next_subscription: Mutex<Option<SubscriptionInfo>>,
    payment_requests: Mutex<Vec<(CustomerId, CreatePaymentRequest)>>,
    subscription_requests: Mutex<Vec<(CustomerId, CreateSubscriptionRequest)>>,
    create_payment_error: Mutex<Option<String>>,
    list_mandates_error: Mutex<Option<String>>,
    create_subscription_error: Mutex<Option<String>>,
    cancel_subscription_error: Mutex<Option<String>>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the payment returned by `get_payment` for its id.
    pub fn set_payment(&self, payment: Payment) {
        self.payments
            .lock()
            .unwrap()
            .insert(payment.id.clone(), payment);
    }

    /// Script the payment returned by `create_payment`.
    pub fn set_next_payment(&self, payment: Payment) {
        *self.next_payment.lock().unwrap() = Some(payment);
    }

    pub fn fail_create_payment(&self, message: &str) {
        *self.create_payment_error.lock().unwrap() = Some(message.to_string());
    }

    /// Requests passed to `create_payment`, in call order.
    pub fn created_payment_requests(&self) -> Vec<(CustomerId, CreatePaymentRequest)> {
        self.payment_requests.lock().unwrap().clone()
    }

    /// Seed the mandate list returned for a customer. Customers without an
    /// entry report no mandates rather than an error.
    pub fn set_mandates(&self, customer_id: &str, mandates: Vec<MandateInfo>) {
        self.mandates
            .lock()
            .unwrap()
            .insert(customer_id.to_string(), mandates);
    }

    pub fn fail_list_mandates(&self, message: &str) {
        *self.list_mandates_error.lock().unwrap() = Some(message.to_string());
    }

    /// Seed the subscription returned by `get_subscription` for its id.
    pub fn set_subscription(&self, subscription: SubscriptionInfo) {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.id.clone(), subscription);
    }

    /// Script the subscription returned by `create_subscription`.
    pub fn set_next_subscription(&self, subscription: SubscriptionInfo) {
        *self.next_subscription.lock().unwrap() = Some(subscription);
    }

    pub fn fail_create_subscription(&self, message: &str) {
        *self.create_subscription_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_cancel_subscription(&self, message: &str) {
        *self.cancel_subscription_error.lock().unwrap() = Some(message.to_string());
    }

    /// Requests passed to `create_subscription`, in call order.
    pub fn created_subscription_requests(&self) -> Vec<(CustomerId, CreateSubscriptionRequest)> {
        self.subscription_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProviderPort for MockPaymentProvider {
    async fn get_payment(&self, payment_id: &str) -> AppResult<Payment> {
        self.payments
            .lock()
            .unwrap()
            .get(payment_id)
            .cloned()
            .ok_or_else(|| AppError::Provider(format!("payment {payment_id} not found")))
    }

    async fn create_payment(
        &self,
        customer_id: &CustomerId,
        request: &CreatePaymentRequest,
    ) -> AppResult<Payment> {
        if let Some(message) = self.create_payment_error.lock().unwrap().clone() {
            return Err(AppError::Provider(message));
        }
        self.payment_requests
            .lock()
            .unwrap()
            .push((customer_id.clone(), request.clone()));
        self.next_payment
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Provider("no payment scripted".to_string()))
    }

    async fn list_mandates(&self, customer_id: &CustomerId) -> AppResult<Vec<MandateInfo>> {
        if let Some(message) = self.list_mandates_error.lock().unwrap().clone() {
            return Err(AppError::Provider(message));
        }
        Ok(self
            .mandates
            .lock()
            .unwrap()
            .get(customer_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_subscription(
        &self,
        _customer_id: &CustomerId,
        subscription_id: &str,
    ) -> AppResult<SubscriptionInfo> {
        self.subscriptions
            .lock()
            .unwrap()
            .get(subscription_id)
            .cloned()
            .ok_or_else(|| AppError::Provider(format!("subscription {subscription_id} not found")))
    }

    async fn create_subscription(
        &self,
        customer_id: &CustomerId,
        request: &CreateSubscriptionRequest,
    ) -> AppResult<SubscriptionInfo> {
        if let Some(message) = self.create_subscription_error.lock().unwrap().clone() {
            return Err(AppError::Provider(message));
        }
        self.subscription_requests
            .lock()
            .unwrap()
            .push((customer_id.clone(), request.clone()));
        self.next_subscription
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Provider("no subscription scripted".to_string()))
    }

    async fn cancel_subscription(
        &self,
        _customer_id: &CustomerId,
        _subscription_id: &str,
    ) -> AppResult<()> {
        if let Some(message) = self.cancel_subscription_error.lock().unwrap().clone() {
            return Err(AppError::Provider(message));
        }
        Ok(())
    }
}
