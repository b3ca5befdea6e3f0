//! Typed client for the Mollie v2 API.
//!
//! Webhooks carry no payload worth trusting; this client is how every
//! callback re-fetches the authoritative state. All failures surface as
//! provider errors, and responses are parsed into typed structures up
//! front so malformed provider data never reaches a use case as a silent
//! null.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::application::app_error::{AppError, AppResult};
use crate::application::ports::payment_provider::{
    CreatePaymentRequest, CreateSubscriptionRequest, CustomerId, MandateInfo, Payment,
    PaymentMetadata, PaymentProviderPort, SubscriptionInfo, SubscriptionMetadata,
};
use crate::domain::entities::amount::Amount;
use crate::domain::entities::mandate::{MandateMethod, MandateStatus};
use crate::domain::entities::payment_mode::PaymentMode;
use crate::domain::entities::payment_status::PaymentStatus;
use crate::domain::entities::sequence_type::SequenceType;

const MOLLIE_API_BASE: &str = "https://api.mollie.com/v2";

#[derive(Clone)]
pub struct MollieClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl MollieClient {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: MOLLIE_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API base. Used by tests against a
    /// local stub server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to read Mollie response: {e}")))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Mollie API error");
            return Err(provider_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Mollie response");
            AppError::Provider(format!("Failed to parse Mollie response: {e}"))
        })
    }
}

#[async_trait]
impl PaymentProviderPort for MollieClient {
    async fn get_payment(&self, payment_id: &str) -> AppResult<Payment> {
        let response = self
            .client
            .get(format!("{}/payments/{}", self.base_url, payment_id))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Mollie request failed: {e}")))?;

        let dto: PaymentDto = self.handle_response(response).await?;
        payment_from_dto(dto)
    }

    async fn create_payment(
        &self,
        customer_id: &CustomerId,
        request: &CreatePaymentRequest,
    ) -> AppResult<Payment> {
        let body = CreatePaymentBody {
            amount: &request.amount,
            description: &request.description,
            redirect_url: request.redirect_url.as_deref(),
            webhook_url: &request.webhook_url,
            sequence_type: request.sequence_type,
            mandate_id: request.mandate_id.as_deref(),
            customer_id: customer_id.as_str(),
            metadata: &request.metadata,
        };

        let response = self
            .client
            .post(format!("{}/payments", self.base_url))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Mollie request failed: {e}")))?;

        let dto: PaymentDto = self.handle_response(response).await?;
        payment_from_dto(dto)
    }

    async fn list_mandates(&self, customer_id: &CustomerId) -> AppResult<Vec<MandateInfo>> {
        let response = self
            .client
            .get(format!(
                "{}/customers/{}/mandates",
                self.base_url,
                customer_id.as_str()
            ))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Mollie request failed: {e}")))?;

        let list: MandateListDto = self.handle_response(response).await?;
        Ok(list
            .embedded
            .mandates
            .into_iter()
            .map(|dto| MandateInfo {
                id: dto.id,
                status: dto.status,
                method: dto.method,
            })
            .collect())
    }

    async fn get_subscription(
        &self,
        customer_id: &CustomerId,
        subscription_id: &str,
    ) -> AppResult<SubscriptionInfo> {
        let response = self
            .client
            .get(format!(
                "{}/customers/{}/subscriptions/{}",
                self.base_url,
                customer_id.as_str(),
                subscription_id
            ))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Mollie request failed: {e}")))?;

        let dto: SubscriptionDto = self.handle_response(response).await?;
        Ok(subscription_from_dto(dto))
    }

    async fn create_subscription(
        &self,
        customer_id: &CustomerId,
        request: &CreateSubscriptionRequest,
    ) -> AppResult<SubscriptionInfo> {
        let body = CreateSubscriptionBody {
            amount: &request.amount,
            interval: &request.interval,
            description: &request.description,
            webhook_url: &request.webhook_url,
            start_date: request.start_date,
            metadata: &request.metadata,
        };

        let response = self
            .client
            .post(format!(
                "{}/customers/{}/subscriptions",
                self.base_url,
                customer_id.as_str()
            ))
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Mollie request failed: {e}")))?;

        let dto: SubscriptionDto = self.handle_response(response).await?;
        Ok(subscription_from_dto(dto))
    }

    async fn cancel_subscription(
        &self,
        customer_id: &CustomerId,
        subscription_id: &str,
    ) -> AppResult<()> {
        let response = self
            .client
            .delete(format!(
                "{}/customers/{}/subscriptions/{}",
                self.base_url,
                customer_id.as_str(),
                subscription_id
            ))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Mollie request failed: {e}")))?;

        // Mollie answers a delete with the canceled subscription object.
        let _: SubscriptionDto = self.handle_response(response).await?;
        Ok(())
    }
}

fn provider_error(status: reqwest::StatusCode, body: &str) -> AppError {
    if let Ok(error) = serde_json::from_str::<MollieErrorResponse>(body) {
        if let Some(detail) = error.detail {
            let title = error.title.unwrap_or_else(|| "Mollie error".to_string());
            return AppError::Provider(format!("{title}: {detail}"));
        }
    }
    AppError::Provider(format!("Mollie API error: {status} - {body}"))
}

/// Validate a payment DTO into the typed model. Missing or malformed
/// required fields are provider errors, never silent nulls.
fn payment_from_dto(dto: PaymentDto) -> AppResult<Payment> {
    dto.amount
        .minor_units()
        .map_err(AppError::Provider)?;

    let metadata = if dto.metadata.is_null() {
        PaymentMetadata::default()
    } else {
        serde_json::from_value(dto.metadata)
            .map_err(|e| AppError::Provider(format!("Malformed payment metadata: {e}")))?
    };

    Ok(Payment {
        id: dto.id,
        mode: dto.mode,
        status: dto.status,
        amount: dto.amount,
        customer_id: dto.customer_id.map(CustomerId::new),
        mandate_id: dto.mandate_id,
        sequence_type: dto.sequence_type,
        metadata,
        checkout_url: dto.links.checkout.map(|link| link.href),
    })
}

fn subscription_from_dto(dto: SubscriptionDto) -> SubscriptionInfo {
    SubscriptionInfo {
        id: dto.id,
        status: dto.status,
        next_payment_date: dto.next_payment_date,
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentDto {
    id: String,
    mode: PaymentMode,
    status: PaymentStatus,
    amount: Amount,
    customer_id: Option<String>,
    mandate_id: Option<String>,
    sequence_type: Option<SequenceType>,
    #[serde(default)]
    metadata: serde_json::Value,
    #[serde(rename = "_links", default)]
    links: LinksDto,
}

#[derive(Debug, Default, Deserialize)]
struct LinksDto {
    checkout: Option<LinkDto>,
}

#[derive(Debug, Deserialize)]
struct LinkDto {
    href: String,
}

#[derive(Debug, Deserialize)]
struct MandateListDto {
    #[serde(rename = "_embedded")]
    embedded: EmbeddedMandatesDto,
}

#[derive(Debug, Deserialize)]
struct EmbeddedMandatesDto {
    mandates: Vec<MandateDto>,
}

#[derive(Debug, Deserialize)]
struct MandateDto {
    id: String,
    status: MandateStatus,
    method: MandateMethod,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionDto {
    id: String,
    status: crate::domain::entities::subscription::SubscriptionStatus,
    next_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct MollieErrorResponse {
    title: Option<String>,
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentBody<'a> {
    amount: &'a Amount,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_url: Option<&'a str>,
    webhook_url: &'a str,
    sequence_type: SequenceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    mandate_id: Option<&'a str>,
    customer_id: &'a str,
    metadata: &'a PaymentMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSubscriptionBody<'a> {
    amount: &'a Amount,
    interval: &'a str,
    description: &'a str,
    webhook_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<NaiveDate>,
    metadata: &'a SubscriptionMetadata,
}
