//! Mobicash: payment-initiation gateway authenticated with a static API key
//! header; the merchant PIN travels in the request body. Status tokens come
//! back upper-case and the customer finishes on a hosted payment URL.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::error::{AdapterError, TransportError};
use crate::models::{
    CanonicalStatus, PaymentProviderResult, PaymentRequest, ProviderCredentials, RefundRequest,
    WebhookVerificationRequest,
};
use crate::services::providers::{endpoint, rejection, ProviderAdapter};
use crate::services::transport::{HttpResponse, TransportClient};
use crate::services::{signing, status};

pub const PROVIDER_ID: &str = "mobicash";

const DEFAULT_CURRENCY: &str = "PKR";
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Serialize)]
struct InitiatePayload<'a> {
    merchant_id: &'a str,
    pin: &'a str,
    amount: f64,
    currency: &'a str,
    reference_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Serialize)]
struct RefundPayload<'a> {
    merchant_id: &'a str,
    pin: &'a str,
    transaction_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<f64>,
}

#[derive(Serialize)]
struct StatusPayload<'a> {
    merchant_id: &'a str,
    pin: &'a str,
    transaction_id: &'a str,
}

#[derive(Default)]
pub struct MobicashAdapter;

impl MobicashAdapter {
    pub fn new() -> Self {
        Self
    }

    fn api_key_headers(
        &self,
        credentials: &ProviderCredentials,
    ) -> Result<HeaderMap, AdapterError> {
        let api_key = ProviderCredentials::require(&credentials.api_key, "api_key")?;
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            HeaderValue::from_str(api_key)
                .map_err(|_| AdapterError::Authentication("api_key is not header-safe".into()))?,
        );
        Ok(headers)
    }

    async fn post(
        &self,
        transport: &TransportClient,
        base_url: &str,
        path: &str,
        credentials: &ProviderCredentials,
        payload: impl Serialize,
    ) -> Result<PaymentProviderResult, AdapterError> {
        let body = serde_json::to_vec(&payload)?;
        let headers = self.api_key_headers(credentials)?;
        let response = transport
            .post_json(&endpoint(base_url, path), headers, body)
            .await?;
        self.parse_response(&response)
    }

    async fn try_refund(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        refund: &RefundRequest,
    ) -> Result<PaymentProviderResult, AdapterError> {
        let merchant_id = ProviderCredentials::require(&credentials.merchant_id, "merchant_id")?;
        let pin = ProviderCredentials::require(&credentials.pin, "pin")?;
        let payload = RefundPayload {
            merchant_id,
            pin,
            transaction_id: &refund.external_id,
            amount: refund.amount,
        };
        self.post(transport, base_url, "api/refund", credentials, payload)
            .await
    }

    async fn try_reconcile(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        external_id: &str,
    ) -> Result<PaymentProviderResult, AdapterError> {
        let merchant_id = ProviderCredentials::require(&credentials.merchant_id, "merchant_id")?;
        let pin = ProviderCredentials::require(&credentials.pin, "pin")?;
        let payload = StatusPayload {
            merchant_id,
            pin,
            transaction_id: external_id,
        };
        self.post(transport, base_url, "api/status", credentials, payload)
            .await
    }
}

#[async_trait]
impl ProviderAdapter for MobicashAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn translate_request(
        &self,
        request: &PaymentRequest,
        credentials: &ProviderCredentials,
    ) -> Result<serde_json::Value, AdapterError> {
        let merchant_id = ProviderCredentials::require(&credentials.merchant_id, "merchant_id")?;
        let pin = ProviderCredentials::require(&credentials.pin, "pin")?;
        let payload = InitiatePayload {
            merchant_id,
            pin,
            amount: request.amount,
            currency: request.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
            reference_number: &request.transaction_id,
            mobile: request.metadata_str("mobile"),
            description: request.metadata_str("description"),
        };
        Ok(serde_json::to_value(payload)?)
    }

    async fn authenticate(
        &self,
        _transport: &TransportClient,
        _base_url: &str,
        _body: &[u8],
        credentials: &ProviderCredentials,
    ) -> Result<HeaderMap, AdapterError> {
        // Static key, no derived signature.
        self.api_key_headers(credentials)
    }

    async fn invoke(
        &self,
        transport: &TransportClient,
        base_url: &str,
        body: Vec<u8>,
        headers: HeaderMap,
    ) -> Result<HttpResponse, TransportError> {
        transport
            .post_json(&endpoint(base_url, "api/initiate"), headers, body)
            .await
    }

    fn parse_response(
        &self,
        response: &HttpResponse,
    ) -> Result<PaymentProviderResult, AdapterError> {
        if !response.is_success() {
            return Err(rejection(response));
        }
        let raw = response
            .json()
            .ok_or_else(|| AdapterError::MalformedResponse("body is not JSON".into()))?;

        let token = raw
            .get("status")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AdapterError::MalformedResponse("status".into()))?
            .to_string();
        let external_id = raw
            .get("transaction_id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let redirect_url = raw
            .get("payment_url")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let normalized = status::normalize(PROVIDER_ID, &token)?;
        Ok(match normalized {
            CanonicalStatus::Failed => {
                let message = raw
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("provider reported status \"{token}\""));
                PaymentProviderResult::failed_with_reference(external_id, message, Some(raw))
            }
            s => PaymentProviderResult::with_status(s, external_id, redirect_url, raw),
        })
    }

    async fn refund(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        refund: &RefundRequest,
    ) -> PaymentProviderResult {
        match self.try_refund(transport, base_url, credentials, refund).await {
            Ok(result) => result,
            Err(e) => PaymentProviderResult::failed(e.to_string(), None),
        }
    }

    async fn reconcile(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        external_id: &str,
    ) -> PaymentProviderResult {
        match self
            .try_reconcile(transport, base_url, credentials, external_id)
            .await
        {
            Ok(result) => result,
            Err(e) => PaymentProviderResult::failed(e.to_string(), None),
        }
    }

    fn verify_webhook(&self, request: &WebhookVerificationRequest<'_>) -> bool {
        match request.signature {
            Some(claimed) => signing::verify(request.payload, claimed, request.key),
            None => false,
        }
    }
}
