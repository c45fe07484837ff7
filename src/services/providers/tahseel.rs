//! Tahseel: synchronous create-and-redirect gateway authenticated with a
//! bearer API key plus an HMAC-SHA256 signature over the request body.
//!
//! The signature covers the exact bytes transmitted; the same scheme is used
//! for inbound webhook verification.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::Serialize;

use crate::error::{AdapterError, TransportError};
use crate::models::{
    CanonicalStatus, PaymentProviderResult, PaymentRequest, ProviderCredentials, RefundRequest,
    WebhookVerificationRequest,
};
use crate::services::providers::{endpoint, rejection, ProviderAdapter};
use crate::services::transport::{HttpResponse, TransportClient};
use crate::services::{signing, status};

pub const PROVIDER_ID: &str = "tahseel";

const DEFAULT_CURRENCY: &str = "SAR";
const SIGNATURE_HEADER: &str = "x-tahseel-signature";

#[derive(Serialize)]
struct ChargePayload<'a> {
    merchant_id: &'a str,
    amount: f64,
    currency: &'a str,
    reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a HashMap<String, serde_json::Value>>,
}

#[derive(Serialize)]
struct RefundPayload<'a> {
    merchant_id: &'a str,
    reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Default)]
pub struct TahseelAdapter;

impl TahseelAdapter {
    pub fn new() -> Self {
        Self
    }

    fn signed_headers(
        &self,
        body: &[u8],
        credentials: &ProviderCredentials,
    ) -> Result<HeaderMap, AdapterError> {
        let api_key = ProviderCredentials::require(&credentials.api_key, "api_key")?;
        let secret = ProviderCredentials::require(&credentials.shared_secret, "shared_secret")?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| AdapterError::Authentication("api_key is not header-safe".into()))?,
        );
        headers.insert(
            HeaderName::from_static(SIGNATURE_HEADER),
            HeaderValue::from_str(&signing::sign(body, secret))
                .map_err(|_| AdapterError::Authentication("signature is not header-safe".into()))?,
        );
        Ok(headers)
    }

    fn bearer_headers(
        &self,
        credentials: &ProviderCredentials,
    ) -> Result<HeaderMap, AdapterError> {
        let api_key = ProviderCredentials::require(&credentials.api_key, "api_key")?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| AdapterError::Authentication("api_key is not header-safe".into()))?,
        );
        Ok(headers)
    }

    async fn try_refund(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        refund: &RefundRequest,
    ) -> Result<PaymentProviderResult, AdapterError> {
        let merchant_id = ProviderCredentials::require(&credentials.merchant_id, "merchant_id")?;
        let payload = RefundPayload {
            merchant_id,
            reference: &refund.transaction_id,
            amount: refund.amount,
            reason: refund.reason.as_deref(),
        };
        let body = serde_json::to_vec(&payload)?;
        let headers = self.signed_headers(&body, credentials)?;
        let url = endpoint(base_url, &format!("v1/payments/{}/refund", refund.external_id));
        let response = transport.post_json(&url, headers, body).await?;
        self.parse_response(&response)
    }

    async fn try_reconcile(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        external_id: &str,
    ) -> Result<PaymentProviderResult, AdapterError> {
        let headers = self.bearer_headers(credentials)?;
        let url = endpoint(base_url, &format!("v1/payments/{external_id}"));
        let response = transport.get(&url, headers).await?;
        self.parse_response(&response)
    }
}

#[async_trait]
impl ProviderAdapter for TahseelAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn translate_request(
        &self,
        request: &PaymentRequest,
        credentials: &ProviderCredentials,
    ) -> Result<serde_json::Value, AdapterError> {
        let merchant_id = ProviderCredentials::require(&credentials.merchant_id, "merchant_id")?;
        let payload = ChargePayload {
            merchant_id,
            amount: request.amount,
            currency: request.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
            reference: &request.transaction_id,
            customer_id: request.customer_id.as_deref(),
            invoice_id: request.invoice_id.as_deref(),
            return_url: request.return_url.as_deref(),
            callback_url: request.callback_url.as_deref(),
            metadata: if request.metadata.is_empty() {
                None
            } else {
                Some(&request.metadata)
            },
        };
        Ok(serde_json::to_value(payload)?)
    }

    async fn authenticate(
        &self,
        _transport: &TransportClient,
        _base_url: &str,
        body: &[u8],
        credentials: &ProviderCredentials,
    ) -> Result<HeaderMap, AdapterError> {
        self.signed_headers(body, credentials)
    }

    async fn invoke(
        &self,
        transport: &TransportClient,
        base_url: &str,
        body: Vec<u8>,
        headers: HeaderMap,
    ) -> Result<HttpResponse, TransportError> {
        transport
            .post_json(&endpoint(base_url, "v1/payments"), headers, body)
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
            .get("payment_id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let redirect_url = raw
            .get("checkout_url")
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
