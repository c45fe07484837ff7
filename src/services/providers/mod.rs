//! Provider adapters: one module per payment network, all implementing the
//! same capability surface so the dispatcher stays pure routing.

pub mod mobicash;
pub mod paypal;
pub mod tahseel;

pub use mobicash::MobicashAdapter;
pub use paypal::PaypalAdapter;
pub use tahseel::TahseelAdapter;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::warn;

use crate::error::{AdapterError, TransportError};
use crate::models::{
    PaymentProviderResult, PaymentRequest, ProviderCredentials, RefundRequest,
    WebhookVerificationRequest,
};
use crate::services::transport::{HttpResponse, TransportClient};

/// Capability surface of one provider integration.
///
/// The charge pipeline is `translate_request` -> serialize once ->
/// `authenticate` -> `invoke` -> `parse_response`; the provided [`charge`]
/// method composes it and converts every error into a failed result, so no
/// error of any kind crosses the adapter boundary.
///
/// [`charge`]: ProviderAdapter::charge
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable id this adapter is registered under.
    fn id(&self) -> &'static str;

    /// Map the canonical request onto the provider's native payload. Every
    /// field the provider requires comes from the request, the credentials,
    /// or a fixed adapter-level default; absent optionals are omitted, not
    /// sent as null.
    fn translate_request(
        &self,
        request: &PaymentRequest,
        credentials: &ProviderCredentials,
    ) -> Result<serde_json::Value, AdapterError>;

    /// Produce the transport headers that authenticate `body`. For OAuth2
    /// providers this performs the token exchange; its failure short-circuits
    /// the payment attempt.
    async fn authenticate(
        &self,
        transport: &TransportClient,
        base_url: &str,
        body: &[u8],
        credentials: &ProviderCredentials,
    ) -> Result<HeaderMap, AdapterError>;

    /// Execute the business call against the provider endpoint.
    async fn invoke(
        &self,
        transport: &TransportClient,
        base_url: &str,
        body: Vec<u8>,
        headers: HeaderMap,
    ) -> Result<HttpResponse, TransportError>;

    /// Normalize the provider-native response into the uniform result.
    fn parse_response(&self, response: &HttpResponse)
        -> Result<PaymentProviderResult, AdapterError>;

    /// Full charge attempt. Always returns a result, never an error.
    async fn charge(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        request: &PaymentRequest,
    ) -> PaymentProviderResult {
        let attempt = async {
            let payload = self.translate_request(request, credentials)?;
            // Serialized once: these exact bytes are both signed and sent.
            let body = serde_json::to_vec(&payload)?;
            let headers = self
                .authenticate(transport, base_url, &body, credentials)
                .await?;
            let response = self.invoke(transport, base_url, body, headers).await?;
            self.parse_response(&response)
        };

        match attempt.await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    provider = self.id(),
                    transaction = %request.transaction_id,
                    error = %e,
                    "charge attempt failed"
                );
                PaymentProviderResult::failed(e.to_string(), None)
            }
        }
    }

    /// Refund a previously created payment. Always returns a result.
    async fn refund(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        refund: &RefundRequest,
    ) -> PaymentProviderResult;

    /// Fetch the provider's current view of a payment and normalize it.
    /// Always returns a result.
    async fn reconcile(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        external_id: &str,
    ) -> PaymentProviderResult;

    /// Authenticity verdict for an inbound notification.
    fn verify_webhook(&self, request: &WebhookVerificationRequest<'_>) -> bool;
}

/// Most specific failure text available in a provider response: the message
/// the provider put in the body when there is one, the bare HTTP status
/// otherwise.
pub(crate) fn provider_message(response: &HttpResponse) -> String {
    if let Some(body) = response.json() {
        for key in ["message", "error_description", "error", "detail"] {
            if let Some(text) = body.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    format!("HTTP {}", response.status)
}

/// Non-2xx business answer -> rejection carrying the provider's own message.
pub(crate) fn rejection(response: &HttpResponse) -> AdapterError {
    AdapterError::ProviderRejected(provider_message(response))
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
