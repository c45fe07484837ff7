//! PayPal: order-based flow behind an OAuth2 client-credentials exchange.
//!
//! Every business call is a two-step sequential protocol: acquire a bearer
//! token, then hit the orders API. Token acquisition failure short-circuits
//! the attempt and surfaces as a failed result. Tokens are cached per client
//! id with an expiry slack; the cache is an optimization only and a miss
//! just re-runs the exchange.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::app::config::GatewayConfig;
use crate::error::{AdapterError, TransportError};
use crate::models::{
    CanonicalStatus, PaymentProviderResult, PaymentRequest, ProviderCredentials, RefundRequest,
    WebhookVerificationRequest,
};
use crate::services::providers::{endpoint, provider_message, rejection, ProviderAdapter};
use crate::services::status;
use crate::services::transport::{HttpResponse, TransportClient};
use crate::utils::money;
use tracing::warn;

pub const PROVIDER_ID: &str = "paypal";

const DEFAULT_CURRENCY: &str = "USD";
const BRAND_NAME: &str = "Paygate Checkout";
const LOCALE: &str = "en-US";
const APPROVE_REL: &str = "approve";

#[derive(Serialize)]
struct OrderPayload<'a> {
    intent: &'static str,
    purchase_units: Vec<PurchaseUnit<'a>>,
    application_context: ApplicationContext<'a>,
}

#[derive(Serialize)]
struct PurchaseUnit<'a> {
    reference_id: &'a str,
    amount: OrderAmount<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_id: Option<&'a str>,
}

#[derive(Serialize)]
struct OrderAmount<'a> {
    currency_code: &'a str,
    value: String,
}

#[derive(Serialize)]
struct ApplicationContext<'a> {
    brand_name: &'static str,
    locale: &'static str,
    shipping_preference: &'static str,
    user_action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancel_url: Option<&'a str>,
}

#[derive(Serialize)]
struct RefundPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<OrderAmount<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note_to_payer: Option<&'a str>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

pub struct PaypalAdapter {
    token_cache: DashMap<String, CachedToken>,
    token_slack_secs: u64,
}

impl PaypalAdapter {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            token_cache: DashMap::new(),
            token_slack_secs: config.token_slack_secs,
        }
    }

    /// Cached-or-fresh bearer token for this credentials set.
    async fn bearer_token(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
    ) -> Result<String, AdapterError> {
        let client_id = ProviderCredentials::require(&credentials.client_id, "client_id")?;
        let client_secret =
            ProviderCredentials::require(&credentials.client_secret, "client_secret")?;

        if let Some(cached) = self.token_cache.get(client_id) {
            if cached.expires_at > Utc::now() {
                return Ok(cached.access_token.clone());
            }
        }

        let response = transport
            .post_form(
                &endpoint(base_url, "v1/oauth2/token"),
                Some((client_id, client_secret)),
                &[("grant_type", "client_credentials")],
            )
            .await?;
        if !response.is_success() {
            return Err(AdapterError::Authentication(provider_message(&response)));
        }

        let token: TokenResponse = serde_json::from_str(&response.body).map_err(|_| {
            AdapterError::Authentication("token endpoint returned malformed JSON".into())
        })?;

        let ttl = token.expires_in.saturating_sub(self.token_slack_secs);
        if ttl > 0 {
            self.token_cache.insert(
                client_id.to_string(),
                CachedToken {
                    access_token: token.access_token.clone(),
                    expires_at: Utc::now() + Duration::seconds(ttl as i64),
                },
            );
        }
        Ok(token.access_token)
    }

    fn bearer_headers(token: &str) -> Result<HeaderMap, AdapterError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                AdapterError::Authentication("bearer token is not header-safe".into())
            })?,
        );
        Ok(headers)
    }

    /// Parse a response whose `status` token is meaningful (refund and
    /// reconcile flows, unlike order creation where the flow is pending by
    /// definition until the customer approves).
    fn parse_status_response(
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
        let external_id = raw.get("id").and_then(|v| v.as_str()).map(str::to_string);
        let redirect_url = approve_link(&raw);

        let normalized = status::normalize(PROVIDER_ID, &token)?;
        Ok(match normalized {
            CanonicalStatus::Failed => PaymentProviderResult::failed_with_reference(
                external_id,
                format!("provider reported status \"{token}\""),
                Some(raw),
            ),
            s => PaymentProviderResult::with_status(s, external_id, redirect_url, raw),
        })
    }

    async fn try_refund(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        refund: &RefundRequest,
    ) -> Result<PaymentProviderResult, AdapterError> {
        let token = self.bearer_token(transport, base_url, credentials).await?;
        let payload = RefundPayload {
            amount: refund.amount.map(|amount| OrderAmount {
                currency_code: refund.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                value: money::format_amount(amount),
            }),
            note_to_payer: refund.reason.as_deref(),
        };
        let body = serde_json::to_vec(&payload)?;
        let url = endpoint(
            base_url,
            &format!("v2/payments/captures/{}/refund", refund.external_id),
        );
        let response = transport
            .post_json(&url, Self::bearer_headers(&token)?, body)
            .await?;
        self.parse_status_response(&response)
    }

    async fn try_reconcile(
        &self,
        transport: &TransportClient,
        base_url: &str,
        credentials: &ProviderCredentials,
        external_id: &str,
    ) -> Result<PaymentProviderResult, AdapterError> {
        let token = self.bearer_token(transport, base_url, credentials).await?;
        let url = endpoint(base_url, &format!("v2/checkout/orders/{external_id}"));
        let response = transport.get(&url, Self::bearer_headers(&token)?).await?;
        self.parse_status_response(&response)
    }
}

#[async_trait]
impl ProviderAdapter for PaypalAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn translate_request(
        &self,
        request: &PaymentRequest,
        _credentials: &ProviderCredentials,
    ) -> Result<serde_json::Value, AdapterError> {
        let payload = OrderPayload {
            intent: "CAPTURE",
            purchase_units: vec![PurchaseUnit {
                reference_id: &request.transaction_id,
                amount: OrderAmount {
                    currency_code: request.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                    value: money::format_amount(request.amount),
                },
                description: request.metadata_str("description"),
                invoice_id: request.invoice_id.as_deref(),
            }],
            application_context: ApplicationContext {
                brand_name: BRAND_NAME,
                locale: LOCALE,
                shipping_preference: "NO_SHIPPING",
                user_action: "PAY_NOW",
                return_url: request.return_url.as_deref(),
                // No dedicated cancel page in the canonical request; callers
                // that want one set it in metadata.
                cancel_url: request
                    .metadata_str("cancel_url")
                    .or(request.return_url.as_deref()),
            },
        };
        Ok(serde_json::to_value(payload)?)
    }

    async fn authenticate(
        &self,
        transport: &TransportClient,
        base_url: &str,
        _body: &[u8],
        credentials: &ProviderCredentials,
    ) -> Result<HeaderMap, AdapterError> {
        let token = self.bearer_token(transport, base_url, credentials).await?;
        Self::bearer_headers(&token)
    }

    async fn invoke(
        &self,
        transport: &TransportClient,
        base_url: &str,
        body: Vec<u8>,
        headers: HeaderMap,
    ) -> Result<HttpResponse, TransportError> {
        transport
            .post_json(&endpoint(base_url, "v2/checkout/orders"), headers, body)
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

        let order_id = raw
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AdapterError::MalformedResponse("id".into()))?
            .to_string();
        let redirect_url = approve_link(&raw);

        // An order is pending by definition until the customer approves on
        // the hosted page, whatever literal token came back. A missing
        // approve link is not an error; the caller just gets no redirect.
        Ok(PaymentProviderResult::pending(
            Some(order_id),
            redirect_url,
            raw,
        ))
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

    /// Fail closed: authenticity can only be proven by asking the provider,
    /// and no remote verification call is wired up here.
    fn verify_webhook(&self, _request: &WebhookVerificationRequest<'_>) -> bool {
        warn!(
            provider = PROVIDER_ID,
            "webhook rejected: remote verification is not configured"
        );
        false
    }
}

/// The approval link among the response's relation-tagged links, if any.
fn approve_link(raw: &serde_json::Value) -> Option<String> {
    raw.get("links")?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(|r| r.as_str()) == Some(APPROVE_REL))
        .and_then(|link| link.get("href"))
        .and_then(|href| href.as_str())
        .map(str::to_string)
}
