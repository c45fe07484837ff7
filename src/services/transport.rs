//! Outbound HTTP with enforced timeouts and structured error capture.
//!
//! One `reqwest::Client` is built at gateway construction and shared by every
//! adapter. A completed exchange of any status code comes back as an
//! [`HttpResponse`]; only network-level failures (timeout, connection, body
//! read) are errors, because a provider's business error message lives in its
//! response body and the adapter must be able to read it.

use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::debug;

use crate::app::config::GatewayConfig;
use crate::error::TransportError;

/// A completed HTTP exchange, whatever the provider answered.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; malformed bodies yield `None` rather than an
    /// error so callers can still report the raw text.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

pub struct TransportClient {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl TransportClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self {
            client,
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// POST pre-serialized JSON bytes.
    ///
    /// The body is sent exactly as given so a signature computed over those
    /// bytes stays byte-identical to what goes on the wire.
    pub async fn post_json(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Vec<u8>,
    ) -> Result<HttpResponse, TransportError> {
        self.validate(url)?;
        debug!(url, "POST json");
        let response = self
            .client
            .post(url)
            .headers(headers)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;
        self.read(url, response).await
    }

    /// POST a form body, optionally under HTTP Basic auth. Used for OAuth2
    /// token exchanges.
    pub async fn post_form(
        &self,
        url: &str,
        basic_auth: Option<(&str, &str)>,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        self.validate(url)?;
        debug!(url, "POST form");
        let mut request = self.client.post(url).form(form);
        if let Some((user, password)) = basic_auth {
            request = request.basic_auth(user, Some(password));
        }
        let response = request
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;
        self.read(url, response).await
    }

    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse, TransportError> {
        self.validate(url)?;
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;
        self.read(url, response).await
    }

    fn validate(&self, raw: &str) -> Result<(), TransportError> {
        url::Url::parse(raw).map_err(|source| TransportError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;
        Ok(())
    }

    fn request_error(&self, url: &str, source: reqwest::Error) -> TransportError {
        if source.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            TransportError::Request {
                url: url.to_string(),
                source,
            }
        }
    }

    async fn read(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<HttpResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Body {
                url: url.to_string(),
                source,
            })?;
        Ok(HttpResponse { status, body })
    }
}
