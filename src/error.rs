use thiserror::Error;

/// Errors surfaced to callers of the gateway entry points.
///
/// Every failure mode except an unknown provider id is represented as data
/// (`PaymentProviderResult` with a failed status), so this is the only error
/// a caller has to branch on.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No adapter registered for the requested provider id.
    #[error("unknown payment provider: {0}")]
    UnknownProvider(String),

    /// The HTTP transport could not be constructed.
    #[error("failed to build HTTP transport: {0}")]
    Transport(#[from] TransportError),
}

/// Network-level failures from the transport client.
///
/// A completed HTTP exchange is never a `TransportError`, whatever its status
/// code; adapters inspect the status and body themselves because the
/// provider's error message lives in the body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        source: reqwest::Error,
    },

    #[error("invalid endpoint URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("failed to construct HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// A provider returned a status token outside its documented vocabulary.
///
/// Treating an unknown state as success or as retryable is the riskier error
/// for money movement, so normalization fails closed with this diagnostic.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("provider {provider} returned unrecognized status token \"{token}\"")]
pub struct UnrecognizedStatus {
    pub provider: String,
    pub token: String,
}

/// Failures inside a single adapter invocation.
///
/// None of these cross the adapter boundary: the adapter's charge/refund/
/// reconcile entry points convert them into a failed `PaymentProviderResult`
/// carrying the display string.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Credential material missing or token acquisition rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Provider answered with a non-success business status; its own
    /// message is preserved verbatim.
    #[error("provider rejected the request: {0}")]
    ProviderRejected(String),

    #[error(transparent)]
    UnrecognizedStatus(#[from] UnrecognizedStatus),

    #[error("could not serialize provider payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response parsed as JSON but is missing a field the flow depends on.
    #[error("provider response missing required field: {0}")]
    MalformedResponse(String),
}
