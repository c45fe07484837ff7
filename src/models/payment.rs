use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Caller intent to charge a customer through one provider.
///
/// Immutable once constructed; owned by the caller for the duration of one
/// adapter invocation. `transaction_id` is the caller-assigned idempotency
/// and correlation key, unique per attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub transaction_id: String,
    /// Positive decimal amount; minor-unit semantics are the provider's.
    pub amount: f64,
    /// ISO 4217 code; each adapter substitutes its own default when absent.
    pub currency: Option<String>,
    pub customer_id: Option<String>,
    pub invoice_id: Option<String>,
    pub return_url: Option<String>,
    pub callback_url: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl PaymentRequest {
    pub fn new(transaction_id: impl Into<String>, amount: f64) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            amount,
            currency: None,
            customer_id: None,
            invoice_id: None,
            return_url: None,
            callback_url: None,
            metadata: HashMap::new(),
        }
    }

    /// String-valued metadata entry, if present and actually a string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Caller intent to refund a previously created payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Provider-assigned reference of the payment (or capture) being refunded.
    pub external_id: String,
    /// Caller correlation key for this refund attempt.
    pub transaction_id: String,
    /// Absent means a full refund.
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub reason: Option<String>,
}

/// The three-valued normalized outcome every provider response maps into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalStatus {
    Pending,
    Completed,
    Failed,
}

/// Uniform result returned by every adapter invocation.
///
/// Invariant: `error` is `Some` if and only if `status` is `Failed`. The
/// constructors below are the only way this crate builds one, so the
/// invariant holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProviderResult {
    /// Provider-assigned reference; absent when the call failed before the
    /// provider acknowledged it.
    pub external_id: Option<String>,
    pub status: CanonicalStatus,
    /// Present when the provider requires a hosted checkout/approval step.
    pub redirect_url: Option<String>,
    /// Opaque provider payload retained for audit.
    pub raw_response: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl PaymentProviderResult {
    pub fn pending(
        external_id: Option<String>,
        redirect_url: Option<String>,
        raw_response: serde_json::Value,
    ) -> Self {
        Self {
            external_id,
            status: CanonicalStatus::Pending,
            redirect_url,
            raw_response: Some(raw_response),
            error: None,
        }
    }

    pub fn completed(
        external_id: Option<String>,
        redirect_url: Option<String>,
        raw_response: serde_json::Value,
    ) -> Self {
        Self {
            external_id,
            status: CanonicalStatus::Completed,
            redirect_url,
            raw_response: Some(raw_response),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>, raw_response: Option<serde_json::Value>) -> Self {
        Self {
            external_id: None,
            status: CanonicalStatus::Failed,
            redirect_url: None,
            raw_response,
            error: Some(error.into()),
        }
    }

    /// Failed result that still carries the provider's reference, for
    /// rejections that happened after the provider acknowledged the attempt.
    pub fn failed_with_reference(
        external_id: Option<String>,
        error: impl Into<String>,
        raw_response: Option<serde_json::Value>,
    ) -> Self {
        Self {
            external_id,
            status: CanonicalStatus::Failed,
            redirect_url: None,
            raw_response,
            error: Some(error.into()),
        }
    }

    /// Build a success-shaped result from an already-normalized status.
    pub fn with_status(
        status: CanonicalStatus,
        external_id: Option<String>,
        redirect_url: Option<String>,
        raw_response: serde_json::Value,
    ) -> Self {
        match status {
            CanonicalStatus::Pending => Self::pending(external_id, redirect_url, raw_response),
            CanonicalStatus::Completed => Self::completed(external_id, redirect_url, raw_response),
            CanonicalStatus::Failed => Self::failed_with_reference(
                external_id,
                "provider reported a failed status",
                Some(raw_response),
            ),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == CanonicalStatus::Failed
    }
}
