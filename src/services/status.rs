//! Status normalization: each provider's native vocabulary mapped into the
//! canonical {pending, completed, failed} set.
//!
//! Tokens outside a provider's documented set map to an error, never to a
//! default: an unknown state treated as success or retryable is the riskier
//! mistake when money is moving.

use crate::error::UnrecognizedStatus;
use crate::models::CanonicalStatus;

/// Map one provider-native status token to the canonical set.
///
/// Pure function; unknown providers are handled the same way as unknown
/// tokens so the function stays total.
pub fn normalize(provider_id: &str, token: &str) -> Result<CanonicalStatus, UnrecognizedStatus> {
    let mapped = match provider_id {
        crate::services::providers::tahseel::PROVIDER_ID => match token {
            "created" => Some(CanonicalStatus::Pending),
            "paid" | "refunded" => Some(CanonicalStatus::Completed),
            "failed" | "voided" => Some(CanonicalStatus::Failed),
            _ => None,
        },
        // Mobicash emits upper-case tokens; match case-insensitively since
        // their sandbox has been seen lower-casing them.
        crate::services::providers::mobicash::PROVIDER_ID => {
            match token.to_ascii_uppercase().as_str() {
                "INITIATED" | "PENDING" => Some(CanonicalStatus::Pending),
                "SUCCESS" | "COMPLETED" | "REFUNDED" => Some(CanonicalStatus::Completed),
                "FAILED" | "DECLINED" | "CANCELLED" => Some(CanonicalStatus::Failed),
                _ => None,
            }
        }
        crate::services::providers::paypal::PROVIDER_ID => match token {
            "CREATED" | "SAVED" | "APPROVED" | "PAYER_ACTION_REQUIRED" | "PENDING" => {
                Some(CanonicalStatus::Pending)
            }
            "COMPLETED" => Some(CanonicalStatus::Completed),
            "VOIDED" | "DECLINED" | "FAILED" | "CANCELLED" => Some(CanonicalStatus::Failed),
            _ => None,
        },
        _ => None,
    };

    mapped.ok_or_else(|| UnrecognizedStatus {
        provider: provider_id.to_string(),
        token: token.to_string(),
    })
}
