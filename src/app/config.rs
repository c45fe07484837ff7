use std::env;

/// Runtime knobs for the gateway, read once at construction.
///
/// Every outbound provider call runs under `request_timeout_secs`; expiry is
/// surfaced to the caller as a failed result, never left to the caller's own
/// timeout.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Seconds subtracted from a provider's `expires_in` when caching OAuth2
    /// tokens, so a cached token is never used right at its expiry edge.
    pub token_slack_secs: u64,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            request_timeout_secs: env::var("PAYGATE_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            connect_timeout_secs: env::var("PAYGATE_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            token_slack_secs: env::var("PAYGATE_TOKEN_SLACK_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            token_slack_secs: 30,
        }
    }
}
