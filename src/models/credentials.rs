use std::fmt;

use crate::error::AdapterError;

/// Per-provider secret bundle, loaded by the caller's configuration layer
/// before each call. The gateway never persists it, and the `Debug` impl
/// redacts every populated field so it cannot leak through logs.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub api_key: Option<String>,
    pub merchant_id: Option<String>,
    pub shared_secret: Option<String>,
    pub pin: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl ProviderCredentials {
    /// Fetch a required field, mapping absence to an authentication failure
    /// so adapters can surface "which secret was missing" in the result.
    pub fn require<'a>(
        field: &'a Option<String>,
        name: &'static str,
    ) -> Result<&'a str, AdapterError> {
        field
            .as_deref()
            .ok_or_else(|| AdapterError::Authentication(format!("missing credential: {name}")))
    }
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "***"
            } else {
                "<unset>"
            }
        }

        f.debug_struct("ProviderCredentials")
            .field("api_key", &redact(&self.api_key))
            .field("merchant_id", &redact(&self.merchant_id))
            .field("shared_secret", &redact(&self.shared_secret))
            .field("pin", &redact(&self.pin))
            .field("client_id", &redact(&self.client_id))
            .field("client_secret", &redact(&self.client_secret))
            .finish()
    }
}
