//! Adapter registry and dispatcher: the uniform entry points the rest of the
//! application calls. Pure routing: the gateway looks up the adapter for a
//! provider id and delegates, performing no business logic of its own.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::app::config::GatewayConfig;
use crate::error::GatewayError;
use crate::models::{
    PaymentProviderResult, PaymentRequest, ProviderCredentials, RefundRequest,
    WebhookVerificationRequest,
};
use crate::services::providers::{
    MobicashAdapter, PaypalAdapter, ProviderAdapter, TahseelAdapter,
};
use crate::services::transport::TransportClient;

/// Registry of provider adapters behind one shared transport.
///
/// Every entry point returns `Err` only for an unknown provider id; all
/// other failure modes come back as data, a `PaymentProviderResult` with a
/// failed status.
pub struct PaymentGateway {
    transport: TransportClient,
    adapters: HashMap<&'static str, Arc<dyn ProviderAdapter>>,
}

impl PaymentGateway {
    /// Build the gateway with the built-in adapters registered.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let transport = TransportClient::new(config)?;
        let mut gateway = Self {
            transport,
            adapters: HashMap::new(),
        };
        gateway.register(Arc::new(TahseelAdapter::new()));
        gateway.register(Arc::new(MobicashAdapter::new()));
        gateway.register(Arc::new(PaypalAdapter::new(config)));
        Ok(gateway)
    }

    /// Register an adapter (or replace the one with the same id). New
    /// providers plug in here without touching dispatch code.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.id(), adapter);
    }

    pub fn providers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.adapters.keys().copied()
    }

    fn adapter(&self, provider_id: &str) -> Result<&Arc<dyn ProviderAdapter>, GatewayError> {
        self.adapters
            .get(provider_id)
            .ok_or_else(|| GatewayError::UnknownProvider(provider_id.to_string()))
    }

    /// Charge through the selected provider.
    pub async fn process_payment(
        &self,
        provider_id: &str,
        credentials: &ProviderCredentials,
        request: &PaymentRequest,
        base_url: &str,
    ) -> Result<PaymentProviderResult, GatewayError> {
        let adapter = self.adapter(provider_id)?;
        info!(
            provider = provider_id,
            transaction = %request.transaction_id,
            "dispatching payment"
        );
        Ok(adapter
            .charge(&self.transport, base_url, credentials, request)
            .await)
    }

    /// Refund a previously created payment through the selected provider.
    pub async fn refund_payment(
        &self,
        provider_id: &str,
        credentials: &ProviderCredentials,
        refund: &RefundRequest,
        base_url: &str,
    ) -> Result<PaymentProviderResult, GatewayError> {
        let adapter = self.adapter(provider_id)?;
        info!(
            provider = provider_id,
            transaction = %refund.transaction_id,
            external = %refund.external_id,
            "dispatching refund"
        );
        Ok(adapter
            .refund(&self.transport, base_url, credentials, refund)
            .await)
    }

    /// Fetch the provider's current view of a payment, normalized.
    pub async fn reconcile_payment(
        &self,
        provider_id: &str,
        credentials: &ProviderCredentials,
        external_id: &str,
        base_url: &str,
    ) -> Result<PaymentProviderResult, GatewayError> {
        let adapter = self.adapter(provider_id)?;
        Ok(adapter
            .reconcile(&self.transport, base_url, credentials, external_id)
            .await)
    }

    /// Authenticity verdict for an inbound provider notification.
    pub fn verify_webhook(
        &self,
        provider_id: &str,
        payload: &[u8],
        signature: Option<&str>,
        key: &str,
    ) -> Result<bool, GatewayError> {
        let adapter = self.adapter(provider_id)?;
        Ok(adapter.verify_webhook(&WebhookVerificationRequest {
            payload,
            signature,
            key,
        }))
    }
}
