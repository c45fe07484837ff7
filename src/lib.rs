//! Payment provider integration layer.
//!
//! One uniform contract (charge, refund, reconcile, webhook-verify) over
//! heterogeneous provider wire protocols. Given a caller's intent, the
//! gateway selects the adapter registered for the provider id, translates
//! the request into the provider's native shape, authenticates the call
//! (pre-shared-key HMAC, static API key, or OAuth2 client-credentials),
//! executes it under a bounded timeout, and normalizes the response into the
//! canonical {pending, completed, failed} vocabulary.
//!
//! Failure philosophy: "the call completed, payment failed" and "the call
//! could not complete" look identical to callers. Both are a
//! [`PaymentProviderResult`] with a failed status and a populated error.
//! The only `Err` a caller ever sees is an unknown provider id.
//!
//! ```no_run
//! use paygate::{GatewayConfig, PaymentGateway, PaymentRequest, ProviderCredentials};
//!
//! # async fn demo() -> Result<(), paygate::GatewayError> {
//! let gateway = PaymentGateway::new(&GatewayConfig::from_env())?;
//! let credentials = ProviderCredentials {
//!     api_key: Some("key".into()),
//!     merchant_id: Some("M-1".into()),
//!     shared_secret: Some("secret".into()),
//!     ..Default::default()
//! };
//! let request = PaymentRequest::new("T1", 100.0);
//! let result = gateway
//!     .process_payment("tahseel", &credentials, &request, "https://api.tahseel.example")
//!     .await?;
//! println!("{:?} {:?}", result.status, result.redirect_url);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use app::config::GatewayConfig;
pub use error::{AdapterError, GatewayError, TransportError, UnrecognizedStatus};
pub use models::{
    CanonicalStatus, PaymentProviderResult, PaymentRequest, ProviderCredentials, RefundRequest,
    WebhookVerificationRequest,
};
pub use services::gateway::PaymentGateway;
pub use services::providers::ProviderAdapter;
