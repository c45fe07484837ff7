pub mod credentials;
pub mod payment;
pub mod webhook;

pub use credentials::ProviderCredentials;
pub use payment::{CanonicalStatus, PaymentProviderResult, PaymentRequest, RefundRequest};
pub use webhook::WebhookVerificationRequest;
