//! Contract tests for the Tahseel adapter against a mock gateway endpoint.

use paygate::services::signing;
use paygate::{
    CanonicalStatus, GatewayConfig, PaymentGateway, PaymentRequest, ProviderCredentials,
    RefundRequest,
};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> ProviderCredentials {
    ProviderCredentials {
        api_key: Some("tahseel-key".into()),
        merchant_id: Some("M-77".into()),
        shared_secret: Some("s3cret".into()),
        ..Default::default()
    }
}

fn gateway() -> PaymentGateway {
    PaymentGateway::new(&GatewayConfig::default()).unwrap()
}

#[tokio::test]
async fn charge_created_normalizes_to_pending_with_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/payments"))
        .and(header_exists("authorization"))
        .and(header_exists("x-tahseel-signature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "payment_id": "P1",
            "status": "created",
            "checkout_url": "https://pay/x"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut request = PaymentRequest::new("T1", 100.0);
    request.currency = Some("SAR".into());

    let result = gateway()
        .process_payment("tahseel", &credentials(), &request, &mock_server.uri())
        .await
        .unwrap();

    assert_eq!(result.external_id.as_deref(), Some("P1"));
    assert_eq!(result.status, CanonicalStatus::Pending);
    assert_eq!(result.redirect_url.as_deref(), Some("https://pay/x"));
    assert!(result.error.is_none());
    assert!(result.raw_response.is_some());
}

#[tokio::test]
async fn signature_header_verifies_against_transmitted_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "payment_id": "P1",
            "status": "created"
        })))
        .mount(&mock_server)
        .await;

    let request = PaymentRequest::new("T1", 100.0);
    gateway()
        .process_payment("tahseel", &credentials(), &request, &mock_server.uri())
        .await
        .unwrap();

    let received = mock_server.received_requests().await.unwrap();
    let charge = &received[0];
    let claimed = charge
        .headers
        .get("x-tahseel-signature")
        .and_then(|v| v.to_str().ok())
        .expect("signature header missing");

    // The signature must cover the exact bytes that went on the wire.
    assert!(signing::verify(&charge.body, claimed, "s3cret"));
}

#[tokio::test]
async fn provider_rejection_surfaces_body_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/payments"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "message": "amount below minimum"
        })))
        .mount(&mock_server)
        .await;

    let result = gateway()
        .process_payment(
            "tahseel",
            &credentials(),
            &PaymentRequest::new("T1", 0.01),
            &mock_server.uri(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, CanonicalStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("amount below minimum"));
    assert!(result.external_id.is_none());
}

#[tokio::test]
async fn unknown_status_token_fails_closed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "payment_id": "P2",
            "status": "on_hold"
        })))
        .mount(&mock_server)
        .await;

    let result = gateway()
        .process_payment(
            "tahseel",
            &credentials(),
            &PaymentRequest::new("T2", 50.0),
            &mock_server.uri(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, CanonicalStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("on_hold"));
}

#[tokio::test]
async fn failed_status_keeps_provider_reference_and_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "payment_id": "P3",
            "status": "failed",
            "message": "card declined by issuer"
        })))
        .mount(&mock_server)
        .await;

    let result = gateway()
        .process_payment(
            "tahseel",
            &credentials(),
            &PaymentRequest::new("T3", 75.0),
            &mock_server.uri(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, CanonicalStatus::Failed);
    assert_eq!(result.external_id.as_deref(), Some("P3"));
    assert_eq!(result.error.as_deref(), Some("card declined by issuer"));
}

#[tokio::test]
async fn missing_credentials_become_failed_result_not_error() {
    let mock_server = MockServer::start().await;

    let mut creds = credentials();
    creds.shared_secret = None;

    let result = gateway()
        .process_payment(
            "tahseel",
            &creds,
            &PaymentRequest::new("T4", 10.0),
            &mock_server.uri(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, CanonicalStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("shared_secret"));
}

#[tokio::test]
async fn refund_is_signed_and_normalized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/payments/P1/refund"))
        .and(header_exists("x-tahseel-signature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "payment_id": "P1",
            "status": "refunded"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let refund = RefundRequest {
        external_id: "P1".into(),
        transaction_id: "T1-refund".into(),
        amount: Some(40.0),
        currency: None,
        reason: Some("customer request".into()),
    };

    let result = gateway()
        .refund_payment("tahseel", &credentials(), &refund, &mock_server.uri())
        .await
        .unwrap();

    assert_eq!(result.status, CanonicalStatus::Completed);
    assert_eq!(result.external_id.as_deref(), Some("P1"));
}

#[tokio::test]
async fn reconcile_reads_current_provider_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/payments/P1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "payment_id": "P1",
            "status": "paid"
        })))
        .mount(&mock_server)
        .await;

    let result = gateway()
        .reconcile_payment("tahseel", &credentials(), "P1", &mock_server.uri())
        .await
        .unwrap();

    assert_eq!(result.status, CanonicalStatus::Completed);
    assert_eq!(result.external_id.as_deref(), Some("P1"));
}
