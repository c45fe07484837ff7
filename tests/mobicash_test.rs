//! Contract tests for the Mobicash adapter, including timeout surfacing.

use std::time::Duration;

use paygate::{
    CanonicalStatus, GatewayConfig, PaymentGateway, PaymentRequest, ProviderCredentials,
    RefundRequest,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> ProviderCredentials {
    ProviderCredentials {
        api_key: Some("mk_live_1".into()),
        merchant_id: Some("MC-9".into()),
        pin: Some("4321".into()),
        ..Default::default()
    }
}

fn gateway() -> PaymentGateway {
    PaymentGateway::new(&GatewayConfig::default()).unwrap()
}

#[tokio::test]
async fn initiate_sends_pin_in_body_and_api_key_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/initiate"))
        .and(header("x-api-key", "mk_live_1"))
        .and(body_partial_json(serde_json::json!({
            "merchant_id": "MC-9",
            "pin": "4321",
            "currency": "PKR",
            "reference_number": "T-42"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "transaction_id": "MCX-1",
            "status": "INITIATED",
            "payment_url": "https://mobicash.test/pay/MCX-1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = gateway()
        .process_payment(
            "mobicash",
            &credentials(),
            &PaymentRequest::new("T-42", 350.0),
            &mock_server.uri(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, CanonicalStatus::Pending);
    assert_eq!(result.external_id.as_deref(), Some("MCX-1"));
    assert_eq!(
        result.redirect_url.as_deref(),
        Some("https://mobicash.test/pay/MCX-1")
    );
}

#[tokio::test]
async fn metadata_mobile_and_description_travel_in_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/initiate"))
        .and(body_partial_json(serde_json::json!({
            "mobile": "+923001234567",
            "description": "order 42"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "transaction_id": "MCX-2",
            "status": "INITIATED"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut request = PaymentRequest::new("T-43", 120.0);
    request
        .metadata
        .insert("mobile".into(), serde_json::json!("+923001234567"));
    request
        .metadata
        .insert("description".into(), serde_json::json!("order 42"));

    let result = gateway()
        .process_payment("mobicash", &credentials(), &request, &mock_server.uri())
        .await
        .unwrap();
    assert_eq!(result.status, CanonicalStatus::Pending);
    assert!(result.redirect_url.is_none());
}

#[tokio::test]
async fn timeout_surfaces_as_failed_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/initiate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "transaction_id": "MCX-3",
                    "status": "INITIATED"
                }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = GatewayConfig {
        request_timeout_secs: 1,
        connect_timeout_secs: 1,
        token_slack_secs: 30,
    };
    let gateway = PaymentGateway::new(&config).unwrap();

    let result = gateway
        .process_payment(
            "mobicash",
            &credentials(),
            &PaymentRequest::new("T-44", 10.0),
            &mock_server.uri(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, CanonicalStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("timed out"));
    assert!(result.external_id.is_none());
}

#[tokio::test]
async fn declined_status_fails_with_provider_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/initiate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "transaction_id": "MCX-4",
            "status": "DECLINED",
            "message": "insufficient wallet balance"
        })))
        .mount(&mock_server)
        .await;

    let result = gateway()
        .process_payment(
            "mobicash",
            &credentials(),
            &PaymentRequest::new("T-45", 9999.0),
            &mock_server.uri(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, CanonicalStatus::Failed);
    assert_eq!(result.external_id.as_deref(), Some("MCX-4"));
    assert_eq!(
        result.error.as_deref(),
        Some("insufficient wallet balance")
    );
}

#[tokio::test]
async fn unknown_status_token_fails_closed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/initiate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "transaction_id": "MCX-5",
            "status": "ESCALATED"
        })))
        .mount(&mock_server)
        .await;

    let result = gateway()
        .process_payment(
            "mobicash",
            &credentials(),
            &PaymentRequest::new("T-46", 5.0),
            &mock_server.uri(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, CanonicalStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("ESCALATED"));
}

#[tokio::test]
async fn refund_and_status_inquiry_reuse_the_pin_contract() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/refund"))
        .and(body_partial_json(serde_json::json!({
            "merchant_id": "MC-9",
            "pin": "4321",
            "transaction_id": "MCX-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "transaction_id": "MCX-1",
            "status": "REFUNDED"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/status"))
        .and(body_partial_json(serde_json::json!({
            "transaction_id": "MCX-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "transaction_id": "MCX-1",
            "status": "SUCCESS"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = gateway();
    let refund = RefundRequest {
        external_id: "MCX-1".into(),
        transaction_id: "T-42-refund".into(),
        amount: None,
        currency: None,
        reason: None,
    };

    let refunded = gateway
        .refund_payment("mobicash", &credentials(), &refund, &mock_server.uri())
        .await
        .unwrap();
    assert_eq!(refunded.status, CanonicalStatus::Completed);

    let reconciled = gateway
        .reconcile_payment("mobicash", &credentials(), "MCX-1", &mock_server.uri())
        .await
        .unwrap();
    assert_eq!(reconciled.status, CanonicalStatus::Completed);
}
