//! Unit tests for the gateway client

use payment_verifier::config::GatewayConfig;
use payment_verifier::error::VerifyError;
use payment_verifier::gateway_client::GatewayClient;
use serde_json::json;
use wiremock::{MockServer, ResponseTemplate};

#[path = "mod.rs"]
mod test_helpers;
use test_helpers::{gateway_envelope, mount_verify_response, DUMMY_GATEWAY_AMOUNT, DUMMY_REFERENCE, DUMMY_SECRET_KEY};

fn client_for(base_url: &str) -> GatewayClient {
    let config = GatewayConfig {
        base_url: base_url.to_string(),
        secret_key: None,
        timeout_ms: 2_000,
    };
    GatewayClient::new(&config, DUMMY_SECRET_KEY).unwrap()
}

// ============================================================================
// HTTP MOCKING TESTS
// ============================================================================

/// What is tested: verify_transaction() unwraps the envelope
/// Why: Only the inner data object is handed to verification
#[tokio::test]
async fn test_verify_transaction_success() {
    let mock_server = MockServer::start().await;
    let envelope = gateway_envelope("success", DUMMY_GATEWAY_AMOUNT, "NGN");
    mount_verify_response(&mock_server, DUMMY_REFERENCE, ResponseTemplate::new(200).set_body_json(envelope.clone())).await;

    let tx = client_for(&mock_server.uri())
        .verify_transaction(DUMMY_REFERENCE)
        .await
        .unwrap();

    assert_eq!(tx.as_value(), &envelope["data"]);
    assert_eq!(tx.amount(), Some(DUMMY_GATEWAY_AMOUNT as f64));
}

/// What is tested: References with reserved characters
/// Why: The reference must stay a single, percent-encoded path segment
#[tokio::test]
async fn test_verify_transaction_encodes_reference() {
    let mock_server = MockServer::start().await;
    mount_verify_response(
        &mock_server,
        "order%2F42%20retry",
        ResponseTemplate::new(200).set_body_json(gateway_envelope("success", 100, "NGN")),
    )
    .await;

    let result = client_for(&mock_server.uri()).verify_transaction("order/42 retry").await;

    assert!(result.is_ok(), "got {:?}", result.err());
}

/// What is tested: 2xx response that is not JSON
/// Why: Treated as an upstream contract violation
#[tokio::test]
async fn test_verify_transaction_non_json_body() {
    let mock_server = MockServer::start().await;
    mount_verify_response(&mock_server, DUMMY_REFERENCE, ResponseTemplate::new(200).set_body_string("OK")).await;

    let err = client_for(&mock_server.uri())
        .verify_transaction(DUMMY_REFERENCE)
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::InvalidUpstreamResponse));
}

/// What is tested: 2xx envelope whose data is null
/// Why: The wrapper must contain a data object
#[tokio::test]
async fn test_verify_transaction_null_data() {
    let mock_server = MockServer::start().await;
    mount_verify_response(
        &mock_server,
        DUMMY_REFERENCE,
        ResponseTemplate::new(200).set_body_json(json!({"status": true, "message": "ok", "data": null})),
    )
    .await;

    let err = client_for(&mock_server.uri())
        .verify_transaction(DUMMY_REFERENCE)
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::InvalidUpstreamResponse));
}

/// What is tested: Error status without a JSON body
/// Why: The caller falls back to the error message
#[tokio::test]
async fn test_verify_transaction_error_status_without_payload() {
    let mock_server = MockServer::start().await;
    mount_verify_response(&mock_server, DUMMY_REFERENCE, ResponseTemplate::new(502).set_body_string("Bad Gateway")).await;

    let err = client_for(&mock_server.uri())
        .verify_transaction(DUMMY_REFERENCE)
        .await
        .unwrap_err();

    match &err {
        VerifyError::Upstream { message, payload } => {
            assert!(message.contains("502"));
            assert!(payload.is_none());
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
    assert_eq!(err.error_payload(), json!("Gateway returned error status 502 Bad Gateway"));
}

/// What is tested: Gateway unreachable
/// Why: Network failures surface as upstream errors, not panics
#[tokio::test]
async fn test_verify_transaction_connection_refused() {
    let err = client_for("http://127.0.0.1:1")
        .verify_transaction(DUMMY_REFERENCE)
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::Upstream { payload: None, .. }));
    assert_eq!(err.status_code(), warp::http::StatusCode::INTERNAL_SERVER_ERROR);
}
