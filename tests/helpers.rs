//! Shared test helpers
//!
//! - **Configuration Builders**: configs and verifiers pointed at a mock gateway
//! - **Gateway Fixtures**: Paystack-shaped envelopes and mock mounting

use payment_verifier::config::{ApiConfig, Config, GatewayConfig};
use payment_verifier::verification::Verifier;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Dummy secret key expected in the bearer header
pub const DUMMY_SECRET_KEY: &str = "sk_test_0000000000000000000000000000000000000000";

/// Dummy transaction reference
pub const DUMMY_REFERENCE: &str = "T685312322670591";

/// Gateway amount in kobo (75,000.00 NGN)
pub const DUMMY_GATEWAY_AMOUNT: i64 = 7_500_000;

// ============================================================================
// CONFIGURATION BUILDERS
// ============================================================================

/// Build a config whose gateway is the given mock server, with any-origin CORS.
#[allow(dead_code)]
pub fn build_test_config(base_url: &str) -> Config {
    Config {
        gateway: GatewayConfig {
            base_url: base_url.to_string(),
            secret_key: Some(DUMMY_SECRET_KEY.to_string()),
            timeout_ms: 2_000,
        },
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
        },
    }
}

/// Build a verifier talking to the given mock server.
#[allow(dead_code)]
pub fn build_test_verifier(base_url: &str) -> Verifier {
    Verifier::from_config(&build_test_config(base_url)).unwrap()
}

// ============================================================================
// GATEWAY FIXTURES
// ============================================================================

/// Paystack verify response envelope around a transaction record.
#[allow(dead_code)]
pub fn gateway_envelope(status: &str, amount: i64, currency: &str) -> Value {
    json!({
        "status": true,
        "message": "Verification successful",
        "data": {
            "id": 4099260516u64,
            "status": status,
            "reference": DUMMY_REFERENCE,
            "amount": amount,
            "currency": currency,
            "gateway_response": "Approved",
            "paid_at": "2024-08-22T09:15:02.000Z",
            "channel": "card",
            "customer": { "email": "customer@example.com" }
        }
    })
}

/// Mount a verify-endpoint mock for `reference` requiring the dummy bearer token.
///
/// Requests without the right token fall through to wiremock's default 404.
#[allow(dead_code)]
pub async fn mount_verify_response(mock_server: &MockServer, reference: &str, response: ResponseTemplate) {
    let authorization = format!("Bearer {}", DUMMY_SECRET_KEY);
    Mock::given(method("GET"))
        .and(path(format!("/transaction/verify/{}", reference)))
        .and(header("Authorization", authorization.as_str()))
        .respond_with(response)
        .mount(mock_server)
        .await;
}
