//! Paystack API Client Module
//!
//! This module provides a minimal client for the gateway's verify-by-reference
//! endpoint (`GET /transaction/verify/{reference}`). It unwraps the gateway's
//! `{status, message, data}` envelope and hands back the inner transaction
//! record untouched.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::GatewayConfig;
use crate::error::VerifyError;

/// Gateway status string for a completed, successful charge.
pub const SUCCESS_STATUS: &str = "success";

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// Transaction record returned by the gateway.
///
/// Kept as raw JSON so it can be passed back to the caller verbatim; the
/// accessors expose the few fields verification needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayTransaction(Value);

impl GatewayTransaction {
    /// Wraps a JSON value, accepting only objects.
    pub fn from_value(value: Value) -> Option<Self> {
        if value.is_object() {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    /// Amount in the smallest currency unit (kobo, cents).
    pub fn amount(&self) -> Option<f64> {
        self.0.get("amount").and_then(Value::as_f64)
    }

    pub fn currency(&self) -> Option<&str> {
        self.0.get("currency").and_then(Value::as_str)
    }

    pub fn reference(&self) -> Option<&str> {
        self.0.get("reference").and_then(Value::as_str)
    }

    pub fn is_successful(&self) -> bool {
        self.status() == Some(SUCCESS_STATUS)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// HTTP client for the gateway's transaction verification API.
///
/// Built once and shared; `reqwest::Client` pools connections internally.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: Url,
    secret_key: String,
}

impl GatewayClient {
    /// Creates a client for the configured gateway.
    ///
    /// # Arguments
    ///
    /// * `config` - Gateway base URL and timeout
    /// * `secret_key` - Secret API key sent as the bearer token
    ///
    /// # Returns
    ///
    /// * `Ok(GatewayClient)` - Client ready to issue verification calls
    /// * `Err(anyhow::Error)` - Invalid base URL or HTTP client construction failure
    pub fn new(config: &GatewayConfig, secret_key: &str) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid gateway base_url '{}'", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Gateway base_url '{}' cannot be used as a base URL", config.base_url);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            secret_key: secret_key.to_string(),
        })
    }

    /// Builds the verification URL for `reference`.
    ///
    /// The reference is pushed as a single path segment, so `/`, `?`, `#`,
    /// spaces and non-ASCII characters are percent-encoded.
    pub fn verify_url(&self, reference: &str) -> Url {
        let mut url = self.base_url.clone();
        // Cannot fail: `new` rejects cannot-be-a-base URLs.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["transaction", "verify", reference]);
        }
        url
    }

    /// Fetches the transaction record for `reference`.
    ///
    /// # Returns
    ///
    /// * `Ok(GatewayTransaction)` - The envelope's inner `data` object
    /// * `Err(VerifyError::Upstream)` - Network error, timeout, or non-2xx status
    /// * `Err(VerifyError::InvalidUpstreamResponse)` - 2xx body without a `data` object
    pub async fn verify_transaction(&self, reference: &str) -> Result<GatewayTransaction, VerifyError> {
        let url = self.verify_url(reference);
        debug!("Querying gateway: GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(upstream_call_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(upstream_call_error)?;

        if !status.is_success() {
            let payload = serde_json::from_slice::<Value>(&body)
                .ok()
                .filter(|payload| !payload.is_null());
            warn!("Gateway returned error status {} for reference {}", status, reference);
            return Err(VerifyError::Upstream {
                message: format!("Gateway returned error status {}", status),
                payload,
            });
        }

        let envelope: Value = serde_json::from_slice(&body).map_err(|e| {
            warn!("Gateway returned a non-JSON body: {}", e);
            VerifyError::InvalidUpstreamResponse
        })?;

        extract_transaction(envelope).ok_or_else(|| {
            warn!("Gateway response for reference {} has no data object", reference);
            VerifyError::InvalidUpstreamResponse
        })
    }
}

/// Pulls the inner `data` object out of a gateway envelope.
pub fn extract_transaction(envelope: Value) -> Option<GatewayTransaction> {
    match envelope {
        Value::Object(mut fields) => fields.remove("data").and_then(GatewayTransaction::from_value),
        _ => None,
    }
}

fn upstream_call_error(err: reqwest::Error) -> VerifyError {
    let message = if err.is_timeout() {
        format!("Gateway request timed out: {}", err)
    } else {
        err.to_string()
    };
    warn!("Gateway call failed: {}", message);
    VerifyError::Upstream {
        message,
        payload: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_for(base_url: &str) -> GatewayClient {
        let config = GatewayConfig {
            base_url: base_url.to_string(),
            ..GatewayConfig::default()
        };
        GatewayClient::new(&config, "sk_test_123").unwrap()
    }

    #[test]
    fn test_verify_url_encodes_reference() {
        let client = client_for("https://api.paystack.co");
        let url = client.verify_url("ref/with space?x#y");
        assert_eq!(
            url.as_str(),
            "https://api.paystack.co/transaction/verify/ref%2Fwith%20space%3Fx%23y"
        );
    }

    #[test]
    fn test_verify_url_keeps_base_path() {
        let client = client_for("http://127.0.0.1:9000/paystack/");
        let url = client.verify_url("T123");
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/paystack/transaction/verify/T123");
    }

    #[test]
    fn test_extract_transaction_requires_data_object() {
        assert!(extract_transaction(json!({"status": true, "data": {"status": "success"}})).is_some());
        assert!(extract_transaction(json!({"status": true, "message": "ok"})).is_none());
        assert!(extract_transaction(json!({"status": true, "data": null})).is_none());
        assert!(extract_transaction(json!({"status": true, "data": "success"})).is_none());
        assert!(extract_transaction(json!([1, 2, 3])).is_none());
    }

    #[test]
    fn test_transaction_accessors() {
        let tx = GatewayTransaction::from_value(json!({
            "status": "success",
            "amount": 7500000,
            "currency": "NGN",
            "reference": "T123"
        }))
        .unwrap();
        assert!(tx.is_successful());
        assert_eq!(tx.amount(), Some(7_500_000.0));
        assert_eq!(tx.currency(), Some("NGN"));
        assert_eq!(tx.reference(), Some("T123"));
    }
}
