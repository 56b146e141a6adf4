//! Payment Verification Module
//!
//! Request/response types and the rules that decide whether a gateway
//! transaction counts as verified for a given client request. Both hosting
//! adapters (warp server and single-invocation function) call into
//! [`Verifier`]; neither carries verification logic of its own.

mod reconcile;

pub use reconcile::{amounts_match, currencies_match, normalize_amount, reconcile, Reconciliation};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;
use warp::http::StatusCode;

use crate::config::Config;
use crate::error::VerifyError;
use crate::gateway_client::{GatewayClient, GatewayTransaction};

// ============================================================================
// REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Body of `POST /verify-payment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Gateway transaction reference (required)
    #[serde(default)]
    pub reference: Option<String>,
    /// Payer email; accepted for client convenience, not used in verification,
    /// so any JSON type is tolerated
    #[serde(default)]
    pub email: Option<Value>,
    /// Expected currency code, compared case-insensitively
    #[serde(default)]
    pub currency: Option<String>,
    /// Expected amount, as a JSON number or numeric string, in either the
    /// smallest or the main currency unit
    #[serde(default)]
    pub amount: Option<Value>,
}

impl VerificationRequest {
    /// Returns the reference as sent, or `MissingReference` when absent or blank.
    ///
    /// Surrounding whitespace only matters for the blank check; the gateway is
    /// queried with the caller's value unchanged.
    pub fn reference(&self) -> Result<&str, VerifyError> {
        self.reference
            .as_deref()
            .filter(|reference| !reference.trim().is_empty())
            .ok_or(VerifyError::MissingReference)
    }
}

/// JSON body returned by both adapters.
///
/// Success: `{verified, data}`. Failure: `{verified: false, error}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<GatewayTransaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl VerificationResponse {
    pub fn success(verified: bool, transaction: GatewayTransaction) -> Self {
        Self {
            verified,
            data: Some(transaction),
            error: None,
        }
    }

    pub fn failure(err: &VerifyError) -> Self {
        Self {
            verified: false,
            data: None,
            error: Some(err.error_payload()),
        }
    }
}

/// Maps a verification outcome to the status code and body sent to the caller.
///
/// Any completed verification is a 200, including `verified: false`.
pub fn into_reply(result: Result<VerificationResponse, VerifyError>) -> (StatusCode, VerificationResponse) {
    match result {
        Ok(response) => (StatusCode::OK, response),
        Err(err) => (err.status_code(), VerificationResponse::failure(&err)),
    }
}

// ============================================================================
// VERIFIER
// ============================================================================

/// Verifies transaction references against the gateway.
///
/// Holds no per-request state; clone freely.
#[derive(Clone)]
pub struct Verifier {
    gateway: GatewayClient,
}

impl Verifier {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }

    /// Builds a verifier from configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(Verifier)` - Secret key present and gateway client built
    /// * `Err(anyhow::Error)` - Secret key missing or client construction failed
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let secret = config.require_secret()?;
        let gateway = GatewayClient::new(&config.gateway, secret)?;
        Ok(Self::new(gateway))
    }

    /// Verifies one request: queries the gateway and reconciles the result.
    ///
    /// # Returns
    ///
    /// * `Ok(VerificationResponse)` - Gateway answered; `verified` says whether it matched
    /// * `Err(VerifyError)` - Missing reference or gateway failure
    pub async fn verify(&self, request: &VerificationRequest) -> Result<VerificationResponse, VerifyError> {
        let reference = request.reference()?;
        let request_id = Uuid::new_v4();
        let span = info_span!("verify_payment", %request_id, reference);

        async move {
            debug!(
                "Verification requested (amount: {:?}, currency: {:?})",
                request.amount, request.currency
            );

            let transaction = self.gateway.verify_transaction(reference).await?;
            let outcome = reconcile(&transaction, request);

            if outcome.verified() {
                info!("Transaction verified");
            } else {
                warn!(
                    "Transaction not verified (status: {:?}, amount_ok: {:?}, currency_ok: {:?})",
                    transaction.status(),
                    outcome.amount_ok,
                    outcome.currency_ok
                );
            }

            Ok::<_, VerifyError>(VerificationResponse::success(outcome.verified(), transaction))
        }
        .instrument(span)
        .await
    }
}
