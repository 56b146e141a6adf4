//! Single-invocation function handler
//!
//! Serverless hosting: one event in, one response out. Same route semantics
//! as the server, plus explicit method handling since the platform forwards
//! every method to the function. CORS is always permissive here.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};
use warp::http::StatusCode;

use super::parse_request_body;
use crate::config::Config;
use crate::error::VerifyError;
use crate::verification::{into_reply, VerificationResponse, Verifier};

const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// Incoming invocation event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    /// HTTP method of the incoming request
    pub http_method: String,
    /// Request headers (informational); `null` reads as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headers: HashMap<String, String>,
    /// Raw request body, if any
    #[serde(default)]
    pub body: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Response handed back to the hosting platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// Serialized JSON body; empty for preflight replies
    pub body: String,
}

impl FunctionResponse {
    fn cors_headers() -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers.insert("Access-Control-Allow-Methods".to_string(), ALLOWED_METHODS.to_string());
        headers.insert("Access-Control-Allow-Headers".to_string(), "Content-Type".to_string());
        headers
    }

    /// 204 reply to a CORS preflight.
    pub fn preflight() -> Self {
        Self {
            status_code: StatusCode::NO_CONTENT.as_u16(),
            headers: Self::cors_headers(),
            body: String::new(),
        }
    }

    /// JSON reply with CORS headers.
    pub fn json(status: StatusCode, response: &VerificationResponse) -> Self {
        let mut headers = Self::cors_headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if status == StatusCode::METHOD_NOT_ALLOWED {
            headers.insert("Allow".to_string(), ALLOWED_METHODS.to_string());
        }

        let body = serde_json::to_string(response).unwrap_or_else(|e| {
            warn!("Failed to serialize response: {}", e);
            r#"{"verified":false,"error":"Failed to serialize response"}"#.to_string()
        });

        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }
}

/// Handles one invocation at a time; holds no per-request state.
///
/// A missing secret key does not prevent construction: every verification
/// request is answered with a 500 instead, so the platform still gets a
/// well-formed response.
pub struct FunctionHandler {
    verifier: Option<Verifier>,
}

impl FunctionHandler {
    pub fn new(verifier: Option<Verifier>) -> Self {
        Self { verifier }
    }

    /// Builds the handler from configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(FunctionHandler)` - Ready to handle events (possibly without a secret key)
    /// * `Err(anyhow::Error)` - Secret present but gateway client construction failed
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let verifier = match config.require_secret() {
            Ok(_) => Some(Verifier::from_config(config)?),
            Err(e) => {
                warn!("{}; verification requests will fail", e);
                None
            }
        };
        Ok(Self::new(verifier))
    }

    /// Handles one invocation event.
    pub async fn handle(&self, event: &FunctionEvent) -> FunctionResponse {
        let method = event.http_method.trim().to_ascii_uppercase();
        debug!("Function invoked with method {}", method);

        if method == "OPTIONS" {
            return FunctionResponse::preflight();
        }

        let result = if method == "POST" {
            self.verify_body(event.body.as_deref().unwrap_or_default()).await
        } else {
            Err(VerifyError::MethodNotAllowed)
        };

        let (status, response) = into_reply(result);
        FunctionResponse::json(status, &response)
    }

    async fn verify_body(&self, body: &str) -> Result<VerificationResponse, VerifyError> {
        let request = parse_request_body(body.as_bytes())?;
        request.reference()?;
        let verifier = self.verifier.as_ref().ok_or(VerifyError::MissingSecret)?;
        verifier.verify(&request).await
    }
}
