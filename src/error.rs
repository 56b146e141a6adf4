//! Error definitions for payment verification.
//!
//! A transaction that the gateway reports as failed, or whose amount/currency
//! disagrees with the caller, is not an error: it is a normal result with
//! `verified: false`. The variants here cover requests that could not be
//! verified at all.

use serde_json::Value;
use thiserror::Error;
use warp::http::StatusCode;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Missing reference")]
    MissingReference,

    #[error("Invalid JSON: {0}")]
    InvalidBody(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Server misconfigured: PAYSTACK_SECRET_KEY is not set")]
    MissingSecret,

    #[error("Invalid response from payment gateway")]
    InvalidUpstreamResponse,

    /// Network failure, timeout or non-2xx status from the gateway.
    /// `payload` holds the gateway's JSON error body when it sent one.
    #[error("Payment gateway request failed: {message}")]
    Upstream {
        message: String,
        payload: Option<Value>,
    },
}

impl VerifyError {
    /// HTTP status code reported to the caller for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            VerifyError::MissingReference | VerifyError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            VerifyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            VerifyError::MissingSecret
            | VerifyError::InvalidUpstreamResponse
            | VerifyError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value placed in the `error` field of the JSON response.
    ///
    /// Upstream failures pass the gateway's error body through verbatim when
    /// one was received; everything else is reported as its message text.
    pub fn error_payload(&self) -> Value {
        match self {
            VerifyError::Upstream {
                payload: Some(payload),
                ..
            } => payload.clone(),
            VerifyError::Upstream { message, .. } => Value::String(message.clone()),
            other => Value::String(other.to_string()),
        }
    }
}
