//! HTTP Adapters Module
//!
//! Two thin hosting adapters around [`crate::verification::Verifier`]:
//! - [`ApiServer`]: long-running warp server exposing `POST /verify-payment`
//! - [`FunctionHandler`]: single-invocation handler for serverless hosting
//!
//! Both parse the body with [`parse_request_body`] and shape replies with
//! [`crate::verification::into_reply`], so they agree on every status code.

mod function;
mod server;

pub use function::{FunctionEvent, FunctionHandler, FunctionResponse};
pub use server::{handle_rejection, ApiServer, HealthResponse};

use serde_json::Value;

use crate::error::VerifyError;
use crate::verification::VerificationRequest;

/// Route path served by both adapters.
pub const VERIFY_PATH: &str = "verify-payment";

/// Largest request body the server accepts (same default as Express's JSON parser).
pub const MAX_BODY_BYTES: u64 = 100 * 1024;

/// Parses a request body into a [`VerificationRequest`].
///
/// An empty body, or valid JSON that is not an object, is treated as `{}` so
/// it is reported as a missing reference rather than malformed JSON.
pub fn parse_request_body(body: &[u8]) -> Result<VerificationRequest, VerifyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(VerificationRequest::default());
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| VerifyError::InvalidBody(e.to_string()))?;
    if !value.is_object() {
        return Ok(VerificationRequest::default());
    }
    serde_json::from_value(value).map_err(|e| VerifyError::InvalidBody(e.to_string()))
}
