//! Payment Verifier Library
//!
//! This crate provides a relay that verifies Paystack transactions on behalf of
//! a client application. A client submits a transaction reference (plus the
//! amount and currency it expects), the relay queries the gateway's
//! verify-by-reference endpoint and reports whether the transaction is a
//! successful payment matching those expectations.
//!
//! The same verification logic is exposed two ways:
//! - a long-running warp server (`payment-verifier` binary)
//! - a single-invocation function handler (`verify_payment_fn` binary)

pub mod api;
pub mod config;
pub mod error;
pub mod gateway_client;
pub mod verification;

// Re-export commonly used types
pub use config::{ApiConfig, Config, GatewayConfig};
pub use error::VerifyError;
pub use gateway_client::{GatewayClient, GatewayTransaction};
pub use verification::{VerificationRequest, VerificationResponse, Verifier};
