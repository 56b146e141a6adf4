//! Test module organization
//!
//! This module re-exports test helpers for use in test files.

mod helpers;

#[allow(unused_imports)]
pub use helpers::{
    build_test_config, build_test_verifier, gateway_envelope, mount_verify_response,
    DUMMY_GATEWAY_AMOUNT, DUMMY_REFERENCE, DUMMY_SECRET_KEY,
};
