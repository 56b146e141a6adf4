//! Long-running API server
//!
//! Exposes `POST /verify-payment` and `GET /health` over warp, with CORS
//! restricted to the configured origin allow-list.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error, info};
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::{Filter, Rejection, Reply};

use super::{parse_request_body, MAX_BODY_BYTES, VERIFY_PATH};
use crate::config::{ApiConfig, Config};
use crate::verification::{into_reply, VerificationResponse, Verifier};

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Handler for `POST /verify-payment`.
///
/// Always produces a reply; failures are encoded in the status code and the
/// `{verified: false, error}` body.
async fn verify_payment_handler(body: Bytes, verifier: Verifier) -> Result<impl Reply, Rejection> {
    debug!("POST /{} - Received {} byte body", VERIFY_PATH, body.len());

    let result = match parse_request_body(&body) {
        Ok(request) => verifier.verify(&request).await,
        Err(e) => Err(e),
    };

    let (status, response) = into_reply(result);
    if !status.is_success() {
        info!("POST /{} -> {} ({:?})", VERIFY_PATH, status, response.error);
    }

    Ok(warp::reply::with_status(warp::reply::json(&response), status))
}

// ============================================================================
// WARP FILTER HELPERS
// ============================================================================

/// Creates a warp filter that injects the verifier into handlers.
fn with_verifier(verifier: Verifier) -> impl Filter<Extract = (Verifier,), Error = Infallible> + Clone {
    warp::any().map(move || verifier.clone())
}

/// Creates a CORS filter based on the configured allowed origins.
///
/// Requests from origins outside the list are rejected with `CorsForbidden`.
fn create_cors_filter(api: &ApiConfig) -> warp::cors::Builder {
    let methods = vec![Method::GET, Method::POST, Method::OPTIONS];

    if api.allows_any_origin() {
        warp::cors()
            .allow_any_origin()
            .allow_methods(methods)
            .allow_headers(vec!["content-type"])
    } else {
        let origins: Vec<&str> = api.cors_origins.iter().map(|s| s.as_str()).collect();
        warp::cors()
            .allow_origins(origins)
            .allow_methods(methods)
            .allow_headers(vec!["content-type"])
    }
}

// ============================================================================
// REJECTION HANDLER
// ============================================================================

/// Converts warp rejections into `{verified: false, error}` JSON replies.
pub async fn handle_rejection(rej: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(err) = rej.find::<warp::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, err.to_string())
    } else if rej.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Request body exceeds {} bytes", MAX_BODY_BYTES),
        )
    } else if rej.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length header is required".to_string())
    } else if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Endpoint not found".to_string())
    } else if rej.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", rej);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&VerificationResponse {
            verified: false,
            data: None,
            error: Some(Value::String(message)),
        }),
        status,
    ))
}

// ============================================================================
// API SERVER IMPLEMENTATION
// ============================================================================

/// REST API server for payment verification.
///
/// Configuration and the verifier are fixed at construction; the server holds
/// no mutable state.
pub struct ApiServer {
    /// Service configuration
    config: Arc<Config>,
    /// Shared verifier (gateway client inside)
    verifier: Verifier,
}

impl ApiServer {
    /// Creates a new API server.
    ///
    /// # Arguments
    ///
    /// * `config` - Service configuration
    /// * `verifier` - Verifier built from the same configuration
    pub fn new(config: Config, verifier: Verifier) -> Self {
        Self {
            config: Arc::new(config),
            verifier,
        }
    }

    /// Binds the configured address and serves requests until Ctrl-C.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Server shut down cleanly
    /// * `Err(anyhow::Error)` - Invalid address or bind failure
    pub async fn run(&self) -> Result<()> {
        let addr: std::net::SocketAddr = format!("{}:{}", self.config.api.host, self.config.api.port)
            .parse()
            .context("Failed to parse API server address")?;

        let routes = self.create_routes();

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                info!("Shutdown signal received");
            })
            .with_context(|| format!("Failed to bind API server to {}", addr))?;

        info!(
            "API server listening on {} (CORS origins: {:?})",
            bound, self.config.api.cors_origins
        );
        server.await;
        info!("API server stopped");

        Ok(())
    }

    /// Creates all API routes for the server.
    pub(crate) fn create_routes(&self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        // Health check endpoint - returns service status
        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .map(|| {
                warp::reply::json(&HealthResponse {
                    status: "ok".to_string(),
                })
            });

        let verify = warp::path(VERIFY_PATH)
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::bytes())
            .and(with_verifier(self.verifier.clone()))
            .and_then(verify_payment_handler);

        health
            .or(verify)
            .with(create_cors_filter(&self.config.api))
            .recover(handle_rejection)
    }

    /// Public method for testing - exposes routes for integration tests
    pub fn test_routes(&self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        self.create_routes()
    }
}
