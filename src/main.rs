//! Payment Verifier Service
//!
//! Long-running HTTP server exposing `POST /verify-payment`.
//!
//! ## Overview
//!
//! For each request the service:
//! 1. Validates the transaction reference
//! 2. Queries the Paystack verify-by-reference endpoint
//! 3. Cross-checks the reported amount and currency against the request
//! 4. Returns `{verified, data}` with the gateway's transaction record
//!
//! The secret key is required at startup; without it the process exits
//! before binding a socket.

use anyhow::{Context, Result};
use tracing::info;

use payment_verifier::api::ApiServer;
use payment_verifier::config::{self, Config};
use payment_verifier::verification::Verifier;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("Payment Verifier Service");
        println!();
        println!("Usage: payment-verifier [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --config <path>   Use custom config file path");
        println!("  --help, -h        Show this help message");
        println!();
        println!("Environment variables:");
        println!("  {}    Path to config file (overrides --config)", config::CONFIG_PATH_ENV);
        println!("  {}             Paystack secret key (required)", config::ENV_SECRET_KEY);
        println!("  {}                            Listen port (default 3000)", config::ENV_PORT);
        println!("  {}                 Comma-separated CORS origins or * (default *)", config::ENV_ALLOWED_ORIGINS);
        return Ok(());
    }

    // An explicit env var wins over the flag
    if std::env::var(config::CONFIG_PATH_ENV).is_err() {
        if let Some(i) = args.iter().position(|arg| arg == "--config") {
            let path = args
                .get(i + 1)
                .context("--config requires a path argument")?;
            std::env::set_var(config::CONFIG_PATH_ENV, path);
            info!("Using custom config: {}", path);
        }
    }

    info!("Starting Payment Verifier Service");

    let config = Config::load()?;
    info!("Configuration loaded successfully");

    // Refuse to serve without credentials
    let verifier = Verifier::from_config(&config).context("Cannot start without a gateway secret key")?;

    let api_server = ApiServer::new(config, verifier);
    api_server.run().await?;

    Ok(())
}
