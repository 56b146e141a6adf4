//! Single-invocation entry point.
//!
//! Reads one JSON invocation event from stdin, writes one JSON response to
//! stdout. Logs go to stderr so stdout carries only the response.
//!
//! Event:    {"httpMethod": "POST", "headers": {...}, "body": "{\"reference\":\"...\"}"}
//! Response: {"statusCode": 200, "headers": {...}, "body": "{\"verified\":true,...}"}

use anyhow::{Context, Result};
use std::io::Read;

use payment_verifier::api::{FunctionEvent, FunctionHandler};
use payment_verifier::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read invocation event from stdin")?;
    let event: FunctionEvent = serde_json::from_str(&input).context("Invalid invocation event")?;

    let config = Config::load()?;
    let handler = FunctionHandler::from_config(&config)?;

    let response = handler.handle(&event).await;
    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}
