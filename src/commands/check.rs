use std::time::Instant;

use serde_json::Value;

use crate::api::client::AgentBuilderClient;
use crate::config::{redact_secret, Settings};
use crate::error::Result;

/// Walk the full connectivity path step by step: configuration,
/// token retrieval, then a ping against the API health endpoint.
/// Each step prints what it is about to do so a failing layer is
/// obvious from the output alone.
pub fn execute(settings: &Settings, auth_only: bool) -> Result<()> {
    let total_steps = if auth_only { 2 } else { 3 };

    println!();
    println!("=== Agent Builder API Connectivity Check ===");
    println!();

    // Step 1: configuration. Settings are already loaded by the time
    // we get here, so this step just reports what was resolved.
    println!("Step 1/{total_steps}: Configuration");
    match &settings.source {
        Some(path) => println!("  Config file: {}", path.display()),
        None => println!("  Config file: (environment variables)"),
    }
    println!("  ✓ Configuration loaded");
    println!();
    println!("  Configuration Summary:");
    for line in summary_lines(settings) {
        println!("{line}");
    }
    println!();

    // Step 2: authentication. Force a fresh token rather than
    // reusing a cached one so the auth server is actually exercised.
    println!("Step 2/{total_steps}: Authentication");
    println!("  Token endpoint: {}", settings.auth_endpoint);
    println!("  Fetching OAuth2 token...");

    let mut client = AgentBuilderClient::new(settings.clone())?;
    let started = Instant::now();
    match client.auth_mut().refresh() {
        Ok(token) => {
            let elapsed = started.elapsed().as_secs_f64();
            println!("  ✓ Valid OAuth2 token received ({elapsed:.3}s)");
            if let Some(prefix) = token.get(..16) {
                println!("    Token prefix: {prefix}...");
            }
            println!("    Token length: {} characters", token.len());
        }
        Err(err) => {
            let elapsed = started.elapsed().as_secs_f64();
            println!("  ✗ Token request failed ({elapsed:.3}s)");
            return Err(err);
        }
    }
    println!();

    if auth_only {
        println!("=== Check Complete (auth only) ===");
        return Ok(());
    }

    // Step 3: an authenticated round trip through the API itself.
    println!("Step 3/{total_steps}: API connectivity");
    println!("  Pinging Agent Builder API (GET /health)...");

    let started = Instant::now();
    match client.health_check() {
        Ok(health) => {
            let elapsed = started.elapsed().as_secs_f64();
            println!("  ✓ API responded successfully ({elapsed:.3}s)");
            for line in health_lines(&health) {
                println!("{line}");
            }
        }
        Err(err) => {
            let elapsed = started.elapsed().as_secs_f64();
            println!("  ✗ API request failed ({elapsed:.3}s)");
            return Err(err);
        }
    }

    println!();
    println!("=== Check Complete ===");
    println!("  All endpoints reachable.");
    Ok(())
}

/// Resolved configuration with credentials masked. The environment ID
/// line is skipped entirely when none is configured.
fn summary_lines(settings: &Settings) -> Vec<String> {
    let mut lines = vec![
        format!("    API endpoint:   {}", settings.api_endpoint),
        format!("    Auth endpoint:  {}", settings.auth_endpoint),
    ];
    if !settings.environment_id.is_empty() {
        lines.push(format!("    Environment ID: {}", settings.environment_id));
    }
    lines.push(format!(
        "    Client ID:      {}",
        redact_secret(&settings.client_id)
    ));
    lines.push(format!("    Client secret:  {}", "*".repeat(20)));
    lines
}

/// Health payload rendered one field per line, status first. A payload
/// that is not a JSON object yields no detail lines.
fn health_lines(health: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(status) = health.get("status").and_then(Value::as_str) {
        lines.push(format!("    Status: {status}"));
    }
    if let Some(map) = health.as_object() {
        for (key, value) in map {
            if key != "status" {
                lines.push(format!("    {key}: {value}"));
            }
        }
    }
    lines
}
