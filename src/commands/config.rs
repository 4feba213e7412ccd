use std::io::{self, Write};
use std::path::Path;

use chrono::Local;

use crate::cli::ConfigCommands;
use crate::commands::helpers;
use crate::config::{
    default_config_path, find_config_file, redact_secret, validate_config_file, Settings,
};
use crate::error::{AbError, Result};

pub fn execute(command: &ConfigCommands, config_override: Option<&Path>) -> Result<()> {
    match command {
        ConfigCommands::Init => init(config_override),
        ConfigCommands::Validate { file } => validate(file.as_deref().or(config_override)),
        ConfigCommands::Show { reveal } => show(config_override, *reveal),
    }
}

/// Answers collected by the init wizard, in file order.
struct WizardAnswers {
    environment_id: String,
    client_id: String,
    client_secret: String,
    api_endpoint: String,
    auth_endpoint: String,
    grant_type: String,
    auth_scope: Vec<String>,
}

fn init(config_override: Option<&Path>) -> Result<()> {
    let target = config_override
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    println!();
    println!("=== Agent Builder CLI Configuration ===");
    println!();
    println!("Configuration file: {}", target.display());

    // Existing values become prompt defaults, so rerunning the wizard
    // only changes what the user actually types.
    let existing = if target.exists() {
        if !helpers::confirm("The file already exists. Update it?")? {
            println!("Cancelled.");
            return Ok(());
        }
        match Settings::from_file(&target) {
            Ok(settings) => {
                println!("Press Enter to keep a current value.");
                Some(settings)
            }
            Err(err) => {
                println!("Warning: could not read existing config: {err}");
                None
            }
        }
    } else {
        None
    };
    println!();

    let defaults = Settings::default();
    let current = existing.as_ref();

    println!("Required settings:");
    let environment_id = prompt_required(
        "  Environment ID",
        current.map(|s| s.environment_id.as_str()),
    )?;
    let client_id = prompt_required("  OAuth2 client ID", current.map(|s| s.client_id.as_str()))?;
    let client_secret = prompt_secret(current.map(|s| s.client_secret.as_str()))?;
    let api_endpoint = prompt_line(
        "  API endpoint",
        Some(
            current
                .map(|s| s.api_endpoint.as_str())
                .filter(|v| !v.is_empty())
                .unwrap_or(&defaults.api_endpoint),
        ),
    )?;
    let auth_endpoint = prompt_line(
        "  Auth endpoint",
        Some(
            current
                .map(|s| s.auth_endpoint.as_str())
                .filter(|v| !v.is_empty())
                .unwrap_or(&defaults.auth_endpoint),
        ),
    )?;
    println!();

    let current_grant = current
        .map(|s| s.grant_type.clone())
        .unwrap_or_else(|| defaults.grant_type.clone());
    let current_scope = current
        .map(|s| s.auth_scope.clone())
        .unwrap_or_else(|| defaults.auth_scope.clone());
    let (grant_type, auth_scope) = if helpers::confirm("Configure optional OAuth2 settings?")? {
        let grant_type = prompt_line("  Grant type", Some(&current_grant))?;
        let scope_input =
            prompt_line("  Scopes (space-separated)", Some(&current_scope.join(" ")))?;
        let auth_scope = scope_input
            .split_whitespace()
            .map(str::to_string)
            .collect::<Vec<_>>();
        (grant_type, auth_scope)
    } else {
        (current_grant, current_scope)
    };

    let answers = WizardAnswers {
        environment_id,
        client_id,
        client_secret,
        api_endpoint,
        auth_endpoint,
        grant_type,
        auth_scope,
    };

    println!();
    println!("Configuration summary:");
    println!("  Environment ID: {}", answers.environment_id);
    println!("  Client ID:      {}", redact_secret(&answers.client_id));
    println!("  Client secret:  {}", "*".repeat(16));
    println!("  API endpoint:   {}", answers.api_endpoint);
    println!("  Auth endpoint:  {}", answers.auth_endpoint);
    println!("  Grant type:     {}", answers.grant_type);
    println!("  Scopes:         {}", answers.auth_scope.join(", "));
    println!();

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&target, render_config(&answers))?;
    println!("✓ Configuration saved to {}", target.display());

    match validate_config_file(&target) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            for warning in settings.warnings() {
                println!("  Warning: {warning}");
            }
        }
        Err(err) => println!("Warning: saved configuration does not validate: {err}"),
    }

    println!();
    println!("Next steps:");
    println!("  1. Test the configuration: ab check");
    println!("  2. List available agents:  ab agents list");
    Ok(())
}

fn validate(file: Option<&Path>) -> Result<()> {
    let path = match file.map(Path::to_path_buf).or_else(find_config_file) {
        Some(path) => path,
        None => {
            return Err(AbError::Config(
                "no configuration file found; searched config.yaml, ab-cli.yaml, \
                 ~/.ab-cli/config.yaml"
                    .to_string(),
            ))
        }
    };
    if !path.exists() {
        return Err(AbError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }

    println!("Validating: {}", path.display());
    match validate_config_file(&path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            let warnings = settings.warnings();
            if !warnings.is_empty() {
                println!();
                for warning in &warnings {
                    println!("  Warning: {warning}");
                }
            }
            Ok(())
        }
        Err(err) => {
            println!("✗ Configuration is invalid");
            Err(err)
        }
    }
}

fn show(config_override: Option<&Path>, reveal: bool) -> Result<()> {
    let settings = Settings::load(config_override)?;

    match &settings.source {
        Some(path) => println!("Configuration: {}", path.display()),
        None => println!("Configuration: (defaults + environment)"),
    }
    println!();

    let client_id = if reveal {
        settings.client_id.clone()
    } else {
        redact_secret(&settings.client_id)
    };
    let client_secret = if reveal {
        settings.client_secret.clone()
    } else {
        "********".to_string()
    };

    println!("  {:<29} {}", "environment_id:", settings.environment_id);
    println!("  {:<29} {}", "api_endpoint:", settings.api_endpoint);
    println!("  {:<29} {}", "auth_endpoint:", settings.auth_endpoint);
    println!("  {:<29} {}", "client_id:", client_id);
    println!("  {:<29} {}", "client_secret:", client_secret);
    println!("  {:<29} {}", "auth_scope:", settings.auth_scope.join(", "));
    println!("  {:<29} {}", "grant_type:", settings.grant_type);
    println!("  {:<29} {}s", "timeout:", settings.timeout);
    println!("  {:<29} {}", "retry_backoff:", settings.retry_backoff);
    println!("  {:<29} {}", "max_retries:", settings.max_retries);
    println!(
        "  {:<29} {}",
        "default_output_format:", settings.default_output_format
    );
    println!("  {:<29} {}", "record_updates:", settings.record_updates);
    println!(
        "  {:<29} {}",
        "pagination.max_filter_pages:", settings.pagination.max_filter_pages
    );
    Ok(())
}

/// Render the config file the wizard writes. Hand-built so the file
/// carries section comments; values are quoted and escaped.
fn render_config(answers: &WizardAnswers) -> String {
    let mut lines = vec![
        "# Agent Builder CLI configuration".to_string(),
        "# Generated by: ab config init".to_string(),
        format!("# Date: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
        String::new(),
        format!("environment_id: {}", yaml_quote(&answers.environment_id)),
        String::new(),
        "# OAuth2 authentication (required)".to_string(),
        format!("client_id: {}", yaml_quote(&answers.client_id)),
        format!("client_secret: {}", yaml_quote(&answers.client_secret)),
        String::new(),
        "# Endpoints".to_string(),
        format!("api_endpoint: {}", yaml_quote(&answers.api_endpoint)),
        format!("auth_endpoint: {}", yaml_quote(&answers.auth_endpoint)),
        String::new(),
        "# OAuth2 grant".to_string(),
        format!("grant_type: {}", yaml_quote(&answers.grant_type)),
        "auth_scope:".to_string(),
    ];
    for scope in &answers.auth_scope {
        lines.push(format!("  - {}", yaml_quote(scope)));
    }
    lines.push(String::new());
    lines.push("# Advanced settings (timeout, max_retries, default_output_format,".to_string());
    lines.push("# record_updates, pagination.max_filter_pages) can be added by hand.".to_string());
    lines.push(String::new());
    lines.join("\n")
}

fn yaml_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(value) if !value.is_empty() => print!("{label} [{value}]: "),
        _ => print!("{label}: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(AbError::Config(
            "configuration wizard aborted (stdin closed)".to_string(),
        ));
    }
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Ok(default.unwrap_or("").to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn prompt_required(label: &str, default: Option<&str>) -> Result<String> {
    let default = default.filter(|v| !v.is_empty());
    loop {
        let value = prompt_line(label, default)?;
        if !value.is_empty() {
            return Ok(value);
        }
        println!("  A value is required.");
    }
}

/// The secret prompt never echoes the current value back; an empty
/// answer keeps it.
fn prompt_secret(current: Option<&str>) -> Result<String> {
    let current = current.filter(|v| !v.is_empty());
    loop {
        if current.is_some() {
            print!("  OAuth2 client secret [keep current]: ");
        } else {
            print!("  OAuth2 client secret: ");
        }
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(AbError::Config(
                "configuration wizard aborted (stdin closed)".to_string(),
            ));
        }
        let trimmed = input.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
        if let Some(value) = current {
            return Ok(value.to_string());
        }
        println!("  A value is required.");
    }
}
