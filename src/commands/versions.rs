use crate::api::client::AgentBuilderClient;
use crate::cli::VersionCommands;
use crate::commands::helpers::{read_json_file, resolve_format};
use crate::config::Settings;
use crate::error::Result;
use crate::models::agent::{Version, VersionCreate};
use crate::output::{self, OutputFormat};
use crate::utils::audit;

pub fn execute(command: &VersionCommands, settings: &Settings) -> Result<()> {
    let mut client = AgentBuilderClient::new(settings.clone())?;

    match command {
        VersionCommands::List {
            agent_id,
            limit,
            offset,
            format,
        } => list(&mut client, settings, agent_id, *limit, *offset, format.format),
        VersionCommands::Get {
            agent_id,
            version_id,
            format,
        } => get(&mut client, settings, agent_id, version_id, format.format),
        VersionCommands::Create {
            agent_id,
            file,
            label,
            notes,
            format,
        } => {
            let config = read_json_file(file)?;
            let payload = VersionCreate {
                version_label: label.clone(),
                notes: notes.clone(),
                config,
            };
            create(&mut client, settings, agent_id, &payload, format.format)
        }
    }
}

fn list(
    client: &mut AgentBuilderClient,
    settings: &Settings,
    agent_id: &str,
    limit: u32,
    offset: u32,
    format: Option<OutputFormat>,
) -> Result<()> {
    let result = client.list_versions(agent_id, limit, offset)?;

    match resolve_format(format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            println!("Agent: {} (ID: {})", result.agent.name, result.agent.id);
            println!();

            if result.versions.is_empty() {
                println!("No versions found.");
                return Ok(());
            }

            println!(
                "{:<38} {:<8} {:<12} {:<33} {:<12} {}",
                "VERSION ID", "NUMBER", "LABEL", "NOTES", "CREATED", "CREATED BY"
            );
            println!("{}", "-".repeat(120));
            for version in &result.versions {
                println!("{}", version_row(version));
            }
            println!();
            println!("Total: {}", result.pagination.total_items);
        }
    }
    Ok(())
}

/// One table row: label and notes fall back to `-`, notes are truncated,
/// and only the date part of the creation timestamp is shown.
fn version_row(version: &Version) -> String {
    format!(
        "{:<38} {:<8} {:<12} {:<33} {:<12} {}",
        version.id,
        version.number,
        version.version_label.as_deref().unwrap_or("-"),
        output::truncate(version.notes.as_deref().unwrap_or("-"), 30),
        version.created_at.get(..10).unwrap_or(""),
        version.created_by
    )
}

fn get(
    client: &mut AgentBuilderClient,
    settings: &Settings,
    agent_id: &str,
    version_id: &str,
    format: Option<OutputFormat>,
) -> Result<()> {
    let result = client.get_version(agent_id, version_id)?;

    match resolve_format(format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            let agent = &result.agent;
            let version = &result.version;

            println!("Agent: {}", agent.name);
            println!("  ID: {}", agent.id);
            println!("  Type: {}", agent.agent_type);
            println!();
            println!("Version {}:", version.number);
            println!("  Version ID: {}", version.id);
            if let Some(label) = &version.version_label {
                println!("  Label: {}", label);
            }
            if let Some(notes) = &version.notes {
                println!("  Notes: {}", notes);
            }
            println!("  Created At: {}", version.created_at);
            println!("  Created By: {}", version.created_by);
            println!();
            println!("Configuration:");
            println!("{}", serde_json::to_string_pretty(&version.config)?);
        }
    }
    Ok(())
}

fn create(
    client: &mut AgentBuilderClient,
    settings: &Settings,
    agent_id: &str,
    payload: &VersionCreate,
    format: Option<OutputFormat>,
) -> Result<()> {
    if settings.record_updates {
        audit::save_payload("create_version", payload, settings.source.as_deref())?;
    }

    let result = client.create_version(agent_id, payload)?;

    match resolve_format(format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            println!("✓ Version created successfully!");
            println!("  Agent: {}", result.agent.name);
            println!("  Version ID: {}", result.version.id);
            println!("  Version Number: {}", result.version.number);
            if let Some(label) = &result.version.version_label {
                println!("  Label: {}", label);
            }
        }
    }
    Ok(())
}
