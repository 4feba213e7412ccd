use serde_json::Value;

use crate::api::client::AgentBuilderClient;
use crate::api::pagination::{fetch_agents_paginated, AgentFilter, PageCursor, PageRequest};
use crate::cli::flags::{CreateArgs, ListArgs, UpdateArgs};
use crate::cli::AgentCommands;
use crate::commands::helpers::{confirm, read_json_file, resolve_format};
use crate::commands::paging;
use crate::config::Settings;
use crate::error::{AbError, Result};
use crate::models::agent::{AgentCreate, AgentPatch, AgentUpdate};
use crate::output::{self, OutputFormat};
use crate::utils::audit;

pub fn execute(command: &AgentCommands, settings: &Settings) -> Result<()> {
    let mut client = AgentBuilderClient::new(settings.clone())?;

    match command {
        AgentCommands::List(args) => list(&mut client, settings, args),
        AgentCommands::Get {
            agent_id,
            version_id,
            format,
        } => get(
            &mut client,
            settings,
            agent_id,
            version_id.as_deref(),
            format.format,
        ),
        AgentCommands::Create(args) => create(&mut client, settings, args),
        AgentCommands::Update(args) => update(&mut client, settings, args),
        AgentCommands::Patch {
            agent_id,
            name,
            description,
            format,
        } => patch(
            &mut client,
            settings,
            agent_id,
            name.clone(),
            description.clone(),
            format.format,
        ),
        AgentCommands::Delete { agent_id, yes } => delete(&mut client, agent_id, *yes),
        AgentCommands::Types { format } => types(&mut client, settings, format.format),
    }
}

fn list(client: &mut AgentBuilderClient, settings: &Settings, args: &ListArgs) -> Result<()> {
    let filter = AgentFilter::new(args.agent_type.clone(), args.name.clone());
    let cursor = match (args.page, args.offset) {
        (Some(page), _) => PageCursor::Page(page),
        (None, Some(offset)) => PageCursor::Offset(offset),
        (None, None) => PageCursor::default(),
    };
    let request = PageRequest {
        limit: args.limit,
        cursor,
        filter,
    };
    let max_filter_pages = settings.pagination.max_filter_pages;

    // Interactive paging always renders tables.
    if args.more {
        return paging::run_more_loop(client, &request, max_filter_pages);
    }

    let result = fetch_agents_paginated(client, &request, max_filter_pages)?;

    match resolve_format(args.format.format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            if result.agents.is_empty() {
                println!("No agents found.");
            } else {
                paging::print_agent_table(&result.agents);
            }
            paging::show_pagination_info(&result);
            paging::show_next_page_command(&result, args.page.is_some());
        }
    }
    Ok(())
}

fn get(
    client: &mut AgentBuilderClient,
    settings: &Settings,
    agent_id: &str,
    version_id: Option<&str>,
    format: Option<OutputFormat>,
) -> Result<()> {
    let result = client.get_agent(agent_id, version_id)?;

    match resolve_format(format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            let agent = &result.agent;
            let version = &result.version;

            println!("Agent: {}", agent.name);
            println!("  ID: {}", agent.id);
            println!("  Type: {}", agent.agent_type);
            println!("  Description: {}", agent.description);
            println!("  Status: {}", agent.status);
            println!("  Created: {}", agent.created_at);
            println!("  Modified: {}", agent.modified_at);
            println!();
            println!("Current Version:");
            println!("  Version ID: {}", version.id);
            println!("  Number: {}", version.number);
            if let Some(label) = &version.version_label {
                println!("  Label: {}", label);
            }
            if let Some(notes) = &version.notes {
                println!("  Notes: {}", notes);
            }
            println!();
            println!("Configuration:");
            println!("{}", serde_json::to_string_pretty(&version.config)?);
        }
    }
    Ok(())
}

fn create(client: &mut AgentBuilderClient, settings: &Settings, args: &CreateArgs) -> Result<()> {
    let payload = build_create_payload(args)?;

    if settings.record_updates {
        audit::save_payload("create_agent", &payload, settings.source.as_deref())?;
    }

    let result = client.create_agent(&payload)?;

    match resolve_format(args.format.format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            println!("✓ Agent created successfully!");
            println!("  ID: {}", result.agent.id);
            println!("  Name: {}", result.agent.name);
            println!("  Type: {}", result.agent.agent_type);
            println!("  Version: {}", result.version.number);
        }
    }
    Ok(())
}

/// Assemble the create payload from the config file plus flag overrides.
/// The file may hold either a bare agent config or a full create payload;
/// flags win over file values, and name/description/type must come from
/// one of the two.
fn build_create_payload(args: &CreateArgs) -> Result<AgentCreate> {
    let file_value = read_json_file(&args.file)?;

    let mut payload = if looks_like_create_payload(&file_value) {
        serde_json::from_value::<AgentCreate>(file_value)?
    } else {
        AgentCreate {
            name: String::new(),
            description: String::new(),
            agent_type: String::new(),
            version_label: None,
            notes: None,
            config: file_value,
        }
    };

    if let Some(name) = &args.name {
        payload.name = name.clone();
    }
    if let Some(description) = &args.description {
        payload.description = description.clone();
    }
    if let Some(agent_type) = &args.agent_type {
        payload.agent_type = agent_type.clone();
    }
    if let Some(label) = &args.label {
        payload.version_label = Some(label.clone());
    }
    if let Some(notes) = &args.notes {
        payload.notes = Some(notes.clone());
    }

    for (field, value, flag) in [
        ("name", &payload.name, "--name"),
        ("description", &payload.description, "--description"),
        ("type", &payload.agent_type, "--type"),
    ] {
        if value.is_empty() {
            return Err(AbError::InvalidRequest(format!(
                "missing agent {}; pass {} or include it in the file",
                field, flag
            )));
        }
    }
    Ok(payload)
}

/// A file is a full create payload when it nests the agent config under
/// `config` and carries identity fields alongside.
fn looks_like_create_payload(value: &Value) -> bool {
    value.get("config").is_some()
        && (value.get("name").is_some() || value.get("agentType").is_some())
}

fn update(client: &mut AgentBuilderClient, settings: &Settings, args: &UpdateArgs) -> Result<()> {
    let config = match &args.file {
        Some(path) => Some(read_json_file(path)?),
        None => None,
    };
    let payload = AgentUpdate {
        version_label: args.label.clone(),
        notes: args.notes.clone(),
        config,
    };

    if settings.record_updates {
        audit::save_payload("update_agent", &payload, settings.source.as_deref())?;
    }

    let result = client.update_agent(&args.agent_id, &payload)?;

    match resolve_format(args.format.format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            println!("✓ Agent updated successfully!");
            println!("  New Version: {}", result.version.number);
            if let Some(label) = &result.version.version_label {
                println!("  Label: {}", label);
            }
        }
    }
    Ok(())
}

fn patch(
    client: &mut AgentBuilderClient,
    settings: &Settings,
    agent_id: &str,
    name: Option<String>,
    description: Option<String>,
    format: Option<OutputFormat>,
) -> Result<()> {
    if name.is_none() && description.is_none() {
        println!("Warning: no changes specified");
        return Ok(());
    }

    let payload = AgentPatch { name, description };
    let result = client.patch_agent(agent_id, &payload)?;

    match resolve_format(format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            println!("✓ Agent patched successfully!");
            println!("  Name: {}", result.name);
            println!("  Description: {}", result.description);
        }
    }
    Ok(())
}

fn delete(client: &mut AgentBuilderClient, agent_id: &str, yes: bool) -> Result<()> {
    if !yes {
        let question = format!("Are you sure you want to delete agent {}?", agent_id);
        if !confirm(&question)? {
            println!("Cancelled");
            return Ok(());
        }
    }

    client.delete_agent(agent_id)?;
    println!("✓ Agent deleted: {}", agent_id);
    Ok(())
}

fn types(
    client: &mut AgentBuilderClient,
    settings: &Settings,
    format: Option<OutputFormat>,
) -> Result<()> {
    let result = client.list_agent_types(100, 0)?;

    match resolve_format(format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            if result.agent_types.is_empty() {
                println!("No agent types found.");
                return Ok(());
            }
            println!("{:<10} {}", "TYPE", "DESCRIPTION");
            println!("{}", "-".repeat(70));
            for agent_type in &result.agent_types {
                println!(
                    "{:<10} {}",
                    agent_type.agent_type, agent_type.description
                );
            }
        }
    }
    Ok(())
}
