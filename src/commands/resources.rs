use crate::api::client::AgentBuilderClient;
use crate::cli::ResourceCommands;
use crate::commands::helpers::resolve_format;
use crate::config::Settings;
use crate::error::Result;
use crate::models::resources::LlmModel;
use crate::output::{self, OutputFormat};

pub fn execute(command: &ResourceCommands, settings: &Settings) -> Result<()> {
    let mut client = AgentBuilderClient::new(settings.clone())?;

    match command {
        ResourceCommands::Models {
            agent_type,
            limit,
            offset,
            format,
        } => models(
            &mut client,
            settings,
            agent_type.as_deref(),
            *limit,
            *offset,
            format.format,
        ),
        ResourceCommands::Guardrails {
            limit,
            offset,
            format,
        } => guardrails(&mut client, settings, *limit, *offset, format.format),
    }
}

fn models(
    client: &mut AgentBuilderClient,
    settings: &Settings,
    agent_type: Option<&str>,
    limit: u32,
    offset: u32,
    format: Option<OutputFormat>,
) -> Result<()> {
    let result = client.list_models(agent_type, limit, offset)?;

    match resolve_format(format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            if result.models.is_empty() {
                println!("No models found.");
                return Ok(());
            }

            println!(
                "{:<44} {:<24} {:<10} {:<16} {:<20} {}",
                "ID", "NAME", "BADGE", "AGENT TYPES", "REGIONS", "DEPRECATED"
            );
            println!("{}", "-".repeat(130));
            for model in &result.models {
                println!(
                    "{:<44} {:<24} {:<10} {:<16} {:<20} {}",
                    output::truncate(&model.id, 42),
                    output::truncate(&model.name, 22),
                    model.badge,
                    model.agent_types.join(", "),
                    region_summary(model),
                    if model.deprecation_status.deprecated {
                        "Yes"
                    } else {
                        "No"
                    }
                );
            }
            println!();
            println!("Total: {}", result.pagination.total_items);
            println!("For capabilities and regions in full, use --format json");
        }
    }
    Ok(())
}

/// First few regions, elided when the list is long.
fn region_summary(model: &LlmModel) -> String {
    let mut summary = model.regions.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
    if model.regions.len() > 3 {
        summary.push_str("...");
    }
    summary
}

fn guardrails(
    client: &mut AgentBuilderClient,
    settings: &Settings,
    limit: u32,
    offset: u32,
    format: Option<OutputFormat>,
) -> Result<()> {
    let result = client.list_guardrails(limit, offset)?;

    match resolve_format(format, settings) {
        OutputFormat::Json => output::print_json(&result)?,
        OutputFormat::Yaml => output::print_yaml(&result)?,
        OutputFormat::Table => {
            if result.guardrails.is_empty() {
                println!("No guardrails found.");
                return Ok(());
            }

            println!("{:<30} {}", "NAME", "DESCRIPTION");
            println!("{}", "-".repeat(90));
            for guardrail in &result.guardrails {
                println!(
                    "{:<30} {}",
                    guardrail.name,
                    output::truncate(&guardrail.description, 58)
                );
            }
            println!();
            println!("Total: {}", result.pagination.total_items);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resources::DeprecationStatus;

    fn model_with_regions(regions: &[&str]) -> LlmModel {
        LlmModel {
            id: "model-id".to_string(),
            name: "Model".to_string(),
            description: String::new(),
            badge: String::new(),
            metadata: String::new(),
            agent_types: vec![],
            capabilities: serde_json::Map::new(),
            regions: regions.iter().map(|r| r.to_string()).collect(),
            deprecation_status: DeprecationStatus::default(),
        }
    }

    #[test]
    fn test_region_summary_shows_up_to_three() {
        let model = model_with_regions(&["us-east-1", "eu-west-1"]);
        assert_eq!(region_summary(&model), "us-east-1, eu-west-1");
    }

    #[test]
    fn test_region_summary_elides_long_lists() {
        let model = model_with_regions(&["a", "b", "c", "d"]);
        assert_eq!(region_summary(&model), "a, b, c...");
    }
}
