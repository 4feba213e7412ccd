use clap::Parser;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Output format flag shared by every list/get command.
#[derive(Parser, Debug, Clone, Default)]
pub struct FormatArg {
    /// Output format (default: config `default_output_format`)
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,
}

/// Window and filter flags for `agents list`.
///
/// `--page` jumps assume a stable total count, which only holds without
/// filters; clap enforces the conflicts so the mistake fails before any
/// network traffic.
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Rows per page
    #[arg(short = 'l', long, default_value_t = 50)]
    pub limit: u32,

    /// Item offset to start the window at
    #[arg(short = 'o', long, conflicts_with = "page")]
    pub offset: Option<u32>,

    /// Page number to jump to (unfiltered listings only)
    #[arg(short = 'p', long, conflicts_with_all = ["agent_type", "name"])]
    pub page: Option<u32>,

    /// Only show agents of this type (exact match)
    #[arg(short = 't', long = "type")]
    pub agent_type: Option<String>,

    /// Only show agents whose name contains this text (`*` wildcards allowed)
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Page through results interactively
    #[arg(long)]
    pub more: bool,

    #[command(flatten)]
    pub format: FormatArg,
}

/// Flags for `agents create`.
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Agent definition file (full payload, or a bare configuration object)
    #[arg(long)]
    pub file: PathBuf,

    /// Agent name (overrides the file)
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Agent description (overrides the file)
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    /// Agent type (overrides the file)
    #[arg(short = 't', long = "type")]
    pub agent_type: Option<String>,

    /// Label for the initial version
    #[arg(long)]
    pub label: Option<String>,

    /// Notes for the initial version
    #[arg(long)]
    pub notes: Option<String>,

    #[command(flatten)]
    pub format: FormatArg,
}

/// Flags for `agents update`.
#[derive(Parser, Debug, Clone)]
pub struct UpdateArgs {
    /// Agent ID
    pub agent_id: String,

    /// New configuration file; omit to re-issue the current configuration
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Label for the new version
    #[arg(long)]
    pub label: Option<String>,

    /// Notes for the new version
    #[arg(long)]
    pub notes: Option<String>,

    #[command(flatten)]
    pub format: FormatArg,
}

/// Flags for `invoke chat`.
#[derive(Parser, Debug, Clone)]
pub struct ChatArgs {
    /// Agent ID
    pub agent_id: String,

    /// Message text
    #[arg(short = 'm', long, conflicts_with = "message_file")]
    pub message: Option<String>,

    /// Read the message from a file
    #[arg(long = "message-file")]
    pub message_file: Option<PathBuf>,

    /// Agent version to invoke (default: latest)
    #[arg(long = "version")]
    pub version_id: Option<String>,

    /// Stream the response as it is produced
    #[arg(short = 's', long)]
    pub stream: bool,

    /// Sampling temperature override
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Response token budget override
    #[arg(long = "max-tokens")]
    pub max_tokens: Option<u32>,

    #[command(flatten)]
    pub format: FormatArg,
}

/// Flags for `invoke task`.
#[derive(Parser, Debug, Clone)]
pub struct TaskArgs {
    /// Agent ID
    pub agent_id: String,

    /// Structured inputs file (JSON object)
    #[arg(long)]
    pub file: PathBuf,

    /// Agent version to invoke (default: latest)
    #[arg(long = "version")]
    pub version_id: Option<String>,

    /// Stream the response as it is produced
    #[arg(short = 's', long)]
    pub stream: bool,

    #[command(flatten)]
    pub format: FormatArg,
}
