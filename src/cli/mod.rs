use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod flags;
pub use flags::{ChatArgs, CreateArgs, FormatArg, ListArgs, TaskArgs, UpdateArgs};

#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// List agents, with optional filters and paging
    #[command(long_about = "List agents, with optional filters and paging.\n\n\
        Without filters the command fetches exactly one page and shows the\n\
        total count. With --type or --name it scans pages server-side until\n\
        the window fills, the listing ends, or the configured page cap is\n\
        reached; totals are unknown in that mode and --page is rejected.")]
    List(ListArgs),

    /// Show one agent with its current version and configuration
    Get {
        /// Agent ID
        agent_id: String,

        /// Version to show (default: latest)
        #[arg(long = "version")]
        version_id: Option<String>,

        #[command(flatten)]
        format: FormatArg,
    },

    /// Create an agent from a definition file
    Create(CreateArgs),

    /// Upload a new configuration for an agent (creates a version)
    Update(UpdateArgs),

    /// Change agent metadata without touching the configuration
    Patch {
        /// Agent ID
        agent_id: String,

        /// New agent name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// New agent description
        #[arg(short = 'd', long)]
        description: Option<String>,

        #[command(flatten)]
        format: FormatArg,
    },

    /// Delete an agent
    Delete {
        /// Agent ID
        agent_id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List available agent types
    Types {
        #[command(flatten)]
        format: FormatArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum VersionCommands {
    /// List versions of an agent
    List {
        /// Agent ID
        agent_id: String,

        /// Rows per page
        #[arg(short = 'l', long, default_value_t = 50)]
        limit: u32,

        /// Item offset to start the window at
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: u32,

        #[command(flatten)]
        format: FormatArg,
    },

    /// Show one version with its configuration
    Get {
        /// Agent ID
        agent_id: String,

        /// Version ID
        version_id: String,

        #[command(flatten)]
        format: FormatArg,
    },

    /// Create a new version from a configuration file
    Create {
        /// Agent ID
        agent_id: String,

        /// Configuration file (JSON)
        #[arg(long)]
        file: PathBuf,

        /// Label for the new version
        #[arg(long)]
        label: Option<String>,

        /// Notes for the new version
        #[arg(long)]
        notes: Option<String>,

        #[command(flatten)]
        format: FormatArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResourceCommands {
    /// List foundation models available to agents
    Models {
        /// Only show models supporting this agent type
        #[arg(short = 't', long = "type")]
        agent_type: Option<String>,

        /// Rows per page
        #[arg(short = 'l', long, default_value_t = 50)]
        limit: u32,

        /// Item offset to start the window at
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: u32,

        #[command(flatten)]
        format: FormatArg,
    },

    /// List available guardrails
    Guardrails {
        /// Rows per page
        #[arg(short = 'l', long, default_value_t = 50)]
        limit: u32,

        /// Item offset to start the window at
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: u32,

        #[command(flatten)]
        format: FormatArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum InvokeCommands {
    /// Send a single chat message to an agent
    Chat(ChatArgs),

    /// Run a task agent over structured inputs
    Task(TaskArgs),

    /// Hold a streaming conversation with an agent
    #[command(long_about = "Hold a streaming conversation with an agent.\n\n\
        The session keeps the conversation history and streams every\n\
        response token by token. Type 'exit' or 'quit' to end the session\n\
        and 'clear' to reset the history.")]
    Interactive {
        /// Agent ID
        agent_id: String,

        /// Agent version to invoke (default: latest)
        #[arg(long = "version")]
        version_id: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Create or update a config file interactively
    Init,

    /// Validate a configuration file
    Validate {
        /// Config file to validate (default: first found candidate)
        file: Option<PathBuf>,
    },

    /// Show the effective configuration with secrets redacted
    Show {
        /// Print secrets in full
        #[arg(long)]
        reveal: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "ab")]
#[command(about = "Command line client for the Agent Builder platform", long_about = None)]
#[command(version = env!("AB_VERSION"))]
pub struct Cli {
    /// Config file to use instead of the search path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage agents
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },

    /// Manage agent versions
    Versions {
        #[command(subcommand)]
        command: VersionCommands,
    },

    /// Browse platform resources (models, guardrails)
    Resources {
        #[command(subcommand)]
        command: ResourceCommands,
    },

    /// Invoke agents
    Invoke {
        #[command(subcommand)]
        command: InvokeCommands,
    },

    /// Test connectivity layer by layer
    Check {
        /// Stop after the authentication step
        #[arg(long = "auth-only")]
        auth_only: bool,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}
