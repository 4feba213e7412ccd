#![forbid(unsafe_code)]

use clap::Parser;
use env_logger::Env;

use ab_cli::cli::{Cli, Commands};
use ab_cli::commands;
use ab_cli::config::Settings;
use ab_cli::error::Result;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Config management must work before any valid configuration exists,
    // so it never goes through Settings::load.
    if let Commands::Config { command } = &cli.command {
        return commands::config::execute(command, cli.config.as_deref());
    }

    let settings = Settings::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Agents { command } => commands::agents::execute(command, &settings),
        Commands::Versions { command } => commands::versions::execute(command, &settings),
        Commands::Resources { command } => commands::resources::execute(command, &settings),
        Commands::Invoke { command } => commands::invoke::execute(command, &settings),
        Commands::Check { auth_only } => commands::check::execute(&settings, *auth_only),
        Commands::Config { .. } => unreachable!(),
    }
}
