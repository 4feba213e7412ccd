use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use crate::config::Settings;
use crate::error::{AbError, Result};
use crate::output::OutputFormat;

/// Pick the output format: explicit flag first, then the configured default.
pub fn resolve_format(flag: Option<OutputFormat>, settings: &Settings) -> OutputFormat {
    flag.unwrap_or(settings.default_output_format)
}

/// Ask a yes/no question, defaulting to no. EOF counts as no.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

/// Read and parse a JSON file, reporting the path on failure.
pub fn read_json_file(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| AbError::Config(format!("cannot read {}: {}", path.display(), err)))?;
    serde_json::from_str(&text)
        .map_err(|err| AbError::Config(format!("invalid JSON in {}: {}", path.display(), err)))
}
