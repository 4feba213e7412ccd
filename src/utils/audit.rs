//! Audit trail for mutating API calls.
//!
//! When `record_updates` is enabled, create and update payloads are written
//! to an `audit/` directory next to the config file (or under the current
//! directory when settings came from the environment).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::debug;
use serde::Serialize;

use crate::error::Result;

/// Directory where audited payloads land, relative to the config file's
/// directory or the current directory.
pub fn audit_dir(config_source: Option<&Path>) -> Result<PathBuf> {
    let base = match config_source.and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    Ok(base.join("audit"))
}

/// Write the payload of a mutating operation as pretty JSON, named
/// `{operation}_{timestamp}.json`. Returns the path written.
pub fn save_payload<T: Serialize>(
    operation: &str,
    payload: &T,
    config_source: Option<&Path>,
) -> Result<PathBuf> {
    let dir = audit_dir(config_source)?;
    fs::create_dir_all(&dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{}_{}.json", operation, timestamp));
    fs::write(&path, serde_json::to_string_pretty(payload)?)?;

    debug!("saved {} payload to {}", operation, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audit_dir_next_to_config_file() {
        let dir = audit_dir(Some(Path::new("/etc/ab-cli/config.yaml"))).unwrap();
        assert_eq!(dir, PathBuf::from("/etc/ab-cli/audit"));
    }

    #[test]
    fn test_save_payload_writes_named_json() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.yaml");

        let payload = json!({"name": "MyAgent", "agentType": "base"});
        let written = save_payload("create_agent", &payload, Some(&config_path)).unwrap();

        assert!(written.starts_with(tmp.path().join("audit")));
        let file_name = written.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("create_agent_"));
        assert!(file_name.ends_with(".json"));

        let contents = fs::read_to_string(&written).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["agentType"], "base");
    }
}
