use crate::error::{AbError, Result};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Candidate config file names, probed in order.
const CONFIG_CANDIDATES: &[&str] = &["config.yaml", "ab-cli.yaml"];

/// Config directory under the home directory.
const CONFIG_DIR: &str = ".ab-cli";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Environment identifier the credentials belong to.
    #[serde(default)]
    pub environment_id: String,

    /// OAuth2 client id.
    #[serde(default)]
    pub client_id: String,

    /// OAuth2 client secret.
    #[serde(default)]
    pub client_secret: String,

    /// Base URL of the Agent Builder API. Always ends with `/`.
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// OAuth2 token endpoint.
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,

    #[serde(default = "default_auth_scope")]
    pub auth_scope: Vec<String>,

    #[serde(default = "default_grant_type")]
    pub grant_type: String,

    /// Request timeout in seconds (1-300).
    #[serde(default = "default_timeout")]
    pub timeout: f64,

    /// Exponential backoff multiplier between retries (1-10).
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff: f64,

    /// Retry attempts for transient failures (0 disables, max 10).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub default_output_format: OutputFormat,

    /// Save create/update payloads to an audit directory.
    #[serde(default)]
    pub record_updates: bool,

    #[serde(default)]
    pub pagination: PaginationSettings,

    /// Path of the file these settings came from, when one was loaded.
    /// Not part of the file format.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Upstream pages scanned per filtered listing before giving up (1-100).
    #[serde(default = "default_max_filter_pages")]
    pub max_filter_pages: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            max_filter_pages: default_max_filter_pages(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            api_endpoint: default_api_endpoint(),
            auth_endpoint: default_auth_endpoint(),
            auth_scope: default_auth_scope(),
            grant_type: default_grant_type(),
            timeout: default_timeout(),
            retry_backoff: default_retry_backoff(),
            max_retries: default_max_retries(),
            default_output_format: OutputFormat::default(),
            record_updates: false,
            pagination: PaginationSettings::default(),
            source: None,
        }
    }
}

fn default_api_endpoint() -> String {
    "https://api.agentbuilder.experience.hyland.com/".to_string()
}

fn default_auth_endpoint() -> String {
    "https://auth.iam.experience.hyland.com/idp/connect/token".to_string()
}

fn default_auth_scope() -> Vec<String> {
    vec!["hxp".to_string()]
}

fn default_grant_type() -> String {
    "client_credentials".to_string()
}

fn default_timeout() -> f64 {
    30.0
}

fn default_retry_backoff() -> f64 {
    2.0
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_filter_pages() -> u32 {
    10
}

impl Settings {
    /// Load settings with precedence:
    /// 1. Environment variables (`AB_*`)
    /// 2. Config file (explicit path, or the first found candidate)
    /// 3. Built-in defaults
    ///
    /// Works without any file when the required values come from the
    /// environment. Fails with a `Config` error when required values are
    /// missing or ranges are violated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => {
                if !p.exists() {
                    return Err(AbError::Config(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => find_config_file(),
        };

        let mut settings = match &path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };

        settings = settings.merge_env();
        settings.normalize();
        settings.validate(path.as_deref())?;
        Ok(settings)
    }

    /// Load settings from a YAML file, without env overrides or validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut settings: Settings = serde_yaml::from_str(&contents)
            .map_err(|e| AbError::Config(format!("{}: {}", path.display(), e)))?;
        settings.source = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Apply environment variable overrides.
    fn merge_env(mut self) -> Self {
        if let Ok(value) = std::env::var("AB_ENVIRONMENT_ID") {
            self.environment_id = value;
        }
        if let Ok(value) = std::env::var("AB_CLIENT_ID") {
            self.client_id = value;
        }
        if let Ok(value) = std::env::var("AB_CLIENT_SECRET") {
            self.client_secret = value;
        }
        if let Ok(value) = std::env::var("AB_API_ENDPOINT") {
            self.api_endpoint = value;
        }
        if let Ok(value) = std::env::var("AB_AUTH_ENDPOINT") {
            self.auth_endpoint = value;
        }
        if let Ok(value) = std::env::var("AB_TIMEOUT") {
            if let Ok(timeout) = value.parse::<f64>() {
                self.timeout = timeout;
            }
        }
        if let Ok(value) = std::env::var("AB_MAX_RETRIES") {
            if let Ok(retries) = value.parse::<u32>() {
                self.max_retries = retries;
            }
        }
        if let Ok(value) = std::env::var("AB_OUTPUT_FORMAT") {
            if let Ok(format) = <OutputFormat as clap::ValueEnum>::from_str(&value, true) {
                self.default_output_format = format;
            }
        }
        if let Ok(value) = std::env::var("AB_MAX_FILTER_PAGES") {
            if let Ok(pages) = value.parse::<u32>() {
                self.pagination.max_filter_pages = pages;
            }
        }
        self
    }

    /// The API endpoint is joined with path segments, so it must end in `/`.
    fn normalize(&mut self) {
        if !self.api_endpoint.is_empty() && !self.api_endpoint.ends_with('/') {
            self.api_endpoint.push('/');
        }
    }

    fn validate(&self, source: Option<&Path>) -> Result<()> {
        let mut missing = Vec::new();
        if self.environment_id.is_empty() {
            missing.push("environment_id");
        }
        if self.client_id.is_empty() {
            missing.push("client_id");
        }
        if self.client_secret.is_empty() {
            missing.push("client_secret");
        }
        if !missing.is_empty() {
            let context = match source {
                Some(path) => format!("in {}", path.display()),
                None => format!(
                    "and no config file found (searched {}, ~/{}/config.yaml); \
                     run 'ab config init' to create one",
                    CONFIG_CANDIDATES.join(", "),
                    CONFIG_DIR
                ),
            };
            return Err(AbError::Config(format!(
                "missing required settings: {} {}",
                missing.join(", "),
                context
            )));
        }

        for (name, value) in [("api_endpoint", &self.api_endpoint), ("auth_endpoint", &self.auth_endpoint)] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(AbError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, value
                )));
            }
        }

        if !(1.0..=300.0).contains(&self.timeout) {
            return Err(AbError::Config(format!(
                "timeout must be between 1 and 300 seconds, got {}",
                self.timeout
            )));
        }
        if !(1.0..=10.0).contains(&self.retry_backoff) {
            return Err(AbError::Config(format!(
                "retry_backoff must be between 1 and 10, got {}",
                self.retry_backoff
            )));
        }
        if self.max_retries > 10 {
            return Err(AbError::Config(format!(
                "max_retries must be at most 10, got {}",
                self.max_retries
            )));
        }
        if !(1..=100).contains(&self.pagination.max_filter_pages) {
            return Err(AbError::Config(format!(
                "pagination.max_filter_pages must be between 1 and 100, got {}",
                self.pagination.max_filter_pages
            )));
        }
        Ok(())
    }

    /// Advisory warnings for values that are legal but usually unintended.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.timeout < 10.0 {
            warnings.push(format!(
                "timeout of {}s is quite low; slow agents may not respond in time",
                self.timeout
            ));
        }
        if self.max_retries == 0 {
            warnings.push("retries are disabled (max_retries = 0)".to_string());
        }
        if self.api_endpoint.contains("localhost") || self.api_endpoint.contains("127.0.0.1") {
            warnings.push(format!(
                "api_endpoint points at a local server: {}",
                self.api_endpoint
            ));
        }
        warnings
    }
}

/// Load and validate a config file on its own, without environment
/// overrides. The returned settings carry the file as their [`Settings::source`].
pub fn validate_config_file(path: &Path) -> Result<Settings> {
    let mut settings = Settings::from_file(path)?;
    settings.normalize();
    settings.validate(Some(path))?;
    Ok(settings)
}

/// Find the first config file in the search order: `./config.yaml`,
/// `./ab-cli.yaml`, `~/.ab-cli/config.yaml`.
pub fn find_config_file() -> Option<PathBuf> {
    for candidate in CONFIG_CANDIDATES {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Some(path);
        }
    }
    let home_config = home_dir()?.join(CONFIG_DIR).join("config.yaml");
    if home_config.exists() {
        return Some(home_config);
    }
    None
}

/// Default location for a new config file written by `ab config init`.
pub fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(CONFIG_DIR).join("config.yaml"),
        None => PathBuf::from("config.yaml"),
    }
}

/// Mask a secret, keeping the first and last four characters when the value
/// is long enough to stay unrecognizable.
pub fn redact_secret(value: &str) -> String {
    if value.is_empty() {
        return "(not set)".to_string();
    }
    if value.len() > 12 {
        if let (Some(head), Some(tail)) = (value.get(..4), value.get(value.len() - 4..)) {
            return format!("{}...{}", head, tail);
        }
    }
    "****".to_string()
}

/// Get the home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
