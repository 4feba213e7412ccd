use thiserror::Error;

#[derive(Error, Debug)]
pub enum AbError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Token request failed: {0}")]
    Token(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited: {0}")]
    RateLimit(String),

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AbError {
    /// Exit code for the process when this error reaches `main`.
    ///
    /// Misuse and configuration problems exit 2, matching clap's own usage
    /// errors; runtime failures (network, auth, server) exit 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            AbError::Config(_) | AbError::InvalidRequest(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, AbError>;
