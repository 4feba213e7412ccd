//! OAuth2 client-credentials flow with token caching.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Settings;
use crate::error::{AbError, Result};

/// Seconds before nominal expiry at which a token counts as stale, so a
/// request never goes out with a token about to lapse mid-flight.
const EXPIRY_BUFFER_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
    #[serde(default)]
    scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub token_type: String,
    /// Unix timestamp past which the token is unusable.
    pub expires_at: u64,
    pub scope: Option<String>,
}

impl TokenInfo {
    fn from_response(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at: unix_now() + response.expires_in,
            scope: response.scope,
        }
    }

    pub fn is_expired(&self) -> bool {
        unix_now() + EXPIRY_BUFFER_SECS >= self.expires_at
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub struct AuthClient {
    settings: Settings,
    http: reqwest::blocking::Client,
    token: Option<TokenInfo>,
}

impl AuthClient {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs_f64(settings.timeout))
            .build()?;
        Ok(Self {
            settings,
            http,
            token: None,
        })
    }

    /// Bearer token for API requests, fetched on first use and cached until
    /// it nears expiry.
    pub fn token(&mut self) -> Result<String> {
        if let Some(token) = &self.token {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }
        let token = self.fetch_token()?;
        let access = token.access_token.clone();
        self.token = Some(token);
        Ok(access)
    }

    /// Discard any cached token and fetch a fresh one.
    pub fn refresh(&mut self) -> Result<String> {
        self.token = None;
        self.token()
    }

    fn fetch_token(&self) -> Result<TokenInfo> {
        debug!("requesting token from {}", self.settings.auth_endpoint);

        let params = [
            ("grant_type", self.settings.grant_type.clone()),
            ("client_id", self.settings.client_id.clone()),
            ("client_secret", self.settings.client_secret.clone()),
            ("scope", self.settings.auth_scope.join(" ")),
        ];

        let response = self
            .http
            .post(&self.settings.auth_endpoint)
            .form(&params)
            .send()
            .map_err(|e| AbError::Token(format!("failed to reach auth server: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().unwrap_or(Value::Null);
            let detail = body
                .get("error_description")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(AbError::Token(detail));
        }

        let parsed: TokenResponse = response
            .json()
            .map_err(|e| AbError::Token(format!("malformed token response: {}", e)))?;
        if parsed.access_token.is_empty() {
            return Err(AbError::Token(
                "token response missing access_token".to_string(),
            ));
        }
        debug!("token received, expires in {}s", parsed.expires_in);
        Ok(TokenInfo::from_response(parsed))
    }
}
