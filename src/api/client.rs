//! Blocking HTTP client for the Agent Builder API.
//!
//! Owns transport concerns end to end: bearer auth headers, status-code to
//! error mapping, and retry with exponential backoff for transient failures.
//! Callers above this layer (notably the pagination orchestrator) never
//! retry; they see each request succeed or fail exactly once.

use std::io::{BufRead, BufReader};
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Response;
use reqwest::Method;
use serde_json::Value;

use crate::api::auth::AuthClient;
use crate::api::pagination::{AgentPage, AgentSource};
use crate::config::Settings;
use crate::error::{AbError, Result};
use crate::models::agent::{
    Agent, AgentCreate, AgentList, AgentPatch, AgentTypeList, AgentUpdate, AgentVersion,
    VersionConfig, VersionCreate, VersionList,
};
use crate::models::invocation::{InvokeRequest, InvokeResponse, InvokeTaskRequest, StreamEvent};
use crate::models::resources::{GuardrailList, LlmModelList};

pub struct AgentBuilderClient {
    settings: Settings,
    auth: AuthClient,
    http: reqwest::blocking::Client,
}

impl AgentBuilderClient {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs_f64(settings.timeout))
            .build()?;
        let auth = AuthClient::new(settings.clone())?;
        Ok(Self {
            settings,
            auth,
            http,
        })
    }

    /// The environment is carried by the OAuth token, not the URL path.
    fn base_url(&self) -> String {
        format!("{}v1", self.settings.api_endpoint)
    }

    pub fn auth_mut(&mut self) -> &mut AuthClient {
        &mut self.auth
    }

    fn request(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url(), path);
        self.request_url(method, &url, query, body)
    }

    /// Issue a request against a full URL, retrying transient failures
    /// (connect errors, timeouts, 429, 5xx) up to `max_retries` times with
    /// `retry_backoff^attempt` seconds between attempts.
    fn request_url(
        &mut self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut attempt: u32 = 0;
        loop {
            debug!("{} {} (attempt {})", method, url, attempt + 1);
            match self.try_request(&method, url, query, body) {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.settings.max_retries && is_retriable(&err) => {
                    let delay = self.settings.retry_backoff.powi(attempt as i32);
                    warn!(
                        "request failed ({}); retrying in {:.0}s ({}/{} retries used)",
                        err,
                        delay,
                        attempt + 1,
                        self.settings.max_retries
                    );
                    thread::sleep(Duration::from_secs_f64(delay));
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn try_request(
        &mut self,
        method: &Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let token = self.auth.token()?;
        let mut builder = self.http.request(method.clone(), url).bearer_auth(token);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().map_err(classify_transport)?;
        handle_response(response)
    }

    /// Open a server-sent-event stream. Streaming responses arrive as the
    /// agent produces them, so this client has no read deadline.
    fn open_stream(&mut self, path: &str, body: &Value) -> Result<EventStream> {
        let token = self.auth.token()?;
        let url = format!("{}{}", self.base_url(), path);
        debug!("POST {} (streaming)", url);

        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;
        let response = client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .map_err(classify_transport)?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let text = response.text()?;
            let data: Value =
                serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({"detail": text}));
            return Err(error_for_status(status, &data));
        }
        Ok(EventStream::new(response))
    }

    // ---- Agents -----------------------------------------------------------

    pub fn list_agents(&mut self, limit: u32, offset: u32) -> Result<AgentList> {
        let data = self.request(
            Method::GET,
            "/agents",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
            None,
        )?;
        Ok(serde_json::from_value(data)?)
    }

    pub fn get_agent(&mut self, agent_id: &str, version_id: Option<&str>) -> Result<AgentVersion> {
        let version = version_id.unwrap_or("latest");
        let data = self.request(
            Method::GET,
            &format!("/agents/{}/versions/{}", agent_id, version),
            &[],
            None,
        )?;
        parse_agent_version(data)
    }

    pub fn create_agent(&mut self, agent: &AgentCreate) -> Result<AgentVersion> {
        let body = serde_json::to_value(agent)?;
        let data = self.request(Method::POST, "/agents", &[], Some(&body))?;
        parse_agent_version(data)
    }

    /// Create a new version carrying updated config and/or metadata.
    pub fn update_agent(&mut self, agent_id: &str, update: &AgentUpdate) -> Result<AgentVersion> {
        let body = serde_json::to_value(update)?;
        let data = self.request(
            Method::POST,
            &format!("/agents/{}/versions", agent_id),
            &[],
            Some(&body),
        )?;
        parse_agent_version(data)
    }

    /// Update name/description in place, without creating a version.
    pub fn patch_agent(&mut self, agent_id: &str, patch: &AgentPatch) -> Result<Agent> {
        let body = serde_json::to_value(patch)?;
        let data = self.request(
            Method::PATCH,
            &format!("/agents/{}", agent_id),
            &[],
            Some(&body),
        )?;
        Ok(serde_json::from_value(data)?)
    }

    pub fn delete_agent(&mut self, agent_id: &str) -> Result<()> {
        self.request(Method::DELETE, &format!("/agents/{}", agent_id), &[], None)?;
        Ok(())
    }

    pub fn list_agent_types(&mut self, limit: u32, offset: u32) -> Result<AgentTypeList> {
        let data = self.request(
            Method::GET,
            "/agents/types",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
            None,
        )?;
        Ok(serde_json::from_value(data)?)
    }

    // ---- Versions ---------------------------------------------------------

    pub fn list_versions(
        &mut self,
        agent_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<VersionList> {
        let data = self.request(
            Method::GET,
            &format!("/agents/{}/versions", agent_id),
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
            None,
        )?;
        Ok(serde_json::from_value(data)?)
    }

    pub fn get_version(&mut self, agent_id: &str, version_id: &str) -> Result<AgentVersion> {
        let data = self.request(
            Method::GET,
            &format!("/agents/{}/versions/{}", agent_id, version_id),
            &[],
            None,
        )?;
        parse_agent_version(data)
    }

    pub fn create_version(
        &mut self,
        agent_id: &str,
        version: &VersionCreate,
    ) -> Result<AgentVersion> {
        let body = serde_json::to_value(version)?;
        let data = self.request(
            Method::POST,
            &format!("/agents/{}/versions", agent_id),
            &[],
            Some(&body),
        )?;
        parse_agent_version(data)
    }

    // ---- Resources --------------------------------------------------------

    pub fn list_models(
        &mut self,
        agent_type: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<LlmModelList> {
        let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(agent_type) = agent_type {
            query.push(("filter[agentType]", agent_type.to_string()));
        }
        let data = self.request(Method::GET, "/models", &query, None)?;
        Ok(serde_json::from_value(data)?)
    }

    pub fn list_guardrails(&mut self, limit: u32, offset: u32) -> Result<GuardrailList> {
        let data = self.request(
            Method::GET,
            "/guardrails",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
            None,
        )?;
        Ok(serde_json::from_value(data)?)
    }

    // ---- Invocation -------------------------------------------------------

    pub fn invoke_agent(
        &mut self,
        agent_id: &str,
        version_id: &str,
        request: &InvokeRequest,
    ) -> Result<InvokeResponse> {
        let body = serde_json::to_value(request)?;
        let data = self.request(
            Method::POST,
            &format!("/agents/{}/versions/{}/invoke", agent_id, version_id),
            &[],
            Some(&body),
        )?;
        Ok(serde_json::from_value(data)?)
    }

    pub fn invoke_agent_stream(
        &mut self,
        agent_id: &str,
        version_id: &str,
        request: &InvokeRequest,
    ) -> Result<EventStream> {
        let body = serde_json::to_value(request)?;
        self.open_stream(
            &format!("/agents/{}/versions/{}/invoke-stream", agent_id, version_id),
            &body,
        )
    }

    pub fn invoke_task(
        &mut self,
        agent_id: &str,
        version_id: &str,
        request: &InvokeTaskRequest,
    ) -> Result<InvokeResponse> {
        let body = serde_json::to_value(request)?;
        let data = self.request(
            Method::POST,
            &format!("/agents/{}/versions/{}/invoke-task", agent_id, version_id),
            &[],
            Some(&body),
        )?;
        Ok(serde_json::from_value(data)?)
    }

    pub fn invoke_task_stream(
        &mut self,
        agent_id: &str,
        version_id: &str,
        request: &InvokeTaskRequest,
    ) -> Result<EventStream> {
        let body = serde_json::to_value(request)?;
        self.open_stream(
            &format!(
                "/agents/{}/versions/{}/invoke-task-stream",
                agent_id, version_id
            ),
            &body,
        )
    }

    // ---- Health -----------------------------------------------------------

    /// The health endpoint is served at the API root, outside the
    /// versioned prefix every other endpoint lives under.
    fn health_url(&self) -> String {
        format!("{}health", self.settings.api_endpoint)
    }

    pub fn health_check(&mut self) -> Result<Value> {
        let url = self.health_url();
        self.request_url(Method::GET, &url, &[], None)
    }
}

impl AgentSource for AgentBuilderClient {
    fn fetch_page(&mut self, limit: u32, offset: u32) -> Result<AgentPage> {
        let list = self.list_agents(limit, offset)?;
        Ok(AgentPage {
            agents: list.agents,
            total_items: list.pagination.total_items,
        })
    }
}

fn classify_transport(err: reqwest::Error) -> AbError {
    if err.is_timeout() {
        AbError::Timeout(err.to_string())
    } else if err.is_connect() {
        AbError::Connection(format!("failed to connect to API: {}", err))
    } else {
        AbError::Http(err)
    }
}

fn is_retriable(err: &AbError) -> bool {
    match err {
        AbError::Connection(_) | AbError::Timeout(_) | AbError::RateLimit(_) => true,
        AbError::Server { status, .. } => *status >= 500,
        _ => false,
    }
}

fn handle_response(response: Response) -> Result<Value> {
    let status = response.status().as_u16();
    if status == 204 {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let text = response.text()?;
    let data: Value =
        serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "detail": text }));

    if (200..300).contains(&status) {
        return Ok(data);
    }
    Err(error_for_status(status, &data))
}

/// Map a non-2xx status and its parsed body to the error taxonomy.
fn error_for_status(status: u16, data: &Value) -> AbError {
    let detail = data
        .get("detail")
        .or_else(|| data.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| data.to_string());

    match status {
        401 => AbError::Auth(format!("authentication failed: {}", detail)),
        403 => AbError::Auth(format!("access denied: {}", detail)),
        404 => AbError::NotFound(detail),
        400 | 422 => AbError::Validation(detail),
        429 => AbError::RateLimit(detail),
        _ => AbError::Server {
            status,
            message: detail,
        },
    }
}

/// Create/get responses normally arrive as an `{agent, version}` envelope,
/// but some deployments return the bare agent object. Accept both.
fn parse_agent_version(data: Value) -> Result<AgentVersion> {
    if data.get("agent").is_some() && data.get("version").is_some() {
        return Ok(serde_json::from_value(data)?);
    }

    let agent: Agent = serde_json::from_value(data.clone())?;
    let version = VersionConfig {
        id: agent.current_version_id.unwrap_or(agent.id),
        number: data.get("version").and_then(Value::as_u64).unwrap_or(1) as u32,
        version_label: None,
        notes: None,
        created_at: agent.created_at.clone(),
        created_by: agent.created_by.clone(),
        config: data.get("config").cloned().unwrap_or(Value::Null),
    };
    Ok(AgentVersion { agent, version })
}

/// Iterator over `data:` frames of a server-sent-event response.
pub struct EventStream {
    lines: std::io::Lines<BufReader<Response>>,
}

impl EventStream {
    fn new(response: Response) -> Self {
        Self {
            lines: BufReader::new(response).lines(),
        }
    }
}

impl Iterator for EventStream {
    type Item = Result<StreamEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(AbError::Connection(format!(
                        "stream read failed: {}",
                        e
                    ))))
                }
            };
            if let Some(payload) = line.strip_prefix("data: ") {
                return Some(Ok(parse_stream_event(payload)));
            }
        }
    }
}

/// Parse one SSE payload; malformed frames become error events instead of
/// tearing down the stream.
fn parse_stream_event(payload: &str) -> StreamEvent {
    match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(e) => StreamEvent {
            event: "error".to_string(),
            data: Some(format!("error parsing event: {}", e)),
        },
    }
}
