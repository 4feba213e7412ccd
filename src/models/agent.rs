//! Agent and version wire models.
//!
//! These mirror the JSON shapes returned by the Agent Builder API, which
//! uses camelCase field names. Unknown fields are ignored on input so newer
//! API revisions do not break older clients.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_status() -> String {
    "CREATED".to_string()
}

/// Pagination envelope attached to list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub limit: u32,
    pub offset: u32,
    pub total_items: u64,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: Uuid,
    /// Agent type identifier, e.g. `base`, `tool`, `rag`, `task`.
    #[serde(rename = "type")]
    pub agent_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub is_global_agent: bool,
    #[serde(default)]
    pub current_version_id: Option<Uuid>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub modified_at: String,
    #[serde(default)]
    pub modified_by: Option<String>,
}

impl Agent {
    /// Date part of the creation timestamp, for table display.
    pub fn created_date(&self) -> &str {
        self.created_at.get(..10).unwrap_or(&self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentList {
    pub agents: Vec<Agent>,
    pub pagination: PageMeta,
}

/// Payload for `POST /agents`. Identity fields default to empty on input
/// so a partial payload file can be completed from command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCreate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub agent_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub config: serde_json::Value,
}

/// Payload for `POST /agents/{id}/versions` issued by `agents update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// Payload for `PATCH /agents/{id}`: metadata only, no new version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Version summary, without the configuration body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: Uuid,
    pub number: u32,
    #[serde(default)]
    pub version_label: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub created_by: String,
}

/// Version with its full configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionConfig {
    pub id: Uuid,
    pub number: u32,
    #[serde(default)]
    pub version_label: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionList {
    pub agent: Agent,
    pub versions: Vec<Version>,
    pub pagination: PageMeta,
}

/// Agent together with one version's configuration, the `GET /agents/{id}`
/// and create/update response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentVersion {
    pub agent: Agent,
    pub version: VersionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTypeInfo {
    #[serde(rename = "type")]
    pub agent_type: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTypeList {
    pub agent_types: Vec<AgentTypeInfo>,
    pub pagination: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_parses_camel_case_payload() {
        let payload = json!({
            "id": "7f2c1b34-9a10-4a2f-8a4e-1f2d3c4b5a69",
            "type": "rag",
            "name": "Document RAG",
            "description": "Searches documents",
            "status": "ACTIVE",
            "isGlobalAgent": true,
            "currentVersionId": "aa2c1b34-9a10-4a2f-8a4e-1f2d3c4b5a70",
            "createdAt": "2025-03-01T12:00:00Z",
            "createdBy": "someone@example.com",
            "modifiedAt": "2025-03-02T08:30:00Z",
            "modifiedBy": "other@example.com",
            "futureField": {"ignored": true}
        });

        let agent: Agent = serde_json::from_value(payload).unwrap();
        assert_eq!(agent.agent_type, "rag");
        assert_eq!(agent.name, "Document RAG");
        assert!(agent.is_global_agent);
        assert!(agent.current_version_id.is_some());
        assert_eq!(agent.created_date(), "2025-03-01");
    }

    #[test]
    fn test_agent_fills_defaults_for_missing_fields() {
        let payload = json!({
            "id": "7f2c1b34-9a10-4a2f-8a4e-1f2d3c4b5a69",
            "type": "tool",
            "name": "Calculator"
        });

        let agent: Agent = serde_json::from_value(payload).unwrap();
        assert_eq!(agent.status, "CREATED");
        assert!(!agent.is_global_agent);
        assert!(agent.current_version_id.is_none());
        assert_eq!(agent.description, "");
    }

    #[test]
    fn test_agent_create_serializes_with_api_names() {
        let create = AgentCreate {
            name: "MyAgent".to_string(),
            description: "A helpful assistant".to_string(),
            agent_type: "base".to_string(),
            version_label: Some("v1.0".to_string()),
            notes: None,
            config: json!({"system_prompt": "You are helpful."}),
        };

        let value = serde_json::to_value(&create).unwrap();
        assert_eq!(value["agentType"], "base");
        assert_eq!(value["versionLabel"], "v1.0");
        assert!(value.get("notes").is_none());
        assert_eq!(value["config"]["system_prompt"], "You are helpful.");
    }

    #[test]
    fn test_agent_patch_omits_unset_fields() {
        let patch = AgentPatch {
            name: Some("Renamed".to_string()),
            description: None,
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value["name"], "Renamed");
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_version_list_round_trip() {
        let payload = json!({
            "agent": {
                "id": "7f2c1b34-9a10-4a2f-8a4e-1f2d3c4b5a69",
                "type": "task",
                "name": "Insurance Task"
            },
            "versions": [
                {
                    "id": "aa2c1b34-9a10-4a2f-8a4e-1f2d3c4b5a70",
                    "number": 3,
                    "versionLabel": "v3.0",
                    "createdAt": "2025-04-01T00:00:00Z",
                    "createdBy": "someone@example.com"
                }
            ],
            "pagination": {"limit": 50, "offset": 0, "totalItems": 1, "hasMore": false}
        });

        let list: VersionList = serde_json::from_value(payload).unwrap();
        assert_eq!(list.versions.len(), 1);
        assert_eq!(list.versions[0].number, 3);
        assert_eq!(list.versions[0].version_label.as_deref(), Some("v3.0"));
        assert_eq!(list.pagination.total_items, 1);
    }
}
