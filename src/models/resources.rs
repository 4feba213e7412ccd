//! Wire models for the platform resource catalogs (LLM models, guardrails).

use serde::{Deserialize, Serialize};

use crate::models::agent::PageMeta;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprecationStatus {
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub deprecation_date: String,
    #[serde(default)]
    pub replacement_model_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub badge: String,
    #[serde(default)]
    pub metadata: String,
    #[serde(default)]
    pub agent_types: Vec<String>,
    #[serde(default)]
    pub capabilities: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub deprecation_status: DeprecationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmModelList {
    pub models: Vec<LlmModel>,
    pub pagination: PageMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guardrail {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailList {
    pub guardrails: Vec<Guardrail>,
    pub pagination: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_llm_model_parses_minimal_payload() {
        let payload = json!({
            "id": "anthropic.claude-3-haiku-20240307-v1:0",
            "name": "Claude 3 Haiku"
        });

        let model: LlmModel = serde_json::from_value(payload).unwrap();
        assert!(model.agent_types.is_empty());
        assert!(!model.deprecation_status.deprecated);
    }

    #[test]
    fn test_llm_model_parses_deprecation_status() {
        let payload = json!({
            "id": "old-model",
            "name": "Old Model",
            "agentTypes": ["rag", "base"],
            "deprecationStatus": {
                "deprecated": true,
                "deprecationDate": "2025-12-31",
                "replacementModelName": "new-model"
            }
        });

        let model: LlmModel = serde_json::from_value(payload).unwrap();
        assert_eq!(model.agent_types, vec!["rag", "base"]);
        assert!(model.deprecation_status.deprecated);
        assert_eq!(model.deprecation_status.replacement_model_name, "new-model");
    }
}
