//! Tool type definitions for internal function-calling.
//!
//! Provides provider-agnostic types for tool definitions, calls, and
//! results. Tools expose the patient directory and web search as
//! function-calling targets for the conversation handlers.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match dispatch table in executor).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content (report or observation text; error message on failure).
    pub content: String,
    /// Whether this result represents an error.
    pub is_error: bool,
}

/// Audit record of one tool invocation inside an executor run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocationRecord {
    /// Tool that was invoked.
    pub tool_name: String,
    /// JSON-encoded arguments as the model supplied them.
    pub input: String,
    /// Observation text handed back to the model.
    pub output: String,
    /// Whether the invocation succeeded.
    pub success: bool,
}

/// A set of tool definitions scoped to a handler role.
///
/// Handlers get different tool subsets:
/// - Receptionist: `patient_lookup` only
/// - Clinical: `patient_lookup` and `web_search`
#[derive(Debug, Clone)]
pub struct ToolSet {
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Returns the tool definitions in this set.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns `true` if this set contains no tools.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the number of tools in this set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Tool set for the receptionist handler.
    #[must_use]
    pub fn receptionist() -> Self {
        Self {
            definitions: vec![def_patient_lookup()],
        }
    }

    /// Tool set for the clinical handler.
    #[must_use]
    pub fn clinical() -> Self {
        Self {
            definitions: vec![def_patient_lookup(), def_web_search()],
        }
    }
}

// ---------------------------------------------------------------------------
// Tool schema definitions
// ---------------------------------------------------------------------------

/// Defines the `patient_lookup` tool.
fn def_patient_lookup() -> ToolDefinition {
    ToolDefinition {
        name: "patient_lookup".to_string(),
        description: "Look up a patient's discharge report by name. Returns the full \
                       discharge report (diagnosis, medications, diet, follow-up, warning \
                       signs) or a not-found message."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "patient_name": {
                    "type": "string",
                    "description": "Patient name to look up. Full name preferred; a last \
                                    name alone also works."
                }
            },
            "required": ["patient_name"],
            "additionalProperties": false
        }),
    }
}

/// Defines the `web_search` tool.
fn def_web_search() -> ToolDefinition {
    ToolDefinition {
        name: "web_search".to_string(),
        description: "Search the web for current medical information when the reference \
                       material does not cover the question. Returns up to three results \
                       with titles, URLs, and snippets."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query describing the medical question."
                }
            },
            "required": ["query"],
            "additionalProperties": false
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolset_receptionist() {
        let ts = ToolSet::receptionist();
        assert!(!ts.is_empty());
        assert_eq!(ts.len(), 1);
        assert_eq!(ts.definitions()[0].name, "patient_lookup");
    }

    #[test]
    fn test_toolset_clinical() {
        let ts = ToolSet::clinical();
        assert_eq!(ts.len(), 2);
        let names: Vec<&str> = ts.definitions().iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"patient_lookup"));
        assert!(names.contains(&"web_search"));
    }

    #[test]
    fn test_tool_definition_serialization() {
        let def = def_patient_lookup();
        let json = serde_json::to_string(&def).unwrap_or_default();
        assert!(json.contains("patient_lookup"));
        assert!(json.contains("patient_name"));
    }

    #[test]
    fn test_tool_call_serialization() {
        let call = ToolCall {
            id: "call_123".to_string(),
            name: "web_search".to_string(),
            arguments: r#"{"query":"CKD diet"}"#.to_string(),
        };
        let json = serde_json::to_string(&call).unwrap_or_default();
        assert!(json.contains("call_123"));
        assert!(json.contains("web_search"));
    }

    #[test]
    fn test_tool_result_serialization() {
        let result = ToolResult {
            tool_call_id: "call_123".to_string(),
            content: "PATIENT DISCHARGE REPORT FOUND".to_string(),
            is_error: false,
        };
        let json = serde_json::to_string(&result).unwrap_or_default();
        assert!(json.contains("call_123"));
        assert!(!result.is_error);
    }

    #[test]
    fn test_all_definitions_have_valid_schemas() {
        let all = vec![def_patient_lookup(), def_web_search()];
        for def in &all {
            assert!(!def.name.is_empty());
            assert!(!def.description.is_empty());
            assert!(def.parameters.is_object());
            assert_eq!(def.parameters["type"], "object");
        }
    }
}
