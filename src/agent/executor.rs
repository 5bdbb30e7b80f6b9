//! Tool executor that dispatches tool calls to the assistant's collaborators.
//!
//! Maps tool names to direct Rust calls against the patient directory and
//! the web search client. Tool failures never escape as errors; they become
//! error-flagged [`ToolResult`]s the model can observe and recover from.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::error::AgentError;
use crate::patients::{PatientDirectory, format_report};
use crate::websearch::{WebSearchClient, format_outcome};

use super::tool::{ToolCall, ToolResult};

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 100_000;
/// Maximum query length for `web_search`.
const MAX_QUERY_LEN: usize = 500;

/// Observation returned when a patient name matches no record.
fn not_found_message(name: &str) -> String {
    format!(
        "No discharge report found for patient '{name}'. Please verify the spelling or ask \
         the patient for their full name as written on their discharge paperwork."
    )
}

/// Executes tool calls by dispatching to the patient directory and web
/// search client.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    patients: Arc<PatientDirectory>,
    websearch: Arc<WebSearchClient>,
}

impl ToolExecutor {
    /// Creates a new executor over the given collaborators.
    #[must_use]
    pub const fn new(patients: Arc<PatientDirectory>, websearch: Arc<WebSearchClient>) -> Self {
        Self {
            patients,
            websearch,
        }
    }

    /// Dispatches a tool call to the appropriate collaborator.
    ///
    /// Validates raw argument size before dispatch to prevent oversized
    /// payloads. Always produces a [`ToolResult`]; failures are flagged with
    /// `is_error` rather than returned as `Err`.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return ToolResult {
                tool_call_id: call.id.clone(),
                content: format!(
                    "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ),
                is_error: true,
            };
        }

        debug!(tool = %call.name, "executing tool call");

        let result = match call.name.as_str() {
            "patient_lookup" => self.tool_patient_lookup(&call.arguments),
            "web_search" => self.tool_web_search(&call.arguments).await,
            other => Err(AgentError::ToolExecution {
                name: other.to_string(),
                message: "unknown tool".to_string(),
            }),
        };

        match result {
            Ok(content) => ToolResult {
                tool_call_id: call.id.clone(),
                content,
                is_error: false,
            },
            Err(e) => ToolResult {
                tool_call_id: call.id.clone(),
                content: e.to_string(),
                is_error: true,
            },
        }
    }

    // -----------------------------------------------------------------------
    // Tool implementations
    // -----------------------------------------------------------------------

    /// Looks up a patient's discharge report by name.
    ///
    /// A miss is a successful observation (the not-found text), not an
    /// error; the model needs it to ask the user for a corrected name.
    fn tool_patient_lookup(&self, args: &str) -> Result<String, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            patient_name: String,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| AgentError::ToolExecution {
            name: "patient_lookup".to_string(),
            message: format!("invalid arguments: {e}"),
        })?;

        let name = args.patient_name.trim();
        if name.is_empty() {
            return Err(AgentError::ToolExecution {
                name: "patient_lookup".to_string(),
                message: "patient_name must not be empty".to_string(),
            });
        }

        Ok(self
            .patients
            .find(name)
            .map_or_else(|| not_found_message(name), format_report))
    }

    /// Runs a web search for current medical information.
    async fn tool_web_search(&self, args: &str) -> Result<String, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            query: String,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| AgentError::ToolExecution {
            name: "web_search".to_string(),
            message: format!("invalid arguments: {e}"),
        })?;

        if args.query.len() > MAX_QUERY_LEN {
            return Err(AgentError::ToolExecution {
                name: "web_search".to_string(),
                message: format!(
                    "query too long ({} bytes, max {MAX_QUERY_LEN})",
                    args.query.len()
                ),
            });
        }

        let outcome = self.websearch.search(&args.query).await;
        Ok(format_outcome(&outcome))
    }
}
