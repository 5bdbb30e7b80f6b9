//! Error taxonomies for the assistant.
//!
//! [`AgentError`] covers the reasoning-model and tool-calling layer;
//! [`Error`] covers everything else. Failures are recovered at the lowest
//! layer that can provide a meaningful fallback: tool failures become
//! observations inside the executor loop, retrieval failures fall back to
//! the built-in corpus, and provider failures are converted into a fixed
//! apology at the router.

use thiserror::Error;

/// Errors from the agent layer: provider calls, tool execution, the loop.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured for the reasoning backend.
    #[error("no API key configured (set OPENAI_API_KEY or AFTERCARE_API_KEY)")]
    ApiKeyMissing,

    /// The configured provider name is not supported.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The unrecognized provider name.
        name: String,
    },

    /// The provider API call failed.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Provider error message.
        message: String,
        /// HTTP status, when the provider reported one.
        status: Option<u16>,
    },

    /// A tool call failed during execution.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Name of the tool that failed.
        name: String,
        /// Failure detail.
        message: String,
    },
}

/// Top-level errors outside the agent layer.
///
/// Retrieval has no variant here: document-extraction failures trigger
/// fallback ingestion of the compiled-in corpus rather than surfacing an
/// error.
#[derive(Debug, Error)]
pub enum Error {
    /// The patient directory could not be loaded.
    #[error("patient directory error: {message}")]
    PatientDirectory {
        /// Failure detail.
        message: String,
    },

    /// Propagated agent-layer error.
    #[error(transparent)]
    Agent(#[from] AgentError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_display() {
        let err = AgentError::ToolExecution {
            name: "patient_lookup".to_string(),
            message: "directory offline".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "tool 'patient_lookup' failed: directory offline"
        );
    }

    #[test]
    fn test_error_from_agent() {
        let err: Error = AgentError::ApiKeyMissing.into();
        assert!(matches!(err, Error::Agent(AgentError::ApiKeyMissing)));
    }

    #[test]
    fn test_patient_directory_error_display() {
        let err = Error::PatientDirectory {
            message: "cannot read records.json".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "patient directory error: cannot read records.json"
        );
    }
}
