//! Wire types for the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::patients::PatientRecord;
use crate::session::HandlerKind;

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurnRequest {
    /// The patient's message.
    pub message: String,
    /// Caller-chosen session key.
    pub session_id: String,
    /// Optional explicit patient name hint.
    #[serde(default)]
    pub patient_name: Option<String>,
}

/// Response of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurnResponse {
    /// Assistant response text.
    pub response: String,
    /// Handler that served the turn.
    pub agent: HandlerKind,
    /// Discharge record on file for the session, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_data: Option<PatientRecord>,
    /// Source labels backing a clinical answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

/// Response of `GET /api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    /// Service health label.
    pub status: String,
    /// Number of loaded patient records.
    pub patient_count: usize,
    /// Number of indexed reference chunks.
    pub vector_db_documents: usize,
    /// Number of live sessions.
    pub active_sessions: usize,
}
