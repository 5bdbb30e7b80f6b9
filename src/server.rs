//! HTTP surface: chat, patient lookup, and status endpoints.
//!
//! A thin axum layer over the router and session store. Handlers never leak
//! raw errors; provider and tool failures surface as the router's fixed
//! apology responses.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{ChatTurnRequest, ChatTurnResponse, SystemStatus};
use crate::patients::PatientDirectory;
use crate::retrieval::RetrievalIndex;
use crate::router::Router;
use crate::session::SessionStore;

/// Shared application state behind every handler.
pub struct AppState {
    /// Turn router.
    pub router: Router,
    /// Session store.
    pub sessions: SessionStore,
    /// Patient directory, shared with the router.
    pub patients: Arc<PatientDirectory>,
    /// Retrieval index, shared with the router.
    pub index: Arc<RetrievalIndex>,
}

/// Builds the axum application over shared state.
pub fn build_app(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/api/chat", post(chat))
        .route("/api/patient/{name}", get(patient))
        .route("/api/status", get(status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `POST /api/chat` — routes one conversational turn.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatTurnRequest>,
) -> Response {
    if body.message.trim().is_empty() || body.session_id.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "message and session_id must be non-empty"
            })),
        )
            .into_response();
    }

    let session = state.sessions.get_or_create(&body.session_id);
    let mut session = session.lock().await;

    let output = state
        .router
        .route_turn(&mut session, &body.message, body.patient_name.as_deref())
        .await;

    info!(
        session = %body.session_id,
        handler = %output.handler,
        "chat turn served"
    );

    Json(ChatTurnResponse {
        response: output.response,
        agent: output.handler,
        patient_data: output.patient_data,
        sources: output.sources,
    })
    .into_response()
}

/// `GET /api/patient/{name}` — direct discharge-record lookup.
async fn patient(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    state.patients.find(&name).map_or_else(
        || {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "error": format!("no discharge report found for '{name}'")
                })),
            )
                .into_response()
        },
        |record| Json(record.clone()).into_response(),
    )
}

/// `GET /api/status` — service health and counters.
async fn status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let stats = state.index.stats();
    Json(SystemStatus {
        status: "healthy".to_string(),
        patient_count: state.patients.len(),
        vector_db_documents: stats.document_count,
        active_sessions: state.sessions.len(),
    })
}
