//! Per-turn routing between the receptionist and clinical handlers.
//!
//! Every incoming message is classified fresh against the clinical lexicon
//! (no hysteresis; the prior handler carries no weight). The receptionist
//! path favors deterministic fast paths — cached record, direct name lookup —
//! before spending an executor run. The clinical path always retrieves
//! reference passages first, then lets the model reason with web search
//! available. Provider failures never escape: each handler has a fixed
//! apology response.

pub mod lexicon;

use std::sync::Arc;

use tracing::{error, info};

use crate::agent::{
    CLINICAL_SYSTEM_PROMPT, ChatRequest, ExecutorLimits, ExecutorOutcome, LlmProvider,
    MEDICAL_DISCLAIMER, RECEPTIONIST_SYSTEM_PROMPT, ToolExecutor, ToolInvocationRecord, ToolSet,
    build_clinical_message, build_receptionist_message, run_executor,
};
use crate::agent::message::{system_message, user_message};
use crate::config::Settings;
use crate::patients::{PatientDirectory, PatientRecord, format_report};
use crate::retrieval::RetrievalIndex;
use crate::session::{HandlerKind, Session};
use crate::websearch::WebSearchClient;

/// Apology used when the receptionist path fails unexpectedly.
const RECEPTIONIST_APOLOGY: &str =
    "I apologize for the confusion. Could you please rephrase that?";

/// Apology used when the clinical path fails unexpectedly.
const CLINICAL_APOLOGY: &str =
    "I apologize, but I'm having difficulty answering that. Please consult your healthcare \
     provider.";

/// Source label added when the executor transcript shows a web search.
const WEB_SEARCH_SOURCE: &str = "Web Search Results";

/// Maximum medications quoted in the clinical patient summary.
const SUMMARY_MEDICATION_LIMIT: usize = 3;

/// Result of routing one turn.
#[derive(Debug, Clone)]
pub struct TurnOutput {
    /// Assistant response text.
    pub response: String,
    /// Handler that served the turn.
    pub handler: HandlerKind,
    /// Discharge record cached on the session after this turn, if any.
    pub patient_data: Option<PatientRecord>,
    /// Source labels backing a clinical answer.
    pub sources: Option<Vec<String>>,
}

/// Routes turns to handlers and owns their shared collaborators.
pub struct Router {
    provider: Arc<dyn LlmProvider>,
    patients: Arc<PatientDirectory>,
    index: Arc<RetrievalIndex>,
    executor: ToolExecutor,
    settings: Settings,
}

impl Router {
    /// Creates a router over the given collaborators.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        patients: Arc<PatientDirectory>,
        index: Arc<RetrievalIndex>,
        websearch: Arc<WebSearchClient>,
        settings: Settings,
    ) -> Self {
        let executor = ToolExecutor::new(Arc::clone(&patients), websearch);
        Self {
            provider,
            patients,
            index,
            executor,
            settings,
        }
    }

    /// Routes one turn, mutating the session before returning.
    ///
    /// The caller holds the session lock for the duration of the call, so
    /// the session sees turns in order.
    pub async fn route_turn(
        &self,
        session: &mut Session,
        message: &str,
        name_hint: Option<&str>,
    ) -> TurnOutput {
        let clinical = lexicon::is_clinical(message);
        let handler = if clinical {
            HandlerKind::Clinical
        } else {
            HandlerKind::Receptionist
        };

        if let Some(previous) = session.current_handler
            && previous != handler
        {
            info!(from = %previous, to = %handler, "handler handoff");
        }
        info!(handler = %handler, lexicon_version = lexicon::VERSION, "turn classified");

        let output = if clinical {
            self.clinical_turn(session, message).await
        } else {
            self.receptionist_turn(session, message, name_hint).await
        };

        session.append_turn(message, &output.response, handler);
        output
    }

    // -----------------------------------------------------------------------
    // Receptionist path
    // -----------------------------------------------------------------------

    async fn receptionist_turn(
        &self,
        session: &mut Session,
        message: &str,
        name_hint: Option<&str>,
    ) -> TurnOutput {
        // Fast path: record already on file, no model round-trip needed.
        if let Some(record) = session.patient_record.clone() {
            return TurnOutput {
                response: greeting_from_record(&record),
                handler: HandlerKind::Receptionist,
                patient_data: Some(record),
                sources: None,
            };
        }

        // Name hint (explicit or extracted) gets a direct directory lookup.
        let extracted = extract_name(message);
        let hint = name_hint
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(String::from)
            .or(extracted);

        if let Some(ref name) = hint
            && let Some(record) = self.patients.find(name).cloned()
        {
            info!(patient = %record.patient_name, "patient identified by direct lookup");
            session.set_patient_record(record.clone());
            return TurnOutput {
                response: welcome_from_record(&record),
                handler: HandlerKind::Receptionist,
                patient_data: Some(record),
                sources: None,
            };
        }

        // No record and no usable hint: let the model drive the lookup tool.
        let toolset = ToolSet::receptionist();
        let mut request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                system_message(RECEPTIONIST_SYSTEM_PROMPT),
                user_message(&build_receptionist_message(message, None)),
            ],
            temperature: None,
            max_tokens: Some(self.settings.max_tokens),
            tools: toolset.definitions().to_vec(),
        };

        match run_executor(
            self.provider.as_ref(),
            &mut request,
            &self.executor,
            self.limits(),
        )
        .await
        {
            Ok(outcome) => {
                self.cache_record_from_records(session, &outcome.records);
                TurnOutput {
                    response: outcome.answer,
                    handler: HandlerKind::Receptionist,
                    patient_data: session.patient_record.clone(),
                    sources: None,
                }
            }
            Err(e) => {
                error!(component = "receptionist", error = %e, "executor run failed");
                TurnOutput {
                    response: RECEPTIONIST_APOLOGY.to_string(),
                    handler: HandlerKind::Receptionist,
                    patient_data: None,
                    sources: None,
                }
            }
        }
    }

    /// Caches the discharge record when the transcript shows a successful
    /// lookup that found a report.
    fn cache_record_from_records(&self, session: &mut Session, records: &[ToolInvocationRecord]) {
        for record in records {
            if record.tool_name == "patient_lookup"
                && record.success
                && record.output.contains("PATIENT DISCHARGE REPORT FOUND")
                && let Ok(args) = serde_json::from_str::<serde_json::Value>(&record.input)
                && let Some(name) = args.get("patient_name").and_then(|v| v.as_str())
                && let Some(found) = self.patients.find(name).cloned()
            {
                info!(patient = %found.patient_name, "patient identified via executor");
                session.set_patient_record(found);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Clinical path
    // -----------------------------------------------------------------------

    async fn clinical_turn(&self, session: &mut Session, message: &str) -> TurnOutput {
        let hits = self.index.search(message, self.settings.top_k);

        let patient_summary = session.patient_record.as_ref().map(patient_summary);
        let task = build_clinical_message(message, &hits, patient_summary.as_deref());

        let toolset = ToolSet::clinical();
        let mut request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![system_message(CLINICAL_SYSTEM_PROMPT), user_message(&task)],
            temperature: None,
            max_tokens: Some(self.settings.max_tokens),
            tools: toolset.definitions().to_vec(),
        };

        let outcome = match run_executor(
            self.provider.as_ref(),
            &mut request,
            &self.executor,
            self.limits(),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(component = "clinical", error = %e, "executor run failed");
                return TurnOutput {
                    response: CLINICAL_APOLOGY.to_string(),
                    handler: HandlerKind::Clinical,
                    patient_data: session.patient_record.clone(),
                    sources: None,
                };
            }
        };

        let mut sources: Vec<String> = Vec::new();
        for hit in &hits {
            if !sources.contains(&hit.metadata.source) {
                sources.push(hit.metadata.source.clone());
            }
        }
        if web_search_succeeded(&outcome) {
            sources.push(WEB_SEARCH_SOURCE.to_string());
        }

        TurnOutput {
            response: with_disclaimer(outcome.answer),
            handler: HandlerKind::Clinical,
            patient_data: session.patient_record.clone(),
            sources: Some(sources),
        }
    }

    const fn limits(&self) -> ExecutorLimits {
        ExecutorLimits {
            max_iterations: self.settings.max_iterations,
            max_wall_time: self.settings.max_wall_time,
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("provider", &self.provider.name())
            .field("patients", &self.patients.len())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Extracts a candidate patient name: the first pair of adjacent capitalized
/// alphabetic tokens. Tokens with internal punctuation ("I'm") never match.
fn extract_name(message: &str) -> Option<String> {
    let tokens: Vec<&str> = message
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .collect();

    let is_name_token = |t: &str| {
        t.len() >= 2
            && t.chars().all(char::is_alphabetic)
            && t.chars().next().is_some_and(char::is_uppercase)
    };

    tokens
        .windows(2)
        .find(|pair| is_name_token(pair[0]) && is_name_token(pair[1]))
        .map(|pair| format!("{} {}", pair[0], pair[1]))
}

/// Short patient summary for the clinical task context: diagnosis plus up
/// to three medications.
fn patient_summary(record: &PatientRecord) -> String {
    let medications = record
        .medications
        .iter()
        .take(SUMMARY_MEDICATION_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "Patient: {}\nDiagnosis: {}\nMedications: {}",
        record.patient_name, record.primary_diagnosis, medications
    )
}

fn greeting_from_record(record: &PatientRecord) -> String {
    format!(
        "Hello {name}! I have your discharge report from {date} on file. Your follow-up plan: \
         {follow_up}. How can I help you today?",
        name = record.patient_name,
        date = record.discharge_date,
        follow_up = record.follow_up,
    )
}

fn welcome_from_record(record: &PatientRecord) -> String {
    format!(
        "Welcome, {name}! I found your discharge report from {date}. {report}\n\nHow can I \
         help you today?",
        name = record.patient_name,
        date = record.discharge_date,
        report = format_report(record),
    )
}

/// True when the transcript contains a successful web search that returned
/// results.
fn web_search_succeeded(outcome: &ExecutorOutcome) -> bool {
    outcome.records.iter().any(|r| {
        r.tool_name == "web_search" && r.success && r.output.starts_with("Web Search Results")
    })
}

/// Appends the fixed disclaimer unless the model already included it.
fn with_disclaimer(answer: String) -> String {
    if answer.contains("educational purposes only") {
        answer
    } else {
        format!("{answer}\n\n{MEDICAL_DISCLAIMER}")
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::message::ChatRequest;
    use crate::agent::{ChatResponse, ToolCall};
    use crate::error::AgentError;
    use crate::retrieval::FALLBACK_SOURCE;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProvider {
        script: Vec<ChatResponse>,
        call_count: AtomicUsize,
        fail: bool,
    }

    impl ScriptedProvider {
        fn new(script: Vec<ChatResponse>) -> Self {
            Self {
                script,
                call_count: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                script: Vec::new(),
                call_count: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            if self.fail {
                return Err(AgentError::ApiRequest {
                    message: "backend unreachable".to_string(),
                    status: Some(503),
                });
            }
            let count = self.call_count.fetch_add(1, Ordering::SeqCst);
            let index = count.min(self.script.len().saturating_sub(1));
            self.script
                .get(index)
                .cloned()
                .ok_or_else(|| AgentError::ApiRequest {
                    message: "script empty".to_string(),
                    status: None,
                })
        }
    }

    fn text_response(content: &str) -> ChatResponse {
        ChatResponse {
            content: content.to_string(),
            tool_calls: Vec::new(),
            finish_reason: Some("stop".to_string()),
        }
    }

    fn tool_response(name: &str, arguments: &str) -> ChatResponse {
        ChatResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "call_0".to_string(),
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
            finish_reason: Some("tool_calls".to_string()),
        }
    }

    fn test_router(provider: ScriptedProvider) -> Router {
        let settings = Settings::builder()
            .api_key("test")
            .max_iterations(3)
            .build()
            .unwrap_or_else(|_| unreachable!());
        Router::new(
            Arc::new(provider),
            Arc::new(PatientDirectory::sample()),
            Arc::new(RetrievalIndex::new(1000, 200, 100)),
            Arc::new(WebSearchClient::new(None)),
            settings,
        )
    }

    #[test]
    fn test_extract_name() {
        assert_eq!(
            extract_name("Hello, my name is John Smith."),
            Some("John Smith".to_string())
        );
        assert_eq!(extract_name("I'm Mary Johnson"), Some("Mary Johnson".to_string()));
        assert_eq!(extract_name("hello there"), None);
        assert_eq!(extract_name(""), None);
        // Single capitalized token is not enough.
        assert_eq!(extract_name("hi I am waiting"), None);
    }

    #[test]
    fn test_with_disclaimer_idempotent() {
        let already = format!("Answer. {MEDICAL_DISCLAIMER}");
        assert_eq!(with_disclaimer(already.clone()), already);
        let appended = with_disclaimer("Answer.".to_string());
        assert!(appended.contains("educational purposes only"));
    }

    #[tokio::test]
    async fn test_greeting_with_name_identifies_patient_without_model() {
        // Direct-lookup fast path: the provider must never be called.
        let router = test_router(ScriptedProvider::failing());
        let mut session = Session::default();

        let output = router
            .route_turn(&mut session, "Hello, my name is John Smith", None)
            .await;

        assert_eq!(output.handler, HandlerKind::Receptionist);
        assert!(output.response.contains("John Smith"));
        assert!(session.patient_record.is_some());
        assert_eq!(session.turns.len(), 1);
    }

    #[tokio::test]
    async fn test_explicit_name_hint_wins() {
        let router = test_router(ScriptedProvider::failing());
        let mut session = Session::default();

        let output = router
            .route_turn(&mut session, "hello there", Some("Priya Patel"))
            .await;

        assert!(output.response.contains("Priya Patel"));
        assert_eq!(
            output.patient_data.map(|r| r.patient_name),
            Some("Priya Patel".to_string())
        );
    }

    #[tokio::test]
    async fn test_cached_record_fast_path() {
        let router = test_router(ScriptedProvider::failing());
        let mut session = Session::default();
        router
            .route_turn(&mut session, "Hi, I am John Smith", None)
            .await;

        // Second administrative turn: answered from the cache, still no
        // provider involvement.
        let output = router.route_turn(&mut session, "thanks, hello again", None).await;
        assert_eq!(output.handler, HandlerKind::Receptionist);
        assert!(output.response.contains("John Smith"));
        assert_eq!(session.turns.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_name_falls_through_to_executor() {
        let provider = ScriptedProvider::new(vec![
            tool_response("patient_lookup", r#"{"patient_name":"Zzyx Qqplx"}"#),
            text_response("I couldn't find that name. Could you spell it as written on \
                           your discharge paperwork?"),
        ]);
        let router = test_router(provider);
        let mut session = Session::default();

        let output = router
            .route_turn(&mut session, "My name is Zzyx Qqplx", None)
            .await;

        assert_eq!(output.handler, HandlerKind::Receptionist);
        assert!(output.response.contains("spell it"));
        assert!(session.patient_record.is_none());
    }

    #[tokio::test]
    async fn test_executor_lookup_hit_caches_record() {
        let provider = ScriptedProvider::new(vec![
            tool_response("patient_lookup", r#"{"patient_name":"Robert Chen"}"#),
            text_response("Welcome Robert, I found your report."),
        ]);
        let router = test_router(provider);
        let mut session = Session::default();

        // Lowercase message defeats the capitalized-pair heuristic, forcing
        // the executor path.
        let output = router.route_turn(&mut session, "it's robert chen here", None).await;

        assert_eq!(output.handler, HandlerKind::Receptionist);
        assert_eq!(
            session.patient_record.as_ref().map(|r| r.patient_name.as_str()),
            Some("Robert Chen")
        );
    }

    #[tokio::test]
    async fn test_clinical_turn_sources_and_disclaimer() {
        let provider = ScriptedProvider::new(vec![text_response(
            "Swelling can be a sign of fluid retention. Watch your salt intake.",
        )]);
        let router = test_router(provider);
        let mut session = Session::default();

        let output = router
            .route_turn(&mut session, "I have swelling in my legs", None)
            .await;

        assert_eq!(output.handler, HandlerKind::Clinical);
        assert!(output.response.contains("educational purposes only"));
        let sources = output.sources.unwrap_or_default();
        assert_eq!(sources, vec![FALLBACK_SOURCE.to_string()]);
    }

    #[tokio::test]
    async fn test_clinical_web_search_marker() {
        // A web_search call with no key configured yields an unavailable
        // observation, so the marker must NOT appear.
        let provider = ScriptedProvider::new(vec![
            tool_response("web_search", r#"{"query":"new dialysis guidance"}"#),
            text_response("Here is what I can tell you about dialysis."),
        ]);
        let router = test_router(provider);
        let mut session = Session::default();

        let output = router
            .route_turn(&mut session, "any new dialysis guidance?", None)
            .await;

        let sources = output.sources.unwrap_or_default();
        assert!(!sources.contains(&WEB_SEARCH_SOURCE.to_string()));
    }

    #[tokio::test]
    async fn test_provider_failure_yields_apologies() {
        let router = test_router(ScriptedProvider::failing());
        let mut session = Session::default();

        // Receptionist path reaches the provider only without a usable name.
        let output = router.route_turn(&mut session, "hello can you help", None).await;
        assert_eq!(output.response, RECEPTIONIST_APOLOGY);

        let output = router
            .route_turn(&mut session, "is my medication dangerous?", None)
            .await;
        assert_eq!(output.response, CLINICAL_APOLOGY);
        assert_eq!(output.handler, HandlerKind::Clinical);
    }

    #[tokio::test]
    async fn test_failing_tool_ends_in_partial_apology_not_error() {
        // The model keeps calling an unknown tool until the iteration cap;
        // the user still receives safe text rather than an error.
        let provider = ScriptedProvider::new(vec![tool_response("broken_tool", "{}")]);
        let router = test_router(provider);
        let mut session = Session::default();

        let output = router
            .route_turn(&mut session, "my blood pressure worries me", None)
            .await;

        assert_eq!(output.handler, HandlerKind::Clinical);
        assert!(!output.response.is_empty());
        assert!(output.response.contains("educational purposes only"));
    }

    #[tokio::test]
    async fn test_reclassification_every_turn() {
        let provider = ScriptedProvider::new(vec![text_response("Answer.")]);
        let router = test_router(provider);
        let mut session = Session::default();

        router.route_turn(&mut session, "Hi, I am John Smith", None).await;
        assert_eq!(session.current_handler, Some(HandlerKind::Receptionist));

        router
            .route_turn(&mut session, "does my medication cause swelling?", None)
            .await;
        assert_eq!(session.current_handler, Some(HandlerKind::Clinical));

        // Administrative follow-up flips straight back.
        router.route_turn(&mut session, "thanks, goodbye", None).await;
        assert_eq!(session.current_handler, Some(HandlerKind::Receptionist));
    }

    #[tokio::test]
    async fn test_patient_summary_limits_medications() {
        let dir = PatientDirectory::sample();
        let record = dir.find("John Smith").unwrap_or_else(|| unreachable!());
        let summary = patient_summary(record);
        assert!(summary.contains("Chronic Kidney Disease"));
        let listed = summary
            .lines()
            .find(|l| l.starts_with("Medications:"))
            .map_or(0, |l| l.matches(';').count() + 1);
        assert!(listed <= SUMMARY_MEDICATION_LIMIT);
    }
}
