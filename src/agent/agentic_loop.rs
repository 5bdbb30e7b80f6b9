//! Bounded tool-calling loop.
//!
//! Drives the LLM ↔ tool execution round-trip: sends a request to the
//! model, executes any tool calls in the response, appends results, and
//! repeats until the model produces a final text response or a resource
//! limit (iterations or wall time) is reached. Exhausting a limit is not an
//! error; the loop reports a partial outcome and lets the caller decide how
//! to present it.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::executor::ToolExecutor;
use super::message::{ChatRequest, assistant_tool_calls_message, tool_message, user_message};
use super::provider::LlmProvider;
use super::tool::ToolInvocationRecord;
use crate::error::AgentError;

/// Answer used when the loop exhausts its budget with nothing usable.
const PARTIAL_FALLBACK: &str =
    "I was unable to finish answering within the time available. Please try asking again, \
     or contact your healthcare provider if this is urgent.";

/// Observation injected when the model returns neither text nor tool calls.
const EMPTY_RESPONSE_NUDGE: &str =
    "Your previous response was empty. Please provide a final answer to the user's question, \
     or call a tool if you need more information.";

/// Resource limits for one executor run.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorLimits {
    /// Maximum model round-trips.
    pub max_iterations: usize,
    /// Soft wall-time budget, checked between round-trips.
    pub max_wall_time: Duration,
}

/// Outcome of an executor run.
#[derive(Debug, Clone)]
pub struct ExecutorOutcome {
    /// Final (or best partial) answer text.
    pub answer: String,
    /// `false` when a resource limit cut the run short.
    pub complete: bool,
    /// Audit trail of every tool invocation, in execution order.
    pub records: Vec<ToolInvocationRecord>,
}

/// Runs the bounded loop: model → tool calls → tool results → model → …
///
/// Continues until the model responds with non-empty text and no tool
/// calls, or a resource limit is hit. An empty response without tool calls
/// consumes an iteration and gets a corrective nudge rather than
/// terminating the run.
///
/// # Errors
///
/// Propagates provider errors only. Tool failures become observations and
/// resource exhaustion becomes a partial outcome.
pub async fn run_executor(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    executor: &ToolExecutor,
    limits: ExecutorLimits,
) -> Result<ExecutorOutcome, AgentError> {
    let started = Instant::now();
    let mut records = Vec::new();
    let mut last_content = String::new();

    for iteration in 0..limits.max_iterations {
        if started.elapsed() >= limits.max_wall_time {
            warn!(iteration, "executor wall-time budget exhausted");
            return Ok(partial_outcome(last_content, records));
        }

        let response = provider.chat(request).await?;

        if response.tool_calls.is_empty() {
            if response.content.trim().is_empty() {
                // Model stalled: neither an answer nor a tool call.
                debug!(iteration, "empty model response, nudging");
                request.messages.push(user_message(EMPTY_RESPONSE_NUDGE));
                continue;
            }
            debug!(iteration, "executor completed with final text response");
            return Ok(ExecutorOutcome {
                answer: response.content,
                complete: true,
                records,
            });
        }

        if !response.content.trim().is_empty() {
            last_content = response.content.clone();
        }

        debug!(
            iteration,
            tool_count = response.tool_calls.len(),
            "executing tool calls"
        );

        request.messages.push(assistant_tool_calls_message(
            &response.content,
            response.tool_calls.clone(),
        ));

        for call in &response.tool_calls {
            let result = executor.execute(call).await;
            debug!(
                tool = call.name,
                call_id = call.id,
                is_error = result.is_error,
                "tool execution complete"
            );
            records.push(ToolInvocationRecord {
                tool_name: call.name.clone(),
                input: call.arguments.clone(),
                output: result.content.clone(),
                success: !result.is_error,
            });
            request
                .messages
                .push(tool_message(&result.tool_call_id, &result.content));
        }
    }

    warn!(
        max_iterations = limits.max_iterations,
        "executor iteration budget exhausted"
    );
    Ok(partial_outcome(last_content, records))
}

fn partial_outcome(last_content: String, records: Vec<ToolInvocationRecord>) -> ExecutorOutcome {
    let answer = if last_content.trim().is_empty() {
        PARTIAL_FALLBACK.to_string()
    } else {
        last_content
    };
    ExecutorOutcome {
        answer,
        complete: false,
        records,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::message::{ChatRequest, ChatResponse, system_message, user_message};
    use crate::agent::tool::ToolCall;
    use crate::error::AgentError;
    use crate::patients::PatientDirectory;
    use crate::websearch::WebSearchClient;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    /// Scripted provider: pops the next response on each call, repeating the
    /// last one when the script runs out.
    struct ScriptedProvider {
        script: Vec<ChatResponse>,
        call_count: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(script: Vec<ChatResponse>) -> Self {
            Self {
                script,
                call_count: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
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

    fn tool_response(id: &str, name: &str, arguments: &str) -> ChatResponse {
        ChatResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
            finish_reason: Some("tool_calls".to_string()),
        }
    }

    fn test_executor() -> ToolExecutor {
        ToolExecutor::new(
            Arc::new(PatientDirectory::sample()),
            Arc::new(WebSearchClient::new(None)),
        )
    }

    fn test_request() -> ChatRequest {
        ChatRequest {
            model: "test".to_string(),
            messages: vec![
                system_message("You are a medical assistant."),
                user_message("What are my medications?"),
            ],
            temperature: Some(0.0),
            max_tokens: Some(1024),
            tools: Vec::new(),
        }
    }

    fn limits(max_iterations: usize) -> ExecutorLimits {
        ExecutorLimits {
            max_iterations,
            max_wall_time: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn test_single_tool_round() {
        let provider = ScriptedProvider::new(vec![
            tool_response("call_0", "patient_lookup", r#"{"patient_name":"John Smith"}"#),
            text_response("You were prescribed Lisinopril and Furosemide."),
        ]);
        let executor = test_executor();
        let mut request = test_request();

        let outcome = run_executor(&provider, &mut request, &executor, limits(10))
            .await
            .unwrap_or_else(|e| panic!("run_executor failed: {e}"));

        assert!(outcome.complete);
        assert_eq!(outcome.answer, "You were prescribed Lisinopril and Furosemide.");
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].tool_name, "patient_lookup");
        assert!(outcome.records[0].success);
        assert!(outcome.records[0].output.contains("John Smith"));
        // system + user + assistant(tool_calls) + tool(result) = 4 messages
        assert_eq!(request.messages.len(), 4);
    }

    #[tokio::test]
    async fn test_no_tools_immediate_answer() {
        let provider = ScriptedProvider::new(vec![text_response("Hello! How can I help?")]);
        let executor = test_executor();
        let mut request = test_request();

        let outcome = run_executor(&provider, &mut request, &executor, limits(10))
            .await
            .unwrap_or_else(|e| panic!("run_executor failed: {e}"));

        assert!(outcome.complete);
        assert!(outcome.records.is_empty());
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_iteration_exhaustion_is_partial_not_error() {
        // Always requests tools; never produces a final answer.
        let provider = ScriptedProvider::new(vec![tool_response(
            "call_x",
            "patient_lookup",
            r#"{"patient_name":"John Smith"}"#,
        )]);
        let executor = test_executor();
        let mut request = test_request();

        let outcome = run_executor(&provider, &mut request, &executor, limits(3))
            .await
            .unwrap_or_else(|e| panic!("run_executor failed: {e}"));

        assert!(!outcome.complete);
        assert_eq!(outcome.answer, PARTIAL_FALLBACK);
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_partial_keeps_last_nonempty_content() {
        let mut with_text = tool_response(
            "call_0",
            "patient_lookup",
            r#"{"patient_name":"John Smith"}"#,
        );
        with_text.content = "Let me check the discharge report.".to_string();
        let provider = ScriptedProvider::new(vec![with_text]);
        let executor = test_executor();
        let mut request = test_request();

        let outcome = run_executor(&provider, &mut request, &executor, limits(2))
            .await
            .unwrap_or_else(|e| panic!("run_executor failed: {e}"));

        assert!(!outcome.complete);
        assert_eq!(outcome.answer, "Let me check the discharge report.");
    }

    #[tokio::test]
    async fn test_wall_time_exhaustion_is_partial() {
        let provider = ScriptedProvider::new(vec![text_response("never reached")]);
        let executor = test_executor();
        let mut request = test_request();

        let outcome = run_executor(
            &provider,
            &mut request,
            &executor,
            ExecutorLimits {
                max_iterations: 10,
                max_wall_time: Duration::ZERO,
            },
        )
        .await
        .unwrap_or_else(|e| panic!("run_executor failed: {e}"));

        assert!(!outcome.complete);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_response_gets_nudge_then_answer() {
        let provider = ScriptedProvider::new(vec![
            text_response("   "),
            text_response("Here is your answer."),
        ]);
        let executor = test_executor();
        let mut request = test_request();

        let outcome = run_executor(&provider, &mut request, &executor, limits(10))
            .await
            .unwrap_or_else(|e| panic!("run_executor failed: {e}"));

        assert!(outcome.complete);
        assert_eq!(outcome.answer, "Here is your answer.");
        // Nudge message was appended before the second round-trip.
        assert!(request.messages.iter().any(|m| m.content.contains("was empty")));
    }

    #[tokio::test]
    async fn test_failing_tool_recorded_and_loop_continues() {
        let provider = ScriptedProvider::new(vec![
            tool_response("call_0", "no_such_tool", "{}"),
            text_response("I could not retrieve that information."),
        ]);
        let executor = test_executor();
        let mut request = test_request();

        let outcome = run_executor(&provider, &mut request, &executor, limits(10))
            .await
            .unwrap_or_else(|e| panic!("run_executor failed: {e}"));

        assert!(outcome.complete);
        assert_eq!(outcome.records.len(), 1);
        assert!(!outcome.records[0].success);
        assert!(outcome.records[0].output.contains("unknown tool"));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        struct FailingProvider;

        #[async_trait]
        impl LlmProvider for FailingProvider {
            fn name(&self) -> &'static str {
                "failing"
            }

            async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AgentError> {
                Err(AgentError::ApiRequest {
                    message: "backend down".to_string(),
                    status: Some(503),
                })
            }
        }

        let executor = test_executor();
        let mut request = test_request();
        let result = run_executor(&FailingProvider, &mut request, &executor, limits(10)).await;
        assert!(result.is_err());
    }
}
