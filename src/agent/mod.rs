//! Tool-augmented conversation layer.
//!
//! Provides the LLM-powered execution path shared by both conversation
//! handlers: provider-agnostic message types, role-scoped tool sets, a
//! dispatching executor, and a bounded tool-calling loop. Uses a pluggable
//! provider abstraction backed by OpenAI-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! User turn → Router (per-turn classification)
//!   ├── Receptionist handler → ToolSet::receptionist (patient_lookup)
//!   └── Clinical handler    → ToolSet::clinical (patient_lookup, web_search)
//!       └── run_executor: model → tool calls → observations → model → …
//! ```

pub mod agentic_loop;
pub mod client;
pub mod executor;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod tool;

// Re-export key types
pub use agentic_loop::{ExecutorLimits, ExecutorOutcome, run_executor};
pub use client::create_provider;
pub use executor::ToolExecutor;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role};
pub use prompt::{
    CLINICAL_SYSTEM_PROMPT, MEDICAL_DISCLAIMER, RECEPTIONIST_SYSTEM_PROMPT, build_clinical_message,
    build_rag_context, build_receptionist_message,
};
pub use provider::LlmProvider;
pub use tool::{ToolCall, ToolDefinition, ToolInvocationRecord, ToolResult, ToolSet};
