//! Post-discharge patient assistant.
//!
//! Routes each conversational turn between a receptionist handler
//! (identification, administrative questions) and a clinical handler
//! (medical questions answered with retrieval-augmented generation), backed
//! by a bounded tool-calling executor over a patient directory and web
//! search.
//!
//! # Architecture
//!
//! ```text
//! POST /api/chat → SessionStore (per-session lock)
//!   └── Router: is_clinical(message)?
//!       ├── receptionist: cached record → fast path
//!       │                 name hint → direct lookup
//!       │                 else → executor + patient_lookup tool
//!       └── clinical: RetrievalIndex.search(k=3) → context block
//!                     → executor + web_search tool → disclaimer + sources
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod patients;
pub mod retrieval;
pub mod router;
pub mod server;
pub mod session;
pub mod websearch;

pub use config::Settings;
pub use error::{AgentError, Error};
pub use patients::{PatientDirectory, PatientRecord};
pub use retrieval::RetrievalIndex;
pub use router::{Router, TurnOutput};
pub use session::{HandlerKind, Session, SessionStore};
pub use websearch::{WebSearchClient, WebSearchOutcome};
