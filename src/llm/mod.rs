//! Inference collaborator boundary
//!
//! The decision engine talks to an external LLM through this module and
//! nothing else. Transport failures never escape: callers fall back to
//! the deterministic heuristic in `crate::ai`.

pub mod client;
pub mod context;
pub mod parser;

pub use client::LlmClient;
pub use context::DecisionContext;
pub use parser::{parse_decision, DECISION_SYSTEM_PROMPT};
