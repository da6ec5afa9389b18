//! AI-controlled rival companies

pub mod decision;
pub mod engine;

pub use decision::{AiDecision, DecisionAction, DecisionHistory, DecisionTarget};
pub use engine::{fallback_decision, AiDecisionEngine, DecisionRequester};
