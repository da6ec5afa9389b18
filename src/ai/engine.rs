//! AI decision engine
//!
//! One decision per active AI company per cooldown round. The inference
//! collaborator is asked first (bounded by a timeout); any failure on
//! that path degrades to the deterministic heuristic, which needs no
//! network and always answers.

use crate::ai::decision::{AiDecision, DecisionAction, DecisionHistory, DecisionTarget};
use crate::core::types::{CompanyId, Money, Tick};
use crate::llm::client::LlmClient;
use crate::llm::context::DecisionContext;
use crate::llm::parser::{parse_decision, DECISION_SYSTEM_PROMPT};
use ahash::AHashMap;
use std::sync::Arc;
use std::time::Duration;

/// Above this capital the heuristic buys property
pub const FALLBACK_PURCHASE_THRESHOLD: Money = 200_000;

/// Above this capital (and below the purchase bar) it hires
pub const FALLBACK_RECRUIT_THRESHOLD: Money = 50_000;

/// Deterministic heuristic used whenever inference is unavailable
///
/// Pure: identical context fields produce the identical decision, which
/// is what keeps AI companies functional offline and keeps this
/// testable without any network.
pub fn fallback_decision(ctx: &DecisionContext) -> AiDecision {
    if ctx.capital > FALLBACK_PURCHASE_THRESHOLD {
        if let Some(building) = ctx.available_buildings.first() {
            return AiDecision {
                action: DecisionAction::PurchaseBuilding,
                target: Some(DecisionTarget::Building(building.id)),
                reasoning: format!("expanding holdings with {}", building.name),
                priority: 6,
                estimated_cost: building.cost,
            };
        }
    }
    if ctx.capital > FALLBACK_RECRUIT_THRESHOLD {
        return AiDecision {
            action: DecisionAction::RecruitEmployee,
            target: None,
            reasoning: "growing headcount while capital allows".into(),
            priority: 4,
            estimated_cost: crate::engine::resolver::RECRUIT_COST,
        };
    }
    AiDecision::wait("conserving capital")
}

/// Cheap-to-clone handle used by the clock's fire-and-forget dispatch
#[derive(Clone)]
pub struct DecisionRequester {
    client: Option<Arc<LlmClient>>,
    timeout_ms: u64,
}

impl DecisionRequester {
    pub fn new(client: Option<Arc<LlmClient>>, timeout_ms: u64) -> Self {
        Self { client, timeout_ms }
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Produce one decision for the context, never failing
    ///
    /// Timeout, transport errors, and unparseable replies all land on
    /// the heuristic.
    pub async fn decide(&self, ctx: &DecisionContext) -> AiDecision {
        if let Some(client) = &self.client {
            let summary = ctx.summary();
            let request = client.complete(DECISION_SYSTEM_PROMPT, &summary);
            match tokio::time::timeout(Duration::from_millis(self.timeout_ms), request).await {
                Ok(Ok(reply)) => {
                    if let Some(decision) = parse_decision(&reply, ctx) {
                        return decision;
                    }
                    tracing::debug!(company = %ctx.company_name, "unparseable reply, using fallback");
                }
                Ok(Err(e)) => {
                    tracing::warn!(company = %ctx.company_name, error = %e, "inference failed, using fallback");
                }
                Err(_) => {
                    tracing::warn!(company = %ctx.company_name, "inference timed out, using fallback");
                }
            }
        }
        fallback_decision(ctx)
    }
}

/// Engine facade: the requester plus per-company diagnostic history
pub struct AiDecisionEngine {
    requester: DecisionRequester,
    histories: AHashMap<CompanyId, DecisionHistory>,
}

impl AiDecisionEngine {
    pub fn new(client: Option<Arc<LlmClient>>, timeout_ms: u64) -> Self {
        Self {
            requester: DecisionRequester::new(client, timeout_ms),
            histories: AHashMap::new(),
        }
    }

    pub fn requester(&self) -> DecisionRequester {
        self.requester.clone()
    }

    pub fn has_client(&self) -> bool {
        self.requester.has_client()
    }

    /// Record an applied (or dropped) decision for diagnostics
    pub fn record(&mut self, company: CompanyId, tick: Tick, decision: AiDecision, applied: bool) {
        self.histories
            .entry(company)
            .or_default()
            .push(tick, decision, applied);
    }

    pub fn history(&self, company: CompanyId) -> Option<&DecisionHistory> {
        self.histories.get(&company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BuildingId;
    use crate::llm::context::BuildingInfo;

    fn ctx_with_capital(capital: Money) -> DecisionContext {
        let mut ctx = DecisionContext::empty(CompanyId::new());
        ctx.capital = capital;
        ctx.available_buildings.push(BuildingInfo {
            id: BuildingId::new(),
            name: "Harbor Office Tower".into(),
            cost: 100_000,
            income: 80,
            level: 1,
        });
        ctx
    }

    #[test]
    fn test_fallback_rich_company_buys() {
        let ctx = ctx_with_capital(300_000);
        let decision = fallback_decision(&ctx);
        assert_eq!(decision.action, DecisionAction::PurchaseBuilding);
        assert!(matches!(
            decision.target,
            Some(DecisionTarget::Building(_))
        ));
    }

    #[test]
    fn test_fallback_middling_company_recruits() {
        let ctx = ctx_with_capital(120_000);
        let decision = fallback_decision(&ctx);
        assert_eq!(decision.action, DecisionAction::RecruitEmployee);
    }

    #[test]
    fn test_fallback_poor_company_waits() {
        let ctx = ctx_with_capital(20_000);
        let decision = fallback_decision(&ctx);
        assert_eq!(decision.action, DecisionAction::Wait);
    }

    #[test]
    fn test_fallback_rich_but_nothing_for_sale_recruits() {
        let mut ctx = ctx_with_capital(500_000);
        ctx.available_buildings.clear();
        let decision = fallback_decision(&ctx);
        assert_eq!(decision.action, DecisionAction::RecruitEmployee);
    }

    #[test]
    fn test_fallback_is_pure() {
        let ctx = ctx_with_capital(300_000);
        let a = fallback_decision(&ctx);
        let b = fallback_decision(&ctx);
        let c = fallback_decision(&ctx);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[tokio::test]
    async fn test_requester_without_client_uses_fallback() {
        let requester = DecisionRequester::new(None, 1_000);
        let ctx = ctx_with_capital(300_000);
        let decision = requester.decide(&ctx).await;
        assert_eq!(decision, fallback_decision(&ctx));
    }

    #[test]
    fn test_engine_records_history() {
        let mut engine = AiDecisionEngine::new(None, 1_000);
        let company = CompanyId::new();
        engine.record(company, 5, AiDecision::wait("idle"), true);
        engine.record(company, 6, AiDecision::wait("idle"), false);

        let history = engine.history(company).unwrap();
        assert_eq!(history.len(), 2);
        assert!(!history.last().unwrap().applied);
    }
}
