//! Parse inference replies into structured decisions
//!
//! The inference collaborator answers in a fixed line-prefixed grammar:
//!
//! ```text
//! action: purchase_building
//! target: Harbor Office Tower
//! reasoning: cheapest income stream on the board
//! priority: 7
//! ```
//!
//! Anything that does not yield a known action is a fallback signal
//! (None); there is no partial parsing. Target names are resolved
//! against the decision context the reply was prompted with — an
//! unresolved target keeps the action with no target, and the apply
//! step normalizes that to a no-op later.

use crate::ai::decision::{AiDecision, DecisionAction, DecisionTarget};
use crate::llm::context::DecisionContext;

/// System prompt for decision requests
pub const DECISION_SYSTEM_PROMPT: &str = r#"You are the ruthless CEO of a company in a business-war simulation.
Each round you take exactly one action.

AVAILABLE ACTIONS:
- purchase_building: buy a listed for-sale building (target: building name)
- recruit_employee: hire one employee (no target)
- stock_manipulation: distort an instrument (target: stock symbol)
- attack: seize an enemy-held building (target: building name)
- intelligence: steal capital from a rival (target: company name)
- wait: do nothing this round

OUTPUT FORMAT (exactly these lines, no other text):
action: <one of the actions above>
target: <name/symbol or none>
reasoning: <one short sentence>
priority: <1-10>
"#;

/// Parse one reply against the context it was prompted with
///
/// # Returns
/// The structured decision, or None when the reply does not follow the
/// grammar (the caller then falls back to the local heuristic).
pub fn parse_decision(reply: &str, ctx: &DecisionContext) -> Option<AiDecision> {
    let mut action = None;
    let mut target_raw = None;
    let mut reasoning = String::new();
    let mut priority = 5u8;

    for line in reply.lines() {
        let line = line.trim();
        if let Some(rest) = prefixed(line, "action:") {
            action = DecisionAction::parse(rest);
        } else if let Some(rest) = prefixed(line, "target:") {
            if !rest.eq_ignore_ascii_case("none") && !rest.is_empty() {
                target_raw = Some(rest.to_string());
            }
        } else if let Some(rest) = prefixed(line, "reasoning:") {
            reasoning = rest.to_string();
        } else if let Some(rest) = prefixed(line, "priority:") {
            if let Ok(p) = rest.parse::<i64>() {
                priority = p.clamp(1, 10) as u8;
            }
        }
    }

    let action = action?;
    let (target, estimated_cost) = resolve_target(action, target_raw.as_deref(), ctx);

    Some(AiDecision {
        action,
        target,
        reasoning,
        priority,
        estimated_cost,
    })
}

/// Case-insensitive prefix match returning the trimmed remainder
fn prefixed<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    if line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim())
    } else {
        None
    }
}

/// Resolve the raw target name against the context lists
///
/// Unknown names resolve to no target; validity is re-checked at apply
/// time anyway, this only pins ids for names that still mean something.
fn resolve_target(
    action: DecisionAction,
    raw: Option<&str>,
    ctx: &DecisionContext,
) -> (Option<DecisionTarget>, i64) {
    let Some(raw) = raw else {
        return (None, 0);
    };

    match action {
        DecisionAction::PurchaseBuilding => match ctx.find_building(raw) {
            Some(b) => (Some(DecisionTarget::Building(b.id)), b.cost),
            None => (None, 0),
        },
        DecisionAction::Attack => match ctx.find_contested(raw) {
            Some(b) => (
                Some(DecisionTarget::Building(b.id)),
                crate::engine::resolver::ATTACK_COST,
            ),
            None => (None, 0),
        },
        DecisionAction::Intelligence => match ctx.find_enemy(raw) {
            Some(e) => (
                Some(DecisionTarget::Company(e.id)),
                crate::engine::resolver::INTEL_COST,
            ),
            None => (None, 0),
        },
        DecisionAction::StockManipulation => match ctx.find_stock(raw) {
            Some(s) => (Some(DecisionTarget::Stock(s.symbol.clone())), 0),
            None => (None, 0),
        },
        DecisionAction::RecruitEmployee => {
            (None, crate::engine::resolver::RECRUIT_COST)
        }
        DecisionAction::Wait => (None, 0),
    }
}
