//! Structured AI decisions and per-company history
//!
//! The inference boundary produces exactly this schema; anything that
//! cannot be parsed into it is treated as a fallback signal, never
//! partially applied.

use crate::core::types::{BuildingId, CompanyId, Money, Tick};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// What an AI company chose to do this round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    PurchaseBuilding,
    RecruitEmployee,
    StockManipulation,
    Attack,
    Intelligence,
    Wait,
}

impl DecisionAction {
    /// Parse the wire name, e.g. "purchase_building"
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "purchase_building" => Some(DecisionAction::PurchaseBuilding),
            "recruit_employee" => Some(DecisionAction::RecruitEmployee),
            "stock_manipulation" => Some(DecisionAction::StockManipulation),
            "attack" => Some(DecisionAction::Attack),
            "intelligence" => Some(DecisionAction::Intelligence),
            "wait" => Some(DecisionAction::Wait),
            _ => None,
        }
    }
}

/// Typed decision target; which variant applies depends on the action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionTarget {
    Building(BuildingId),
    Stock(String),
    Company(CompanyId),
}

/// One decision, produced per AI company per cooldown round
///
/// Ephemeral: applied once against whatever the world looks like at
/// apply time, then discarded into the diagnostic history ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDecision {
    pub action: DecisionAction,
    pub target: Option<DecisionTarget>,
    pub reasoning: String,
    /// 1 (idle musing) to 10 (urgent)
    pub priority: u8,
    pub estimated_cost: Money,
}

impl AiDecision {
    pub fn wait(reasoning: impl Into<String>) -> Self {
        Self {
            action: DecisionAction::Wait,
            target: None,
            reasoning: reasoning.into(),
            priority: 1,
            estimated_cost: 0,
        }
    }
}

/// Diagnostics-only record of an applied decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub tick: Tick,
    pub decision: AiDecision,
    /// Whether the apply step found the decision still valid
    pub applied: bool,
}

/// Last-N ring of decisions for one company. Never read by control
/// logic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionHistory {
    records: VecDeque<DecisionRecord>,
}

/// History depth per company
pub const HISTORY_CAP: usize = 20;

impl DecisionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: Tick, decision: AiDecision, applied: bool) {
        self.records.push_back(DecisionRecord {
            tick,
            decision,
            applied,
        });
        while self.records.len() > HISTORY_CAP {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&DecisionRecord> {
        self.records.back()
    }
}
