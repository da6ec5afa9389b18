//! Competition event log
//!
//! Append-only ring of typed domain events, independent of the snapshot.
//! Subscribers (UI, analytics) read it; engine correctness never depends
//! on anyone listening.

use crate::core::types::{CompanyId, Money, Tick};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Oldest entries drop past this
pub const EVENT_LOG_CAP: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    AssetChange,
    BuildingAcquired,
    CompanyEliminated,
    HostileTakeover,
    MarketManipulation,
}

/// One entry in the competition history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionEvent {
    pub id: u64,
    pub tick: Tick,
    pub kind: EventKind,
    pub initiator: CompanyId,
    pub target: Option<CompanyId>,
    pub description: String,
    pub impact: Money,
}

/// Ring-capped event history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: VecDeque<CompetitionEvent>,
    next_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        tick: Tick,
        kind: EventKind,
        initiator: CompanyId,
        target: Option<CompanyId>,
        description: impl Into<String>,
        impact: Money,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.events.push_back(CompetitionEvent {
            id,
            tick,
            kind,
            initiator,
            target,
            description: description.into(),
            impact,
        });
        while self.events.len() > EVENT_LOG_CAP {
            self.events.pop_front();
        }
        id
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompetitionEvent> {
        self.events.iter()
    }

    /// Newest first
    pub fn latest(&self, n: usize) -> impl Iterator<Item = &CompetitionEvent> {
        self.events.iter().rev().take(n)
    }

    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &CompetitionEvent> + '_ {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Events at or after the given tick
    pub fn since(&self, tick: Tick) -> impl Iterator<Item = &CompetitionEvent> {
        self.events.iter().filter(move |e| e.tick >= tick)
    }

    pub fn involving(&self, company: CompanyId) -> impl Iterator<Item = &CompetitionEvent> {
        self.events
            .iter()
            .filter(move |e| e.initiator == company || e.target == Some(company))
    }
}
