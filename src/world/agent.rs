//! Field agents that carry out company actions on the map

use crate::core::types::{AgentId, BuildingId, CompanyId, Vec2};
use serde::{Deserialize, Serialize};

/// What an agent is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentStatus {
    Idle,
    Moving,
    Working,
    Attacking,
}

/// The action an agent will resolve once it reaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentActionKind {
    Purchase,
    Recruit,
    Attack,
    Intelligence,
    Move,
}

/// A queued action plus its optional building target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub kind: AgentActionKind,
    pub building: Option<BuildingId>,
}

/// Agent skills, each bounded 0..=100
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SkillSet {
    pub negotiation: u8,
    pub espionage: u8,
    pub management: u8,
}

impl SkillSet {
    pub fn new(negotiation: u8, espionage: u8, management: u8) -> Self {
        Self {
            negotiation: negotiation.min(100),
            espionage: espionage.min(100),
            management: management.min(100),
        }
    }

    /// Power used when seizing a building by force
    pub fn attack_power(&self) -> i32 {
        self.management as i32 + self.negotiation as i32
    }

    /// Power used when stealing intelligence, directly a success percentage
    pub fn spy_power(&self) -> i32 {
        self.espionage as i32 + self.negotiation as i32
    }
}

/// A company's agent on the city map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub position: Vec2,
    pub status: AgentStatus,
    /// Movement destination. Invariant: `Some` whenever status is Moving.
    pub target: Option<Vec2>,
    pub company: CompanyId,
    pub skills: SkillSet,
    /// Cleared exactly once, on arrival
    pub action: Option<PendingAction>,
}

impl Agent {
    pub fn new(company: CompanyId, position: Vec2, skills: SkillSet) -> Self {
        Self {
            id: AgentId::new(),
            position,
            status: AgentStatus::Idle,
            target: None,
            company,
            skills,
            action: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == AgentStatus::Idle && self.action.is_none()
    }

    /// Send the agent toward a destination carrying an action to resolve
    /// on arrival
    pub fn dispatch(&mut self, destination: Vec2, action: Option<PendingAction>) {
        self.target = Some(destination);
        self.action = action;
        self.status = match action.map(|a| a.kind) {
            Some(AgentActionKind::Attack) => AgentStatus::Attacking,
            _ => AgentStatus::Moving,
        };
    }

    /// Reset to idle, dropping target and pending action
    pub fn settle(&mut self) {
        self.status = AgentStatus::Idle;
        self.target = None;
        self.action = None;
    }
}
