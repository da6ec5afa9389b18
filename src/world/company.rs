//! Competing companies: capital, staff, and owned buildings

use crate::core::types::{BuildingId, CompanyId, Money};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Organizational structure of a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgType {
    /// Decisions flow from the top; predictable, slower to react
    Centralized,
    /// Autonomous divisions; reacts faster, harder to coordinate
    Decentralized,
}

/// Lifecycle status of a company
///
/// The transition Active -> Bankrupt is one-way. A bankrupt company holds
/// no buildings and zero capital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyStatus {
    Active,
    Bankrupt,
}

/// A competing economic actor (player or AI)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub capital: Money,
    pub employees: u32,
    pub buildings: AHashSet<BuildingId>,
    pub org: OrgType,
    pub is_player: bool,
    pub status: CompanyStatus,
}

impl Company {
    pub fn new(name: impl Into<String>, capital: Money, org: OrgType, is_player: bool) -> Self {
        Self {
            id: CompanyId::new(),
            name: name.into(),
            capital,
            employees: 1,
            buildings: AHashSet::new(),
            org,
            is_player,
            status: CompanyStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CompanyStatus::Active
    }

    /// Mark the company bankrupt, zeroing capital and releasing the
    /// building set. Returns the buildings that must have their owner
    /// cleared by the caller. Idempotent.
    pub fn go_bankrupt(&mut self) -> Vec<BuildingId> {
        if self.status == CompanyStatus::Bankrupt {
            return Vec::new();
        }
        self.status = CompanyStatus::Bankrupt;
        self.capital = 0;
        self.buildings.drain().collect()
    }
}
