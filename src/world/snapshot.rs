//! The world snapshot: single aggregate the simulation clock owns
//!
//! The clock is the only writer. Every other component receives the
//! snapshot by reference and returns derived values; the competition
//! engine compares "previous" vs "current" snapshots to detect deltas,
//! so cloning a snapshot must produce an independent copy.

use crate::core::config::EngineConfig;
use crate::core::types::{AgentId, BuildingId, CompanyId, Tick, Vec2};
use crate::engine::competition::CompetitionAnalytics;
use crate::market::StockMarket;
use crate::world::agent::{Agent, SkillSet};
use crate::world::building::{Building, BuildingKind};
use crate::world::company::{Company, CompanyStatus, OrgType};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Roster entry consumed at world generation time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySeed {
    pub name: String,
    pub is_player: bool,
    pub org: OrgType,
}

/// Overall game state. Transitions Playing -> Victory | Defeat exactly
/// once; after that the clock stops mutating the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    /// The player's company won
    Victory { winner: CompanyId, reason: String },
    /// The player lost; winner is the surviving AI company, if any
    Defeat {
        winner: Option<CompanyId>,
        reason: String,
    },
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::Playing)
    }

    pub fn winner(&self) -> Option<CompanyId> {
        match self {
            GameStatus::Playing => None,
            GameStatus::Victory { winner, .. } => Some(*winner),
            GameStatus::Defeat { winner, .. } => *winner,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            GameStatus::Playing => None,
            GameStatus::Victory { reason, .. } | GameStatus::Defeat { reason, .. } => {
                Some(reason.as_str())
            }
        }
    }
}

/// Complete state of companies, buildings, agents, and market at a point
/// in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub status: GameStatus,
    pub companies: Vec<Company>,
    pub buildings: Vec<Building>,
    pub agents: Vec<Agent>,
    pub market: StockMarket,
    pub analytics: CompetitionAnalytics,
}

/// District names used for generated building labels
const DISTRICTS: [&str; 6] = [
    "Harbor", "Midtown", "Old Town", "Riverside", "Summit", "Station",
];

impl WorldSnapshot {
    /// Generate the initial world from a roster and config
    pub fn generate(config: &EngineConfig, seeds: &[CompanySeed], rng: &mut ChaCha8Rng) -> Self {
        let companies: Vec<Company> = seeds
            .iter()
            .map(|s| Company::new(s.name.clone(), config.starting_capital, s.org, s.is_player))
            .collect();

        // Two contestable buildings per district, kinds cycling
        let mut buildings = Vec::new();
        for (i, kind) in BuildingKind::all().iter().cycle().take(12).enumerate() {
            let district = DISTRICTS[i % DISTRICTS.len()];
            let position = Vec2::new(
                rng.gen_range(0.0..config.world_size),
                rng.gen_range(0.0..config.world_size),
            );
            let level = rng.gen_range(1..=3u8);
            buildings.push(Building::new(
                *kind,
                position,
                format!("{} {}", district, kind.display_name()),
                level,
            ));
        }

        // Each company's agents start clustered at a home position
        let mut agents = Vec::new();
        for company in &companies {
            let home = Vec2::new(
                rng.gen_range(0.0..config.world_size),
                rng.gen_range(0.0..config.world_size),
            );
            for _ in 0..config.agents_per_company {
                let skills = SkillSet::new(
                    rng.gen_range(30..=90),
                    rng.gen_range(30..=90),
                    rng.gen_range(30..=90),
                );
                let offset = Vec2::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
                agents.push(Agent::new(company.id, home + offset, skills));
            }
        }

        Self {
            tick: 0,
            status: GameStatus::Playing,
            companies,
            buildings,
            agents,
            market: StockMarket::with_default_listings(rng),
            analytics: CompetitionAnalytics::default(),
        }
    }

    // --- lookups ---

    pub fn company(&self, id: CompanyId) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn company_mut(&mut self, id: CompanyId) -> Option<&mut Company> {
        self.companies.iter_mut().find(|c| c.id == id)
    }

    pub fn company_by_name(&self, name: &str) -> Option<&Company> {
        let lower = name.to_lowercase();
        self.companies
            .iter()
            .find(|c| c.name.to_lowercase().contains(&lower))
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| b.id == id)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn player(&self) -> Option<&Company> {
        self.companies.iter().find(|c| c.is_player)
    }

    pub fn active_companies(&self) -> impl Iterator<Item = &Company> {
        self.companies.iter().filter(|c| c.is_active())
    }

    /// Buildings nobody owns yet, cheapest first
    pub fn available_buildings(&self) -> Vec<&Building> {
        let mut open: Vec<&Building> = self.buildings.iter().filter(|b| !b.is_owned()).collect();
        open.sort_by_key(|b| b.purchase_cost());
        open
    }

    /// First idle agent belonging to a company
    pub fn idle_agent_of(&self, company: CompanyId) -> Option<AgentId> {
        self.agents
            .iter()
            .find(|a| a.company == company && a.is_idle())
            .map(|a| a.id)
    }

    pub fn total_active_capital(&self) -> i64 {
        self.active_companies().map(|c| c.capital).sum()
    }

    /// Companies still active, richest first
    pub fn standings(&self) -> Vec<&Company> {
        let mut active: Vec<&Company> = self.active_companies().collect();
        active.sort_by_key(|c| std::cmp::Reverse(c.capital));
        active
    }
}

/// Validate snapshot invariants; used by tests and debug assertions.
///
/// Checks: bankrupt companies hold nothing, building owners are active,
/// moving agents have targets.
pub fn check_invariants(world: &WorldSnapshot) -> Result<(), String> {
    for company in &world.companies {
        if company.status == CompanyStatus::Bankrupt
            && (company.capital != 0 || !company.buildings.is_empty())
        {
            return Err(format!(
                "bankrupt company {} still holds assets",
                company.name
            ));
        }
    }

    for building in &world.buildings {
        if let Some(owner) = building.owner {
            match world.company(owner) {
                Some(c) if c.is_active() => {
                    if !c.buildings.contains(&building.id) {
                        return Err(format!(
                            "building {} owner set but missing from company set",
                            building.name
                        ));
                    }
                }
                _ => {
                    return Err(format!(
                        "building {} owned by a non-active company",
                        building.name
                    ))
                }
            }
        }
    }

    for agent in &world.agents {
        if agent.status == crate::world::agent::AgentStatus::Moving && agent.target.is_none() {
            return Err("moving agent without a target".into());
        }
    }

    Ok(())
}
