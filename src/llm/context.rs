//! Decision context for AI companies
//!
//! Builds a bounded summary of the world from one company's point of
//! view: its own balance sheet, competitor standings, purchasable
//! buildings, contested buildings, and instrument prices. The summary is
//! what goes into the inference prompt; the id-bearing lists are what
//! the parser resolves reply targets against.

use crate::core::types::{BuildingId, CompanyId, Money, Tick};
use crate::world::snapshot::WorldSnapshot;

/// A rival company as seen by the deciding one
#[derive(Debug, Clone)]
pub struct EnemyInfo {
    pub id: CompanyId,
    pub name: String,
    pub capital: Money,
    pub building_count: usize,
}

/// A building the deciding company could buy
#[derive(Debug, Clone)]
pub struct BuildingInfo {
    pub id: BuildingId,
    pub name: String,
    pub cost: Money,
    pub income: Money,
    pub level: u8,
}

/// An enemy-held building the deciding company could contest
#[derive(Debug, Clone)]
pub struct ContestedInfo {
    pub id: BuildingId,
    pub name: String,
    pub owner: CompanyId,
    pub owner_name: String,
}

/// A listed instrument as shown to the AI
#[derive(Debug, Clone)]
pub struct StockInfo {
    pub symbol: String,
    pub price: f64,
    pub change_percent: f64,
}

/// Everything one AI company knows when deciding
#[derive(Debug, Clone)]
pub struct DecisionContext {
    pub company: CompanyId,
    pub company_name: String,
    pub capital: Money,
    pub employees: u32,
    pub building_count: usize,
    pub tick: Tick,
    pub enemies: Vec<EnemyInfo>,
    pub available_buildings: Vec<BuildingInfo>,
    pub contested_buildings: Vec<ContestedInfo>,
    pub stocks: Vec<StockInfo>,
}

/// Bound on list sizes fed into the prompt
const MAX_LISTED: usize = 8;

impl DecisionContext {
    /// Build a context from the current snapshot for one company
    ///
    /// Returns None if the company is missing or no longer active.
    pub fn from_snapshot(world: &WorldSnapshot, company: CompanyId) -> Option<Self> {
        let me = world.company(company).filter(|c| c.is_active())?;

        let enemies = world
            .active_companies()
            .filter(|c| c.id != company)
            .map(|c| EnemyInfo {
                id: c.id,
                name: c.name.clone(),
                capital: c.capital,
                building_count: c.buildings.len(),
            })
            .collect();

        let available_buildings = world
            .available_buildings()
            .into_iter()
            .take(MAX_LISTED)
            .map(|b| BuildingInfo {
                id: b.id,
                name: b.name.clone(),
                cost: b.purchase_cost(),
                income: b.income,
                level: b.level,
            })
            .collect();

        let contested_buildings = world
            .buildings
            .iter()
            .filter_map(|b| {
                let owner = b.owner?;
                if owner == company {
                    return None;
                }
                let owner_name = world.company(owner)?.name.clone();
                Some(ContestedInfo {
                    id: b.id,
                    name: b.name.clone(),
                    owner,
                    owner_name,
                })
            })
            .take(MAX_LISTED)
            .collect();

        let stocks = world
            .market
            .stocks
            .iter()
            .map(|s| StockInfo {
                symbol: s.symbol.clone(),
                price: s.price,
                change_percent: s.change_percent(),
            })
            .collect();

        Some(Self {
            company,
            company_name: me.name.clone(),
            capital: me.capital,
            employees: me.employees,
            building_count: me.buildings.len(),
            tick: world.tick,
            enemies,
            available_buildings,
            contested_buildings,
            stocks,
        })
    }

    /// Generate the prompt body handed to the inference collaborator
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(&format!("You run: {}\n", self.company_name));
        s.push_str(&format!(
            "Capital: {} | Employees: {} | Buildings: {} | Turn: {}\n",
            self.capital, self.employees, self.building_count, self.tick
        ));

        if !self.enemies.is_empty() {
            s.push_str("\nCompetitors:\n");
            for enemy in &self.enemies {
                s.push_str(&format!(
                    "- {} (capital {}, {} buildings)\n",
                    enemy.name, enemy.capital, enemy.building_count
                ));
            }
        }

        if !self.available_buildings.is_empty() {
            s.push_str("\nBuildings for sale:\n");
            for b in &self.available_buildings {
                s.push_str(&format!(
                    "- {} (level {}, cost {}, income {}/tick)\n",
                    b.name, b.level, b.cost, b.income
                ));
            }
        }

        if !self.contested_buildings.is_empty() {
            s.push_str("\nEnemy holdings:\n");
            for b in &self.contested_buildings {
                s.push_str(&format!("- {} (held by {})\n", b.name, b.owner_name));
            }
        }

        if !self.stocks.is_empty() {
            s.push_str("\nMarket:\n");
            for stock in &self.stocks {
                s.push_str(&format!(
                    "- {} at {:.2} ({:+.1}%)\n",
                    stock.symbol, stock.price, stock.change_percent
                ));
            }
        }

        s
    }

    /// Create an empty context for testing
    pub fn empty(company: CompanyId) -> Self {
        Self {
            company,
            company_name: "Test Co".into(),
            capital: 0,
            employees: 0,
            building_count: 0,
            tick: 0,
            enemies: vec![],
            available_buildings: vec![],
            contested_buildings: vec![],
            stocks: vec![],
        }
    }

    /// Case-insensitive lookup of a purchasable building by name
    pub fn find_building(&self, name: &str) -> Option<&BuildingInfo> {
        let lower = name.to_lowercase();
        self.available_buildings
            .iter()
            .find(|b| b.name.to_lowercase().contains(&lower))
    }

    /// Case-insensitive lookup of an enemy-held building by name
    pub fn find_contested(&self, name: &str) -> Option<&ContestedInfo> {
        let lower = name.to_lowercase();
        self.contested_buildings
            .iter()
            .find(|b| b.name.to_lowercase().contains(&lower))
    }

    /// Case-insensitive lookup of an enemy by name
    pub fn find_enemy(&self, name: &str) -> Option<&EnemyInfo> {
        let lower = name.to_lowercase();
        self.enemies
            .iter()
            .find(|e| e.name.to_lowercase().contains(&lower))
    }

    /// Lookup of a listed instrument by symbol
    pub fn find_stock(&self, symbol: &str) -> Option<&StockInfo> {
        self.stocks
            .iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol.trim()))
    }
}
