//! Map-located buildings that generate per-tick income

use crate::core::types::{BuildingId, CompanyId, Money, Vec2};
use serde::{Deserialize, Serialize};

/// Type of building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    Office,
    Factory,
    Shop,
    Bank,
    Hotel,
    Lab,
}

impl BuildingKind {
    /// Per-tick income at level 1
    pub fn base_income(&self) -> Money {
        match self {
            BuildingKind::Office => 80,
            BuildingKind::Factory => 120,
            BuildingKind::Shop => 60,
            BuildingKind::Bank => 200,
            BuildingKind::Hotel => 140,
            BuildingKind::Lab => 160,
        }
    }

    pub fn all() -> [BuildingKind; 6] {
        [
            BuildingKind::Office,
            BuildingKind::Factory,
            BuildingKind::Shop,
            BuildingKind::Bank,
            BuildingKind::Hotel,
            BuildingKind::Lab,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BuildingKind::Office => "Office Tower",
            BuildingKind::Factory => "Factory",
            BuildingKind::Shop => "Retail Shop",
            BuildingKind::Bank => "Bank Branch",
            BuildingKind::Hotel => "Hotel",
            BuildingKind::Lab => "Research Lab",
        }
    }
}

/// A purchasable, contestable building on the city map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub position: Vec2,
    pub name: String,
    /// Upgrade level; purchase cost scales with this
    pub level: u8,
    /// Income credited to the owner every tick
    pub income: Money,
    /// Owning company, if any. Must reference an active company.
    pub owner: Option<CompanyId>,
}

impl Building {
    pub fn new(kind: BuildingKind, position: Vec2, name: impl Into<String>, level: u8) -> Self {
        Self {
            id: BuildingId::new(),
            kind,
            position,
            name: name.into(),
            level,
            income: kind.base_income() * level as Money,
            owner: None,
        }
    }

    /// Capital required to purchase this building outright
    pub fn purchase_cost(&self) -> Money {
        self.level as Money * crate::engine::resolver::PURCHASE_COST_PER_LEVEL
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_scales_with_level() {
        let b1 = Building::new(BuildingKind::Bank, Vec2::default(), "First National", 1);
        let b3 = Building::new(BuildingKind::Bank, Vec2::default(), "Central Bank", 3);
        assert_eq!(b1.income, 200);
        assert_eq!(b3.income, 600);
    }

    #[test]
    fn test_purchase_cost_scales_with_level() {
        let b = Building::new(BuildingKind::Office, Vec2::default(), "Harbor Point", 2);
        assert_eq!(b.purchase_cost(), 200_000);
    }

    #[test]
    fn test_new_building_is_unowned() {
        let b = Building::new(BuildingKind::Shop, Vec2::default(), "Corner Store", 1);
        assert!(!b.is_owned());
    }

    #[test]
    fn test_six_building_kinds() {
        assert_eq!(BuildingKind::all().len(), 6);
    }
}
