//! Market manipulation catalog
//!
//! Static reference data: each action's cost, success rate, detection
//! risk, price/volume impact, and duration. Resolution draws one Bernoulli
//! trial for success and one, independently, for detection.

use crate::core::types::{CompanyId, Money, Tick};
use serde::{Deserialize, Serialize};

/// The seven manipulation plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManipulationKind {
    RumorSpread,
    WashTrading,
    InsiderLeak,
    ShortAttack,
    PumpAndDump,
    BearRaid,
    CornerMarket,
}

impl ManipulationKind {
    pub fn all() -> [ManipulationKind; 7] {
        [
            ManipulationKind::RumorSpread,
            ManipulationKind::WashTrading,
            ManipulationKind::InsiderLeak,
            ManipulationKind::ShortAttack,
            ManipulationKind::PumpAndDump,
            ManipulationKind::BearRaid,
            ManipulationKind::CornerMarket,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ManipulationKind::RumorSpread => "rumor campaign",
            ManipulationKind::WashTrading => "wash trading",
            ManipulationKind::InsiderLeak => "insider leak",
            ManipulationKind::ShortAttack => "short attack",
            ManipulationKind::PumpAndDump => "pump and dump",
            ManipulationKind::BearRaid => "bear raid",
            ManipulationKind::CornerMarket => "cornering the market",
        }
    }

    /// Parse a user/AI supplied name, e.g. "rumor_spread"
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "rumor_spread" | "rumor" => Some(ManipulationKind::RumorSpread),
            "wash_trading" | "wash" => Some(ManipulationKind::WashTrading),
            "insider_leak" | "leak" => Some(ManipulationKind::InsiderLeak),
            "short_attack" | "short" => Some(ManipulationKind::ShortAttack),
            "pump_and_dump" | "pump" => Some(ManipulationKind::PumpAndDump),
            "bear_raid" | "raid" => Some(ManipulationKind::BearRaid),
            "corner_market" | "corner" => Some(ManipulationKind::CornerMarket),
            _ => None,
        }
    }
}

/// Qualitative risk tier, for display and AI context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Extreme,
}

/// Catalog entry: immutable reference data for one manipulation play
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ManipulationSpec {
    pub kind: ManipulationKind,
    pub cost: Money,
    pub success_rate: f64,
    pub detection_risk: f64,
    /// Fractional price move on success; sign is the direction. Volume
    /// plays move volume by 10x this fraction instead.
    pub impact: f64,
    pub duration_ticks: Tick,
    pub risk: RiskTier,
}

impl ManipulationSpec {
    /// True for plays whose primary effect is on traded volume
    pub fn is_volume_play(&self) -> bool {
        matches!(self.kind, ManipulationKind::WashTrading)
    }

    /// True for plays that plant a story and therefore emit a news item
    pub fn plants_news(&self) -> bool {
        matches!(
            self.kind,
            ManipulationKind::RumorSpread | ManipulationKind::InsiderLeak
        )
    }
}

/// The full static catalog, in escalating cost order
pub fn catalog() -> &'static [ManipulationSpec; 7] {
    &CATALOG
}

pub fn spec(kind: ManipulationKind) -> &'static ManipulationSpec {
    CATALOG
        .iter()
        .find(|s| s.kind == kind)
        .expect("catalog covers every kind")
}

static CATALOG: [ManipulationSpec; 7] = [
    ManipulationSpec {
        kind: ManipulationKind::RumorSpread,
        cost: 20_000,
        success_rate: 0.65,
        detection_risk: 0.15,
        impact: 0.04,
        duration_ticks: 30,
        risk: RiskTier::Low,
    },
    ManipulationSpec {
        kind: ManipulationKind::WashTrading,
        cost: 40_000,
        success_rate: 0.60,
        detection_risk: 0.25,
        impact: 0.05,
        duration_ticks: 35,
        risk: RiskTier::Medium,
    },
    ManipulationSpec {
        kind: ManipulationKind::InsiderLeak,
        cost: 50_000,
        success_rate: 0.55,
        detection_risk: 0.30,
        impact: 0.08,
        duration_ticks: 40,
        risk: RiskTier::Medium,
    },
    ManipulationSpec {
        kind: ManipulationKind::ShortAttack,
        cost: 70_000,
        success_rate: 0.45,
        detection_risk: 0.30,
        impact: -0.10,
        duration_ticks: 45,
        risk: RiskTier::High,
    },
    ManipulationSpec {
        kind: ManipulationKind::PumpAndDump,
        cost: 80_000,
        success_rate: 0.50,
        detection_risk: 0.35,
        impact: 0.12,
        duration_ticks: 50,
        risk: RiskTier::High,
    },
    ManipulationSpec {
        kind: ManipulationKind::BearRaid,
        cost: 100_000,
        success_rate: 0.40,
        detection_risk: 0.40,
        impact: -0.15,
        duration_ticks: 60,
        risk: RiskTier::Extreme,
    },
    ManipulationSpec {
        kind: ManipulationKind::CornerMarket,
        cost: 150_000,
        success_rate: 0.35,
        detection_risk: 0.45,
        impact: 0.20,
        duration_ticks: 80,
        risk: RiskTier::Extreme,
    },
];

/// Result of attempting a manipulation
///
/// `cost` is what the initiator actually pays: the catalog cost on
/// success, double on detection, half on a quiet failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManipulationOutcome {
    pub success: bool,
    pub detected: bool,
    pub cost: Money,
}

/// A manipulation currently distorting an instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveManipulation {
    pub company: CompanyId,
    pub symbol: String,
    pub kind: ManipulationKind,
    pub started_at: Tick,
    pub expires_at: Tick,
}
