//! Engine configuration with documented constants
//!
//! All tunable values are collected here with explanations of their purpose
//! and how they interact with each other.

use crate::core::error::{MagnateError, Result};
use crate::core::types::{Money, Tick};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the competition engine
///
/// These values have been tuned against the default scenario. Changing them
/// shifts the pacing of eliminations and the aggressiveness of AI rivals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // === PACING ===
    /// Wall-clock milliseconds per simulation tick
    ///
    /// The engine itself is timer-free; this is consumed by the binaries
    /// that drive `SimulationClock::step` on an interval.
    pub tick_interval_ms: u64,

    /// Side length of the square city map (world units)
    pub world_size: f32,

    // === COMPANIES ===
    /// Capital every company starts with
    pub starting_capital: Money,

    /// Number of AI-controlled rival companies
    pub ai_count: u32,

    /// Field agents spawned per company
    pub agents_per_company: u32,

    // === AGENTS ===
    /// Movement speed in world units per tick
    pub agent_speed: f32,

    /// Distance below which an agent counts as arrived at its target
    pub arrival_epsilon: f32,

    /// Per-tick probability that an idle AI agent picks a wander target
    ///
    /// Purely cosmetic; wandering agents carry no pending action.
    pub wander_chance: f64,

    // === AI DECISIONS ===
    /// Ticks between AI decision rounds
    ///
    /// At the default cadence (100ms ticks) a cooldown of 50 means each AI
    /// company decides once every five seconds.
    pub decision_cooldown_ticks: Tick,

    /// Minimum ticks between a decision arriving and it being applied
    pub decision_delay_min: Tick,

    /// Maximum ticks between a decision arriving and it being applied
    ///
    /// The delay is drawn uniformly from [min, max] per decision to spread
    /// AI "thinking time" and avoid lockstep behavior.
    pub decision_delay_max: Tick,

    /// Milliseconds to wait for the inference collaborator before falling
    /// back to the deterministic heuristic
    pub decision_timeout_ms: u64,

    // === COMPETITION ===
    /// Capital below which a still-active company triggers a warning event
    pub elimination_threshold: Money,

    /// Share of total active capital that ends the game (0.0 - 1.0)
    pub victory_share: f64,

    /// Window for the competition-intensity score, in ticks
    ///
    /// 300 ticks is 30 seconds at the default cadence.
    pub intensity_window_ticks: Tick,

    // === MARKET ===
    /// Global multiplier on per-tick price drift
    ///
    /// Each instrument's own volatility coefficient is scaled by this, so
    /// a single knob calms or agitates the whole market.
    pub market_volatility_scale: f64,

    /// Ticks per trading day (day open/high/low reset on this boundary)
    pub market_day_ticks: Tick,

    // === PERSISTENCE ===
    /// Ticks between opportunistic snapshot saves (0 disables)
    pub save_interval_ticks: Tick,

    /// RNG seed for reproducible runs
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            world_size: 1000.0,

            starting_capital: 1_000_000,
            ai_count: 3,
            agents_per_company: 3,

            agent_speed: 8.0,
            arrival_epsilon: 2.0,
            wander_chance: 0.02,

            decision_cooldown_ticks: 50,
            decision_delay_min: 2,
            decision_delay_max: 6,
            decision_timeout_ms: 8_000,

            elimination_threshold: 50_000,
            victory_share: 0.6,
            intensity_window_ticks: 300,

            market_volatility_scale: 1.0,
            market_day_ticks: 600,

            save_interval_ticks: 100,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a scenario config from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| MagnateError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.starting_capital <= 0 {
            return Err(MagnateError::InvalidConfig(
                "starting_capital must be positive".into(),
            ));
        }

        if self.decision_delay_min > self.decision_delay_max {
            return Err(MagnateError::InvalidConfig(format!(
                "decision_delay_min ({}) must be <= decision_delay_max ({})",
                self.decision_delay_min, self.decision_delay_max
            )));
        }

        if !(0.0..=1.0).contains(&self.victory_share) {
            return Err(MagnateError::InvalidConfig(format!(
                "victory_share ({}) must be within 0.0..=1.0",
                self.victory_share
            )));
        }

        if !(0.0..=1.0).contains(&self.wander_chance) {
            return Err(MagnateError::InvalidConfig(
                "wander_chance must be a probability".into(),
            ));
        }

        if self.agent_speed <= 0.0 || self.arrival_epsilon <= 0.0 {
            return Err(MagnateError::InvalidConfig(
                "agent_speed and arrival_epsilon must be positive".into(),
            ));
        }

        if self.intensity_window_ticks == 0 {
            return Err(MagnateError::InvalidConfig(
                "intensity_window_ticks must be positive".into(),
            ));
        }

        Ok(())
    }
}
