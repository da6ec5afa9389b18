//! Competition engine: deltas, elimination, victory, hostile takeovers
//!
//! Runs once per tick against the (previous, current) snapshot pair.
//! Elimination and the game-over transition are monotonic and idempotent;
//! re-running either pass on the same state is a no-op.

use crate::core::types::{CompanyId, Money, Tick};
use crate::engine::events::{EventKind, EventLog};
use crate::world::snapshot::{GameStatus, WorldSnapshot};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Multiplier on the target's capital for a hostile takeover bid
pub const TAKEOVER_PREMIUM: f64 = 1.5;

/// Per-tick aggregate view of the competitive landscape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitionAnalytics {
    /// Percent of total active capital per active company; sums to 100
    /// whenever total active capital is positive
    pub market_share: AHashMap<CompanyId, f64>,
    /// Percent of all buildings each active company controls
    pub building_control: AHashMap<CompanyId, f64>,
    /// Recent event density, normalized 0-100
    pub intensity: f64,
    /// Spread of recent asset swings, normalized 0-100
    pub risk_level: f64,
}

/// What a hostile takeover bid produced
#[derive(Debug, Clone, PartialEq)]
pub enum TakeoverOutcome {
    Completed {
        cost: Money,
        buildings_seized: usize,
    },
    /// Attacker cannot cover the bid, or a party is invalid. No state
    /// change; a failure event is logged.
    Rejected,
}

/// Exact bid required to take a target over
pub fn takeover_cost(target_capital: Money) -> Money {
    (target_capital as f64 * TAKEOVER_PREMIUM).floor() as Money
}

/// Victory rules, evaluated against the current snapshot
///
/// Transitions status Playing -> Victory | Defeat exactly once; calling
/// again on an ended game returns the recorded outcome untouched.
pub fn check_victory(world: &mut WorldSnapshot, victory_share: f64) -> GameStatus {
    if world.status.is_over() {
        return world.status.clone();
    }

    let active: Vec<(CompanyId, Money, bool)> = world
        .active_companies()
        .map(|c| (c.id, c.capital, c.is_player))
        .collect();
    let player_alive = active.iter().any(|(_, _, is_player)| *is_player);
    let total: Money = active.iter().map(|(_, capital, _)| capital).sum();

    // (a) last company standing
    if active.len() == 1 {
        let (winner, _, is_player) = active[0];
        let reason = "eliminated all competitors".to_string();
        world.status = if is_player {
            GameStatus::Victory { winner, reason }
        } else {
            GameStatus::Defeat {
                winner: Some(winner),
                reason,
            }
        };
        return world.status.clone();
    }

    // (b) dominant share of active capital
    if total > 0 {
        for (id, capital, is_player) in &active {
            let share = *capital as f64 / total as f64;
            if share >= victory_share {
                let reason = format!(
                    "controlled market assets ({:.1}% of active capital)",
                    share * 100.0
                );
                world.status = if *is_player {
                    GameStatus::Victory {
                        winner: *id,
                        reason,
                    }
                } else {
                    GameStatus::Defeat {
                        winner: Some(*id),
                        reason,
                    }
                };
                return world.status.clone();
            }
        }
    }

    // (c) the player is out
    if !player_alive {
        let winner = active
            .iter()
            .max_by_key(|(_, capital, _)| *capital)
            .map(|(id, _, _)| *id);
        world.status = GameStatus::Defeat {
            winner,
            reason: "player bankrupt".to_string(),
        };
        return world.status.clone();
    }

    GameStatus::Playing
}

/// Stateful per-game engine: owns the event log and the rolling windows
/// behind the analytics scores
#[derive(Debug)]
pub struct CompetitionEngine {
    log: EventLog,
    /// (tick, |capital delta|) samples for the risk score
    recent_swings: VecDeque<(Tick, Money)>,
    elimination_threshold: Money,
    victory_share: f64,
    intensity_window: Tick,
}

impl CompetitionEngine {
    pub fn new(elimination_threshold: Money, victory_share: f64, intensity_window: Tick) -> Self {
        Self {
            log: EventLog::new(),
            recent_swings: VecDeque::new(),
            elimination_threshold,
            victory_share,
            intensity_window,
        }
    }

    pub fn events(&self) -> &EventLog {
        &self.log
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.log
    }

    /// Full per-tick pass: deltas, elimination, victory, analytics
    pub fn run_checks(&mut self, prev: &WorldSnapshot, current: &mut WorldSnapshot) {
        self.detect_deltas(prev, current);
        self.run_elimination(current);

        let was_playing = !current.status.is_over();
        let status = check_victory(current, self.victory_share);
        if was_playing && status.is_over() {
            tracing::info!(reason = ?status.reason(), "game over");
        }

        current.analytics = self.compute_analytics(current);
    }

    /// Synthesize events from field changes between two snapshots
    fn detect_deltas(&mut self, prev: &WorldSnapshot, current: &WorldSnapshot) {
        let tick = current.tick;

        for company in &current.companies {
            let Some(before) = prev.company(company.id) else {
                continue;
            };

            let delta = company.capital - before.capital;
            if delta != 0 {
                self.log.push(
                    tick,
                    EventKind::AssetChange,
                    company.id,
                    None,
                    format!("{} capital moved by {}", company.name, delta),
                    delta,
                );
                self.recent_swings.push_back((tick, delta.abs()));
            }

            // Warning on crossing below the threshold while still active
            if company.is_active()
                && before.capital >= self.elimination_threshold
                && company.capital < self.elimination_threshold
            {
                self.log.push(
                    tick,
                    EventKind::AssetChange,
                    company.id,
                    None,
                    format!(
                        "{} is running low on capital ({} remaining)",
                        company.name, company.capital
                    ),
                    company.capital,
                );
                tracing::warn!(company = %company.name, capital = company.capital, "low capital");
            }
        }

        for building in &current.buildings {
            let Some(before) = prev.building(building.id) else {
                continue;
            };
            if building.owner != before.owner {
                if let Some(new_owner) = building.owner {
                    let owner_name = current
                        .company(new_owner)
                        .map(|c| c.name.clone())
                        .unwrap_or_default();
                    self.log.push(
                        tick,
                        EventKind::BuildingAcquired,
                        new_owner,
                        before.owner,
                        format!("{} acquired {}", owner_name, building.name),
                        building.purchase_cost(),
                    );
                }
            }
        }

        let horizon = tick.saturating_sub(self.intensity_window);
        while let Some((t, _)) = self.recent_swings.front() {
            if *t < horizon {
                self.recent_swings.pop_front();
            } else {
                break;
            }
        }
    }

    /// Transition every ruined company to bankrupt and release its
    /// buildings. Idempotent: bankrupt companies are skipped.
    pub fn run_elimination(&mut self, world: &mut WorldSnapshot) {
        let ruined: Vec<CompanyId> = world
            .active_companies()
            .filter(|c| c.capital <= 0)
            .map(|c| c.id)
            .collect();

        for id in ruined {
            let (name, released) = {
                let company = world.company_mut(id).expect("company listed above");
                (company.name.clone(), company.go_bankrupt())
            };
            for building_id in &released {
                if let Some(b) = world.building_mut(*building_id) {
                    b.owner = None;
                }
            }
            self.log.push(
                world.tick,
                EventKind::CompanyEliminated,
                id,
                None,
                format!("{} went bankrupt; {} buildings released", name, released.len()),
                0,
            );
            tracing::info!(company = %name, released = released.len(), "company eliminated");
        }
    }

    /// A deliberate acquisition that eliminates the target outright
    ///
    /// The attacker pays floor(target capital x 1.5). Rejected with no
    /// state change if the attacker cannot cover the bid.
    pub fn execute_hostile_takeover(
        &mut self,
        world: &mut WorldSnapshot,
        attacker: CompanyId,
        target: CompanyId,
    ) -> TakeoverOutcome {
        if attacker == target {
            return TakeoverOutcome::Rejected;
        }
        let (target_name, target_capital) = match world.company(target) {
            Some(t) if t.is_active() => (t.name.clone(), t.capital),
            _ => return TakeoverOutcome::Rejected,
        };
        let cost = takeover_cost(target_capital);

        let attacker_name = match world.company(attacker) {
            Some(a) if a.is_active() => {
                if a.capital < cost {
                    self.log.push(
                        world.tick,
                        EventKind::HostileTakeover,
                        attacker,
                        Some(target),
                        format!(
                            "{} could not fund a takeover of {} (bid {})",
                            a.name, target_name, cost
                        ),
                        0,
                    );
                    return TakeoverOutcome::Rejected;
                }
                a.name.clone()
            }
            _ => return TakeoverOutcome::Rejected,
        };

        let seized = {
            let t = world.company_mut(target).expect("target checked above");
            t.go_bankrupt()
        };
        for building_id in &seized {
            if let Some(b) = world.building_mut(*building_id) {
                b.owner = Some(attacker);
            }
        }
        {
            let a = world.company_mut(attacker).expect("attacker checked above");
            a.capital -= cost;
            a.buildings.extend(seized.iter().copied());
        }

        self.log.push(
            world.tick,
            EventKind::HostileTakeover,
            attacker,
            Some(target),
            format!(
                "{} took over {} for {} ({} buildings seized)",
                attacker_name,
                target_name,
                cost,
                seized.len()
            ),
            -cost,
        );
        self.log.push(
            world.tick,
            EventKind::CompanyEliminated,
            target,
            Some(attacker),
            format!("{} absorbed by {}", target_name, attacker_name),
            0,
        );
        tracing::info!(attacker = %attacker_name, target = %target_name, cost, "hostile takeover");

        TakeoverOutcome::Completed {
            cost,
            buildings_seized: seized.len(),
        }
    }

    /// Aggregate scores over the current snapshot
    pub fn compute_analytics(&self, world: &WorldSnapshot) -> CompetitionAnalytics {
        let mut analytics = CompetitionAnalytics::default();

        let total_capital = world.total_active_capital();
        if total_capital > 0 {
            for company in world.active_companies() {
                analytics.market_share.insert(
                    company.id,
                    company.capital as f64 / total_capital as f64 * 100.0,
                );
            }
        }

        let total_buildings = world.buildings.len();
        if total_buildings > 0 {
            for company in world.active_companies() {
                analytics.building_control.insert(
                    company.id,
                    company.buildings.len() as f64 / total_buildings as f64 * 100.0,
                );
            }
        }

        let horizon = world.tick.saturating_sub(self.intensity_window);
        let recent = self.log.since(horizon).count();
        analytics.intensity = (recent as f64 * 4.0).min(100.0);

        analytics.risk_level = self.risk_score();
        analytics
    }

    /// Standard deviation of recent swings scaled against the
    /// elimination threshold, clamped to 0-100
    fn risk_score(&self) -> f64 {
        let n = self.recent_swings.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self
            .recent_swings
            .iter()
            .map(|(_, magnitude)| *magnitude as f64)
            .sum::<f64>()
            / n as f64;
        let variance = self
            .recent_swings
            .iter()
            .map(|(_, magnitude)| {
                let d = *magnitude as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;
        (variance.sqrt() / self.elimination_threshold as f64 * 100.0).min(100.0)
    }
}
