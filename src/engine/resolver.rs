//! Agent action resolution rules
//!
//! Pure functions of (world, actor, target) -> outcome. Probabilistic
//! rules take the RNG as a parameter; nothing here touches an ambient
//! random source, so every branch is reachable from a seeded test.

use crate::core::types::{BuildingId, CompanyId, Money};
use crate::world::agent::SkillSet;
use crate::world::snapshot::WorldSnapshot;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Purchase price per upgrade level
pub const PURCHASE_COST_PER_LEVEL: Money = 100_000;

/// Flat cost of hiring one employee
pub const RECRUIT_COST: Money = 50_000;

/// Paid by the attacker whether or not the seizure succeeds
pub const ATTACK_COST: Money = 100_000;

/// Lost by the defender when a seizure succeeds
pub const ATTACK_PENALTY: Money = 50_000;

/// Baseline defense every building owner gets
pub const BASE_DEFENSE: i32 = 50;

/// Flat cost of an espionage run
pub const INTEL_COST: Money = 30_000;

/// Percent of the target's capital stolen on a successful run
pub const INTEL_STEAL_PERCENT: Money = 5;

/// Why an action was refused with no state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InsufficientFunds,
    AlreadyOwned,
    InvalidTarget,
}

/// Result of resolving one agent action
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Purchased {
        building: BuildingId,
        cost: Money,
    },
    Recruited {
        cost: Money,
    },
    AttackSucceeded {
        building: BuildingId,
        seized_from: CompanyId,
    },
    AttackFailed {
        building: BuildingId,
    },
    IntelligenceSucceeded {
        target: CompanyId,
        stolen: Money,
    },
    IntelligenceFailed {
        target: CompanyId,
    },
    Rejected(RejectReason),
}

impl ActionOutcome {
    pub fn rejected(&self) -> bool {
        matches!(self, ActionOutcome::Rejected(_))
    }
}

/// Success probability of a seizure for a given attack power
pub fn attack_success_probability(attack_power: i32) -> f64 {
    (((attack_power - BASE_DEFENSE + 30) as f64) / 100.0).clamp(0.0, 1.0)
}

/// Buy an unowned building outright
///
/// Requires the building unowned and company capital at least
/// level x 100,000. On failure nothing changes.
pub fn purchase_building(
    world: &mut WorldSnapshot,
    company: CompanyId,
    building: BuildingId,
) -> ActionOutcome {
    let (cost, owned) = match world.building(building) {
        Some(b) => (b.purchase_cost(), b.is_owned()),
        None => return ActionOutcome::Rejected(RejectReason::InvalidTarget),
    };
    if owned {
        return ActionOutcome::Rejected(RejectReason::AlreadyOwned);
    }

    match world.company_mut(company) {
        Some(c) if c.is_active() => {
            if c.capital < cost {
                return ActionOutcome::Rejected(RejectReason::InsufficientFunds);
            }
            c.capital -= cost;
            c.buildings.insert(building);
        }
        _ => return ActionOutcome::Rejected(RejectReason::InvalidTarget),
    }

    world
        .building_mut(building)
        .expect("building existence checked above")
        .owner = Some(company);

    ActionOutcome::Purchased { building, cost }
}

/// Hire one employee at the flat recruiting cost
pub fn recruit_employee(world: &mut WorldSnapshot, company: CompanyId) -> ActionOutcome {
    match world.company_mut(company) {
        Some(c) if c.is_active() => {
            if c.capital < RECRUIT_COST {
                return ActionOutcome::Rejected(RejectReason::InsufficientFunds);
            }
            c.capital -= RECRUIT_COST;
            c.employees += 1;
            ActionOutcome::Recruited { cost: RECRUIT_COST }
        }
        _ => ActionOutcome::Rejected(RejectReason::InvalidTarget),
    }
}

/// Seize an enemy-owned building by force
///
/// One Bernoulli trial at `attack_success_probability(management +
/// negotiation)`. The attack cost is paid either way; on success the
/// defender also loses the building and a flat penalty.
pub fn attack_building(
    world: &mut WorldSnapshot,
    attacker: CompanyId,
    skills: &SkillSet,
    building: BuildingId,
    rng: &mut ChaCha8Rng,
) -> ActionOutcome {
    let defender = match world.building(building).and_then(|b| b.owner) {
        Some(owner) if owner != attacker => owner,
        _ => return ActionOutcome::Rejected(RejectReason::InvalidTarget),
    };

    match world.company(attacker) {
        Some(c) if c.is_active() && c.capital >= ATTACK_COST => {}
        Some(_) => return ActionOutcome::Rejected(RejectReason::InsufficientFunds),
        None => return ActionOutcome::Rejected(RejectReason::InvalidTarget),
    }

    let p = attack_success_probability(skills.attack_power());
    let succeeded = rng.gen_bool(p);

    // The raid is paid for win or lose
    world
        .company_mut(attacker)
        .expect("attacker existence checked above")
        .capital -= ATTACK_COST;

    if !succeeded {
        return ActionOutcome::AttackFailed { building };
    }

    if let Some(d) = world.company_mut(defender) {
        d.capital -= ATTACK_PENALTY;
        d.buildings.remove(&building);
    }
    if let Some(a) = world.company_mut(attacker) {
        a.buildings.insert(building);
    }
    world
        .building_mut(building)
        .expect("building existence checked above")
        .owner = Some(attacker);

    ActionOutcome::AttackSucceeded {
        building,
        seized_from: defender,
    }
}

/// Run espionage against a rival, stealing a slice of their capital
///
/// Spy power (espionage + negotiation) is used directly as a success
/// percentage. The run cost is paid either way; the stolen capital is
/// transferred, not destroyed.
pub fn gather_intelligence(
    world: &mut WorldSnapshot,
    attacker: CompanyId,
    skills: &SkillSet,
    target: CompanyId,
    rng: &mut ChaCha8Rng,
) -> ActionOutcome {
    if attacker == target {
        return ActionOutcome::Rejected(RejectReason::InvalidTarget);
    }
    match world.company(target) {
        Some(t) if t.is_active() => {}
        _ => return ActionOutcome::Rejected(RejectReason::InvalidTarget),
    }
    match world.company(attacker) {
        Some(c) if c.is_active() && c.capital >= INTEL_COST => {}
        Some(_) => return ActionOutcome::Rejected(RejectReason::InsufficientFunds),
        None => return ActionOutcome::Rejected(RejectReason::InvalidTarget),
    }

    world
        .company_mut(attacker)
        .expect("attacker existence checked above")
        .capital -= INTEL_COST;

    let succeeded = rng.gen_range(0..100) < skills.spy_power().clamp(0, 100);
    if !succeeded {
        return ActionOutcome::IntelligenceFailed { target };
    }

    let stolen = {
        let t = world
            .company_mut(target)
            .expect("target existence checked above");
        let stolen = t.capital * INTEL_STEAL_PERCENT / 100;
        t.capital -= stolen;
        stolen
    };
    world
        .company_mut(attacker)
        .expect("attacker existence checked above")
        .capital += stolen;

    ActionOutcome::IntelligenceSucceeded { target, stolen }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::world::company::OrgType;
    use crate::world::snapshot::CompanySeed;
    use rand::SeedableRng;

    fn two_company_world() -> (WorldSnapshot, CompanyId, CompanyId, ChaCha8Rng) {
        let seeds = vec![
            CompanySeed {
                name: "Meridian Holdings".into(),
                is_player: true,
                org: OrgType::Centralized,
            },
            CompanySeed {
                name: "Kestrel Group".into(),
                is_player: false,
                org: OrgType::Decentralized,
            },
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let world = WorldSnapshot::generate(&EngineConfig::default(), &seeds, &mut rng);
        let a = world.companies[0].id;
        let b = world.companies[1].id;
        (world, a, b, rng)
    }

    #[test]
    fn test_attack_probability_formula() {
        assert!((attack_success_probability(80) - 0.6).abs() < 1e-9);
        assert_eq!(attack_success_probability(0), 0.0);
        assert_eq!(attack_success_probability(200), 1.0);
    }

    #[test]
    fn test_purchase_transfers_ownership_and_debits() {
        let (mut world, a, _, _) = two_company_world();
        let building = world.buildings[0].id;
        let cost = world.buildings[0].purchase_cost();
        let before = world.company(a).unwrap().capital;

        let outcome = purchase_building(&mut world, a, building);
        assert!(matches!(outcome, ActionOutcome::Purchased { .. }));
        assert_eq!(world.company(a).unwrap().capital, before - cost);
        assert_eq!(world.building(building).unwrap().owner, Some(a));
        assert!(world.company(a).unwrap().buildings.contains(&building));
    }

    #[test]
    fn test_purchase_rejects_owned_building() {
        let (mut world, a, b, _) = two_company_world();
        let building = world.buildings[0].id;
        purchase_building(&mut world, a, building);

        let outcome = purchase_building(&mut world, b, building);
        assert_eq!(outcome, ActionOutcome::Rejected(RejectReason::AlreadyOwned));
        assert_eq!(world.building(building).unwrap().owner, Some(a));
    }

    #[test]
    fn test_purchase_rejects_insufficient_funds() {
        let (mut world, a, _, _) = two_company_world();
        let building = world.buildings[0].id;
        world.company_mut(a).unwrap().capital = 10;

        let outcome = purchase_building(&mut world, a, building);
        assert_eq!(
            outcome,
            ActionOutcome::Rejected(RejectReason::InsufficientFunds)
        );
        assert_eq!(world.company(a).unwrap().capital, 10);
        assert!(world.building(building).unwrap().owner.is_none());
    }

    #[test]
    fn test_recruit_increments_employees() {
        let (mut world, a, _, _) = two_company_world();
        let before = world.company(a).unwrap();
        let (capital, employees) = (before.capital, before.employees);

        let outcome = recruit_employee(&mut world, a);
        assert!(matches!(outcome, ActionOutcome::Recruited { .. }));
        let after = world.company(a).unwrap();
        assert_eq!(after.capital, capital - RECRUIT_COST);
        assert_eq!(after.employees, employees + 1);
    }

    #[test]
    fn test_attack_rejects_unowned_building() {
        let (mut world, a, _, mut rng) = two_company_world();
        let building = world.buildings[0].id;
        let skills = SkillSet::new(50, 50, 50);

        let outcome = attack_building(&mut world, a, &skills, building, &mut rng);
        assert_eq!(outcome, ActionOutcome::Rejected(RejectReason::InvalidTarget));
    }

    #[test]
    fn test_attack_failure_costs_attacker_only() {
        let (mut world, a, b, mut rng) = two_company_world();
        let building = world.buildings[0].id;
        purchase_building(&mut world, b, building);
        let attacker_before = world.company(a).unwrap().capital;
        let defender_before = world.company(b).unwrap().capital;

        // Zero skill means p = 0: guaranteed failure
        let skills = SkillSet::new(0, 0, 0);
        let outcome = attack_building(&mut world, a, &skills, building, &mut rng);
        assert_eq!(outcome, ActionOutcome::AttackFailed { building });
        assert_eq!(world.company(a).unwrap().capital, attacker_before - ATTACK_COST);
        assert_eq!(world.company(b).unwrap().capital, defender_before);
        assert_eq!(world.building(building).unwrap().owner, Some(b));
    }

    #[test]
    fn test_attack_success_transfers_building() {
        let (mut world, a, b, mut rng) = two_company_world();
        let building = world.buildings[0].id;
        purchase_building(&mut world, b, building);
        let attacker_before = world.company(a).unwrap().capital;
        let defender_before = world.company(b).unwrap().capital;

        // Max skill means p = 1: guaranteed success
        let skills = SkillSet::new(100, 0, 100);
        let outcome = attack_building(&mut world, a, &skills, building, &mut rng);
        assert_eq!(
            outcome,
            ActionOutcome::AttackSucceeded {
                building,
                seized_from: b
            }
        );
        assert_eq!(world.company(a).unwrap().capital, attacker_before - ATTACK_COST);
        assert_eq!(
            world.company(b).unwrap().capital,
            defender_before - ATTACK_PENALTY
        );
        assert_eq!(world.building(building).unwrap().owner, Some(a));
        assert!(!world.company(b).unwrap().buildings.contains(&building));
        assert!(world.company(a).unwrap().buildings.contains(&building));
    }

    #[test]
    fn test_intelligence_steals_five_percent() {
        let (mut world, a, b, mut rng) = two_company_world();
        world.company_mut(b).unwrap().capital = 800_000;
        let attacker_before = world.company(a).unwrap().capital;

        // Spy power >= 100 guarantees success
        let skills = SkillSet::new(60, 60, 0);
        let outcome = gather_intelligence(&mut world, a, &skills, b, &mut rng);
        assert_eq!(
            outcome,
            ActionOutcome::IntelligenceSucceeded {
                target: b,
                stolen: 40_000
            }
        );
        assert_eq!(world.company(b).unwrap().capital, 760_000);
        assert_eq!(
            world.company(a).unwrap().capital,
            attacker_before - INTEL_COST + 40_000
        );
    }

    #[test]
    fn test_intelligence_failure_costs_attacker_only() {
        let (mut world, a, b, mut rng) = two_company_world();
        let attacker_before = world.company(a).unwrap().capital;
        let target_before = world.company(b).unwrap().capital;

        let skills = SkillSet::new(0, 0, 0);
        let outcome = gather_intelligence(&mut world, a, &skills, b, &mut rng);
        assert_eq!(outcome, ActionOutcome::IntelligenceFailed { target: b });
        assert_eq!(world.company(a).unwrap().capital, attacker_before - INTEL_COST);
        assert_eq!(world.company(b).unwrap().capital, target_before);
    }

    #[test]
    fn test_attack_probability_converges() {
        // For power 80, p = (80 - 50 + 30) / 100 = 0.6
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        let p = attack_success_probability(80);
        let trials = 10_000;
        let successes = (0..trials).filter(|_| rng.gen_bool(p)).count();
        let observed = successes as f64 / trials as f64;
        assert!(
            (observed - 0.6).abs() < 0.02,
            "observed rate {} drifted from 0.6",
            observed
        );
    }
}
