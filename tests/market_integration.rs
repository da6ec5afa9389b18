//! Integration tests for the stock market
//!
//! The manipulation model is the probabilistic heart of the economy:
//! these tests pin the outcome table (success / detected / quiet
//! failure), the cost multipliers, and the statistical convergence of
//! the Bernoulli draws to the catalog rates.

use magnate::core::types::CompanyId;
use magnate::market::manipulation::{spec, ManipulationKind};
use magnate::market::StockMarket;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn fresh_market(seed: u64) -> (StockMarket, ChaCha8Rng) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let market = StockMarket::with_default_listings(&mut rng);
    (market, rng)
}

// ============================================================================
// Outcome table
// ============================================================================

/// Over many trials the three outcome branches pay exactly cost x1,
/// x2, and x0.5
#[test]
fn test_cost_multipliers_per_branch() {
    let (mut market, mut rng) = fresh_market(11);
    let company = CompanyId::new();
    let entry = spec(ManipulationKind::PumpAndDump);

    let mut saw_success = false;
    let mut saw_detected = false;
    let mut saw_quiet_failure = false;

    for tick in 0..2_000 {
        let outcome = market
            .execute_manipulation(company, "VLT", ManipulationKind::PumpAndDump, tick, &mut rng)
            .unwrap();
        if outcome.detected {
            assert!(!outcome.success);
            assert_eq!(outcome.cost, entry.cost * 2);
            saw_detected = true;
        } else if outcome.success {
            assert_eq!(outcome.cost, entry.cost);
            saw_success = true;
        } else {
            assert_eq!(outcome.cost, entry.cost / 2);
            saw_quiet_failure = true;
        }
    }

    assert!(saw_success && saw_detected && saw_quiet_failure);
}

/// Detected plays never move the market
#[test]
fn test_detected_play_has_no_market_effect() {
    let (mut market, mut rng) = fresh_market(23);
    let company = CompanyId::new();

    for tick in 0..2_000 {
        let price_before = market.stock("KST").unwrap().price;
        let active_before = market.active.len();
        let outcome = market
            .execute_manipulation(company, "KST", ManipulationKind::BearRaid, tick, &mut rng)
            .unwrap();
        if outcome.detected {
            assert_eq!(market.stock("KST").unwrap().price, price_before);
            assert_eq!(market.active.len(), active_before);
            return;
        }
    }
    panic!("no detection in 2000 trials of a 40% detection-risk play");
}

/// Volume plays move volume, not price
#[test]
fn test_wash_trading_is_a_volume_play() {
    let (mut market, mut rng) = fresh_market(31);
    let company = CompanyId::new();

    for tick in 0..2_000 {
        let price_before = market.stock("ORM").unwrap().price;
        let volume_before = market.stock("ORM").unwrap().volume;
        let outcome = market
            .execute_manipulation(company, "ORM", ManipulationKind::WashTrading, tick, &mut rng)
            .unwrap();
        if outcome.success {
            assert_eq!(market.stock("ORM").unwrap().price, price_before);
            assert!(market.stock("ORM").unwrap().volume > volume_before);
            return;
        }
    }
    panic!("no success in 2000 trials of a 60% success-rate play");
}

// ============================================================================
// Statistical convergence
// ============================================================================

/// Empirical detection and success rates converge to the catalog's
/// numbers. Success is observed only when the play is not detected, so
/// the expected observed-success rate is successRate x (1 - risk).
#[test]
fn test_manipulation_rates_converge_to_catalog() {
    let (mut market, mut rng) = fresh_market(1234);
    let company = CompanyId::new();
    let entry = spec(ManipulationKind::RumorSpread);
    let trials = 10_000u64;

    let mut detected = 0u64;
    let mut succeeded = 0u64;
    for tick in 0..trials {
        let outcome = market
            .execute_manipulation(company, "HRB", ManipulationKind::RumorSpread, tick, &mut rng)
            .unwrap();
        if outcome.detected {
            detected += 1;
        }
        if outcome.success {
            succeeded += 1;
        }
    }

    let detected_rate = detected as f64 / trials as f64;
    let success_rate = succeeded as f64 / trials as f64;
    let expected_success = entry.success_rate * (1.0 - entry.detection_risk);

    assert!(
        (detected_rate - entry.detection_risk).abs() < 0.02,
        "detection rate {} drifted from {}",
        detected_rate,
        entry.detection_risk
    );
    assert!(
        (success_rate - expected_success).abs() < 0.02,
        "success rate {} drifted from {}",
        success_rate,
        expected_success
    );
}

// ============================================================================
// Per-tick update
// ============================================================================

#[test]
fn test_update_expires_only_past_due_records() {
    let (mut market, mut rng) = fresh_market(7);
    let company = CompanyId::new();

    // Force a success to get one active record
    let mut started = None;
    for tick in 0..1_000 {
        let outcome = market
            .execute_manipulation(company, "SXM", ManipulationKind::CornerMarket, tick, &mut rng)
            .unwrap();
        if outcome.success {
            started = Some(tick);
            break;
        }
    }
    let started = started.expect("a success within 1000 trials");
    let expires = started + spec(ManipulationKind::CornerMarket).duration_ticks;

    market.update(expires - 1, 1.0, 600, &mut rng);
    assert_eq!(market.active.len(), 1);
    market.update(expires, 1.0, 600, &mut rng);
    assert!(market.active.is_empty());
}

#[test]
fn test_previous_price_tracks_last_tick() {
    let (mut market, mut rng) = fresh_market(3);
    let before = market.stock("KST").unwrap().price;
    market.update(1, 1.0, 600, &mut rng);
    let stock = market.stock("KST").unwrap();
    assert_eq!(stock.previous_price, before);
    // change/changePercent derive from the pair
    assert!((stock.change() - (stock.price - before)).abs() < 1e-12);
}

proptest! {
    /// Prices stay strictly positive under any volatility up to 100%
    /// per tick, for thousands of ticks
    #[test]
    fn prop_prices_stay_positive(volatility in 0.0f64..1.0, seed in 0u64..1_000) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut market = StockMarket::with_default_listings(&mut rng);
        for stock in &mut market.stocks {
            stock.volatility = volatility;
        }
        for tick in 0..2_000 {
            market.update(tick, 1.0, 600, &mut rng);
        }
        for stock in &market.stocks {
            prop_assert!(stock.price > 0.0);
        }
    }
}
