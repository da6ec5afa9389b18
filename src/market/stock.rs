//! Tradable instruments and their per-tick price dynamics

use crate::core::types::Money;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Price can never reach zero; the random walk clamps here
pub const PRICE_FLOOR: f64 = 0.01;

/// A listed instrument
///
/// `change` and `change_percent` are always derived from price and
/// previous_price, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub previous_price: f64,
    pub volume: u64,
    pub day_high: f64,
    pub day_low: f64,
    pub day_open: f64,
    /// Per-tick drift bound as a fraction of price
    pub volatility: f64,
    /// Sensitivity relative to the market as a whole
    pub beta: f64,
}

impl Stock {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, price: f64, volume: u64) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
            previous_price: price,
            volume,
            day_high: price,
            day_low: price,
            day_open: price,
            volatility: 0.01,
            beta: 1.0,
        }
    }

    pub fn with_dynamics(mut self, volatility: f64, beta: f64) -> Self {
        self.volatility = volatility;
        self.beta = beta;
        self
    }

    pub fn change(&self) -> f64 {
        self.price - self.previous_price
    }

    pub fn change_percent(&self) -> f64 {
        if self.previous_price.abs() < f64::EPSILON {
            0.0
        } else {
            (self.price - self.previous_price) / self.previous_price * 100.0
        }
    }

    /// Apply one bounded random-walk step
    ///
    /// The drift magnitude is bounded by volatility (scaled by the global
    /// knob) and the price is clamped above the floor.
    pub fn random_walk(&mut self, scale: f64, rng: &mut ChaCha8Rng) {
        self.previous_price = self.price;

        let drift = rng.gen_range(-1.0..1.0) * self.volatility * self.beta * scale;
        self.price = (self.price * (1.0 + drift)).max(PRICE_FLOOR);

        // Volume jitters around its current magnitude
        let volume_drift = rng.gen_range(-0.05..0.05);
        self.volume = ((self.volume as f64) * (1.0 + volume_drift)).max(0.0) as u64;

        self.day_high = self.day_high.max(self.price);
        self.day_low = self.day_low.min(self.price);
    }

    /// Shift the price directly (manipulation effect), respecting the floor
    pub fn apply_impact(&mut self, impact: f64) {
        self.previous_price = self.price;
        self.price = (self.price * (1.0 + impact)).max(PRICE_FLOOR);
        self.day_high = self.day_high.max(self.price);
        self.day_low = self.day_low.min(self.price);
    }

    /// Reset the daily aggregates at a trading-day boundary
    pub fn open_day(&mut self) {
        self.day_open = self.price;
        self.day_high = self.price;
        self.day_low = self.price;
    }

    /// Market value of a stake in whole currency units
    pub fn value_of(&self, shares: u64) -> Money {
        (self.price * shares as f64) as Money
    }
}
