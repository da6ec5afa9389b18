//! Stock market: instruments, manipulation plays, synthetic depth
//!
//! Pure economic state with no dependency on the rest of the world model.
//! All probabilistic outcomes draw from an injected RNG so tests can pin
//! them down.

pub mod manipulation;
pub mod order_book;
pub mod stock;

pub use manipulation::{
    catalog, spec, ActiveManipulation, ManipulationKind, ManipulationOutcome, ManipulationSpec,
    RiskTier,
};
pub use order_book::{NewsFeed, NewsItem, OrderBook, OrderBookEntry, Sentiment};
pub use stock::Stock;

use crate::core::error::{MagnateError, Result};
use crate::core::types::{CompanyId, Tick};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The whole market: listings, in-flight manipulations, news
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMarket {
    pub stocks: Vec<Stock>,
    pub active: Vec<ActiveManipulation>,
    pub news: NewsFeed,
}

/// Seed listings for the default scenario
const DEFAULT_LISTINGS: [(&str, &str, f64, u64, f64, f64); 6] = [
    ("KST", "Kestrel Group", 84.0, 120_000, 0.012, 1.1),
    ("NBC", "Northbridge Capital", 132.0, 90_000, 0.008, 0.8),
    ("VLT", "Volt Industries", 45.0, 250_000, 0.020, 1.4),
    ("HRB", "Harbor & Sons", 28.0, 310_000, 0.015, 1.0),
    ("ORM", "Orme Logistics", 61.0, 180_000, 0.010, 0.9),
    ("SXM", "Saxum Mining", 19.0, 400_000, 0.025, 1.6),
];

impl StockMarket {
    pub fn new(stocks: Vec<Stock>) -> Self {
        Self {
            stocks,
            active: Vec::new(),
            news: NewsFeed::new(),
        }
    }

    /// Seed the default listings, jittering opening prices slightly so
    /// runs with different seeds do not all open identically
    pub fn with_default_listings(rng: &mut ChaCha8Rng) -> Self {
        let stocks = DEFAULT_LISTINGS
            .iter()
            .map(|(symbol, name, price, volume, volatility, beta)| {
                let jitter = rng.gen_range(0.95..1.05);
                Stock::new(*symbol, *name, price * jitter, *volume)
                    .with_dynamics(*volatility, *beta)
            })
            .collect();
        Self::new(stocks)
    }

    pub fn stock(&self, symbol: &str) -> Option<&Stock> {
        self.stocks
            .iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn stock_mut(&mut self, symbol: &str) -> Option<&mut Stock> {
        self.stocks
            .iter_mut()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Execute one manipulation play against an instrument
    ///
    /// Draws success and detection independently. Detection dominates:
    /// a detected play never moves the market and costs double. A quiet
    /// failure costs half. Only a quiet success applies the effect and
    /// registers an active-manipulation record.
    pub fn execute_manipulation(
        &mut self,
        company: CompanyId,
        symbol: &str,
        kind: ManipulationKind,
        tick: Tick,
        rng: &mut ChaCha8Rng,
    ) -> Result<ManipulationOutcome> {
        let entry = spec(kind);

        let stock = self
            .stock_mut(symbol)
            .ok_or_else(|| MagnateError::UnknownInstrument(symbol.into()))?;

        let succeeded = rng.gen_bool(entry.success_rate);
        let detected = rng.gen_bool(entry.detection_risk);

        if detected {
            return Ok(ManipulationOutcome {
                success: false,
                detected: true,
                cost: entry.cost * 2,
            });
        }

        if !succeeded {
            return Ok(ManipulationOutcome {
                success: false,
                detected: false,
                cost: entry.cost / 2,
            });
        }

        if entry.is_volume_play() {
            let boost = 1.0 + entry.impact * 10.0;
            stock.volume = ((stock.volume as f64) * boost) as u64;
        } else {
            stock.apply_impact(entry.impact);
        }

        let symbol_owned = stock.symbol.clone();
        if entry.plants_news() {
            let sentiment = if entry.impact >= 0.0 {
                Sentiment::Bullish
            } else {
                Sentiment::Bearish
            };
            self.news.push(NewsItem {
                tick,
                symbol: symbol_owned.clone(),
                headline: plant_headline(&symbol_owned, sentiment, rng),
                sentiment,
            });
        }

        self.active.push(ActiveManipulation {
            company,
            symbol: symbol_owned,
            kind,
            started_at: tick,
            expires_at: tick + entry.duration_ticks,
        });

        Ok(ManipulationOutcome {
            success: true,
            detected: false,
            cost: entry.cost,
        })
    }

    /// Advance the market one tick: random walks on every listing, day
    /// boundary handling, expiry of stale manipulation records
    pub fn update(&mut self, tick: Tick, volatility_scale: f64, day_ticks: Tick, rng: &mut ChaCha8Rng) {
        let new_day = day_ticks > 0 && tick % day_ticks == 0 && tick > 0;
        for stock in &mut self.stocks {
            if new_day {
                stock.open_day();
            }
            stock.random_walk(volatility_scale, rng);
        }

        self.active.retain(|m| m.expires_at > tick);
    }

    /// Illustrative depth for one instrument
    pub fn order_book(&self, symbol: &str) -> Option<OrderBook> {
        self.stock(symbol).map(OrderBook::synthesize)
    }

    /// Manipulations currently distorting an instrument
    pub fn active_on<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a ActiveManipulation> + 'a {
        self.active
            .iter()
            .filter(move |m| m.symbol.eq_ignore_ascii_case(symbol))
    }
}

/// Headline templates for planted stories
fn plant_headline(symbol: &str, sentiment: Sentiment, rng: &mut ChaCha8Rng) -> String {
    let bullish = [
        "{} said to be nearing a major contract",
        "Sources: {} quarterly numbers will beat estimates",
        "{} rumored takeover target at a premium",
    ];
    let bearish = [
        "Questions raised over {} accounting practices",
        "{} said to face surprise regulatory review",
        "Key customer reportedly leaving {}",
    ];
    let pool = match sentiment {
        Sentiment::Bullish => &bullish,
        Sentiment::Bearish => &bearish,
    };
    let template = pool[rng.gen_range(0..pool.len())];
    template.replace("{}", symbol)
}
