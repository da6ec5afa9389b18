//! Synthetic order-book depth and the market news feed
//!
//! Display data only: depth is generated from the current price and
//! carries no invariant beyond non-negative price and quantity.

use crate::core::types::Tick;
use crate::market::stock::Stock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of price levels generated per side
const DEPTH_LEVELS: usize = 5;

/// Price step between levels as a fraction of the current price
const LEVEL_STEP: f64 = 0.002;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookEntry {
    pub price: f64,
    pub quantity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: String,
    pub bids: Vec<OrderBookEntry>,
    pub asks: Vec<OrderBookEntry>,
}

impl OrderBook {
    /// Generate illustrative depth around the instrument's current price
    pub fn synthesize(stock: &Stock) -> Self {
        let per_level = (stock.volume / (DEPTH_LEVELS as u64 * 10)).max(1);

        let bids = (1..=DEPTH_LEVELS)
            .map(|i| OrderBookEntry {
                price: (stock.price * (1.0 - LEVEL_STEP * i as f64)).max(0.0),
                quantity: per_level * (DEPTH_LEVELS - i + 1) as u64,
            })
            .collect();

        let asks = (1..=DEPTH_LEVELS)
            .map(|i| OrderBookEntry {
                price: stock.price * (1.0 + LEVEL_STEP * i as f64),
                quantity: per_level * (DEPTH_LEVELS - i + 1) as u64,
            })
            .collect();

        Self {
            symbol: stock.symbol.clone(),
            bids,
            asks,
        }
    }
}

/// Direction a planted story pushes sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
}

/// A synthetic news item planted by a manipulation play
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub tick: Tick,
    pub symbol: String,
    pub headline: String,
    pub sentiment: Sentiment,
}

/// Bounded feed of recent market news
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsFeed {
    items: VecDeque<NewsItem>,
}

/// Oldest stories drop past this
const NEWS_CAP: usize = 50;

impl NewsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: NewsItem) {
        self.items.push_back(item);
        while self.items.len() > NEWS_CAP {
            self.items.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NewsItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn latest(&self, n: usize) -> impl Iterator<Item = &NewsItem> {
        self.items.iter().rev().take(n)
    }
}
