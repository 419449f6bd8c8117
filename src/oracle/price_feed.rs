//! Price feed data and an in-memory feed store.
//!
//! Feeds report a raw integer answer plus its decimal precision, in the
//! shape of a push-style aggregator round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::registry::FeedId;
use crate::error::{Error, Result};
use crate::oracle::PriceOracle;
use crate::utils::math::{format_units, scale_price};

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE DATA
// ═══════════════════════════════════════════════════════════════════════════════

/// One feed answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceData {
    /// Raw answer (e.g. 200000000000 = $2000 at 8 decimals)
    pub price: i128,
    /// Decimal precision of `price`
    pub decimals: u32,
    /// When the answer was recorded
    pub updated_at: DateTime<Utc>,
}

impl PriceData {
    /// Create a price point stamped now
    pub fn new(price: i128, decimals: u32) -> Self {
        Self::at(price, decimals, Utc::now())
    }

    /// Create a price point with an explicit timestamp
    pub fn at(price: i128, decimals: u32, updated_at: DateTime<Utc>) -> Self {
        Self {
            price,
            decimals,
            updated_at,
        }
    }

    /// Price rescaled to the 18-decimal working scale.
    ///
    /// Non-positive answers are rejected with [`Error::InvalidPrice`].
    pub fn to_wad(&self, feed: &FeedId) -> Result<u128> {
        if self.price <= 0 {
            return Err(Error::InvalidPrice {
                feed: feed.to_string(),
                price: self.price,
            });
        }
        scale_price(self.price as u128, self.decimals)
    }

    /// Seconds since the answer was recorded
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.updated_at).num_seconds()
    }

    /// Format price for display
    pub fn format_price(&self) -> String {
        match scale_price(self.price.max(0) as u128, self.decimals) {
            Ok(wad) => format!("${}", format_units(wad)),
            Err(_) => format!("{}e-{}", self.price, self.decimals),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATIC PRICE ORACLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Settable in-memory oracle keyed by feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticPriceOracle {
    feeds: HashMap<FeedId, PriceData>,
}

impl StaticPriceOracle {
    /// Create an oracle with no feeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new answer for `feed`, stamped now
    pub fn set_price(&mut self, feed: &FeedId, price: i128, decimals: u32) {
        self.feeds.insert(feed.clone(), PriceData::new(price, decimals));
    }

    /// Publish a full price point
    pub fn set_price_data(&mut self, feed: &FeedId, data: PriceData) {
        self.feeds.insert(feed.clone(), data);
    }

    /// Replace the answer of an existing feed keeping its decimals
    pub fn update_answer(&mut self, feed: &FeedId, price: i128) -> Result<()> {
        let data = self
            .feeds
            .get_mut(feed)
            .ok_or_else(|| Error::PriceUnavailable(feed.to_string()))?;
        *data = PriceData::new(price, data.decimals);
        Ok(())
    }

    /// Feeds with a published answer
    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }
}

impl PriceOracle for StaticPriceOracle {
    fn latest_price(&self, feed: &FeedId) -> Result<PriceData> {
        self.feeds
            .get(feed)
            .copied()
            .ok_or_else(|| Error::PriceUnavailable(feed.to_string()))
    }
}
