//! Oracle module for price feeds.
//!
//! The engine reads prices through [`PriceOracle`] only. Freshness is the
//! oracle's responsibility; [`StalenessGuard`] adds a timeout on top of any
//! implementation.

pub mod price_feed;
pub mod staleness;

pub use price_feed::*;
pub use staleness::*;

use crate::core::registry::FeedId;
use crate::error::Result;

/// Source of USD prices per feed
pub trait PriceOracle {
    /// Latest answer of `feed`; fails if no price is available
    fn latest_price(&self, feed: &FeedId) -> Result<PriceData>;
}
