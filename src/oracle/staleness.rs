//! Staleness check around any price oracle.
//!
//! A feed that has not updated within `max_age` is treated as broken and every
//! read fails with [`Error::StalePrice`]. That freezes every operation that
//! needs a valuation until the feed recovers.

use chrono::{DateTime, Duration, Utc};

use crate::core::registry::FeedId;
use crate::error::{Error, Result};
use crate::oracle::{PriceData, PriceOracle};
use crate::utils::constants::PRICE_TIMEOUT_SECS;

/// Oracle wrapper rejecting answers older than `max_age`
#[derive(Debug, Clone)]
pub struct StalenessGuard<O> {
    inner: O,
    max_age: Duration,
}

impl<O: PriceOracle> StalenessGuard<O> {
    /// Wrap with the default 3 hour timeout
    pub fn new(inner: O) -> Self {
        Self::with_max_age(inner, Duration::seconds(PRICE_TIMEOUT_SECS))
    }

    /// Wrap with a custom timeout
    pub fn with_max_age(inner: O, max_age: Duration) -> Self {
        Self { inner, max_age }
    }

    /// Configured timeout
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Wrapped oracle
    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Wrapped oracle, mutable (for publishing answers)
    pub fn inner_mut(&mut self) -> &mut O {
        &mut self.inner
    }

    /// Read `feed` and check its age against `now`
    pub fn latest_price_at(&self, feed: &FeedId, now: DateTime<Utc>) -> Result<PriceData> {
        let data = self.inner.latest_price(feed)?;
        let age = now - data.updated_at;
        if age > self.max_age {
            tracing::warn!(feed = %feed, age_secs = age.num_seconds(), "stale price rejected");
            return Err(Error::StalePrice {
                age_secs: age.num_seconds(),
                max_age_secs: self.max_age.num_seconds(),
            });
        }
        Ok(data)
    }
}

impl<O: PriceOracle> PriceOracle for StalenessGuard<O> {
    fn latest_price(&self, feed: &FeedId) -> Result<PriceData> {
        self.latest_price_at(feed, Utc::now())
    }
}
