//! Approved collateral registry.
//!
//! Fixed at construction: an ordered set of collateral assets, each bound to
//! the price feed that values it. There is no add/remove after that.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTIFIERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Opaque identifier of a collateral asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Create a new asset identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a price feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(String);

impl FeedId {
    /// Create a new feed identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeedId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered mapping of approved collateral asset to its price feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralRegistry {
    /// Approved assets in insertion order
    assets: Vec<AssetId>,
    /// Price feed per asset
    feeds: HashMap<AssetId, FeedId>,
}

impl CollateralRegistry {
    /// Build from parallel lists of assets and feeds.
    ///
    /// Fails with [`Error::InvalidConfiguration`] when the lists differ in
    /// length or an asset appears twice.
    pub fn new(assets: Vec<AssetId>, feeds: Vec<FeedId>) -> Result<Self> {
        if assets.len() != feeds.len() {
            return Err(Error::InvalidConfiguration(format!(
                "{} collateral assets but {} price feeds",
                assets.len(),
                feeds.len()
            )));
        }

        let mut map = HashMap::with_capacity(assets.len());
        for (asset, feed) in assets.iter().zip(feeds) {
            if map.insert(asset.clone(), feed).is_some() {
                return Err(Error::InvalidConfiguration(format!(
                    "collateral asset {} listed twice",
                    asset
                )));
            }
        }

        Ok(Self { assets, feeds: map })
    }

    /// Whether the asset is approved
    pub fn is_approved(&self, asset: &AssetId) -> bool {
        self.feeds.contains_key(asset)
    }

    /// Fail with [`Error::UnapprovedAsset`] unless the asset is approved
    pub fn ensure_approved(&self, asset: &AssetId) -> Result<()> {
        if self.is_approved(asset) {
            Ok(())
        } else {
            Err(Error::UnapprovedAsset(asset.to_string()))
        }
    }

    /// Price feed of an approved asset
    pub fn price_feed(&self, asset: &AssetId) -> Result<&FeedId> {
        self.feeds
            .get(asset)
            .ok_or_else(|| Error::UnapprovedAsset(asset.to_string()))
    }

    /// Approved assets in insertion order
    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }

    /// (asset, feed) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &FeedId)> + '_ {
        self.assets.iter().map(move |a| (a, &self.feeds[a]))
    }

    /// Number of approved assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether no asset is approved
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
