//! Protocol constants and magic numbers.
//!
//! All protocol-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// FIXED-POINT SCALES
// ═══════════════════════════════════════════════════════════════════════════════

/// Working-scale decimals for every monetary quantity
pub const WAD_DECIMALS: u32 = 18;

/// Working scale: 1.0 == 10^18
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Decimals typically reported by USD price feeds
pub const FEED_DECIMALS: u32 = 8;

/// Largest price-feed decimal count the engine accepts
pub const MAX_FEED_DECIMALS: u32 = 36;

// ═══════════════════════════════════════════════════════════════════════════════
// RISK PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Share of collateral value counted toward the health factor - 50%
/// (i.e. positions must be 200% over-collateralized)
pub const LIQUIDATION_THRESHOLD: u128 = 50;

/// Liquidator incentive on top of the covered debt - 10%
pub const LIQUIDATION_BONUS: u128 = 10;

/// Denominator for threshold and bonus
pub const LIQUIDATION_PRECISION: u128 = 100;

/// Minimum health factor (1.0 at working scale)
pub const MIN_HEALTH_FACTOR: u128 = PRECISION;

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum price staleness in seconds (3 hours)
pub const PRICE_TIMEOUT_SECS: i64 = 3 * 60 * 60;

// ═══════════════════════════════════════════════════════════════════════════════
// STABLE UNIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Stable unit name
pub const STABLE_NAME: &str = "Decentralized Stable Coin";

/// Stable unit symbol
pub const STABLE_SYMBOL: &str = "DSC";

/// Stable unit decimals (matches the working scale)
pub const STABLE_DECIMALS: u8 = 18;

// ═══════════════════════════════════════════════════════════════════════════════
// ENCODING
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of an account address in bytes
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a hash in bytes (SHA256)
pub const HASH_LENGTH: usize = 32;
