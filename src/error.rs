//! Error types for the DSC engine.
//!
//! Every failure the engine can report is a variant of [`Error`]. Failures are
//! synchronous and leave the ledger exactly as it was before the call.

use thiserror::Error;

use crate::core::token::TokenError;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the DSC engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Construction input is inconsistent (e.g. asset and feed lists differ in length)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid input parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Asset is not in the approved collateral registry
    #[error("Asset {0} is not an approved collateral")]
    UnapprovedAsset(String),

    /// Amount must be strictly positive
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    // ═══════════════════════════════════════════════════════════════════
    // Position Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Redeem or burn exceeds the recorded balance
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Requested amount
        requested: u128,
        /// Recorded balance
        available: u128,
    },

    /// Operation would leave the acting account under-margined
    #[error("Health factor broken: {0}")]
    HealthFactorBroken(u128),

    /// Health factor evaluated numerically for an account with no debt
    #[error("Health factor is undefined for zero debt")]
    UndefinedHealthFactor,

    // ═══════════════════════════════════════════════════════════════════
    // Liquidation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Liquidation attempted on a healthy account
    #[error("Health factor is OK, account cannot be liquidated")]
    HealthFactorOk,

    /// Liquidation did not strictly improve the target's health factor
    #[error("Health factor not improved by liquidation")]
    HealthFactorNotImproved,

    /// Target does not hold enough of the asset to pay out debt plus bonus.
    /// This is how an insolvent (<= 100% collateralized) position surfaces.
    #[error("Liquidation underwater: requires {required} collateral, target holds {available}")]
    LiquidationUnderwater {
        /// Base plus bonus collateral amount
        required: u128,
        /// Collateral the target holds in that asset
        available: u128,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Oracle Errors
    // ═══════════════════════════════════════════════════════════════════

    /// No price available for the feed
    #[error("Price unavailable for feed {0}")]
    PriceUnavailable(String),

    /// Feed reported a non-positive price
    #[error("Invalid price {price} from feed {feed}")]
    InvalidPrice {
        /// Feed identifier
        feed: String,
        /// Reported price
        price: i128,
    },

    /// Price is older than the allowed maximum age
    #[error("Price is stale: last update {age_secs}s ago, max allowed {max_age_secs}s")]
    StalePrice {
        /// Seconds since last update
        age_secs: i64,
        /// Maximum allowed age in seconds
        max_age_secs: i64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Collaborator Errors
    // ═══════════════════════════════════════════════════════════════════

    /// An asset or stable-unit transfer reported failure
    #[error("Transfer of {asset} failed")]
    TransferFailed {
        /// Asset (or stable unit symbol) being moved
        asset: String,
    },

    /// Stable-unit ledger refused to mint
    #[error("Stable unit mint failed")]
    MintFailed,

    /// Stable-unit ledger rejected a burn
    #[error("Stable unit rejected operation: {0}")]
    StableUnitRejected(#[from] TokenError),

    /// A mutating entry point was invoked while another one is in progress
    #[error("Reentrant call rejected")]
    Reentrancy,

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Returns true if the caller may succeed by resubmitting after state or
    /// price changes
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InsufficientBalance { .. }
                | Error::HealthFactorBroken(_)
                | Error::HealthFactorOk
                | Error::HealthFactorNotImproved
                | Error::StalePrice { .. }
                | Error::PriceUnavailable(_)
                | Error::TransferFailed { .. }
                | Error::Reentrancy
        )
    }

    /// Returns true if this error points at a bug or a broken deployment
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfiguration(_) | Error::Overflow { .. } | Error::MintFailed
        )
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Configuration errors: 1xxx
            Error::InvalidConfiguration(_) => 1001,
            Error::InvalidParameter { .. } => 1002,

            // Validation errors: 2xxx
            Error::UnapprovedAsset(_) => 2001,
            Error::NonPositiveAmount => 2002,

            // Position errors: 3xxx
            Error::InsufficientBalance { .. } => 3001,
            Error::HealthFactorBroken(_) => 3002,
            Error::UndefinedHealthFactor => 3003,

            // Liquidation errors: 4xxx
            Error::HealthFactorOk => 4001,
            Error::HealthFactorNotImproved => 4002,
            Error::LiquidationUnderwater { .. } => 4003,

            // Oracle errors: 5xxx
            Error::PriceUnavailable(_) => 5001,
            Error::InvalidPrice { .. } => 5002,
            Error::StalePrice { .. } => 5003,

            // Collaborator errors: 6xxx
            Error::TransferFailed { .. } => 6001,
            Error::MintFailed => 6002,
            Error::StableUnitRejected(_) => 6003,
            Error::Reentrancy => 6004,

            // Internal errors: 9xxx
            Error::Overflow { .. } => 9001,
            Error::Serialization(_) => 9002,
            Error::Deserialization(_) => 9003,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_unique() {
        let codes = vec![
            Error::InvalidConfiguration("".into()).code(),
            Error::InvalidParameter { name: "".into(), reason: "".into() }.code(),
            Error::UnapprovedAsset("".into()).code(),
            Error::NonPositiveAmount.code(),
            Error::InsufficientBalance { requested: 0, available: 0 }.code(),
            Error::HealthFactorBroken(0).code(),
            Error::UndefinedHealthFactor.code(),
            Error::HealthFactorOk.code(),
            Error::HealthFactorNotImproved.code(),
            Error::LiquidationUnderwater { required: 0, available: 0 }.code(),
            Error::PriceUnavailable("".into()).code(),
            Error::InvalidPrice { feed: "".into(), price: 0 }.code(),
            Error::StalePrice { age_secs: 0, max_age_secs: 0 }.code(),
            Error::TransferFailed { asset: "".into() }.code(),
            Error::MintFailed.code(),
            Error::StableUnitRejected(TokenError::ZeroAmount).code(),
            Error::Reentrancy.code(),
            Error::Overflow { operation: "".into() }.code(),
            Error::Serialization("".into()).code(),
            Error::Deserialization("".into()).code(),
        ];

        let mut unique_codes = codes.clone();
        unique_codes.sort();
        unique_codes.dedup();

        assert_eq!(codes.len(), unique_codes.len(), "Error codes must be unique");
    }

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientBalance {
            requested: 1000,
            available: 500,
        };
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("500"));
        assert!(Error::HealthFactorBroken(42).to_string().contains("42"));
    }

    #[test]
    fn test_token_error_converts() {
        let err: Error = TokenError::ZeroAmount.into();
        assert_eq!(err, Error::StableUnitRejected(TokenError::ZeroAmount));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::HealthFactorBroken(1).is_recoverable());
        assert!(!Error::NonPositiveAmount.is_recoverable());
        assert!(!Error::InvalidConfiguration("x".into()).is_recoverable());
    }

    #[test]
    fn test_is_critical() {
        assert!(Error::Overflow { operation: "test".into() }.is_critical());
        assert!(!Error::HealthFactorOk.is_critical());
    }
}
