//! # DSC Engine
//!
//! Ledger and risk engine for an over-collateralized synthetic dollar (DSC).
//! Accounts deposit approved collateral, mint DSC against it, repay and
//! withdraw, and can be liquidated by any third party once their health
//! factor drops below the minimum.
//!
//! ## Architecture
//!
//! - **Core**: Registry, account ledger, configuration and the engine
//! - **Oracle**: Price oracle interface, in-memory feeds and a staleness guard
//! - **Liquidation**: Liquidation sizing and execution
//! - **Protocol**: Append-only, hash-chained event log
//! - **CLI**: Scenario files and output for the `dsc` binary
//!
//! Every mutating operation is atomic: on failure the ledger, the event log
//! and both token collaborators are restored to their state before the call.
//!
//! ## Example
//!
//! ```rust,ignore
//! use dsc_engine::prelude::*;
//!
//! let mut engine = DscEngine::new(&config, oracle, bank, StableToken::new(custody))?;
//! engine.deposit_collateral_and_mint(&user, &"WETH".into(), parse_units("10")?, parse_units("100")?)?;
//! assert!(engine.health_factor(&user)? >= HealthFactor::Finite(MIN_HEALTH_FACTOR));
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod cli;
pub mod core;
pub mod error;
pub mod liquidation;
pub mod oracle;
pub mod protocol;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        collateral::{AssetTransfer, CollateralBank},
        config::{EngineConfig, EngineParams},
        engine::{AccountInfo, DscEngine, HealthFactor, PositionStatus},
        journal::Journaled,
        ledger::AccountLedger,
        registry::{AssetId, CollateralRegistry, FeedId},
        token::{StableToken, StableUnitLedger, TokenError},
    };
    pub use crate::error::{Error, Result};
    pub use crate::liquidation::engine::{LiquidationOutcome, LiquidationQuote};
    pub use crate::oracle::{PriceData, PriceOracle, StalenessGuard, StaticPriceOracle};
    pub use crate::protocol::events::{EngineEvent, EventLog, EventRecord};
    pub use crate::utils::{
        constants::{MIN_HEALTH_FACTOR, PRECISION},
        crypto::{Address, Hash},
        math::{format_units, parse_units},
    };
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name
pub const PROTOCOL_NAME: &str = "DSC";
