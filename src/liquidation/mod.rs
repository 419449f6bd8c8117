//! Liquidation module.
//!
//! Third-party repayment of under-margined accounts in exchange for a
//! bonus-inflated share of their collateral.

pub mod engine;

pub use engine::*;
