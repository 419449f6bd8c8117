//! Core modules of the engine.
//!
//! This module contains the fundamental building blocks:
//! - Collateral registry and account ledger
//! - Engine parameters and configuration
//! - Collaborator interfaces with in-memory implementations
//! - The engine itself

pub mod balances;
pub mod collateral;
pub mod config;
pub mod engine;
pub mod journal;
pub mod ledger;
pub mod registry;
pub mod token;

pub use balances::*;
pub use collateral::*;
pub use config::*;
pub use engine::*;
pub use journal::*;
pub use ledger::*;
pub use registry::*;
pub use token::*;
