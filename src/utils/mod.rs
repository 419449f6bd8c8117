//! Utility modules for the DSC engine.
//!
//! This module contains shared utilities used across the engine:
//! - Constants
//! - Identity and hashing primitives
//! - Fixed-point arithmetic
//! - Re-entrancy guard

pub mod constants;
pub mod crypto;
pub mod guard;
pub mod math;

pub use constants::*;
pub use crypto::*;
pub use guard::*;
pub use math::*;
