//! Protocol module - observable engine events.
//!
//! The engine appends an event for every collateral movement. The log is an
//! ordered, append-only, hash-chained audit trail.

pub mod events;

pub use events::*;
