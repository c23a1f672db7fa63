#![forbid(unsafe_code)]

//! Fader Core
//!
//! Pure allocation logic for a bank of faders that always sum to a fixed
//! integer budget. No I/O, no UI: just deterministic state transitions over
//! immutable snapshots.
//!
//! # Key Components
//!
//! - [`Scenario`] - One snapshot of the bank (values, locks, labels, colors)
//! - [`DistributionPolicy`] - How amounts spread across eligible entities
//! - [`rounding::hamilton_round`] - Largest-remainder integer apportionment
//! - [`direct::rebalance`] - The direct-sum engine: set one value, rebalance
//!   the rest so the sum stays exact
//! - [`PoolState`] - The alternative pool engine with real-valued shares and
//!   an uncommitted-budget pool
//! - [`lifecycle::equal_split`] - Budget re-split on entity add/remove
//!
//! # How it fits in the system
//! `fader-core` is the bottom layer. `fader-store` wraps it with history,
//! drag gestures, persistence, and presets; any frontend sits above that.

pub mod direct;
pub mod lifecycle;
pub mod model;
pub mod pool;
pub mod rounding;

pub use model::{
    DEFAULT_PALETTE, DEFAULT_TOTAL, DistributionPolicy, MAX_ENTITIES, MIN_ENTITIES, Scenario,
};
pub use pool::PoolState;
pub use rounding::hamilton_round;
