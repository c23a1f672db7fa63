#![forbid(unsafe_code)]

//! Fader Store
//!
//! Stateful layer over `fader-core`: the live scenario with history, drag
//! gestures, change notification, persistence, and the preset catalog.
//!
//! # Key Components
//!
//! - [`FaderStore`] - Owns the current [`Scenario`](fader_core::Scenario),
//!   applies operations, keeps a bounded undo ring, and drives listeners
//! - [`StorageBackend`] - Pluggable persistence ([`MemoryStorage`],
//!   [`FileStorage`])
//! - [`SavedScenario`] - Versioned, validated wire format
//! - [`presets::PRESETS`] - Built-in starting scenarios
//!
//! # How it fits in the system
//! `fader-store` sits between `fader-core` (pure transitions) and any
//! frontend. Frontends call its operations and re-render from the
//! notifications; nothing above this layer touches the engines directly.

pub mod persistence;
pub mod presets;
pub mod store;

pub use persistence::{
    FileStorage, MemoryStorage, SCHEMA_VERSION, SavedScenario, ScenarioError, ScenarioResult,
    StorageBackend,
};
pub use presets::{PRESETS, Preset, PresetEntity};
pub use store::{FaderStore, SubscriptionId, UNDO_CAPACITY};
