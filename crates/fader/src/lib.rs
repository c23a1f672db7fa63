#![forbid(unsafe_code)]

//! Fader public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from the internal crates and offers a
//! lightweight prelude for day-to-day usage.
//!
//! # Example
//!
//! ```
//! use fader::prelude::*;
//!
//! let mut store = FaderStore::new();
//! store.toggle_lock(0);
//! store.set_value(1, 50.0);
//! assert!(store.scenario().is_balanced());
//! ```

// --- Core re-exports -------------------------------------------------------

pub use fader_core::{
    DEFAULT_PALETTE, DEFAULT_TOTAL, DistributionPolicy, MAX_ENTITIES, MIN_ENTITIES, PoolState,
    Scenario, hamilton_round,
};

// --- Store re-exports ------------------------------------------------------

#[cfg(feature = "store")]
pub use fader_store::{
    FaderStore, FileStorage, MemoryStorage, PRESETS, Preset, PresetEntity, SCHEMA_VERSION,
    SavedScenario, ScenarioError, ScenarioResult, StorageBackend, SubscriptionId, UNDO_CAPACITY,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{DistributionPolicy, PoolState, Scenario};

    #[cfg(feature = "store")]
    pub use crate::{FaderStore, MemoryStorage, StorageBackend};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn facade_surface_is_usable() {
        let mut store = FaderStore::new();
        store.set_value(0, 55.0);
        assert!(store.scenario().is_balanced());

        let pool = PoolState::new(3, 100).distribute_pool(DistributionPolicy::Equal);
        assert!(pool.is_balanced());
    }
}
