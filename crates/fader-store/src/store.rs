#![forbid(unsafe_code)]

//! The live scenario store: history, drag gestures, and change notification.
//!
//! [`FaderStore`] owns the current [`Scenario`] snapshot and applies the
//! core operations to it. Because every core operation is copy-on-write,
//! the store gets undo and drag-cancel for free by retaining prior
//! snapshots.
//!
//! # Drag Gestures
//!
//! A slider drag is a burst of value edits that should rebalance against
//! the values as they were when the gesture began, not against each
//! intermediate frame (otherwise the weights drift toward whatever the
//! last frame produced). [`FaderStore::start_drag`] captures that baseline;
//! every [`FaderStore::set_value`] during the gesture rebalances against
//! it; [`FaderStore::end_drag`] commits and [`FaderStore::cancel_drag`]
//! restores the pre-gesture snapshot.
//!
//! # History
//!
//! Committed operations push the prior snapshot onto a bounded ring; a
//! whole drag counts as one history entry regardless of how many frames
//! it produced. When the ring is full the oldest entry is dropped.

use crate::persistence::{SavedScenario, ScenarioResult, StorageBackend};
use crate::presets;
use fader_core::Scenario;
use std::collections::{HashMap, VecDeque};

/// Maximum retained undo snapshots; beyond this the oldest are dropped.
pub const UNDO_CAPACITY: usize = 64;

/// Handle returned by [`FaderStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&Scenario) + Send>;

/// Owns the live scenario and its edit history.
pub struct FaderStore {
    scenario: Scenario,
    /// Drag-start values; `Some` while a gesture is active.
    baseline: Option<Vec<u32>>,
    /// Snapshot taken at `start_drag`, restored by `cancel_drag`.
    drag_origin: Option<Scenario>,
    history: VecDeque<Scenario>,
    listeners: HashMap<u64, Listener>,
    next_listener_id: u64,
}

impl Default for FaderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FaderStore {
    /// A store holding the default four-entity scenario.
    #[must_use]
    pub fn new() -> Self {
        Self::from_scenario(Scenario::default())
    }

    /// A store holding a specific starting scenario.
    #[must_use]
    pub fn from_scenario(scenario: Scenario) -> Self {
        Self {
            scenario,
            baseline: None,
            drag_origin: None,
            history: VecDeque::new(),
            listeners: HashMap::new(),
            next_listener_id: 0,
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Whether a drag gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.baseline.is_some()
    }

    /// Number of undoable history entries.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ── Subscription ──────────────────────────────────────────────

    /// Register a listener called after every committed change.
    pub fn subscribe(&mut self, listener: impl Fn(&Scenario) + Send + 'static) -> SubscriptionId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.insert(id, Box::new(listener));
        SubscriptionId(id)
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.remove(&id.0);
    }

    fn notify(&self) {
        for listener in self.listeners.values() {
            listener(&self.scenario);
        }
    }

    // ── Drag lifecycle ────────────────────────────────────────────

    /// Begin a drag gesture, capturing the rebalance baseline.
    ///
    /// Starting a new drag while one is active commits the old one first.
    pub fn start_drag(&mut self) {
        if self.baseline.is_some() {
            self.end_drag();
        }
        tracing::debug!("drag start");
        self.baseline = Some(self.scenario.values.clone());
        self.drag_origin = Some(self.scenario.clone());
    }

    /// Commit the current drag gesture as one history entry.
    ///
    /// A no-op when no gesture is active.
    pub fn end_drag(&mut self) {
        self.baseline = None;
        if let Some(origin) = self.drag_origin.take() {
            tracing::debug!("drag end");
            if origin != self.scenario {
                self.push_history(origin);
            }
        }
    }

    /// Abandon the current drag gesture, restoring the pre-drag snapshot.
    ///
    /// A no-op when no gesture is active.
    pub fn cancel_drag(&mut self) {
        self.baseline = None;
        if let Some(origin) = self.drag_origin.take() {
            tracing::debug!("drag cancel");
            self.scenario = origin;
            self.notify();
        }
    }

    // ── Operations ────────────────────────────────────────────────

    /// Set one entity's value, rebalancing the rest.
    ///
    /// During a drag the rebalance weights come from the gesture baseline;
    /// outside one, each call commits as its own history entry.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_value(&mut self, index: usize, proposed: f64) {
        let next = self
            .scenario
            .set_value(index, proposed, self.baseline.as_deref());
        if self.baseline.is_some() {
            // Mid-gesture frame: no history entry of its own.
            self.scenario = next;
            self.notify();
        } else {
            self.commit(next);
        }
        tracing::debug!(index, proposed, "set value");
    }

    /// Flip one entity's lock flag.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn toggle_lock(&mut self, index: usize) {
        tracing::debug!(index, "toggle lock");
        let next = self.scenario.toggle_lock(index);
        self.commit(next);
    }

    /// Add an entity and re-split. No-op at capacity.
    ///
    /// Commits any in-flight drag first: the gesture baseline has the old
    /// entity count and cannot survive the resize.
    pub fn add_entity(&mut self) {
        tracing::debug!("add entity");
        self.end_drag();
        let next = self.scenario.add_entity();
        self.commit(next);
    }

    /// Remove an entity and re-split. No-op at the minimum count.
    ///
    /// Commits any in-flight drag first, as [`FaderStore::add_entity`] does.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn remove_entity(&mut self, index: usize) {
        tracing::debug!(index, "remove entity");
        self.end_drag();
        let next = self.scenario.remove_entity(index);
        self.commit(next);
    }

    /// Rename one entity.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn update_label(&mut self, index: usize, label: impl Into<String>) {
        let next = self.scenario.with_label(index, label);
        self.commit(next);
    }

    /// Recolor one entity.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn update_color(&mut self, index: usize, color: impl Into<String>) {
        let next = self.scenario.with_color(index, color);
        self.commit(next);
    }

    /// Change the bank's unit label.
    pub fn set_unit(&mut self, unit: impl Into<String>) {
        let mut next = self.scenario.clone();
        next.unit = unit.into();
        self.commit(next);
    }

    /// Replace the scenario with a preset from the catalog, committing any
    /// in-flight drag first.
    ///
    /// Returns `false` (and changes nothing, gesture included) for an
    /// unknown id.
    pub fn load_preset(&mut self, id: &str) -> bool {
        match presets::find(id) {
            Some(preset) => {
                tracing::debug!(id, "load preset");
                self.end_drag();
                let next = preset.to_scenario();
                self.commit(next);
                true
            }
            None => {
                tracing::warn!(id, "unknown preset");
                false
            }
        }
    }

    /// Replace the scenario with the default equal split, committing any
    /// in-flight drag first.
    pub fn reset(&mut self) {
        tracing::debug!("reset");
        self.end_drag();
        let next = Scenario::default();
        self.commit(next);
    }

    /// Roll back to the previous snapshot. Returns `false` when the
    /// history is empty.
    pub fn undo(&mut self) -> bool {
        // Undo during a gesture would fight the baseline; drop it first.
        self.baseline = None;
        self.drag_origin = None;
        match self.history.pop_back() {
            Some(prev) => {
                tracing::debug!("undo");
                self.scenario = prev;
                self.notify();
                true
            }
            None => false,
        }
    }

    // ── Persistence ───────────────────────────────────────────────

    /// Save the current scenario through a storage backend.
    pub fn save(&self, backend: &dyn StorageBackend) -> ScenarioResult<()> {
        backend.save(&SavedScenario::from_scenario(&self.scenario))
    }

    /// Load a scenario from a storage backend, replacing the current one
    /// and committing any in-flight drag first.
    ///
    /// Returns `Ok(false)` when nothing is stored. Invalid stored data is
    /// an error and leaves the current scenario (and gesture) untouched.
    pub fn load(&mut self, backend: &dyn StorageBackend) -> ScenarioResult<bool> {
        match backend.load()? {
            Some(saved) => {
                let next = saved.into_scenario()?;
                tracing::debug!(backend = backend.name(), "loaded scenario");
                self.end_drag();
                self.commit(next);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ── Internals ─────────────────────────────────────────────────

    /// Commit a snapshot: record history, swap it in, notify. Unchanged
    /// snapshots are dropped without a history entry.
    fn commit(&mut self, next: Scenario) {
        if next == self.scenario {
            return;
        }
        let prev = std::mem::replace(&mut self.scenario, next);
        self.push_history(prev);
        self.notify();
    }

    fn push_history(&mut self, snapshot: Scenario) {
        if self.history.len() == UNDO_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }
}

impl std::fmt::Debug for FaderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaderStore")
            .field("scenario", &self.scenario)
            .field("dragging", &self.baseline.is_some())
            .field("history", &self.history.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
