//! Property-based invariant tests for the scenario store.
//!
//! These tests verify structural invariants that must hold for any valid inputs:
//!
//! 1. The scenario stays balanced after every operation.
//! 2. Entity count stays within bounds; all entity arrays keep equal lengths.
//! 3. The undo ring never exceeds its capacity.
//! 4. No panics on arbitrary operation sequences, drag gestures and entity
//!    count changes interleaved.
//! 5. Locked entities survive edits to other entities.
//! 6. Undo restores exactly the previous committed snapshot.
//! 7. Determinism: two stores fed the same sequence end in the same state.

use fader_core::{MAX_ENTITIES, MIN_ENTITIES};
use fader_store::{FaderStore, PRESETS, UNDO_CAPACITY};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

/// One step of a store fuzz sequence. Indices are taken modulo the live
/// entity count when applied.
#[derive(Debug, Clone)]
enum StoreOp {
    SetValue(usize, f64),
    ToggleLock(usize),
    AddEntity,
    RemoveEntity(usize),
    UpdateLabel(usize),
    SetUnit(u8),
    StartDrag,
    EndDrag,
    CancelDrag,
    Undo,
    LoadPreset(usize),
    Reset,
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        4 => (0usize..MAX_ENTITIES, -20.0f64..140.0).prop_map(|(i, v)| StoreOp::SetValue(i, v)),
        2 => (0usize..MAX_ENTITIES).prop_map(StoreOp::ToggleLock),
        2 => Just(StoreOp::AddEntity),
        2 => (0usize..MAX_ENTITIES).prop_map(StoreOp::RemoveEntity),
        1 => (0usize..MAX_ENTITIES).prop_map(StoreOp::UpdateLabel),
        1 => any::<u8>().prop_map(StoreOp::SetUnit),
        2 => Just(StoreOp::StartDrag),
        2 => Just(StoreOp::EndDrag),
        1 => Just(StoreOp::CancelDrag),
        2 => Just(StoreOp::Undo),
        1 => (0usize..PRESETS.len()).prop_map(StoreOp::LoadPreset),
        1 => Just(StoreOp::Reset),
    ]
}

fn apply(store: &mut FaderStore, op: &StoreOp) {
    let len = store.scenario().len();
    match *op {
        StoreOp::SetValue(i, v) => store.set_value(i % len, v),
        StoreOp::ToggleLock(i) => store.toggle_lock(i % len),
        StoreOp::AddEntity => store.add_entity(),
        StoreOp::RemoveEntity(i) => store.remove_entity(i % len),
        StoreOp::UpdateLabel(i) => store.update_label(i % len, "Renamed"),
        StoreOp::SetUnit(tag) => store.set_unit(format!("Unit {tag}")),
        StoreOp::StartDrag => store.start_drag(),
        StoreOp::EndDrag => store.end_drag(),
        StoreOp::CancelDrag => store.cancel_drag(),
        StoreOp::Undo => {
            store.undo();
        }
        StoreOp::LoadPreset(i) => {
            store.load_preset(PRESETS[i % PRESETS.len()].id);
        }
        StoreOp::Reset => store.reset(),
    }
}

// ── Invariants over operation sequences (1–4) ─────────────────────────────

proptest! {
    #[test]
    fn operation_sequences_keep_invariants(
        ops in proptest::collection::vec(store_op_strategy(), 1..80),
    ) {
        let mut store = FaderStore::new();
        for op in &ops {
            apply(&mut store, op);
            let s = store.scenario();
            prop_assert!(s.is_balanced(), "sum broke after {op:?}: {:?}", s.values);
            prop_assert!((MIN_ENTITIES..=MAX_ENTITIES).contains(&s.len()));
            prop_assert!(s.values.iter().all(|&v| v <= s.total));
            prop_assert_eq!(s.values.len(), s.locks.len());
            prop_assert_eq!(s.values.len(), s.labels.len());
            prop_assert_eq!(s.values.len(), s.colors.len());
            prop_assert!(store.history_len() <= UNDO_CAPACITY);
        }
    }

    // ── Lock preservation (5) ─────────────────────────────────────

    #[test]
    fn locked_entities_survive_other_edits(
        lock_seed in 0usize..MAX_ENTITIES,
        target_seed in 0usize..MAX_ENTITIES,
        proposed in 0.0f64..=100.0,
        dragging in any::<bool>(),
    ) {
        let mut store = FaderStore::new();
        let len = store.scenario().len();
        let lock = lock_seed % len;
        let target = target_seed % len;
        prop_assume!(lock != target);

        store.toggle_lock(lock);
        let before = store.scenario().values[lock];
        if dragging {
            store.start_drag();
        }
        store.set_value(target, proposed);
        prop_assert_eq!(store.scenario().values[lock], before);
    }

    // ── Undo (6) ──────────────────────────────────────────────────

    #[test]
    fn undo_restores_the_previous_commit(
        ops in proptest::collection::vec(store_op_strategy(), 0..20),
        proposed in 0.0f64..=100.0,
    ) {
        let mut store = FaderStore::new();
        for op in &ops {
            apply(&mut store, op);
        }
        store.end_drag();

        let snapshot = store.scenario().clone();
        store.set_value(0, proposed);
        if store.scenario() != &snapshot {
            prop_assert!(store.undo());
            prop_assert_eq!(store.scenario(), &snapshot);
        }
    }

    // ── Determinism (7) ───────────────────────────────────────────

    #[test]
    fn sequences_are_deterministic(
        ops in proptest::collection::vec(store_op_strategy(), 1..40),
    ) {
        let mut a = FaderStore::new();
        let mut b = FaderStore::new();
        for op in &ops {
            apply(&mut a, op);
            apply(&mut b, op);
        }
        prop_assert_eq!(a.scenario(), b.scenario());
        prop_assert_eq!(a.history_len(), b.history_len());
    }
}
