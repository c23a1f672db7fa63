#![forbid(unsafe_code)]

//! Core data model: the [`Scenario`] snapshot and [`DistributionPolicy`].
//!
//! A scenario is one immutable-by-convention snapshot of a fader bank:
//! integer values that always sum to the total budget, a lock mask, and the
//! display metadata (labels, colors, unit) the UI layer owns but which must
//! ride along so the engine's invariants survive its presence.
//!
//! All mutating operations are copy-on-write: they consume `&self` and
//! return a fresh snapshot, leaving the prior one intact for undo and for
//! drag-cancel semantics.
//!
//! # Invariants
//!
//! 1. `values.iter().sum() == total` after every completed operation.
//! 2. `0 <= values[i] <= total` for every entity.
//! 3. A locked entity's value only changes via a direct user action on it.
//! 4. `values`, `locks`, `labels`, and `colors` always have equal lengths.

use crate::{direct, lifecycle};

/// Budget every scenario distributes (generic in principle, 100 here).
pub const DEFAULT_TOTAL: u32 = 100;

/// Hard cap on the number of entities in a bank.
pub const MAX_ENTITIES: usize = 8;

/// Removal refuses to drop the bank below this count.
pub const MIN_ENTITIES: usize = 1;

/// Default entity colors, assigned round-robin as entities are added.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#3B82F6", "#EF4444", "#10B981", "#F59E0B", "#8B5CF6", "#F97316", "#06B6D4", "#84CC16",
];

/// How the engines spread an amount across eligible entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistributionPolicy {
    /// Weight each eligible entity by its current (or baseline) value.
    #[default]
    Proportional,
    /// Give every eligible entity the same integer share.
    Equal,
    /// Move one unit at a time to/from whichever eligible entity is largest.
    LargestFirst,
}

impl DistributionPolicy {
    /// All policies in declaration order.
    pub const ALL: [DistributionPolicy; 3] = [
        DistributionPolicy::Proportional,
        DistributionPolicy::Equal,
        DistributionPolicy::LargestFirst,
    ];

    /// Short label for display and logging.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            DistributionPolicy::Proportional => "proportional",
            DistributionPolicy::Equal => "equal",
            DistributionPolicy::LargestFirst => "largest-first",
        }
    }
}

impl std::fmt::Display for DistributionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One snapshot of a fader bank.
///
/// Values are the primary integers of the direct-sum engine; the pool engine
/// keeps its own real-valued [`PoolState`](crate::pool::PoolState) instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Per-entity integer values, summing to `total`.
    pub values: Vec<u32>,
    /// Lock mask; locked entities never auto-adjust.
    pub locks: Vec<bool>,
    /// Display labels (owned by the UI, carried through the core).
    pub labels: Vec<String>,
    /// Display colors as `#RRGGBB` strings.
    pub colors: Vec<String>,
    /// Unit label for the whole bank (e.g. "Time").
    pub unit: String,
    /// The fixed budget the values sum to.
    pub total: u32,
}

impl Default for Scenario {
    /// Four unlocked entities with an equal 25/25/25/25 split.
    fn default() -> Self {
        let count = 4;
        Self {
            values: vec![DEFAULT_TOTAL / count as u32; count],
            locks: vec![false; count],
            labels: (1..=count).map(|i| format!("Entity {i}")).collect(),
            colors: DEFAULT_PALETTE[..count]
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
            unit: "Time".to_string(),
            total: DEFAULT_TOTAL,
        }
    }
}

impl Scenario {
    /// Build a scenario from raw parts.
    ///
    /// # Panics
    ///
    /// Panics if the four entity arrays have mismatched lengths. Callers
    /// holding untrusted data (persisted JSON) must validate lengths first
    /// and surface a typed error instead.
    #[must_use]
    pub fn new(
        values: Vec<u32>,
        locks: Vec<bool>,
        labels: Vec<String>,
        colors: Vec<String>,
        unit: impl Into<String>,
    ) -> Self {
        assert!(
            values.len() == locks.len()
                && values.len() == labels.len()
                && values.len() == colors.len(),
            "entity arrays must have equal lengths"
        );
        Self {
            values,
            locks,
            labels,
            colors,
            unit: unit.into(),
            total: DEFAULT_TOTAL,
        }
    }

    /// Number of entities in the bank.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bank has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the sum invariant currently holds.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.values.iter().sum::<u32>() == self.total
    }

    /// Set one entity's value, rebalancing the others so the sum stays
    /// exactly at `total`.
    ///
    /// `baseline` carries drag-start weights during a continuous gesture;
    /// pass `None` outside a drag to weight by live values. See
    /// [`direct::rebalance`] for the full contract.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or a supplied baseline has the
    /// wrong length.
    #[must_use]
    pub fn set_value(&self, index: usize, proposed: f64, baseline: Option<&[u32]>) -> Self {
        let mut next = self.clone();
        next.values = direct::rebalance(
            &self.values,
            &self.locks,
            index,
            proposed,
            baseline,
            self.total,
        );
        next
    }

    /// Flip one entity's lock flag. Values are untouched.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn toggle_lock(&self, index: usize) -> Self {
        assert!(index < self.len(), "entity index out of range");
        let mut next = self.clone();
        next.locks[index] = !next.locks[index];
        next
    }

    /// Replace one entity's label.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn with_label(&self, index: usize, label: impl Into<String>) -> Self {
        assert!(index < self.len(), "entity index out of range");
        let mut next = self.clone();
        next.labels[index] = label.into();
        next
    }

    /// Replace one entity's color.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn with_color(&self, index: usize, color: impl Into<String>) -> Self {
        assert!(index < self.len(), "entity index out of range");
        let mut next = self.clone();
        next.colors[index] = color.into();
        next
    }

    /// Append a new unlocked entity and re-split the budget equally across
    /// unlocked entities. A silent no-op at [`MAX_ENTITIES`].
    #[must_use]
    pub fn add_entity(&self) -> Self {
        if self.len() >= MAX_ENTITIES {
            return self.clone();
        }
        let mut next = self.clone();
        let count = next.len() + 1;
        next.values.push(0);
        next.locks.push(false);
        next.labels.push(format!("Entity {count}"));
        next.colors
            .push(DEFAULT_PALETTE[count % DEFAULT_PALETTE.len()].to_string());
        next.values = lifecycle::equal_split(&next.values, &next.locks, next.total);
        next
    }

    /// Remove one entity and re-split the budget equally across unlocked
    /// survivors. A silent no-op when the bank is at [`MIN_ENTITIES`].
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn remove_entity(&self, index: usize) -> Self {
        assert!(index < self.len(), "entity index out of range");
        if self.len() <= MIN_ENTITIES {
            return self.clone();
        }
        let mut next = self.clone();
        next.values.remove(index);
        next.locks.remove(index);
        next.labels.remove(index);
        next.colors.remove(index);
        next.values = lifecycle::equal_split(&next.values, &next.locks, next.total);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_equal_split() {
        let s = Scenario::default();
        assert_eq!(s.values, vec![25, 25, 25, 25]);
        assert!(s.is_balanced());
        assert_eq!(s.labels[0], "Entity 1");
        assert_eq!(s.colors[0], DEFAULT_PALETTE[0]);
    }

    #[test]
    fn policy_labels_and_all() {
        assert_eq!(DistributionPolicy::ALL.len(), 3);
        assert_eq!(DistributionPolicy::Proportional.label(), "proportional");
        assert_eq!(DistributionPolicy::LargestFirst.to_string(), "largest-first");
        assert_eq!(DistributionPolicy::default(), DistributionPolicy::Proportional);
    }

    #[test]
    fn toggle_lock_flips_only_target() {
        let s = Scenario::default();
        let t = s.toggle_lock(2);
        assert!(t.locks[2]);
        assert!(!t.locks[0] && !t.locks[1] && !t.locks[3]);
        assert_eq!(t.values, s.values);
        // Prior snapshot untouched.
        assert!(!s.locks[2]);
    }

    #[test]
    fn label_and_color_edits_preserve_values() {
        let s = Scenario::default();
        let t = s.with_label(1, "Work").with_color(1, "#000000");
        assert_eq!(t.labels[1], "Work");
        assert_eq!(t.colors[1], "#000000");
        assert_eq!(t.values, s.values);
        assert!(t.is_balanced());
    }

    #[test]
    #[should_panic(expected = "entity arrays must have equal lengths")]
    fn new_rejects_mismatched_lengths() {
        let _ = Scenario::new(
            vec![50, 50],
            vec![false],
            vec!["A".into(), "B".into()],
            vec!["#111111".into(), "#222222".into()],
            "Time",
        );
    }

    #[test]
    #[should_panic(expected = "entity index out of range")]
    fn toggle_lock_rejects_bad_index() {
        let _ = Scenario::default().toggle_lock(9);
    }
}
