#![forbid(unsafe_code)]

//! Pool-based redistribution engine.
//!
//! The alternative allocation strategy: entities hold hidden real-valued
//! shares while an integer `pool` tracks budget not yet committed to any
//! entity. Display integers are derived from the shares via Hamilton
//! rounding against the committed budget (`total − pool`), which makes the
//! core invariant hold unconditionally:
//!
//! ```text
//! pool + Σ display()  ==  total
//! ```
//!
//! Increasing an entity draws from the pool first; only the shortfall is
//! taken from other unlocked entities, under one of three policies:
//!
//! | Policy | Behavior |
//! |--------|----------|
//! | `Proportional` | take from each eligible in proportion to its share |
//! | `Equal` | take `floor(shortfall / eligibles)` from each |
//! | `LargestFirst` | take single units from the current largest |
//!
//! The target is credited only with what was actually taken, so it may
//! receive less than requested. No share ever goes negative.
//!
//! All operations are copy-on-write: they consume `&self` and return a new
//! state, so a caller can retain prior snapshots for undo.

use crate::model::{DistributionPolicy, MAX_ENTITIES, MIN_ENTITIES};
use crate::rounding::hamilton_round;

/// Divisor guard: an eligible total at or below this is treated as zero
/// (nothing to take, or fall back to an equal split).
const EPSILON: f64 = 1e-10;

/// State of the pool-based engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolState {
    /// Hidden precise per-entity shares.
    pub shares: Vec<f64>,
    /// Lock mask; locked entities are never auto-reduced or auto-filled.
    pub locks: Vec<bool>,
    /// Integer budget not yet committed to any entity.
    pub pool: u32,
    /// The fixed budget.
    pub total: u32,
}

impl PoolState {
    /// A bank of `count` zero-share unlocked entities with the whole budget
    /// in the pool.
    #[must_use]
    pub fn new(count: usize, total: u32) -> Self {
        Self {
            shares: vec![0.0; count],
            locks: vec![false; count],
            pool: total,
            total,
        }
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// Whether the bank has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Derive the integer display values from the shares.
    ///
    /// Rounds against the committed budget (`total − pool`), so the sum of
    /// the result plus the pool is always exactly `total`.
    #[must_use]
    pub fn display(&self) -> Vec<u32> {
        hamilton_round(&self.shares, self.total.saturating_sub(self.pool))
    }

    /// Whether `pool + Σ display() == total` holds (it always should).
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.pool + self.display().iter().sum::<u32>() == self.total
    }

    /// Increase one entity by up to `amount` units.
    ///
    /// Draws from the pool first; any shortfall is taken from other
    /// unlocked entities per `policy`. The target is credited only with
    /// what was actually supplied.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn increase(&self, index: usize, amount: u32, policy: DistributionPolicy) -> Self {
        assert!(index < self.len(), "entity index out of range");
        let mut next = self.clone();

        let consumed = next.pool.min(amount);
        next.shares[index] += f64::from(consumed);
        next.pool -= consumed;

        let shortfall = amount - consumed;
        if shortfall > 0 {
            take_from_others(&mut next.shares, &next.locks, index, shortfall, policy);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            index,
            amount,
            policy = policy.label(),
            pool = next.pool,
            "pool increase"
        );
        next
    }

    /// Release up to `amount` whole units from one entity back to the pool.
    ///
    /// Only whole committed units move (`min(amount, floor(share))`); the
    /// share floors at zero.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn decrease(&self, index: usize, amount: u32) -> Self {
        assert!(index < self.len(), "entity index out of range");
        let mut next = self.clone();

        let release = amount.min(next.shares[index].max(0.0).floor() as u32);
        next.shares[index] = (next.shares[index] - f64::from(release)).max(0.0);
        next.pool += release;

        #[cfg(feature = "tracing")]
        tracing::trace!(index, amount, release, pool = next.pool, "pool decrease");
        next
    }

    /// Push the entire pool into the unlocked entities per `policy`.
    ///
    /// A no-op when the pool is empty or every entity is locked.
    #[must_use]
    pub fn distribute_pool(&self, policy: DistributionPolicy) -> Self {
        if self.pool == 0 {
            return self.clone();
        }
        let eligible: Vec<usize> = (0..self.len()).filter(|&i| !self.locks[i]).collect();
        if eligible.is_empty() {
            return self.clone();
        }

        let mut next = self.clone();
        fill_eligibles(&mut next.shares, &eligible, next.pool, policy);
        next.pool = 0;
        next
    }

    /// Flip one entity's lock flag.
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

    /// Append a zero-share unlocked entity awaiting pool assignment.
    /// A silent no-op at [`MAX_ENTITIES`].
    #[must_use]
    pub fn add_entity(&self) -> Self {
        if self.len() >= MAX_ENTITIES {
            return self.clone();
        }
        let mut next = self.clone();
        next.shares.push(0.0);
        next.locks.push(false);
        next
    }

    /// Remove one entity, returning its whole committed units to the pool.
    /// A silent no-op when the bank is at [`MIN_ENTITIES`].
    ///
    /// Fractional dust below one unit is dropped; the display derivation
    /// re-apportions it across the survivors.
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
        let returned = next.shares[index].max(0.0).floor() as u32;
        next.shares.remove(index);
        next.locks.remove(index);
        next.pool += returned;
        next
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Taking from other entities (increase shortfall)
// ─────────────────────────────────────────────────────────────────────────────

/// Take up to `shortfall` units from eligible entities and credit the
/// target. Returns the amount actually moved.
fn take_from_others(
    shares: &mut [f64],
    locks: &[bool],
    index: usize,
    shortfall: u32,
    policy: DistributionPolicy,
) -> f64 {
    let eligible: Vec<usize> = (0..shares.len())
        .filter(|&i| i != index && !locks[i] && shares[i] > 0.0)
        .collect();
    if eligible.is_empty() {
        return 0.0;
    }

    match policy {
        DistributionPolicy::Proportional => {
            take_proportional(shares, &eligible, index, shortfall)
        }
        DistributionPolicy::Equal => take_equal(shares, &eligible, index, shortfall),
        DistributionPolicy::LargestFirst => {
            take_largest_first(shares, &eligible, index, shortfall)
        }
    }
}

fn take_proportional(shares: &mut [f64], eligible: &[usize], index: usize, delta: u32) -> f64 {
    let available: f64 = eligible.iter().map(|&i| shares[i]).sum();
    if available <= EPSILON {
        return 0.0;
    }
    let delta = f64::from(delta);
    let mut removed = 0.0;
    for &i in eligible {
        let take = (shares[i] / available * delta).min(shares[i]);
        shares[i] = (shares[i] - take).max(0.0);
        removed += take;
    }
    shares[index] += removed;
    removed
}

fn take_equal(shares: &mut [f64], eligible: &[usize], index: usize, delta: u32) -> f64 {
    // Integer floor per entity; the sub-step deliberately under-takes
    // rather than redistributing its own remainder.
    let per = f64::from(delta / eligible.len() as u32);
    let mut removed = 0.0;
    for &i in eligible {
        let take = per.min(shares[i]);
        shares[i] -= take;
        removed += take;
    }
    shares[index] += removed;
    removed
}

fn take_largest_first(shares: &mut [f64], eligible: &[usize], index: usize, delta: u32) -> f64 {
    let mut order = eligible.to_vec();
    let mut removed = 0.0;
    let mut remaining = delta;
    while remaining > 0 {
        order.sort_by(|&a, &b| {
            shares[b]
                .partial_cmp(&shares[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(&b))
        });
        let Some(&top) = order.first() else { break };
        // Whole units only: once the largest share drops below one unit,
        // taking more would drive it negative.
        if shares[top] < 1.0 {
            break;
        }
        shares[top] -= 1.0;
        shares[index] += 1.0;
        removed += 1.0;
        remaining -= 1;
    }
    removed
}

// ─────────────────────────────────────────────────────────────────────────────
// Filling eligible entities (pool distribution)
// ─────────────────────────────────────────────────────────────────────────────

fn fill_eligibles(shares: &mut [f64], eligible: &[usize], pool: u32, policy: DistributionPolicy) {
    match policy {
        DistributionPolicy::Equal => {
            let k = eligible.len() as u32;
            let per = pool / k;
            let rem = pool % k;
            for (slot, &i) in eligible.iter().enumerate() {
                shares[i] += f64::from(per + u32::from((slot as u32) < rem));
            }
        }
        DistributionPolicy::LargestFirst => {
            let mut order = eligible.to_vec();
            for _ in 0..pool {
                order.sort_by(|&a, &b| {
                    shares[b]
                        .partial_cmp(&shares[a])
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.cmp(&b))
                });
                shares[order[0]] += 1.0;
            }
        }
        DistributionPolicy::Proportional => {
            let eligible_total: f64 = eligible.iter().map(|&i| shares[i]).sum();
            if eligible_total <= EPSILON {
                // All effectively zero: fall back to an equal split.
                let per = f64::from(pool) / eligible.len() as f64;
                for &i in eligible {
                    shares[i] += per;
                }
            } else {
                for &i in eligible {
                    shares[i] += shares[i] / eligible_total * f64::from(pool);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed(state: &PoolState) -> u32 {
        state.display().iter().sum()
    }

    // ─── Construction and display ─────────────────────────────────

    #[test]
    fn new_bank_is_all_pool() {
        let s = PoolState::new(4, 100);
        assert_eq!(s.pool, 100);
        assert_eq!(s.display(), vec![0, 0, 0, 0]);
        assert!(s.is_balanced());
    }

    #[test]
    fn display_tracks_committed_budget_only() {
        let s = PoolState::new(4, 100).increase(0, 30, DistributionPolicy::Proportional);
        assert_eq!(s.pool, 70);
        assert_eq!(s.display(), vec![30, 0, 0, 0]);
        assert!(s.is_balanced());
    }

    // ─── Increase ─────────────────────────────────────────────────

    #[test]
    fn increase_draws_pool_first() {
        let s = PoolState::new(2, 100)
            .increase(0, 60, DistributionPolicy::Proportional)
            .increase(1, 40, DistributionPolicy::Proportional);
        assert_eq!(s.pool, 0);
        assert_eq!(s.display(), vec![60, 40]);
    }

    #[test]
    fn increase_beyond_pool_takes_proportionally() {
        // Pool exhausted at [60, 40]; asking for 20 more takes from the
        // other entity (only eligible), all 20 from index 1.
        let s = PoolState::new(2, 100)
            .increase(0, 60, DistributionPolicy::Proportional)
            .increase(1, 40, DistributionPolicy::Proportional)
            .increase(0, 20, DistributionPolicy::Proportional);
        assert_eq!(s.display(), vec![80, 20]);
        assert!(s.is_balanced());
    }

    #[test]
    fn increase_proportional_splits_by_share() {
        // [0, 60, 30] committed, pool 10. Asking +40 on index 0: 10 from
        // the pool, 30 taken 2:1 from entities 1 and 2.
        let s = PoolState::new(3, 100)
            .increase(1, 60, DistributionPolicy::Proportional)
            .increase(2, 30, DistributionPolicy::Proportional)
            .increase(0, 40, DistributionPolicy::Proportional);
        assert_eq!(s.pool, 0);
        assert_eq!(s.display(), vec![40, 40, 20]);
        assert!(s.is_balanced());
    }

    #[test]
    fn increase_skips_locked_entities() {
        let s = PoolState::new(3, 100)
            .increase(1, 50, DistributionPolicy::Proportional)
            .increase(2, 50, DistributionPolicy::Proportional)
            .toggle_lock(1)
            .increase(0, 30, DistributionPolicy::Proportional);
        let d = s.display();
        assert_eq!(d[1], 50, "locked entity must not be reduced");
        assert_eq!(d, vec![30, 50, 20]);
        assert!(s.is_balanced());
    }

    #[test]
    fn increase_equal_under_takes_by_design() {
        // Shortfall 5 over 2 eligibles: floor(5/2) = 2 each, 4 moved.
        let s = PoolState::new(3, 100)
            .increase(1, 50, DistributionPolicy::Equal)
            .increase(2, 50, DistributionPolicy::Equal)
            .increase(0, 5, DistributionPolicy::Equal);
        assert_eq!(s.display(), vec![4, 48, 48]);
        assert!(s.is_balanced());
    }

    #[test]
    fn increase_largest_first_takes_single_units() {
        let s = PoolState::new(3, 100)
            .increase(1, 60, DistributionPolicy::LargestFirst)
            .increase(2, 40, DistributionPolicy::LargestFirst)
            .increase(0, 30, DistributionPolicy::LargestFirst);
        // Units peel off the largest until 1 and 2 equalize, then alternate.
        assert_eq!(s.display(), vec![30, 35, 35]);
        assert!(s.is_balanced());
    }

    #[test]
    fn increase_with_nothing_to_take_saturates() {
        // Pool empty, all others locked: the request goes unmet.
        let s = PoolState::new(2, 100)
            .increase(0, 60, DistributionPolicy::Proportional)
            .increase(1, 40, DistributionPolicy::Proportional)
            .toggle_lock(1)
            .increase(0, 25, DistributionPolicy::Proportional);
        assert_eq!(s.display(), vec![60, 40]);
        assert!(s.is_balanced());
    }

    #[test]
    fn shares_never_go_negative() {
        let mut s = PoolState::new(3, 100)
            .increase(1, 7, DistributionPolicy::Proportional)
            .increase(2, 3, DistributionPolicy::Proportional);
        for _ in 0..50 {
            s = s.increase(0, 9, DistributionPolicy::LargestFirst);
        }
        assert!(s.shares.iter().all(|&f| f >= 0.0));
        assert!(s.is_balanced());
    }

    // ─── Decrease ─────────────────────────────────────────────────

    #[test]
    fn decrease_releases_to_pool() {
        let s = PoolState::new(2, 100)
            .increase(0, 70, DistributionPolicy::Proportional)
            .decrease(0, 30);
        assert_eq!(s.pool, 60);
        assert_eq!(s.display(), vec![40, 0]);
        assert!(s.is_balanced());
    }

    #[test]
    fn decrease_floors_at_zero() {
        let s = PoolState::new(2, 100)
            .increase(0, 10, DistributionPolicy::Proportional)
            .decrease(0, 500);
        assert_eq!(s.pool, 100);
        assert_eq!(s.display(), vec![0, 0]);
        assert!(s.is_balanced());
    }

    #[test]
    fn decrease_moves_whole_units_only() {
        // Fractional share: only the whole part can be released.
        let mut s = PoolState::new(2, 100);
        s.shares[0] = 5.7;
        s.pool = 94;
        let t = s.decrease(0, 10);
        assert_eq!(t.pool, 99);
        assert!((t.shares[0] - 0.7).abs() < 1e-9);
    }

    // ─── Pool distribution ────────────────────────────────────────

    #[test]
    fn distribute_equal_splits_with_remainder_first() {
        let s = PoolState::new(3, 100).distribute_pool(DistributionPolicy::Equal);
        assert_eq!(s.pool, 0);
        assert_eq!(s.display(), vec![34, 33, 33]);
        assert!(s.is_balanced());
    }

    #[test]
    fn distribute_proportional_zero_shares_falls_back_to_equal() {
        let s = PoolState::new(4, 100).distribute_pool(DistributionPolicy::Proportional);
        assert_eq!(s.pool, 0);
        assert_eq!(s.display(), vec![25, 25, 25, 25]);
    }

    #[test]
    fn distribute_proportional_weights_by_share() {
        let s = PoolState::new(2, 100)
            .increase(0, 30, DistributionPolicy::Proportional)
            .increase(1, 10, DistributionPolicy::Proportional)
            .distribute_pool(DistributionPolicy::Proportional);
        assert_eq!(s.pool, 0);
        // 60 remaining splits 3:1 → 45 and 15 on top of 30 and 10.
        assert_eq!(s.display(), vec![75, 25]);
    }

    #[test]
    fn distribute_largest_first_feeds_the_leader() {
        // Each unit goes to the current largest, so the leader takes all.
        let s = PoolState::new(2, 10)
            .increase(0, 4, DistributionPolicy::Proportional)
            .distribute_pool(DistributionPolicy::LargestFirst);
        assert_eq!(s.pool, 0);
        assert_eq!(s.display(), vec![10, 0]);
    }

    #[test]
    fn distribute_largest_first_from_zero_picks_the_first() {
        // All tied at zero: index 0 wins the first unit, then leads forever.
        let s = PoolState::new(3, 10).distribute_pool(DistributionPolicy::LargestFirst);
        assert_eq!(s.display(), vec![10, 0, 0]);
    }

    #[test]
    fn distribute_skips_locked_and_empty_pool() {
        let all_locked = PoolState::new(2, 100).toggle_lock(0).toggle_lock(1);
        assert_eq!(all_locked.distribute_pool(DistributionPolicy::Equal), all_locked);

        let no_pool = PoolState::new(2, 100)
            .increase(0, 50, DistributionPolicy::Equal)
            .increase(1, 50, DistributionPolicy::Equal);
        assert_eq!(no_pool.distribute_pool(DistributionPolicy::Equal), no_pool);
    }

    #[test]
    fn distribute_only_to_unlocked() {
        let s = PoolState::new(3, 100)
            .toggle_lock(0)
            .distribute_pool(DistributionPolicy::Equal);
        let d = s.display();
        assert_eq!(d[0], 0);
        assert_eq!(d[1] + d[2], 100);
        assert!(s.is_balanced());
    }

    // ─── Lifecycle ────────────────────────────────────────────────

    #[test]
    fn add_entity_joins_with_zero_share() {
        let s = PoolState::new(4, 100).add_entity();
        assert_eq!(s.len(), 5);
        assert_eq!(s.shares[4], 0.0);
        assert!(s.is_balanced());
    }

    #[test]
    fn add_entity_at_capacity_is_a_no_op() {
        let mut s = PoolState::new(MAX_ENTITIES, 100);
        s = s.add_entity();
        assert_eq!(s.len(), MAX_ENTITIES);
    }

    #[test]
    fn remove_entity_returns_units_to_pool() {
        let s = PoolState::new(3, 100)
            .increase(1, 40, DistributionPolicy::Proportional)
            .remove_entity(1);
        assert_eq!(s.len(), 2);
        assert_eq!(s.pool, 100);
        assert!(s.is_balanced());
    }

    #[test]
    fn remove_last_entity_is_refused() {
        let s = PoolState::new(1, 100);
        assert_eq!(s.remove_entity(0), s);
    }

    // ─── Invariant sweep ──────────────────────────────────────────

    #[test]
    fn mixed_operation_sequence_stays_balanced() {
        let mut s = PoolState::new(4, 100);
        let policies = DistributionPolicy::ALL;
        for step in 0u32..200 {
            let i = (step as usize) % s.len();
            let p = policies[(step as usize) % policies.len()];
            s = match step % 5 {
                0 => s.increase(i, 1 + step % 13, p),
                1 => s.decrease(i, step % 9),
                2 => s.toggle_lock(i),
                3 => s.distribute_pool(p),
                _ => s.increase(i, 3, p),
            };
            assert!(s.is_balanced(), "unbalanced after step {step}");
            assert!(committed(&s) <= s.total);
            assert!(s.shares.iter().all(|&f| f >= -1e-9));
        }
    }
}
