#![forbid(unsafe_code)]

//! Equal-split recomputation for entity add/remove.
//!
//! When the bank gains or loses an entity, the budget is re-split equally
//! among the unlocked entities. Locked entities keep their values; only the
//! remainder of the budget is divided, with integer leftovers awarded to the
//! earliest unlocked entities in index order.
//!
//! The all-locked bank is a recoverable edge, not an error: the split then
//! covers every entity so the sum invariant still holds.

/// Recompute an equal split of `total` across the unlocked entities.
///
/// Locked entities retain their current values; the remaining budget is
/// divided evenly among unlocked entities, remainder to the earliest ones.
/// If everything is locked, the whole budget is split across the whole bank
/// instead (the only way to keep the sum exact).
///
/// # Panics
///
/// Panics if `values` and `locks` have different lengths.
#[must_use]
pub fn equal_split(values: &[u32], locks: &[bool], total: u32) -> Vec<u32> {
    let n = values.len();
    assert_eq!(n, locks.len(), "values/locks length mismatch");
    if n == 0 {
        return Vec::new();
    }

    let unlocked: Vec<usize> = (0..n).filter(|&i| !locks[i]).collect();

    if unlocked.is_empty() {
        let per = total / n as u32;
        let rem = total % n as u32;
        return (0..n).map(|i| per + u32::from((i as u32) < rem)).collect();
    }

    let locked_sum: u32 = (0..n).filter(|&i| locks[i]).map(|i| values[i]).sum();
    let budget = total.saturating_sub(locked_sum);
    let k = unlocked.len() as u32;
    let per = budget / k;
    let rem = budget % k;

    let mut out = values.to_vec();
    for (slot, &i) in unlocked.iter().enumerate() {
        out[i] = per + u32::from((slot as u32) < rem);
    }
    out
}
