#![forbid(unsafe_code)]

//! Direct-sum rebalancing engine.
//!
//! This is the canonical reconciliation algorithm: it operates directly on
//! the integer values of a [`Scenario`](crate::model::Scenario), with no
//! separate pool, and re-normalizes on every single-entity change so the sum
//! lands exactly on the total.
//!
//! # Algorithm
//!
//! Setting entity `e` to a proposed value:
//!
//! 1. Clamp the proposal to `[0, total − locked_sum]`, where `locked_sum`
//!    covers every locked entity other than `e` (locked entities always
//!    win).
//! 2. If `e` is the only unlocked entity, clamp `e` itself so the sum is
//!    exact, even against the user's request.
//! 3. Otherwise distribute the complement over the other unlocked entities:
//!    - zero weight-sum: even integer split, remainder to the earliest
//!      entities in index order;
//!    - otherwise: Hamilton-weighted proportional split. Weights come from
//!      the drag baseline when one is supplied, so a continuous gesture
//!      redistributes against the values at drag start instead of the
//!      continuously-shrinking live values (which would compound).
//! 4. A bounded rotating correction pass is the last-resort enforcement of
//!    the exact total; with the Hamilton split it is a no-op.
//!
//! # Invariants
//!
//! 1. The result sums exactly to `total`.
//! 2. No entity leaves `[0, total]`.
//! 3. Locked entities (other than the edited one) are byte-identical to the
//!    input.

use std::cmp::Ordering;

/// Upper bound on single-unit correction steps. The pass needs at most one
/// step per unit of residual error, which Hamilton keeps at zero; the bound
/// guarantees termination even for degenerate inputs.
const MAX_CORRECTION_STEPS: usize = 100;

/// Rebalance `values` after setting entity `index` to `proposed`.
///
/// `proposed` may be fractional (sliders report sub-unit positions); it is
/// rounded to the nearest integer before clamping. `baseline`, when given,
/// supplies the redistribution weights captured at drag start.
///
/// Returns a fresh value vector; the inputs are never mutated.
///
/// # Panics
///
/// Panics if `index` is out of range, `values` and `locks` have different
/// lengths, or a supplied `baseline` has the wrong length.
#[must_use]
pub fn rebalance(
    values: &[u32],
    locks: &[bool],
    index: usize,
    proposed: f64,
    baseline: Option<&[u32]>,
    total: u32,
) -> Vec<u32> {
    let n = values.len();
    assert_eq!(n, locks.len(), "values/locks length mismatch");
    assert!(index < n, "entity index out of range");
    if let Some(b) = baseline {
        assert_eq!(b.len(), n, "baseline length mismatch");
    }

    let mut result = values.to_vec();

    let locked_sum: u32 = (0..n)
        .filter(|&i| i != index && locks[i])
        .map(|i| values[i])
        .sum();
    let max_possible = total.saturating_sub(locked_sum);
    result[index] = clamp_proposal(proposed, max_possible);

    let eligible: Vec<usize> = (0..n).filter(|&i| i != index && !locks[i]).collect();

    if eligible.is_empty() {
        // Every other entity is locked: the edited fader absorbs whatever
        // keeps the sum exact, even against the user's request.
        let others: u32 = (0..n).filter(|&i| i != index).map(|i| values[i]).sum();
        result[index] = total.saturating_sub(others).min(total);
        return result;
    }

    let remaining = total.saturating_sub(result[index] + locked_sum);

    let weights = baseline.unwrap_or(values);
    let weight_sum: u32 = eligible.iter().map(|&i| weights[i]).sum();

    if weight_sum == 0 {
        spread_evenly(&mut result, &eligible, remaining);
    } else {
        spread_weighted(&mut result, &eligible, weights, weight_sum, remaining, total);
    }

    enforce_total(&mut result, locks, index, total);
    result
}

/// Round to nearest and clamp into `[0, max]`.
fn clamp_proposal(proposed: f64, max: u32) -> u32 {
    let rounded = proposed.round();
    if rounded <= 0.0 {
        0
    } else if rounded >= f64::from(max) {
        max
    } else {
        rounded as u32
    }
}

/// Even integer split of `amount`, remainder to the earliest eligibles.
fn spread_evenly(result: &mut [u32], eligible: &[usize], amount: u32) {
    let k = eligible.len() as u32;
    let per = amount / k;
    let rem = amount % k;
    for (slot, &i) in eligible.iter().enumerate() {
        result[i] = per + u32::from((slot as u32) < rem);
    }
}

/// Hamilton-weighted split of `amount` over the eligibles.
///
/// Each eligible gets `floor(amount · w_i / W)`, then the integer shortfall
/// is awarded one unit at a time by descending fractional remainder (ties by
/// ascending index).
fn spread_weighted(
    result: &mut [u32],
    eligible: &[usize],
    weights: &[u32],
    weight_sum: u32,
    amount: u32,
    total: u32,
) {
    let mut awards: Vec<(usize, u32, f64)> = eligible
        .iter()
        .map(|&i| {
            let ideal = f64::from(amount) * f64::from(weights[i]) / f64::from(weight_sum);
            let base = ideal.floor() as u32;
            (i, base, ideal - f64::from(base))
        })
        .collect();

    awards.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let base_sum: u32 = awards.iter().map(|a| a.1).sum();
    let extra = amount.saturating_sub(base_sum);
    for (slot, &(i, base, _)) in awards.iter().enumerate() {
        result[i] = (base + u32::from((slot as u32) < extra)).min(total);
    }
}

/// Last-resort exact-sum enforcement: nudge rotating eligible entities by one
/// unit until the sum matches, the bound is hit, or nobody can absorb more.
fn enforce_total(result: &mut [u32], locks: &[bool], edited: usize, total: u32) {
    let eligible: Vec<usize> = (0..result.len())
        .filter(|&i| i != edited && !locks[i])
        .collect();
    if eligible.is_empty() {
        return;
    }
    let mut cursor = 0;
    for _ in 0..MAX_CORRECTION_STEPS {
        let sum: u32 = result.iter().sum();
        if sum == total {
            return;
        }
        let need_more = sum < total;
        let mut progressed = false;
        for _ in 0..eligible.len() {
            let i = eligible[cursor];
            cursor = (cursor + 1) % eligible.len();
            if need_more && result[i] < total {
                result[i] += 1;
                progressed = true;
                break;
            }
            if !need_more && result[i] > 0 {
                result[i] -= 1;
                progressed = true;
                break;
            }
        }
        if !progressed {
            return;
        }
    }
}
