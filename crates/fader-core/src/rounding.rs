#![forbid(unsafe_code)]

//! Largest-remainder integer apportionment.
//!
//! Converts real-valued shares into integer display values that sum exactly
//! to a target total, using Hamilton's method (floor everything, then award
//! the shortfall one unit at a time to the largest fractional remainders).
//!
//! # Mathematical Model
//!
//! Given real shares `s_i ≥ 0` and an integer `target`, find integers `x_i`:
//!
//! ```text
//! Σ_i x_i = target
//! x_i ∈ {floor(s_i), floor(s_i) + 1}   (when shortfall < n)
//! ```
//!
//! # Algorithm
//!
//! 1. **Floor phase**: `x_i = floor(s_i)`.
//! 2. **Shortfall**: `D = target − Σ floor(s_i)`.
//! 3. **Priority sort**: rank indices by fractional remainder (descending),
//!    tie-broken by original share (descending), then index (ascending).
//! 4. **Award**: give one unit to each of the first `D` ranked indices,
//!    wrapping around the ranking if `D` exceeds the index count. The wrap
//!    guarantees termination for any non-negative shortfall, although well
//!    formed inputs keep `D` in `[0, n)`.
//!
//! # Properties
//!
//! 1. **Sum conservation**: `Σ x_i = target` exactly, by construction.
//! 2. **Bounded displacement**: `|x_i − s_i| < 1` whenever `D < n`.
//! 3. **Deterministic**: the composite sort key is a total order, so equal
//!    inputs always produce equal outputs.
//!
//! # Failure Modes
//!
//! - **Empty input**: returns an empty vector.
//! - **Floors overshoot target**: a precondition violation (shares must be
//!   non-negative and sum to at most `target`); guarded by a `debug_assert`
//!   and saturating arithmetic in release builds.

use std::cmp::Ordering;

/// Round non-negative real shares to integers summing exactly to `target`.
///
/// Deterministic: identical inputs always yield identical outputs, so the
/// display layer may call this on every frame without jitter.
///
/// # Example
///
/// ```
/// use fader_core::rounding::hamilton_round;
///
/// assert_eq!(hamilton_round(&[33.33, 33.33, 33.34], 100), vec![33, 33, 34]);
/// assert_eq!(hamilton_round(&[], 100), Vec::<u32>::new());
/// ```
#[must_use]
pub fn hamilton_round(values: &[f64], target: u32) -> Vec<u32> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let floors: Vec<u32> = values
        .iter()
        .map(|&v| (v.max(0.0).floor() as u64).min(u64::from(u32::MAX)) as u32)
        .collect();
    let floor_sum: u32 = floors.iter().sum();
    debug_assert!(
        floor_sum <= target,
        "floored shares overshoot target: {floor_sum} > {target}"
    );
    let shortfall = target.saturating_sub(floor_sum);

    // Rank by remainder descending, original share descending, index ascending.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        let ra = values[a].max(0.0) - f64::from(floors[a]);
        let rb = values[b].max(0.0) - f64::from(floors[b]);
        rb.partial_cmp(&ra)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                values[b]
                    .partial_cmp(&values[a])
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.cmp(&b))
    });

    let mut result = floors;
    for k in 0..shortfall as usize {
        result[order[k % n]] += 1;
    }
    result
}
