//! # Arrival-Probability Model
//!
//! Probability that one path lands in a specific depth-`d` bucket after `k`
//! routing hops over `y` sampled paths.
//!
//! Each level is a fair binary split, so after `n = k·y` independent
//! decisions the path reaches depth ≥ `d` with probability `(1 − 2^-d)^n`.
//! Landing exactly at `d` is the mass at ≥ `d+1` minus the mass at ≥ `d`,
//! spread over the `2^d` buckets of that level:
//!
//! ```text
//! p(d, k, y) = 2^-d · [ (1 − 2^-(d+1))^(k·y) − (1 − 2^-d)^(k·y) ]
//! ```
//!
//! Bounds: `0 ≤ p(d, k, y) ≤ 2^-d`.

/// `(1 − q)^n` evaluated as `exp(n · ln(1 − q))`.
///
/// `n` may exceed `i32::MAX`, so `powi` is not an option. At `q = 1` the
/// logarithm is `-inf` and the result is exactly 0.0; for large `n` the
/// result underflows to 0.0 without error.
fn survival(q: f64, n: f64) -> f64 {
    (n * (-q).ln_1p()).exp()
}

/// Arrival probability `p(d, k, y)`.
///
/// Total over `d ≥ 0, k ≥ 1, y ≥ 1`. Depth must not exceed
/// [`crate::params::MAX_SUPPORTED_DEPTH`].
#[must_use]
pub fn arrival_probability(depth: u32, hops: u32, paths: u64) -> f64 {
    let trials = hops as f64 * paths as f64;
    let share = (-(depth as f64)).exp2();
    let upper = survival(share / 2.0, trials);
    let lower = survival(share, trials);
    share * (upper - lower).max(0.0)
}
