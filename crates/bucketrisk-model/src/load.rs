//! # Expected-Load Estimator
//!
//! Expected number of items accumulated in one depth-`d` bucket:
//!
//! ```text
//! E[d] = x · Σ_{k=1}^{ΔExp} p(d, k, y)
//! ```
//!
//! `ΔExp` is a caller-supplied truncation point of an otherwise unbounded
//! series. It is never replaced by a convergence test: two callers with the
//! same `ΔExp` always sum the same terms in the same order.

use crate::arrival::arrival_probability;

/// Truncated arrival mass `Σ_{k=1}^{hop_budget} p(d, k, y)`.
#[must_use]
pub fn arrival_mass(hop_budget: u32, depth: u32, paths: u64) -> f64 {
    (1..=hop_budget)
        .map(|hops| arrival_probability(depth, hops, paths))
        .sum()
}

/// Expected load `E[d]` of a depth-`d` bucket.
#[must_use]
pub fn expected_load(hop_budget: u32, depth: u32, items: u64, paths: u64) -> f64 {
    items as f64 * arrival_mass(hop_budget, depth, paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_hop_equals_scaled_arrival() {
        let e = expected_load(1, 3, 500, 2);
        let p = arrival_probability(3, 1, 2);
        assert_eq!(e, 500.0 * p);
    }

    #[test]
    fn mass_is_sum_of_terms_in_hop_order() {
        let manual = arrival_probability(5, 1, 10)
            + arrival_probability(5, 2, 10)
            + arrival_probability(5, 3, 10);
        assert_eq!(arrival_mass(3, 5, 10), manual);
    }

    #[test]
    fn larger_budget_never_lowers_load() {
        let mut prev = 0.0;
        for budget in [1, 2, 10, 100, 1000] {
            let e = expected_load(budget, 12, 1000, 50);
            assert!(e >= prev, "budget {budget}: {e} < {prev}");
            prev = e;
        }
    }

    #[test]
    fn load_is_linear_in_items() {
        let one = expected_load(50, 8, 1_000, 3);
        let two = expected_load(50, 8, 2_000, 3);
        assert_eq!(two, 2.0 * one);
    }

    #[test]
    fn root_load_vanishes_for_many_paths() {
        // At depth 0 every term is 2^-(k·y) and underflows for y = 10^6.
        assert_eq!(expected_load(1000, 0, 1_000_000, 1_000_000), 0.0);
    }

    #[test]
    fn deep_tail_decays_by_four_per_level() {
        // p ≈ n·2^-(2d+1) once n·2^-d is small.
        let a = expected_load(1000, 40, 1_000_000, 1_000_000);
        let b = expected_load(1000, 41, 1_000_000, 1_000_000);
        let ratio = a / b;
        assert!((ratio - 4.0).abs() < 0.1, "ratio {ratio}");
    }
}
