//! Bucket overflow risk for depth-indexed binary bucket trees.
//!
//! Items percolate down a binary tree of fixed-capacity buckets. This crate
//! estimates, per depth, how likely a bucket is to receive more items than
//! it can hold, and finds the depth of maximum risk.
//!
//! # Architecture
//!
//! The model is a one-way pipeline over the depth grid `0..=D`:
//! - **Arrival model** (`arrival`): probability a path lands exactly at depth `d`
//! - **Load estimator** (`load`): truncated hop sum scaled by item count
//! - **Overflow evaluator** (`overflow`): multiplicative Chernoff tail bound
//! - **Sweep** (`sweep`): per-depth sequences, arg-max, determinism fingerprint
//! - **Parameters** (`params`): immutable configuration, presets, tail policy
//!
//! The computation is synchronous, deterministic and allocation-light; a
//! default sweep is about 31k scalar evaluations.

pub mod arrival;
pub mod error;
pub mod load;
pub mod overflow;
pub mod params;
pub mod sweep;

pub use arrival::arrival_probability;
pub use error::ParamError;
pub use load::expected_load;
pub use overflow::{OverflowEstimate, OverflowRegime, overflow_probability};
pub use params::{MAX_SUPPORTED_DEPTH, ModelParams, Preset, TailPolicy};
pub use sweep::{
    DepthRow, DepthSweep, PeakRisk, argmax_first, compare_hop_budgets, hex_lower, run_sweep,
};
