//! Parameter validation and loading errors.
//!
//! The numeric pipeline itself has no runtime failure modes: degenerate
//! loads are recovered inside [`crate::overflow`]. Everything here is a
//! caller configuration problem detected before a sweep starts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("bucket capacity must be positive (got 0)")]
    ZeroCapacity,
    #[error("total item count must be positive (got 0)")]
    ZeroItems,
    #[error("sampled-path count must be positive (got 0)")]
    ZeroPaths,
    #[error("hop budget must be positive (got 0)")]
    ZeroHopBudget,
    #[error("max depth {max_depth} exceeds supported limit {limit}")]
    DepthTooLarge { max_depth: u32, limit: u32 },
    #[error("hop budget list is empty")]
    EmptyHopBudgets,
    #[error("unknown preset '{0}', expected analysis|deployment")]
    UnknownPreset(String),
    #[error("unknown tail policy '{0}', expected saturating|literal")]
    UnknownTailPolicy(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
