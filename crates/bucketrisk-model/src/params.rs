//! Model parameters.
//!
//! A sweep is a pure function of one immutable [`ModelParams`] value:
//! - `capacity` (Z): items a bucket holds before it overflows.
//! - `items` (x): total item count, a constant scaling factor.
//! - `paths` (y): sampled paths per item, a constant scaling factor.
//! - `max_depth` (D): the depth grid is `0..=D`.
//! - `hop_budget` (ΔExp): truncation point of the hop summation.
//!
//! Parameters come from a named [`Preset`], a JSON document, or both (JSON
//! fields missing from the document fall back to the `analysis` preset).

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Deepest supported bucket. Keeps `2^-(d+1)` a normal `f64`.
pub const MAX_SUPPORTED_DEPTH: u32 = 1021;

/// How the overflow evaluator treats depths where the Chernoff bound does
/// not apply (expected load at or above capacity).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TailPolicy {
    /// Report probability 1.0 once expected load reaches capacity.
    #[default]
    Saturating,
    /// Keep the raw formula for `delta <= 0`. The value stays finite and
    /// below 1 there but is not an upper bound. Comparison use only.
    Literal,
}

impl TailPolicy {
    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Result<Self, ParamError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saturating" | "saturate" | "clamp" | "clamped" | "default" => Ok(Self::Saturating),
            "literal" | "raw" | "uncorrected" => Ok(Self::Literal),
            _ => Err(ParamError::UnknownTailPolicy(s.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Saturating => "saturating",
            Self::Literal => "literal",
        }
    }

    /// Returns true if saturated depths are clamped to probability 1.0.
    #[must_use]
    pub const fn clamps_saturation(self) -> bool {
        matches!(self, Self::Saturating)
    }
}

/// Named parameter sets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Z=100, x=10^6, y=10^6, D=30, ΔExp=1000.
    #[default]
    Analysis,
    /// Deployed tree shape: Z=50, D=18, messages live 1000 epochs, and
    /// 2^18 / 1000 writers per epoch each sampling one path, so `y = x`.
    Deployment,
}

impl Preset {
    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Result<Self, ParamError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analysis" | "default" | "paper" => Ok(Self::Analysis),
            "deployment" | "deployed" | "d18" => Ok(Self::Deployment),
            _ => Err(ParamError::UnknownPreset(s.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Deployment => "deployment",
        }
    }

    #[must_use]
    pub const fn params(self) -> ModelParams {
        match self {
            Self::Analysis => ModelParams {
                capacity: 100,
                items: 1_000_000,
                paths: 1_000_000,
                max_depth: 30,
                hop_budget: 1000,
                tail_policy: TailPolicy::Saturating,
            },
            Self::Deployment => {
                const TREE_DEPTH: u32 = 18;
                const MESSAGE_LIFETIME: u32 = 1000;
                const PATHS_PER_WRITE: u64 = 1;
                const WRITERS_PER_EPOCH: u64 = (1u64 << TREE_DEPTH) / MESSAGE_LIFETIME as u64;
                ModelParams {
                    capacity: 50,
                    items: WRITERS_PER_EPOCH,
                    paths: WRITERS_PER_EPOCH * PATHS_PER_WRITE,
                    max_depth: TREE_DEPTH,
                    hop_budget: MESSAGE_LIFETIME,
                    tail_policy: TailPolicy::Saturating,
                }
            }
        }
    }
}

/// Immutable configuration of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub capacity: u64,
    pub items: u64,
    pub paths: u64,
    pub max_depth: u32,
    pub hop_budget: u32,
    pub tail_policy: TailPolicy,
}

impl Default for ModelParams {
    fn default() -> Self {
        Preset::Analysis.params()
    }
}

impl ModelParams {
    /// Reject configurations that would produce NaN/Inf sequences.
    ///
    /// Reports the first violated constraint in field order.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.capacity == 0 {
            return Err(ParamError::ZeroCapacity);
        }
        if self.items == 0 {
            return Err(ParamError::ZeroItems);
        }
        if self.paths == 0 {
            return Err(ParamError::ZeroPaths);
        }
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(ParamError::DepthTooLarge {
                max_depth: self.max_depth,
                limit: MAX_SUPPORTED_DEPTH,
            });
        }
        if self.hop_budget == 0 {
            return Err(ParamError::ZeroHopBudget);
        }
        Ok(())
    }

    /// The depth grid `0..=D`.
    #[must_use]
    pub fn depths(&self) -> RangeInclusive<u32> {
        0..=self.max_depth
    }

    #[must_use]
    pub const fn with_hop_budget(mut self, hop_budget: u32) -> Self {
        self.hop_budget = hop_budget;
        self
    }

    #[must_use]
    pub const fn with_items(mut self, items: u64) -> Self {
        self.items = items;
        self
    }

    #[must_use]
    pub const fn with_tail_policy(mut self, tail_policy: TailPolicy) -> Self {
        self.tail_policy = tail_policy;
        self
    }

    /// Load parameters from a JSON string. Missing fields keep their
    /// `analysis` defaults. The result is not validated.
    pub fn from_json(json: &str) -> Result<Self, ParamError> {
        Self::from_json_over(Preset::Analysis.params(), json)
    }

    /// Load parameters from a JSON string, taking any field the document
    /// omits from `base`. The result is not validated.
    pub fn from_json_over(base: ModelParams, json: &str) -> Result<Self, ParamError> {
        let mut doc: serde_json::Value = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(base)?;
        match (merged.as_object_mut(), doc.as_object_mut()) {
            (Some(base_obj), Some(doc_obj)) => base_obj.extend(std::mem::take(doc_obj)),
            _ => merged = doc,
        }
        Ok(serde_json::from_value(merged)?)
    }

    /// Load parameters from a JSON file over `base`.
    pub fn from_file_over(base: ModelParams, path: &Path) -> Result<Self, ParamError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_over(base, &content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_presets() {
        assert_eq!(Preset::from_str_loose("analysis").unwrap(), Preset::Analysis);
        assert_eq!(Preset::from_str_loose("PAPER").unwrap(), Preset::Analysis);
        assert_eq!(Preset::from_str_loose("default").unwrap(), Preset::Analysis);
        assert_eq!(
            Preset::from_str_loose(" Deployment ").unwrap(),
            Preset::Deployment
        );
        assert_eq!(Preset::from_str_loose("d18").unwrap(), Preset::Deployment);
        assert!(matches!(
            Preset::from_str_loose("bogus"),
            Err(ParamError::UnknownPreset(name)) if name == "bogus"
        ));
    }

    #[test]
    fn parse_tail_policies() {
        assert_eq!(
            TailPolicy::from_str_loose("saturating").unwrap(),
            TailPolicy::Saturating
        );
        assert_eq!(
            TailPolicy::from_str_loose("CLAMP").unwrap(),
            TailPolicy::Saturating
        );
        assert_eq!(
            TailPolicy::from_str_loose("literal").unwrap(),
            TailPolicy::Literal
        );
        assert_eq!(TailPolicy::from_str_loose("raw").unwrap(), TailPolicy::Literal);
        assert!(TailPolicy::from_str_loose("off").is_err());
    }

    #[test]
    fn default_is_analysis_preset() {
        let p = ModelParams::default();
        assert_eq!(p.capacity, 100);
        assert_eq!(p.items, 1_000_000);
        assert_eq!(p.paths, 1_000_000);
        assert_eq!(p.max_depth, 30);
        assert_eq!(p.hop_budget, 1000);
        assert_eq!(p.tail_policy, TailPolicy::Saturating);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn deployment_preset_matches_tree_shape() {
        let p = Preset::Deployment.params();
        assert_eq!(p.capacity, 50);
        assert_eq!(p.max_depth, 18);
        assert_eq!(p.items, 262);
        assert_eq!(p.paths, 262);
        assert_eq!(p.hop_budget, 1000);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn validation_rejects_zero_fields_in_order() {
        let base = ModelParams::default();

        let p = ModelParams { capacity: 0, items: 0, ..base };
        assert!(matches!(p.validate(), Err(ParamError::ZeroCapacity)));

        let p = ModelParams { items: 0, ..base };
        assert!(matches!(p.validate(), Err(ParamError::ZeroItems)));

        let p = ModelParams { paths: 0, ..base };
        assert!(matches!(p.validate(), Err(ParamError::ZeroPaths)));

        let p = ModelParams { hop_budget: 0, ..base };
        assert!(matches!(p.validate(), Err(ParamError::ZeroHopBudget)));
    }

    #[test]
    fn validation_rejects_unsupported_depth() {
        let p = ModelParams {
            max_depth: MAX_SUPPORTED_DEPTH + 1,
            ..ModelParams::default()
        };
        let err = p.validate().unwrap_err();
        assert!(matches!(err, ParamError::DepthTooLarge { limit, .. } if limit == MAX_SUPPORTED_DEPTH));
        assert!(err.to_string().contains("1022"));
    }

    #[test]
    fn depth_zero_grid_is_valid() {
        let p = ModelParams {
            max_depth: 0,
            ..ModelParams::default()
        };
        assert!(p.validate().is_ok());
        assert_eq!(p.depths().count(), 1);
    }

    #[test]
    fn json_missing_fields_fall_back_to_analysis() {
        let p = ModelParams::from_json(r#"{"capacity": 64, "tail_policy": "literal"}"#).unwrap();
        assert_eq!(p.capacity, 64);
        assert_eq!(p.tail_policy, TailPolicy::Literal);
        assert_eq!(p.items, 1_000_000);
        assert_eq!(p.max_depth, 30);
    }

    #[test]
    fn json_over_deployment_keeps_preset_fields() {
        let base = Preset::Deployment.params();
        let p = ModelParams::from_json_over(base, r#"{"hop_budget": 10}"#).unwrap();
        assert_eq!(p, ModelParams { hop_budget: 10, ..base });
        assert_eq!(p.paths, 262);
        assert_eq!(p.max_depth, 18);
    }

    #[test]
    fn file_over_base_reads_document() {
        let path = std::env::temp_dir().join(format!("bucketrisk_params_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"capacity": 40, "tail_policy": "literal"}"#).unwrap();
        let base = Preset::Deployment.params();
        let p = ModelParams::from_file_over(base, &path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(p.capacity, 40);
        assert_eq!(p.tail_policy, TailPolicy::Literal);
        assert_eq!(p.items, base.items);
        assert!(matches!(
            ModelParams::from_file_over(base, &path),
            Err(ParamError::Io(_))
        ));
    }

    #[test]
    fn json_rejects_negative_depth() {
        assert!(matches!(
            ModelParams::from_json(r#"{"max_depth": -1}"#),
            Err(ParamError::Json(_))
        ));
    }

    #[test]
    fn json_roundtrip_preserves_params() {
        let p = Preset::Deployment.params().with_tail_policy(TailPolicy::Literal);
        let json = p.to_json().unwrap();
        assert!(json.contains("\"tail_policy\": \"literal\""));
        assert_eq!(ModelParams::from_json(&json).unwrap(), p);
    }
}
