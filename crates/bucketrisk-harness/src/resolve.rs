//! Parameter resolution for the CLI.
//!
//! Precedence, lowest first: named preset, `--params` JSON file, individual
//! flags. The result is validated before it is returned.

use std::path::{Path, PathBuf};

use bucketrisk_model::{ModelParams, ParamError, Preset, TailPolicy};
use thiserror::Error;

/// Errors raised while turning CLI input into a runnable sweep.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("failed to read parameter file {}: {source}", path.display())]
    ParamsFile {
        path: PathBuf,
        #[source]
        source: ParamError,
    },
    #[error("invalid hop budget list '{raw}': {reason}")]
    HopBudgetList { raw: String, reason: String },
}

/// Raw parameter input as parsed from the command line.
#[derive(Debug, Clone, Default)]
pub struct ParamOverrides {
    pub preset: Option<String>,
    pub params_file: Option<PathBuf>,
    pub capacity: Option<u64>,
    pub items: Option<u64>,
    pub paths: Option<u64>,
    pub max_depth: Option<u32>,
    pub hop_budget: Option<u32>,
    pub tail_policy: Option<String>,
}

/// Parameters ready to sweep, with the preset they started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedParams {
    pub preset: Preset,
    pub params: ModelParams,
}

impl ParamOverrides {
    pub fn resolve(&self) -> Result<ResolvedParams, ResolveError> {
        let preset = match self.preset.as_deref() {
            Some(name) => Preset::from_str_loose(name)?,
            None => Preset::default(),
        };

        let mut params = match &self.params_file {
            Some(path) => load_params_file(path, preset)?,
            None => preset.params(),
        };

        if let Some(v) = self.capacity {
            params.capacity = v;
        }
        if let Some(v) = self.items {
            params.items = v;
        }
        if let Some(v) = self.paths {
            params.paths = v;
        }
        if let Some(v) = self.max_depth {
            params.max_depth = v;
        }
        if let Some(v) = self.hop_budget {
            params.hop_budget = v;
        }
        if let Some(raw) = self.tail_policy.as_deref() {
            params.tail_policy = TailPolicy::from_str_loose(raw)?;
        }

        params.validate()?;
        Ok(ResolvedParams { preset, params })
    }
}

/// Read a params file, filling fields it omits from `preset`.
fn load_params_file(path: &Path, preset: Preset) -> Result<ModelParams, ResolveError> {
    ModelParams::from_file_over(preset.params(), path).map_err(|source| {
        ResolveError::ParamsFile {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Parse a comma-separated hop budget list such as `10,100,1000`.
pub fn parse_hop_budgets(raw: &str) -> Result<Vec<u32>, ResolveError> {
    let fail = |reason: String| ResolveError::HopBudgetList {
        raw: raw.to_string(),
        reason,
    };
    let budgets = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|e| fail(format!("'{s}' is not a hop count ({e})")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if budgets.is_empty() {
        return Err(ParamError::EmptyHopBudgets.into());
    }
    Ok(budgets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "bucketrisk-resolve-{}-{name}",
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn no_input_resolves_to_analysis() {
        let resolved = ParamOverrides::default().resolve().unwrap();
        assert_eq!(resolved.preset, Preset::Analysis);
        assert_eq!(resolved.params, Preset::Analysis.params());
    }

    #[test]
    fn flags_override_preset() {
        let overrides = ParamOverrides {
            preset: Some(String::from("deployed")),
            capacity: Some(80),
            tail_policy: Some(String::from("literal")),
            ..ParamOverrides::default()
        };
        let resolved = overrides.resolve().unwrap();
        assert_eq!(resolved.preset, Preset::Deployment);
        assert_eq!(resolved.params.capacity, 80);
        assert_eq!(resolved.params.max_depth, 18);
        assert_eq!(resolved.params.tail_policy, TailPolicy::Literal);
    }

    #[test]
    fn file_fills_gaps_from_chosen_preset_and_flags_win() {
        let path = temp_file("partial.json", r#"{"capacity": 64, "hop_budget": 20}"#);
        let overrides = ParamOverrides {
            preset: Some(String::from("deployment")),
            params_file: Some(path.clone()),
            hop_budget: Some(30),
            ..ParamOverrides::default()
        };
        let resolved = overrides.resolve().unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(resolved.params.capacity, 64);
        assert_eq!(resolved.params.hop_budget, 30);
        // Omitted fields come from the deployment preset, not analysis.
        assert_eq!(resolved.params.items, Preset::Deployment.params().items);
        assert_eq!(resolved.params.max_depth, 18);
    }

    #[test]
    fn invalid_flags_fail_validation() {
        let overrides = ParamOverrides {
            paths: Some(0),
            ..ParamOverrides::default()
        };
        assert!(matches!(
            overrides.resolve(),
            Err(ResolveError::Param(ParamError::ZeroPaths))
        ));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let bad_preset = ParamOverrides {
            preset: Some(String::from("nope")),
            ..ParamOverrides::default()
        };
        assert!(matches!(
            bad_preset.resolve(),
            Err(ResolveError::Param(ParamError::UnknownPreset(_)))
        ));
        let bad_policy = ParamOverrides {
            tail_policy: Some(String::from("sometimes")),
            ..ParamOverrides::default()
        };
        assert!(matches!(
            bad_policy.resolve(),
            Err(ResolveError::Param(ParamError::UnknownTailPolicy(_)))
        ));
    }

    #[test]
    fn missing_file_names_the_path() {
        let overrides = ParamOverrides {
            params_file: Some(PathBuf::from("/nonexistent/bucketrisk/params.json")),
            ..ParamOverrides::default()
        };
        let err = overrides.resolve().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bucketrisk/params.json"));
    }

    #[test]
    fn hop_budget_lists_parse() {
        assert_eq!(parse_hop_budgets("10,100, 1000").unwrap(), vec![10, 100, 1000]);
        assert!(matches!(
            parse_hop_budgets(" , "),
            Err(ResolveError::Param(ParamError::EmptyHopBudgets))
        ));
        assert!(matches!(
            parse_hop_budgets("10,ten"),
            Err(ResolveError::HopBudgetList { .. })
        ));
    }
}
