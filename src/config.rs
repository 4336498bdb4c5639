// File: src/config.rs
use crate::core::resolver::{ResolveMode, Resolver, DEFAULT_MAX_SEARCH_STEPS};
use crate::fuzzy::align::{AlignmentPolicy, PolicyKind, DEFAULT_THRESHOLD};
use crate::loader::LoaderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("threshold must be within [0, 1], got {0}")]
    Threshold(f64),
}

/// Tunables shared by the loader, the alignment policies and the resolver.
/// Every field is optional in the JSON file and falls back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum Jaro-Winkler score for the threshold and blended policies.
    pub threshold: f64,
    pub max_search_steps: usize,
    pub skip_malformed_cast: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_search_steps: DEFAULT_MAX_SEARCH_STEPS,
            skip_malformed_cast: LoaderConfig::default().skip_malformed_cast,
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        Ok(())
    }

    pub fn policy(&self, kind: PolicyKind) -> Box<dyn AlignmentPolicy> {
        kind.build(self.threshold)
    }

    pub fn resolver(&self, mode: ResolveMode) -> Resolver {
        Resolver::new(mode).with_max_steps(self.max_search_steps)
    }

    pub fn loader(&self) -> LoaderConfig {
        LoaderConfig { skip_malformed_cast: self.skip_malformed_cast }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "threshold": 0.9 }}"#).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.threshold, 0.9);
        assert_eq!(config.max_search_steps, DEFAULT_MAX_SEARCH_STEPS);
        assert!(config.skip_malformed_cast);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "threshold": 1.5 }}"#).unwrap();
        assert!(matches!(EngineConfig::from_file(file.path()), Err(ConfigError::Threshold(_))));
    }

    #[test]
    fn builds_configured_resolver() {
        let config = EngineConfig { max_search_steps: 7, ..EngineConfig::default() };
        assert_eq!(config.resolver(ResolveMode::Hard).mode(), ResolveMode::Hard);
        assert_eq!(config.policy(PolicyKind::Blended).name(), "blended");
    }
}
