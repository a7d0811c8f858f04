//! Configuration management for the form analysis engine

use crate::catalogue::Catalogue;
use crate::constants::{
    DEFAULT_BETA, DEFAULT_DERIVATIVE_CUTOFF, DEFAULT_MIN_CUTOFF, DEFAULT_SYMMETRY_SCALE,
    VISIBILITY_CONFIDENCE_THRESHOLD, VISIBILITY_DWELL_MS,
};
use crate::filters::{one_euro::OneEuroParams, FilterKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Smoothing filter configuration
    pub filter: FilterConfig,

    /// Visibility gate configuration
    pub visibility: VisibilityConfig,

    /// Rule and repetition analysis configuration
    pub analysis: AnalysisConfig,

    /// Optional YAML exercise catalogue; the built-in catalogue is used when absent
    pub catalogue: Option<PathBuf>,
}

/// Smoothing filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter type (`one_euro` or `none`)
    pub kind: String,

    /// One-Euro cutoff at rest (Hz)
    pub min_cutoff: f64,

    /// One-Euro speed coefficient
    pub beta: f64,

    /// One-Euro derivative cutoff (Hz)
    pub derivative_cutoff: f64,
}

/// Visibility gate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Minimum detector confidence (0.0-1.0)
    pub confidence_threshold: f64,

    /// Continuous dwell before a joint is stable (ms)
    pub dwell_ms: f64,
}

/// Analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Exercise active at startup
    pub default_exercise: String,

    /// Symmetry normalization (px) when shoulder width is unavailable
    pub symmetry_fallback_scale: f64,

    /// Clear smoothing filters when the exercise changes
    pub reset_filters_on_switch: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: "one_euro".to_string(),
            min_cutoff: DEFAULT_MIN_CUTOFF,
            beta: DEFAULT_BETA,
            derivative_cutoff: DEFAULT_DERIVATIVE_CUTOFF,
        }
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: VISIBILITY_CONFIDENCE_THRESHOLD,
            dwell_ms: VISIBILITY_DWELL_MS,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_exercise: "squat".to_string(),
            symmetry_fallback_scale: DEFAULT_SYMMETRY_SCALE,
            reset_filters_on_switch: true,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Resolve the filter section into a filter kind
    pub fn filter_kind(&self) -> Result<FilterKind> {
        match self.filter.kind.as_str() {
            "one_euro" => {
                let params = OneEuroParams {
                    min_cutoff: self.filter.min_cutoff,
                    beta: self.filter.beta,
                    derivative_cutoff: self.filter.derivative_cutoff,
                };
                params.validate()?;
                Ok(FilterKind::OneEuro(params))
            }
            name => FilterKind::parse(name),
        }
    }

    /// Load the configured catalogue, or the built-in one
    pub fn load_catalogue(&self) -> Result<Catalogue> {
        match &self.catalogue {
            Some(path) => Catalogue::from_file(path),
            None => Ok(Catalogue::builtin()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.filter_kind()
            .map_err(|e| Error::ConfigError(format!("Invalid filter settings: {}", e)))?;

        if !(0.0..=1.0).contains(&self.visibility.confidence_threshold) {
            return Err(Error::ConfigError(
                "Visibility confidence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(self.visibility.dwell_ms.is_finite() && self.visibility.dwell_ms >= 0.0) {
            return Err(Error::ConfigError("Visibility dwell must be non-negative".to_string()));
        }

        if !(self.analysis.symmetry_fallback_scale.is_finite() && self.analysis.symmetry_fallback_scale > 0.0) {
            return Err(Error::ConfigError(
                "Symmetry fallback scale must be greater than 0".to_string(),
            ));
        }
        if self.analysis.default_exercise.is_empty() {
            return Err(Error::ConfigError("Default exercise must be set".to_string()));
        }

        if let Some(path) = &self.catalogue {
            if !path.exists() {
                return Err(Error::ConfigError(format!(
                    "Exercise catalogue not found: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Exercise Form Analysis Configuration

# Per-joint smoothing
filter:
  kind: "one_euro"
  min_cutoff: 6.5
  beta: 0.6
  derivative_cutoff: 1.0

# Visibility gating
visibility:
  confidence_threshold: 0.35
  dwell_ms: 150.0

# Rule and repetition analysis
analysis:
  default_exercise: "squat"
  symmetry_fallback_scale: 100.0
  reset_filters_on_switch: true

# Optional YAML exercise catalogue (built-in catalogue when omitted)
# catalogue: "exercises.yaml"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = serde_yaml::from_str("analysis:\n  default_exercise: bicepCurl\n").unwrap();
        assert_eq!(parsed.analysis.default_exercise, "bicepCurl");
        assert!(parsed.analysis.reset_filters_on_switch);
        assert_eq!(parsed.filter, FilterConfig::default());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.visibility.confidence_threshold = 1.5;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let mut config = Config::default();
        config.filter.kind = "median".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.filter.min_cutoff = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.catalogue = Some(PathBuf::from("does/not/exist.yaml"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_filter_kind_none() {
        let mut config = Config::default();
        config.filter.kind = "none".to_string();
        assert_eq!(config.filter_kind().unwrap(), FilterKind::None);
    }
}
