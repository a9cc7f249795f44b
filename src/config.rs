//! Analysis configuration
//!
//! Every constant shared between the parser, estimator, classifier and
//! comparator lives in one immutable [`AnalysisConfig`] that callers thread
//! into each component. Loaded from TOML or built from [`Default`].

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Delimiter written by the receiver before every reassembled message
pub const DEFAULT_TRIAL_DELIMITER: &str = "--- Covert Channel Simulation ---";

/// Delimiter written by the detector before every threat assessment
pub const DEFAULT_ASSESSMENT_DELIMITER: &str = "=== DNS Threat Level Assessment ===";

/// Weights of the composite effectiveness score
///
/// The score is indicative only; it is not a statistically validated metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectivenessWeights {
    pub capacity_reduction: f64,
    pub correctness_impact: f64,
    pub success_rate_impact: f64,
}

impl Default for EffectivenessWeights {
    fn default() -> Self {
        Self {
            capacity_reduction: 0.4,
            correctness_impact: 0.3,
            success_rate_impact: 0.3,
        }
    }
}

/// One experimental condition backed by a receiver log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Display label, e.g. "No Mitigation" or "Typed Small With 5ms Delay"
    pub label: String,

    /// Path to the block-delimited receiver log
    pub path: PathBuf,

    /// Raw units the encoding spends per logical byte
    ///
    /// Chunk rate and bytes-per-chunk are divided by this factor. The TXT and
    /// CNAME encodings use 1; the record-type encoding spends 4 queries per
    /// byte.
    #[serde(default = "default_symbols_per_byte")]
    pub symbols_per_byte: u32,
}

impl ConditionSpec {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            symbols_per_byte: default_symbols_per_byte(),
        }
    }

    pub fn with_symbols_per_byte(mut self, symbols_per_byte: u32) -> Self {
        self.symbols_per_byte = symbols_per_byte;
        self
    }
}

fn default_symbols_per_byte() -> u32 {
    1
}

/// A narrative detector/proxy log for one mitigation strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSpec {
    pub label: String,
    pub path: PathBuf,
}

/// Configuration for the whole measurement pipeline
///
/// # Example
/// ```
/// use covert_metrics::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.detection_threshold, 1000.0);
/// assert_eq!(config.z_score, 1.96); // 95% two-sided normal approximation
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Scores strictly above this value are positive (covert) verdicts
    pub detection_threshold: f64,

    /// Critical value of the confidence interval half-width
    pub z_score: f64,

    /// Delimiter between receiver trial blocks
    pub trial_delimiter: String,

    /// Delimiter between detector threat-assessment blocks
    pub assessment_delimiter: String,

    /// Label preceding the score in narrative proxy logs
    ///
    /// "Suspicion Score" for mitigation proxy logs. "Score" also matches the
    /// threat-level lines, which duplicate every assessment.
    pub score_label: String,

    /// Marker text of a dropped-packet event
    pub dropped_marker: String,

    /// Marker text of a delayed-packet event
    pub delayed_marker: String,

    /// How many times the proxy writes each drop/delay event
    pub marker_multiplicity: u32,

    /// Label of the unmitigated condition all others are compared against
    pub baseline: String,

    pub weights: EffectivenessWeights,

    #[serde(rename = "condition", skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionSpec>,

    #[serde(rename = "detector", skip_serializing_if = "Vec::is_empty")]
    pub detectors: Vec<DetectorSpec>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            detection_threshold: 1000.0,
            z_score: 1.96,
            trial_delimiter: DEFAULT_TRIAL_DELIMITER.to_string(),
            assessment_delimiter: DEFAULT_ASSESSMENT_DELIMITER.to_string(),
            score_label: "Suspicion Score".to_string(),
            dropped_marker: "PACKET DROPPED".to_string(),
            delayed_marker: "PACKET DELAYED".to_string(),
            marker_multiplicity: 2,
            baseline: "No Mitigation".to_string(),
            weights: EffectivenessWeights::default(),
            conditions: Vec::new(),
            detectors: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a configuration file
    ///
    /// # Example TOML
    /// ```toml
    /// detection_threshold = 1000.0
    /// baseline = "No Mitigation"
    ///
    /// [[condition]]
    /// label = "No Mitigation"
    /// path = "no_mitigation-receiver-logs.txt"
    ///
    /// [[condition]]
    /// label = "Typed Small With 5ms Delay"
    /// path = "typed_small.txt_5.txt"
    /// symbols_per_byte = 4
    ///
    /// [[detector]]
    /// label = "Delay Strategy"
    /// path = "delay-strategy-mitm.log"
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Block-delimited threat assessments carry a bare `Score:` label
    pub fn threat_assessment() -> Self {
        Self {
            score_label: "Score".to_string(),
            ..Self::default()
        }
    }

    pub fn condition(&self, label: &str) -> Option<&ConditionSpec> {
        self.conditions.iter().find(|c| c.label == label)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.detection_threshold.is_finite() {
            return Err(AnalysisError::Config(format!(
                "detection_threshold must be finite, got {}",
                self.detection_threshold
            )));
        }

        if !self.z_score.is_finite() || self.z_score <= 0.0 {
            return Err(AnalysisError::Config(format!(
                "z_score must be positive, got {}",
                self.z_score
            )));
        }

        for (name, value) in [
            ("trial_delimiter", &self.trial_delimiter),
            ("assessment_delimiter", &self.assessment_delimiter),
            ("score_label", &self.score_label),
            ("dropped_marker", &self.dropped_marker),
            ("delayed_marker", &self.delayed_marker),
        ] {
            if value.trim().is_empty() {
                return Err(AnalysisError::Config(format!("{} must not be empty", name)));
            }
        }

        if self.marker_multiplicity == 0 {
            return Err(AnalysisError::Config(
                "marker_multiplicity must be >= 1".to_string(),
            ));
        }

        let w = &self.weights;
        for (name, value) in [
            ("capacity_reduction", w.capacity_reduction),
            ("correctness_impact", w.correctness_impact),
            ("success_rate_impact", w.success_rate_impact),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::Config(format!(
                    "weight {} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        let mut seen = HashSet::new();
        for condition in &self.conditions {
            if condition.symbols_per_byte == 0 {
                return Err(AnalysisError::Config(format!(
                    "condition '{}': symbols_per_byte must be >= 1",
                    condition.label
                )));
            }
            if !seen.insert(condition.label.as_str()) {
                return Err(AnalysisError::Config(format!(
                    "duplicate condition label '{}'",
                    condition.label
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.detection_threshold, 1000.0);
        assert_eq!(config.z_score, 1.96);
        assert_eq!(config.marker_multiplicity, 2);
        assert_eq!(config.baseline, "No Mitigation");
        assert_eq!(config.weights.capacity_reduction, 0.4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threat_assessment_preset() {
        let config = AnalysisConfig::threat_assessment();
        assert_eq!(config.score_label, "Score");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str_with_conditions() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            detection_threshold = 750.0

            [[condition]]
            label = "No Mitigation"
            path = "baseline.txt"

            [[condition]]
            label = "Typed Small"
            path = "typed.txt"
            symbols_per_byte = 4

            [[detector]]
            label = "Drop Strategy"
            path = "drop.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.detection_threshold, 750.0);
        assert_eq!(config.z_score, 1.96);
        assert_eq!(config.conditions.len(), 2);
        assert_eq!(config.conditions[0].symbols_per_byte, 1);
        assert_eq!(config.condition("Typed Small").unwrap().symbols_per_byte, 4);
        assert_eq!(config.detectors[0].label, "Drop Strategy");
    }

    #[test]
    fn test_from_toml_str_rejects_duplicate_labels() {
        let result = AnalysisConfig::from_toml_str(
            r#"
            [[condition]]
            label = "A"
            path = "a.txt"

            [[condition]]
            label = "A"
            path = "b.txt"
            "#,
        );
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_from_toml_str_syntax_error() {
        let result = AnalysisConfig::from_toml_str("detection_threshold = ");
        assert!(matches!(result, Err(AnalysisError::ConfigParse(_))));
    }

    #[test]
    fn test_from_toml_missing_file() {
        let result = AnalysisConfig::from_toml("/nonexistent/analysis.toml");
        assert!(matches!(result, Err(AnalysisError::Io { .. })));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_z_score() {
        let mut config = AnalysisConfig::default();
        config.z_score = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_marker_multiplicity() {
        let mut config = AnalysisConfig::default();
        config.marker_multiplicity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_symbols_per_byte() {
        let mut config = AnalysisConfig::default();
        config
            .conditions
            .push(ConditionSpec::new("Typed", "typed.txt").with_symbols_per_byte(0));
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_negative_weight() {
        let mut config = AnalysisConfig::default();
        config.weights.correctness_impact = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_empty_delimiter() {
        let mut config = AnalysisConfig::default();
        config.trial_delimiter = "   ".to_string();
        assert!(config.validate().is_err());
    }
}
