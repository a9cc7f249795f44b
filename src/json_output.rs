//! JSON output format for analysis reports

use crate::error::Result;
use serde::Serialize;

/// Versioned envelope around any report
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a, T: Serialize> {
    /// Crate version that produced the report
    pub version: String,
    /// Format name
    pub format: String,
    /// Which analysis produced `report`
    pub analysis: &'a str,
    pub report: &'a T,
}

impl<'a, T: Serialize> JsonOutput<'a, T> {
    pub fn new(analysis: &'a str, report: &'a T) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "covert-metrics-json-v1".to_string(),
            analysis,
            report,
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{Estimator, MetricDomain};

    #[test]
    fn test_json_envelope() {
        let estimate = Estimator::default().estimate(&[10.0, 20.0], MetricDomain::NonNegative);
        let json = JsonOutput::new("capacity", &estimate).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["format"], "covert-metrics-json-v1");
        assert_eq!(value["analysis"], "capacity");
        assert_eq!(value["report"]["mean"], 15.0);
        assert_eq!(value["report"]["samples"], 2);
    }

    #[test]
    fn test_undefined_estimate_serializes_null() {
        let estimate = Estimator::default().estimate(&[], MetricDomain::NonNegative);
        let json = JsonOutput::new("capacity", &estimate).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["report"]["mean"].is_null());
        assert_eq!(value["report"]["note"], "no_samples");
    }
}
