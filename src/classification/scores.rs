//! Descriptive statistics over a corpus of detector scores
//!
//! Location and spread come from `trueno::Vector` (population stddev), the
//! median from `aprender`'s R-7 quantile. The confidence interval on the mean
//! uses the f64 [`Estimator`] so it matches every other reported interval.

use crate::estimator::{EstimateResult, Estimator, MetricDomain};
use aprender::stats::DescriptiveStats;
use serde::{Deserialize, Serialize};
use trueno::Vector;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// Mean with confidence bounds
    pub estimate: EstimateResult,
}

impl ScoreSummary {
    /// Summarize `scores`; `None` for an empty corpus
    pub fn from_scores(scores: &[f64], estimator: &Estimator) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }

        let narrowed: Vec<f32> = scores.iter().map(|&s| s as f32).collect();
        let v = Vector::from_slice(&narrowed);

        let median = DescriptiveStats::new(&v)
            .quantile(0.5)
            .map(f64::from)
            .map_err(|e| tracing::debug!("Median unavailable: {}", e))
            .ok();

        Some(Self {
            count: scores.len(),
            mean: f64::from(v.mean().unwrap_or(0.0)),
            stddev: f64::from(v.stddev().unwrap_or(0.0)),
            min: f64::from(v.min().unwrap_or(0.0)),
            max: f64::from(v.max().unwrap_or(0.0)),
            median,
            estimate: estimator.estimate(scores, MetricDomain::NonNegative),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scores() {
        assert!(ScoreSummary::from_scores(&[], &Estimator::default()).is_none());
    }

    #[test]
    fn test_score_summary() {
        let s = ScoreSummary::from_scores(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], &Estimator::default())
            .unwrap();
        assert_eq!(s.count, 8);
        assert!((s.mean - 5.0).abs() < 1e-4);
        assert!((s.stddev - 2.0).abs() < 1e-4);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert!((s.median.unwrap() - 4.5).abs() < 1e-4);
        assert_eq!(s.estimate.samples, 8);
        assert!(s.estimate.has_interval());
    }

    #[test]
    fn test_single_score() {
        let s = ScoreSummary::from_scores(&[1200.5], &Estimator::default()).unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.stddev, 0.0);
        assert_eq!(s.estimate.mean, Some(1200.5));
        assert!(!s.estimate.has_interval());
    }
}
