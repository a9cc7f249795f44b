//! Mean and confidence-interval estimation over repeated trials
//!
//! Two estimators are exposed and callers pick by the nature of the quantity:
//! - [`Estimator::estimate`] for continuous magnitudes (capacity, time, score),
//!   using the Bessel-corrected sample standard deviation
//! - [`Estimator::estimate_proportion`] for rates of success, using the
//!   standard error of a proportion and bounds clamped to `[0, 1]`
//!
//! Both use a normal approximation with a fixed critical value (1.96 for a
//! 95% two-sided interval by default).

use crate::config::AnalysisConfig;
use serde::{Deserialize, Serialize};

/// Whether a metric can take negative values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDomain {
    /// Capacity, time, score, rate: lower bound floored at 0
    NonNegative,
    /// No clamping
    Unbounded,
}

/// Why an estimate is incomplete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateNote {
    /// No samples: mean and bounds undefined
    NoSamples,
    /// One sample: no interval definable
    SingleSample,
}

impl EstimateNote {
    pub fn describe(&self) -> &'static str {
        match self {
            EstimateNote::NoSamples => "no samples; mean and confidence interval undefined",
            EstimateNote::SingleSample => {
                "need at least 2 samples for a confidence interval; reporting mean only"
            }
        }
    }
}

/// Mean with optional two-sided confidence bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub mean: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Number of samples the estimate is based on
    pub samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<EstimateNote>,
}

impl EstimateResult {
    pub fn empty() -> Self {
        Self {
            mean: None,
            lower: None,
            upper: None,
            samples: 0,
            note: Some(EstimateNote::NoSamples),
        }
    }

    fn single(value: f64) -> Self {
        Self {
            mean: Some(value),
            lower: None,
            upper: None,
            samples: 1,
            note: Some(EstimateNote::SingleSample),
        }
    }

    /// Mean, or 0 when undefined
    pub fn mean_or_zero(&self) -> f64 {
        self.mean.unwrap_or(0.0)
    }

    /// Distances `(mean - lower, upper - mean)` for error bars
    ///
    /// Missing bounds collapse to a zero-length bar at the mean.
    pub fn error_bar(&self) -> Option<(f64, f64)> {
        let mean = self.mean?;
        let lower = self.lower.unwrap_or(mean);
        let upper = self.upper.unwrap_or(mean);
        Some((mean - lower, upper - mean))
    }

    /// Both bounds present
    pub fn has_interval(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }
}

/// Normal-approximation interval estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimator {
    z_score: f64,
}

impl Default for Estimator {
    fn default() -> Self {
        Self { z_score: 1.96 }
    }
}

impl Estimator {
    pub fn new(z_score: f64) -> Self {
        Self { z_score }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.z_score)
    }

    pub fn z_score(&self) -> f64 {
        self.z_score
    }

    /// Estimate the mean of a continuous magnitude
    ///
    /// # Example
    /// ```
    /// use covert_metrics::estimator::{Estimator, MetricDomain};
    ///
    /// let est = Estimator::default();
    /// assert_eq!(est.estimate(&[], MetricDomain::NonNegative).mean, None);
    ///
    /// let one = est.estimate(&[4.0], MetricDomain::NonNegative);
    /// assert_eq!((one.mean, one.lower, one.upper), (Some(4.0), None, None));
    ///
    /// let flat = est.estimate(&[7.0, 7.0, 7.0], MetricDomain::NonNegative);
    /// assert_eq!((flat.mean, flat.lower, flat.upper), (Some(7.0), Some(7.0), Some(7.0)));
    /// ```
    pub fn estimate(&self, samples: &[f64], domain: MetricDomain) -> EstimateResult {
        match samples.len() {
            0 => EstimateResult::empty(),
            1 => EstimateResult::single(samples[0]),
            n => {
                // Sorted copy: summation order must not depend on input order
                let mut sorted = samples.to_vec();
                sorted.sort_by(f64::total_cmp);

                let mean = mean(&sorted);
                let stddev = sample_stddev(&sorted, mean);
                let margin = self.z_score * stddev / (n as f64).sqrt();

                let mut lower = mean - margin;
                if domain == MetricDomain::NonNegative {
                    // never above the mean, even for out-of-domain samples
                    lower = lower.max(0.0).min(mean);
                }

                EstimateResult {
                    mean: Some(mean),
                    lower: Some(lower),
                    upper: Some(mean + margin),
                    samples: n,
                    note: None,
                }
            }
        }
    }

    /// Estimate a success proportion from `successes` out of `trials`
    ///
    /// Uses `sqrt(p(1-p)/n)` as the standard error; bounds clamped to `[0, 1]`.
    pub fn estimate_proportion(&self, successes: usize, trials: usize) -> EstimateResult {
        match trials {
            0 => EstimateResult::empty(),
            1 => EstimateResult::single(if successes >= 1 { 1.0 } else { 0.0 }),
            n => {
                let p = successes.min(n) as f64 / n as f64;
                let se = (p * (1.0 - p) / n as f64).sqrt();
                let margin = self.z_score * se;

                EstimateResult {
                    mean: Some(p),
                    lower: Some((p - margin).max(0.0)),
                    upper: Some((p + margin).min(1.0)),
                    samples: n,
                    note: None,
                }
            }
        }
    }

    /// Proportion of `true` flags
    pub fn estimate_flags(&self, flags: &[bool]) -> EstimateResult {
        let successes = flags.iter().filter(|&&f| f).count();
        self.estimate_proportion(successes, flags.len())
    }
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Sample standard deviation (divisor n - 1), 0 for fewer than 2 samples
pub fn sample_stddev(samples: &[f64], mean: f64) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
    (sum_sq / (samples.len() - 1) as f64).sqrt()
}
