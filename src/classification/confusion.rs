use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Result of classifying one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    TruePositive,
    TrueNegative,
    FalsePositive,
    FalseNegative,
}

/// Classify a detector score against a threshold
///
/// `predicted_positive = score > threshold`; a score equal to the threshold is
/// a negative prediction.
///
/// # Example
/// ```
/// use covert_metrics::classification::{classify, Outcome};
///
/// assert_eq!(classify(1500.0, 1000.0, true), Outcome::TruePositive);
/// assert_eq!(classify(500.0, 1000.0, false), Outcome::TrueNegative);
/// assert_eq!(classify(1500.0, 1000.0, false), Outcome::FalsePositive);
/// assert_eq!(classify(500.0, 1000.0, true), Outcome::FalseNegative);
/// assert_eq!(classify(1000.0, 1000.0, true), Outcome::FalseNegative);
/// ```
pub fn classify(score: f64, threshold: f64, ground_truth_positive: bool) -> Outcome {
    let predicted_positive = score > threshold;
    match (ground_truth_positive, predicted_positive) {
        (true, true) => Outcome::TruePositive,
        (false, false) => Outcome::TrueNegative,
        (false, true) => Outcome::FalsePositive,
        (true, false) => Outcome::FalseNegative,
    }
}

/// Counts of the four classification outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: u64,
    pub tn: u64,
    pub fp: u64,
    #[serde(rename = "fn")]
    pub fn_: u64,
}

impl From<Outcome> for ConfusionMatrix {
    fn from(outcome: Outcome) -> Self {
        let mut m = Self::default();
        m.record(outcome);
        m
    }
}

impl Add for ConfusionMatrix {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            tp: self.tp + other.tp,
            tn: self.tn + other.tn,
            fp: self.fp + other.fp,
            fn_: self.fn_ + other.fn_,
        }
    }
}

impl AddAssign for ConfusionMatrix {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum<Outcome> for ConfusionMatrix {
    fn sum<I: Iterator<Item = Outcome>>(iter: I) -> Self {
        let mut m = Self::default();
        for outcome in iter {
            m.record(outcome);
        }
        m
    }
}

impl Sum for ConfusionMatrix {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl FromIterator<Outcome> for ConfusionMatrix {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        iter.into_iter().sum()
    }
}

/// `numerator / denominator`, 0 when the denominator is 0
fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

impl ConfusionMatrix {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::TruePositive => self.tp += 1,
            Outcome::TrueNegative => self.tn += 1,
            Outcome::FalsePositive => self.fp += 1,
            Outcome::FalseNegative => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Ground-truth positives (`tp + fn`)
    pub fn actual_positives(&self) -> u64 {
        self.tp + self.fn_
    }

    /// Ground-truth negatives (`tn + fp`)
    pub fn actual_negatives(&self) -> u64 {
        self.tn + self.fp
    }

    pub fn accuracy(&self) -> f64 {
        safe_div((self.tp + self.tn) as f64, self.total() as f64)
    }

    pub fn precision(&self) -> f64 {
        safe_div(self.tp as f64, (self.tp + self.fp) as f64)
    }

    /// True positive rate
    pub fn recall(&self) -> f64 {
        safe_div(self.tp as f64, self.actual_positives() as f64)
    }

    /// True negative rate
    pub fn specificity(&self) -> f64 {
        safe_div(self.tn as f64, self.actual_negatives() as f64)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        safe_div(2.0 * p * r, p + r)
    }

    /// F-beta with beta = 2: `5PR / (4P + R)`
    pub fn f2(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        safe_div(5.0 * p * r, 4.0 * p + r)
    }

    /// Why some derived metrics are 0 by convention, if they are
    pub fn degeneracy(&self) -> Option<Degeneracy> {
        if self.total() == 0 {
            Some(Degeneracy::Empty)
        } else if self.actual_positives() == 0 {
            Some(Degeneracy::NoPositives)
        } else if self.actual_negatives() == 0 {
            Some(Degeneracy::NoNegatives)
        } else {
            None
        }
    }

    pub fn metrics(&self) -> DetectionMetrics {
        DetectionMetrics {
            matrix: *self,
            total: self.total(),
            accuracy: self.accuracy(),
            precision: self.precision(),
            recall: self.recall(),
            specificity: self.specificity(),
            f1: self.f1(),
            f2: self.f2(),
            degeneracy: self.degeneracy(),
        }
    }
}

/// Explained zero-denominator states of a confusion matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    /// No samples at all: every metric is 0 and carries no information
    Empty,
    /// Negative-only corpus: TP = FN = 0, so precision, recall, F1 and F2 are 0
    NoPositives,
    /// Positive-only corpus: TN = FP = 0, so specificity is 0
    NoNegatives,
}

impl Degeneracy {
    pub fn explain(&self) -> &'static str {
        match self {
            Degeneracy::Empty => "no samples; all metrics are 0 by convention (insufficient data)",
            Degeneracy::NoPositives => {
                "no covert samples in this corpus; precision and recall are mathematically 0 \
                 (TP = FN = 0). Accuracy and specificity measure false-positive avoidance"
            }
            Degeneracy::NoNegatives => {
                "no normal samples in this corpus; specificity is 0 by convention (TN = FP = 0) \
                 and precision is 1 whenever any sample is detected"
            }
        }
    }
}

/// Confusion matrix with its derived metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionMetrics {
    pub matrix: ConfusionMatrix,
    pub total: u64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub specificity: f64,
    pub f1: f64,
    pub f2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degeneracy: Option<Degeneracy>,
}
