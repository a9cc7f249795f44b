use super::confusion::{classify, ConfusionMatrix, DetectionMetrics};
use super::scores::ScoreSummary;
use crate::error::{AnalysisError, Result};
use crate::estimator::Estimator;
use serde::{Deserialize, Serialize};

/// Ground truth assigned to every sample of a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusLabel {
    Covert,
    Normal,
}

impl CorpusLabel {
    pub fn is_positive(&self) -> bool {
        matches!(self, CorpusLabel::Covert)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorpusLabel::Covert => "covert",
            CorpusLabel::Normal => "normal",
        }
    }
}

/// Classification results over one corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEvaluation {
    pub label: CorpusLabel,
    pub threshold: f64,
    pub metrics: DetectionMetrics,
    /// Samples with `score > threshold`
    pub above_threshold: usize,
    /// `above_threshold / samples`, 0 for an empty corpus
    pub above_threshold_share: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoreSummary>,
}

/// Per-corpus and combined results, reported side by side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvaluation {
    pub threshold: f64,
    pub covert: CorpusEvaluation,
    pub normal: CorpusEvaluation,
    pub combined: DetectionMetrics,
}

/// Classify every score of a corpus against its ground truth
pub fn evaluate_corpus(
    scores: &[f64],
    label: CorpusLabel,
    threshold: f64,
    estimator: &Estimator,
) -> CorpusEvaluation {
    let matrix: ConfusionMatrix = scores
        .iter()
        .map(|&s| classify(s, threshold, label.is_positive()))
        .collect();

    let above_threshold = scores.iter().filter(|&&s| s > threshold).count();
    let above_threshold_share = if scores.is_empty() {
        0.0
    } else {
        above_threshold as f64 / scores.len() as f64
    };

    CorpusEvaluation {
        label,
        threshold,
        metrics: matrix.metrics(),
        above_threshold,
        above_threshold_share,
        scores: ScoreSummary::from_scores(scores, estimator),
    }
}

/// Evaluate a detector on a covert corpus and a normal corpus
///
/// Both corpora must be non-empty. The combined matrix is the sum of the two
/// per-corpus matrices.
///
/// # Example
/// ```
/// use covert_metrics::classification::evaluate_combined;
/// use covert_metrics::estimator::Estimator;
///
/// let covert = vec![1500.0; 50];
/// let normal = vec![200.0; 100];
/// let eval = evaluate_combined(&covert, &normal, 1000.0, &Estimator::default()).unwrap();
/// assert_eq!(eval.combined.accuracy, 1.0);
/// assert_eq!(eval.combined.precision, 1.0);
/// assert_eq!(eval.combined.recall, 1.0);
/// ```
pub fn evaluate_combined(
    covert_scores: &[f64],
    normal_scores: &[f64],
    threshold: f64,
    estimator: &Estimator,
) -> Result<DetectionEvaluation> {
    if covert_scores.is_empty() {
        return Err(AnalysisError::EmptyCorpus { corpus: "covert" });
    }
    if normal_scores.is_empty() {
        return Err(AnalysisError::EmptyCorpus { corpus: "normal" });
    }

    let covert = evaluate_corpus(covert_scores, CorpusLabel::Covert, threshold, estimator);
    let normal = evaluate_corpus(normal_scores, CorpusLabel::Normal, threshold, estimator);
    let combined = (covert.metrics.matrix + normal.metrics.matrix).metrics();

    tracing::info!(
        "Combined evaluation: {} samples, accuracy {:.3}, precision {:.3}, recall {:.3}",
        combined.total,
        combined.accuracy,
        combined.precision,
        combined.recall
    );

    Ok(DetectionEvaluation {
        threshold,
        covert,
        normal,
        combined,
    })
}
