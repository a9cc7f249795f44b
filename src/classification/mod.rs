// Detector accuracy scoring
//
// A continuous detector score is turned into a verdict with a fixed threshold
// (strictly greater is positive), compared against the corpus-determined
// ground truth, and aggregated into a confusion matrix.
//
// When positives and negatives come from independently logged corpora, each
// sample is classified with its own corpus label and the two result sets are
// concatenated before deriving metrics. Per-corpus metrics are kept alongside
// the combined ones; on a single-class corpus precision/recall degenerate to 0
// and that degeneracy is reported, not hidden.

mod confusion;
mod evaluation;
mod scores;

pub use confusion::{classify, ConfusionMatrix, Degeneracy, DetectionMetrics, Outcome};
pub use evaluation::{evaluate_combined, evaluate_corpus, CorpusEvaluation, CorpusLabel, DetectionEvaluation};
pub use scores::ScoreSummary;
