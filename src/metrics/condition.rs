use crate::diagnostics::Diagnostics;
use crate::estimator::{mean, EstimateResult, Estimator, MetricDomain};
use crate::metrics::trial::{derive_trial, TrialMetrics, NANOS_PER_SECOND};
use crate::parser::TrialRecord;
use serde::{Deserialize, Serialize};

/// Which elapsed time a capacity figure is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityBasis {
    /// Per-message reassembly time, all trials (incorrect trials count as 0)
    ReassemblyTime,
    /// Time since the previous correct message, correct trials only
    TimeDiff,
}

/// Counts and means used by the mitigation impact analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    /// Every parsed trial
    pub total_messages: usize,
    /// Trials with a correct message
    pub correct_messages: usize,
    /// Trials whose time-diff capacity is positive
    pub successful_messages: usize,
    /// Trials with a time difference assigned
    pub time_differences: usize,
    /// `correct_messages / total_messages`, 0 for an empty condition
    pub correctness_rate: f64,
    /// `successful_messages / total_messages`, 0 for an empty condition
    pub success_rate: f64,
    /// Mean time-diff capacity, 0 when undefined
    pub mean_capacity_bps: f64,
    /// Mean size of the sequenced messages, 0 when undefined
    pub mean_message_size_bytes: f64,
    /// Mean time between correct message completions
    pub time_between_messages_ms: EstimateResult,
}

/// All per-condition aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionMetrics {
    pub label: String,
    pub symbols_per_byte: u32,
    /// Capacity over reassembly time, all trials
    pub capacity: EstimateResult,
    /// Capacity over time since previous correct trial
    pub capacity_using_diff: EstimateResult,
    pub chunk_rate: EstimateResult,
    pub bytes_per_chunk: EstimateResult,
    /// Proportion of correct trials
    pub correctness: EstimateResult,
    /// Mean chunks received over trials reporting a chunk count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_chunks_received: Option<f64>,
    pub summary: ConditionSummary,
    pub diagnostics: Diagnostics,
}

impl ConditionMetrics {
    pub fn capacity_for(&self, basis: CapacityBasis) -> &EstimateResult {
        match basis {
            CapacityBasis::ReassemblyTime => &self.capacity,
            CapacityBasis::TimeDiff => &self.capacity_using_diff,
        }
    }
}

fn note(diagnostics: &mut Diagnostics, label: &str, metric: &str, estimate: &EstimateResult) {
    if let Some(note) = estimate.note {
        diagnostics.warn(label, format!("{}: {}", metric, note.describe()));
    }
}

fn mean_of(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| mean(values))
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Aggregate a sequenced trial list into per-condition metrics
///
/// `records` must already have gone through
/// [`crate::parser::sequence_trials`]; records without `time_diff_ns` are
/// counted in totals and correctness but excluded from time-based figures.
pub fn derive_condition(
    label: &str,
    records: &[TrialRecord],
    symbols_per_byte: u32,
    estimator: &Estimator,
) -> ConditionMetrics {
    let mut diagnostics = Diagnostics::new();

    if records.is_empty() {
        diagnostics.warn(label, "no trial records; all metrics undefined");
    }

    let trials: Vec<TrialMetrics> = records
        .iter()
        .map(|r| derive_trial(r, symbols_per_byte))
        .collect();

    let capacities: Vec<f64> = trials.iter().map(|m| m.capacity_bps).collect();
    let chunk_rates: Vec<f64> = trials.iter().map(|m| m.chunk_rate).collect();
    let bytes_per_chunk: Vec<f64> = trials.iter().filter_map(|m| m.bytes_per_chunk).collect();
    let diff_capacities: Vec<f64> = trials
        .iter()
        .filter_map(|m| m.capacity_using_diff_bps)
        .collect();

    let sequenced: Vec<&TrialRecord> = records.iter().filter(|r| r.time_diff_ns.is_some()).collect();
    // non-positive differences are reported below, not averaged
    let time_diffs_ms: Vec<f64> = sequenced
        .iter()
        .filter_map(|r| r.time_diff_ns)
        .filter(|&ns| ns > 0)
        .map(|ns| ns as f64 / (NANOS_PER_SECOND / 1e3))
        .collect();
    let sequenced_sizes: Vec<f64> = sequenced
        .iter()
        .filter_map(|r| r.message_size_bytes)
        .map(|s| s as f64)
        .collect();
    let chunk_counts: Vec<f64> = records
        .iter()
        .filter_map(|r| r.chunks_received)
        .map(|c| c as f64)
        .collect();

    let correct_messages = records.iter().filter(|r| r.is_correct()).count();
    let successful_messages = diff_capacities.iter().filter(|&&c| c > 0.0).count();

    let capacity = estimator.estimate(&capacities, MetricDomain::NonNegative);
    let capacity_using_diff = estimator.estimate(&diff_capacities, MetricDomain::NonNegative);
    let chunk_rate = estimator.estimate(&chunk_rates, MetricDomain::NonNegative);
    let bytes_per_chunk = estimator.estimate(&bytes_per_chunk, MetricDomain::NonNegative);
    let correctness = estimator.estimate_proportion(correct_messages, records.len());
    let time_between_messages_ms = estimator.estimate(&time_diffs_ms, MetricDomain::NonNegative);

    if !records.is_empty() {
        note(&mut diagnostics, label, "capacity", &capacity);
        note(&mut diagnostics, label, "capacity using time diff", &capacity_using_diff);
        note(&mut diagnostics, label, "bytes per chunk", &bytes_per_chunk);
        note(&mut diagnostics, label, "time between messages", &time_between_messages_ms);
    }

    let non_positive_diffs = sequenced
        .iter()
        .filter(|r| r.time_diff_ns.is_some_and(|d| d <= 0))
        .count();
    if non_positive_diffs > 0 {
        diagnostics.warn(
            label,
            format!(
                "{} correct trial(s) with non-positive time difference excluded from capacity",
                non_positive_diffs
            ),
        );
    }

    let summary = ConditionSummary {
        total_messages: records.len(),
        correct_messages,
        successful_messages,
        time_differences: time_diffs_ms.len(),
        correctness_rate: ratio(correct_messages, records.len()),
        success_rate: ratio(successful_messages, records.len()),
        mean_capacity_bps: capacity_using_diff.mean_or_zero(),
        mean_message_size_bytes: mean_of(&sequenced_sizes).unwrap_or(0.0),
        time_between_messages_ms,
    };

    tracing::debug!(
        "{}: {} trials, {} correct, mean capacity {:.3} Bps",
        label,
        summary.total_messages,
        summary.correct_messages,
        capacity.mean_or_zero()
    );

    ConditionMetrics {
        label: label.to_string(),
        symbols_per_byte,
        capacity,
        capacity_using_diff,
        chunk_rate,
        bytes_per_chunk,
        correctness,
        mean_chunks_received: mean_of(&chunk_counts),
        summary,
        diagnostics,
    }
}
