// Metric derivation from parsed trial records
//
// Per-trial rates (capacity, chunk rate, bytes per chunk) are gated on
// correctness: an incorrect transfer yields exactly 0 for every rate and the
// division is never attempted. Per-condition aggregation turns the per-trial
// values into sample sets and hands them to the estimator.

mod condition;
mod latency;
mod trial;

pub use condition::{derive_condition, CapacityBasis, ConditionMetrics, ConditionSummary};
pub use latency::{derive_latency, LatencyMetrics, LatencyRunMetrics};
pub use trial::{
    bytes_per_chunk, capacity_bps, capacity_using_diff_bps, chunk_rate, derive_trial,
    TrialMetrics, NANOS_PER_SECOND,
};
