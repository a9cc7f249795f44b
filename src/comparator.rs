//! Mitigation strategy comparison
//!
//! Every non-baseline condition is compared against the baseline condition:
//! percentage capacity reduction (clamped at 0), impact on correctness and
//! success rate, and overhead in time between messages. Conditions are ranked
//! by descending capacity reduction; ties keep their input order.
//!
//! The composite effectiveness score is a fixed weighted sum. It is indicative
//! only and has no statistical validation behind it.

use crate::config::EffectivenessWeights;
use crate::diagnostics::Diagnostics;
use crate::metrics::{CapacityBasis, ConditionMetrics, ConditionSummary};
use serde::{Deserialize, Serialize};

pub const EFFECTIVENESS_CAVEAT: &str = "indicative, not statistically validated";

/// Percentage capacity reduction relative to the baseline
///
/// `max(0, (baseline - condition) / baseline * 100)`, and 0 when the baseline
/// is 0.
///
/// # Example
/// ```
/// use covert_metrics::comparator::capacity_reduction;
///
/// assert_eq!(capacity_reduction(1000.0, 120.0), 88.0);
/// assert_eq!(capacity_reduction(0.0, 120.0), 0.0);
/// assert_eq!(capacity_reduction(100.0, 150.0), 0.0);
/// ```
pub fn capacity_reduction(baseline: f64, condition: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    ((baseline - condition) / baseline * 100.0).max(0.0)
}

/// `(from - to) / from * 100`, 0 when `from` is not positive
fn relative_drop(from: f64, to: f64) -> f64 {
    if from > 0.0 {
        (from - to) / from * 100.0
    } else {
        0.0
    }
}

/// Effect of one mitigation relative to the baseline, all in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub label: String,
    pub capacity_reduction: f64,
    /// Drop in correctness rate (positive means fewer correct messages)
    pub correctness_impact: f64,
    /// Increase in mean time between correct messages
    pub time_overhead: f64,
    /// Drop in success rate
    pub success_rate_impact: f64,
    /// Weighted composite; see [`EFFECTIVENESS_CAVEAT`]
    pub effectiveness_score: f64,
}

impl ImpactMetrics {
    /// Impact of `condition` against `baseline`
    ///
    /// The capacities are the means on the comparison's [`CapacityBasis`], so
    /// the reduction here matches the one used for ranking.
    pub fn between(
        label: &str,
        baseline: &ConditionSummary,
        baseline_capacity: f64,
        condition: &ConditionSummary,
        condition_capacity: f64,
        weights: &EffectivenessWeights,
    ) -> Self {
        let capacity_reduction = capacity_reduction(baseline_capacity, condition_capacity);
        let correctness_impact =
            relative_drop(baseline.correctness_rate, condition.correctness_rate);
        let success_rate_impact = relative_drop(baseline.success_rate, condition.success_rate);

        let baseline_time = baseline.time_between_messages_ms.mean_or_zero();
        let time_overhead = if baseline_time > 0.0 {
            (condition.time_between_messages_ms.mean_or_zero() - baseline_time) / baseline_time
                * 100.0
        } else {
            0.0
        };

        let effectiveness_score = weights.capacity_reduction * capacity_reduction
            + weights.correctness_impact * correctness_impact.abs()
            + weights.success_rate_impact * success_rate_impact.abs();

        Self {
            label: label.to_string(),
            capacity_reduction,
            correctness_impact,
            time_overhead,
            success_rate_impact,
            effectiveness_score,
        }
    }
}

/// One ranked mitigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCondition {
    pub rank: usize,
    pub label: String,
    pub capacity_bps: f64,
    pub reduction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub baseline: String,
    pub basis: CapacityBasis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_capacity_bps: Option<f64>,
    pub ranking: Vec<RankedCondition>,
    pub impacts: Vec<ImpactMetrics>,
    pub effectiveness_caveat: String,
    pub diagnostics: Diagnostics,
}

/// Compare every condition against `baseline_label`
///
/// A missing baseline yields an empty comparison with a warning. A baseline
/// whose capacity mean is undefined is treated as 0, so every reduction is 0.
/// Non-baseline conditions without a capacity mean are left out of the
/// ranking but still get impact metrics.
pub fn compare_strategies(
    baseline_label: &str,
    conditions: &[ConditionMetrics],
    weights: &EffectivenessWeights,
    basis: CapacityBasis,
) -> StrategyComparison {
    let mut diagnostics = Diagnostics::new();
    let mut comparison = StrategyComparison {
        baseline: baseline_label.to_string(),
        basis,
        baseline_capacity_bps: None,
        ranking: Vec::new(),
        impacts: Vec::new(),
        effectiveness_caveat: EFFECTIVENESS_CAVEAT.to_string(),
        diagnostics: Diagnostics::new(),
    };

    let Some(baseline) = conditions.iter().find(|c| c.label == baseline_label) else {
        diagnostics.warn(
            baseline_label,
            "baseline condition not found; strategy comparison skipped",
        );
        comparison.diagnostics = diagnostics;
        return comparison;
    };

    let baseline_capacity = match baseline.capacity_for(basis).mean {
        Some(mean) => mean,
        None => {
            diagnostics.warn(
                baseline_label,
                "baseline capacity undefined; treated as 0 so all reductions are 0",
            );
            0.0
        }
    };
    comparison.baseline_capacity_bps = Some(baseline_capacity);

    let mut ranked: Vec<(String, f64, f64)> = Vec::new();
    for condition in conditions.iter().filter(|c| c.label != baseline_label) {
        let capacity = condition.capacity_for(basis).mean;
        let impact = ImpactMetrics::between(
            &condition.label,
            &baseline.summary,
            baseline_capacity,
            &condition.summary,
            capacity.unwrap_or(0.0),
            weights,
        );

        match capacity {
            Some(capacity) => {
                ranked.push((condition.label.clone(), capacity, impact.capacity_reduction))
            }
            None => diagnostics.warn(
                &condition.label,
                "capacity undefined; excluded from effectiveness ranking",
            ),
        }
        comparison.impacts.push(impact);
    }

    // stable: equal reductions keep input order
    ranked.sort_by(|a, b| b.2.total_cmp(&a.2));

    comparison.ranking = ranked
        .into_iter()
        .enumerate()
        .map(|(i, (label, capacity_bps, reduction))| RankedCondition {
            rank: i + 1,
            label,
            capacity_bps,
            reduction,
        })
        .collect();
    comparison.diagnostics = diagnostics;
    comparison
}
