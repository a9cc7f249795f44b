use crate::estimator::{mean, EstimateResult, Estimator, MetricDomain};
use crate::parser::PingRun;
use serde::{Deserialize, Serialize};

/// Derived values of one ping run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyRunMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_rtt_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_added_delay_ms: Option<f64>,
    pub transmitted: u64,
    pub received: u64,
    pub loss_percent: f64,
    pub elapsed_s: f64,
}

/// Latency impact of the delaying proxy across runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    pub runs: Vec<LatencyRunMetrics>,
    /// Estimate over the per-run mean RTTs
    pub rtt_ms: EstimateResult,
    /// Estimate over the per-run mean added delays
    pub added_delay_ms: EstimateResult,
}

fn optional_mean(samples: &[f64]) -> Option<f64> {
    (!samples.is_empty()).then(|| mean(samples))
}

pub fn derive_latency(runs: &[PingRun], estimator: &Estimator) -> LatencyMetrics {
    let runs: Vec<LatencyRunMetrics> = runs
        .iter()
        .map(|run| {
            let delays: Vec<f64> = run.added_delays_ms.iter().map(|&d| d as f64).collect();
            let summary = run.summary;
            LatencyRunMetrics {
                mean_rtt_ms: optional_mean(&run.rtts_ms),
                mean_added_delay_ms: optional_mean(&delays),
                transmitted: summary.map_or(0, |s| s.transmitted),
                received: summary.map_or(0, |s| s.received),
                loss_percent: summary.map_or(0.0, |s| s.loss_percent),
                elapsed_s: summary
                    .and_then(|s| s.elapsed_ms)
                    .map_or(0.0, |ms| ms as f64 / 1000.0),
            }
        })
        .collect();

    let rtts: Vec<f64> = runs.iter().filter_map(|r| r.mean_rtt_ms).collect();
    let delays: Vec<f64> = runs.iter().filter_map(|r| r.mean_added_delay_ms).collect();

    LatencyMetrics {
        rtt_ms: estimator.estimate(&rtts, MetricDomain::NonNegative),
        added_delay_ms: estimator.estimate(&delays, MetricDomain::NonNegative),
        runs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PingSummary;

    #[test]
    fn test_derive_latency() {
        let runs = vec![
            PingRun {
                rtts_ms: vec![100.0, 300.0],
                summary: Some(PingSummary {
                    transmitted: 10,
                    received: 9,
                    loss_percent: 10.0,
                    elapsed_ms: Some(9500),
                }),
                added_delays_ms: vec![50, 150],
            },
            PingRun {
                rtts_ms: vec![400.0],
                summary: None,
                added_delays_ms: vec![],
            },
        ];

        let m = derive_latency(&runs, &Estimator::default());

        assert_eq!(m.runs[0].mean_rtt_ms, Some(200.0));
        assert_eq!(m.runs[0].mean_added_delay_ms, Some(100.0));
        assert_eq!(m.runs[0].elapsed_s, 9.5);
        assert_eq!(m.runs[1].transmitted, 0);
        assert_eq!(m.runs[1].mean_added_delay_ms, None);
        assert_eq!(m.rtt_ms.mean, Some(300.0));
        assert_eq!(m.rtt_ms.samples, 2);
        assert_eq!(m.added_delay_ms.samples, 1);
    }
}
