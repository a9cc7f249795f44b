//! CSV output format for analysis reports
//!
//! One row per (group, metric) pair: the group is a condition label, a corpus
//! name or a ping run. Estimates fill `samples,mean,lower,upper`; plain
//! scalars fill only `mean`. Undefined values are empty fields.

use crate::estimator::EstimateResult;
use crate::pipeline::{ConditionResult, DetectionReport, LatencyReport, MitigationReport};

/// A single CSV row
#[derive(Debug, Clone, PartialEq)]
pub struct CsvMetric {
    pub group: String,
    pub metric: String,
    pub samples: Option<usize>,
    pub mean: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// CSV output formatter
#[derive(Debug, Default)]
pub struct CsvOutput {
    rows: Vec<CsvMetric>,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_estimate(&mut self, group: &str, metric: &str, estimate: &EstimateResult) {
        self.rows.push(CsvMetric {
            group: group.to_string(),
            metric: metric.to_string(),
            samples: Some(estimate.samples),
            mean: estimate.mean,
            lower: estimate.lower,
            upper: estimate.upper,
        });
    }

    pub fn add_value(&mut self, group: &str, metric: &str, value: Option<f64>) {
        self.rows.push(CsvMetric {
            group: group.to_string(),
            metric: metric.to_string(),
            samples: None,
            mean: value,
            lower: None,
            upper: None,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn optional<T: ToString>(value: Option<T>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    fn format_row(row: &CsvMetric) -> String {
        [
            Self::escape_field(&row.group),
            Self::escape_field(&row.metric),
            Self::optional(row.samples),
            Self::optional(row.mean),
            Self::optional(row.lower),
            Self::optional(row.upper),
        ]
        .join(",")
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::from("group,metric,samples,mean,lower,upper\n");
        for row in &self.rows {
            output.push_str(&Self::format_row(row));
            output.push('\n');
        }
        output
    }

    pub fn add_conditions(&mut self, conditions: &[ConditionResult]) {
        for condition in conditions {
            let label = condition.label.as_str();
            let m = &condition.metrics;
            self.add_estimate(label, "capacity_bps", &m.capacity);
            self.add_estimate(label, "capacity_using_diff_bps", &m.capacity_using_diff);
            self.add_estimate(label, "chunk_rate", &m.chunk_rate);
            self.add_estimate(label, "bytes_per_chunk", &m.bytes_per_chunk);
            self.add_estimate(label, "correctness_rate", &m.correctness);
            self.add_estimate(label, "time_between_messages_ms", &m.summary.time_between_messages_ms);
            self.add_value(label, "mean_chunks_received", m.mean_chunks_received);
        }
    }

    pub fn from_conditions(conditions: &[ConditionResult]) -> Self {
        let mut csv = Self::new();
        csv.add_conditions(conditions);
        csv
    }

    pub fn from_mitigation(report: &MitigationReport) -> Self {
        let mut csv = Self::from_conditions(&report.conditions);

        for detector in &report.detectors {
            let label = detector.label.as_str();
            csv.add_value(label, "dropped_packets", Some(detector.dropped_packets));
            csv.add_value(label, "delayed_packets", Some(detector.delayed_packets));
            csv.add_value(label, "detection_rate", detector.detection_rate);
        }

        for impact in &report.comparison.impacts {
            let label = impact.label.as_str();
            csv.add_value(label, "capacity_reduction_percent", Some(impact.capacity_reduction));
            csv.add_value(label, "correctness_impact_percent", Some(impact.correctness_impact));
            csv.add_value(label, "time_overhead_percent", Some(impact.time_overhead));
            csv.add_value(label, "success_rate_impact_percent", Some(impact.success_rate_impact));
            csv.add_value(label, "effectiveness_score", Some(impact.effectiveness_score));
        }
        csv
    }

    pub fn from_detection(report: &DetectionReport) -> Self {
        let mut csv = Self::new();
        let eval = &report.evaluation;

        let corpora = [
            (eval.covert.label.as_str(), &eval.covert.metrics),
            (eval.normal.label.as_str(), &eval.normal.metrics),
            ("combined", &eval.combined),
        ];
        for (group, m) in corpora {
            csv.add_value(group, "tp", Some(m.matrix.tp as f64));
            csv.add_value(group, "tn", Some(m.matrix.tn as f64));
            csv.add_value(group, "fp", Some(m.matrix.fp as f64));
            csv.add_value(group, "fn", Some(m.matrix.fn_ as f64));
            csv.add_value(group, "accuracy", Some(m.accuracy));
            csv.add_value(group, "precision", Some(m.precision));
            csv.add_value(group, "recall", Some(m.recall));
            csv.add_value(group, "specificity", Some(m.specificity));
            csv.add_value(group, "f1", Some(m.f1));
            csv.add_value(group, "f2", Some(m.f2));
        }

        for corpus in [&eval.covert, &eval.normal] {
            if let Some(scores) = &corpus.scores {
                csv.add_estimate(corpus.label.as_str(), "score", &scores.estimate);
            }
        }
        csv
    }

    pub fn from_latency(report: &LatencyReport) -> Self {
        let mut csv = Self::new();
        for (i, run) in report.metrics.runs.iter().enumerate() {
            let group = format!("run {}", i + 1);
            csv.add_value(&group, "mean_rtt_ms", run.mean_rtt_ms);
            csv.add_value(&group, "mean_added_delay_ms", run.mean_added_delay_ms);
            csv.add_value(&group, "loss_percent", Some(run.loss_percent));
        }
        csv.add_estimate("all", "rtt_ms", &report.metrics.rtt_ms);
        csv.add_estimate("all", "added_delay_ms", &report.metrics.added_delay_ms);
        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{Estimator, MetricDomain};

    #[test]
    fn test_csv_header_and_rows() {
        let mut csv = CsvOutput::new();
        let estimate = Estimator::default().estimate(&[10.0, 10.0], MetricDomain::NonNegative);
        csv.add_estimate("No Mitigation", "capacity_bps", &estimate);
        csv.add_value("No Mitigation", "mean_chunks_received", None);

        let output = csv.to_csv();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "group,metric,samples,mean,lower,upper");
        assert_eq!(lines[1], "No Mitigation,capacity_bps,2,10,10,10");
        assert_eq!(lines[2], "No Mitigation,mean_chunks_received,,,,");
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(CsvOutput::escape_field("simple"), "simple");
        assert_eq!(CsvOutput::escape_field("Delay, 5ms"), "\"Delay, 5ms\"");
        assert_eq!(CsvOutput::escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_empty_output_is_header_only() {
        let csv = CsvOutput::new();
        assert!(csv.is_empty());
        assert_eq!(csv.to_csv(), "group,metric,samples,mean,lower,upper\n");
    }
}
