//! Plain-text summaries of analysis reports

use crate::classification::{CorpusEvaluation, DetectionMetrics};
use crate::comparator::StrategyComparison;
use crate::diagnostics::Diagnostics;
use crate::estimator::EstimateResult;
use crate::pipeline::{ConditionResult, DetectionReport, LatencyReport, MitigationReport};
use std::fmt::Write;

/// `mean (95% CI: [lower, upper]) unit`, degrading to mean only or "n/a"
pub fn format_estimate(estimate: &EstimateResult, precision: usize, unit: &str) -> String {
    let unit = if unit.is_empty() {
        String::new()
    } else {
        format!(" {}", unit)
    };
    match (estimate.mean, estimate.lower, estimate.upper) {
        (Some(mean), Some(lower), Some(upper)) => format!(
            "{:.p$}{} (95% CI: [{:.p$}, {:.p$}], n={})",
            mean,
            unit,
            lower,
            upper,
            estimate.samples,
            p = precision
        ),
        (Some(mean), _, _) => format!("{:.p$}{} (n={})", mean, unit, estimate.samples, p = precision),
        _ => "n/a (no samples)".to_string(),
    }
}

fn push_diagnostics(report: &mut String, diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    report.push_str("\nDiagnostics:\n");
    for d in diagnostics.iter() {
        let _ = writeln!(report, "  [{}] {}: {}", d.severity, d.source, d.message);
    }
}

fn push_condition(report: &mut String, condition: &ConditionResult) {
    let m = &condition.metrics;
    let s = &m.summary;
    let _ = writeln!(report, "\n{}:", condition.label);
    let _ = writeln!(report, "  Total messages: {}", s.total_messages);
    let _ = writeln!(report, "  Successful messages: {}", s.successful_messages);
    let _ = writeln!(report, "  Correctness rate: {:.1}%", s.correctness_rate * 100.0);
    let _ = writeln!(report, "  Capacity: {}", format_estimate(&m.capacity, 3, "Bps"));
    let _ = writeln!(
        report,
        "  Capacity (time between messages): {}",
        format_estimate(&m.capacity_using_diff, 3, "Bps")
    );
    let _ = writeln!(report, "  Chunk rate: {}", format_estimate(&m.chunk_rate, 3, "chunks/s"));
    let _ = writeln!(
        report,
        "  Bytes per chunk: {}",
        format_estimate(&m.bytes_per_chunk, 3, "bytes")
    );
    let _ = writeln!(
        report,
        "  Mean time between messages: {}",
        format_estimate(&s.time_between_messages_ms, 1, "ms")
    );
    let _ = writeln!(report, "  Time differences calculated: {}", s.time_differences);
    let _ = writeln!(report, "  Mean message size: {:.1} bytes", s.mean_message_size_bytes);
    if let Some(chunks) = m.mean_chunks_received {
        let _ = writeln!(report, "  Mean chunks received: {:.1}", chunks);
    }
    if let Some(c) = &condition.confusion {
        let _ = writeln!(
            report,
            "  Detector verdicts: TP={} FN={} (recall {:.3})",
            c.tp,
            c.fn_,
            c.recall()
        );
    }
    if m.symbols_per_byte > 1 {
        let _ = writeln!(report, "  Symbols per byte: {}", m.symbols_per_byte);
    }
}

pub fn capacity_report(conditions: &[ConditionResult]) -> String {
    let mut report = String::from("=== CHANNEL CAPACITY ANALYSIS ===\n");
    let mut diagnostics = Diagnostics::new();

    for condition in conditions {
        push_condition(&mut report, condition);
        diagnostics.extend(condition.diagnostics.clone());
        diagnostics.extend(condition.metrics.diagnostics.clone());
    }

    push_diagnostics(&mut report, &diagnostics);
    report
}

fn push_metrics(report: &mut String, title: &str, m: &DetectionMetrics) {
    let _ = writeln!(report, "\n{}:", title);
    let _ = writeln!(report, "  Samples: {}", m.total);
    let _ = writeln!(
        report,
        "  TP={} TN={} FP={} FN={}",
        m.matrix.tp, m.matrix.tn, m.matrix.fp, m.matrix.fn_
    );
    let _ = writeln!(report, "  Accuracy:    {:.4}", m.accuracy);
    let _ = writeln!(report, "  Precision:   {:.4}", m.precision);
    let _ = writeln!(report, "  Recall:      {:.4}", m.recall);
    let _ = writeln!(report, "  Specificity: {:.4}", m.specificity);
    let _ = writeln!(report, "  F1 score:    {:.4}", m.f1);
    let _ = writeln!(report, "  F2 score:    {:.4}", m.f2);
    if let Some(degeneracy) = m.degeneracy {
        let _ = writeln!(report, "  Note: {}", degeneracy.explain());
    }
}

fn push_scores(report: &mut String, corpus: &CorpusEvaluation) {
    let _ = writeln!(
        report,
        "  Above threshold: {} ({:.1}%)",
        corpus.above_threshold,
        corpus.above_threshold_share * 100.0
    );
    if let Some(scores) = &corpus.scores {
        let _ = writeln!(
            report,
            "  Scores: mean {:.2}, std {:.2}, min {:.2}, max {:.2}",
            scores.mean, scores.stddev, scores.min, scores.max
        );
        if let Some(median) = scores.median {
            let _ = writeln!(report, "  Median score: {:.2}", median);
        }
        let _ = writeln!(report, "  Mean score: {}", format_estimate(&scores.estimate, 2, ""));
    }
}

pub fn detection_report(report: &DetectionReport) -> String {
    let eval = &report.evaluation;
    let mut out = String::from("=== DETECTION ACCURACY ANALYSIS ===\n");
    let _ = writeln!(out, "Detection threshold: {}", eval.threshold);

    push_metrics(&mut out, "Covert corpus", &eval.covert.metrics);
    push_scores(&mut out, &eval.covert);
    push_metrics(&mut out, "Normal corpus", &eval.normal.metrics);
    push_scores(&mut out, &eval.normal);
    push_metrics(&mut out, "Combined", &eval.combined);

    push_diagnostics(&mut out, &report.diagnostics);
    out
}

fn push_comparison(report: &mut String, comparison: &StrategyComparison) {
    report.push_str("\n=== MITIGATION EFFECTIVENESS ===\n");
    match comparison.baseline_capacity_bps {
        Some(capacity) => {
            let _ = writeln!(report, "Baseline '{}': {:.3} Bps", comparison.baseline, capacity);
        }
        None => {
            let _ = writeln!(report, "Baseline '{}' not available", comparison.baseline);
            return;
        }
    }

    for ranked in &comparison.ranking {
        let _ = writeln!(
            report,
            "  {}. {}: {:.1}% capacity reduction ({:.3} Bps)",
            ranked.rank, ranked.label, ranked.reduction, ranked.capacity_bps
        );
    }

    report.push_str("\n=== MITIGATION IMPACT ANALYSIS ===\n");
    for impact in &comparison.impacts {
        let _ = writeln!(report, "\n{} Impact:", impact.label);
        let _ = writeln!(report, "  Capacity Reduction: {:.1}%", impact.capacity_reduction);
        let _ = writeln!(report, "  Correctness Impact: {:.1}%", impact.correctness_impact);
        let _ = writeln!(report, "  Time Overhead: {:.1}%", impact.time_overhead);
        let _ = writeln!(report, "  Success Rate Impact: {:.1}%", impact.success_rate_impact);
        let _ = writeln!(
            report,
            "  Overall Effectiveness Score: {:.1} ({})",
            impact.effectiveness_score, comparison.effectiveness_caveat
        );
    }
}

pub fn mitigation_report(report: &MitigationReport) -> String {
    let mut out = capacity_report(&report.conditions);

    if !report.detectors.is_empty() {
        out.push_str("\n=== PROXY LOG ANALYSIS ===\n");
    }
    let mut diagnostics = Diagnostics::new();
    for detector in &report.detectors {
        let _ = writeln!(out, "\n{}:", detector.label);
        let _ = writeln!(out, "  Scores: {}", detector.log.samples.len());
        let _ = writeln!(out, "  Packets dropped: {}", detector.dropped_packets);
        let _ = writeln!(out, "  Packets delayed: {}", detector.delayed_packets);
        if let Some(rate) = detector.detection_rate {
            let _ = writeln!(out, "  Detection rate: {:.1}%", rate * 100.0);
        }
        diagnostics.extend(detector.diagnostics.clone());
    }

    push_comparison(&mut out, &report.comparison);
    diagnostics.extend(report.comparison.diagnostics.clone());
    push_diagnostics(&mut out, &diagnostics);
    out
}

pub fn latency_report(report: &LatencyReport) -> String {
    let mut out = String::from("=== LATENCY ANALYSIS ===\n");

    for (i, run) in report.metrics.runs.iter().enumerate() {
        let _ = write!(out, "Run {}: ", i + 1);
        match run.mean_rtt_ms {
            Some(rtt) => {
                let _ = write!(out, "mean RTT {:.3} ms", rtt);
            }
            None => out.push_str("no replies"),
        }
        if let Some(delay) = run.mean_added_delay_ms {
            let _ = write!(out, ", added delay {:.1} ms", delay);
        }
        let _ = writeln!(
            out,
            ", {}/{} received, {}% loss",
            run.received, run.transmitted, run.loss_percent
        );
    }

    let _ = writeln!(out, "\nRTT across runs: {}", format_estimate(&report.metrics.rtt_ms, 3, "ms"));
    let _ = writeln!(
        out,
        "Added delay across runs: {}",
        format_estimate(&report.metrics.added_delay_ms, 1, "ms")
    );

    push_diagnostics(&mut out, &report.diagnostics);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{Estimator, MetricDomain};

    #[test]
    fn test_format_estimate() {
        let est = Estimator::default();
        let full = est.estimate(&[10.0, 10.0], MetricDomain::NonNegative);
        assert_eq!(
            format_estimate(&full, 1, "ms"),
            "10.0 ms (95% CI: [10.0, 10.0], n=2)"
        );

        let single = est.estimate(&[4.0], MetricDomain::NonNegative);
        assert_eq!(format_estimate(&single, 2, "Bps"), "4.00 Bps (n=1)");

        let empty = est.estimate(&[], MetricDomain::NonNegative);
        assert_eq!(format_estimate(&empty, 2, "Bps"), "n/a (no samples)");
        assert_eq!(format_estimate(&single, 0, ""), "4 (n=1)");
    }

    #[test]
    fn test_capacity_report_lists_conditions() {
        let spec = crate::config::ConditionSpec::new("No Mitigation", "/nonexistent");
        let parser = crate::parser::TrialParser::new(crate::config::DEFAULT_TRIAL_DELIMITER).unwrap();
        let result = crate::pipeline::analyze_condition_text(&spec, "", &parser, &Estimator::default());

        let text = capacity_report(&[result]);
        assert!(text.contains("No Mitigation:"));
        assert!(text.contains("Total messages: 0"));
        assert!(text.contains("Diagnostics:"));
    }
}
