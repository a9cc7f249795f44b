//! Property-based tests over the measurement pipeline
//!
//! Core properties tested:
//! 1. Confusion matrix totals and metric ranges
//! 2. Correctness gating of every rate metric
//! 3. Estimator order independence and bound ordering, including signed
//!    time differences
//! 4. Trial sequencing against the previous correct trial
//! 5. Capacity reduction range
//! 6. Parser robustness on arbitrary text

use covert_metrics::classification::{classify, evaluate_combined, ConfusionMatrix};
use covert_metrics::comparator::capacity_reduction;
use covert_metrics::config::AnalysisConfig;
use covert_metrics::diagnostics::Diagnostics;
use covert_metrics::estimator::{Estimator, MetricDomain};
use covert_metrics::metrics::{derive_condition, derive_trial};
use covert_metrics::parser::{sequence_trials, DetectorParser, TrialParser, TrialRecord};
use proptest::prelude::*;

fn in_unit_range(x: f64) -> bool {
    (0.0..=1.0).contains(&x)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_confusion_matrix_total_and_ranges(
        samples in prop::collection::vec((0.0f64..3000.0, any::<bool>()), 0..200),
        threshold in 0.0f64..3000.0,
    ) {
        let m: ConfusionMatrix = samples
            .iter()
            .map(|&(score, positive)| classify(score, threshold, positive))
            .collect();

        prop_assert_eq!(m.tp + m.tn + m.fp + m.fn_, samples.len() as u64);
        prop_assert_eq!(m.total(), samples.len() as u64);

        let metrics = m.metrics();
        for value in [
            metrics.accuracy,
            metrics.precision,
            metrics.recall,
            metrics.specificity,
            metrics.f1,
            metrics.f2,
        ] {
            prop_assert!(in_unit_range(value), "metric out of range: {}", value);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_combined_matrix_is_sum_of_corpora(
        covert in prop::collection::vec(0.0f64..3000.0, 1..100),
        normal in prop::collection::vec(0.0f64..3000.0, 1..100),
    ) {
        let eval = evaluate_combined(&covert, &normal, 1000.0, &Estimator::default()).unwrap();
        prop_assert_eq!(eval.combined.matrix, eval.covert.metrics.matrix + eval.normal.metrics.matrix);
        prop_assert_eq!(eval.combined.total, (covert.len() + normal.len()) as u64);
        // single-class corpora never produce the opposite ground truth
        prop_assert_eq!(eval.covert.metrics.matrix.tn + eval.covert.metrics.matrix.fp, 0);
        prop_assert_eq!(eval.normal.metrics.matrix.tp + eval.normal.metrics.matrix.fn_, 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_incorrect_trial_has_zero_rates(
        size in 0u64..100_000,
        chunks in 0u64..10_000,
        time_ns in -1_000_000i64..10_000_000_000,
        symbols in 1u32..8,
    ) {
        let record = TrialRecord {
            message_size_bytes: Some(size),
            chunks_received: Some(chunks),
            reassembly_time_ns: Some(time_ns),
            correctness: Some(false),
            ..Default::default()
        };
        let m = derive_trial(&record, symbols);
        prop_assert_eq!(m.capacity_bps, 0.0);
        prop_assert_eq!(m.chunk_rate, 0.0);
        prop_assert!(m.capacity_using_diff_bps.is_none());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_estimate_order_independent(
        mut samples in prop::collection::vec(0.0f64..1e6, 0..50),
    ) {
        let estimator = Estimator::default();
        let forward = estimator.estimate(&samples, MetricDomain::NonNegative);
        samples.reverse();
        let reversed = estimator.estimate(&samples, MetricDomain::NonNegative);
        prop_assert_eq!(forward, reversed);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_estimate_bounds_ordered(
        samples in prop::collection::vec(-1e6f64..1e6, 2..50),
    ) {
        let estimator = Estimator::default();
        for domain in [MetricDomain::NonNegative, MetricDomain::Unbounded] {
            let est = estimator.estimate(&samples, domain);
            let (mean, lower, upper) = (est.mean.unwrap(), est.lower.unwrap(), est.upper.unwrap());
            prop_assert!(lower <= mean, "lower {} above mean {}", lower, mean);
            prop_assert!(mean <= upper);
            if domain == MetricDomain::NonNegative && mean >= 0.0 {
                prop_assert!(lower >= 0.0);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_time_between_messages_bounds_ordered(
        times in prop::collection::vec(-5_000_000_000i64..5_000_000_000, 0..30),
    ) {
        let mut records: Vec<TrialRecord> = times
            .iter()
            .map(|&t| TrialRecord {
                message_size_bytes: Some(100),
                reassembly_time_ns: Some(t),
                correctness: Some(true),
                ..Default::default()
            })
            .collect();
        sequence_trials(&mut records);

        let m = derive_condition("Any", &records, 1, &Estimator::default());
        let time = &m.summary.time_between_messages_ms;
        if let (Some(mean), Some(lower), Some(upper)) = (time.mean, time.lower, time.upper) {
            prop_assert!(lower <= mean && mean <= upper);
            prop_assert!(lower >= 0.0);
        }
        if let Some(mean) = time.mean {
            prop_assert!(mean > 0.0);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_proportion_bounds_in_unit_range(trials in 0usize..500, ratio in 0.0f64..=1.0) {
        let successes = (trials as f64 * ratio).round() as usize;
        let est = Estimator::default().estimate_proportion(successes, trials);
        for bound in [est.mean, est.lower, est.upper].into_iter().flatten() {
            prop_assert!(in_unit_range(bound));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_sequencing_skips_incorrect_trials(
        trials in prop::collection::vec((0i64..1_000_000, any::<bool>()), 0..40),
    ) {
        let mut elapsed = 0i64;
        let mut records: Vec<TrialRecord> = trials
            .iter()
            .map(|&(step, correct)| {
                elapsed += step;
                TrialRecord {
                    reassembly_time_ns: Some(elapsed),
                    correctness: Some(correct),
                    ..Default::default()
                }
            })
            .collect();

        sequence_trials(&mut records);

        let mut previous: Option<i64> = None;
        for record in &records {
            if record.is_correct() {
                let time = record.reassembly_time_ns.unwrap();
                prop_assert_eq!(record.time_diff_ns, Some(previous.map_or(time, |p| time - p)));
                previous = Some(time);
            } else {
                prop_assert!(record.time_diff_ns.is_none());
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_capacity_reduction_range(baseline in 0.0f64..1e6, condition in 0.0f64..2e6) {
        let r = capacity_reduction(baseline, condition);
        prop_assert!((0.0..=100.0).contains(&r));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_parsers_never_panic(text in ".{0,400}") {
        let config = AnalysisConfig::default();
        let trials = TrialParser::from_config(&config).unwrap().parse(&text);
        for record in &trials {
            prop_assert!(record.threat_score.is_none());
        }

        let detector = DetectorParser::from_config(&config).unwrap();
        let mut diagnostics = Diagnostics::new();
        let log = detector.parse_narrative(&text, "fuzz", &mut diagnostics);
        prop_assert!(log.dropped_packets() >= 0.0);
        let _ = detector.parse_assessments(&text);
    }
}
