//! File loading and per-analysis orchestration
//!
//! Each input file is read whole before parsing. An unreadable or non-UTF-8
//! file becomes an error [`Diagnostic`](crate::diagnostics::Diagnostic) and an
//! empty input, which every downstream stage accepts. The only fatal outcomes
//! are an invalid extraction pattern and an empty corpus in a combined
//! detection evaluation.

use crate::classification::{
    evaluate_combined, evaluate_corpus, ConfusionMatrix, CorpusEvaluation, CorpusLabel,
    DetectionEvaluation,
};
use crate::comparator::{compare_strategies, StrategyComparison};
use crate::config::{AnalysisConfig, ConditionSpec, DetectorSpec};
use crate::diagnostics::Diagnostics;
use crate::error::{AnalysisError, Result};
use crate::estimator::Estimator;
use crate::metrics::{derive_condition, derive_latency, CapacityBasis, ConditionMetrics, LatencyMetrics};
use crate::parser::{sequence_trials, DetectorLog, DetectorParser, PingParser, TrialParser, TrialRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Read a log file as UTF-8 text
pub fn load_log(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| AnalysisError::Encoding {
        path: path.to_path_buf(),
        offset: e.utf8_error().valid_up_to(),
    })
}

/// Read a log file, recording a failure as a diagnostic
pub fn read_log(path: &Path, diagnostics: &mut Diagnostics) -> Option<String> {
    match load_log(path) {
        Ok(text) => {
            tracing::debug!("Read {} bytes from {}", text.len(), path.display());
            Some(text)
        }
        Err(e) => {
            diagnostics.error(path.display().to_string(), format!("{}; treated as empty", e));
            None
        }
    }
}

/// Everything derived for one experimental condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    pub label: String,
    pub path: PathBuf,
    /// Sequenced trial records in log order
    pub trials: Vec<TrialRecord>,
    pub metrics: ConditionMetrics,
    /// Detector verdicts over the condition's covert traffic, when a detector
    /// log with the same label was analyzed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confusion: Option<ConfusionMatrix>,
    pub diagnostics: Diagnostics,
}

/// Parse, sequence and derive one condition from text already in memory
pub fn analyze_condition_text(
    spec: &ConditionSpec,
    text: &str,
    parser: &TrialParser,
    estimator: &Estimator,
) -> ConditionResult {
    let mut trials = parser.parse(text);
    sequence_trials(&mut trials);
    let metrics = derive_condition(&spec.label, &trials, spec.symbols_per_byte, estimator);

    ConditionResult {
        label: spec.label.clone(),
        path: spec.path.clone(),
        trials,
        metrics,
        confusion: None,
        diagnostics: Diagnostics::new(),
    }
}

pub fn analyze_condition(spec: &ConditionSpec, config: &AnalysisConfig) -> Result<ConditionResult> {
    let parser = TrialParser::from_config(config)?;
    let estimator = Estimator::from_config(config);
    Ok(load_condition(spec, &parser, &estimator))
}

fn load_condition(spec: &ConditionSpec, parser: &TrialParser, estimator: &Estimator) -> ConditionResult {
    let mut diagnostics = Diagnostics::new();
    let text = read_log(&spec.path, &mut diagnostics).unwrap_or_default();
    let mut result = analyze_condition_text(spec, &text, parser, estimator);
    diagnostics.extend(std::mem::take(&mut result.diagnostics));
    result.diagnostics = diagnostics;
    result
}

/// Analyze every condition in `specs`, in order
pub fn analyze_conditions(specs: &[ConditionSpec], config: &AnalysisConfig) -> Result<Vec<ConditionResult>> {
    let parser = TrialParser::from_config(config)?;
    let estimator = Estimator::from_config(config);

    Ok(specs
        .iter()
        .map(|spec| {
            tracing::info!("Analyzing condition '{}' from {}", spec.label, spec.path.display());
            load_condition(spec, &parser, &estimator)
        })
        .collect())
}

/// Scores and mitigation events of one proxy log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorResult {
    pub label: String,
    pub path: PathBuf,
    pub log: DetectorLog,
    pub dropped_packets: f64,
    pub delayed_packets: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_rate: Option<f64>,
    /// All samples classified as covert traffic
    pub evaluation: CorpusEvaluation,
    pub diagnostics: Diagnostics,
}

pub fn analyze_detector_text(
    spec: &DetectorSpec,
    text: &str,
    parser: &DetectorParser,
    config: &AnalysisConfig,
) -> DetectorResult {
    let mut diagnostics = Diagnostics::new();
    let source = spec.label.as_str();
    let log = parser.parse_narrative(text, source, &mut diagnostics);

    if log.samples.is_empty() {
        diagnostics.warn(source, "no detector scores found");
    }

    let estimator = Estimator::from_config(config);
    let evaluation = evaluate_corpus(
        &log.scores(),
        CorpusLabel::Covert,
        config.detection_threshold,
        &estimator,
    );

    DetectorResult {
        label: spec.label.clone(),
        path: spec.path.clone(),
        dropped_packets: log.dropped_packets(),
        delayed_packets: log.delayed_packets(),
        detection_rate: log.detection_rate(),
        log,
        evaluation,
        diagnostics,
    }
}

/// Analyze every narrative detector log in `specs`, in order
pub fn analyze_detector_logs(specs: &[DetectorSpec], config: &AnalysisConfig) -> Result<Vec<DetectorResult>> {
    let parser = DetectorParser::from_config(config)?;

    Ok(specs
        .iter()
        .map(|spec| {
            let mut diagnostics = Diagnostics::new();
            let text = read_log(&spec.path, &mut diagnostics).unwrap_or_default();
            let mut result = analyze_detector_text(spec, &text, &parser, config);
            diagnostics.extend(std::mem::take(&mut result.diagnostics));
            result.diagnostics = diagnostics;
            result
        })
        .collect())
}

/// How detector scores are laid out in a log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLayout {
    /// Delimited threat-assessment blocks, first `Score:` per block
    #[default]
    Assessments,
    /// Every occurrence of the configured score label
    Narrative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub covert_path: PathBuf,
    pub normal_path: PathBuf,
    pub layout: ScoreLayout,
    pub evaluation: DetectionEvaluation,
    pub diagnostics: Diagnostics,
}

fn extract_scores(
    text: &str,
    source: &str,
    layout: ScoreLayout,
    parser: &DetectorParser,
    diagnostics: &mut Diagnostics,
) -> Vec<f64> {
    match layout {
        ScoreLayout::Assessments => parser
            .parse_assessments(text)
            .iter()
            .filter_map(|r| r.threat_score)
            .collect(),
        ScoreLayout::Narrative => parser.parse_narrative(text, source, diagnostics).scores(),
    }
}

/// Evaluate the detector on a covert corpus against a normal corpus
///
/// Fails with [`AnalysisError::EmptyCorpus`] when either corpus yields no
/// scores, including when its file could not be read.
pub fn analyze_detection(
    covert_path: &Path,
    normal_path: &Path,
    layout: ScoreLayout,
    config: &AnalysisConfig,
) -> Result<DetectionReport> {
    let parser = DetectorParser::from_config(config)?;
    let estimator = Estimator::from_config(config);
    let mut diagnostics = Diagnostics::new();

    let covert_text = read_log(covert_path, &mut diagnostics).unwrap_or_default();
    let normal_text = read_log(normal_path, &mut diagnostics).unwrap_or_default();

    let covert = extract_scores(&covert_text, "covert", layout, &parser, &mut diagnostics);
    let normal = extract_scores(&normal_text, "normal", layout, &parser, &mut diagnostics);
    tracing::info!("Loaded {} covert and {} normal scores", covert.len(), normal.len());

    let evaluation = evaluate_combined(&covert, &normal, config.detection_threshold, &estimator)?;

    for corpus in [&evaluation.covert, &evaluation.normal] {
        if let Some(degeneracy) = corpus.metrics.degeneracy {
            diagnostics.info(corpus.label.as_str(), degeneracy.explain());
        }
    }

    Ok(DetectionReport {
        covert_path: covert_path.to_path_buf(),
        normal_path: normal_path.to_path_buf(),
        layout,
        evaluation,
        diagnostics,
    })
}

/// Conditions, proxy logs and the comparison of mitigations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationReport {
    pub conditions: Vec<ConditionResult>,
    pub detectors: Vec<DetectorResult>,
    pub comparison: StrategyComparison,
}

/// Full mitigation analysis over the configured conditions and detectors
///
/// Capacities are compared on the time-between-messages basis. A detector log
/// whose label matches a condition attaches its confusion matrix to that
/// condition.
pub fn analyze_mitigation(config: &AnalysisConfig) -> Result<MitigationReport> {
    let mut conditions = analyze_conditions(&config.conditions, config)?;
    let detectors = analyze_detector_logs(&config.detectors, config)?;

    for condition in conditions.iter_mut() {
        condition.confusion = detectors
            .iter()
            .find(|d| d.label == condition.label)
            .map(|d| d.evaluation.metrics.matrix);
    }

    let metrics: Vec<ConditionMetrics> = conditions.iter().map(|c| c.metrics.clone()).collect();
    let comparison = compare_strategies(
        &config.baseline,
        &metrics,
        &config.weights,
        CapacityBasis::TimeDiff,
    );

    Ok(MitigationReport {
        conditions,
        detectors,
        comparison,
    })
}

/// One phase-1 run: ping output plus the delaying proxy's log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyRunSpec {
    pub ping: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyReport {
    pub runs: Vec<LatencyRunSpec>,
    pub metrics: LatencyMetrics,
    pub diagnostics: Diagnostics,
}

pub fn analyze_latency(specs: &[LatencyRunSpec], config: &AnalysisConfig) -> Result<LatencyReport> {
    let parser = PingParser::new()?;
    let estimator = Estimator::from_config(config);
    let mut diagnostics = Diagnostics::new();

    let runs: Vec<_> = specs
        .iter()
        .map(|spec| {
            let ping = read_log(&spec.ping, &mut diagnostics).unwrap_or_default();
            let proxy = spec
                .proxy
                .as_deref()
                .and_then(|p| read_log(p, &mut diagnostics))
                .unwrap_or_default();
            let run = parser.parse_run(&ping, &proxy);
            if run.summary.is_none() {
                diagnostics.warn(spec.ping.display().to_string(), "no ping statistics summary found");
            }
            run
        })
        .collect();

    Ok(LatencyReport {
        runs: specs.to_vec(),
        metrics: derive_latency(&runs, &estimator),
        diagnostics,
    })
}
