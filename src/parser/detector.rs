use crate::config::AnalysisConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::parser::trial::{split_blocks, TrialRecord};
use crate::parser::capture;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One score occurrence in a narrative proxy log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorSample {
    pub score: f64,
    /// `score > detection_threshold` at parse time
    pub detected: bool,
}

/// Scores and mitigation events extracted from one proxy log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorLog {
    /// Samples in positional order
    pub samples: Vec<DetectorSample>,
    /// Raw occurrences of the dropped-packet marker
    pub dropped_markers: usize,
    /// Raw occurrences of the delayed-packet marker
    pub delayed_markers: usize,
    /// How many times the producer writes each event
    pub marker_multiplicity: u32,
}

impl DetectorLog {
    pub fn scores(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.score).collect()
    }

    /// Dropped-packet events (raw markers divided by the multiplicity)
    pub fn dropped_packets(&self) -> f64 {
        self.events(self.dropped_markers)
    }

    /// Delayed-packet events (raw markers divided by the multiplicity)
    pub fn delayed_packets(&self) -> f64 {
        self.events(self.delayed_markers)
    }

    fn events(&self, markers: usize) -> f64 {
        markers as f64 / f64::from(self.marker_multiplicity.max(1))
    }

    /// Share of samples above threshold, `None` for an empty log
    pub fn detection_rate(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let detected = self.samples.iter().filter(|s| s.detected).count();
        Some(detected as f64 / self.samples.len() as f64)
    }
}

/// Extractor for detector and proxy logs
#[derive(Debug, Clone)]
pub struct DetectorParser {
    narrative_score: Regex,
    assessment_score: Regex,
    assessment_delimiter: String,
    dropped_marker: String,
    delayed_marker: String,
    marker_multiplicity: u32,
    threshold: f64,
}

impl DetectorParser {
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let narrative = format!(r"{}: ([\d.]+)", regex::escape(&config.score_label));
        Ok(Self {
            narrative_score: Regex::new(&narrative)?,
            assessment_score: Regex::new(r"Score: ([\d.]+)")?,
            assessment_delimiter: config.assessment_delimiter.clone(),
            dropped_marker: config.dropped_marker.clone(),
            delayed_marker: config.delayed_marker.clone(),
            marker_multiplicity: config.marker_multiplicity,
            threshold: config.detection_threshold,
        })
    }

    /// Extract every score occurrence and the drop/delay marker counts
    ///
    /// Captures that are not valid finite numbers (e.g. `1.2.3`, or a digit run
    /// that overflows to infinity) are skipped. A marker
    /// count that is not a multiple of the multiplicity is reported in
    /// `diagnostics` because it contradicts the paired-logging assumption.
    pub fn parse_narrative(&self, text: &str, source: &str, diagnostics: &mut Diagnostics) -> DetectorLog {
        let mut samples = Vec::new();
        let mut skipped = 0usize;

        for caps in self.narrative_score.captures_iter(text) {
            match caps[1].parse::<f64>() {
                Ok(score) if score.is_finite() => samples.push(DetectorSample {
                    score,
                    detected: score > self.threshold,
                }),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            diagnostics.warn(source, format!("{} unparseable score value(s) skipped", skipped));
        }

        let dropped_markers = text.matches(self.dropped_marker.as_str()).count();
        let delayed_markers = text.matches(self.delayed_marker.as_str()).count();

        let multiplicity = self.marker_multiplicity.max(1) as usize;
        for (name, count) in [("dropped", dropped_markers), ("delayed", delayed_markers)] {
            if count % multiplicity != 0 {
                diagnostics.warn(
                    source,
                    format!(
                        "{} {} marker(s) is not a multiple of {}; event count is fractional",
                        count, name, multiplicity
                    ),
                );
            }
        }

        DetectorLog {
            samples,
            dropped_markers,
            delayed_markers,
            marker_multiplicity: self.marker_multiplicity,
        }
    }

    /// Parse block-delimited threat assessments
    ///
    /// Each block contributes the first `Score:` occurrence; blocks without a
    /// score are dropped.
    pub fn parse_assessments(&self, text: &str) -> Vec<TrialRecord> {
        split_blocks(text, &self.assessment_delimiter)
            .filter_map(|block| capture::<f64>(&self.assessment_score, block))
            .filter(|score| score.is_finite())
            .map(|score| TrialRecord {
                threat_score: Some(score),
                ..TrialRecord::default()
            })
            .collect()
    }
}
