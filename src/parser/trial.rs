use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::parser::capture;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One parsed trial (receiver message or detector assessment)
///
/// All fields are optional: absence means the pattern did not match in the
/// block. `time_diff_ns` is assigned by [`sequence_trials`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reassembly_time_ns: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correctness: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threat_score: Option<f64>,
    /// Elapsed time since the previous correct trial of the same sequence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_diff_ns: Option<i64>,
}

impl TrialRecord {
    /// Missing correctness counts as an unusable transfer
    pub fn is_correct(&self) -> bool {
        self.correctness.unwrap_or(false)
    }
}

/// Split text on `delimiter` into trimmed, non-empty blocks
pub fn split_blocks<'a>(text: &'a str, delimiter: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    text.split(delimiter)
        .map(str::trim)
        .filter(|block| !block.is_empty())
}

/// Extractor for block-delimited receiver logs
///
/// # Example
/// ```
/// use covert_metrics::parser::TrialParser;
///
/// let parser = TrialParser::new("--- Covert Channel Simulation ---").unwrap();
/// let records = parser.parse(
///     "--- Covert Channel Simulation ---\n\
///      Total size of message: 446 bytes\n\
///      Reassembly took: 2000000000ns\n\
///      Correctness of message: true\n",
/// );
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].message_size_bytes, Some(446));
/// assert_eq!(records[0].chunks_received, None); // absent, not zero
/// ```
#[derive(Debug, Clone)]
pub struct TrialParser {
    delimiter: String,
    reassembly_time: Regex,
    chunks_received: Regex,
    message_size: Regex,
    correctness: Regex,
}

impl TrialParser {
    pub fn new(delimiter: &str) -> Result<Self> {
        Ok(Self {
            delimiter: delimiter.to_string(),
            reassembly_time: Regex::new(r"Reassembly took: (-?\d+)ns")?,
            chunks_received: Regex::new(r"Number of chunks received: (\d+)")?,
            message_size: Regex::new(r"Total size of message: (\d+) bytes")?,
            correctness: Regex::new(r"Correctness of message: (true|false)")?,
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Self::new(&config.trial_delimiter)
    }

    /// Parse every non-empty block, in file order
    pub fn parse(&self, text: &str) -> Vec<TrialRecord> {
        split_blocks(text, &self.delimiter)
            .map(|block| self.parse_block(block))
            .collect()
    }

    /// Extract the fields present in a single block
    pub fn parse_block(&self, block: &str) -> TrialRecord {
        TrialRecord {
            message_size_bytes: capture(&self.message_size, block),
            chunks_received: capture(&self.chunks_received, block),
            reassembly_time_ns: capture(&self.reassembly_time, block),
            correctness: capture::<String>(&self.correctness, block).map(|v| v == "true"),
            threat_score: None,
            time_diff_ns: None,
        }
    }
}

/// Assign `time_diff_ns` to every correct record of an ordered sequence
///
/// The difference is taken against the most recent *correct* record with a
/// reassembly time; the first such record uses its own reassembly time.
/// Incorrect records, and correct records lacking a reassembly time, get
/// `None` and are never used as the reference.
///
/// # Example
/// ```
/// use covert_metrics::parser::{sequence_trials, TrialRecord};
///
/// let mut records: Vec<TrialRecord> = [(true, 100), (false, 200), (true, 350), (true, 500)]
///     .iter()
///     .map(|&(ok, t)| TrialRecord {
///         correctness: Some(ok),
///         reassembly_time_ns: Some(t),
///         ..Default::default()
///     })
///     .collect();
///
/// sequence_trials(&mut records);
/// let diffs: Vec<_> = records.iter().map(|r| r.time_diff_ns).collect();
/// assert_eq!(diffs, vec![Some(100), None, Some(250), Some(150)]);
/// ```
pub fn sequence_trials(records: &mut [TrialRecord]) {
    let mut last_correct_ns: Option<i64> = None;

    for record in records.iter_mut() {
        record.time_diff_ns = match (record.is_correct(), record.reassembly_time_ns) {
            (true, Some(current)) => {
                let diff = match last_correct_ns {
                    Some(previous) => current.saturating_sub(previous),
                    None => current,
                };
                last_correct_ns = Some(current);
                Some(diff)
            }
            _ => None,
        };
    }
}
