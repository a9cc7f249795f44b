// Record extraction from experiment logs
//
// Three log shapes are produced by the experiments:
// - receiver logs: block-delimited trials with `Key: value` lines
// - detector/proxy logs: narrative text with repeated score occurrences and
//   paired drop/delay markers
// - ping/proxy logs from the latency phase
//
// Every extractor is tolerant: a field whose pattern does not match is left
// absent on the record, never defaulted.

mod detector;
mod ping;
mod trial;

pub use detector::{DetectorLog, DetectorParser, DetectorSample};
pub use ping::{PingParser, PingRun, PingSummary};
pub use trial::{sequence_trials, split_blocks, TrialParser, TrialRecord};

use regex::Regex;
use std::str::FromStr;

/// Parse the first capture group of the first match, or `None`
fn capture<T: FromStr>(pattern: &Regex, text: &str) -> Option<T> {
    pattern.captures(text)?.get(1)?.as_str().parse().ok()
}
