use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Summary line printed by `ping` at exit
///
/// `24 packets transmitted, 23 received, 4.16667% packet loss, time 23216ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PingSummary {
    pub transmitted: u64,
    pub received: u64,
    pub loss_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

/// One ping run through the intercepting proxy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PingRun {
    /// Round-trip times of the individual replies, in milliseconds
    pub rtts_ms: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PingSummary>,
    /// Delays injected by the proxy for this run, in milliseconds
    pub added_delays_ms: Vec<u64>,
}

/// Extractor for ping output and the proxy's added-delay log
#[derive(Debug, Clone)]
pub struct PingParser {
    rtt: Regex,
    summary: Regex,
    added_delay: Regex,
}

impl PingParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rtt: Regex::new(r"time=(\d+(?:\.\d+)?) ms")?,
            summary: Regex::new(
                r"(\d+) packets transmitted, (\d+) (?:packets )?received,(?: \+\d+ errors,)? ([\d.]+)% packet loss(?:, time (\d+)ms)?",
            )?,
            added_delay: Regex::new(r"Added Delay:\s*(\d+)")?,
        })
    }

    /// Parse ping output and the matching proxy log into one run
    pub fn parse_run(&self, ping_output: &str, proxy_output: &str) -> PingRun {
        PingRun {
            rtts_ms: self.parse_rtts(ping_output),
            summary: self.parse_summary(ping_output),
            added_delays_ms: self.parse_added_delays(proxy_output),
        }
    }

    pub fn parse_rtts(&self, text: &str) -> Vec<f64> {
        self.rtt
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse::<f64>().ok())
            .filter(|rtt| rtt.is_finite())
            .collect()
    }

    /// The last summary line in the text, if any
    pub fn parse_summary(&self, text: &str) -> Option<PingSummary> {
        let caps = self.summary.captures_iter(text).last()?;
        Some(PingSummary {
            transmitted: caps[1].parse().ok()?,
            received: caps[2].parse().ok()?,
            loss_percent: caps[3].parse().ok()?,
            elapsed_ms: caps.get(4).and_then(|m| m.as_str().parse().ok()),
        })
    }

    pub fn parse_added_delays(&self, text: &str) -> Vec<u64> {
        self.added_delay
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse().ok())
            .collect()
    }
}
