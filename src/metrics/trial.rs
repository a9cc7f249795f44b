use crate::parser::TrialRecord;
use serde::{Deserialize, Serialize};

pub const NANOS_PER_SECOND: f64 = 1e9;

/// `amount / seconds`, or 0 unless the transfer is correct and the elapsed
/// time is positive
fn gated_rate(amount: Option<u64>, elapsed_ns: Option<i64>, correct: bool) -> f64 {
    if !correct {
        return 0.0;
    }
    match (amount, elapsed_ns) {
        (Some(amount), Some(ns)) if ns > 0 => amount as f64 / (ns as f64 / NANOS_PER_SECOND),
        (_, Some(ns)) if ns <= 0 => {
            tracing::debug!("Non-positive reassembly time {}ns, rate set to 0", ns);
            0.0
        }
        _ => 0.0,
    }
}

/// Bytes per second over the reassembly time
///
/// # Example
/// ```
/// use covert_metrics::metrics::capacity_bps;
/// use covert_metrics::parser::TrialRecord;
///
/// let record = TrialRecord {
///     message_size_bytes: Some(500),
///     reassembly_time_ns: Some(2_000_000_000),
///     correctness: Some(true),
///     ..Default::default()
/// };
/// assert_eq!(capacity_bps(&record), 250.0);
///
/// let failed = TrialRecord { correctness: Some(false), ..record };
/// assert_eq!(capacity_bps(&failed), 0.0);
/// ```
pub fn capacity_bps(record: &TrialRecord) -> f64 {
    gated_rate(
        record.message_size_bytes,
        record.reassembly_time_ns,
        record.is_correct(),
    )
}

/// Bytes per second over the time since the previous correct trial
///
/// Only defined for correct trials with a positive `time_diff_ns`.
pub fn capacity_using_diff_bps(record: &TrialRecord) -> Option<f64> {
    match record.time_diff_ns {
        Some(diff) if diff > 0 && record.is_correct() => Some(gated_rate(
            record.message_size_bytes,
            Some(diff),
            true,
        )),
        _ => None,
    }
}

/// Chunks per second, divided by the encoding's symbols per byte
pub fn chunk_rate(record: &TrialRecord, symbols_per_byte: u32) -> f64 {
    let rate = gated_rate(
        record.chunks_received,
        record.reassembly_time_ns,
        record.is_correct(),
    );
    rate / f64::from(symbols_per_byte.max(1))
}

/// Message bytes carried per received chunk, divided by symbols per byte
///
/// Undefined when no chunks were received or the size is unknown.
pub fn bytes_per_chunk(record: &TrialRecord, symbols_per_byte: u32) -> Option<f64> {
    let size = record.message_size_bytes?;
    let chunks = record.chunks_received.filter(|&c| c > 0)?;
    Some(size as f64 / chunks as f64 / f64::from(symbols_per_byte.max(1)))
}

/// All derived values of one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialMetrics {
    pub capacity_bps: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_using_diff_bps: Option<f64>,
    pub chunk_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_per_chunk: Option<f64>,
}

pub fn derive_trial(record: &TrialRecord, symbols_per_byte: u32) -> TrialMetrics {
    TrialMetrics {
        capacity_bps: capacity_bps(record),
        capacity_using_diff_bps: capacity_using_diff_bps(record),
        chunk_rate: chunk_rate(record, symbols_per_byte),
        bytes_per_chunk: bytes_per_chunk(record, symbols_per_byte),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(size: u64, chunks: u64, time_ns: i64, correct: bool) -> TrialRecord {
        TrialRecord {
            message_size_bytes: Some(size),
            chunks_received: Some(chunks),
            reassembly_time_ns: Some(time_ns),
            correctness: Some(correct),
            ..Default::default()
        }
    }

    #[test]
    fn test_capacity_basic() {
        assert_eq!(capacity_bps(&record(446, 15, 1_000_000_000, true)), 446.0);
        assert_eq!(capacity_bps(&record(100, 4, 500_000_000, true)), 200.0);
    }

    #[test]
    fn test_incorrect_trial_yields_zero_rates() {
        let r = record(446, 15, 1_000_000_000, false);
        let m = derive_trial(&r, 1);
        assert_eq!(m.capacity_bps, 0.0);
        assert_eq!(m.chunk_rate, 0.0);
        assert_eq!(m.capacity_using_diff_bps, None);
    }

    #[test]
    fn test_missing_correctness_yields_zero() {
        let r = TrialRecord {
            correctness: None,
            ..record(446, 15, 1_000_000_000, true)
        };
        assert_eq!(capacity_bps(&r), 0.0);
    }

    #[test]
    fn test_non_positive_time_yields_zero() {
        assert_eq!(capacity_bps(&record(446, 15, 0, true)), 0.0);
        assert_eq!(capacity_bps(&record(446, 15, -10, true)), 0.0);
        assert_eq!(chunk_rate(&record(446, 15, 0, true), 1), 0.0);
    }

    #[test]
    fn test_missing_time_yields_zero() {
        let r = TrialRecord {
            reassembly_time_ns: None,
            ..record(446, 15, 1, true)
        };
        assert_eq!(capacity_bps(&r), 0.0);
    }

    #[test]
    fn test_capacity_using_diff() {
        let mut r = record(300, 10, 9_000_000_000, true);
        assert_eq!(capacity_using_diff_bps(&r), None);

        r.time_diff_ns = Some(3_000_000_000);
        assert_eq!(capacity_using_diff_bps(&r), Some(100.0));

        r.time_diff_ns = Some(0);
        assert_eq!(capacity_using_diff_bps(&r), None);

        r.time_diff_ns = Some(3_000_000_000);
        r.correctness = Some(false);
        assert_eq!(capacity_using_diff_bps(&r), None);
    }

    #[test]
    fn test_chunk_rate_encoding_correction() {
        let r = record(100, 40, 2_000_000_000, true);
        assert_eq!(chunk_rate(&r, 1), 20.0);
        assert_eq!(chunk_rate(&r, 4), 5.0);
    }

    #[test]
    fn test_bytes_per_chunk() {
        let r = record(100, 40, 2_000_000_000, false);
        // not a rate: defined regardless of correctness
        assert_eq!(bytes_per_chunk(&r, 1), Some(2.5));
        assert_eq!(bytes_per_chunk(&r, 4), Some(0.625));
        assert_eq!(bytes_per_chunk(&record(100, 0, 1, true), 1), None);

        let no_chunks = TrialRecord {
            chunks_received: None,
            ..r
        };
        assert_eq!(bytes_per_chunk(&no_chunks, 1), None);
    }
}
