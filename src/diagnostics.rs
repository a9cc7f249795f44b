//! Structured diagnostics attached to analysis results
//!
//! Non-fatal conditions (missing files, single-sample estimates, degenerate
//! confusion matrices, missing baselines) are recorded here instead of being
//! raised. Every entry is mirrored to `tracing` at the matching level.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Condition label, file path or component that produced the entry
    pub source: String,
    pub message: String,
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, source: impl Into<String>, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            severity,
            source: source.into(),
            message: message.into(),
        };
        match severity {
            Severity::Info => tracing::info!("{}: {}", diagnostic.source, diagnostic.message),
            Severity::Warning => tracing::warn!("{}: {}", diagnostic.source, diagnostic.message),
            Severity::Error => tracing::error!("{}: {}", diagnostic.source, diagnostic.message),
        }
        self.entries.push(diagnostic);
    }

    pub fn info(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Info, source, message);
    }

    pub fn warn(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, source, message);
    }

    pub fn error(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, source, message);
    }

    /// Move all entries of `other` into `self`, preserving order
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries at or above the given severity
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity >= severity).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut diags = Diagnostics::new();
        diags.info("parser", "first");
        diags.warn("parser", "second");
        diags.error("pipeline", "third");

        let messages: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_count_at_least() {
        let mut diags = Diagnostics::new();
        diags.info("a", "x");
        diags.warn("b", "y");
        diags.error("c", "z");

        assert_eq!(diags.count_at_least(Severity::Info), 3);
        assert_eq!(diags.count_at_least(Severity::Warning), 2);
        assert_eq!(diags.count_at_least(Severity::Error), 1);
    }

    #[test]
    fn test_extend_merges() {
        let mut a = Diagnostics::new();
        a.info("a", "one");
        let mut b = Diagnostics::new();
        b.warn("b", "two");

        a.extend(b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut diags = Diagnostics::new();
        diags.warn("No Mitigation", "single sample");
        let json = serde_json::to_string(&diags).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"severity\":\"warning\""));
    }
}
