//! Covert-metrics - measurement pipeline for covert-channel experiments
//!
//! This library turns the text logs of covert-channel experiment runs into
//! statistically qualified metrics: channel capacity with correctness gating,
//! confidence intervals over repeated trials, detector accuracy from a
//! thresholded confusion matrix, and the effectiveness of mitigation
//! strategies against an unmitigated baseline.
//!
//! # Example
//! ```
//! use covert_metrics::config::{AnalysisConfig, ConditionSpec};
//! use covert_metrics::estimator::Estimator;
//! use covert_metrics::parser::TrialParser;
//! use covert_metrics::pipeline::analyze_condition_text;
//!
//! let log = "--- Covert Channel Simulation ---\n\
//!            Number of chunks received: 15\n\
//!            Reassembly took: 1000000000ns\n\
//!            Total size of message: 446 bytes\n\
//!            Correctness of message: true\n";
//!
//! let config = AnalysisConfig::default();
//! let parser = TrialParser::from_config(&config).unwrap();
//! let spec = ConditionSpec::new("No Mitigation", "receiver.log");
//! let result = analyze_condition_text(&spec, log, &parser, &Estimator::from_config(&config));
//!
//! assert_eq!(result.metrics.capacity.mean, Some(446.0));
//! ```

pub mod classification;
pub mod cli;
pub mod comparator;
pub mod config;
pub mod csv_output;
pub mod diagnostics;
pub mod error;
pub mod estimator;
pub mod json_output;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod report;

pub use error::{AnalysisError, Result};
