//! CLI argument parsing for covert-metrics

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text summary (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis and charting
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "covert-metrics")]
#[command(version)]
#[command(
    about = "Throughput, detection and mitigation metrics from covert-channel experiment logs",
    long_about = None
)]
pub struct Cli {
    /// TOML analysis configuration (thresholds, conditions, detector logs)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Channel capacity per condition from receiver logs
    Capacity(ConditionArgs),

    /// Detector accuracy on a covert corpus against a normal corpus
    Detection(DetectionArgs),

    /// Mitigation effectiveness against the baseline condition
    Mitigation(MitigationArgs),

    /// Round-trip latency added by the delaying proxy
    Latency(LatencyArgs),
}

#[derive(Args, Debug, Default)]
pub struct ConditionArgs {
    /// Receiver log of one condition (repeatable), appended to the configured ones
    #[arg(long = "condition", value_name = "LABEL=PATH", value_parser = parse_labeled_path)]
    pub conditions: Vec<(String, PathBuf)>,

    /// Symbols the condition's encoding spends per byte (repeatable)
    #[arg(long = "symbols", value_name = "LABEL=N", value_parser = parse_labeled_symbols)]
    pub symbols: Vec<(String, u32)>,
}

#[derive(Args, Debug)]
pub struct DetectionArgs {
    /// Detector log captured during covert transmissions
    #[arg(long, value_name = "PATH")]
    pub covert: PathBuf,

    /// Detector log captured during normal traffic
    #[arg(long, value_name = "PATH")]
    pub normal: PathBuf,

    /// Read every score occurrence instead of one per threat assessment
    #[arg(long)]
    pub narrative: bool,

    /// Override the detection threshold
    #[arg(long, value_name = "SCORE")]
    pub threshold: Option<f64>,
}

#[derive(Args, Debug)]
pub struct MitigationArgs {
    #[command(flatten)]
    pub conditions: ConditionArgs,

    /// Narrative proxy log of one mitigation strategy (repeatable)
    #[arg(long = "detector", value_name = "LABEL=PATH", value_parser = parse_labeled_path)]
    pub detectors: Vec<(String, PathBuf)>,

    /// Label of the unmitigated condition
    #[arg(long, value_name = "LABEL")]
    pub baseline: Option<String>,
}

#[derive(Args, Debug)]
pub struct LatencyArgs {
    /// Ping output of one run (repeatable)
    #[arg(long = "ping", value_name = "PATH", required = true)]
    pub pings: Vec<PathBuf>,

    /// Proxy log of the run at the same position (repeatable)
    #[arg(long = "proxy", value_name = "PATH")]
    pub proxies: Vec<PathBuf>,
}

fn split_label(value: &str) -> Result<(&str, &str), String> {
    match value.split_once('=') {
        Some((label, rest)) if !label.trim().is_empty() && !rest.is_empty() => {
            Ok((label.trim(), rest))
        }
        _ => Err(format!("expected LABEL=VALUE, got '{}'", value)),
    }
}

/// Parse `LABEL=PATH`
pub fn parse_labeled_path(value: &str) -> Result<(String, PathBuf), String> {
    let (label, path) = split_label(value)?;
    Ok((label.to_string(), PathBuf::from(path)))
}

/// Parse `LABEL=N` with `N >= 1`
pub fn parse_labeled_symbols(value: &str) -> Result<(String, u32), String> {
    let (label, n) = split_label(value)?;
    let n: u32 = n
        .parse()
        .map_err(|_| format!("symbols per byte must be a positive integer, got '{}'", n))?;
    if n == 0 {
        return Err("symbols per byte must be at least 1".to_string());
    }
    Ok((label.to_string(), n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_capacity_conditions() {
        let cli = Cli::parse_from([
            "covert-metrics",
            "capacity",
            "--condition",
            "No Mitigation=logs/none.txt",
            "--condition",
            "Typed=logs/typed.txt",
            "--symbols",
            "Typed=4",
        ]);
        let Command::Capacity(args) = cli.command else {
            panic!("expected capacity subcommand");
        };
        assert_eq!(args.conditions.len(), 2);
        assert_eq!(args.conditions[0].0, "No Mitigation");
        assert_eq!(args.conditions[0].1, PathBuf::from("logs/none.txt"));
        assert_eq!(args.symbols, vec![("Typed".to_string(), 4)]);
    }

    #[test]
    fn test_cli_format_default_text() {
        let cli = Cli::parse_from(["covert-metrics", "capacity"]);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.debug);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "covert-metrics",
            "capacity",
            "--format",
            "json",
            "--debug",
            "--config",
            "analysis.toml",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("analysis.toml")));
    }

    #[test]
    fn test_cli_detection_args() {
        let cli = Cli::parse_from([
            "covert-metrics",
            "detection",
            "--covert",
            "covert.log",
            "--normal",
            "normal.log",
            "--threshold",
            "750",
        ]);
        let Command::Detection(args) = cli.command else {
            panic!("expected detection subcommand");
        };
        assert_eq!(args.covert, PathBuf::from("covert.log"));
        assert_eq!(args.threshold, Some(750.0));
        assert!(!args.narrative);
    }

    #[test]
    fn test_cli_detection_requires_both_corpora() {
        let result = Cli::try_parse_from(["covert-metrics", "detection", "--covert", "c.log"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_mitigation_args() {
        let cli = Cli::parse_from([
            "covert-metrics",
            "mitigation",
            "--condition",
            "Drop Strategy=drop.txt",
            "--detector",
            "Drop Strategy=drop-mitm.log",
            "--baseline",
            "Baseline",
        ]);
        let Command::Mitigation(args) = cli.command else {
            panic!("expected mitigation subcommand");
        };
        assert_eq!(args.conditions.conditions.len(), 1);
        assert_eq!(args.detectors[0].1, PathBuf::from("drop-mitm.log"));
        assert_eq!(args.baseline.as_deref(), Some("Baseline"));
    }

    #[test]
    fn test_cli_latency_requires_ping() {
        assert!(Cli::try_parse_from(["covert-metrics", "latency"]).is_err());
        let cli = Cli::parse_from(["covert-metrics", "latency", "--ping", "p1.txt", "--ping", "p2.txt"]);
        let Command::Latency(args) = cli.command else {
            panic!("expected latency subcommand");
        };
        assert_eq!(args.pings.len(), 2);
        assert!(args.proxies.is_empty());
    }

    #[test]
    fn test_parse_labeled_path() {
        assert_eq!(
            parse_labeled_path("Typed Small With 5ms Delay=typed_small.txt_5.txt").unwrap(),
            (
                "Typed Small With 5ms Delay".to_string(),
                PathBuf::from("typed_small.txt_5.txt")
            )
        );
        assert!(parse_labeled_path("no-separator").is_err());
        assert!(parse_labeled_path("=path").is_err());
        assert!(parse_labeled_path("label=").is_err());
    }

    #[test]
    fn test_parse_labeled_symbols() {
        assert_eq!(parse_labeled_symbols("Typed=4").unwrap(), ("Typed".to_string(), 4));
        assert!(parse_labeled_symbols("Typed=0").is_err());
        assert!(parse_labeled_symbols("Typed=four").is_err());
    }
}
