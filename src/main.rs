use anyhow::{bail, Context, Result};
use clap::Parser;
use covert_metrics::cli::{Cli, Command, ConditionArgs, LatencyArgs, OutputFormat};
use covert_metrics::config::{AnalysisConfig, ConditionSpec, DetectorSpec};
use covert_metrics::csv_output::CsvOutput;
use covert_metrics::json_output::JsonOutput;
use covert_metrics::pipeline::{self, LatencyRunSpec, ScoreLayout};
use covert_metrics::report;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    match &cli.config {
        Some(path) => AnalysisConfig::from_toml(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Append CLI conditions and apply `--symbols` overrides
fn apply_condition_args(config: &mut AnalysisConfig, args: &ConditionArgs) -> Result<()> {
    for (label, path) in &args.conditions {
        config.conditions.push(ConditionSpec::new(label.clone(), path.clone()));
    }

    for (label, symbols) in &args.symbols {
        match config.conditions.iter_mut().find(|c| &c.label == label) {
            Some(condition) => condition.symbols_per_byte = *symbols,
            None => bail!("--symbols names unknown condition '{}'", label),
        }
    }

    if config.conditions.is_empty() {
        bail!("No conditions given; pass --condition LABEL=PATH or list [[condition]] tables in --config");
    }
    Ok(())
}

fn latency_specs(args: &LatencyArgs) -> Result<Vec<LatencyRunSpec>> {
    if !args.proxies.is_empty() && args.proxies.len() != args.pings.len() {
        bail!(
            "{} --proxy logs given for {} --ping logs; pass one per run or none",
            args.proxies.len(),
            args.pings.len()
        );
    }

    Ok(args
        .pings
        .iter()
        .enumerate()
        .map(|(i, ping)| LatencyRunSpec {
            ping: ping.clone(),
            proxy: args.proxies.get(i).cloned(),
        })
        .collect())
}

fn emit<T: Serialize>(
    format: OutputFormat,
    analysis: &str,
    value: &T,
    text: impl FnOnce(&T) -> String,
    csv: impl FnOnce(&T) -> CsvOutput,
) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", text(value)),
        OutputFormat::Json => println!("{}", JsonOutput::new(analysis, value).to_json()?),
        OutputFormat::Csv => print!("{}", csv(value).to_csv()),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.debug);

    let mut config = load_config(&cli)?;

    match &cli.command {
        Command::Capacity(args) => {
            apply_condition_args(&mut config, args)?;
            config.validate().context("Invalid analysis configuration")?;

            let conditions = pipeline::analyze_conditions(&config.conditions, &config)?;
            emit(
                cli.format,
                "capacity",
                &conditions,
                |c| report::capacity_report(c),
                |c| CsvOutput::from_conditions(c),
            )?;
        }
        Command::Detection(args) => {
            if let Some(threshold) = args.threshold {
                config.detection_threshold = threshold;
            }
            config.validate().context("Invalid analysis configuration")?;

            let layout = if args.narrative {
                ScoreLayout::Narrative
            } else {
                ScoreLayout::Assessments
            };
            let detection = pipeline::analyze_detection(&args.covert, &args.normal, layout, &config)
                .context("Detection evaluation failed")?;
            emit(
                cli.format,
                "detection",
                &detection,
                report::detection_report,
                CsvOutput::from_detection,
            )?;
        }
        Command::Mitigation(args) => {
            apply_condition_args(&mut config, &args.conditions)?;
            for (label, path) in &args.detectors {
                config.detectors.push(DetectorSpec {
                    label: label.clone(),
                    path: path.clone(),
                });
            }
            if let Some(baseline) = &args.baseline {
                config.baseline = baseline.clone();
            }
            config.validate().context("Invalid analysis configuration")?;

            let mitigation = pipeline::analyze_mitigation(&config)?;
            emit(
                cli.format,
                "mitigation",
                &mitigation,
                report::mitigation_report,
                CsvOutput::from_mitigation,
            )?;
        }
        Command::Latency(args) => {
            config.validate().context("Invalid analysis configuration")?;

            let specs = latency_specs(args)?;
            let latency = pipeline::analyze_latency(&specs, &config)?;
            emit(
                cli.format,
                "latency",
                &latency,
                report::latency_report,
                CsvOutput::from_latency,
            )?;
        }
    }

    Ok(())
}
