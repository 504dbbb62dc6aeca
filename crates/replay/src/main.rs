mod trace;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use movelint::{ConfigError, LintConfig};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trace::{ReplayDriver, Trace, TraceError};

#[derive(Debug, Error)]
enum ReplayError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trace(#[from] TraceError),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ReplayOptions {
    config_path: Option<PathBuf>,
    trace_path: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();

    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print_usage();
        return ExitCode::SUCCESS;
    }
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{}", usage_text());
            return ExitCode::from(1);
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "replay_failed");
            ExitCode::from(1)
        }
    }
}

fn run(options: &ReplayOptions) -> Result<(), ReplayError> {
    let config = match &options.config_path {
        Some(path) => LintConfig::load_from_path(path)?,
        None => LintConfig::default(),
    };
    let trace = Trace::load_from_path(&options.trace_path)?;
    info!(frames = trace.frames.len(), "trace_loaded");

    let mut driver = ReplayDriver::new(config);
    let report = driver.run(&trace);
    info!(
        frames_run = report.frames_run,
        lints = report.lints.len(),
        commands = report.commands_issued,
        kills = report.kills_requested,
        "replay_complete"
    );

    println!(
        "{} frames, {} lint events, {} response commands, {} kill requests",
        report.frames_run,
        report.lints.len(),
        report.commands_issued,
        report.kills_requested
    );
    for lint in &report.lints {
        println!(
            "  frame {:>6}  {:<28}  {}",
            lint.frame,
            lint.rule.name(),
            lint.text
        );
    }
    Ok(())
}

fn parse_args(args: &[String]) -> Result<ReplayOptions, String> {
    let mut config_path = None;
    let mut trace_path = None;
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--config" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --config".to_string())?;
                config_path = Some(PathBuf::from(value));
                index += 2;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option '{other}'"));
            }
            other => {
                if trace_path.is_some() {
                    return Err(format!("unexpected extra argument '{other}'"));
                }
                trace_path = Some(PathBuf::from(other));
                index += 1;
            }
        }
    }
    let trace_path = trace_path.ok_or_else(|| "missing trace file argument".to_string())?;
    Ok(ReplayOptions {
        config_path,
        trace_path,
    })
}

fn usage_text() -> String {
    "usage: replay [--config <lint-config.json>] <trace.json>".to_string()
}

fn print_usage() {
    println!("{}", usage_text());
    println!();
    println!("Replays a recorded input/physics trace through the movement linter");
    println!("and reports every near-miss it detects.");
    println!();
    println!("  --config <path>   lint configuration to apply (defaults otherwise)");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
