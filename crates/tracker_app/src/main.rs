mod cli;
mod config;
mod render;
mod runner;

use std::path::Path;
use std::process::ExitCode;

use log::LevelFilter;
use tracker_logging::{tracker_error, LogDestination, DEFAULT_LOG_FILE};

use crate::cli::{Action, CliArgs};
use crate::config::{AppConfig, ConfigError, DEFAULT_CONFIG_FILE, TOKEN_ENV_VAR};

fn main() -> ExitCode {
    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {err}\n\n{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };
    if args.action == Action::Help {
        println!("{}", cli::USAGE);
        return ExitCode::SUCCESS;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(2);
        }
    };

    let (destination, level) = log_setup(&config);
    if !tracker_logging::initialize(destination, level) {
        eprintln!("Warning: logging is disabled; could not set up the logger.");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: could not start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };
    let token = std::env::var(TOKEN_ENV_VAR).ok().filter(|token| !token.is_empty());

    match runtime.block_on(runner::run(&args.action, &config, token)) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            tracker_error!("{:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Warnings always reach the terminal; `log_to_file` adds a debug log file.
fn log_setup(config: &AppConfig) -> (LogDestination, LevelFilter) {
    if config.log_to_file {
        (LogDestination::Both(DEFAULT_LOG_FILE.into()), LevelFilter::Debug)
    } else {
        (LogDestination::Terminal, LevelFilter::Warn)
    }
}

/// File settings first, then command-line overrides.
fn load_config(args: &CliArgs) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config_path {
        Some(path) => config::load(path, true)?,
        None => config::load(Path::new(DEFAULT_CONFIG_FILE), false)?,
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(interval_ms) = args.interval_ms {
        config.poll_interval_ms = interval_ms;
    }
    config.log_to_file |= args.log_file;
    config.validate()?;
    Ok(config)
}
