//! `sdtm` command-line entry point.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use sdtm_cli::logging::{LogConfig, LogFormat, init_logging};
use sdtm_cli::summary::print_summary;
use sdtm_standards::default_standards_root;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_domains, run_study};

/// Domains failed processing; the report lists them.
const EXIT_FAILED_DOMAINS: u8 = 1;
/// Standards, input or output could not be used at all.
const EXIT_SETUP: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::from(EXIT_SETUP);
    }
    let standards_root = cli
        .standards_dir
        .clone()
        .unwrap_or_else(default_standards_root);

    match &cli.command {
        Command::Study(args) => match run_study(args, &standards_root) {
            Ok(run) => {
                print_summary(&run.report, &run.descriptions);
                for path in &run.written {
                    println!("wrote {}", path.display());
                }
                if run.report.success {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(EXIT_FAILED_DOMAINS)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(EXIT_SETUP)
            }
        },
        Command::Domains => match run_domains(&standards_root) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(EXIT_SETUP)
            }
        },
    }
}

/// `--log-level` beats `-v`/`-q`, which beat `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
