//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sdtm",
    version,
    about = "Normalize clinical study extracts into SDTM domains and validate them",
    long_about = "Normalize clinical study extracts into SDTM domains and validate them.\n\n\
                  Reads one CSV file (or several split files) per domain, applies the\n\
                  domain rules and controlled terminology, then runs the validation\n\
                  rules across the whole study."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q and RUST_LOG).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow subject-level values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Standards directory with `sdtmig/` and `ct/` (default: CDISC_STANDARDS_DIR).
    #[arg(long = "standards-dir", value_name = "DIR", global = true)]
    pub standards_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize and validate a study folder.
    Study(StudyArgs),

    /// List the domains known to the standards.
    Domains,
}

#[derive(Parser)]
pub struct StudyArgs {
    /// Folder containing one CSV file per domain.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Write normalized domains as CSV into this folder.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Study identifier (default: the input folder name).
    #[arg(long = "study-id", value_name = "ID")]
    pub study_id: Option<String>,

    /// Warn about every column rewritten during processing.
    #[arg(long = "strict", conflicts_with = "lenient_ct")]
    pub strict: bool,

    /// Also match codelist values ignoring case and punctuation while processing.
    #[arg(long = "lenient-ct")]
    pub lenient_ct: bool,

    /// ISO 3166 alpha-3 country for DM rows with a blank or unknown COUNTRY.
    #[arg(long = "country", value_name = "CODE")]
    pub country: Option<String>,

    /// Report invalid codelist values instead of replacing them.
    #[arg(long = "no-ct-repair")]
    pub no_ct_repair: bool,

    /// Keep USUBJID values as they are in the source.
    #[arg(long = "no-usubjid-prefix")]
    pub no_usubjid_prefix: bool,

    /// Keep --SEQ values as they are in the source.
    #[arg(long = "no-auto-seq")]
    pub no_auto_seq: bool,

    /// Write the validation report as JSON to this path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
