use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::header::DEFAULT_MAX_HEADER_ROWS;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Turn spreadsheets of unknown layout into typed, SQL-ready CSV",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Process every workbook in the input directory into typed CSV files
    Run(RunArgs),
    /// Show the inferred schema and a preview of one workbook without writing files
    Inspect(InspectArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Root directory holding data/input, data/processed, data/output and logs
    #[arg(long = "base-dir", default_value = ".")]
    pub base_dir: PathBuf,
    /// Directory scanned for workbooks (defaults to <base-dir>/data/input)
    #[arg(long = "input-dir")]
    pub input_dir: Option<PathBuf>,
    /// Directory receiving archived copies (defaults to <base-dir>/data/processed)
    #[arg(long = "processed-dir")]
    pub processed_dir: Option<PathBuf>,
    /// Directory receiving CSV output (defaults to <base-dir>/data/output)
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Directory receiving the run log (defaults to <base-dir>/logs)
    #[arg(long = "logs-dir")]
    pub logs_dir: Option<PathBuf>,
    /// File-name pattern matched inside the input directory
    #[arg(long, default_value = "*.xlsx")]
    pub pattern: String,
    /// Number of leading rows inspected for header detection
    #[arg(long = "max-header-rows", default_value_t = DEFAULT_MAX_HEADER_ROWS)]
    pub max_header_rows: usize,
    /// Log to stderr only
    #[arg(long = "no-log-file")]
    pub no_log_file: bool,
    /// Skip copying inputs to the processed directory
    #[arg(long = "no-archive")]
    pub no_archive: bool,
}

impl RunArgs {
    pub fn logs_dir(&self) -> PathBuf {
        self.logs_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("logs"))
    }
}

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Workbook to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Only inspect this sheet (defaults to every sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Number of data rows to preview
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Number of leading rows inspected for header detection
    #[arg(long = "max-header-rows", default_value_t = DEFAULT_MAX_HEADER_ROWS)]
    pub max_header_rows: usize,
    /// Print the inferred schema as JSON instead of a preview table
    #[arg(long)]
    pub json: bool,
}
