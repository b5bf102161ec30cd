pub mod archive;
pub mod cli;
pub mod data;
pub mod error;
pub mod grid;
pub mod header;
pub mod infer;
pub mod naming;
pub mod pipeline;
pub mod preview;
pub mod schema;
pub mod sink;
pub mod workbook;

use std::{
    env,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use env_logger::Target;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

/// Installs the process-wide logger once. Records go to stderr and, when
/// `log_file` is given, are appended to that file as well.
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if env::var("RUST_LOG").is_err() {
        builder.filter_module("sheet_ingest", LevelFilter::Info);
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            record.level(),
            record.args()
        )
    });
    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating log directory {parent:?}"))?;
        }
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Opening log file {path:?}"))?;
        builder.target(Target::Pipe(Box::new(TeeWriter { file })));
    }
    LOGGER.get_or_init(|| {
        let _ = builder.try_init();
    });
    Ok(())
}

/// Log file for a run started now: `pipeline_{YYYYmmdd_HHMMSS}.log`.
pub fn run_log_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join(format!(
        "pipeline_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => {
            let log_file = (!args.no_log_file).then(|| run_log_path(&args.logs_dir()));
            init_logging(log_file.as_deref())?;
            pipeline::execute(&args)
        }
        Commands::Inspect(args) => {
            init_logging(None)?;
            preview::execute(&args)
        }
    }
}

struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}
