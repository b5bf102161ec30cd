//! Batch orchestration: discover workbooks, archive them, and turn every sheet
//! into a typed CSV.
//!
//! Faults are isolated at two boundaries. A sheet that cannot be read or
//! written is logged and skipped while the rest of its workbook continues; a
//! workbook that cannot be archived or opened is logged and skipped while the
//! rest of the batch continues. Nothing after start-up aborts a run.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};

use crate::{
    archive::archive_file,
    cli::RunArgs,
    error::IngestResult,
    header::DEFAULT_MAX_HEADER_ROWS,
    schema::{TypedTable, build_typed_table},
    sink::{CsvDirectorySink, TableSink},
    workbook::{CalamineWorkbook, WorkbookSource},
};

/// Prefix office suites use for lock files next to an open workbook.
const LOCK_FILE_PREFIX: &str = "~$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pattern: String,
    pub max_header_rows: usize,
    pub archive: bool,
}

impl PipelineConfig {
    pub fn from_base_dir(base_dir: &Path) -> Self {
        let data = base_dir.join("data");
        Self {
            input_dir: data.join("input"),
            processed_dir: data.join("processed"),
            output_dir: data.join("output"),
            pattern: "*.xlsx".to_string(),
            max_header_rows: DEFAULT_MAX_HEADER_ROWS,
            archive: true,
        }
    }

    pub fn from_args(args: &RunArgs) -> Self {
        let defaults = Self::from_base_dir(&args.base_dir);
        Self {
            input_dir: args.input_dir.clone().unwrap_or(defaults.input_dir),
            processed_dir: args.processed_dir.clone().unwrap_or(defaults.processed_dir),
            output_dir: args.output_dir.clone().unwrap_or(defaults.output_dir),
            pattern: args.pattern.clone(),
            max_header_rows: args.max_header_rows,
            archive: !args.no_archive,
        }
    }
}

/// Counts gathered over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub files_seen: usize,
    pub files_failed: usize,
    pub sheets_written: usize,
    pub sheets_failed: usize,
}

/// Sheet counts for one workbook.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SheetTally {
    pub written: usize,
    pub failed: usize,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates the input, processed and output directories if needed.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        for dir in [
            &config.input_dir,
            &config.processed_dir,
            &config.output_dir,
        ] {
            fs::create_dir_all(dir).with_context(|| format!("Creating directory {dir:?}"))?;
        }
        debug!(
            "Directories: input {:?}, processed {:?}, output {:?}",
            config.input_dir, config.processed_dir, config.output_dir
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Workbooks in the input directory matching the pattern, sorted by path.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let escaped_dir = glob::Pattern::escape(&self.config.input_dir.to_string_lossy());
        let pattern = Path::new(&escaped_dir).join(&self.config.pattern);
        let pattern = pattern
            .to_str()
            .ok_or_else(|| anyhow!("Input pattern {pattern:?} is not valid UTF-8"))?;
        let mut files = Vec::new();
        for entry in glob::glob(pattern).with_context(|| format!("Parsing pattern '{pattern}'"))? {
            let path = entry.context("Reading input directory entry")?;
            if !path.is_file() || is_lock_file(&path) {
                debug!("Skipping {:?}", path);
                continue;
            }
            files.push(path);
        }
        files.sort();
        Ok(files)
    }

    pub fn run(&self) -> RunSummary {
        info!("Starting pipeline execution");
        let mut summary = RunSummary::default();

        let files = match self.discover() {
            Ok(files) => files,
            Err(err) => {
                error!("Failed to list input files: {err:#}");
                return summary;
            }
        };
        if files.is_empty() {
            warn!(
                "No spreadsheet files found in input directory {:?}",
                self.config.input_dir
            );
            return summary;
        }

        for path in files {
            summary.files_seen += 1;
            let name = display_name(&path);
            info!("Processing file: {name}");
            match self.process_file(&path) {
                Ok(tally) => {
                    summary.sheets_written += tally.written;
                    summary.sheets_failed += tally.failed;
                }
                Err(err) => {
                    summary.files_failed += 1;
                    error!("Failed to process {name}: {err:#}");
                }
            }
        }

        info!(
            "Pipeline execution completed: {} file(s), {} failed; {} sheet(s) written, {} failed",
            summary.files_seen, summary.files_failed, summary.sheets_written, summary.sheets_failed
        );
        summary
    }

    fn process_file(&self, path: &Path) -> Result<SheetTally> {
        if self.config.archive {
            let copy = archive_file(path, &self.config.processed_dir)?;
            info!("Persisted file to {:?}", copy);
        }
        let mut workbook = CalamineWorkbook::open(path)?;
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut sink = CsvDirectorySink::new(&self.config.output_dir);
        Ok(self.process_workbook(&stem, &mut workbook, &mut sink))
    }

    /// Runs every sheet of `workbook` through inference into `sink`.
    pub fn process_workbook<W, S>(
        &self,
        file_stem: &str,
        workbook: &mut W,
        sink: &mut S,
    ) -> SheetTally
    where
        W: WorkbookSource + ?Sized,
        S: TableSink + ?Sized,
    {
        let mut tally = SheetTally::default();
        for sheet in workbook.sheet_names() {
            info!("Processing sheet: {sheet}");
            match self.process_sheet(file_stem, &sheet, workbook, sink) {
                Ok(path) => {
                    tally.written += 1;
                    info!("Saved processed sheet to {:?}", path);
                }
                Err(err) => {
                    tally.failed += 1;
                    error!("Failed to process sheet {sheet}: {err}");
                }
            }
        }
        tally
    }

    fn process_sheet<W, S>(
        &self,
        file_stem: &str,
        sheet: &str,
        workbook: &mut W,
        sink: &mut S,
    ) -> IngestResult<PathBuf>
    where
        W: WorkbookSource + ?Sized,
        S: TableSink + ?Sized,
    {
        let grid = workbook.read_grid(sheet)?;
        let table = build_typed_table(&grid, self.config.max_header_rows);
        log_inference(sheet, &table);
        sink.write(&table, file_stem, sheet)
    }
}

pub fn execute(args: &RunArgs) -> Result<()> {
    let pipeline = Pipeline::new(PipelineConfig::from_args(args))?;
    pipeline.run();
    Ok(())
}

fn log_inference(sheet: &str, table: &TypedTable) {
    debug!(
        "Sheet {sheet}: header rows {:?}, {} data row(s)",
        table.header().rows(),
        table.row_count()
    );
    for column in table.columns() {
        debug!(
            "Sheet {sheet}: column '{}' from '{}' typed {} via {}",
            column.name,
            column.label,
            column.data.column_type(),
            column.step
        );
    }
    for name in table.duplicate_names() {
        warn!("Sheet {sheet}: column name '{name}' occurs more than once");
    }
    if table.columns().iter().any(|column| column.name.is_empty()) {
        warn!("Sheet {sheet}: a header label normalized to an empty column name");
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOCK_FILE_PREFIX))
}
