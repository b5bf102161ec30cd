//! Delimited-text output for typed tables.
//!
//! One CSV per sheet, named `{file_stem}_{sheet}.csv`. The header record
//! carries the canonical names; values follow [`TypedColumn::render`], so
//! nulls are empty fields, integers have no decimal point and timestamps use
//! a single fixed layout.
//!
//! [`TypedColumn::render`]: crate::infer::TypedColumn::render

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    error::{IngestError, IngestResult},
    schema::TypedTable,
};

pub trait TableSink {
    /// Persists `table` for `sheet` of the workbook named `file_stem` and
    /// returns where it went.
    fn write(&mut self, table: &TypedTable, file_stem: &str, sheet: &str)
    -> IngestResult<PathBuf>;
}

/// Writes each table to its own CSV file in one directory.
#[derive(Debug, Clone)]
pub struct CsvDirectorySink {
    output_dir: PathBuf,
}

impl CsvDirectorySink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl TableSink for CsvDirectorySink {
    fn write(
        &mut self,
        table: &TypedTable,
        file_stem: &str,
        sheet: &str,
    ) -> IngestResult<PathBuf> {
        let path = output_path(&self.output_dir, file_stem, sheet);
        let file = File::create(&path).map_err(|err| IngestError::io(&path, err))?;
        write_table(table, BufWriter::new(file)).map_err(|source| IngestError::Csv {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

pub fn output_path(output_dir: &Path, file_stem: &str, sheet: &str) -> PathBuf {
    output_dir.join(format!("{file_stem}_{sheet}.csv"))
}

/// Serializes `table` as comma-delimited text. A table without columns
/// writes nothing.
pub fn write_table<W: Write>(table: &TypedTable, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    if !table.columns().is_empty() {
        csv_writer.write_record(table.names())?;
        for row in 0..table.row_count() {
            csv_writer.write_record(table.render_row(row))?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}
