//! Workbook access. The pipeline only needs sheet names and a full grid per
//! sheet, so the reader sits behind [`WorkbookSource`].

use std::{fs::File, io::BufReader, path::Path};

use calamine::{Data, DataType, Range, Reader, Sheets, open_workbook_auto};

use crate::{
    data::{Cell, is_missing_text},
    error::{IngestError, IngestResult},
    grid::RawGrid,
};

pub trait WorkbookSource {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Reads the used area of `sheet`. Columns are anchored at column A;
    /// rows before the first one holding a value are not kept.
    fn read_grid(&mut self, sheet: &str) -> IngestResult<RawGrid>;
}

/// Any workbook format `calamine` understands (xlsx, xlsm, xlsb, xls, ods).
pub struct CalamineWorkbook {
    sheets: Sheets<BufReader<File>>,
}

impl CalamineWorkbook {
    pub fn open(path: &Path) -> IngestResult<Self> {
        let sheets = open_workbook_auto(path).map_err(|source| IngestError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { sheets })
    }
}

impl WorkbookSource for CalamineWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    fn read_grid(&mut self, sheet: &str) -> IngestResult<RawGrid> {
        let range = self
            .sheets
            .worksheet_range(sheet)
            .map_err(|source| IngestError::Sheet {
                sheet: sheet.to_string(),
                source,
            })?;
        Ok(grid_from_range(&range))
    }
}

fn grid_from_range(range: &Range<Data>) -> RawGrid {
    let Some((_, first_col)) = range.start() else {
        return RawGrid::default();
    };
    let lead_cols = first_col as usize;
    let rows = range
        .rows()
        .map(|source| {
            let mut row = vec![Cell::Empty; lead_cols];
            row.extend(source.iter().map(cell_from_data));
            row
        })
        .collect();
    RawGrid::new(rows)
}

pub(crate) fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if is_missing_text(s) => Cell::Empty,
        Data::String(s) => Cell::String(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => data
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::String(data.to_string())),
        Data::DurationIso(s) => Cell::String(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}
