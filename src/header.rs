//! Header row detection and multi-level label flattening.
//!
//! Detection looks only at the leading rows of a grid. A row counts as a
//! header row when more than half of its cells hold text, and header rows
//! must form an unbroken prefix: the first row that fails the test ends the
//! scan, even if later rows would pass on their own.

use crate::data::Cell;

/// Number of leading rows inspected when looking for header rows.
pub const DEFAULT_MAX_HEADER_ROWS: usize = 5;

/// Indices of the rows that make up the header, always a non-empty prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
    rows: Vec<usize>,
}

impl HeaderSpec {
    /// A header spec covering the first `count` rows (at least one).
    pub fn leading(count: usize) -> Self {
        Self {
            rows: (0..count.max(1)).collect(),
        }
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Never true: a spec holds at least one row.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_multi_level(&self) -> bool {
        self.rows.len() > 1
    }

    /// Index of the first data row.
    pub fn data_start(&self) -> usize {
        self.rows.len()
    }
}

impl Default for HeaderSpec {
    fn default() -> Self {
        Self::leading(1)
    }
}

/// Decides how many leading rows of `peek_rows` form the header.
pub fn detect_header_rows(peek_rows: &[Vec<Cell>], max_rows: usize) -> HeaderSpec {
    let count = peek_rows
        .iter()
        .take(max_rows)
        .take_while(|row| row_is_header(row))
        .count();
    HeaderSpec::leading(count)
}

fn row_is_header(row: &[Cell]) -> bool {
    if row.is_empty() {
        return false;
    }
    let strings = row.iter().filter(|cell| cell.is_string()).count();
    strings * 2 > row.len()
}

/// Collapses per-column header levels into one flat label per column.
///
/// `levels` holds one row per header level. Non-missing labels at a column
/// position are joined with `_` in level order; a column with no label at
/// all is named `Unnamed: {index}`.
pub fn flatten_header_labels(levels: &[Vec<Cell>], width: usize) -> Vec<String> {
    (0..width)
        .map(|column| {
            let label = levels
                .iter()
                .filter_map(|level| level.get(column))
                .filter(|cell| !cell.is_missing())
                .map(Cell::as_display)
                .collect::<Vec<_>>()
                .join("_");
            if label.is_empty() {
                format!("Unnamed: {column}")
            } else {
                label
            }
        })
        .collect()
}
