//! In-memory grid of untyped cells for one sheet.

use crate::{
    data::Cell,
    header::{HeaderSpec, flatten_header_labels},
};

/// Rows of untyped cells, padded to a common width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

/// A grid split at its header rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPartition<'a> {
    pub labels: Vec<String>,
    pub data: &'a [Vec<Cell>],
}

impl RawGrid {
    /// Rows above the first one holding any value are dropped, so a sheet
    /// whose table starts lower down still has its header in row 0.
    pub fn new(mut rows: Vec<Vec<Cell>>) -> Self {
        let leading_blank = rows
            .iter()
            .take_while(|row| row.iter().all(Cell::is_missing))
            .count();
        rows.drain(..leading_blank);
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self { rows, width }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `max_rows` rows, or fewer when the grid is shorter.
    pub fn peek(&self, max_rows: usize) -> &[Vec<Cell>] {
        &self.rows[..self.rows.len().min(max_rows)]
    }

    /// Splits the grid into flattened header labels and data rows.
    ///
    /// Multi-level headers are laid out the way merged cells are: a blank in
    /// any level but the last continues the label to its left.
    pub fn partition(&self, spec: &HeaderSpec) -> GridPartition<'_> {
        let split = spec.data_start().min(self.rows.len());
        let (header, data) = self.rows.split_at(split);
        let labels = if header.is_empty() {
            Vec::new()
        } else if spec.is_multi_level() {
            flatten_header_labels(&fill_merged_labels(header), self.width)
        } else {
            flatten_header_labels(header, self.width)
        };
        GridPartition { labels, data }
    }
}

impl GridPartition<'_> {
    /// Cells of one column across the data rows.
    pub fn column(&self, index: usize) -> Vec<Cell> {
        self.data
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or(Cell::Empty))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }
}

fn fill_merged_labels(levels: &[Vec<Cell>]) -> Vec<Vec<Cell>> {
    let last = levels.len().saturating_sub(1);
    levels
        .iter()
        .enumerate()
        .map(|(depth, level)| {
            if depth == last {
                return level.clone();
            }
            let mut current = Cell::Empty;
            level
                .iter()
                .map(|cell| {
                    if !cell.is_missing() {
                        current = cell.clone();
                    }
                    current.clone()
                })
                .collect()
        })
        .collect()
}
