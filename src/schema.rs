//! Schema inference for one sheet: header detection, name normalization and
//! per-column typing composed into a [`TypedTable`].
//!
//! The engine is pure. It reports what it decided (header rows, the cascade
//! step behind every column, duplicate names) through the returned table and
//! leaves logging and fault handling to the caller.

use serde::{Deserialize, Serialize};

use crate::{
    grid::RawGrid,
    header::{HeaderSpec, detect_header_rows},
    infer::{CascadeStep, ColumnType, TypedColumn, infer_and_convert},
    naming::{duplicate_names, normalize_column_name},
};

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    /// Canonical identifier used in output.
    pub name: String,
    /// Flattened header label the name was derived from.
    pub label: String,
    pub data: TypedColumn,
    pub step: CascadeStep,
}

/// Typed columns in sheet order, all of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedTable {
    header: HeaderSpec,
    columns: Vec<TableColumn>,
    row_count: usize,
}

impl TypedTable {
    pub fn header(&self) -> &HeaderSpec {
        &self.header
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Canonical names that appear on more than one column.
    pub fn duplicate_names(&self) -> Vec<String> {
        duplicate_names(&self.names())
    }

    /// Rendered values of one data row, in column order.
    pub fn render_row(&self, row: usize) -> Vec<String> {
        self.columns.iter().map(|c| c.data.render(row)).collect()
    }

    pub fn summary(&self) -> SchemaSummary {
        SchemaSummary {
            header_rows: self.header.rows().to_vec(),
            row_count: self.row_count,
            columns: self
                .columns
                .iter()
                .map(|column| ColumnSummary {
                    name: column.name.clone(),
                    label: column.label.clone(),
                    data_type: column.data.column_type(),
                    nulls: column.data.null_count(),
                })
                .collect(),
        }
    }
}

/// Serializable description of an inferred table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSummary {
    pub header_rows: Vec<usize>,
    pub row_count: usize,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub label: String,
    pub data_type: ColumnType,
    pub nulls: usize,
}

/// Builds the typed table for one sheet grid.
pub fn build_typed_table(grid: &RawGrid, max_header_rows: usize) -> TypedTable {
    let header = detect_header_rows(grid.peek(max_header_rows), max_header_rows);
    build_table_with_header(grid, header)
}

/// Builds the typed table with header rows already known.
pub fn build_table_with_header(grid: &RawGrid, header: HeaderSpec) -> TypedTable {
    let partition = grid.partition(&header);
    let columns = partition
        .labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let outcome = infer_and_convert(&partition.column(index));
            TableColumn {
                name: normalize_column_name(label),
                label: label.clone(),
                data: outcome.column,
                step: outcome.step,
            }
        })
        .collect();
    TypedTable {
        header,
        columns,
        row_count: partition.row_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cell;
    use crate::header::DEFAULT_MAX_HEADER_ROWS;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> Cell {
        Cell::DateTime(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn builds_typed_columns_from_a_simple_sheet() {
        let grid = RawGrid::new(vec![
            vec!["Name".into(), "Amount".into(), "Date".into()],
            vec!["Alice".into(), Cell::Float(10.0), day(2023, 1, 1)],
            vec!["Bob".into(), Cell::Float(20.5), day(2023, 1, 2)],
        ]);
        let table = build_typed_table(&grid, DEFAULT_MAX_HEADER_ROWS);

        assert_eq!(table.names(), vec!["name", "amount", "date"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column("name").unwrap().data,
            TypedColumn::String(vec!["Alice".into(), "Bob".into()])
        );
        assert_eq!(
            table.column("amount").unwrap().data,
            TypedColumn::Float(vec![10.0, 20.5])
        );
        assert_eq!(
            table.column("date").unwrap().data.column_type(),
            ColumnType::Timestamp
        );
        assert_eq!(table.render_row(1), vec!["Bob", "20.5", "2023-01-02 00:00:00"]);
    }

    #[test]
    fn text_cells_under_a_known_header_are_typed() {
        let grid = RawGrid::new(vec![
            vec!["Name".into(), "Amount".into(), "Date".into()],
            vec!["Alice".into(), "10".into(), "2023-01-01".into()],
            vec!["Bob".into(), "20.5".into(), "2023-01-02".into()],
        ]);
        let table = build_table_with_header(&grid, HeaderSpec::default());

        assert_eq!(table.names(), vec!["name", "amount", "date"]);
        assert_eq!(
            table.column("name").unwrap().data,
            TypedColumn::String(vec!["Alice".into(), "Bob".into()])
        );
        assert_eq!(
            table.column("amount").unwrap().data,
            TypedColumn::Float(vec![10.0, 20.5])
        );
        let TypedColumn::Timestamp(dates) = &table.column("date").unwrap().data else {
            panic!("expected timestamp column");
        };
        let midnight = |d: u32| {
            NaiveDate::from_ymd_opt(2023, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
        };
        assert_eq!(dates, &vec![midnight(1), midnight(2)]);
    }

    #[test]
    fn header_is_found_below_leading_blank_rows() {
        let grid = RawGrid::new(vec![
            vec![Cell::Empty, Cell::Empty],
            vec!["Name".into(), "Amount".into()],
            vec!["Alice".into(), Cell::Float(10.0)],
        ]);
        let table = build_typed_table(&grid, DEFAULT_MAX_HEADER_ROWS);
        assert_eq!(table.header().rows(), &[0]);
        assert_eq!(table.names(), vec!["name", "amount"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(
            table.column("amount").unwrap().data,
            TypedColumn::Integer(vec![Some(10)])
        );
    }

    #[test]
    fn multi_level_headers_are_flattened_then_normalized() {
        let grid = RawGrid::new(vec![
            vec!["Sales".into(), "Sales".into()],
            vec!["Q1".into(), "Q2".into()],
            vec![Cell::Float(1.0), Cell::Float(2.0)],
        ]);
        let table = build_typed_table(&grid, DEFAULT_MAX_HEADER_ROWS);
        assert_eq!(table.header().rows(), &[0, 1]);
        assert_eq!(table.names(), vec!["sales_q1", "sales_q2"]);
        assert_eq!(table.columns()[0].label, "Sales_Q1");
        assert_eq!(
            table.columns()[0].data,
            TypedColumn::Integer(vec![Some(1)])
        );
    }

    #[test]
    fn duplicate_names_are_kept_and_reported() {
        let grid = RawGrid::new(vec![
            vec!["Amount".into(), "amount ".into()],
            vec![Cell::Float(1.0), Cell::Float(2.0)],
        ]);
        let table = build_typed_table(&grid, DEFAULT_MAX_HEADER_ROWS);
        assert_eq!(table.names(), vec!["amount", "amount"]);
        assert_eq!(table.duplicate_names(), vec!["amount"]);
    }

    #[test]
    fn all_header_sheet_has_empty_columns() {
        let grid = RawGrid::new(vec![vec!["a".into(), "b".into()]]);
        let table = build_typed_table(&grid, DEFAULT_MAX_HEADER_ROWS);
        assert_eq!(table.row_count(), 0);
        assert!(table.columns().iter().all(|c| c.step == CascadeStep::Empty));
    }

    #[test]
    fn empty_sheet_produces_no_columns() {
        let table = build_typed_table(&RawGrid::default(), DEFAULT_MAX_HEADER_ROWS);
        assert!(table.columns().is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.header().rows(), &[0]);
    }

    #[test]
    fn summary_serializes_lowercase_types() {
        let grid = RawGrid::new(vec![
            vec!["id".into(), "note".into()],
            vec![Cell::Float(1.0), "x".into()],
            vec![Cell::Empty, "y".into()],
        ]);
        let summary = build_typed_table(&grid, DEFAULT_MAX_HEADER_ROWS).summary();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["columns"][0]["data_type"], "integer");
        assert_eq!(json["columns"][0]["nulls"], 1);
        assert_eq!(json["columns"][1]["data_type"], "string");
    }
}
