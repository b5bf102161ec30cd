//! `inspect`: show what inference decides for a workbook without writing
//! anything.

use std::fmt::Write as _;

use anyhow::{Context, Result, anyhow};
use log::info;
use serde::Serialize;

use crate::{
    cli::InspectArgs,
    schema::{SchemaSummary, TypedTable, build_typed_table},
    workbook::{CalamineWorkbook, WorkbookSource},
};

#[derive(Debug, Serialize)]
struct SheetSchema {
    sheet: String,
    #[serde(flatten)]
    schema: SchemaSummary,
}

pub fn execute(args: &InspectArgs) -> Result<()> {
    let mut workbook = CalamineWorkbook::open(&args.input)
        .with_context(|| format!("Opening workbook {:?}", args.input))?;
    let sheets = match &args.sheet {
        Some(sheet) => {
            if !workbook.sheet_names().contains(sheet) {
                return Err(anyhow!("Sheet '{sheet}' not found in {:?}", args.input));
            }
            vec![sheet.clone()]
        }
        None => workbook.sheet_names(),
    };

    let mut schemas = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let grid = workbook.read_grid(&sheet)?;
        let table = build_typed_table(&grid, args.max_header_rows);
        if args.json {
            schemas.push(SheetSchema {
                sheet,
                schema: table.summary(),
            });
        } else {
            println!("Sheet: {sheet} (header rows {:?})", table.header().rows());
            print!("{}", render_preview(&table, args.rows));
            println!();
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&schemas).context("Serializing schema JSON")?;
        println!("{json}");
    }
    info!("Inspected {:?}", args.input);
    Ok(())
}

/// Column names, their types, then up to `max_rows` rendered data rows,
/// aligned into fixed-width columns.
pub fn render_preview(table: &TypedTable, max_rows: usize) -> String {
    if table.columns().is_empty() {
        return "(no columns)\n".to_string();
    }
    let names = table.names();
    let types = table
        .columns()
        .iter()
        .map(|column| column.data.column_type().to_string())
        .collect::<Vec<_>>();
    let rows = (0..table.row_count().min(max_rows))
        .map(|row| table.render_row(row))
        .collect::<Vec<_>>();

    let mut widths = names
        .iter()
        .zip(&types)
        .map(|(name, ty)| name.chars().count().max(ty.chars().count()))
        .collect::<Vec<_>>();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(single_line(value).chars().count());
        }
    }

    let mut output = String::new();
    push_line(&mut output, &names, &widths);
    push_line(&mut output, &types, &widths);
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    push_line(&mut output, &rule, &widths);
    for row in &rows {
        push_line(&mut output, row, &widths);
    }
    if table.row_count() > rows.len() {
        let _ = writeln!(output, "... {} more row(s)", table.row_count() - rows.len());
    }
    output
}

fn push_line(output: &mut String, values: &[String], widths: &[usize]) {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", single_line(value), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(output, "{}", line.trim_end());
}

fn single_line(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}
