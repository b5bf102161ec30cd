//! Per-column type inference and conversion.
//!
//! A column is typed on its own, with no knowledge of its neighbours. The
//! decision is an ordered cascade of rules; each rule has a predicate over the
//! column and a converter that either produces a typed column or declines.
//! The first rule whose predicate holds and whose converter succeeds wins,
//! and the last rule (strings) always succeeds, so every column ends up in
//! exactly one of the four types.
//!
//! | Rule | Applies when | Converter may decline |
//! |------|--------------|-----------------------|
//! | empty | column has no values | no |
//! | integer | every present value reads as a whole number | no |
//! | float | every present value reads as a number, not all whole | no |
//! | timestamp | some present value has no numeric reading | yes |
//! | string | always | no |

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::data::{
    Cell, DateLayout, FIXED_DATE_FORMATS, TIMESTAMP_FORMAT, detect_iso_layout, is_missing_text,
    parse_timestamp_lenient, parse_timestamp_with_format,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Timestamp,
    String,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Timestamp => "timestamp",
            ColumnType::String => "string",
        };
        f.write_str(name)
    }
}

/// A column converted to a single type. `None` and NaN mark missing values;
/// string columns have no missing marker of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedColumn {
    Integer(Vec<Option<i64>>),
    Float(Vec<f64>),
    Timestamp(Vec<Option<NaiveDateTime>>),
    String(Vec<String>),
}

impl TypedColumn {
    pub fn column_type(&self) -> ColumnType {
        match self {
            TypedColumn::Integer(_) => ColumnType::Integer,
            TypedColumn::Float(_) => ColumnType::Float,
            TypedColumn::Timestamp(_) => ColumnType::Timestamp,
            TypedColumn::String(_) => ColumnType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TypedColumn::Integer(values) => values.len(),
            TypedColumn::Float(values) => values.len(),
            TypedColumn::Timestamp(values) => values.len(),
            TypedColumn::String(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match self {
            TypedColumn::Integer(values) => values.iter().filter(|v| v.is_none()).count(),
            TypedColumn::Float(values) => values.iter().filter(|v| v.is_nan()).count(),
            TypedColumn::Timestamp(values) => values.iter().filter(|v| v.is_none()).count(),
            TypedColumn::String(_) => 0,
        }
    }

    /// Delimited-text rendering of one value; missing values render empty.
    pub fn render(&self, row: usize) -> String {
        match self {
            TypedColumn::Integer(values) => values
                .get(row)
                .copied()
                .flatten()
                .map(|v| v.to_string())
                .unwrap_or_default(),
            TypedColumn::Float(values) => values
                .get(row)
                .filter(|v| !v.is_nan())
                .map(|v| format!("{v:?}"))
                .unwrap_or_default(),
            TypedColumn::Timestamp(values) => values
                .get(row)
                .copied()
                .flatten()
                .map(|v| v.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            TypedColumn::String(values) => values.get(row).cloned().unwrap_or_default(),
        }
    }
}

/// Which rule of the cascade produced a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    Empty,
    Integer,
    Float,
    TimestampAuto,
    TimestampFormat(&'static str),
    TimestampPerValue,
    String,
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CascadeStep::Empty => f.write_str("empty column"),
            CascadeStep::Integer => f.write_str("nullable integer"),
            CascadeStep::Float => f.write_str("float"),
            CascadeStep::TimestampAuto => f.write_str("timestamp (detected layout)"),
            CascadeStep::TimestampFormat(fmt) => write!(f, "timestamp (format {fmt})"),
            CascadeStep::TimestampPerValue => f.write_str("timestamp (per value)"),
            CascadeStep::String => f.write_str("string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InferenceOutcome {
    pub column: TypedColumn,
    pub step: CascadeStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericProbe {
    /// Every present value is a whole number that fits an `i64`.
    Whole,
    /// Every present value is numeric, at least one is not whole.
    Fractional,
    /// Some present value has no numeric reading.
    NonNumeric,
}

struct Candidate<'a> {
    cells: &'a [Cell],
    probe: NumericProbe,
}

impl<'a> Candidate<'a> {
    fn new(cells: &'a [Cell]) -> Self {
        Self {
            cells,
            probe: probe_numeric(cells),
        }
    }
}

struct Rule {
    applies: fn(&Candidate<'_>) -> bool,
    convert: fn(&[Cell]) -> Option<InferenceOutcome>,
}

const CASCADE: [Rule; 5] = [
    Rule {
        applies: has_no_values,
        convert: keep_empty,
    },
    Rule {
        applies: is_whole,
        convert: to_nullable_integer,
    },
    Rule {
        applies: is_fractional,
        convert: to_float,
    },
    Rule {
        applies: is_non_numeric,
        convert: to_timestamp,
    },
    Rule {
        applies: always,
        convert: to_string_column,
    },
];

/// Types one column of raw values. Never fails.
pub fn infer_and_convert(cells: &[Cell]) -> InferenceOutcome {
    let candidate = Candidate::new(cells);
    CASCADE
        .iter()
        .filter(|rule| (rule.applies)(&candidate))
        .find_map(|rule| (rule.convert)(cells))
        .unwrap_or_else(|| stringify(cells))
}

fn probe_numeric(cells: &[Cell]) -> NumericProbe {
    let mut whole = true;
    for cell in cells.iter().filter(|cell| !cell.is_missing()) {
        if cell.to_f64().is_none() {
            return NumericProbe::NonNumeric;
        }
        whole &= cell.to_i64().is_some();
    }
    if whole {
        NumericProbe::Whole
    } else {
        NumericProbe::Fractional
    }
}

fn has_no_values(candidate: &Candidate<'_>) -> bool {
    candidate.cells.is_empty()
}

fn is_whole(candidate: &Candidate<'_>) -> bool {
    candidate.probe == NumericProbe::Whole
}

fn is_fractional(candidate: &Candidate<'_>) -> bool {
    candidate.probe == NumericProbe::Fractional
}

fn is_non_numeric(candidate: &Candidate<'_>) -> bool {
    candidate.probe == NumericProbe::NonNumeric
}

fn always(_: &Candidate<'_>) -> bool {
    true
}

fn keep_empty(_: &[Cell]) -> Option<InferenceOutcome> {
    Some(InferenceOutcome {
        column: TypedColumn::String(Vec::new()),
        step: CascadeStep::Empty,
    })
}

fn to_nullable_integer(cells: &[Cell]) -> Option<InferenceOutcome> {
    let values = cells
        .iter()
        .map(|cell| if cell.is_missing() { None } else { cell.to_i64() })
        .collect();
    Some(InferenceOutcome {
        column: TypedColumn::Integer(values),
        step: CascadeStep::Integer,
    })
}

fn to_float(cells: &[Cell]) -> Option<InferenceOutcome> {
    let values = cells
        .iter()
        .map(|cell| {
            if cell.is_missing() {
                f64::NAN
            } else {
                cell.to_f64().unwrap_or(f64::NAN)
            }
        })
        .collect();
    Some(InferenceOutcome {
        column: TypedColumn::Float(values),
        step: CascadeStep::Float,
    })
}

fn to_timestamp(cells: &[Cell]) -> Option<InferenceOutcome> {
    let timestamp = |values, step| InferenceOutcome {
        column: TypedColumn::Timestamp(values),
        step,
    };
    if let Some(values) = parse_detected_layout(cells) {
        return Some(timestamp(values, CascadeStep::TimestampAuto));
    }
    for fmt in FIXED_DATE_FORMATS {
        if let Some(values) = parse_all(cells, |text| parse_timestamp_with_format(text, fmt)) {
            return Some(timestamp(values, CascadeStep::TimestampFormat(fmt)));
        }
    }
    let values = cells
        .iter()
        .map(|cell| match cell {
            missing if missing.is_missing() => None,
            Cell::DateTime(dt) => Some(*dt),
            other => parse_timestamp_lenient(&other.as_display()),
        })
        .collect::<Vec<_>>();
    if values.iter().any(Option::is_some) {
        Some(timestamp(values, CascadeStep::TimestampPerValue))
    } else {
        None
    }
}

/// Layout inferred from the first textual value, then required of every value.
fn parse_detected_layout(cells: &[Cell]) -> Option<Vec<Option<NaiveDateTime>>> {
    let first_text = cells.iter().find_map(|cell| match cell {
        Cell::String(text) if cell.is_string() => Some(text.as_str()),
        _ => None,
    });
    let layout = match first_text {
        Some(text) => detect_iso_layout(text)?,
        None => DateLayout::Rfc3339,
    };
    parse_all(cells, |text| layout.parse(text))
}

/// All-or-nothing parse: any present value that does not parse declines.
fn parse_all<F>(cells: &[Cell], parse: F) -> Option<Vec<Option<NaiveDateTime>>>
where
    F: Fn(&str) -> Option<NaiveDateTime>,
{
    cells
        .iter()
        .map(|cell| match cell {
            Cell::Empty => Some(None),
            Cell::String(text) if is_missing_text(text) => Some(None),
            Cell::DateTime(dt) => Some(Some(*dt)),
            Cell::String(text) => parse(text).map(Some),
            Cell::Int(_) | Cell::Float(_) | Cell::Bool(_) => None,
        })
        .collect()
}

fn to_string_column(cells: &[Cell]) -> Option<InferenceOutcome> {
    Some(stringify(cells))
}

fn stringify(cells: &[Cell]) -> InferenceOutcome {
    InferenceOutcome {
        column: TypedColumn::String(cells.iter().map(Cell::as_display).collect()),
        step: CascadeStep::String,
    }
}
