//! Raw cell model and the parsing primitives shared by header detection and
//! type inference.
//!
//! A [`Cell`] is an untyped spreadsheet value as the workbook reader hands it
//! over. Nothing here decides a column type; the helpers only answer narrow
//! questions ("does this cell have a numeric reading?", "does this text match
//! that date layout?") with `Option` so callers can chain them without
//! treating a failed parse as an error.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Text a missing cell renders as when a column falls back to strings.
pub const MISSING_TEXT: &str = "nan";

/// Rendering used for timestamps in every textual output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Exact layouts tried one at a time when automatic date detection fails.
pub const FIXED_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%m-%d-%Y", "%d-%m-%Y",
];

const ISO_PATTERNS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const LENIENT_PATTERNS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y",
    "%d/%m/%Y %H:%M:%S",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y.%m.%d",
    "%Y%m%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%A, %B %d, %Y",
    "%a, %d %b %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
];

/// An untyped cell value read from one sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Blank cells and text that only stands in for a value (see
    /// [`is_missing_text`]).
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::String(s) => is_missing_text(s),
            _ => false,
        }
    }

    /// Text that carries a value; placeholders do not count.
    pub fn is_string(&self) -> bool {
        matches!(self, Cell::String(s) if !is_missing_text(s))
    }

    /// Numeric reading of the cell, if it has one.
    ///
    /// Strings are trimmed and parsed as floating point (so `"nan"`, `"inf"`
    /// and exponents are accepted), booleans read as `1`/`0`, and timestamps
    /// have no numeric reading.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::String(s) => s.trim().parse::<f64>().ok(),
            Cell::Empty | Cell::DateTime(_) => None,
        }
    }

    /// Exact whole-number reading of the cell, if it has one.
    ///
    /// Integer text is parsed as `i64` directly so values beyond 2^53 keep
    /// every digit; anything else goes through [`Cell::to_f64`].
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            Cell::String(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| self.to_f64().and_then(integral_i64)),
            _ => self.to_f64().and_then(integral_i64),
        }
    }

    /// Text form used for header labels and for the string fallback.
    pub fn as_display(&self) -> String {
        match self {
            Cell::Empty => MISSING_TEXT.to_string(),
            Cell::String(s) if is_missing_text(s) => MISSING_TEXT.to_string(),
            Cell::String(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => format_float_text(*f),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::DateTime(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::String(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::DateTime(value)
    }
}

/// Whether `text` stands for a missing value: blank, whitespace, or one of
/// the usual placeholder tokens (`N/A`, `NA`, `null`, `None`, `nan`, `#N/A`).
pub fn is_missing_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || is_placeholder_token(&trimmed.to_ascii_lowercase())
}

fn is_placeholder_token(lowered: &str) -> bool {
    let stripped = lowered.trim_start_matches('#');
    matches!(
        stripped,
        "na" | "n/a" | "n/a n/a" | "n.a." | "nan" | "-nan" | "<na>" | "null" | "none"
    )
}

fn format_float_text(value: f64) -> String {
    if value.is_nan() {
        MISSING_TEXT.to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Whether `value` is finite, has no fractional part, and fits in an `i64`.
pub fn integral_i64(value: f64) -> Option<i64> {
    const LOWER: f64 = i64::MIN as f64;
    const UPPER: f64 = i64::MAX as f64;
    if value.is_finite() && value.fract() == 0.0 && (LOWER..UPPER).contains(&value) {
        Some(value as i64)
    } else {
        None
    }
}

/// A date layout recognised by automatic detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    Rfc3339,
    Pattern(&'static str),
}

impl DateLayout {
    pub fn parse(self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        match self {
            DateLayout::Rfc3339 => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.naive_utc()),
            DateLayout::Pattern(fmt) => parse_timestamp_with_format(text, fmt),
        }
    }
}

/// Picks the ISO-style layout `text` is written in.
pub fn detect_iso_layout(text: &str) -> Option<DateLayout> {
    ISO_PATTERNS
        .iter()
        .map(|fmt| DateLayout::Pattern(fmt))
        .chain(std::iter::once(DateLayout::Rfc3339))
        .find(|layout| layout.parse(text).is_some())
}

/// Parses `text` with exactly `fmt`; date-only layouts land on midnight.
pub fn parse_timestamp_with_format(text: &str, fmt: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, fmt).ok().or_else(|| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

/// Best-effort parse of a single value against every layout this crate knows.
///
/// Only complete layouts match: partial input such as `"7"` or `"March"` is
/// never completed from the current date, so the result does not depend on
/// when the run happens.
pub fn parse_timestamp_lenient(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.naive_utc());
    }
    LENIENT_PATTERNS
        .iter()
        .find_map(|fmt| parse_timestamp_with_format(text, fmt))
}
