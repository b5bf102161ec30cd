//! Canonical, SQL-safe column identifiers.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

static NON_IDENTIFIER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9]+").expect("static pattern compiles"));

/// Maps a raw header label to a lowercase identifier made of `[a-z0-9_]`.
///
/// Runs of any other character collapse into a single `_`, leading and
/// trailing underscores are stripped, and a name that would start with a
/// digit gets a `col_` prefix. Input that contains no letters or digits
/// normalizes to the empty string; callers decide what to do with that.
pub fn normalize_column_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let collapsed = NON_IDENTIFIER_RUN.replace_all(&lowered, "_");
    let trimmed = collapsed.trim_matches('_');
    match trimmed.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("col_{trimmed}"),
        _ => trimmed.to_string(),
    }
}

/// Names that occur more than once, each listed once in order of first repeat.
pub fn duplicate_names(names: &[String]) -> Vec<String> {
    names.iter().duplicates().cloned().collect()
}
