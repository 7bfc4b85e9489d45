//! Turns engine violations into stable [`ErrorRecord`]s

use serde_json::Value;

use super::report::{ErrorLocation, ErrorRecord, RecordKind};
use super::validator::SchemaViolation;

/// Normalize violations of a structured document, locating each by key path.
pub fn normalize(violations: Vec<SchemaViolation>) -> Vec<ErrorRecord> {
    normalize_with(violations, |path| ErrorLocation::KeyPath {
        key_path: path.join("."),
    })
}

/// Normalize violations of one tabular row; `line` is 1-based.
pub fn normalize_row(violations: Vec<SchemaViolation>, line: usize) -> Vec<ErrorRecord> {
    normalize_with(violations, |path| ErrorLocation::Row {
        line,
        column_name: path.last().cloned().unwrap_or_default(),
    })
}

fn normalize_with<F>(violations: Vec<SchemaViolation>, locate: F) -> Vec<ErrorRecord>
where
    F: Fn(&[String]) -> ErrorLocation,
{
    violations
        .into_iter()
        .map(|violation| ErrorRecord {
            kind: RecordKind::Error,
            location: locate(&violation.instance_path),
            value: stringify(&violation.instance),
            expected: violation.schema.as_ref().map(stringify).unwrap_or_default(),
            code: violation.keyword,
            message: violation.message,
        })
        .collect()
}

/// Strings are reported verbatim, everything else as compact JSON
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
