//! Engine-independent error records and validation results

use serde::{Deserialize, Serialize};

/// Discriminator written as `"type"` on every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Error,
}

/// Where in the source a violation was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorLocation {
    /// Tabular input: 1-based data row (header excluded) and column.
    Row { line: usize, column_name: String },
    /// Structured input: dot-joined path of keys and indices.
    KeyPath { key_path: String },
}

impl ErrorLocation {
    pub fn key_path(&self) -> Option<&str> {
        match self {
            ErrorLocation::KeyPath { key_path } => Some(key_path),
            ErrorLocation::Row { .. } => None,
        }
    }

    pub fn row(&self) -> Option<(usize, &str)> {
        match self {
            ErrorLocation::Row { line, column_name } => Some((*line, column_name)),
            ErrorLocation::KeyPath { .. } => None,
        }
    }
}

impl std::fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorLocation::KeyPath { key_path } if key_path.is_empty() => write!(f, "(root)"),
            ErrorLocation::KeyPath { key_path } => write!(f, "{key_path}"),
            ErrorLocation::Row { line, column_name } => {
                write!(f, "line {line}, column '{column_name}'")
            }
        }
    }
}

/// A normalized validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Name of the violated rule, e.g. `type`, `required`, `maxLength`
    pub code: String,
    pub location: ErrorLocation,
    /// The offending value, stringified
    pub value: String,
    /// The violated schema fragment, stringified
    pub expected: String,
    pub message: String,
}

/// Outcome of validating one document.
///
/// Only constructible from a list of errors, so `valid` is always
/// `errors.is_empty()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<ErrorRecord>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ErrorRecord>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn valid() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ErrorRecord> {
        self.errors
    }
}

impl FromIterator<ErrorRecord> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ErrorRecord>>(iter: I) -> Self {
        Self::from_errors(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(location: ErrorLocation) -> ErrorRecord {
        ErrorRecord {
            kind: RecordKind::Error,
            code: "type".to_string(),
            location,
            value: "thirty".to_string(),
            expected: r#"{"type":"integer"}"#.to_string(),
            message: r#""thirty" is not of type "integer""#.to_string(),
        }
    }

    #[test]
    fn test_result_validity_follows_errors() {
        assert!(ValidationResult::valid().is_valid());
        assert!(ValidationResult::from_errors(vec![]).is_valid());

        let result = ValidationResult::from_errors(vec![record(ErrorLocation::KeyPath {
            key_path: "age".to_string(),
        })]);
        assert!(!result.is_valid());
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn test_key_path_record_serialization() {
        let value = serde_json::to_value(record(ErrorLocation::KeyPath {
            key_path: "subject.age".to_string(),
        }))
        .unwrap();

        assert_eq!(
            value,
            json!({
                "type": "error",
                "code": "type",
                "location": {"key_path": "subject.age"},
                "value": "thirty",
                "expected": "{\"type\":\"integer\"}",
                "message": "\"thirty\" is not of type \"integer\"",
            })
        );
    }

    #[test]
    fn test_row_location_serialization() {
        let value = serde_json::to_value(ErrorLocation::Row {
            line: 2,
            column_name: "age".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"line": 2, "column_name": "age"}));
    }

    #[test]
    fn test_error_records_deserialize_both_locations() {
        let records: Vec<ErrorRecord> = serde_json::from_value(json!([
            {"type": "error", "code": "required", "location": {"line": 3, "column_name": "age"},
             "value": "{}", "expected": "{}", "message": "\"age\" is a required property"},
            {"type": "error", "code": "type", "location": {"key_path": ""},
             "value": "1", "expected": "{}", "message": "1 is not of type \"object\""}
        ]))
        .unwrap();

        assert_eq!(records[0].location.row(), Some((3, "age")));
        assert_eq!(records[1].location.key_path(), Some(""));
        assert_eq!(records[1].location.to_string(), "(root)");
    }
}
