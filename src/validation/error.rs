use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the schema itself. No validator is produced.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    #[error("Failed to read schema file {path:?}")]
    #[diagnostic(code(file_validator::schema::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema {path:?} as JSON")]
    #[diagnostic(
        code(file_validator::schema::parse),
        help("The validation schema must be a JSON document")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to compile schema: {0}")]
    #[diagnostic(
        code(file_validator::schema::compile),
        help("Check the schema against the JSON Schema draft-07 meta-schema")
    )]
    Compile(String),

    #[error("Column '{column}' declares multiple types ({}), cannot coerce tabular values", .types.join(", "))]
    #[diagnostic(
        code(file_validator::schema::ambiguous_column),
        help("Give each property used for CSV validation exactly one scalar `type`")
    )]
    AmbiguousColumnType { column: String, types: Vec<String> },
}

/// The input's shape does not fit the selected adapter.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum RecordTypeError {
    #[error("Expected a JSON object to validate, found {found}")]
    #[diagnostic(code(file_validator::record::not_a_record))]
    NotARecord { found: &'static str },

    #[error("Expected a list of rows for tabular validation, found {found}")]
    #[diagnostic(code(file_validator::record::not_a_row_set))]
    NotARowSet { found: &'static str },

    #[error("Row {line} is not an object of column values (found {found})")]
    #[diagnostic(code(file_validator::record::row_not_a_record))]
    RowNotARecord { line: usize, found: &'static str },
}

/// Human name of a JSON value's kind, used in shape errors.
pub(crate) fn kind_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
