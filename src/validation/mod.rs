mod coercion;
mod error;
mod normalizer;
mod report;
mod tabular;
mod validator;


use serde_json::Value;
use tracing::debug;

use crate::loader::{Document, FileType};

pub use coercion::{ColumnType, ColumnTypeMap, Record, coerce};
pub use error::{RecordTypeError, SchemaError};
pub use normalizer::{normalize, normalize_row};
pub use report::{ErrorLocation, ErrorRecord, RecordKind, ValidationResult};
pub use tabular::TabularValidator;
pub use validator::{JsonValidator, SchemaViolation};

/// Validator selected for the shape of the input.
pub enum Adapter {
    /// One structured record (JSON, YAML, container metadata)
    Record(JsonValidator),
    /// A row set whose cells need coercion (CSV)
    Tabular(TabularValidator),
}

impl Adapter {
    pub fn for_file_type(file_type: FileType, schema: Value) -> Result<Self, SchemaError> {
        debug!("Using {} adapter for {file_type} input", Self::shape_of(file_type));
        match file_type {
            FileType::Json | FileType::Yaml | FileType::Metadata => {
                Ok(Adapter::Record(JsonValidator::new(schema)?))
            }
            FileType::Csv => Ok(Adapter::Tabular(TabularValidator::new(schema)?)),
        }
    }

    fn shape_of(file_type: FileType) -> &'static str {
        match file_type {
            FileType::Csv => "tabular",
            _ => "record",
        }
    }

    pub fn validate(&self, document: &Document) -> Result<ValidationResult, RecordTypeError> {
        match (self, document) {
            (Adapter::Record(validator), Document::Record(value)) => {
                validator.validate_record(value)
            }
            (Adapter::Tabular(validator), Document::Rows(rows)) => {
                Ok(validator.validate_rows(rows))
            }
            (Adapter::Record(_), Document::Rows(_)) => Err(RecordTypeError::NotARecord {
                found: "a row set",
            }),
            (Adapter::Tabular(validator), Document::Record(value)) => {
                validator.validate_value(value)
            }
        }
    }
}
