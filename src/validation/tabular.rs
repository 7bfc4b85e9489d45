use serde_json::Value;
use std::path::Path;
use tracing::debug;

use super::coercion::{ColumnTypeMap, Record};
use super::error::{RecordTypeError, SchemaError, kind_name};
use super::normalizer;
use super::report::{ErrorRecord, ValidationResult};
use super::validator::JsonValidator;

/// Validates row sets (e.g. CSV) one row at a time.
///
/// Each row is coerced with the schema's column types, validated on its own,
/// and its errors are located by line and column.
pub struct TabularValidator {
    columns: ColumnTypeMap,
    validator: JsonValidator,
}

impl TabularValidator {
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        let columns = ColumnTypeMap::from_schema(&schema)?;
        let validator = JsonValidator::new(schema)?;
        debug!("Derived coercion types for {} column(s)", columns.len());

        Ok(Self { columns, validator })
    }

    pub fn from_file(schema_path: &Path) -> Result<Self, SchemaError> {
        let schema = crate::loader::load_schema(schema_path)?;
        Self::new(schema)
    }

    pub fn columns(&self) -> &ColumnTypeMap {
        &self.columns
    }

    /// Validate one row; `line` is its 1-based position, header excluded.
    pub fn validate_row(&self, row: &Record, line: usize) -> Vec<ErrorRecord> {
        let coerced = Value::Object(self.columns.coerce_row(row));
        normalizer::normalize_row(self.validator.violations(&coerced), line)
    }

    /// Validate rows in order and concatenate their errors.
    pub fn validate_rows(&self, rows: &[Record]) -> ValidationResult {
        let mut errors = Vec::new();
        let mut failed_rows = 0;

        for (index, row) in rows.iter().enumerate() {
            let row_errors = self.validate_row(row, index + 1);
            if !row_errors.is_empty() {
                failed_rows += 1;
                errors.extend(row_errors);
            }
        }

        debug!(
            "Validated {} row(s), {failed_rows} with errors",
            rows.len()
        );
        ValidationResult::from_errors(errors)
    }

    /// Validate a JSON array of row objects.
    pub fn validate_value(&self, rows: &Value) -> Result<ValidationResult, RecordTypeError> {
        let items = rows.as_array().ok_or(RecordTypeError::NotARowSet {
            found: kind_name(rows),
        })?;

        let records = items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(row) => Ok(row.clone()),
                other => Err(RecordTypeError::RowNotARecord {
                    line: index + 1,
                    found: kind_name(other),
                }),
            })
            .collect::<Result<Vec<Record>, _>>()?;

        Ok(self.validate_rows(&records))
    }
}
