//! Coercion of raw tabular cells into the types a schema declares
//!
//! Values that cannot be coerced are passed through unchanged. Schema
//! validation then reports them as ordinary `type` violations, so a bad cell
//! is reported the same way as any other data error.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::error::SchemaError;

/// A record: field name to value
pub type Record = Map<String, Value>;

/// Scalar column types usable as coercion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Number,
    Integer,
    Boolean,
}

impl ColumnType {
    /// Map a schema `type` name; anything unsupported falls back to `String`.
    pub fn from_schema_type(name: &str) -> Self {
        match name {
            "number" => ColumnType::Number,
            "integer" => ColumnType::Integer,
            "boolean" => ColumnType::Boolean,
            _ => ColumnType::String,
        }
    }
}

/// Coerce one raw cell to `target`, or return it unchanged as a string.
pub fn coerce(value: &str, target: ColumnType) -> Value {
    match target {
        ColumnType::String => Value::String(value.to_string()),
        ColumnType::Integer => parse_integer(value),
        ColumnType::Number => parse_number(value),
        ColumnType::Boolean => parse_boolean(value),
    }
}

/// Exact integer parse, widening to `u64` past the `i64` range
fn parse_exact(trimmed: &str) -> Option<Number> {
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(i.into());
    }
    trimmed.parse::<u64>().ok().map(Number::from)
}

fn parse_float(trimmed: &str) -> Option<Number> {
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

// Whole floats such as "30.0" or "1e20" are integers to draft-07 as well.
fn parse_integer(value: &str) -> Value {
    let trimmed = value.trim();
    parse_exact(trimmed)
        .or_else(|| parse_float(trimmed).filter(|n| n.as_f64().is_some_and(|f| f.fract() == 0.0)))
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

fn parse_number(value: &str) -> Value {
    let trimmed = value.trim();
    parse_exact(trimmed)
        .or_else(|| parse_float(trimmed))
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

fn parse_boolean(value: &str) -> Value {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Value::Bool(true),
        "false" | "0" => Value::Bool(false),
        _ => Value::String(value.to_string()),
    }
}

/// Target type of every column the schema declares at top level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypeMap {
    columns: BTreeMap<String, ColumnType>,
}

impl ColumnTypeMap {
    /// Build the map from the schema's top-level `properties`.
    ///
    /// A property whose `type` lists several alternatives has no single
    /// coercion target and is rejected.
    pub fn from_schema(schema: &Value) -> Result<Self, SchemaError> {
        let mut columns = BTreeMap::new();

        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            debug!("Schema declares no top-level properties, all columns stay strings");
            return Ok(Self { columns });
        };

        for (column, property) in properties {
            let property = resolve_ref(schema, property);
            let column_type = match property.get("type") {
                Some(Value::String(name)) => column_type_for(column, name),
                Some(Value::Array(types)) => match types.as_slice() {
                    [Value::String(name)] => column_type_for(column, name),
                    _ => {
                        return Err(SchemaError::AmbiguousColumnType {
                            column: column.clone(),
                            types: types
                                .iter()
                                .map(|t| t.as_str().map(str::to_string).unwrap_or_else(|| t.to_string()))
                                .collect(),
                        });
                    }
                },
                _ => ColumnType::String,
            };
            columns.insert(column.clone(), column_type);
        }

        Ok(Self { columns })
    }

    pub fn get(&self, column: &str) -> Option<ColumnType> {
        self.columns.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Coerce every string cell of `row`. Unknown columns and non-string
    /// cells are kept as they are.
    pub fn coerce_row(&self, row: &Record) -> Record {
        row.iter()
            .map(|(column, value)| {
                let coerced = match (value, self.get(column)) {
                    (Value::String(raw), Some(target)) => coerce(raw, target),
                    _ => value.clone(),
                };
                (column.clone(), coerced)
            })
            .collect()
    }
}

fn column_type_for(column: &str, name: &str) -> ColumnType {
    if matches!(name, "array" | "object" | "null") {
        warn!("Column '{column}' has unsupported tabular type '{name}', validating it as a string");
    }
    ColumnType::from_schema_type(name)
}

/// Follow one level of local `$ref`
fn resolve_ref<'s>(root: &'s Value, property: &'s Value) -> &'s Value {
    property
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|reference| reference.strip_prefix('#'))
        .and_then(|pointer| root.pointer(pointer))
        .unwrap_or(property)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_is_identity() {
        assert_eq!(coerce(" 42 ", ColumnType::String), json!(" 42 "));
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(coerce("42", ColumnType::Integer), json!(42));
        assert_eq!(coerce(" -7 ", ColumnType::Integer), json!(-7));
        assert_eq!(coerce("thirty", ColumnType::Integer), json!("thirty"));
        assert_eq!(coerce("4.5", ColumnType::Integer), json!("4.5"));
        assert_eq!(coerce("", ColumnType::Integer), json!(""));
        assert_eq!(coerce("inf", ColumnType::Integer), json!("inf"));
    }

    #[test]
    fn test_integer_coercion_beyond_i64_and_whole_floats() {
        assert_eq!(
            coerce("18446744073709551615", ColumnType::Integer),
            json!(18446744073709551615u64)
        );
        assert_eq!(coerce("30.0", ColumnType::Integer), json!(30.0));
        assert_eq!(coerce(" -2.000 ", ColumnType::Integer), json!(-2.0));
        assert_eq!(coerce("1e3", ColumnType::Integer), json!(1000.0));
        assert_eq!(
            coerce("18446744073709551615", ColumnType::Number),
            json!(18446744073709551615u64)
        );
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(coerce("42", ColumnType::Number), json!(42));
        assert_eq!(coerce("4.5", ColumnType::Number), json!(4.5));
        assert_eq!(coerce("1e3", ColumnType::Number), json!(1000.0));
        assert_eq!(coerce("abc", ColumnType::Number), json!("abc"));
        assert_eq!(coerce("NaN", ColumnType::Number), json!("NaN"));
    }

    #[test]
    fn test_boolean_vocabulary() {
        for raw in ["true", "True", "TRUE", "1"] {
            assert_eq!(coerce(raw, ColumnType::Boolean), json!(true), "{raw}");
        }
        for raw in ["false", "False", "0"] {
            assert_eq!(coerce(raw, ColumnType::Boolean), json!(false), "{raw}");
        }
        assert_eq!(coerce("maybe", ColumnType::Boolean), json!("maybe"));
    }

    #[test]
    fn test_unsupported_types_fall_back_to_string() {
        assert_eq!(ColumnType::from_schema_type("array"), ColumnType::String);
        assert_eq!(ColumnType::from_schema_type("null"), ColumnType::String);
        assert_eq!(ColumnType::from_schema_type("geometry"), ColumnType::String);
    }

    #[test]
    fn test_column_map_from_schema() {
        let map = ColumnTypeMap::from_schema(&json!({
            "definitions": {"flag": {"type": "boolean"}},
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer"},
                "weight": {"type": "number"},
                "active": {"$ref": "#/definitions/flag"},
                "notes": {"description": "no type"},
                "single": {"type": ["integer"]}
            }
        }))
        .unwrap();

        assert_eq!(map.len(), 6);
        assert_eq!(map.get("name"), Some(ColumnType::String));
        assert_eq!(map.get("age"), Some(ColumnType::Integer));
        assert_eq!(map.get("weight"), Some(ColumnType::Number));
        assert_eq!(map.get("active"), Some(ColumnType::Boolean));
        assert_eq!(map.get("notes"), Some(ColumnType::String));
        assert_eq!(map.get("single"), Some(ColumnType::Integer));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_column_map_rejects_multiple_types() {
        let err = ColumnTypeMap::from_schema(&json!({
            "properties": {"age": {"type": ["string", "integer"]}}
        }))
        .unwrap_err();

        match err {
            SchemaError::AmbiguousColumnType { column, types } => {
                assert_eq!(column, "age");
                assert_eq!(types, vec!["string", "integer"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_column_map_without_properties_is_empty() {
        let map = ColumnTypeMap::from_schema(&json!({"type": "object"})).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_coerce_row() {
        let map = ColumnTypeMap::from_schema(&json!({
            "properties": {"age": {"type": "integer"}, "ok": {"type": "boolean"}}
        }))
        .unwrap();

        let row: Record = serde_json::from_value(json!({
            "age": "30", "ok": "maybe", "extra": "7", "already": 1
        }))
        .unwrap();

        assert_eq!(
            Value::Object(map.coerce_row(&row)),
            json!({"age": 30, "ok": "maybe", "extra": "7", "already": 1})
        );
    }
}
