use jsonschema::error::ValidationErrorKind;
use serde_json::Value;
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;

use super::error::{RecordTypeError, SchemaError, kind_name};
use super::normalizer;
use super::report::ValidationResult;

// Validate with JSON Schema draft-07, whatever `$schema` the document declares
use jsonschema::draft7 as schema_draft;

/// One violation copied out of the engine's error type.
///
/// Owns everything it carries so that nothing downstream borrows from the
/// compiled validator or the instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// Name of the failing rule, the last segment of the schema path
    pub keyword: String,
    /// Keys and indices leading to the offending value
    pub instance_path: Vec<String>,
    /// JSON pointer into the schema, ending with the keyword
    pub schema_path: String,
    /// The offending value
    pub instance: Value,
    /// The (sub)schema holding the violated keyword, when it can be resolved
    pub schema: Option<Value>,
    pub message: String,
}

impl SchemaViolation {
    fn from_engine(error: &jsonschema::ValidationError<'_>, root: &Value) -> Self {
        let schema_path = error.schema_path.to_string();
        let schema_segments = split_pointer(&schema_path);
        let keyword = schema_segments.last().cloned().unwrap_or_default();

        let mut instance_path = split_pointer(&error.instance_path.to_string());
        if let Some(property) = Self::refine_property(&error.kind) {
            instance_path.push(property);
        }

        let parent_segments = &schema_segments[..schema_segments.len().saturating_sub(1)];
        let schema = resolve_fragment(root, parent_segments).cloned();

        Self {
            keyword,
            instance_path,
            schema_path,
            instance: error.instance.clone().into_owned(),
            schema,
            message: error.to_string(),
        }
    }

    /// Property a location should point at for object-level errors
    fn refine_property(kind: &ValidationErrorKind) -> Option<String> {
        match kind {
            ValidationErrorKind::Required { property } => Some(match property {
                Value::String(name) => name.clone(),
                other => other.to_string(),
            }),
            ValidationErrorKind::AdditionalProperties { unexpected } => unexpected.first().cloned(),
            _ => None,
        }
    }

    fn sort_key(&self) -> Vec<PathSegment<'_>> {
        self.instance_path
            .iter()
            .map(|segment| match segment.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(segment),
            })
            .collect()
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PathSegment<'a> {
    Index(usize),
    Key(&'a str),
}

/// Sort violations by instance path, then schema path.
pub(crate) fn sort_violations(violations: &mut [SchemaViolation]) {
    violations.sort_by(|a, b| match a.sort_key().cmp(&b.sort_key()) {
        Ordering::Equal => a.schema_path.cmp(&b.schema_path),
        other => other,
    });
}

/// Split a JSON pointer into unescaped segments
fn split_pointer(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .trim_start_matches('/')
        .split('/')
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Walk a schema path through the schema document, following local `$ref`s
fn resolve_fragment<'s>(root: &'s Value, segments: &[String]) -> Option<&'s Value> {
    let mut node = root;
    for segment in segments {
        node = if segment == "$ref" {
            let reference = node.get("$ref")?.as_str()?;
            root.pointer(reference.strip_prefix('#')?)?
        } else {
            match node {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            }
        };
    }
    Some(node)
}

/// Compiled draft-07 validator for a single schema.
pub struct JsonValidator {
    schema: Value,
    validator: jsonschema::Validator,
}

impl JsonValidator {
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        let validator = schema_draft::options()
            .build(&schema)
            .map_err(|e| SchemaError::Compile(e.to_string()))?;
        debug!("Compiled validation schema");

        Ok(Self { schema, validator })
    }

    pub fn from_file(schema_path: &Path) -> Result<Self, SchemaError> {
        let schema = crate::loader::load_schema(schema_path)?;
        Self::new(schema)
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Collect every violation of `instance`, sorted by location.
    pub fn violations(&self, instance: &Value) -> Vec<SchemaViolation> {
        let mut violations: Vec<SchemaViolation> = self
            .validator
            .iter_errors(instance)
            .map(|error| SchemaViolation::from_engine(&error, &self.schema))
            .collect();
        sort_violations(&mut violations);

        debug!("Found {} schema violation(s)", violations.len());
        violations
    }

    /// Validate any JSON value, reporting locations as key paths.
    pub fn validate(&self, instance: &Value) -> ValidationResult {
        ValidationResult::from_errors(normalizer::normalize(self.violations(instance)))
    }

    /// Validate a single record; the input must be a JSON object.
    pub fn validate_record(&self, record: &Value) -> Result<ValidationResult, RecordTypeError> {
        if !record.is_object() {
            return Err(RecordTypeError::NotARecord {
                found: kind_name(record),
            });
        }
        Ok(self.validate(record))
    }
}
