//! Loads schemas and the documents to validate

mod container;

use miette::Diagnostic;
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::validation::{Record, SchemaError};

pub use container::{ContainerHierarchy, ContainerLevel, PARENT_INCLUDE};

#[derive(Error, Debug, Diagnostic)]
pub enum LoaderError {
    #[error("File type '{0}' is not supported")]
    #[diagnostic(
        code(file_validator::loader::unsupported_extension),
        help("Supported extensions are .json, .yaml, .yml and .csv")
    )]
    UnsupportedExtension(String),

    #[error("Mimetype '{0}' is not supported")]
    #[diagnostic(code(file_validator::loader::unsupported_mimetype))]
    UnsupportedMimetype(String),

    #[error("Cannot determine the file type of {0:?}")]
    #[diagnostic(
        code(file_validator::loader::undetermined),
        help("Give the file an extension, or pass --file-type or --mimetype")
    )]
    Undetermined(PathBuf),

    #[error("Failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from {path:?}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YAML from {path:?}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to read CSV row {line}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid container hierarchy: {0}")]
    #[diagnostic(code(file_validator::loader::invalid_hierarchy))]
    InvalidHierarchy(String),
}

/// Kind of input, which decides both the loader and the validation adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FileType {
    Json,
    Yaml,
    Csv,
    /// A container hierarchy dump, validated as flattened metadata
    Metadata,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::Json => "json",
            FileType::Yaml => "yaml",
            FileType::Csv => "csv",
            FileType::Metadata => "metadata",
        };
        write!(f, "{name}")
    }
}

impl FileType {
    /// Identify a file type from an extension, with or without the dot.
    pub fn from_extension(extension: &str) -> Result<Self, LoaderError> {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "json" => Ok(FileType::Json),
            "yaml" | "yml" => Ok(FileType::Yaml),
            "csv" => Ok(FileType::Csv),
            _ => Err(LoaderError::UnsupportedExtension(format!(".{normalized}"))),
        }
    }

    pub fn from_mimetype(mimetype: &str) -> Result<Self, LoaderError> {
        match mimetype.trim().to_ascii_lowercase().as_str() {
            "application/json" => Ok(FileType::Json),
            "application/x-yaml" | "application/yaml" | "text/yaml" => Ok(FileType::Yaml),
            "text/csv" => Ok(FileType::Csv),
            _ => Err(LoaderError::UnsupportedMimetype(mimetype.to_string())),
        }
    }

    /// The extension wins; the mimetype is only consulted when there is none.
    pub fn identify(path: &Path, mimetype: Option<&str>) -> Result<Self, LoaderError> {
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            return Self::from_extension(extension);
        }
        match mimetype {
            Some(mimetype) => Self::from_mimetype(mimetype),
            None => Err(LoaderError::Undetermined(path.to_path_buf())),
        }
    }
}

/// A loaded input, shaped for one of the validation adapters.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Record(Value),
    Rows(Vec<Record>),
}

/// Read and parse a JSON schema file.
pub fn load_schema(path: &Path) -> Result<Value, SchemaError> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SchemaError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub struct DocumentLoader {
    file_type: FileType,
    add_parents: bool,
}

impl DocumentLoader {
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            add_parents: true,
        }
    }

    /// Keep parent containers when flattening metadata (default: true)
    pub fn with_parents(mut self, add_parents: bool) -> Self {
        self.add_parents = add_parents;
        self
    }

    pub fn load(&self, path: &Path) -> Result<Document, LoaderError> {
        debug!("Loading {} document from {path:?}", self.file_type);
        let content = std::fs::read_to_string(path).map_err(|source| LoaderError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match self.file_type {
            FileType::Json => serde_json::from_str(&content)
                .map(Document::Record)
                .map_err(|source| LoaderError::Json {
                    path: path.to_path_buf(),
                    source,
                }),
            FileType::Yaml => serde_yaml::from_str(&content)
                .map(Document::Record)
                .map_err(|source| LoaderError::Yaml {
                    path: path.to_path_buf(),
                    source,
                }),
            FileType::Csv => read_csv(content.as_bytes()).map(Document::Rows),
            FileType::Metadata => parse_hierarchy(&content, path)?
                .to_record(self.add_parents)
                .map(|record| Document::Record(Value::Object(record))),
        }
    }
}

/// Read a container hierarchy dump without flattening it.
pub fn load_hierarchy(path: &Path) -> Result<ContainerHierarchy, LoaderError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoaderError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_hierarchy(&content, path)
}

fn parse_hierarchy(content: &str, path: &Path) -> Result<ContainerHierarchy, LoaderError> {
    serde_json::from_str(content).map_err(|source| LoaderError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read CSV rows keyed by header. Every cell stays a string; a short row
/// simply lacks its trailing columns.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Record>, LoaderError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|source| LoaderError::Csv { line: 0, source })?
        .clone();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|source| LoaderError::Csv {
            line: index + 1,
            source,
        })?;
        let row: Record = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(row);
    }

    debug!("Read {} CSV row(s) with {} column(s)", rows.len(), headers.len());
    Ok(rows)
}
