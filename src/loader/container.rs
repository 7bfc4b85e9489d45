//! Metadata harvested from a container hierarchy
//!
//! The hierarchy is fetched by an external loader and handed over fully
//! populated; nothing here talks to the remote system.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::LoaderError;
use crate::validation::Record;

/// Container fields kept when flattening metadata for validation.
pub const PARENT_INCLUDE: &[&str] = &[
    // General
    "label",
    "info",
    "uid",
    // Session
    "age",
    "weight",
    // Subject
    "sex",
    "cohort",
    "mlset",
    "ethnicity",
    "species",
    "strain",
    "code",
    "firstname",
    "lastname",
];

/// Levels of the hierarchy, in top-down order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ContainerLevel {
    Group,
    Project,
    Subject,
    Session,
    Acquisition,
    Analysis,
    File,
}

impl ContainerLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerLevel::Group => "group",
            ContainerLevel::Project => "project",
            ContainerLevel::Subject => "subject",
            ContainerLevel::Session => "session",
            ContainerLevel::Acquisition => "acquisition",
            ContainerLevel::Analysis => "analysis",
            ContainerLevel::File => "file",
        }
    }
}

impl fmt::Display for ContainerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(ContainerLevel::Group),
            "project" => Ok(ContainerLevel::Project),
            "subject" => Ok(ContainerLevel::Subject),
            "session" => Ok(ContainerLevel::Session),
            "acquisition" => Ok(ContainerLevel::Acquisition),
            "analysis" => Ok(ContainerLevel::Analysis),
            "file" => Ok(ContainerLevel::File),
            other => Err(format!("Invalid container type '{other}'")),
        }
    }
}

#[derive(Deserialize)]
struct HierarchyDump {
    target: ContainerLevel,
    #[serde(default)]
    containers: BTreeMap<String, Record>,
}

/// A validated container plus whatever parents were fetched for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "HierarchyDump")]
pub struct ContainerHierarchy {
    target: ContainerLevel,
    containers: BTreeMap<ContainerLevel, Record>,
}

impl TryFrom<HierarchyDump> for ContainerHierarchy {
    type Error = String;

    fn try_from(dump: HierarchyDump) -> Result<Self, Self::Error> {
        let containers = dump
            .containers
            .into_iter()
            .map(|(level, record)| Ok::<_, String>((level.parse::<ContainerLevel>()?, record)))
            .collect::<Result<BTreeMap<_, _>, String>>()?;

        Ok(Self {
            target: dump.target,
            containers,
        })
    }
}

impl ContainerHierarchy {
    pub fn new(target: ContainerLevel, record: Record) -> Self {
        Self {
            target,
            containers: BTreeMap::from([(target, record)]),
        }
    }

    pub fn with_parent(mut self, level: ContainerLevel, record: Record) -> Self {
        self.containers.insert(level, record);
        self
    }

    pub fn target(&self) -> ContainerLevel {
        self.target
    }

    /// Flatten to `{level: filtered fields}`; only the target level unless
    /// `add_parents` is set.
    pub fn to_record(&self, add_parents: bool) -> Result<Record, LoaderError> {
        if !self.containers.contains_key(&self.target) {
            return Err(LoaderError::InvalidHierarchy(format!(
                "target container '{}' is missing",
                self.target
            )));
        }

        Ok(self
            .containers
            .iter()
            .filter(|(level, _)| add_parents || **level == self.target)
            .map(|(level, container)| {
                (
                    level.to_string(),
                    Value::Object(filter_container(container)),
                )
            })
            .collect())
    }

    /// `fw://` path of labels down to `up_to` (or the whole hierarchy).
    /// Files are named by `name` rather than `label`.
    pub fn lookup_path(&self, up_to: Option<ContainerLevel>) -> String {
        let mut parts = Vec::new();
        for (level, container) in &self.containers {
            let key = if *level == ContainerLevel::File {
                "name"
            } else {
                "label"
            };
            if let Some(part) = container.get(key).and_then(Value::as_str) {
                parts.push(part.to_string());
            }
            if Some(*level) == up_to {
                break;
            }
        }
        format!("fw://{}", parts.join("/"))
    }
}

fn filter_container(container: &Record) -> Record {
    container
        .iter()
        .filter(|(key, _)| PARENT_INCLUDE.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
