//! Persisting results and deriving the PASS/FAIL tags recorded against the
//! validated source

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::validation::ValidationResult;

/// File the error report is written to inside the output directory
pub const ERROR_REPORT_FILE: &str = "error_report.json";

/// Default prefix for PASS/FAIL tags
pub const DEFAULT_TAG: &str = "file-validator";

/// Write the result's errors as a JSON array; a passing result writes `[]`.
pub fn save_errors(result: &ValidationResult, output_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(ERROR_REPORT_FILE);

    let content = serde_json::to_string_pretty(result.errors())?;
    std::fs::write(&path, content)?;

    info!("Wrote {} error(s) to {path:?}", result.errors().len());
    Ok(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QcState {
    Pass,
    Fail,
}

impl QcState {
    pub fn of(result: &ValidationResult) -> Self {
        if result.is_valid() {
            QcState::Pass
        } else {
            QcState::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QcState::Pass => "PASS",
            QcState::Fail => "FAIL",
        }
    }

    fn opposite(&self) -> Self {
        match self {
            QcState::Pass => QcState::Fail,
            QcState::Fail => QcState::Pass,
        }
    }

    /// `<tag>-PASS` or `<tag>-FAIL`
    pub fn tag(&self, base_tag: &str) -> String {
        format!("{base_tag}-{}", self.as_str())
    }
}

impl fmt::Display for QcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New tag list for a source after validation: the stale opposite tag is
/// dropped and the current state's tag added once.
pub fn tag_update(existing: &[String], base_tag: &str, state: QcState) -> Vec<String> {
    let stale = state.opposite().tag(base_tag);
    let current = state.tag(base_tag);

    let mut tags: Vec<String> = existing.iter().filter(|t| **t != stale).cloned().collect();
    if !tags.contains(&current) {
        tags.push(current);
    }
    tags
}

/// One-line summary, e.g. `PASS` or `FAIL (3 errors)`.
pub fn summary(result: &ValidationResult) -> String {
    match result.errors().len() {
        0 => QcState::Pass.to_string(),
        1 => format!("{} (1 error)", QcState::Fail),
        n => format!("{} ({n} errors)", QcState::Fail),
    }
}
