//! JSON persistence for run reports

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::RunReport;
use crate::error::RunError;

/// Serialize `report` to `path`, creating parent directories and replacing any existing file
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write results file: {}", path.display()))?;

    Ok(())
}

impl RunReport {
    /// Re-read a persisted report
    pub fn load(path: &Path) -> Result<Self, RunError> {
        let content = fs::read_to_string(path).map_err(|e| RunError::UnreadableReport {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        serde_json::from_str(&content).map_err(|e| RunError::UnreadableReport {
            path: path.to_path_buf(),
            source: Box::new(e),
        })
    }
}
