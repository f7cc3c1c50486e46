//! Run reports
//!
//! [`RunReport`] is derived once from the collected outcomes at the end of a
//! run. It is written as `processing_results.json` in the output directory
//! (replacing any previous report) and rendered as a console summary.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::cli::Output;
use crate::config::RunConfiguration;
use crate::executor::ExecutionOutcome;

pub mod json;
pub mod summary;

/// Aggregate over every outcome of a run plus the configuration it ran with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub total_folders: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_duration: f64,
    pub configuration: ConfigurationSnapshot,
    pub results: Vec<ExecutionOutcome>,
    pub timestamp: DateTime<Local>,
}

/// The subset of [`RunConfiguration`] recorded in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationSnapshot {
    pub parallel: bool,
    pub docker: bool,
    pub dry_run: bool,
    pub continue_on_error: bool,
    pub docker_image: Option<String>,
}

impl From<&RunConfiguration> for ConfigurationSnapshot {
    fn from(config: &RunConfiguration) -> Self {
        Self {
            parallel: config.is_parallel(),
            docker: config.uses_container(),
            dry_run: config.dry_run(),
            continue_on_error: config.continue_on_error(),
            docker_image: config.container_image().map(str::to_string),
        }
    }
}

impl RunReport {
    /// `total_units` is the resolved unit count, which exceeds `outcomes.len()` after a fail-fast abort
    pub fn new(outcomes: &[ExecutionOutcome], total_units: usize, config: &RunConfiguration) -> Self {
        let successful = outcomes.iter().filter(|o| o.succeeded).count();
        Self {
            total_folders: total_units,
            successful,
            failed: outcomes.len() - successful,
            total_duration: outcomes.iter().map(|o| o.duration_seconds).sum(),
            configuration: ConfigurationSnapshot::from(config),
            results: outcomes.to_vec(),
            timestamp: Local::now(),
        }
    }

    pub fn failed_units(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|o| o.failed())
            .map(|o| o.unit_name.as_str())
    }
}

/// Where a report was (or, in a dry run, would have been) written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHandle {
    pub path: PathBuf,
    pub written: bool,
}

/// Persists and prints run reports for one configuration
pub struct ResultReporter<'a> {
    config: &'a RunConfiguration,
    output: &'a Output,
}

impl<'a> ResultReporter<'a> {
    pub fn new(config: &'a RunConfiguration, output: &'a Output) -> Self {
        Self { config, output }
    }

    pub fn build(&self, outcomes: &[ExecutionOutcome], total_units: usize) -> RunReport {
        RunReport::new(outcomes, total_units, self.config)
    }

    /// Write the report into the output directory; dry runs only log the target path.
    pub fn persist(&self, report: &RunReport) -> anyhow::Result<ReportHandle> {
        let path = self.config.report_path();

        if self.config.dry_run() {
            self.output
                .info(&format!("DRY RUN: Would save results to {}", path.display()));
            return Ok(ReportHandle {
                path,
                written: false,
            });
        }

        json::write_report(report, &path)?;
        self.output
            .info(&format!("Results saved to {}", path.display()));
        Ok(ReportHandle {
            path,
            written: true,
        })
    }

    pub fn summarize(&self, report: &RunReport) {
        summary::print_summary(self.output, report);
    }
}
