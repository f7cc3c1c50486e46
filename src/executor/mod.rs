//! Runs the external engine against one work unit.
//!
//! Every call yields exactly one [`ExecutionOutcome`]. Staging problems, a
//! missing program or a non-zero exit all become failure outcomes; nothing
//! escapes this boundary as an error.

use std::process::Output as ProcessOutput;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::cli::Output;
use crate::config::RunConfiguration;
use crate::units::WorkUnit;

pub mod backend;
pub mod outcome;
pub mod staging;

pub use backend::Invocation;
pub use outcome::ExecutionOutcome;

/// Anything that can turn a work unit into an outcome.
///
/// The orchestrator only depends on this seam, so runs can be driven by a
/// stub in tests.
pub trait UnitRunner: Sync {
    fn run(&self, unit: &WorkUnit) -> ExecutionOutcome;
}

/// Runs the configured engine, locally or in a container
pub struct UnitExecutor<'a> {
    config: &'a RunConfiguration,
    output: &'a Output,
}

impl UnitRunner for UnitExecutor<'_> {
    fn run(&self, unit: &WorkUnit) -> ExecutionOutcome {
        self.execute(unit)
    }
}

impl<'a> UnitExecutor<'a> {
    pub fn new(config: &'a RunConfiguration, output: &'a Output) -> Self {
        Self { config, output }
    }

    pub fn execute(&self, unit: &WorkUnit) -> ExecutionOutcome {
        let name = unit.display_name();
        self.output
            .info(&format!("Processing folder: {}", unit.source_path().display()));

        let started = Instant::now();
        match self.try_execute(unit) {
            Ok(outcome) => outcome,
            Err(e) => {
                let detail = format!("Unexpected error processing {}: {:#}", name, e);
                self.output.error(&detail);
                ExecutionOutcome::failure(name, started.elapsed().as_secs_f64(), detail)
            }
        }
    }

    fn try_execute(&self, unit: &WorkUnit) -> Result<ExecutionOutcome> {
        let name = unit.display_name();
        let unit = self.prepare(unit)?;
        let invocation = Invocation::for_unit(self.config, unit.working_path());

        if self.config.dry_run() {
            self.output.info(&format!(
                "DRY RUN: Would execute engine for {}",
                unit.working_path().display()
            ));
            self.output
                .info(&format!("DRY RUN: {}", invocation.render()));
            return Ok(ExecutionOutcome::success(name, 0.0));
        }

        let program = invocation.resolve_program()?;
        tracing::debug!("{}: resolved {}", name, program.display());

        if self.config.uses_container() {
            self.output.info("Running engine in Docker container...");
        } else {
            self.output.info("Running engine locally...");
        }
        self.output
            .verbose(&format!("Command: {}", invocation.render()));

        let started = Instant::now();
        let result = invocation
            .to_command()
            .output()
            .with_context(|| format!("Failed to launch {}", invocation.render()))?;
        let duration = started.elapsed().as_secs_f64();

        if result.status.success() {
            tracing::trace!("{} stdout:\n{}", name, String::from_utf8_lossy(&result.stdout));
            self.output
                .success(&format!("Completed processing {}", name));
            self.output
                .info(&format!("Processing time for {}: {:.1}s", name, duration));
            Ok(ExecutionOutcome::success(name, duration))
        } else {
            let detail = self.describe_failure(&result);
            self.output.error(&format!("Failed to process {}", name));
            self.output.indent(&detail);
            Ok(ExecutionOutcome::failure(name, duration, detail))
        }
    }

    /// Stage `*_original` folders into the output area; other units run in place
    fn prepare(&self, unit: &WorkUnit) -> Result<WorkUnit> {
        let name = unit.display_name();

        let Some(clean_name) = staging::clean_name(name, self.config.staging_suffix()) else {
            self.output.info(&format!(
                "Using folder directly: {}",
                unit.source_path().display()
            ));
            return Ok(unit.clone());
        };

        let target = staging::staging_target(self.config.output_dir(), name, clean_name);
        self.output.info(&format!(
            "Copying {} to {}",
            unit.source_path().display(),
            target.display()
        ));
        if !self.config.dry_run() {
            staging::stage_copy(unit.source_path(), &target)?;
        }

        Ok(unit.with_staged_path(target))
    }

    fn describe_failure(&self, result: &ProcessOutput) -> String {
        let mut detail = match result.status.code() {
            Some(code) => format!("Command failed with return code {}", code),
            None => "Command terminated by signal".to_string(),
        };

        let stdout = String::from_utf8_lossy(&result.stdout);
        if !stdout.trim().is_empty() {
            detail.push_str(&format!("\nSTDOUT: {}", stdout.trim_end()));
        }
        let stderr = String::from_utf8_lossy(&result.stderr);
        if !stderr.trim().is_empty() {
            detail.push_str(&format!("\nSTDERR: {}", stderr.trim_end()));
        }

        detail
    }
}
