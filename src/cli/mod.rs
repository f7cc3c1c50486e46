//! Command-line interface for batchrun
//!
//! Parses flags with clap, layers them over the file/environment
//! configuration and drives one batch run from discovery to report.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Value, json};

use crate::config::{BatchConfig, RunConfiguration};
use crate::error::RunError;
use crate::executor::UnitExecutor;
use crate::orchestrator::Orchestrator;
use crate::reports::ResultReporter;
use crate::units::FolderDiscoverer;

mod output;

pub use output::Output;

/// Run a processing engine over many dataset folders
#[derive(Parser, Debug)]
#[command(
    name = "batchrun",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run a processing engine over many dataset folders",
    long_about = "Each PATH is either a dataset folder itself or a directory whose immediate \
                  children are checked for dataset indicators. Every folder found is processed \
                  by the configured engine, locally or inside a container, and the outcomes are \
                  saved to processing_results.json in the output directory."
)]
pub struct Cli {
    /// Dataset folders or directories containing them
    #[arg(value_name = "PATHS", required_unless_present = "show_config")]
    pub paths: Vec<PathBuf>,

    /// Process folders in parallel
    #[arg(short, long)]
    pub parallel: bool,

    /// Run the engine inside a container
    #[arg(short, long)]
    pub docker: bool,

    /// Directory for staged copies and the results file
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Show what would be executed without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Keep processing after a failure in sequential mode
    #[arg(long)]
    pub continue_on_error: bool,

    /// Container image to run the engine in
    #[arg(long, value_name = "IMAGE")]
    pub docker_image: Option<String>,

    /// Engine script, relative to the working directory
    #[arg(long, value_name = "PATH")]
    pub engine_script: Option<PathBuf>,

    /// Interpreter for the engine script (empty runs the script directly)
    #[arg(long, value_name = "PROGRAM")]
    pub interpreter: Option<String>,

    /// Upper bound on parallel workers
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// Use custom configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the merged configuration as JSON and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        let config = BatchConfig::load(self.config.as_deref(), Some(self.config_overrides()))?;

        if self.show_config {
            let merged = config.get_full_config()?;
            println!("{}", serde_json::to_string_pretty(&merged)?);
            return Ok(());
        }

        let run_config = RunConfiguration::from_settings(config.settings()?)?;

        let units = FolderDiscoverer::new(run_config.validator(), &output).resolve_inputs(&self.paths)?;
        print_configuration(&output, &run_config, units.len());

        if !run_config.dry_run() {
            fs::create_dir_all(run_config.output_dir()).with_context(|| {
                format!(
                    "Failed to create output directory: {}",
                    run_config.output_dir().display()
                )
            })?;
        }

        let executor = UnitExecutor::new(&run_config, &output);
        let run = Orchestrator::new(&executor, &run_config, &output).run(&units);

        let reporter = ResultReporter::new(&run_config, &output);
        let report = reporter.build(&run.outcomes, units.len());
        reporter.persist(&report)?;

        if let Some(unit) = run.aborted_on {
            return Err(RunError::FailFastAbort { unit }.into());
        }

        reporter.summarize(&report);
        Ok(())
    }

    /// Flags the user actually set, shaped like the configuration file.
    /// Unset flags stay null and are stripped before merging.
    fn config_overrides(&self) -> Value {
        json!({
            "run": {
                "parallel": self.parallel.then_some(true),
                "docker": self.docker.then_some(true),
                "dry_run": self.dry_run.then_some(true),
                "continue_on_error": self.continue_on_error.then_some(true),
                "output_dir": self.output_dir,
            },
            "command": {
                "interpreter": self.interpreter,
                "script": self.engine_script,
            },
            "container": {
                "image": self.docker_image,
            },
            "parallel": {
                "max_workers": self.max_workers,
            },
        })
    }
}

fn print_configuration(output: &Output, config: &RunConfiguration, unit_count: usize) {
    output.section_header("Configuration");
    output.key_value("Parallel processing:", &config.is_parallel().to_string(), false);
    output.key_value("Docker mode:", &config.uses_container().to_string(), false);
    output.key_value(
        "Output directory:",
        &config.output_dir().display().to_string(),
        false,
    );
    output.key_value("Dry run:", &config.dry_run().to_string(), config.dry_run());
    output.key_value(
        "Continue on error:",
        &config.continue_on_error().to_string(),
        false,
    );
    if let Some(image) = config.container_image() {
        output.key_value("Docker image:", image, false);
    }
    output.key_value("Folders to process:", &unit_count.to_string(), true);
    output.separator();
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,figment=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,figment=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_flags_produce_no_overrides() {
        let cli = Cli::try_parse_from(["batchrun", "data"]).unwrap();
        let stripped = crate::config::overrides::strip_unset(cli.config_overrides());
        assert_eq!(stripped, json!({}));
    }

    #[test]
    fn test_set_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "batchrun",
            "-p",
            "--docker-image",
            "example/engine:2",
            "--max-workers",
            "8",
            "--interpreter",
            "",
            "data",
        ])
        .unwrap();
        let stripped = crate::config::overrides::strip_unset(cli.config_overrides());

        assert_eq!(stripped["run"], json!({ "parallel": true }));
        assert_eq!(stripped["container"]["image"], "example/engine:2");
        assert_eq!(stripped["parallel"]["max_workers"], 8);
        assert_eq!(stripped["command"]["interpreter"], "");
    }

    #[test]
    fn test_paths_required_without_show_config() {
        assert!(Cli::try_parse_from(["batchrun"]).is_err());
        let cli = Cli::try_parse_from(["batchrun", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.paths.is_empty());
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["batchrun", "-vvv", "data"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }
}
