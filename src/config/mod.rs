//! Configuration management for batchrun
//!
//! Settings are merged from the embedded defaults, config files, the environment
//! and CLI flags (see [`BatchConfig`]), then frozen into a validated
//! [`RunConfiguration`] that every other component reads from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RunError;
use crate::units::FolderValidator;

pub mod core;
pub mod overrides;
pub mod smart_load;

pub use self::core::BatchConfig;

/// Raw settings as they appear in config files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    pub run: RunSettings,
    pub command: CommandSettings,
    pub container: ContainerSettings,
    pub parallel: ParallelSettings,
    pub discovery: DiscoverySettings,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    pub parallel: bool,
    pub docker: bool,
    pub dry_run: bool,
    pub continue_on_error: bool,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSettings {
    /// Program the script is handed to; empty runs the script directly
    #[serde(default)]
    pub interpreter: String,
    pub script: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSettings {
    pub runtime: String,
    pub image: String,
    pub platform: String,
    pub mount_point: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelSettings {
    pub max_workers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverySettings {
    pub indicators: Vec<String>,
    pub min_indicators: usize,
    pub staging_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    pub file_name: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            parallel: false,
            docker: false,
            dry_run: false,
            continue_on_error: false,
            output_dir: PathBuf::from("./results"),
        }
    }
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            script: PathBuf::from("engine/src/engine.py"),
        }
    }
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            image: "kswami235/addbio".to_string(),
            platform: "linux/amd64".to_string(),
            mount_point: "/test_data".to_string(),
        }
    }
}

impl Default for ParallelSettings {
    fn default() -> Self {
        Self { max_workers: 4 }
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            indicators: vec![
                "_subject.json".to_string(),
                "unscaled_generic.osim".to_string(),
                "trials/".to_string(),
            ],
            min_indicators: 2,
            staging_suffix: "_original".to_string(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            file_name: "processing_results.json".to_string(),
        }
    }
}

/// Sequential or bounded-parallel dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Parallel,
}

/// How the external command is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Local,
    Container(ContainerSpec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub runtime: String,
    pub image: String,
    pub platform: String,
    pub mount_point: String,
}

/// The external command: an optional interpreter plus the script it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub interpreter: Option<String>,
    pub script: PathBuf,
}

/// Immutable snapshot of everything a run needs, validated at construction.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    mode: ExecutionMode,
    backend: Backend,
    dry_run: bool,
    fail_fast: bool,
    command: CommandSpec,
    output_dir: PathBuf,
    max_workers: usize,
    staging_suffix: String,
    indicators: Vec<String>,
    min_indicators: usize,
    report_file: String,
}

impl RunConfiguration {
    pub fn builder() -> RunConfigurationBuilder {
        RunConfigurationBuilder {
            settings: Settings::default(),
        }
    }

    pub fn from_settings(settings: Settings) -> Result<Self, RunError> {
        let Settings {
            run,
            command,
            container,
            parallel,
            discovery,
            report,
        } = settings;

        if command.script.as_os_str().is_empty() {
            return Err(RunError::invalid("command.script must not be empty"));
        }
        if parallel.max_workers == 0 {
            return Err(RunError::invalid("parallel.max_workers must be at least 1"));
        }
        if discovery.indicators.is_empty() {
            return Err(RunError::invalid("discovery.indicators must not be empty"));
        }
        if discovery.min_indicators == 0 || discovery.min_indicators > discovery.indicators.len() {
            return Err(RunError::invalid(format!(
                "discovery.min_indicators must be between 1 and {}",
                discovery.indicators.len()
            )));
        }
        if discovery.staging_suffix.is_empty() {
            return Err(RunError::invalid("discovery.staging_suffix must not be empty"));
        }
        if report.file_name.is_empty() || report.file_name.contains(['/', '\\']) {
            return Err(RunError::invalid("report.file_name must be a plain file name"));
        }

        let backend = if run.docker {
            if container.runtime.is_empty() || container.image.is_empty() {
                return Err(RunError::invalid(
                    "container.runtime and container.image are required with docker",
                ));
            }
            if !container.mount_point.starts_with('/') {
                return Err(RunError::invalid("container.mount_point must be an absolute path"));
            }
            Backend::Container(ContainerSpec {
                runtime: container.runtime,
                image: container.image,
                platform: container.platform,
                mount_point: container.mount_point,
            })
        } else {
            Backend::Local
        };

        let interpreter = Some(command.interpreter.trim().to_string()).filter(|i| !i.is_empty());

        Ok(Self {
            mode: if run.parallel {
                ExecutionMode::Parallel
            } else {
                ExecutionMode::Sequential
            },
            backend,
            dry_run: run.dry_run,
            fail_fast: !run.continue_on_error,
            command: CommandSpec {
                interpreter,
                script: command.script,
            },
            output_dir: run.output_dir,
            max_workers: parallel.max_workers,
            staging_suffix: discovery.staging_suffix,
            indicators: discovery.indicators,
            min_indicators: discovery.min_indicators,
            report_file: report.file_name,
        })
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn is_parallel(&self) -> bool {
        self.mode == ExecutionMode::Parallel
    }

    pub fn uses_container(&self) -> bool {
        matches!(self.backend, Backend::Container(_))
    }

    /// Image name when the container backend is selected
    pub fn container_image(&self) -> Option<&str> {
        match &self.backend {
            Backend::Container(spec) => Some(&spec.image),
            Backend::Local => None,
        }
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Abort on the first failure (sequential mode only)
    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    pub fn continue_on_error(&self) -> bool {
        !self.fail_fast
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Upper bound on concurrent units in parallel mode
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn staging_suffix(&self) -> &str {
        &self.staging_suffix
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    pub fn validator(&self) -> FolderValidator {
        FolderValidator::new(self.indicators.clone(), self.min_indicators)
    }
}

/// Programmatic construction starting from the built-in defaults
#[derive(Debug, Clone)]
pub struct RunConfigurationBuilder {
    settings: Settings,
}

impl RunConfigurationBuilder {
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.settings.run.parallel = parallel;
        self
    }

    pub fn docker(mut self, docker: bool) -> Self {
        self.settings.run.docker = docker;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.settings.run.dry_run = dry_run;
        self
    }

    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.settings.run.continue_on_error = continue_on_error;
        self
    }

    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.settings.run.output_dir = output_dir.into();
        self
    }

    pub fn interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.settings.command.interpreter = interpreter.into();
        self
    }

    pub fn script(mut self, script: impl Into<PathBuf>) -> Self {
        self.settings.command.script = script.into();
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.settings.container.image = image.into();
        self
    }

    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.settings.parallel.max_workers = max_workers;
        self
    }

    pub fn build(self) -> Result<RunConfiguration, RunError> {
        RunConfiguration::from_settings(self.settings)
    }
}
