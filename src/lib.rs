//! # batchrun - run a processing engine over many dataset folders
//!
//! batchrun discovers dataset folders ("work units"), dispatches an external
//! processing command against each one and aggregates the outcomes into a
//! JSON report plus a console summary.
//!
//! ## Features
//!
//! - **Folder discovery**: a path is either a work unit itself or a parent whose
//!   immediate children are checked with an indicator heuristic
//! - **Two backends**: run the engine locally or inside a container
//! - **Staging**: `*_original` folders are copied into the output area first so
//!   the pristine source is never touched
//! - **Sequential or parallel**: bounded worker pool, fail-fast in sequential mode
//! - **Layered configuration**: TOML/JSON/YAML files, environment and CLI flags
//!
//! ## Quick Start
//!
//! ```bash
//! # Process every dataset folder below a directory
//! batchrun server/app/test_data
//!
//! # Parallel, inside docker, keep going on failures
//! batchrun -p -d --continue-on-error server/app/test_data
//!
//! # See what would run
//! batchrun --dry-run -o ./batch_results server/app/test_data
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use batchrun::cli::Output;
//! use batchrun::config::RunConfiguration;
//! use batchrun::executor::UnitExecutor;
//! use batchrun::orchestrator::Orchestrator;
//! use batchrun::units::FolderDiscoverer;
//!
//! let config = RunConfiguration::builder().dry_run(true).build()?;
//! let output = Output::new(false, true);
//! let discoverer = FolderDiscoverer::new(config.validator(), &output);
//! let units = discoverer.resolve_inputs(&["server/app/test_data"])?;
//!
//! let executor = UnitExecutor::new(&config, &output);
//! let run = Orchestrator::new(&executor, &config, &output).run(&units);
//! println!("{} outcomes", run.outcomes.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod parallel;
pub mod reports;
pub mod units;

pub use cli::{Cli, Output};
pub use config::RunConfiguration;
pub use error::RunError;

/// Result type alias for batchrun operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
