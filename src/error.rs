use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that end a batch run.
///
/// Per-unit failures are never represented here: they are captured in an
/// [`ExecutionOutcome`](crate::executor::ExecutionOutcome) and the run continues.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("No valid work units found")]
    NoWorkUnits,

    #[error("Stopping due to error in {unit} (use --continue-on-error to continue)")]
    FailFastAbort { unit: String },

    #[error(
        "Folders {} and {} are both named {}; their staged copies and report entries would collide",
        .first.display(),
        .second.display(),
        .name
    )]
    DuplicateUnitName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("Report file could not be read: {path}")]
    UnreadableReport {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RunError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        RunError::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
