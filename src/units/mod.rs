//! Work units: dataset folders the engine is run against
//!
//! [`FolderValidator`] decides whether a directory looks like a dataset and
//! [`FolderDiscoverer`] expands command-line paths into an ordered list of
//! [`WorkUnit`]s.

use std::path::{Path, PathBuf};

pub mod discovery;
pub mod validator;

pub use discovery::FolderDiscoverer;
pub use validator::FolderValidator;

/// One directory of input data, processed by a single engine invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    source_path: PathBuf,
    display_name: String,
    staged_path: Option<PathBuf>,
}

impl WorkUnit {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let display_name = Self::derive_name(&source_path);
        Self {
            source_path,
            display_name,
            staged_path: None,
        }
    }

    /// Copy of this unit pointing at a staged working copy
    pub fn with_staged_path(&self, staged_path: impl Into<PathBuf>) -> Self {
        Self {
            staged_path: Some(staged_path.into()),
            ..self.clone()
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn staged_path(&self) -> Option<&Path> {
        self.staged_path.as_deref()
    }

    /// Final path segment of the source path
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Path the engine should run against
    pub fn working_path(&self) -> &Path {
        self.staged_path.as_deref().unwrap_or(&self.source_path)
    }

    fn derive_name(path: &Path) -> String {
        // "." and ".." have no file name of their own
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .or_else(|| {
                path.canonicalize()
                    .ok()
                    .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            })
            .unwrap_or_else(|| path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_is_last_segment() {
        let unit = WorkUnit::new("server/app/test_data/subject01_original");
        assert_eq!(unit.display_name(), "subject01_original");
        assert_eq!(unit.working_path(), Path::new("server/app/test_data/subject01_original"));
        assert_eq!(unit.staged_path(), None);
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let unit = WorkUnit::new("data/subject02/");
        assert_eq!(unit.display_name(), "subject02");
    }

    #[test]
    fn test_staged_copy_changes_working_path_only() {
        let unit = WorkUnit::new("data/X_original");
        let staged = unit.with_staged_path("results/X_original/X");
        assert_eq!(staged.display_name(), "X_original");
        assert_eq!(staged.source_path(), Path::new("data/X_original"));
        assert_eq!(staged.working_path(), Path::new("results/X_original/X"));
        assert_eq!(unit.staged_path(), None);
    }
}
