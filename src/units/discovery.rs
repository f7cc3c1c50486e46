use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{FolderValidator, WorkUnit};
use crate::cli::Output;
use crate::error::RunError;

/// Expands command-line paths into validated work units.
///
/// Bad inputs only produce warnings; the run fails only when nothing at all
/// qualifies.
pub struct FolderDiscoverer<'a> {
    validator: FolderValidator,
    output: &'a Output,
}

impl<'a> FolderDiscoverer<'a> {
    pub fn new(validator: FolderValidator, output: &'a Output) -> Self {
        Self { validator, output }
    }

    /// Resolve `paths` in order. Children of a parent directory are sorted by name.
    ///
    /// A folder reached through several inputs is kept once, at its first
    /// position. Two distinct folders with the same name are rejected.
    pub fn resolve_inputs<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<WorkUnit>> {
        let mut units: Vec<WorkUnit> = Vec::new();
        let mut seen_paths = HashSet::new();
        let mut seen_names: HashMap<String, PathBuf> = HashMap::new();

        for path in paths {
            let path = path.as_ref();
            let found = self.resolve_path(path);
            tracing::debug!("{} resolved to {} work unit(s)", path.display(), found.len());

            for unit in found {
                let key = unit
                    .source_path()
                    .canonicalize()
                    .unwrap_or_else(|_| unit.source_path().to_path_buf());
                if !seen_paths.insert(key) {
                    self.output.warning(&format!(
                        "Skipping duplicate folder: {}",
                        unit.source_path().display()
                    ));
                    continue;
                }

                if let Some(first) = seen_names.get(unit.display_name()) {
                    return Err(RunError::DuplicateUnitName {
                        name: unit.display_name().to_string(),
                        first: first.clone(),
                        second: unit.source_path().to_path_buf(),
                    }
                    .into());
                }
                seen_names.insert(
                    unit.display_name().to_string(),
                    unit.source_path().to_path_buf(),
                );
                units.push(unit);
            }
        }

        if units.is_empty() {
            return Err(RunError::NoWorkUnits.into());
        }

        Ok(units)
    }

    fn resolve_path(&self, path: &Path) -> Vec<WorkUnit> {
        if path.is_file() {
            self.output
                .warning(&format!("Skipping file (not a folder): {}", path.display()));
            return Vec::new();
        }

        if !path.is_dir() {
            self.output
                .warning(&format!("Path does not exist: {}", path.display()));
            return Vec::new();
        }

        if self.validator.is_valid_work_unit(path) {
            return vec![WorkUnit::new(path)];
        }

        let children = self.find_work_units(path);
        if children.is_empty() {
            self.output.warning(&format!(
                "No valid test_data folders found in {}",
                path.display()
            ));
        }
        children
    }

    /// Immediate child directories of `directory` that qualify as work units
    fn find_work_units(&self, directory: &Path) -> Vec<WorkUnit> {
        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                self.output
                    .warning(&format!("Cannot read {}: {}", directory.display(), e));
                return Vec::new();
            }
        };

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        candidates
            .into_iter()
            .filter(|path| self.validator.is_valid_work_unit(path))
            .map(WorkUnit::new)
            .collect()
    }
}
