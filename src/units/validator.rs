use std::path::Path;

use crate::config::DiscoverySettings;

/// Heuristic check for dataset folders.
///
/// A directory qualifies when at least `min_indicators` of the configured
/// indicator entries exist inside it. An indicator ending in `/` must be a
/// directory; any other indicator may be a file or a directory.
#[derive(Debug, Clone)]
pub struct FolderValidator {
    indicators: Vec<String>,
    min_indicators: usize,
}

impl Default for FolderValidator {
    fn default() -> Self {
        let defaults = DiscoverySettings::default();
        Self::new(defaults.indicators, defaults.min_indicators)
    }
}

impl FolderValidator {
    pub fn new(indicators: Vec<String>, min_indicators: usize) -> Self {
        Self {
            indicators,
            min_indicators,
        }
    }

    /// Never fails: missing paths and plain files are simply not work units
    pub fn is_valid_work_unit(&self, path: &Path) -> bool {
        if !path.is_dir() {
            return false;
        }

        let found = self.count_indicators(path);
        tracing::trace!(
            "{}: {}/{} indicators present",
            path.display(),
            found,
            self.indicators.len()
        );
        found >= self.min_indicators
    }

    fn count_indicators(&self, path: &Path) -> usize {
        self.indicators
            .iter()
            .filter(|indicator| match indicator.strip_suffix('/') {
                Some(dir_name) => path.join(dir_name).is_dir(),
                None => path.join(indicator.as_str()).exists(),
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dataset(indicators: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for indicator in indicators {
            match *indicator {
                "trials" => fs::create_dir(dir.path().join("trials")).unwrap(),
                file => fs::write(dir.path().join(file), "{}").unwrap(),
            }
        }
        dir
    }

    #[test]
    fn test_two_or_three_indicators_are_valid() {
        let validator = FolderValidator::default();

        let subject_and_model = dataset(&["_subject.json", "unscaled_generic.osim"]);
        assert!(validator.is_valid_work_unit(subject_and_model.path()));

        let subject_and_trials = dataset(&["_subject.json", "trials"]);
        assert!(validator.is_valid_work_unit(subject_and_trials.path()));

        let all = dataset(&["_subject.json", "unscaled_generic.osim", "trials"]);
        assert!(validator.is_valid_work_unit(all.path()));
    }

    #[test]
    fn test_fewer_than_two_indicators_are_invalid() {
        let validator = FolderValidator::default();

        assert!(!validator.is_valid_work_unit(dataset(&[]).path()));
        assert!(!validator.is_valid_work_unit(dataset(&["_subject.json"]).path()));
        assert!(!validator.is_valid_work_unit(dataset(&["trials"]).path()));
        assert!(!validator.is_valid_work_unit(dataset(&["unrelated.txt", "notes.md"]).path()));
    }

    #[test]
    fn test_trials_must_be_a_directory() {
        let dir = dataset(&["_subject.json"]);
        fs::write(dir.path().join("trials"), "not a folder").unwrap();

        assert!(!FolderValidator::default().is_valid_work_unit(dir.path()));
    }

    #[test]
    fn test_missing_path_and_file_are_invalid() {
        let validator = FolderValidator::default();
        let dir = dataset(&["_subject.json", "trials"]);

        assert!(!validator.is_valid_work_unit(&dir.path().join("missing")));
        assert!(!validator.is_valid_work_unit(&dir.path().join("_subject.json")));
    }

    #[test]
    fn test_custom_threshold() {
        let validator = FolderValidator::new(vec!["a.txt".into(), "b.txt".into()], 1);
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();

        assert!(validator.is_valid_work_unit(dir.path()));
    }
}
