use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs_extra::dir::CopyOptions;

/// Name of the working copy for a pristine source folder, if `display_name` carries `suffix`.
///
/// `X_original` becomes `X`; a name that is nothing but the suffix is not staged.
pub fn clean_name<'n>(display_name: &'n str, suffix: &str) -> Option<&'n str> {
    display_name
        .strip_suffix(suffix)
        .filter(|clean| !clean.is_empty())
}

/// `<output_dir>/<display_name>/<clean_name>`
pub fn staging_target(output_dir: &Path, display_name: &str, clean_name: &str) -> PathBuf {
    output_dir.join(display_name).join(clean_name)
}

/// Replace `target` with a full copy of the `source` tree
pub fn stage_copy(source: &Path, target: &Path) -> Result<()> {
    if target.exists() {
        std::fs::remove_dir_all(target).with_context(|| {
            format!("Failed to remove previous staged copy: {}", target.display())
        })?;
    }
    std::fs::create_dir_all(target)
        .with_context(|| format!("Failed to create staging directory: {}", target.display()))?;

    let options = CopyOptions::new().content_only(true);
    if let Err(e) = fs_extra::dir::copy(source, target, &options) {
        // Never leave a partial copy behind
        if let Err(cleanup) = std::fs::remove_dir_all(target) {
            tracing::warn!("Could not remove partial copy {}: {}", target.display(), cleanup);
        }
        return Err(anyhow::Error::new(e).context(format!(
            "Failed to copy {} to {}",
            source.display(),
            target.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("subject01_original", "_original"), Some("subject01"));
        assert_eq!(clean_name("subject01", "_original"), None);
        assert_eq!(clean_name("_original", "_original"), None);
        assert_eq!(clean_name("original", "_original"), None);
    }

    #[test]
    fn test_staging_target_layout() {
        let target = staging_target(Path::new("results"), "X_original", "X");
        assert_eq!(target, PathBuf::from("results/X_original/X"));
    }

    #[test]
    fn test_stage_copy_copies_tree_and_replaces_previous_copy() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("X_original");
        fs::create_dir_all(source.join("trials/walk")).unwrap();
        fs::write(source.join("_subject.json"), "{\"mass\": 70}").unwrap();
        fs::write(source.join("trials/walk/markers.trc"), "data").unwrap();

        let target = staging_target(&temp.path().join("results"), "X_original", "X");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("stale_output.txt"), "old").unwrap();

        stage_copy(&source, &target).unwrap();

        assert_eq!(
            fs::read_to_string(target.join("_subject.json")).unwrap(),
            "{\"mass\": 70}"
        );
        assert!(target.join("trials/walk/markers.trc").is_file());
        assert!(!target.join("stale_output.txt").exists());
        // Source is untouched
        assert!(source.join("_subject.json").is_file());
    }

    #[test]
    fn test_stage_copy_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out/x");
        let result = stage_copy(&temp.path().join("nope"), &target);
        assert!(result.is_err());
        assert!(!target.exists());
    }
}
