use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde_json::Value;

use super::Settings;
use super::overrides::strip_unset;
use super::smart_load::{self, ConfigFormat};

// Embed the default config at compile time
pub const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Merged view over every configuration layer
pub struct BatchConfig {
    figment: Figment,
}

impl BatchConfig {
    /// Merge defaults, user config, repo config, `custom_config`, environment and CLI overrides.
    pub fn load(custom_config: Option<&Path>, cli_overrides: Option<Value>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        for candidate in Self::candidate_files(&Self::user_config_base_path()) {
            figment = figment.merge(smart_load::auto(candidate));
        }
        for candidate in Self::candidate_files(Path::new("batchrun")) {
            figment = figment.merge(smart_load::auto(candidate));
        }

        if let Some(path) = custom_config {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            tracing::debug!("CONFIG LOAD: Using custom config {}", path.display());
            figment = figment.merge(smart_load::auto(path));
        }

        figment = figment.merge(Env::prefixed("BATCHRUN_").split("__"));

        if let Some(overrides) = cli_overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(strip_unset(overrides)));
        }

        Ok(BatchConfig { figment })
    }

    /// Typed settings extracted from the merged layers
    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .context("Failed to parse batchrun configuration")
    }

    /// Get the full merged configuration as a structured value
    pub fn get_full_config(&self) -> Result<Value> {
        let value = self.figment.extract()?;
        Ok(value)
    }

    fn candidate_files(base: &Path) -> Vec<PathBuf> {
        ConfigFormat::EXTENSIONS
            .iter()
            .map(|ext| base.with_extension(ext))
            .filter(|path| path.is_file())
            .collect()
    }

    fn user_config_base_path() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(".config/batchrun/config"),
            Err(_) => PathBuf::from("~/.config/batchrun/config"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_loads_defaults() {
        let config = BatchConfig::load(None, None).expect("Should load default config");

        let full_config = config.get_full_config().unwrap();
        assert!(full_config.get("run").is_some());
        assert!(full_config.get("container").is_some());

        assert_eq!(full_config["discovery"]["staging_suffix"], json!("_original"));
    }

    #[test]
    fn test_custom_config_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.yaml");
        fs::write(&path, "container:\n  image: example/engine:2\nparallel:\n  max_workers: 2\n").unwrap();

        let settings = BatchConfig::load(Some(&path), None).unwrap().settings().unwrap();
        assert_eq!(settings.container.image, "example/engine:2");
        assert_eq!(settings.parallel.max_workers, 2);
        assert_eq!(settings.container.runtime, "docker");
    }

    #[test]
    fn test_cli_overrides_win_and_unset_flags_do_not_mask() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "[run]\noutput_dir = \"/tmp/from-file\"\n").unwrap();

        let overrides = json!({
            "run": { "parallel": true, "output_dir": null },
            "container": { "image": null }
        });
        let settings = BatchConfig::load(Some(&path), Some(overrides))
            .unwrap()
            .settings()
            .unwrap();

        assert!(settings.run.parallel);
        assert_eq!(settings.run.output_dir, PathBuf::from("/tmp/from-file"));
        assert_eq!(settings.container.image, "kswami235/addbio");
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        let result = BatchConfig::load(Some(Path::new("does/not/exist.toml")), None);
        assert!(result.is_err());
    }
}
