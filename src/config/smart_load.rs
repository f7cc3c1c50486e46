use std::path::Path;

use figment::providers::{Format, Json, Toml, Yaml};

/// Configuration file formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Extensions probed for user and repository config files, in merge order
    pub const EXTENSIONS: [&'static str; 4] = ["toml", "json", "yaml", "yml"];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            _ => None,
        }
    }
}

/// Build a figment provider for `path`, picking the format from its extension.
///
/// Files with an unknown extension are sniffed; anything undetectable is read as TOML.
pub fn auto<P: AsRef<Path>>(path: P) -> impl figment::Provider {
    let path = path.as_ref();
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ConfigFormat::from_extension)
        .or_else(|| {
            let detected = std::fs::read_to_string(path)
                .ok()
                .and_then(|content| detect_format_from_content(&content));
            tracing::debug!(
                "Config {} has no known extension, detected format: {:?}",
                path.display(),
                detected
            );
            detected
        })
        .unwrap_or(ConfigFormat::Toml);

    match format {
        ConfigFormat::Toml => SmartProvider::Toml(Toml::file(path)),
        ConfigFormat::Json => SmartProvider::Json(Json::file(path)),
        ConfigFormat::Yaml => SmartProvider::Yaml(Yaml::file(path)),
    }
}

enum SmartProvider {
    Toml(figment::providers::Data<Toml>),
    Json(figment::providers::Data<Json>),
    Yaml(figment::providers::Data<Yaml>),
}

impl figment::Provider for SmartProvider {
    fn metadata(&self) -> figment::Metadata {
        match self {
            SmartProvider::Toml(p) => p.metadata(),
            SmartProvider::Json(p) => p.metadata(),
            SmartProvider::Yaml(p) => p.metadata(),
        }
    }

    fn data(
        &self,
    ) -> Result<figment::value::Map<figment::Profile, figment::value::Dict>, figment::Error> {
        match self {
            SmartProvider::Toml(p) => p.data(),
            SmartProvider::Json(p) => p.data(),
            SmartProvider::Yaml(p) => p.data(),
        }
    }
}

fn detect_format_from_content(content: &str) -> Option<ConfigFormat> {
    let trimmed = content.trim();

    // Config documents are always maps, so a bracketed body is a TOML header, not JSON
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(ConfigFormat::Json);
    }

    // TOML table headers win over colons, which also show up in TOML string values
    if trimmed.lines().any(|line| {
        let line = line.trim();
        (line.starts_with('[') && line.ends_with(']'))
            || (line.contains('=') && !line.contains(':'))
    }) {
        return Some(ConfigFormat::Toml);
    }

    if trimmed.starts_with("---")
        || trimmed
            .lines()
            .any(|line| line.trim().contains(": ") || line.trim().ends_with(':'))
    {
        return Some(ConfigFormat::Yaml);
    }

    None
}
