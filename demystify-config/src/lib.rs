//! Shared configuration loader for the demystify toolchain.
//!
//! `defaults/demystify.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`DemystifyConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/demystify.default.toml");

/// Top-level configuration consumed by demystify applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DemystifyConfig {
    pub names: NamesConfig,
    pub parsing: ParsingConfig,
    pub report: ReportConfig,
}

/// Card-name handling.
#[derive(Debug, Clone, Deserialize)]
pub struct NamesConfig {
    #[serde(default)]
    pub short_names: Vec<ShortNameOverride>,
}

impl NamesConfig {
    /// Overrides keyed by full card name.
    pub fn short_name_map(&self) -> BTreeMap<String, String> {
        self.short_names
            .iter()
            .map(|entry| (entry.name.clone(), entry.short.clone()))
            .collect()
    }
}

/// A short name that can't be derived from the full name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShortNameOverride {
    pub name: String,
    pub short: String,
}

/// Grammar driver knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsingConfig {
    pub deterministic_first: bool,
}

/// Batch report output.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub max_logged_failures: usize,
    pub bar_width: usize,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a configuration file that may be absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<DemystifyConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DemystifyConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(config.parsing.deterministic_first);
        assert_eq!(config.report.max_logged_failures, 10);
        assert_eq!(config.report.bar_width, 20);
        assert_eq!(config.names.short_names.len(), 10);
    }

    #[test]
    fn short_name_map_keeps_case() {
        let config = load_defaults().expect("defaults to deserialize");
        let map = config.names.short_name_map();
        assert_eq!(
            map.get("Drizzt Do'Urden").map(String::as_str),
            Some("Drizzt")
        );
        assert_eq!(
            map.get("Svyelun of Sea and Sky").map(String::as_str),
            Some("Svyelun")
        );
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("report.max_logged_failures", 3)
            .expect("override to apply")
            .set_override("parsing.deterministic_first", false)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.report.max_logged_failures, 3);
        assert!(!config.parsing.deterministic_first);
    }
}
