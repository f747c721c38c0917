//! Configuration file support.
//!
//! Reads `placeprep.toml` from the working directory (or the file named by
//! `--config`). Every section and key is optional:
//!
//! ```toml
//! [data]
//! root = "data"
//! raw = "raw"
//! intermed = "intermed"
//! tidy = "tidy"
//!
//! [data.inputs]
//! block_avm = "datablock_20240508.csv"
//! crosswalk_prefix = "geocorr2022"
//!
//! [checks]
//! expected_state_count = 52
//!
//! [join]
//! predicate = "intersects"   # or "centroid"
//!
//! [map]
//! strip_cbsa_suffix = ", CA"
//! include_category_color = true
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use pipeline::{JoinPredicate, PipelineSettings};
use serde::Deserialize;
use storage::DataLayout;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "placeprep.toml";

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Data directory layout and raw input names.
    pub data: DataLayout,
    /// Input sanity checks.
    pub checks: ChecksConfig,
    /// Spatial join.
    pub join: JoinConfig,
    /// Map output.
    pub map: MapConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChecksConfig {
    /// Distinct state codes the crosswalk must cover.
    pub expected_state_count: usize,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            expected_state_count: PipelineSettings::NATIONAL_STATE_COUNT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JoinConfig {
    pub predicate: JoinPredicate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub strip_cbsa_suffix: Option<String>,
    pub include_category_color: bool,
}

impl ConfigFile {
    /// Loads configuration.
    ///
    /// With `explicit` set, the file must exist. Otherwise
    /// [`DEFAULT_CONFIG_FILE`] is read if present and defaults are used if
    /// not. A file that exists but does not parse is always an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        if explicit.is_none() && !path.exists() {
            tracing::debug!("no {DEFAULT_CONFIG_FILE}; using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Stage settings derived from the `[checks]`, `[join]` and `[map]` sections.
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            expected_state_count: self.checks.expected_state_count,
            join_predicate: self.join.predicate,
            strip_cbsa_suffix: self.map.strip_cbsa_suffix.clone(),
            include_category_color: self.map.include_category_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn empty_file_gives_national_defaults() {
        let config = ConfigFile::parse("").unwrap();
        assert_eq!(config.settings(), PipelineSettings::default());
        assert_eq!(config.data, DataLayout::default());
    }

    #[test]
    fn sections_map_onto_settings_and_layout() {
        let config = ConfigFile::parse(
            r#"
            [data]
            root = "/srv/placeprep"

            [data.inputs]
            crosswalk_prefix = "geocorr2022_ca"

            [checks]
            expected_state_count = 1

            [join]
            predicate = "centroid"

            [map]
            strip_cbsa_suffix = ", CA"
            include_category_color = true
            "#,
        )
        .unwrap();

        let settings = config.settings();
        assert_eq!(settings.expected_state_count, 1);
        assert_eq!(settings.join_predicate, JoinPredicate::Centroid);
        assert_eq!(settings.strip_cbsa_suffix.as_deref(), Some(", CA"));
        assert!(settings.include_category_color);
        assert_eq!(config.data.root, PathBuf::from("/srv/placeprep"));
        assert_eq!(config.data.inputs.crosswalk_prefix, "geocorr2022_ca");
        assert_eq!(config.data.inputs.block_avm, "datablock_20240508.csv");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ConfigFile::parse("[join]\nmethod = \"centroid\"\n").unwrap_err();
        assert!(err.to_string().contains("unknown field"), "{err}");
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(ConfigFile::load(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_path_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refresh.toml");
        std::fs::write(&path, "[checks]\nexpected_state_count = 3\n").unwrap();

        let config = ConfigFile::load(Some(&path)).unwrap();

        assert_eq!(config.checks.expected_state_count, 3);
    }
}
