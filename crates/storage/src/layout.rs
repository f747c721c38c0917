//! Data directory layout.
//!
//! ```text
//! <root>/
//!   raw/        operator-fetched inputs (AVM export, crosswalk batches,
//!               Census API responses, boundary layers)
//!   intermed/   block-level intermediates
//!   tidy/       place-level outputs, map layer, run manifest
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File names of the raw inputs, relative to the raw directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawInputs {
    /// Block-level AVM CSV.
    pub block_avm: String,
    /// Prefix shared by every crosswalk export batch.
    pub crosswalk_prefix: String,
    /// Census API response for table B19013 by CBSA.
    pub cbsa_income_acs: String,
    /// Census API response for table B25077 by place.
    pub place_home_value_acs: String,
    /// Place cartographic boundaries (GeoJSON).
    pub place_boundaries: String,
    /// CBSA cartographic boundaries (GeoJSON).
    pub cbsa_boundaries: String,
}

impl Default for RawInputs {
    fn default() -> Self {
        Self {
            block_avm: "datablock_20240508.csv".into(),
            crosswalk_prefix: "geocorr2022".into(),
            cbsa_income_acs: "acs5_2022_b19013_cbsa.json".into(),
            place_home_value_acs: "acs5_2022_b25077_place.json".into(),
            place_boundaries: "cb_2020_us_place_500k.geojson".into(),
            cbsa_boundaries: "cb_2020_us_cbsa_500k.geojson".into(),
        }
    }
}

/// Where a data refresh reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataLayout {
    /// Base directory; the other directories are relative to it.
    pub root: PathBuf,
    pub raw: PathBuf,
    pub intermed: PathBuf,
    pub tidy: PathBuf,
    /// Raw input file names.
    pub inputs: RawInputs,
}

impl Default for DataLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
            raw: PathBuf::from("raw"),
            intermed: PathBuf::from("intermed"),
            tidy: PathBuf::from("tidy"),
            inputs: RawInputs::default(),
        }
    }
}

impl DataLayout {
    /// Default layout under `root`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join(&self.raw)
    }

    pub fn intermed_dir(&self) -> PathBuf {
        self.root.join(&self.intermed)
    }

    pub fn tidy_dir(&self) -> PathBuf {
        self.root.join(&self.tidy)
    }

    /// Path of a raw input file.
    pub fn raw_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.raw_dir().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_are_relative_to_root() {
        let layout = DataLayout::at("/srv/refresh");
        assert_eq!(layout.raw_dir(), PathBuf::from("/srv/refresh/raw"));
        assert_eq!(layout.tidy_dir(), PathBuf::from("/srv/refresh/tidy"));
        assert_eq!(
            layout.raw_file(&layout.inputs.block_avm),
            PathBuf::from("/srv/refresh/raw/datablock_20240508.csv")
        );
    }

    #[test]
    fn absolute_subdirectory_overrides_root() {
        let layout = DataLayout {
            tidy: PathBuf::from("/published"),
            ..DataLayout::at("data")
        };
        assert_eq!(layout.tidy_dir(), PathBuf::from("/published"));
    }
}
