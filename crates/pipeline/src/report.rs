//! Stage reports and the run manifest.

use serde::{Deserialize, Serialize};

use crate::{PipelineRunId, Timestamp};

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Block AVMs aggregated to places.
    AvmToPlace,
    /// ACS income and home value tables.
    CensusData,
    /// Place and CBSA boundary layers.
    CensusGeo,
    /// Spatial join, ratios, and map data.
    JoinPlaceCbsa,
}

impl StageName {
    /// Every stage in execution order.
    pub const ALL: [StageName; 4] = [
        StageName::AvmToPlace,
        StageName::CensusData,
        StageName::CensusGeo,
        StageName::JoinPlaceCbsa,
    ];

    /// Snake-case stage name, as used in logs and the manifest.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AvmToPlace => "avm_to_place",
            Self::CensusData => "census_data",
            Self::CensusGeo => "census_geo",
            Self::JoinPlaceCbsa => "join_place_cbsa",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every dataset a stage writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    UsBlockData,
    XwalkBlockPlace,
    UsPlaceAvm,
    CbsaIncome2022,
    PlaceHomeValue2022,
    UsPlace2020,
    UsCbsa,
    MapDataIncomeAvmRaw,
    MapDataIncomeAvm,
    RunManifest,
}

impl Dataset {
    /// File stem of the dataset (extension is chosen by the store).
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::UsBlockData => "us_block_data",
            Self::XwalkBlockPlace => "xwalk_block_place",
            Self::UsPlaceAvm => "us_place_avm",
            Self::CbsaIncome2022 => "cbsa_income_2022",
            Self::PlaceHomeValue2022 => "place_home_value_2022",
            Self::UsPlace2020 => "us_place_2020",
            Self::UsCbsa => "us_cbsa",
            Self::MapDataIncomeAvmRaw => "map_data_income_avm_raw",
            Self::MapDataIncomeAvm => "map_data_income_avm",
            Self::RunManifest => "run_manifest",
        }
    }

    /// Whether the dataset is an intermediate rather than a tidy output.
    pub fn is_intermediate(self) -> bool {
        matches!(self, Self::UsBlockData | Self::XwalkBlockPlace)
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Receipt for one dataset written by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Written {
    /// Which dataset.
    pub dataset: Dataset,
    /// Where it went (a file path for the filesystem store).
    pub location: String,
    /// Number of records written.
    pub rows: usize,
}

/// Summary of one stage execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Which stage ran.
    pub stage: StageName,
    /// Primary input records read.
    pub rows_in: usize,
    /// Primary output records written.
    pub rows_out: usize,
    /// Every dataset written, in write order.
    pub outputs: Vec<Written>,
}

/// Record of one CLI run, written alongside the tidy outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: PipelineRunId,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub stages: Vec<StageReport>,
}
