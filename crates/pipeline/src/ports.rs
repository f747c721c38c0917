//! Port traits implemented by infrastructure.
//!
//! Stages depend only on these traits. The `storage` crate implements them
//! over a data directory; tests implement them in memory.

use crate::acs::AcsTable;
use crate::boundaries::BoundaryFeature;
use crate::records::{
    BlockPlaceLink, BlockValuation, CbsaBoundary, CbsaIncome, CrosswalkRow, MapFeature,
    PlaceBoundary, PlaceHomeValue, PlaceMetrics, PlaceValuation,
};
use crate::report::{RunManifest, Written};
use crate::StoreError;

/// The two ACS 5-year detailed tables the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcsTableKind {
    /// B19013, median household income, by CBSA.
    CbsaMedianIncome,
    /// B25077, median value of owner-occupied housing units, by place.
    PlaceMedianHomeValue,
}

impl AcsTableKind {
    /// Census table identifier.
    pub fn table_id(self) -> &'static str {
        match self {
            Self::CbsaMedianIncome => "B19013",
            Self::PlaceMedianHomeValue => "B25077",
        }
    }
}

/// Census cartographic boundary layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryLayer {
    /// Incorporated places and CDPs.
    Places,
    /// Core-based statistical areas.
    Cbsas,
}

impl BoundaryLayer {
    /// Layer name for messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Places => "places",
            Self::Cbsas => "cbsas",
        }
    }
}

/// Raw inputs fetched by the operator before a refresh.
pub trait RawSource {
    /// Block-level AVM export.
    fn block_valuations(&self) -> Result<Vec<BlockValuation>, StoreError>;

    /// All block-to-place crosswalk rows, concatenated across export batches.
    fn block_place_crosswalk(&self) -> Result<Vec<CrosswalkRow>, StoreError>;

    /// A Census API response for `kind`.
    fn acs_table(&self, kind: AcsTableKind) -> Result<AcsTable, StoreError>;

    /// Features of a cartographic boundary layer.
    fn boundary_features(&self, layer: BoundaryLayer) -> Result<Vec<BoundaryFeature>, StoreError>;
}

/// Intermediate and tidy datasets produced and consumed by the stages.
pub trait TidyStore {
    fn write_block_valuations(&mut self, rows: &[BlockValuation]) -> Result<Written, StoreError>;
    fn write_block_place_links(&mut self, rows: &[BlockPlaceLink]) -> Result<Written, StoreError>;

    /// Writes place medians. Text fields, ids included, are quoted in text formats.
    fn write_place_valuations(&mut self, rows: &[PlaceValuation]) -> Result<Written, StoreError>;
    fn read_place_valuations(&self) -> Result<Vec<PlaceValuation>, StoreError>;

    fn write_cbsa_incomes(&mut self, rows: &[CbsaIncome]) -> Result<Written, StoreError>;
    fn read_cbsa_incomes(&self) -> Result<Vec<CbsaIncome>, StoreError>;

    fn write_place_home_values(&mut self, rows: &[PlaceHomeValue]) -> Result<Written, StoreError>;
    fn read_place_home_values(&self) -> Result<Vec<PlaceHomeValue>, StoreError>;

    fn write_place_boundaries(&mut self, rows: &[PlaceBoundary]) -> Result<Written, StoreError>;
    fn read_place_boundaries(&self) -> Result<Vec<PlaceBoundary>, StoreError>;

    fn write_cbsa_boundaries(&mut self, rows: &[CbsaBoundary]) -> Result<Written, StoreError>;
    fn read_cbsa_boundaries(&self) -> Result<Vec<CbsaBoundary>, StoreError>;

    /// Writes the joined table without geometry.
    fn write_place_metrics(&mut self, rows: &[PlaceMetrics]) -> Result<Written, StoreError>;

    /// Writes the map layer with geometry.
    fn write_map_features(&mut self, rows: &[MapFeature<'_>]) -> Result<Written, StoreError>;

    fn write_manifest(&mut self, manifest: &RunManifest) -> Result<Written, StoreError>;
}
