//! Flat records exchanged between stages.
//!
//! Field names (via `serde(rename)`) are the column names of the tidy
//! outputs; downstream mapping code depends on them, so they are part of the
//! contract and must not change casually.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::{BlockId, CbsaId, PlaceId, StateAbbr};

// ---------------------------------------------------------------------------
// Block level
// ---------------------------------------------------------------------------

/// Median automated valuation for one 2020 census block.
///
/// The raw AVM export names the value column `p50_avm_202312`; the
/// intermediate output renames it to `avm_2023`. Both are accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockValuation {
    /// Block GEOID.
    pub block_2020: BlockId,
    /// Median AVM in dollars; `None` when the block has no estimate.
    #[serde(rename = "avm_2023", alias = "p50_avm_202312")]
    pub avm_2023: Option<f64>,
}

/// One raw row of a block-to-place crosswalk export.
///
/// Codes are kept as text here; [`crate::crosswalk::clean_block_place`]
/// validates and composes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosswalkRow {
    /// State + county code (5 digits).
    pub county: String,
    /// Tract code with a decimal point (e.g. `"9501.02"`).
    pub tract: String,
    /// Block code (4 digits).
    pub block: String,
    /// Place code within the state (5 digits).
    pub place: String,
    /// State FIPS code (2 digits).
    pub state: String,
    /// Place name; blank for rows without a name.
    #[serde(rename = "PlaceName", default)]
    pub place_name: Option<String>,
    /// USPS state abbreviation; blank when missing.
    #[serde(default)]
    pub stab: Option<String>,
}

/// A cleaned crosswalk entry: the place a block belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPlaceLink {
    /// Block GEOID (unique across the cleaned crosswalk).
    pub block_2020: BlockId,
    /// Place GEOID.
    pub place_2020_id: PlaceId,
    /// Place name.
    #[serde(rename = "PlaceName")]
    pub place_name: Option<String>,
    /// USPS state abbreviation.
    pub stab: Option<StateAbbr>,
}

// ---------------------------------------------------------------------------
// Place level
// ---------------------------------------------------------------------------

/// Median of block AVMs within one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceValuation {
    /// Place GEOID.
    pub place_2020_id: PlaceId,
    /// Place name as given by the crosswalk.
    #[serde(rename = "PlaceName")]
    pub place_name: String,
    /// USPS state abbreviation.
    pub stab: StateAbbr,
    /// Median block AVM in dollars.
    pub avm_2023: f64,
}

/// Census median home value for one place (ACS table B25077).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceHomeValue {
    /// Place GEOID.
    pub place_2020_id: PlaceId,
    /// Median value of owner-occupied units; `None` when suppressed.
    pub place_home_value_census_2022: Option<f64>,
}

/// Census median household income for one CBSA (ACS table B19013).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CbsaIncome {
    /// CBSA code.
    pub cbsa_2020_id: CbsaId,
    /// Median household income; `None` when suppressed.
    pub cbsa_income_2022: Option<f64>,
}

// ---------------------------------------------------------------------------
// Boundaries
// ---------------------------------------------------------------------------

/// Attributes of a place boundary feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceAttributes {
    /// Place GEOID.
    pub place_2020_id: PlaceId,
    /// Legal/statistical area name (e.g. `"San Francisco city"`).
    pub place_name: String,
    /// USPS state abbreviation.
    pub state: StateAbbr,
}

/// A place polygon in WGS84 lon/lat.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceBoundary {
    /// Feature attributes.
    pub attributes: PlaceAttributes,
    /// Boundary geometry.
    pub geometry: MultiPolygon<f64>,
}

/// Attributes of a CBSA boundary feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CbsaAttributes {
    /// CBSA code.
    pub cbsa_2020_id: CbsaId,
    /// CBSA title (e.g. `"San Francisco-Oakland-Berkeley, CA"`).
    pub cbsa_name: String,
}

/// A CBSA polygon in WGS84 lon/lat.
#[derive(Debug, Clone, PartialEq)]
pub struct CbsaBoundary {
    /// Feature attributes.
    pub attributes: CbsaAttributes,
    /// Boundary geometry.
    pub geometry: MultiPolygon<f64>,
}

// ---------------------------------------------------------------------------
// Joined outputs
// ---------------------------------------------------------------------------

/// One place with its CBSA, valuations, income, and ratios.
///
/// Written (without geometry) as `map_data_income_avm_raw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMetrics {
    /// Place GEOID.
    pub place_2020_id: PlaceId,
    /// Place name from the boundary layer.
    pub place_name: String,
    /// USPS state abbreviation from the boundary layer.
    pub state: StateAbbr,
    /// CBSA the place was assigned to.
    pub cbsa_2020_id: CbsaId,
    /// CBSA title.
    pub cbsa_name: String,
    /// CBSA median household income.
    pub cbsa_median_income_2022: Option<f64>,
    /// Place name from the crosswalk.
    #[serde(rename = "PlaceName")]
    pub crosswalk_place_name: String,
    /// USPS state abbreviation from the crosswalk.
    pub stab: StateAbbr,
    /// Median block AVM.
    pub place_median_avm_2023: f64,
    /// Census median home value.
    pub place_home_value_census_2022: Option<f64>,
    /// AVM / CBSA income.
    pub avm_income_ratio: Option<f64>,
    /// Census home value / CBSA income.
    pub census_income_ratio: Option<f64>,
}

/// Display properties of one map feature.
///
/// Keys are the labels shown in the map's hover card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapProperties {
    #[serde(rename = "Place Name")]
    pub place_name: String,
    pub state: StateAbbr,
    #[serde(rename = "CBSA Name")]
    pub cbsa_name: String,
    #[serde(rename = "Median Household Income (CBSA)")]
    pub cbsa_median_income: Option<String>,
    #[serde(rename = "PlaceName")]
    pub crosswalk_place_name: String,
    pub stab: StateAbbr,
    #[serde(rename = "Median Home Value (Single Family)")]
    pub place_median_avm: Option<String>,
    pub place_home_value_census_2022: Option<f64>,
    #[serde(rename = "Home Value to Income Ratio")]
    pub avm_income_ratio: f64,
    pub census_income_ratio: Option<f64>,
    #[serde(rename = "Home Value to Income Ratio Category")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub home_inc_color: Option<String>,
}

/// A map-ready place: display properties plus the place polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature<'a> {
    /// Hover-card properties.
    pub properties: MapProperties,
    /// Place polygon, borrowed from the boundary layer.
    pub geometry: &'a MultiPolygon<f64>,
}
