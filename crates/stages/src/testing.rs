//! In-memory ports and a small fixture refresh for stage tests.
//!
//! The fixture covers one state (06) with two places: Sunnyvale, inside the
//! San Jose CBSA, and Mountain View, drawn far outside every CBSA so the
//! spatial join drops it.

use geo::{polygon, MultiPolygon};
use pipeline::records::{
    BlockPlaceLink, BlockValuation, CbsaBoundary, CbsaIncome, CrosswalkRow, MapFeature,
    MapProperties, PlaceBoundary, PlaceHomeValue, PlaceMetrics, PlaceValuation,
};
use pipeline::{
    AcsTable, AcsTableKind, BlockId, BoundaryFeature, BoundaryLayer, Dataset, RawSource,
    RunManifest, StoreError, TidyStore, Written,
};
use serde_json::{json, Value};

pub(crate) fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x0, y: y0),
        (x: x1, y: y0),
        (x: x1, y: y1),
        (x: x0, y: y1),
    ]])
}

fn feature(properties: Value, geometry: MultiPolygon<f64>) -> BoundaryFeature {
    let Value::Object(properties) = properties else {
        panic!("feature properties must be an object");
    };
    BoundaryFeature {
        properties,
        geometry,
    }
}

pub(crate) fn crosswalk_row(
    county: &str,
    tract: &str,
    block: &str,
    place: &str,
    name: &str,
) -> CrosswalkRow {
    CrosswalkRow {
        county: county.into(),
        tract: tract.into(),
        block: block.into(),
        place: place.into(),
        state: county[..2].into(),
        place_name: Some(name.into()),
        stab: Some("CA".into()),
    }
}

pub(crate) fn block(id: &str, avm: Option<f64>) -> BlockValuation {
    BlockValuation {
        block_2020: BlockId::new(id).unwrap(),
        avm_2023: avm,
    }
}

/// Raw inputs held in memory.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemorySource {
    pub blocks: Vec<BlockValuation>,
    pub crosswalk: Vec<CrosswalkRow>,
    pub cbsa_income: Vec<Vec<Value>>,
    pub place_home_value: Vec<Vec<Value>>,
    pub places: Vec<BoundaryFeature>,
    pub cbsas: Vec<BoundaryFeature>,
}

pub(crate) fn fixture_source() -> MemorySource {
    MemorySource {
        blocks: vec![
            block("060855001001000", Some(600_000.0)),
            block("060855001001001", Some(800_000.0)),
            block("060855001001002", Some(900_000.0)),
            block("060855001001003", None),
        ],
        crosswalk: vec![
            crosswalk_row("06085", "5001.00", "1000", "77000", "Sunnyvale city"),
            crosswalk_row("06085", "5001.00", "1001", "77000", "Sunnyvale city"),
            crosswalk_row("06085", "5001.00", "1002", "49670", "Mountain View city"),
            crosswalk_row("06085", "5001.00", "1003", "49670", "Mountain View city"),
        ],
        cbsa_income: vec![
            vec![json!("GEO_ID"), json!("B19013_001E"), json!("NAME")],
            vec![
                json!("310M600US41940"),
                json!("140000"),
                json!("San Jose-Sunnyvale-Santa Clara, CA Metro Area"),
            ],
        ],
        place_home_value: vec![
            vec![json!("GEO_ID"), json!("B25077_001E"), json!("NAME")],
            vec![
                json!("1600000US0677000"),
                json!("1500000"),
                json!("Sunnyvale city, California"),
            ],
            vec![
                json!("1600000US0649670"),
                json!("1800000"),
                json!("Mountain View city, California"),
            ],
        ],
        places: vec![
            feature(
                json!({"GEOID": "0677000", "NAMELSAD": "Sunnyvale city", "STUSPS": "CA"}),
                square(-122.1, 37.3, -122.0, 37.4),
            ),
            feature(
                json!({"GEOID": "0649670", "NAMELSAD": "Mountain View city", "STUSPS": "CA"}),
                square(-100.0, 40.0, -99.0, 41.0),
            ),
        ],
        cbsas: vec![feature(
            json!({"GEOID": "41940", "NAME": "San Jose-Sunnyvale-Santa Clara, CA"}),
            square(-123.0, 37.0, -121.0, 38.0),
        )],
    }
}

impl RawSource for MemorySource {
    fn block_valuations(&self) -> Result<Vec<BlockValuation>, StoreError> {
        Ok(self.blocks.clone())
    }

    fn block_place_crosswalk(&self) -> Result<Vec<CrosswalkRow>, StoreError> {
        Ok(self.crosswalk.clone())
    }

    fn acs_table(&self, kind: AcsTableKind) -> Result<AcsTable, StoreError> {
        let raw = match kind {
            AcsTableKind::CbsaMedianIncome => self.cbsa_income.clone(),
            AcsTableKind::PlaceMedianHomeValue => self.place_home_value.clone(),
        };
        AcsTable::from_json_rows(kind.table_id(), raw).map_err(|e| StoreError::Decode {
            path: kind.table_id().into(),
            message: e.to_string(),
        })
    }

    fn boundary_features(&self, layer: BoundaryLayer) -> Result<Vec<BoundaryFeature>, StoreError> {
        Ok(match layer {
            BoundaryLayer::Places => self.places.clone(),
            BoundaryLayer::Cbsas => self.cbsas.clone(),
        })
    }
}

/// Datasets held in memory. `None` means never written.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    pub block_valuations: Option<Vec<BlockValuation>>,
    pub block_place_links: Option<Vec<BlockPlaceLink>>,
    pub place_valuations: Option<Vec<PlaceValuation>>,
    pub cbsa_incomes: Option<Vec<CbsaIncome>>,
    pub place_home_values: Option<Vec<PlaceHomeValue>>,
    pub place_boundaries: Option<Vec<PlaceBoundary>>,
    pub cbsa_boundaries: Option<Vec<CbsaBoundary>>,
    pub place_metrics: Option<Vec<PlaceMetrics>>,
    pub map_features: Vec<(MapProperties, MultiPolygon<f64>)>,
    pub manifest: Option<RunManifest>,
}

fn keep<T: Clone>(slot: &mut Option<Vec<T>>, dataset: Dataset, rows: &[T]) -> Written {
    *slot = Some(rows.to_vec());
    Written {
        dataset,
        location: format!("memory://{dataset}"),
        rows: rows.len(),
    }
}

fn load<T: Clone>(slot: &Option<Vec<T>>, dataset: Dataset) -> Result<Vec<T>, StoreError> {
    slot.clone().ok_or_else(|| StoreError::Missing {
        dataset: dataset.to_string(),
    })
}

impl TidyStore for MemoryStore {
    fn write_block_valuations(&mut self, rows: &[BlockValuation]) -> Result<Written, StoreError> {
        Ok(keep(&mut self.block_valuations, Dataset::UsBlockData, rows))
    }

    fn write_block_place_links(&mut self, rows: &[BlockPlaceLink]) -> Result<Written, StoreError> {
        Ok(keep(&mut self.block_place_links, Dataset::XwalkBlockPlace, rows))
    }

    fn write_place_valuations(&mut self, rows: &[PlaceValuation]) -> Result<Written, StoreError> {
        Ok(keep(&mut self.place_valuations, Dataset::UsPlaceAvm, rows))
    }

    fn read_place_valuations(&self) -> Result<Vec<PlaceValuation>, StoreError> {
        load(&self.place_valuations, Dataset::UsPlaceAvm)
    }

    fn write_cbsa_incomes(&mut self, rows: &[CbsaIncome]) -> Result<Written, StoreError> {
        Ok(keep(&mut self.cbsa_incomes, Dataset::CbsaIncome2022, rows))
    }

    fn read_cbsa_incomes(&self) -> Result<Vec<CbsaIncome>, StoreError> {
        load(&self.cbsa_incomes, Dataset::CbsaIncome2022)
    }

    fn write_place_home_values(&mut self, rows: &[PlaceHomeValue]) -> Result<Written, StoreError> {
        Ok(keep(&mut self.place_home_values, Dataset::PlaceHomeValue2022, rows))
    }

    fn read_place_home_values(&self) -> Result<Vec<PlaceHomeValue>, StoreError> {
        load(&self.place_home_values, Dataset::PlaceHomeValue2022)
    }

    fn write_place_boundaries(&mut self, rows: &[PlaceBoundary]) -> Result<Written, StoreError> {
        Ok(keep(&mut self.place_boundaries, Dataset::UsPlace2020, rows))
    }

    fn read_place_boundaries(&self) -> Result<Vec<PlaceBoundary>, StoreError> {
        load(&self.place_boundaries, Dataset::UsPlace2020)
    }

    fn write_cbsa_boundaries(&mut self, rows: &[CbsaBoundary]) -> Result<Written, StoreError> {
        Ok(keep(&mut self.cbsa_boundaries, Dataset::UsCbsa, rows))
    }

    fn read_cbsa_boundaries(&self) -> Result<Vec<CbsaBoundary>, StoreError> {
        load(&self.cbsa_boundaries, Dataset::UsCbsa)
    }

    fn write_place_metrics(&mut self, rows: &[PlaceMetrics]) -> Result<Written, StoreError> {
        Ok(keep(&mut self.place_metrics, Dataset::MapDataIncomeAvmRaw, rows))
    }

    fn write_map_features(&mut self, rows: &[MapFeature<'_>]) -> Result<Written, StoreError> {
        self.map_features = rows
            .iter()
            .map(|f| (f.properties.clone(), f.geometry.clone()))
            .collect();
        Ok(Written {
            dataset: Dataset::MapDataIncomeAvm,
            location: format!("memory://{}", Dataset::MapDataIncomeAvm),
            rows: rows.len(),
        })
    }

    fn write_manifest(&mut self, manifest: &RunManifest) -> Result<Written, StoreError> {
        self.manifest = Some(manifest.clone());
        Ok(Written {
            dataset: Dataset::RunManifest,
            location: format!("memory://{}", Dataset::RunManifest),
            rows: manifest.stages.len(),
        })
    }
}
