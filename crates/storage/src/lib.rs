//! placeprep filesystem adapter.
//!
//! Implements [`pipeline::RawSource`] and [`pipeline::TidyStore`] over a data
//! directory laid out as described in [`layout`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File discovery, text encodings, CSV quoting, Census API
//! JSON, and GeoJSON all live here. The [`pipeline`] crate sees only the port
//! traits and [`pipeline::StoreError`].
//!
//! ## Formats
//!
//! | Dataset | Directory | Format |
//! |---------|-----------|--------|
//! | `us_block_data`, `xwalk_block_place` | intermed | CSV |
//! | `us_place_avm` | tidy | CSV, every text field quoted (ids included), numbers bare |
//! | `cbsa_income_2022`, `place_home_value_2022`, `map_data_income_avm_raw` | tidy | CSV |
//! | `us_place_2020`, `us_cbsa`, `map_data_income_avm` | tidy | GeoJSON |
//! | `run_manifest` | tidy | JSON |

pub mod layout;

mod geometry;
mod tabular;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pipeline::records::{
    BlockPlaceLink, BlockValuation, CbsaAttributes, CbsaBoundary, CbsaIncome, CrosswalkRow,
    MapFeature, PlaceAttributes, PlaceBoundary, PlaceHomeValue, PlaceMetrics, PlaceValuation,
};
use pipeline::{
    AcsTable, AcsTableKind, BoundaryFeature, BoundaryLayer, Dataset, RawSource, RunManifest,
    StoreError, TidyStore, Written,
};
use serde_json::Value;
use tracing::{debug, info};

pub use layout::{DataLayout, RawInputs};

use crate::tabular::{io_error, Field};

/// Datasets stored on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    layout: DataLayout,
}

impl FsStore {
    /// Creates a store over `layout`. Directories are created on first write.
    pub fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    /// The layout this store reads and writes.
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Path of a dataset written by the stages.
    pub fn dataset_path(&self, dataset: Dataset) -> PathBuf {
        let extension = match dataset {
            Dataset::UsPlace2020 | Dataset::UsCbsa | Dataset::MapDataIncomeAvm => "geojson",
            Dataset::RunManifest => "json",
            _ => "csv",
        };
        let dir = if dataset.is_intermediate() {
            self.layout.intermed_dir()
        } else {
            self.layout.tidy_dir()
        };
        dir.join(format!("{}.{extension}", dataset.file_stem()))
    }

    fn write_csv<T: serde::Serialize>(
        &self,
        dataset: Dataset,
        rows: &[T],
    ) -> Result<Written, StoreError> {
        let path = self.dataset_path(dataset);
        tabular::write_records(&path, rows)?;
        Ok(written(dataset, &path, rows.len()))
    }

    fn read_csv<T: serde::de::DeserializeOwned>(
        &self,
        dataset: Dataset,
    ) -> Result<Vec<T>, StoreError> {
        let path = self.dataset_path(dataset);
        if !path.exists() {
            return Err(StoreError::Missing {
                dataset: path.display().to_string(),
            });
        }
        tabular::read_records(&path)
    }

    fn tidy_features_path(&self, dataset: Dataset) -> Result<PathBuf, StoreError> {
        let path = self.dataset_path(dataset);
        if path.exists() {
            Ok(path)
        } else {
            Err(StoreError::Missing {
                dataset: path.display().to_string(),
            })
        }
    }
}

fn written(dataset: Dataset, path: &Path, rows: usize) -> Written {
    info!(dataset = %dataset, path = %path.display(), rows, "wrote dataset");
    Written {
        dataset,
        location: path.display().to_string(),
        rows,
    }
}

impl RawSource for FsStore {
    fn block_valuations(&self) -> Result<Vec<BlockValuation>, StoreError> {
        let path = self.layout.raw_file(&self.layout.inputs.block_avm);
        if !path.exists() {
            return Err(StoreError::NoInputs {
                dir: self.layout.raw_dir(),
                pattern: self.layout.inputs.block_avm.clone(),
            });
        }
        tabular::read_records(&path)
    }

    fn block_place_crosswalk(&self) -> Result<Vec<CrosswalkRow>, StoreError> {
        let prefix = &self.layout.inputs.crosswalk_prefix;
        let files = tabular::files_with_prefix(&self.layout.raw_dir(), prefix)?;
        let mut rows = Vec::new();
        for file in &files {
            let batch: Vec<CrosswalkRow> = tabular::read_labelled_latin1(file)?;
            debug!(file = %file.display(), rows = batch.len(), "read crosswalk batch");
            rows.extend(batch);
        }
        Ok(rows)
    }

    fn acs_table(&self, kind: AcsTableKind) -> Result<AcsTable, StoreError> {
        let name = match kind {
            AcsTableKind::CbsaMedianIncome => &self.layout.inputs.cbsa_income_acs,
            AcsTableKind::PlaceMedianHomeValue => &self.layout.inputs.place_home_value_acs,
        };
        let path = self.layout.raw_file(name);
        let text = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        let raw: Vec<Vec<Value>> = serde_json::from_str(&text).map_err(|e| StoreError::Decode {
            path: path.clone(),
            message: e.to_string(),
        })?;
        AcsTable::from_json_rows(kind.table_id(), raw).map_err(|e| StoreError::Decode {
            path,
            message: e.to_string(),
        })
    }

    fn boundary_features(&self, layer: BoundaryLayer) -> Result<Vec<BoundaryFeature>, StoreError> {
        let name = match layer {
            BoundaryLayer::Places => &self.layout.inputs.place_boundaries,
            BoundaryLayer::Cbsas => &self.layout.inputs.cbsa_boundaries,
        };
        geometry::read_features(&self.layout.raw_file(name))
    }
}

impl TidyStore for FsStore {
    fn write_block_valuations(&mut self, rows: &[BlockValuation]) -> Result<Written, StoreError> {
        self.write_csv(Dataset::UsBlockData, rows)
    }

    fn write_block_place_links(&mut self, rows: &[BlockPlaceLink]) -> Result<Written, StoreError> {
        self.write_csv(Dataset::XwalkBlockPlace, rows)
    }

    fn write_place_valuations(&mut self, rows: &[PlaceValuation]) -> Result<Written, StoreError> {
        let path = self.dataset_path(Dataset::UsPlaceAvm);
        let count = tabular::write_quoted_text(
            &path,
            &["place_2020_id", "PlaceName", "stab", "avm_2023"],
            rows.iter().map(|row| {
                vec![
                    Field::Text(row.place_2020_id.as_str()),
                    Field::Text(&row.place_name),
                    Field::Text(row.stab.as_str()),
                    Field::Number(row.avm_2023),
                ]
            }),
        )?;
        Ok(written(Dataset::UsPlaceAvm, &path, count))
    }

    fn read_place_valuations(&self) -> Result<Vec<PlaceValuation>, StoreError> {
        self.read_csv(Dataset::UsPlaceAvm)
    }

    fn write_cbsa_incomes(&mut self, rows: &[CbsaIncome]) -> Result<Written, StoreError> {
        self.write_csv(Dataset::CbsaIncome2022, rows)
    }

    fn read_cbsa_incomes(&self) -> Result<Vec<CbsaIncome>, StoreError> {
        self.read_csv(Dataset::CbsaIncome2022)
    }

    fn write_place_home_values(&mut self, rows: &[PlaceHomeValue]) -> Result<Written, StoreError> {
        self.write_csv(Dataset::PlaceHomeValue2022, rows)
    }

    fn read_place_home_values(&self) -> Result<Vec<PlaceHomeValue>, StoreError> {
        self.read_csv(Dataset::PlaceHomeValue2022)
    }

    fn write_place_boundaries(&mut self, rows: &[PlaceBoundary]) -> Result<Written, StoreError> {
        let path = self.dataset_path(Dataset::UsPlace2020);
        let features = rows.iter().map(|b| (&b.attributes, &b.geometry));
        let count = geometry::write_features(&path, features)?;
        Ok(written(Dataset::UsPlace2020, &path, count))
    }

    fn read_place_boundaries(&self) -> Result<Vec<PlaceBoundary>, StoreError> {
        let path = self.tidy_features_path(Dataset::UsPlace2020)?;
        Ok(geometry::read_typed_features::<PlaceAttributes>(&path)?
            .into_iter()
            .map(|(attributes, geometry)| PlaceBoundary {
                attributes,
                geometry,
            })
            .collect())
    }

    fn write_cbsa_boundaries(&mut self, rows: &[CbsaBoundary]) -> Result<Written, StoreError> {
        let path = self.dataset_path(Dataset::UsCbsa);
        let features = rows.iter().map(|b| (&b.attributes, &b.geometry));
        let count = geometry::write_features(&path, features)?;
        Ok(written(Dataset::UsCbsa, &path, count))
    }

    fn read_cbsa_boundaries(&self) -> Result<Vec<CbsaBoundary>, StoreError> {
        let path = self.tidy_features_path(Dataset::UsCbsa)?;
        Ok(geometry::read_typed_features::<CbsaAttributes>(&path)?
            .into_iter()
            .map(|(attributes, geometry)| CbsaBoundary {
                attributes,
                geometry,
            })
            .collect())
    }

    fn write_place_metrics(&mut self, rows: &[PlaceMetrics]) -> Result<Written, StoreError> {
        self.write_csv(Dataset::MapDataIncomeAvmRaw, rows)
    }

    fn write_map_features(&mut self, rows: &[MapFeature<'_>]) -> Result<Written, StoreError> {
        let path = self.dataset_path(Dataset::MapDataIncomeAvm);
        let features = rows.iter().map(|f| (&f.properties, f.geometry));
        let count = geometry::write_features(&path, features)?;
        Ok(written(Dataset::MapDataIncomeAvm, &path, count))
    }

    fn write_manifest(&mut self, manifest: &RunManifest) -> Result<Written, StoreError> {
        let path = self.dataset_path(Dataset::RunManifest);
        let dir = self.layout.tidy_dir();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        let file = File::create(&path).map_err(|e| io_error(&path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, manifest).map_err(|e| StoreError::Encode {
            path: path.clone(),
            message: e.to_string(),
        })?;
        writer.flush().map_err(|e| io_error(&path, e))?;
        Ok(written(Dataset::RunManifest, &path, manifest.stages.len()))
    }
}
