//! GeoJSON feature collections.
//!
//! Polygons are promoted to single-member multipolygons on read so that every
//! boundary in the domain has one geometry type. Other geometry types are
//! rejected.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use geo::{Geometry, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use pipeline::{BoundaryFeature, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::tabular::io_error;

fn decode_error(path: &Path, message: impl std::fmt::Display) -> StoreError {
    StoreError::Decode {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn encode_error(path: &Path, message: impl std::fmt::Display) -> StoreError {
    StoreError::Encode {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn to_multi_polygon(
    path: &Path,
    index: usize,
    feature: Feature,
) -> Result<MultiPolygon<f64>, StoreError> {
    let geometry = feature
        .geometry
        .ok_or_else(|| decode_error(path, format!("feature {index} has no geometry")))?;
    match Geometry::<f64>::try_from(geometry) {
        Ok(Geometry::MultiPolygon(mp)) => Ok(mp),
        Ok(Geometry::Polygon(p)) => Ok(MultiPolygon::new(vec![p])),
        Ok(_) => Err(decode_error(path, format!("feature {index} is not a polygon"))),
        Err(e) => Err(decode_error(path, format!("feature {index}: {e}"))),
    }
}

/// Reads a feature collection's properties and polygons.
pub(crate) fn read_features(path: &Path) -> Result<Vec<BoundaryFeature>, StoreError> {
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let geojson: GeoJson = text.parse().map_err(|e| decode_error(path, e))?;
    let collection = FeatureCollection::try_from(geojson).map_err(|e| decode_error(path, e))?;

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, mut feature)| {
            let properties = feature.properties.take().unwrap_or_default();
            let geometry = to_multi_polygon(path, index, feature)?;
            Ok(BoundaryFeature {
                properties,
                geometry,
            })
        })
        .collect()
}

/// Reads a feature collection, deserialising each feature's properties as `P`.
pub(crate) fn read_typed_features<P: DeserializeOwned>(
    path: &Path,
) -> Result<Vec<(P, MultiPolygon<f64>)>, StoreError> {
    read_features(path)?
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let props = serde_json::from_value(Value::Object(feature.properties))
                .map_err(|e| decode_error(path, format!("feature {index}: {e}")))?;
            Ok((props, feature.geometry))
        })
        .collect()
}

/// Writes `(properties, geometry)` pairs as a feature collection, creating
/// parent directories. Properties must serialise to a JSON object.
pub(crate) fn write_features<'a, P, I>(path: &Path, rows: I) -> Result<usize, StoreError>
where
    P: Serialize + 'a,
    I: IntoIterator<Item = (&'a P, &'a MultiPolygon<f64>)>,
{
    let mut features = Vec::new();
    for (props, geometry) in rows {
        let value = serde_json::to_value(props).map_err(|e| encode_error(path, e))?;
        let properties: JsonObject = match value {
            Value::Object(map) => map,
            other => {
                return Err(encode_error(path, format!("properties are not an object: {other}")))
            }
        };
        features.push(Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }
    let count = features.len();
    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &collection).map_err(|e| encode_error(path, e))?;
    writer.flush().map_err(|e| io_error(path, e))?;
    Ok(count)
}
