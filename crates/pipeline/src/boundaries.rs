//! Census cartographic boundary layers.
//!
//! Boundary files carry Census attribute names (`GEOID`, `NAMELSAD`,
//! `STUSPS`, `NAME`); these functions select the attributes the pipeline uses,
//! rename them to tidy column names, and sort features by id.

use geo::MultiPolygon;
use serde_json::{Map, Value};

use crate::records::{CbsaAttributes, CbsaBoundary, PlaceAttributes, PlaceBoundary};
use crate::{BoundaryLayer, CbsaId, PipelineError, PlaceId, StateAbbr};

/// A boundary feature as read from a layer: raw properties and polygons in
/// WGS84 lon/lat.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub properties: Map<String, Value>,
    pub geometry: MultiPolygon<f64>,
}

impl BoundaryFeature {
    fn text(&self, layer: BoundaryLayer, index: usize, key: &str) -> Result<String, PipelineError> {
        match self.properties.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(malformed(layer, index, format!("missing property '{key}'"))),
        }
    }
}

fn malformed(layer: BoundaryLayer, index: usize, message: String) -> PipelineError {
    PipelineError::MalformedFeature {
        layer: layer.as_str().to_owned(),
        index,
        message,
    }
}

/// Place boundaries: `GEOID` → `place_2020_id`, `NAMELSAD` → `place_name`,
/// `STUSPS` → `state`.
pub fn place_boundaries(
    features: Vec<BoundaryFeature>,
) -> Result<Vec<PlaceBoundary>, PipelineError> {
    let layer = BoundaryLayer::Places;
    let mut places = features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let geoid = feature.text(layer, index, "GEOID")?;
            let place_2020_id = PlaceId::new(geoid.as_str())
                .ok_or_else(|| malformed(layer, index, format!("bad GEOID {geoid:?}")))?;
            let place_name = feature.text(layer, index, "NAMELSAD")?;
            let stusps = feature.text(layer, index, "STUSPS")?;
            let state = StateAbbr::new(stusps.as_str())
                .ok_or_else(|| malformed(layer, index, format!("bad STUSPS {stusps:?}")))?;
            Ok(PlaceBoundary {
                attributes: PlaceAttributes {
                    place_2020_id,
                    place_name,
                    state,
                },
                geometry: feature.geometry,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    places.sort_by(|a, b| a.attributes.place_2020_id.cmp(&b.attributes.place_2020_id));
    Ok(places)
}

/// CBSA boundaries: `GEOID` → `cbsa_2020_id`, `NAME` → `cbsa_name`.
pub fn cbsa_boundaries(features: Vec<BoundaryFeature>) -> Result<Vec<CbsaBoundary>, PipelineError> {
    let layer = BoundaryLayer::Cbsas;
    let mut cbsas = features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let geoid = feature.text(layer, index, "GEOID")?;
            let cbsa_2020_id = CbsaId::new(geoid.as_str())
                .ok_or_else(|| malformed(layer, index, format!("bad GEOID {geoid:?}")))?;
            let cbsa_name = feature.text(layer, index, "NAME")?;
            Ok(CbsaBoundary {
                attributes: CbsaAttributes {
                    cbsa_2020_id,
                    cbsa_name,
                },
                geometry: feature.geometry,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    cbsas.sort_by(|a, b| a.attributes.cbsa_2020_id.cmp(&b.attributes.cbsa_2020_id));
    Ok(cbsas)
}
