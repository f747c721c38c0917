//! Stage 3: place and CBSA boundary layers.

use pipeline::boundaries::{cbsa_boundaries, place_boundaries};
use pipeline::{
    BoundaryLayer, PipelineError, PipelineSettings, RawSource, StageName, StageReport, TidyStore,
};
use tracing::info;

/// Normalises the place and CBSA cartographic boundary layers and writes them
/// sorted by id.
pub fn run(
    source: &dyn RawSource,
    store: &mut dyn TidyStore,
    _settings: &PipelineSettings,
) -> Result<StageReport, PipelineError> {
    let place_features = source.boundary_features(BoundaryLayer::Places)?;
    let cbsa_features = source.boundary_features(BoundaryLayer::Cbsas)?;
    let rows_in = place_features.len() + cbsa_features.len();

    let places = place_boundaries(place_features)?;
    let cbsas = cbsa_boundaries(cbsa_features)?;
    info!(places = places.len(), cbsas = cbsas.len(), "boundary layers normalised");

    let outputs = vec![
        store.write_place_boundaries(&places)?,
        store.write_cbsa_boundaries(&cbsas)?,
    ];

    Ok(StageReport {
        stage: StageName::CensusGeo,
        rows_in,
        rows_out: places.len() + cbsas.len(),
        outputs,
    })
}
