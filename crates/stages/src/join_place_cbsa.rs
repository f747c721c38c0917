//! Stage 4: spatial join, ratios, and map data.

use pipeline::metrics::{join_place_metrics, map_features};
use pipeline::records::PlaceMetrics;
use pipeline::spatial::assign_cbsas;
use pipeline::{PipelineError, PipelineSettings, RawSource, StageName, StageReport, TidyStore};
use tracing::{debug, info};

/// Assigns each place to a CBSA, joins incomes, AVM medians and census home
/// values, and writes the joined table and the map layer.
///
/// Reads only tidy outputs of the earlier stages. `rows_in` counts places;
/// `rows_out` counts map features.
pub fn run(
    _source: &dyn RawSource,
    store: &mut dyn TidyStore,
    settings: &PipelineSettings,
) -> Result<StageReport, PipelineError> {
    let places = store.read_place_boundaries()?;
    let cbsas = store.read_cbsa_boundaries()?;
    let incomes = store.read_cbsa_incomes()?;
    let valuations = store.read_place_valuations()?;
    let home_values = store.read_place_home_values()?;

    let assignments = assign_cbsas(&places, &cbsas, settings.join_predicate);
    let unassigned = assignments.iter().filter(|a| a.cbsa.is_none()).count();
    info!(
        places = places.len(),
        cbsas = cbsas.len(),
        unassigned,
        predicate = ?settings.join_predicate,
        "places assigned to CBSAs"
    );

    let joined = join_place_metrics(&places, &assignments, &incomes, &valuations, &home_values);
    let metrics: Vec<PlaceMetrics> = joined.iter().map(|j| j.metrics.clone()).collect();

    let features = map_features(&joined, settings);
    if features.len() < joined.len() {
        debug!(
            dropped = joined.len() - features.len(),
            "joined places without an AVM ratio"
        );
    }

    let outputs = vec![
        store.write_place_metrics(&metrics)?,
        store.write_map_features(&features)?,
    ];

    Ok(StageReport {
        stage: StageName::JoinPlaceCbsa,
        rows_in: places.len(),
        rows_out: features.len(),
        outputs,
    })
}
