//! Stage 1: block AVMs aggregated to places.

use pipeline::aggregate::{join_blocks_to_places, place_medians};
use pipeline::crosswalk::{check_state_coverage, clean_block_place};
use pipeline::{PipelineError, PipelineSettings, RawSource, StageName, StageReport, TidyStore};
use tracing::{debug, info};

/// Loads the block AVM export and the crosswalk batches, cleans the
/// crosswalk, checks its state coverage, writes both block-level
/// intermediates, and writes the median AVM of every place.
///
/// `rows_in` counts blocks; `rows_out` counts places.
pub fn run(
    source: &dyn RawSource,
    store: &mut dyn TidyStore,
    settings: &PipelineSettings,
) -> Result<StageReport, PipelineError> {
    let blocks = source.block_valuations()?;
    let crosswalk = source.block_place_crosswalk()?;
    info!(blocks = blocks.len(), crosswalk_rows = crosswalk.len(), "loaded block inputs");

    let links = clean_block_place(&crosswalk)?;
    let states = check_state_coverage(&links, settings.expected_state_count)?;
    info!(links = links.len(), states, "crosswalk cleaned");

    let mut outputs = vec![
        store.write_block_valuations(&blocks)?,
        store.write_block_place_links(&links)?,
    ];

    let joined = join_blocks_to_places(&blocks, &links);
    if joined.len() < blocks.len() {
        debug!(unmatched = blocks.len() - joined.len(), "blocks outside every place");
    }

    let places = place_medians(&joined)?;
    outputs.push(store.write_place_valuations(&places)?);

    Ok(StageReport {
        stage: StageName::AvmToPlace,
        rows_in: blocks.len(),
        rows_out: places.len(),
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use pipeline::{Dataset, PlaceId};

    use super::*;
    use crate::testing::{block, crosswalk_row, fixture_source, MemoryStore};

    fn one_state() -> PipelineSettings {
        PipelineSettings {
            expected_state_count: 1,
            ..PipelineSettings::default()
        }
    }

    #[test]
    fn writes_intermediates_and_place_medians() {
        let source = fixture_source();
        let mut store = MemoryStore::default();

        let report = run(&source, &mut store, &one_state()).unwrap();

        assert_eq!(report.rows_in, 4);
        assert_eq!(report.rows_out, 2);
        let datasets: Vec<_> = report.outputs.iter().map(|w| w.dataset).collect();
        assert_eq!(datasets, [Dataset::UsBlockData, Dataset::XwalkBlockPlace, Dataset::UsPlaceAvm]);

        let places = store.place_valuations.unwrap();
        assert_eq!(places[0].place_2020_id, PlaceId::new("0649670").unwrap());
        assert_eq!(places[0].avm_2023, 900_000.0);
        assert_eq!(places[1].place_name, "Sunnyvale city");
        assert_eq!(places[1].avm_2023, 700_000.0);
    }

    #[test]
    fn blocks_missing_from_the_crosswalk_are_dropped() {
        let mut source = fixture_source();
        source.blocks.push(block("069999999999999", Some(5_000_000.0)));
        let mut store = MemoryStore::default();

        let report = run(&source, &mut store, &one_state()).unwrap();

        assert_eq!(report.rows_in, 5);
        assert_eq!(store.block_valuations.unwrap().len(), 5);
        let places = store.place_valuations.unwrap();
        assert!(places.iter().all(|p| p.avm_2023 < 1_000_000.0));
    }

    #[test]
    fn a_place_id_under_two_names_fails_before_writing_medians() {
        let mut source = fixture_source();
        source.crosswalk[1] = crosswalk_row("06085", "5001.00", "1001", "77000", "Sunnyvale town");
        let mut store = MemoryStore::default();

        let err = run(&source, &mut store, &one_state()).unwrap_err();

        assert!(matches!(err, PipelineError::DuplicatePlace { .. }));
        assert!(store.block_place_links.is_some());
        assert!(store.place_valuations.is_none());
    }

    #[test]
    fn coverage_check_runs_before_any_write() {
        let source = fixture_source();
        let mut store = MemoryStore::default();
        let settings = PipelineSettings {
            expected_state_count: 2,
            ..PipelineSettings::default()
        };

        let err = run(&source, &mut store, &settings).unwrap_err();

        assert!(matches!(err, PipelineError::IncompleteStateCoverage { found: 1, expected: 2 }));
        assert!(store.block_valuations.is_none());
    }
}
