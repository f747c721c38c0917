//! placeprep stage orchestration.
//!
//! Each stage reads what it needs through [`pipeline::RawSource`] and
//! [`pipeline::TidyStore`], applies the domain functions of the [`pipeline`]
//! crate, writes its outputs, and returns a [`StageReport`].
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls between business logic in
//! the [`pipeline`] crate and the storage ports. They contain no domain rules
//! of their own.
//!
//! | Stage | Reads | Writes |
//! |-------|-------|--------|
//! | [`avm_to_place`] | AVMs, crosswalk | `us_block_data`, `xwalk_block_place`, `us_place_avm` |
//! | [`census_data`] | ACS B19013, B25077 | `cbsa_income_2022`, `place_home_value_2022` |
//! | [`census_geo`] | boundary layers | `us_place_2020`, `us_cbsa` |
//! | [`join_place_cbsa`] | tidy outputs | `map_data_income_avm_raw`, `map_data_income_avm` |

pub mod avm_to_place;
pub mod census_data;
pub mod census_geo;
pub mod join_place_cbsa;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Instant;

use pipeline::{PipelineError, PipelineSettings, RawSource, StageName, StageReport, TidyStore};
use tracing::{error, info, info_span};

/// A stage that failed, and the reports of the stages that completed before it.
#[derive(Debug, thiserror::Error)]
#[error("stage {stage} failed")]
pub struct StageFailure {
    pub stage: StageName,
    pub completed: Vec<StageReport>,
    #[source]
    pub error: PipelineError,
}

/// Runs one stage inside a `stage` span.
pub fn run_stage(
    stage: StageName,
    source: &dyn RawSource,
    store: &mut dyn TidyStore,
    settings: &PipelineSettings,
) -> Result<StageReport, PipelineError> {
    let span = info_span!("stage", stage = %stage);
    let _enter = span.enter();
    let started = Instant::now();

    let result = match stage {
        StageName::AvmToPlace => avm_to_place::run(source, store, settings),
        StageName::CensusData => census_data::run(source, store, settings),
        StageName::CensusGeo => census_geo::run(source, store, settings),
        StageName::JoinPlaceCbsa => join_place_cbsa::run(source, store, settings),
    };

    match &result {
        Ok(report) => info!(
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            outputs = report.outputs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stage complete"
        ),
        Err(e) => error!(error = %e, "stage failed"),
    }
    result
}

/// Runs `stages` in the given order, stopping at the first failure.
pub fn run_sequence(
    stages: &[StageName],
    source: &dyn RawSource,
    store: &mut dyn TidyStore,
    settings: &PipelineSettings,
) -> Result<Vec<StageReport>, StageFailure> {
    let mut completed = Vec::with_capacity(stages.len());
    for &stage in stages {
        match run_stage(stage, source, store, settings) {
            Ok(report) => completed.push(report),
            Err(error) => {
                return Err(StageFailure {
                    stage,
                    completed,
                    error,
                })
            }
        }
    }
    Ok(completed)
}

/// Runs all four stages in order.
pub fn run_all(
    source: &dyn RawSource,
    store: &mut dyn TidyStore,
    settings: &PipelineSettings,
) -> Result<Vec<StageReport>, StageFailure> {
    run_sequence(&StageName::ALL, source, store, settings)
}
