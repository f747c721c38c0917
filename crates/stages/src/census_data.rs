//! Stage 2: ACS income and home value tables.

use pipeline::acs::{cbsa_incomes, place_home_values};
use pipeline::{
    AcsTableKind, PipelineError, PipelineSettings, RawSource, StageName, StageReport, TidyStore,
};
use tracing::info;

/// Parses the B19013 (CBSA median household income) and B25077 (place median
/// home value) responses and writes one tidy table for each.
pub fn run(
    source: &dyn RawSource,
    store: &mut dyn TidyStore,
    _settings: &PipelineSettings,
) -> Result<StageReport, PipelineError> {
    let income_table = source.acs_table(AcsTableKind::CbsaMedianIncome)?;
    let incomes = cbsa_incomes(&income_table)?;
    let suppressed = incomes.iter().filter(|i| i.cbsa_income_2022.is_none()).count();
    info!(
        table = income_table.name(),
        cbsas = incomes.len(),
        suppressed,
        "parsed income table"
    );

    let value_table = source.acs_table(AcsTableKind::PlaceMedianHomeValue)?;
    let home_values = place_home_values(&value_table)?;
    let suppressed = home_values
        .iter()
        .filter(|h| h.place_home_value_census_2022.is_none())
        .count();
    info!(
        table = value_table.name(),
        places = home_values.len(),
        suppressed,
        "parsed home value table"
    );

    let outputs = vec![
        store.write_cbsa_incomes(&incomes)?,
        store.write_place_home_values(&home_values)?,
    ];

    Ok(StageReport {
        stage: StageName::CensusData,
        rows_in: income_table.len() + value_table.len(),
        rows_out: incomes.len() + home_values.len(),
        outputs,
    })
}
