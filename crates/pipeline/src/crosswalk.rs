//! Block-to-place crosswalk cleaning.

use std::collections::{BTreeSet, HashSet};

use crate::records::{BlockPlaceLink, CrosswalkRow};
use crate::{
    BlockCode, BlockId, CountyFips, PipelineError, PlaceCode, PlaceId, StateAbbr, StateFips,
    TractCode,
};

fn malformed(row: usize, field: &'static str, value: &str) -> PipelineError {
    PipelineError::MalformedCrosswalkRow {
        row,
        field,
        value: value.to_owned(),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Validates crosswalk rows, composes block and place ids, and keeps only the
/// first row for each block.
///
/// Crosswalk exports list a block once per overlapping target geography; a
/// block belongs to at most one place, so later rows are duplicates. Rows are
/// validated up to the block id before deduplication, the place columns only
/// for rows that are kept.
pub fn clean_block_place(rows: &[CrosswalkRow]) -> Result<Vec<BlockPlaceLink>, PipelineError> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut links = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let n = index + 1;
        let county = CountyFips::new(row.county.trim())
            .ok_or_else(|| malformed(n, "county", &row.county))?;
        let tract = TractCode::parse_dotted(row.tract.trim())
            .ok_or_else(|| malformed(n, "tract", &row.tract))?;
        let block =
            BlockCode::new(row.block.trim()).ok_or_else(|| malformed(n, "block", &row.block))?;
        let block_id = BlockId::compose(&county, &tract, &block);

        if !seen.insert(block_id.clone()) {
            continue;
        }

        let state =
            StateFips::new(row.state.trim()).ok_or_else(|| malformed(n, "state", &row.state))?;
        let place =
            PlaceCode::new(row.place.trim()).ok_or_else(|| malformed(n, "place", &row.place))?;
        let stab = match non_blank(&row.stab) {
            Some(s) => Some(StateAbbr::new(s).ok_or_else(|| malformed(n, "stab", s))?),
            None => None,
        };

        links.push(BlockPlaceLink {
            block_2020: block_id,
            place_2020_id: PlaceId::compose(&state, &place),
            place_name: non_blank(&row.place_name).map(str::to_owned),
            stab,
        });
    }

    let dropped = rows.len() - links.len();
    if dropped > 0 {
        tracing::debug!(dropped, "dropped duplicate crosswalk blocks");
    }
    Ok(links)
}

/// Checks that the crosswalk covers at least `expected` distinct states,
/// counted from the state prefixes of the place ids, and returns the number
/// found.
pub fn check_state_coverage(
    links: &[BlockPlaceLink],
    expected: usize,
) -> Result<usize, PipelineError> {
    let states: BTreeSet<StateFips> = links.iter().map(|l| l.place_2020_id.state()).collect();
    let found = states.len();
    if found < expected {
        return Err(PipelineError::IncompleteStateCoverage { found, expected });
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(county: &str, tract: &str, block: &str, place: &str, name: &str) -> CrosswalkRow {
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

    #[test]
    fn composes_ids_from_components() {
        let rows = [row("06075", "0101.01", "1001", "67000", "San Francisco city")];

        let links = clean_block_place(&rows).unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].block_2020.as_str(), "060750101011001");
        assert_eq!(links[0].place_2020_id.as_str(), "0667000");
        assert_eq!(links[0].place_name.as_deref(), Some("San Francisco city"));
    }

    #[test]
    fn keeps_first_row_per_block() {
        let links = clean_block_place(&[
            row("06075", "0101.01", "1001", "67000", "first"),
            row("06075", "0101.01", "1001", "99999", "second"),
            row("06075", "0101.01", "1002", "67000", "other block"),
        ])
        .unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].place_name.as_deref(), Some("first"));
        assert_eq!(links[1].block_2020.as_str(), "060750101011002");
    }

    #[test]
    fn blank_name_and_abbreviation_become_missing() {
        let mut r = row("06075", "0101.01", "1001", "99999", "");
        r.stab = Some("  ".into());

        let links = clean_block_place(&[r]).unwrap();

        assert_eq!(links[0].place_name, None);
        assert_eq!(links[0].stab, None);
    }

    #[test]
    fn malformed_code_reports_row_and_field() {
        let err = clean_block_place(&[
            row("06075", "0101.01", "1001", "67000", "ok"),
            row("06075", "101.01", "1001", "67000", "short tract"),
        ])
        .unwrap_err();

        match err {
            PipelineError::MalformedCrosswalkRow { row, field, value } => {
                assert_eq!(row, 2);
                assert_eq!(field, "tract");
                assert_eq!(value, "101.01");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn coverage_counts_distinct_states() {
        let links = clean_block_place(&[
            row("06075", "0101.01", "1001", "67000", "a"),
            row("06001", "4001.00", "1000", "53000", "b"),
            row("41051", "0001.00", "1000", "59000", "c"),
        ])
        .unwrap();

        assert_eq!(check_state_coverage(&links, 2).unwrap(), 2);
        let err = check_state_coverage(&links, 52).unwrap_err();
        assert!(matches!(err, PipelineError::IncompleteStateCoverage { found: 2, expected: 52 }));
    }

    #[test]
    fn coverage_counts_place_states_not_block_states() {
        let mut border = row("06093", "0001.00", "1000", "59000", "Klamath Falls city");
        border.state = "41".into();
        let links = clean_block_place(&[
            row("06075", "0101.01", "1001", "67000", "San Francisco city"),
            border,
        ])
        .unwrap();

        assert_eq!(check_state_coverage(&links, 2).unwrap(), 2);
        assert!(links.iter().all(|l| l.block_2020.state().as_str() == "06"));
    }
}
