//! Block → place aggregation.

use std::collections::{BTreeMap, HashMap};

use crate::records::{BlockPlaceLink, BlockValuation, PlaceValuation};
use crate::{BlockId, PipelineError, PlaceId, StateAbbr};

/// Median of the finite values; `None` when there are none.
///
/// Even-length inputs average the two middle values.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut v: Vec<f64> = values.into_iter().filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Some(v[mid])
    } else {
        Some((v[mid - 1] + v[mid]) / 2.0)
    }
}

/// A block valuation matched to its place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedBlock<'a> {
    pub valuation: &'a BlockValuation,
    pub link: &'a BlockPlaceLink,
}

/// Inner join of block valuations to the cleaned crosswalk on block id.
///
/// Output follows the order of `blocks`; blocks without a crosswalk entry are
/// dropped.
pub fn join_blocks_to_places<'a>(
    blocks: &'a [BlockValuation],
    links: &'a [BlockPlaceLink],
) -> Vec<PlacedBlock<'a>> {
    let by_block: HashMap<&BlockId, &BlockPlaceLink> =
        links.iter().map(|l| (&l.block_2020, l)).collect();

    blocks
        .iter()
        .filter_map(|valuation| {
            by_block.get(&valuation.block_2020).map(|link| PlacedBlock { valuation, link })
        })
        .collect()
}

/// Median block AVM per place.
///
/// Groups by (place id, place name, state abbreviation); rows missing the
/// name or abbreviation take no part. A place id appearing under two groups
/// is an error. Places with no valued block are dropped. Output is sorted by
/// place id.
pub fn place_medians(joined: &[PlacedBlock<'_>]) -> Result<Vec<PlaceValuation>, PipelineError> {
    let mut groups: BTreeMap<(&PlaceId, &str, &StateAbbr), Vec<f64>> = BTreeMap::new();

    for row in joined {
        let (Some(name), Some(stab)) = (row.link.place_name.as_deref(), row.link.stab.as_ref())
        else {
            continue;
        };
        let values = groups.entry((&row.link.place_2020_id, name, stab)).or_default();
        if let Some(avm) = row.valuation.avm_2023 {
            values.push(avm);
        }
    }

    let mut previous: Option<&PlaceId> = None;
    for (place, _, _) in groups.keys() {
        if previous == Some(*place) {
            return Err(PipelineError::DuplicatePlace {
                place: (*place).clone(),
            });
        }
        previous = Some(*place);
    }

    let total = groups.len();
    let places: Vec<PlaceValuation> = groups
        .into_iter()
        .filter_map(|((place, name, stab), values)| {
            median(values).map(|avm_2023| PlaceValuation {
                place_2020_id: place.clone(),
                place_name: name.to_owned(),
                stab: stab.clone(),
                avm_2023,
            })
        })
        .collect();

    if places.len() < total {
        tracing::debug!(dropped = total - places.len(), "dropped places without any block AVM");
    }
    Ok(places)
}
