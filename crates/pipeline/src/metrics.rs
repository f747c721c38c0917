//! Place metrics and map-ready features.

use std::collections::HashMap;

use geo::MultiPolygon;

use crate::records::{
    CbsaIncome, MapFeature, MapProperties, PlaceBoundary, PlaceHomeValue, PlaceMetrics,
    PlaceValuation,
};
use crate::spatial::CbsaAssignment;
use crate::{CbsaId, Dollars, PipelineSettings, PlaceId, RatioCategory, ValueToIncomeRatio};

/// A joined place row and the place polygon it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedPlace<'a> {
    pub metrics: PlaceMetrics,
    pub geometry: &'a MultiPolygon<f64>,
}

fn index_by<'a, K, T, F>(rows: &'a [T], key: F) -> HashMap<&'a K, Vec<&'a T>>
where
    K: Eq + std::hash::Hash + 'a,
    F: Fn(&'a T) -> &'a K,
{
    let mut index: HashMap<&K, Vec<&T>> = HashMap::new();
    for row in rows {
        index.entry(key(row)).or_default().push(row);
    }
    index
}

fn ratio(value: Option<f64>, income: Option<f64>) -> Option<f64> {
    ValueToIncomeRatio::between(value?, income?).map(ValueToIncomeRatio::as_f64)
}

/// Joins places to their CBSA income, AVM median, and census home value.
///
/// Every join is inner, applied in that order: places without a CBSA, or
/// whose CBSA, AVM, or census value is absent, are dropped. Duplicate keys in
/// the right-hand tables fan out. Output follows `places` order.
pub fn join_place_metrics<'a>(
    places: &'a [PlaceBoundary],
    assignments: &[CbsaAssignment],
    incomes: &[CbsaIncome],
    valuations: &[PlaceValuation],
    home_values: &[PlaceHomeValue],
) -> Vec<JoinedPlace<'a>> {
    let assigned: HashMap<&PlaceId, &CbsaAssignment> =
        assignments.iter().map(|a| (&a.place, a)).collect();
    let incomes: HashMap<&CbsaId, Vec<&CbsaIncome>> = index_by(incomes, |i| &i.cbsa_2020_id);
    let valuations: HashMap<&PlaceId, Vec<&PlaceValuation>> =
        index_by(valuations, |v| &v.place_2020_id);
    let home_values: HashMap<&PlaceId, Vec<&PlaceHomeValue>> =
        index_by(home_values, |h| &h.place_2020_id);

    let mut joined = Vec::new();
    for place in places {
        let id = &place.attributes.place_2020_id;
        let Some(cbsa) = assigned.get(id).and_then(|a| a.cbsa.as_ref()) else {
            continue;
        };
        let (Some(cbsa_incomes), Some(place_valuations), Some(place_home_values)) =
            (incomes.get(&cbsa.cbsa_2020_id), valuations.get(id), home_values.get(id))
        else {
            continue;
        };

        for income in cbsa_incomes {
            for valuation in place_valuations {
                for home_value in place_home_values {
                    let metrics = PlaceMetrics {
                        place_2020_id: id.clone(),
                        place_name: place.attributes.place_name.clone(),
                        state: place.attributes.state.clone(),
                        cbsa_2020_id: cbsa.cbsa_2020_id.clone(),
                        cbsa_name: cbsa.cbsa_name.clone(),
                        cbsa_median_income_2022: income.cbsa_income_2022,
                        crosswalk_place_name: valuation.place_name.clone(),
                        stab: valuation.stab.clone(),
                        place_median_avm_2023: valuation.avm_2023,
                        place_home_value_census_2022: home_value.place_home_value_census_2022,
                        avm_income_ratio: ratio(Some(valuation.avm_2023), income.cbsa_income_2022),
                        census_income_ratio: ratio(
                            home_value.place_home_value_census_2022,
                            income.cbsa_income_2022,
                        ),
                    };
                    joined.push(JoinedPlace {
                        metrics,
                        geometry: &place.geometry,
                    });
                }
            }
        }
    }
    joined
}

/// Builds map features from joined places.
///
/// Places without an AVM ratio are left off the map. The ratio is rounded to
/// one decimal place before it is binned; money columns become formatted
/// dollar strings.
pub fn map_features<'a>(
    joined: &[JoinedPlace<'a>],
    settings: &PipelineSettings,
) -> Vec<MapFeature<'a>> {
    joined
        .iter()
        .filter_map(|place| {
            let m = &place.metrics;
            let ratio = ValueToIncomeRatio::new(m.avm_income_ratio?)?.rounded(1);
            let category = RatioCategory::classify(ratio);
            let cbsa_name = match &settings.strip_cbsa_suffix {
                Some(suffix) => m.cbsa_name.replace(suffix.as_str(), ""),
                None => m.cbsa_name.clone(),
            };

            let properties = MapProperties {
                place_name: m.place_name.clone(),
                state: m.state.clone(),
                cbsa_name,
                cbsa_median_income: m
                    .cbsa_median_income_2022
                    .and_then(Dollars::new)
                    .map(Dollars::format_whole),
                crosswalk_place_name: m.crosswalk_place_name.clone(),
                stab: m.stab.clone(),
                place_median_avm: Dollars::new(m.place_median_avm_2023).map(Dollars::format_whole),
                place_home_value_census_2022: m.place_home_value_census_2022,
                avm_income_ratio: ratio.as_f64(),
                census_income_ratio: m.census_income_ratio,
                category: category.map(|c| c.label().to_owned()),
                home_inc_color: category
                    .filter(|_| settings.include_category_color)
                    .map(|c| c.color().to_owned()),
            };
            Some(MapFeature {
                properties,
                geometry: place.geometry,
            })
        })
        .collect()
}
