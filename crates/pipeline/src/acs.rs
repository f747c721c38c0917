//! American Community Survey tables as returned by the Census Data API.
//!
//! The API answers `get=group(<table>)` queries with a JSON array of arrays:
//! the first inner array is the header, every other array one geography.
//! Values are strings or null. Estimates use large negative "jam values"
//! (e.g. `-666666666`) for suppressed or unavailable cells.

use serde_json::Value;

use crate::records::{CbsaIncome, PlaceHomeValue};
use crate::{CbsaId, PipelineError, PlaceId};

/// A parsed ACS table: lower-cased column names and text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcsTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn cell_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl AcsTable {
    /// Builds a table from the API's array-of-arrays response.
    ///
    /// Fails when the response is empty or a row's width differs from the
    /// header's.
    pub fn from_json_rows(name: &str, raw: Vec<Vec<Value>>) -> Result<Self, PipelineError> {
        let mut rows = raw.into_iter();
        let header = rows.next().ok_or_else(|| PipelineError::MalformedRow {
            table: name.to_owned(),
            row: 0,
            message: "response has no header row".into(),
        })?;
        let columns: Vec<String> =
            header.into_iter().map(|v| cell_text(v).to_lowercase()).collect();

        let mut parsed = Vec::new();
        for (index, row) in rows.enumerate() {
            if row.len() != columns.len() {
                return Err(PipelineError::MalformedRow {
                    table: name.to_owned(),
                    row: index + 1,
                    message: format!("{} cells, header has {}", row.len(), columns.len()),
                });
            }
            parsed.push(row.into_iter().map(cell_text).collect());
        }

        Ok(Self {
            name: name.to_owned(),
            columns,
            rows: parsed,
        })
    }

    /// Table name (e.g. `"B19013"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, column: &str) -> Result<usize, PipelineError> {
        self.columns.iter().position(|c| c == column).ok_or_else(|| PipelineError::MissingColumn {
            table: self.name.clone(),
            column: column.to_owned(),
        })
    }

    fn malformed(&self, row: usize, message: String) -> PipelineError {
        PipelineError::MalformedRow {
            table: self.name.clone(),
            row,
            message,
        }
    }
}

/// Parses an ACS estimate. Blank cells and negative jam values are missing.
pub fn parse_estimate(raw: &str) -> Option<f64> {
    let v: f64 = raw.trim().parse().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}

/// The trailing `n` characters of a `GEO_ID` (e.g. `"310M600US10180"` → `"10180"`).
pub fn geo_id_suffix(geo_id: &str, n: usize) -> Option<&str> {
    let start = geo_id.len().checked_sub(n)?;
    geo_id.get(start..)
}

/// CBSA median household income from table B19013.
///
/// `geo_id` supplies the CBSA code, `b19013_001e` the estimate.
pub fn cbsa_incomes(table: &AcsTable) -> Result<Vec<CbsaIncome>, PipelineError> {
    let geo = table.column("geo_id")?;
    let estimate = table.column("b19013_001e")?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let id = geo_id_suffix(&row[geo], CbsaId::WIDTH)
                .and_then(CbsaId::new)
                .ok_or_else(|| {
                    table.malformed(index + 1, format!("bad CBSA GEO_ID {:?}", row[geo]))
                })?;
            Ok(CbsaIncome {
                cbsa_2020_id: id,
                cbsa_income_2022: parse_estimate(&row[estimate]),
            })
        })
        .collect()
}

/// Place median home value from table B25077.
///
/// `geo_id` supplies the place GEOID, `b25077_001e` the estimate.
pub fn place_home_values(table: &AcsTable) -> Result<Vec<PlaceHomeValue>, PipelineError> {
    let geo = table.column("geo_id")?;
    let estimate = table.column("b25077_001e")?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let id = geo_id_suffix(&row[geo], PlaceId::WIDTH)
                .and_then(PlaceId::new)
                .ok_or_else(|| {
                    table.malformed(index + 1, format!("bad place GEO_ID {:?}", row[geo]))
                })?;
            Ok(PlaceHomeValue {
                place_2020_id: id,
                place_home_value_census_2022: parse_estimate(&row[estimate]),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn table(name: &str, value: Value) -> AcsTable {
        let raw: Vec<Vec<Value>> = serde_json::from_value(value).unwrap();
        AcsTable::from_json_rows(name, raw).unwrap()
    }

    #[test]
    fn header_is_lower_cased() {
        let t = table(
            "B19013",
            json!([
                ["GEO_ID", "B19013_001E", "NAME"],
                ["310M600US10180", "55000", "Abilene, TX Metro Area"]
            ]),
        );
        assert_eq!(t.columns(), ["geo_id", "b19013_001e", "name"]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn cbsa_income_uses_last_five_geo_id_characters() {
        let t = table(
            "B19013",
            json!([
                ["GEO_ID", "B19013_001E"],
                ["310M600US10180", "58712"],
                ["310M600US41860", null],
                ["310M600US99999", "-666666666"]
            ]),
        );

        let incomes = cbsa_incomes(&t).unwrap();

        assert_eq!(incomes[0].cbsa_2020_id.as_str(), "10180");
        assert_eq!(incomes[0].cbsa_income_2022, Some(58712.0));
        assert_eq!(incomes[1].cbsa_income_2022, None);
        assert_eq!(incomes[2].cbsa_income_2022, None);
    }

    #[test]
    fn place_home_value_uses_last_seven_geo_id_characters() {
        let t = table("B25077", json!([["GEO_ID", "B25077_001E"], ["1600000US0100124", "187300"]]));

        let values = place_home_values(&t).unwrap();

        assert_eq!(values[0].place_2020_id.as_str(), "0100124");
        assert_eq!(values[0].place_home_value_census_2022, Some(187300.0));
    }

    #[test]
    fn missing_estimate_column_is_reported() {
        let t = table(
            "B25077",
            json!([["GEO_ID", "NAME"], ["1600000US0100124", "Abbeville city"]]),
        );

        let err = place_home_values(&t).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::MissingColumn { column, .. } if column == "b25077_001e"
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let raw: Vec<Vec<Value>> =
            serde_json::from_value(json!([["GEO_ID", "X"], ["only one"]])).unwrap();
        let err = AcsTable::from_json_rows("B19013", raw).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRow { row: 1, .. }));
    }

    #[test]
    fn short_geo_id_is_malformed() {
        let t = table("B19013", json!([["GEO_ID", "B19013_001E"], ["1018", "1"]]));
        assert!(cbsa_incomes(&t).is_err());
    }

    #[test]
    fn estimates_parse_leniently() {
        assert_eq!(parse_estimate(" 1250 "), Some(1250.0));
        assert_eq!(parse_estimate(""), None);
        assert_eq!(parse_estimate("-999999999"), None);
        assert_eq!(parse_estimate("N"), None);
    }
}
