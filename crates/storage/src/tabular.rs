//! CSV reading and writing.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use pipeline::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn io_error(path: &Path, err: impl std::fmt::Display) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn csv_error(path: &Path, err: csv::Error) -> StoreError {
    if err.is_io_error() {
        io_error(path, err)
    } else {
        StoreError::Decode {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Reads every record of a headed CSV file. Columns not named by `T` are
/// ignored; surrounding whitespace is trimmed.
pub(crate) fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    reader
        .deserialize()
        .map(|record| record.map_err(|e| csv_error(path, e)))
        .collect()
}

/// Decodes ISO-8859-1 bytes. Every byte maps to the code point of the same
/// value, so decoding cannot fail.
pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Reads a Latin-1 CSV whose header line is followed by a line of column
/// labels, as produced by crosswalk export tools.
pub(crate) fn read_labelled_latin1<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    let text = decode_latin1(&bytes);

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(text.as_bytes());
    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();

    let mut rows = Vec::new();
    for record in reader.records().skip(1) {
        let record = record.map_err(|e| csv_error(path, e))?;
        rows.push(record.deserialize(Some(&headers)).map_err(|e| csv_error(path, e))?);
    }
    Ok(rows)
}

/// Lists files in `dir` whose names start with `prefix`, sorted by name.
pub(crate) fn files_with_prefix(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, StoreError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let entry = entry.map_err(|e| io_error(dir, e))?;
        let is_match = entry.file_name().to_str().is_some_and(|name| name.starts_with(prefix));
        if is_match && entry.path().is_file() {
            files.push(entry.path());
        }
    }
    if files.is_empty() {
        return Err(StoreError::NoInputs {
            dir: dir.to_path_buf(),
            pattern: format!("{prefix}*"),
        });
    }
    files.sort();
    Ok(files)
}

/// Writes `rows` as a headed CSV, creating parent directories. Fields are
/// quoted only where necessary.
pub(crate) fn write_records<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let mut writer = WriterBuilder::new().from_path(path).map_err(|e| csv_error(path, e))?;

    for row in rows {
        writer.serialize(row).map_err(|e| StoreError::Encode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    }
    writer.flush().map_err(|e| io_error(path, e))
}

/// A field for [`write_quoted_text`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Field<'a> {
    Text(&'a str),
    Number(f64),
}

impl Field<'_> {
    fn render(self) -> String {
        match self {
            Field::Text(text) => format!("\"{}\"", text.replace('"', "\"\"")),
            // Debug keeps the trailing `.0` on whole numbers.
            Field::Number(value) => format!("{value:?}"),
        }
    }
}

/// Writes a CSV in which every text field is quoted, digit-only ids included,
/// and numbers are left bare. The header is quoted.
pub(crate) fn write_quoted_text<'a, I>(
    path: &Path,
    header: &[&str],
    rows: I,
) -> Result<usize, StoreError>
where
    I: IntoIterator<Item = Vec<Field<'a>>>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let header: Vec<String> = header.iter().map(|name| Field::Text(name).render()).collect();
    writer.write_record(&header).map_err(|e| csv_error(path, e))?;

    let mut count = 0;
    for row in rows {
        let record: Vec<String> = row.into_iter().map(Field::render).collect();
        writer.write_record(&record).map_err(|e| csv_error(path, e))?;
        count += 1;
    }
    writer.flush().map_err(|e| io_error(path, e))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use tempfile::TempDir;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        value: Option<f64>,
    }

    #[test]
    fn latin1_bytes_decode_to_matching_code_points() {
        assert_eq!(decode_latin1(b"Espa\xf1ola"), "Española");
    }

    #[test]
    fn labelled_file_skips_label_line_and_ignores_extra_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("geocorr2022_batch1.csv");
        fs::write(
            &path,
            b"id,value,extra\n\"Identifier\",\"Value\",\"Extra\"\n0601,1.5,x\nA\xf1o,,y\n",
        )
        .unwrap();

        let rows: Vec<Row> = read_labelled_latin1(&path).unwrap();

        assert_eq!(
            rows,
            [
                Row {
                    id: "0601".into(),
                    value: Some(1.5),
                },
                Row {
                    id: "Año".into(),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn prefix_listing_is_sorted_and_requires_a_match() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("geocorr2022_b.csv"), "").unwrap();
        fs::write(dir.path().join("geocorr2022_a.csv"), "").unwrap();
        fs::write(dir.path().join("other.csv"), "").unwrap();

        let files = files_with_prefix(dir.path(), "geocorr2022").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["geocorr2022_a.csv", "geocorr2022_b.csv"]);

        let err = files_with_prefix(dir.path(), "missing").unwrap_err();
        assert!(matches!(err, StoreError::NoInputs { .. }));
    }

    #[test]
    fn written_records_create_directories_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        write_records(
            &path,
            &[Row {
                id: "Acton, CDP".into(),
                value: Some(2.5),
            }],
        )
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "id,value\n\"Acton, CDP\",2.5\n");
        let back: Vec<Row> = read_records(&path).unwrap();
        assert_eq!(back[0].value, Some(2.5));
    }

    #[test]
    fn quoted_text_quotes_digit_only_ids_and_escapes_quotes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("places.csv");

        let count = write_quoted_text(
            &path,
            &["id", "name", "value"],
            [vec![
                Field::Text("0649670"),
                Field::Text("The \"Heights\", CDP"),
                Field::Number(900_000.0),
            ]],
        )
        .unwrap();

        assert_eq!(count, 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "\"id\",\"name\",\"value\"\n\"0649670\",\"The \"\"Heights\"\", CDP\",900000.0\n"
        );
        let back: Vec<(String, String, f64)> = read_records(&path).unwrap();
        assert_eq!(back, [("0649670".to_owned(), "The \"Heights\", CDP".to_owned(), 900_000.0)]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_records::<Row>(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn bad_value_is_a_decode_error_with_position() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "id,value\na,1\nb,not-a-number\n").unwrap();

        let err = read_records::<Row>(&path).unwrap_err();

        match err {
            StoreError::Decode { message, .. } => assert!(message.contains("line: 3"), "{message}"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
