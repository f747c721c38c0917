//! Error types for the placeprep domain.
//!
//! [`PipelineError`] covers every condition that halts a stage: malformed
//! input rows, failed coverage and uniqueness assertions, invalid settings.
//! Storage failures reach the domain as [`StoreError`], which infrastructure
//! crates construct from their own I/O and codec errors so that the domain
//! never depends on those types.

use std::path::PathBuf;

use thiserror::Error;

use crate::PlaceId;

// ---------------------------------------------------------------------------
// Identifier validation
// ---------------------------------------------------------------------------

/// A string that is not a well-formed geographic code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind}: {value:?}")]
pub struct InvalidIdentifier {
    /// Name of the identifier type that rejected the value.
    pub kind: &'static str,
    /// The rejected value.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Failures reading or writing a dataset.
///
/// Produced by implementations of [`crate::RawSource`] and [`crate::TidyStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file could not be opened, read, created, or written.
    #[error("I/O error on '{}': {message}", .path.display())]
    Io {
        /// File or directory the operation targeted.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },

    /// The file was read but its content could not be decoded.
    ///
    /// `message` includes the record or line position where available.
    #[error("Could not decode '{}': {message}", .path.display())]
    Decode {
        /// File being decoded.
        path: PathBuf,
        /// Decoder error, including position.
        message: String,
    },

    /// A dataset could not be serialised.
    #[error("Could not encode '{}': {message}", .path.display())]
    Encode {
        /// File being written.
        path: PathBuf,
        /// Encoder error.
        message: String,
    },

    /// No raw input file matched the expected name or prefix.
    #[error("No input matching '{pattern}' in '{}'", .dir.display())]
    NoInputs {
        /// Directory that was searched.
        dir: PathBuf,
        /// File name or prefix that was expected.
        pattern: String,
    },

    /// A dataset was requested before any stage produced it.
    #[error("Dataset '{dataset}' is not available")]
    Missing {
        /// Dataset name.
        dataset: String,
    },
}

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

/// Errors that halt a pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A crosswalk row carries a code that is not a well-formed identifier.
    #[error("Crosswalk row {row}: malformed {field} {value:?}")]
    MalformedCrosswalkRow {
        /// 1-based data row number (after the header and label lines).
        row: usize,
        /// Column holding the bad value.
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// Fewer distinct state codes than expected were present in the crosswalk.
    ///
    /// Crosswalk exports are limited to a handful of states per request; this
    /// fires when a batch was not downloaded.
    #[error("Incomplete state coverage: found {found} state codes, expected {expected}")]
    IncompleteStateCoverage {
        /// Number of distinct state codes found.
        found: usize,
        /// Number required by the settings.
        expected: usize,
    },

    /// A place id appeared under more than one name/abbreviation group after
    /// aggregation.
    #[error("Duplicate place_2020_id {place} in aggregated place values")]
    DuplicatePlace {
        /// The duplicated place.
        place: PlaceId,
    },

    /// A table lacks a required column.
    #[error("Table '{table}' has no column '{column}'")]
    MissingColumn {
        /// Table name (e.g. `"B19013"`).
        table: String,
        /// Missing column (lower-cased).
        column: String,
    },

    /// A table row could not be interpreted.
    #[error("Table '{table}' row {row}: {message}")]
    MalformedRow {
        /// Table name.
        table: String,
        /// 1-based data row number.
        row: usize,
        /// What was wrong.
        message: String,
    },

    /// A boundary feature lacks a property or carries an invalid value.
    #[error("Boundary layer '{layer}' feature {index}: {message}")]
    MalformedFeature {
        /// Layer name.
        layer: String,
        /// 0-based feature index in the source collection.
        index: usize,
        /// What was wrong.
        message: String,
    },

    /// The pipeline settings are invalid.
    ///
    /// Produced at load time; no stage runs with invalid settings.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// Reading or writing a dataset failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
