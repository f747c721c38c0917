//! Core domain for placeprep.
//!
//! This crate contains every domain concept used to turn block-level home
//! valuations and census tables into place-level map data: geographic
//! identifiers, records, transformations, and the port traits through which
//! stages read and write datasets. Infrastructure crates implement the traits
//! defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is read and written; the `storage` crate defines *how*.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype census codes (`BlockId`, `PlaceId`, `CbsaId`, etc.) |
//! | [`types`] | Value types (`Dollars`, `ValueToIncomeRatio`, `RatioCategory`) |
//! | [`records`] | Flat records exchanged between stages |
//! | [`errors`] | `PipelineError` and `StoreError` |
//! | [`settings`] | Tunable stage behaviour |
//! | [`ports`] | `RawSource` and `TidyStore` traits |
//! | [`crosswalk`] | Block → place crosswalk cleaning and coverage check |
//! | [`aggregate`] | Block → place join and medians |
//! | [`acs`] | Census Data API tables |
//! | [`boundaries`] | Cartographic boundary layers |
//! | [`spatial`] | Place → CBSA spatial join |
//! | [`metrics`] | Joined place metrics and map features |
//! | [`report`] | Stage reports and run manifest |

pub mod acs;
pub mod aggregate;
pub mod boundaries;
pub mod crosswalk;
pub mod errors;
pub mod identifiers;
pub mod metrics;
pub mod ports;
pub mod records;
pub mod report;
pub mod settings;
pub mod spatial;
pub mod types;

// Re-export the vocabulary types at the crate root for downstream crates.
pub use acs::AcsTable;
pub use boundaries::BoundaryFeature;
pub use errors::{InvalidIdentifier, PipelineError, StoreError};
pub use identifiers::{
    BlockCode, BlockId, CbsaId, CountyFips, PipelineRunId, PlaceCode, PlaceId, StateAbbr,
    StateFips, TractCode,
};
pub use ports::{AcsTableKind, BoundaryLayer, RawSource, TidyStore};
pub use report::{Dataset, RunManifest, StageName, StageReport, Written};
pub use settings::{JoinPredicate, PipelineSettings};
pub use types::{Dollars, RatioCategory, Timestamp, ValueToIncomeRatio};
