//! Newtype geographic identifiers.
//!
//! Census geography is keyed by fixed-width decimal codes that are routinely
//! concatenated (county + tract + block, state + place). Each code is a
//! distinct newtype so that, for example, a [`CbsaId`] can never be joined
//! against a [`PlaceId`] even though both are digit strings under the hood.
//!
//! Codes are kept as strings: leading zeros are significant (`"06"` is
//! California, `"6"` is not a state).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::InvalidIdentifier;

fn is_digits(value: &str, width: usize) -> bool {
    value.len() == width && value.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Macro for fixed-width digit codes.
// Generates: struct, WIDTH, new() returning Option<Self>, as_str(), Display,
// and serde conversions that reject malformed codes.
// ---------------------------------------------------------------------------
macro_rules! digit_id {
    (
        $(#[$attr:meta])*
        $name:ident, $width:literal
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Number of digits in a well-formed code.
            pub const WIDTH: usize = $width;

            /// Creates a new code, returning `None` unless `value` is exactly
            /// [`Self::WIDTH`] ASCII digits.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if is_digits(&v, $width) { Some(Self(v)) } else { None }
            }

            /// Returns the code as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidIdentifier;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                if is_digits(&value, $width) {
                    Ok(Self(value))
                } else {
                    Err(InvalidIdentifier { kind: stringify!($name), value })
                }
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Component codes
// ---------------------------------------------------------------------------

digit_id! {
    /// Two-digit state FIPS code (e.g. `"06"` for California, `"72"` for Puerto Rico).
    StateFips, 2
}

digit_id! {
    /// Five-digit county code: state FIPS followed by the three-digit county code.
    CountyFips, 5
}

digit_id! {
    /// Six-digit census tract code, without the decimal point.
    TractCode, 6
}

digit_id! {
    /// Four-digit census block code within a tract.
    BlockCode, 4
}

digit_id! {
    /// Five-digit place code within a state.
    ///
    /// `"99999"` is used by crosswalk files for blocks outside any place.
    PlaceCode, 5
}

impl TractCode {
    /// Parses a tract written with its decimal point (`"9501.02"`), the form
    /// used by crosswalk exports.
    ///
    /// ```
    /// use pipeline::TractCode;
    /// assert_eq!(TractCode::parse_dotted("9501.02").unwrap().as_str(), "950102");
    /// ```
    pub fn parse_dotted(raw: &str) -> Option<Self> {
        Self::new(raw.replace('.', ""))
    }
}

// ---------------------------------------------------------------------------
// Composite identifiers
// ---------------------------------------------------------------------------

digit_id! {
    /// Fifteen-digit 2020 census block GEOID: county + tract + block.
    BlockId, 15
}

digit_id! {
    /// Seven-digit 2020 place GEOID: state FIPS + place code.
    PlaceId, 7
}

digit_id! {
    /// Five-digit Core-Based Statistical Area code.
    CbsaId, 5
}

impl BlockId {
    /// Builds a block GEOID from its components.
    pub fn compose(county: &CountyFips, tract: &TractCode, block: &BlockCode) -> Self {
        Self(format!("{county}{tract}{block}"))
    }

    /// Returns the state the block lies in.
    pub fn state(&self) -> StateFips {
        StateFips(self.0[..StateFips::WIDTH].to_owned())
    }
}

impl PlaceId {
    /// Builds a place GEOID from its components.
    pub fn compose(state: &StateFips, place: &PlaceCode) -> Self {
        Self(format!("{state}{place}"))
    }

    /// Returns the state prefix of the place GEOID.
    pub fn state(&self) -> StateFips {
        StateFips(self.0[..StateFips::WIDTH].to_owned())
    }
}

// ---------------------------------------------------------------------------
// USPS state abbreviation
// ---------------------------------------------------------------------------

/// Two-letter USPS state abbreviation (e.g. `"CA"`, `"DC"`, `"PR"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateAbbr(String);

impl StateAbbr {
    /// Creates an abbreviation, returning `None` unless `value` is two ASCII
    /// uppercase letters.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.len() == 2 && v.bytes().all(|b| b.is_ascii_uppercase()) {
            Some(Self(v))
        } else {
            None
        }
    }

    /// Returns the abbreviation as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StateAbbr {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match Self::new(value.as_str()) {
            Some(abbr) => Ok(abbr),
            None => Err(InvalidIdentifier {
                kind: "StateAbbr",
                value,
            }),
        }
    }
}

impl From<StateAbbr> for String {
    fn from(abbr: StateAbbr) -> String {
        abbr.0
    }
}

impl std::fmt::Display for StateAbbr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Run identifier
// ---------------------------------------------------------------------------

/// Identifies a single CLI invocation (one data refresh).
///
/// Generated fresh for every run; recorded on the root tracing span and in the
/// run manifest so all log lines and outputs of a refresh can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRunId(Uuid);

impl PipelineRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PipelineRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
