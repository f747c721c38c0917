//! Shared value types for the placeprep domain.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types carry
//! numeric values with invariants (money is finite and non-negative, ratios
//! are finite) and participate in the map-data computations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// A US-dollar amount (home value or household income).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Dollars(f64);

impl Dollars {
    /// Creates a [`Dollars`] amount.
    ///
    /// Returns `None` if `value` is negative, infinite, or NaN.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the underlying `f64` value.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Renders the amount rounded to whole dollars with thousands separators.
    /// Halves round to even.
    ///
    /// ```
    /// use pipeline::Dollars;
    /// assert_eq!(Dollars::new(1234567.6).unwrap().format_whole(), "$1,234,568");
    /// ```
    pub fn format_whole(self) -> String {
        let digits = format!("{:.0}", self.0.round_ties_even());
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        out.push('$');
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }
}

impl std::fmt::Display for Dollars {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_whole())
    }
}

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// Home value divided by median household income.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ValueToIncomeRatio(f64);

impl ValueToIncomeRatio {
    /// Wraps an already computed ratio, returning `None` if it is not finite.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    /// Computes `value / income`.
    ///
    /// Returns `None` when income is zero or the quotient is not finite.
    #[must_use]
    pub fn between(value: f64, income: f64) -> Option<Self> {
        if income == 0.0 {
            return None;
        }
        Self::new(value / income)
    }

    /// Returns the ratio as an `f64`.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Rounds the ratio to `places` decimal places, halves to even.
    #[must_use]
    pub fn rounded(self, places: i32) -> Self {
        let scale = 10f64.powi(places);
        Self((self.0 * scale).round_ties_even() / scale)
    }
}

impl std::fmt::Display for ValueToIncomeRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Inclusiveness category of a place, binned on its home value to income
/// ratio.
///
/// Bins are right-inclusive: `(0, 2.9]`, `(2.9, 4.9]`, `(4.9, 9.9]`,
/// `(9.9, 14.9]`, `(14.9, ∞)`. Ratios are rounded to one decimal place before
/// binning, so the labels' integer bounds read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioCategory {
    /// Ratio up to 2.9.
    HighlyInclusive,
    /// Ratio above 2.9 up to 4.9.
    Inclusive,
    /// Ratio above 4.9 up to 9.9.
    AtRisk,
    /// Ratio above 9.9 up to 14.9.
    Exclusionary,
    /// Ratio above 14.9.
    ExtremelyExclusionary,
}

impl RatioCategory {
    /// All categories, from most to least inclusive.
    pub const ALL: [RatioCategory; 5] = [
        RatioCategory::HighlyInclusive,
        RatioCategory::Inclusive,
        RatioCategory::AtRisk,
        RatioCategory::Exclusionary,
        RatioCategory::ExtremelyExclusionary,
    ];

    /// Places `ratio` in its bin. Ratios at or below zero have no category.
    pub fn classify(ratio: ValueToIncomeRatio) -> Option<Self> {
        let r = ratio.as_f64();
        if r.is_nan() || r <= 0.0 {
            None
        } else if r <= 2.9 {
            Some(Self::HighlyInclusive)
        } else if r <= 4.9 {
            Some(Self::Inclusive)
        } else if r <= 9.9 {
            Some(Self::AtRisk)
        } else if r <= 14.9 {
            Some(Self::Exclusionary)
        } else {
            Some(Self::ExtremelyExclusionary)
        }
    }

    /// Legend label shown on the map.
    pub fn label(self) -> &'static str {
        match self {
            Self::HighlyInclusive => "Highly Inclusive Jurisdictions: 0-2.9",
            Self::Inclusive => "Inclusive Jurisdictions: 3-4.9",
            Self::AtRisk => "At-Risk Jurisdictions: 5-9.9",
            Self::Exclusionary => "Exclusionary Jurisdictions: 10-14.9",
            Self::ExtremelyExclusionary => "Extremely Exclusionary Jurisdictions: 15+",
        }
    }

    /// Fill colour, green through red.
    pub fn color(self) -> &'static str {
        match self {
            Self::HighlyInclusive => "#00ff00",
            Self::Inclusive => "#a6d96a",
            Self::AtRisk => "#ffffbf",
            Self::Exclusionary => "#fdae61",
            Self::ExtremelyExclusionary => "#ff0000",
        }
    }
}

impl std::fmt::Display for RatioCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
