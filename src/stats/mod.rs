//! Ratios, densities and summary statistics derived from scan results.
//!
//! Every ratio goes through [`Measure`], so a zero denominator surfaces as
//! [`Measure::Undefined`] (rendered `N/A`) instead of `0`, `inf` or `NaN`.

mod aggregate;
mod descriptive;

use std::fmt;

use serde::{Serialize, Serializer};

pub use aggregate::{
    aggregate, cds_details, Aggregates, BasePercents, CdsBrief, CdsDetail, CodonRow,
    CodonStatistics, GenomeStatistics, StopPreference, StrandDistribution,
};
pub use descriptive::{
    percentile, summarize, LengthSummary, OutlierSummary, Percentiles, SizeClass, SizeClassCounts,
    SizeClassShares,
};

/// A derived numeric value that may be undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    /// Finite value.
    Value(f64),
    /// Ratio with a zero denominator, or a statistic of an empty sample.
    Undefined,
}

impl Measure {
    /// `numerator / denominator`, undefined when the denominator is zero.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
            Measure::Undefined
        } else {
            Measure::Value(numerator / denominator)
        }
    }

    /// Wrap a value, mapping non-finite results to [`Measure::Undefined`].
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Measure::Value(value)
        } else {
            Measure::Undefined
        }
    }

    /// The value, if defined.
    pub fn value(self) -> Option<f64> {
        match self {
            Measure::Value(v) => Some(v),
            Measure::Undefined => None,
        }
    }

    /// Whether a value is present.
    pub fn is_defined(self) -> bool {
        matches!(self, Measure::Value(_))
    }

    /// Apply `f` to a defined value.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Measure::Value(v) => Measure::from_f64(f(v)),
            Measure::Undefined => Measure::Undefined,
        }
    }

    /// Value rounded to two decimals.
    pub fn rounded(self) -> Self {
        self.map(round2)
    }

    /// Fixed-precision text, `N/A` when undefined.
    pub fn format(self, decimals: usize) -> String {
        match self {
            Measure::Value(v) => format!("{v:.decimals$}"),
            Measure::Undefined => "N/A".to_string(),
        }
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Measure::from_f64(value)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format(2))
    }
}

impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Measure::Value(v) => serializer.serialize_f64(*v),
            Measure::Undefined => serializer.serialize_str("N/A"),
        }
    }
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Occurrences per kilobase: `count / (length / 1000)`.
pub fn density_per_kb(count: usize, length: usize) -> Measure {
    Measure::ratio(count as f64, length as f64 / 1_000.0)
}

/// Occurrences per megabase: `count / (length / 1e6)`.
pub fn density_per_mb(count: usize, length: usize) -> Measure {
    Measure::ratio(count as f64, length as f64 / 1_000_000.0)
}

/// Share of `count` in `total`, as a percentage.
pub fn proportion(count: usize, total: usize) -> Measure {
    Measure::ratio(count as f64, total as f64).map(|r| r * 100.0)
}

/// Observed share in a functional subset divided by the share in the whole
/// population.
pub fn enrichment(subset_percent: Measure, population_percent: Measure) -> Measure {
    match (subset_percent, population_percent) {
        (Measure::Value(subset), Measure::Value(population)) => Measure::ratio(subset, population),
        _ => Measure::Undefined,
    }
}

/// Usage preference implied by an enrichment ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    /// Enrichment above 1.2.
    Preferred,
    /// Enrichment in (0.8, 1.2].
    Neutral,
    /// Enrichment at or below 0.8.
    Avoided,
}

impl Preference {
    /// Classify an enrichment ratio; undefined ratios have no class.
    pub fn classify(enrichment: Measure) -> Option<Self> {
        let ratio = enrichment.value()?;
        Some(if ratio > 1.2 {
            Preference::Preferred
        } else if ratio > 0.8 {
            Preference::Neutral
        } else {
            Preference::Avoided
        })
    }

    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Preference::Preferred => "preferred",
            Preference::Neutral => "neutral",
            Preference::Avoided => "avoided",
        }
    }
}
