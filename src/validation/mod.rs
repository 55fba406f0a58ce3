//! Comparison of computed statistics against literature reference values.
//!
//! Each [`Expected`] entry pairs a [`Metric`] with either an inclusive range
//! or an expected value and absolute tolerance. [`validate`] evaluates every
//! entry of a table against the aggregates of one analysis.

mod expected;

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::genomics::Codon;
use crate::scanner::Scope;
use crate::stats::{Aggregates, Measure};

pub use expected::MG1655;

/// Metrics with a literature reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Sequence length in base pairs.
    GenomeSizeBp,
    /// G+C percentage.
    GcContentPct,
    /// Annotated CDS count.
    TotalCds,
    /// Coding share of the genome.
    CodingPct,
    /// CDS per megabase.
    GenesPerMb,
    /// Mean CDS length.
    MeanCdsLengthBp,
    /// Genome-wide ATG occurrences per CDS.
    AtgPerCdsRatio,
    /// TAA share among CDS stops.
    CdsStopTaaPct,
    /// TAG share among CDS stops.
    CdsStopTagPct,
    /// TGA share among CDS stops.
    CdsStopTgaPct,
    /// Share of CDS on the plus strand.
    PlusStrandPct,
}

impl Metric {
    /// Stable identifier used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Metric::GenomeSizeBp => "genome_size_bp",
            Metric::GcContentPct => "gc_content_pct",
            Metric::TotalCds => "total_cds",
            Metric::CodingPct => "coding_pct",
            Metric::GenesPerMb => "genes_per_mb",
            Metric::MeanCdsLengthBp => "mean_cds_length_bp",
            Metric::AtgPerCdsRatio => "atg_per_cds_ratio",
            Metric::CdsStopTaaPct => "cds_stop_taa_pct",
            Metric::CdsStopTagPct => "cds_stop_tag_pct",
            Metric::CdsStopTgaPct => "cds_stop_tga_pct",
            Metric::PlusStrandPct => "plus_strand_pct",
        }
    }

    /// Read the observed value of this metric.
    pub fn observe(self, aggregates: &Aggregates) -> Measure {
        let genome = &aggregates.genome;
        let cds_stop = |codon| {
            aggregates
                .codons
                .row(Scope::Cds, codon)
                .map_or(Measure::Undefined, |row| row.proportion_pct)
        };
        match self {
            Metric::GenomeSizeBp => Measure::Value(genome.length as f64),
            Metric::GcContentPct => genome.gc_percent,
            Metric::TotalCds => Measure::Value(genome.cds_count as f64),
            Metric::CodingPct => genome.coding_percent,
            Metric::GenesPerMb => genome.genes_per_mb,
            Metric::MeanCdsLengthBp => genome.cds_lengths.mean,
            Metric::AtgPerCdsRatio => aggregates.codons.atg_per_cds,
            Metric::CdsStopTaaPct => cds_stop(Codon::TAA),
            Metric::CdsStopTagPct => cds_stop(Codon::TAG),
            Metric::CdsStopTgaPct => cds_stop(Codon::TGA),
            Metric::PlusStrandPct => genome.strand.plus_percent,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Acceptance criterion for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    /// Inclusive interval, with an optional nominal value for deviations.
    Range {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
        /// Reference point for the deviation percent.
        nominal: Option<f64>,
    },
    /// Expected value with an absolute tolerance.
    Tolerance {
        /// Reference value.
        expected: f64,
        /// Largest accepted absolute difference.
        tolerance: f64,
    },
}

impl Expectation {
    /// Whether `observed` satisfies the criterion. Bounds are inclusive.
    pub fn accepts(&self, observed: f64) -> bool {
        match *self {
            Expectation::Range { low, high, .. } => low <= observed && observed <= high,
            Expectation::Tolerance {
                expected,
                tolerance,
            } => (observed - expected).abs() <= tolerance,
        }
    }

    /// Value deviations are measured against.
    pub fn nominal(&self) -> Option<f64> {
        match *self {
            Expectation::Range { nominal, .. } => nominal,
            Expectation::Tolerance { expected, .. } => Some(expected),
        }
    }

    /// `|observed - nominal| / nominal * 100`.
    pub fn deviation_percent(&self, observed: Measure) -> Measure {
        match (observed, self.nominal()) {
            (Measure::Value(value), Some(nominal)) => {
                Measure::ratio((value - nominal).abs(), nominal.abs()).map(|r| r * 100.0)
            }
            _ => Measure::Undefined,
        }
    }
}

fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Expectation::Range { low, high, .. } => write!(f, "{}-{}", number(low), number(high)),
            Expectation::Tolerance {
                expected,
                tolerance,
            } => write!(f, "{} ± {}", number(expected), number(tolerance)),
        }
    }
}

/// Outcome of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    /// Within the accepted range.
    #[serde(rename = "PASS")]
    Pass,
    /// Outside the accepted range.
    #[serde(rename = "FAIL")]
    Fail,
    /// Observed value undefined.
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl Status {
    /// Report label.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::NotAvailable => "N/A",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One row of a reference table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Expected {
    /// Metric being checked.
    pub metric: Metric,
    /// Acceptance criterion.
    pub expectation: Expectation,
    /// Literature source.
    pub source: &'static str,
    /// Biological reading of the value.
    pub interpretation: &'static str,
}

impl Expected {
    /// Compare an observed value against this entry.
    pub fn check(&self, observed: Measure) -> ValidationEntry {
        let status = match observed {
            Measure::Value(value) if self.expectation.accepts(value) => Status::Pass,
            Measure::Value(_) => Status::Fail,
            Measure::Undefined => Status::NotAvailable,
        };
        ValidationEntry {
            metric: self.metric,
            observed,
            expected_or_range: self.expectation.to_string(),
            expectation: self.expectation,
            deviation_percent: self.expectation.deviation_percent(observed),
            status,
            source: self.source,
            interpretation: self.interpretation,
        }
    }
}

/// Result of checking one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationEntry {
    /// Metric checked.
    pub metric: Metric,
    /// Observed value.
    pub observed: Measure,
    /// Criterion as displayed in reports.
    pub expected_or_range: String,
    /// Criterion.
    pub expectation: Expectation,
    /// Relative distance from the nominal value, percent.
    pub deviation_percent: Measure,
    /// Outcome.
    pub status: Status,
    /// Literature source.
    pub source: &'static str,
    /// Biological reading of the value.
    pub interpretation: &'static str,
}

/// Check every entry of `table` against `aggregates`.
pub fn validate(aggregates: &Aggregates, table: &[Expected]) -> Vec<ValidationEntry> {
    table
        .iter()
        .map(|expected| {
            let entry = expected.check(expected.metric.observe(aggregates));
            match entry.status {
                Status::Fail => warn!(
                    metric = %entry.metric,
                    observed = %entry.observed,
                    expected = %entry.expected_or_range,
                    "outside literature range"
                ),
                _ => debug!(metric = %entry.metric, status = %entry.status, "validated"),
            }
            entry
        })
        .collect()
}

/// Tally of statuses across a validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Passing metrics.
    pub pass: usize,
    /// Failing metrics.
    pub fail: usize,
    /// Metrics without an observed value.
    pub not_available: usize,
}

impl StatusCounts {
    /// Count statuses in `entries`.
    pub fn of(entries: &[ValidationEntry]) -> Self {
        entries
            .iter()
            .fold(Self::default(), |mut counts, entry| {
                match entry.status {
                    Status::Pass => counts.pass += 1,
                    Status::Fail => counts.fail += 1,
                    Status::NotAvailable => counts.not_available += 1,
                }
                counts
            })
    }
}
