//! Codon scanning over the genome and over coding-region boundaries.
//!
//! Two counting regimes are kept strictly apart:
//!
//! - **genome-wide**: unrestricted substring occurrences of a triplet along
//!   the stored forward sequence, filtered by a [`FramePolicy`];
//! - **CDS-scoped**: exactly one initial and one terminal codon per
//!   annotated region, read strand-aware (see [`cds_codon_tally`]).

mod boundary;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::genomics::{Codon, GenomeRecord};

pub use boundary::{cds_codon_tally, start_codon, stop_codon, CdsTally};

/// Which reading frames contribute to genome-wide counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePolicy {
    /// Every position, all three forward frames combined.
    #[default]
    AllFrames,
    /// Only positions `i` with `i % 3 == frame` (frame is 0, 1 or 2).
    Frame(u8),
}

impl FramePolicy {
    #[inline]
    fn admits(self, position: usize) -> bool {
        match self {
            FramePolicy::AllFrames => true,
            FramePolicy::Frame(frame) => position % 3 == frame as usize,
        }
    }
}

/// Error returned when a frame policy string cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid frame policy '{0}': expected 'all', '0', '1' or '2'")]
pub struct FramePolicyError(String);

impl FromStr for FramePolicy {
    type Err = FramePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "all-frames" => Ok(FramePolicy::AllFrames),
            "0" => Ok(FramePolicy::Frame(0)),
            "1" => Ok(FramePolicy::Frame(1)),
            "2" => Ok(FramePolicy::Frame(2)),
            _ => Err(FramePolicyError(s.to_string())),
        }
    }
}

impl fmt::Display for FramePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramePolicy::AllFrames => f.write_str("all"),
            FramePolicy::Frame(frame) => write!(f, "{frame}"),
        }
    }
}

/// Where a set of codon counts was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Substring scan over the whole sequence.
    Genome,
    /// Boundary codons of annotated coding regions.
    Cds,
}

impl Scope {
    /// Lowercase label used in tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Genome => "genome",
            Scope::Cds => "cds",
        }
    }
}

/// Occurrence count per tracked codon within one [`Scope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodonCounts {
    /// Scope the counts were collected in.
    pub scope: Scope,
    counts: BTreeMap<Codon, usize>,
}

impl CodonCounts {
    /// Zeroed counts for every tracked codon.
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            counts: Codon::ALL.into_iter().map(|codon| (codon, 0)).collect(),
        }
    }

    /// Count for `codon`.
    pub fn get(&self, codon: Codon) -> usize {
        self.counts.get(&codon).copied().unwrap_or(0)
    }

    pub(crate) fn increment(&mut self, codon: Codon) {
        *self.counts.entry(codon).or_insert(0) += 1;
    }

    /// Sum of TAA, TAG and TGA.
    pub fn stop_total(&self) -> usize {
        Codon::STOPS.into_iter().map(|codon| self.get(codon)).sum()
    }

    /// Iterate `(codon, count)` in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Codon, usize)> + '_ {
        self.counts.iter().map(|(codon, count)| (*codon, *count))
    }
}

/// Count (possibly overlapping) occurrences of `pattern` in `sequence`.
///
/// Matching is ASCII case-insensitive. An empty pattern or a sequence
/// shorter than the pattern yields zero.
pub fn count_pattern(sequence: &[u8], pattern: &[u8], policy: FramePolicy) -> usize {
    if pattern.is_empty() || sequence.len() < pattern.len() {
        return 0;
    }
    sequence
        .windows(pattern.len())
        .enumerate()
        .filter(|(idx, window)| policy.admits(*idx) && window.eq_ignore_ascii_case(pattern))
        .count()
}

/// 0-based start positions of every occurrence of `pattern`.
pub fn pattern_positions(sequence: &[u8], pattern: &[u8], policy: FramePolicy) -> Vec<usize> {
    if pattern.is_empty() || sequence.len() < pattern.len() {
        return Vec::new();
    }
    sequence
        .windows(pattern.len())
        .enumerate()
        .filter(|(idx, window)| policy.admits(*idx) && window.eq_ignore_ascii_case(pattern))
        .map(|(idx, _)| idx)
        .collect()
}

/// Genome-wide counts of every tracked codon in a single pass.
pub fn genome_codon_counts(sequence: &[u8], policy: FramePolicy) -> CodonCounts {
    let mut counts = CodonCounts::new(Scope::Genome);
    if sequence.len() < 3 {
        return counts;
    }
    for (idx, triplet) in sequence.windows(3).enumerate() {
        if !policy.admits(idx) {
            continue;
        }
        if let Some(codon) = Codon::from_triplet(triplet) {
            counts.increment(codon);
        }
    }
    counts
}

/// Bucket match positions into consecutive windows of `window` bases.
///
/// The last window may be shorter than `window`. A zero window or empty
/// sequence yields no buckets.
pub fn window_counts(positions: &[usize], sequence_len: usize, window: usize) -> Vec<usize> {
    if window == 0 || sequence_len == 0 {
        return Vec::new();
    }
    let buckets = sequence_len.div_ceil(window);
    let mut counts = vec![0usize; buckets];
    for &pos in positions {
        if pos < sequence_len {
            counts[pos / window] += 1;
        }
    }
    counts
}

/// Raw output of one scan over a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Genome-wide counts under the requested frame policy.
    pub genome: CodonCounts,
    /// Boundary-codon tally over the coding regions.
    pub cds: CdsTally,
    /// Positions of genome-wide ATG matches.
    pub atg_positions: Vec<usize>,
}

/// Scan `record` in both regimes.
pub fn scan(record: &GenomeRecord, policy: FramePolicy) -> ScanResult {
    let genome = genome_codon_counts(&record.sequence, policy);
    let cds = cds_codon_tally(&record.sequence, &record.coding_regions);
    let atg_positions = pattern_positions(&record.sequence, Codon::ATG.pattern(), policy);
    debug!(
        %policy,
        atg = genome.get(Codon::ATG),
        regions = cds.regions_inspected,
        skipped = cds.skipped.len(),
        "scan complete"
    );
    ScanResult {
        genome,
        cds,
        atg_positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{CodingRegion, Strand};
    use test_case::test_case;

    #[test_case(b"ATGATGTAA", b"ATG", 2 ; "two starts")]
    #[test_case(b"AAAA", b"AAA", 2 ; "overlapping")]
    #[test_case(b"atgATG", b"ATG", 2 ; "mixed case")]
    #[test_case(b"AT", b"ATG", 0 ; "shorter than pattern")]
    #[test_case(b"", b"TAA", 0 ; "empty sequence")]
    fn counts_all_frames(sequence: &[u8], pattern: &[u8], expected: usize) {
        assert_eq!(count_pattern(sequence, pattern, FramePolicy::AllFrames), expected);
    }

    #[test]
    fn single_frame_only_sees_aligned_positions() {
        // ATG at 0 and 4; TAA at 7.
        let seq = b"ATGCATGTAA";
        assert_eq!(count_pattern(seq, b"ATG", FramePolicy::Frame(0)), 1);
        assert_eq!(count_pattern(seq, b"ATG", FramePolicy::Frame(1)), 1);
        assert_eq!(count_pattern(seq, b"ATG", FramePolicy::Frame(2)), 0);
        assert_eq!(count_pattern(seq, b"TAA", FramePolicy::Frame(0)), 0);
        assert_eq!(count_pattern(seq, b"TAA", FramePolicy::Frame(1)), 1);
    }

    #[test]
    fn frames_partition_all_frames_count() {
        let seq = b"TGATGAATAGTAATGATAGCTGA";
        for codon in Codon::ALL {
            let total: usize = (0..3)
                .map(|f| count_pattern(seq, codon.pattern(), FramePolicy::Frame(f)))
                .sum();
            assert_eq!(total, count_pattern(seq, codon.pattern(), FramePolicy::AllFrames));
        }
    }

    #[test]
    fn genome_counts_match_individual_scans() {
        let seq = b"ATGATGTAAtagTGAxTGA";
        let counts = genome_codon_counts(seq, FramePolicy::AllFrames);
        for codon in Codon::ALL {
            assert_eq!(
                counts.get(codon),
                count_pattern(seq, codon.pattern(), FramePolicy::AllFrames),
                "{codon}"
            );
        }
        assert_eq!(counts.scope, Scope::Genome);
    }

    #[test]
    fn positions_are_zero_based() {
        assert_eq!(
            pattern_positions(b"ATGATGTAA", b"ATG", FramePolicy::AllFrames),
            vec![0, 3]
        );
    }

    #[test]
    fn windows_bucket_positions() {
        assert_eq!(window_counts(&[0, 5, 10, 24], 25, 10), vec![2, 1, 1]);
        assert!(window_counts(&[1], 10, 0).is_empty());
    }

    #[test]
    fn scan_keeps_regimes_apart() {
        let record = GenomeRecord::new(
            "toy",
            b"ATGATGTAA",
            vec![CodingRegion::new(0, 9, Strand::Forward)],
        );
        let result = scan(&record, FramePolicy::AllFrames);
        assert_eq!(result.genome.get(Codon::ATG), 2);
        assert_eq!(result.cds.counts.get(Codon::ATG), 1);
        assert_eq!(result.cds.counts.get(Codon::TAA), 1);
        assert_eq!(result.atg_positions, vec![0, 3]);
    }

    #[test_case("all", FramePolicy::AllFrames)]
    #[test_case("ALL", FramePolicy::AllFrames)]
    #[test_case("2", FramePolicy::Frame(2))]
    fn parses_frame_policy(input: &str, expected: FramePolicy) {
        assert_eq!(input.parse::<FramePolicy>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_frame() {
        assert!("3".parse::<FramePolicy>().is_err());
    }
}
