use serde::Serialize;
use tracing::{debug, warn};

use super::{CodonCounts, Scope};
use crate::genomics::{is_acgt, reverse_complement, CodingRegion, Codon, RecordIssue, Strand};

/// Boundary codons read from every annotated coding region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CdsTally {
    /// Regions whose two boundary codons were both readable.
    pub regions_inspected: usize,
    /// Initial-codon and terminal-codon counts (`ATG` plus the three stops).
    pub counts: CodonCounts,
    /// Initial codons other than ATG (GTG, TTG, ...).
    pub alternative_starts: usize,
    /// Terminal codons that are not TAA, TAG or TGA.
    pub non_canonical_stops: usize,
    /// Regions skipped because a boundary codon could not be read.
    pub skipped: Vec<RecordIssue>,
}

impl CdsTally {
    /// ATG initial codons.
    pub fn atg_starts(&self) -> usize {
        self.counts.get(Codon::ATG)
    }

    /// Canonical stop codons summed.
    pub fn stop_total(&self) -> usize {
        self.counts.stop_total()
    }
}

fn read_triplet(
    sequence: &[u8],
    region: &CodingRegion,
    at: usize,
    reverse: bool,
) -> Result<[u8; 3], RecordIssue> {
    let unreadable = |triplet: &[u8]| RecordIssue::UnreadableBoundary {
        label: region.label().to_string(),
        triplet: String::from_utf8_lossy(triplet).into_owned(),
    };

    if region.len() < 3 || region.end > sequence.len() {
        let clamp = sequence.len().min(region.end);
        let start = region.start.min(clamp);
        return Err(unreadable(&sequence[start..clamp]));
    }

    let raw = &sequence[at..at + 3];
    let oriented = if reverse {
        reverse_complement(raw)
    } else {
        raw.to_ascii_uppercase()
    };
    if !oriented.iter().all(|&b| is_acgt(b)) {
        return Err(unreadable(oriented.as_slice()));
    }
    Ok([oriented[0], oriented[1], oriented[2]])
}

/// Initial codon of `region`, read 5'→3' on its own strand.
///
/// Forward regions read `seq[start..start + 3]`; reverse regions read the
/// reverse complement of `seq[end - 3..end]`.
pub fn start_codon(sequence: &[u8], region: &CodingRegion) -> Result<[u8; 3], RecordIssue> {
    match region.strand {
        Strand::Forward => read_triplet(sequence, region, region.start, false),
        Strand::Reverse => read_triplet(sequence, region, region.end.saturating_sub(3), true),
    }
}

/// Terminal codon of `region`, read 5'→3' on its own strand.
///
/// Forward regions read `seq[end - 3..end]`; reverse regions read the
/// reverse complement of `seq[start..start + 3]`.
pub fn stop_codon(sequence: &[u8], region: &CodingRegion) -> Result<[u8; 3], RecordIssue> {
    match region.strand {
        Strand::Forward => read_triplet(sequence, region, region.end.saturating_sub(3), false),
        Strand::Reverse => read_triplet(sequence, region, region.start, true),
    }
}

/// Inspect exactly one initial and one terminal codon per region.
///
/// A region contributes to the tally only when both boundary codons are
/// readable ACGT triplets; otherwise it is skipped and the problem is kept
/// in [`CdsTally::skipped`]. For inspected regions
/// `TAA + TAG + TGA + non_canonical_stops == regions_inspected`.
pub fn cds_codon_tally(sequence: &[u8], regions: &[CodingRegion]) -> CdsTally {
    let mut tally = CdsTally {
        regions_inspected: 0,
        counts: CodonCounts::new(Scope::Cds),
        alternative_starts: 0,
        non_canonical_stops: 0,
        skipped: Vec::new(),
    };

    for region in regions {
        let boundaries = start_codon(sequence, region)
            .and_then(|start| stop_codon(sequence, region).map(|stop| (start, stop)));
        let (start, stop) = match boundaries {
            Ok(pair) => pair,
            Err(issue) => {
                warn!(%issue, "skipping region with unreadable boundary");
                tally.skipped.push(issue);
                continue;
            }
        };

        tally.regions_inspected += 1;
        match Codon::from_triplet(&start) {
            Some(Codon::ATG) => tally.counts.increment(Codon::ATG),
            _ => tally.alternative_starts += 1,
        }
        match Codon::from_triplet(&stop) {
            Some(codon) if codon.is_stop() => tally.counts.increment(codon),
            _ => {
                debug!(label = region.label(), stop = %String::from_utf8_lossy(&stop), "non-canonical stop");
                tally.non_canonical_stops += 1;
            }
        }
    }

    tally
}
