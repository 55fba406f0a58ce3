use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Strand on which an annotated feature is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Strand {
    /// Plus strand, read 5'→3' along the stored sequence.
    #[serde(rename = "+")]
    Forward,
    /// Minus strand, read on the reverse complement.
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    /// Single-character symbol used in tables (`+` / `-`).
    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The four fixed codon patterns tracked by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Codon {
    /// Canonical start codon.
    ATG,
    /// Ochre stop codon.
    TAA,
    /// Amber stop codon.
    TAG,
    /// Opal stop codon.
    TGA,
}

impl Codon {
    /// Every tracked codon, start codon first.
    pub const ALL: [Codon; 4] = [Codon::ATG, Codon::TAA, Codon::TAG, Codon::TGA];

    /// Stop codons in reporting order.
    pub const STOPS: [Codon; 3] = [Codon::TAA, Codon::TAG, Codon::TGA];

    /// Uppercase ASCII pattern for this codon.
    pub fn pattern(self) -> &'static [u8; 3] {
        match self {
            Codon::ATG => b"ATG",
            Codon::TAA => b"TAA",
            Codon::TAG => b"TAG",
            Codon::TGA => b"TGA",
        }
    }

    /// Pattern as a string slice.
    pub fn as_str(self) -> &'static str {
        match self {
            Codon::ATG => "ATG",
            Codon::TAA => "TAA",
            Codon::TAG => "TAG",
            Codon::TGA => "TGA",
        }
    }

    /// Whether this codon terminates translation.
    pub fn is_stop(self) -> bool {
        !matches!(self, Codon::ATG)
    }

    /// Match a triplet (case-insensitive) against the tracked codons.
    pub fn from_triplet(triplet: &[u8]) -> Option<Self> {
        Codon::ALL
            .into_iter()
            .find(|codon| triplet.eq_ignore_ascii_case(codon.pattern()))
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotated protein-coding span.
///
/// Coordinates are 0-based half-open (`start..end`) on the stored forward
/// sequence regardless of strand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodingRegion {
    /// First base covered by the region (0-based, inclusive).
    pub start: usize,
    /// One past the last base covered by the region.
    pub end: usize,
    /// Strand on which the region is translated.
    pub strand: Strand,
    /// `/locus_tag` qualifier, when annotated.
    pub locus_tag: Option<String>,
    /// `/gene` qualifier, when annotated.
    pub gene: Option<String>,
    /// `/product` qualifier, when annotated.
    pub product: Option<String>,
    /// `/protein_id` qualifier, when annotated.
    pub protein_id: Option<String>,
}

impl CodingRegion {
    /// Construct a bare region without annotation qualifiers.
    pub fn new(start: usize, end: usize, strand: Strand) -> Self {
        Self {
            start,
            end,
            strand,
            locus_tag: None,
            gene: None,
            product: None,
            protein_id: None,
        }
    }

    /// Attach a locus tag.
    pub fn with_locus_tag(mut self, locus_tag: impl Into<String>) -> Self {
        self.locus_tag = Some(locus_tag.into());
        self
    }

    /// Length of the span in bases.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bases.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Span as a range over the stored sequence.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Best available label for reports.
    pub fn label(&self) -> &str {
        self.locus_tag
            .as_deref()
            .or(self.gene.as_deref())
            .unwrap_or("NA")
    }

    /// Check that the span is ordered and lies within `sequence_len` bases.
    pub fn check_bounds(&self, sequence_len: usize) -> Result<(), RecordIssue> {
        if self.end < self.start {
            return Err(RecordIssue::EndBeforeStart {
                label: self.label().to_string(),
                start: self.start + 1,
                end: self.end,
            });
        }
        if self.end > sequence_len {
            return Err(RecordIssue::OutOfBounds {
                label: self.label().to_string(),
                end: self.end,
                sequence_len,
            });
        }
        Ok(())
    }
}

/// Problem found in the input record that was skipped rather than aborting
/// the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordIssue {
    /// Sequence contains symbols outside {A, C, G, T}.
    NonAcgtSymbols {
        /// Number of offending symbols.
        count: usize,
    },
    /// Feature location could not be parsed.
    UnparsableLocation {
        /// Feature key (`CDS`, `gene`, ...).
        feature: String,
        /// Raw location text.
        location: String,
    },
    /// Feature end lies before its start, or wraps the origin.
    EndBeforeStart {
        /// Feature label.
        label: String,
        /// 1-based start as annotated.
        start: usize,
        /// 1-based end as annotated.
        end: usize,
    },
    /// Feature extends past the end of the sequence.
    OutOfBounds {
        /// Feature label.
        label: String,
        /// 0-based exclusive end.
        end: usize,
        /// Sequence length.
        sequence_len: usize,
    },
    /// Boundary codon of a region could not be read.
    UnreadableBoundary {
        /// Feature label.
        label: String,
        /// Raw triplet found at the boundary (may be shorter than 3).
        triplet: String,
    },
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordIssue::NonAcgtSymbols { count } => {
                write!(f, "sequence contains {count} non-ACGT symbols")
            }
            RecordIssue::UnparsableLocation { feature, location } => {
                write!(f, "{feature} location '{location}' could not be parsed")
            }
            RecordIssue::EndBeforeStart { label, start, end } => {
                write!(f, "{label}: end {end} lies before start {start}")
            }
            RecordIssue::OutOfBounds {
                label,
                end,
                sequence_len,
            } => write!(f, "{label}: end {end} exceeds sequence length {sequence_len}"),
            RecordIssue::UnreadableBoundary { label, triplet } => {
                write!(f, "{label}: boundary codon '{triplet}' is not a readable triplet")
            }
        }
    }
}

/// Annotated genome loaded once and shared read-only by every stage.
#[derive(Debug, Clone)]
pub struct GenomeRecord {
    /// Record identifier (VERSION, else ACCESSION, else LOCUS).
    pub id: String,
    /// DEFINITION line.
    pub description: String,
    /// Uppercase nucleotide sequence.
    pub sequence: Vec<u8>,
    /// Annotated CDS spans that passed structural checks.
    pub coding_regions: Vec<CodingRegion>,
    /// Number of `gene` features in the annotation.
    pub gene_count: usize,
    /// Problems found while loading.
    pub issues: Vec<RecordIssue>,
}

impl GenomeRecord {
    /// Build a record directly from a sequence and regions.
    ///
    /// The sequence is uppercased; regions are taken as-is.
    pub fn new(
        id: impl Into<String>,
        sequence: impl AsRef<[u8]>,
        coding_regions: Vec<CodingRegion>,
    ) -> Self {
        let gene_count = coding_regions.len();
        Self {
            id: id.into(),
            description: String::new(),
            sequence: sequence.as_ref().to_ascii_uppercase(),
            coding_regions,
            gene_count,
            issues: Vec::new(),
        }
    }

    /// Sequence length in bases.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Regions that pass [`CodingRegion::check_bounds`].
    pub fn valid_regions(&self) -> impl Iterator<Item = &CodingRegion> + '_ {
        let len = self.len();
        self.coding_regions
            .iter()
            .filter(move |region| region.check_bounds(len).is_ok())
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}
