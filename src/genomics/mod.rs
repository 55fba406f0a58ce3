//! Genome representation and loading.
//!
//! This module exposes the immutable [`GenomeRecord`] consumed by every
//! later stage, together with the GenBank loader and basic nucleotide
//! helpers.

mod genbank;
mod sequence;
mod types;

pub use genbank::{load_genome, parse_location, read_genome, FeatureLocation, LoadError};
pub use sequence::{is_acgt, reverse_complement, BaseCode, Composition};
pub use types::{CodingRegion, Codon, GenomeRecord, RecordIssue, Strand};
