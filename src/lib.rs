//! # Codon usage and genome statistics for annotated bacterial genomes
//!
//! Counts the start codon ATG and the stop codons TAA, TAG and TGA in a
//! GenBank record, derives genome-level statistics, and cross-checks them
//! against literature values for *E. coli* K-12 MG1655.
//!
//! ## Pipeline
//!
//! 1. **Load**: parse the first GenBank record into a [`GenomeRecord`]
//! 2. **Scan**: genome-wide substring counts plus one boundary codon per CDS
//! 3. **Aggregate**: densities, proportions, length and GC distributions
//! 4. **Validate**: compare against the reference table
//! 5. **Report**: CSV, JSON and Markdown artifacts
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::path::Path;
//! use codonscope::{AnalysisConfig, Analyzer, FramePolicy};
//!
//! let config = AnalysisConfig::default().with_frame_policy(FramePolicy::Frame(0));
//! let analysis = Analyzer::new(config).run("ecoli_k12.gbk")?;
//! codonscope::report::write_reports(&analysis, Path::new("out"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod genomics; // GenBank loading and sequence primitives
pub mod report; // CSV, JSON and Markdown writers
pub mod scanner; // Genome-wide and CDS-boundary codon counting
pub mod stats; // Ratios and descriptive statistics
pub mod validation; // Literature comparison

pub use genomics::{load_genome, CodingRegion, Codon, GenomeRecord, LoadError, RecordIssue, Strand};
pub use scanner::{FramePolicy, Scope};
pub use stats::{Aggregates, Measure};
pub use validation::{Expected, Status, ValidationEntry};

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Runtime knobs of an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisConfig {
    /// Reading frames included in genome-wide counts.
    pub frame_policy: FramePolicy,
    /// Window size in bases for the positional ATG distribution.
    pub window_size: usize,
    /// Number of shortest and longest CDS listed.
    pub extremes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_policy: FramePolicy::AllFrames,
            window_size: 100_000,
            extremes: 10,
        }
    }
}

impl AnalysisConfig {
    /// Set the frame policy.
    pub fn with_frame_policy(mut self, frame_policy: FramePolicy) -> Self {
        self.frame_policy = frame_policy;
        self
    }

    /// Set the positional window size.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set how many extreme-length CDS to list.
    pub fn with_extremes(mut self, extremes: usize) -> Self {
        self.extremes = extremes;
        self
    }

    fn check(&self) -> Result<(), AnalysisError> {
        if let FramePolicy::Frame(frame) = self.frame_policy {
            if frame > 2 {
                return Err(AnalysisError::InvalidFrame(frame));
            }
        }
        if self.window_size == 0 {
            return Err(AnalysisError::InvalidWindow);
        }
        Ok(())
    }
}

/// Errors surfaced by [`Analyzer`].
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The genome could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Frame outside 0..=2.
    #[error("reading frame must be 0, 1 or 2, got {0}")]
    InvalidFrame(u8),

    /// Zero-length positional window.
    #[error("window size must be positive")]
    InvalidWindow,
}

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Configuration the run used.
    pub config: AnalysisConfig,
    /// Derived statistics.
    pub aggregates: Aggregates,
    /// Literature comparison.
    pub validation: Vec<ValidationEntry>,
    /// Features skipped while loading or scanning.
    pub issues: Vec<RecordIssue>,
}

/// Pipeline orchestrator.
///
/// Runs load, scan, aggregate and validate in sequence over one record.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    reference: &'static [Expected],
}

impl Analyzer {
    /// Analyzer validating against the MG1655 reference table.
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            reference: validation::MG1655,
        }
    }

    /// Replace the reference table.
    pub fn with_reference(mut self, reference: &'static [Expected]) -> Self {
        self.reference = reference;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load `path` and analyze its first record.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<Analysis, AnalysisError> {
        self.config.check()?;
        let record = load_genome(path)?;
        self.analyze(&record)
    }

    /// Analyze an already loaded record.
    ///
    /// Regions that are inverted or run past the sequence end are dropped
    /// and reported in [`Analysis::issues`].
    pub fn analyze(&self, record: &GenomeRecord) -> Result<Analysis, AnalysisError> {
        self.config.check()?;

        let mut issues = record.issues.clone();
        let rejected: Vec<RecordIssue> = record
            .coding_regions
            .iter()
            .filter_map(|region| region.check_bounds(record.len()).err())
            .collect();
        let sanitized;
        let record = if rejected.is_empty() {
            record
        } else {
            warn!(id = %record.id, rejected = rejected.len(), "dropping out-of-bounds CDS");
            sanitized = GenomeRecord {
                coding_regions: record.valid_regions().cloned().collect(),
                ..record.clone()
            };
            &sanitized
        };
        issues.extend(rejected);

        let scan = scanner::scan(record, self.config.frame_policy);
        let aggregates = stats::aggregate(record, &scan, &self.config);
        let validation = validation::validate(&aggregates, self.reference);
        issues.extend(scan.cds.skipped);

        let passed = validation
            .iter()
            .filter(|entry| entry.status == Status::Pass)
            .count();
        info!(
            id = %record.id,
            length = record.len(),
            cds = record.coding_regions.len(),
            passed,
            checked = validation.len(),
            "analysis complete"
        );

        Ok(Analysis {
            config: self.config,
            aggregates,
            validation,
            issues,
        })
    }
}
