//! Report artifacts: CSV tables, a JSON summary and a Markdown overview.
//!
//! Every writer takes a generic [`std::io::Write`] so tests and snapshot
//! helpers can render into memory; [`write_reports`] writes the full set
//! into an output directory.

mod markdown;
mod tables;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::Analysis;

pub use markdown::{render_markdown, write_markdown};
pub use tables::{write_cds_csv, write_codon_csv, write_validation_csv};

/// Validation table file name.
pub const VALIDATION_CSV: &str = "validation.csv";
/// Codon table file name.
pub const CODON_COUNTS_CSV: &str = "codon_counts.csv";
/// Per-CDS table file name.
pub const CDS_DETAILS_CSV: &str = "cds_details.csv";
/// JSON summary file name.
pub const SUMMARY_JSON: &str = "summary.json";
/// Markdown report file name.
pub const REPORT_MD: &str = "report.md";

/// Failures while writing report artifacts.
#[derive(Debug, Error)]
pub enum ReportError {
    /// An output file or directory could not be created.
    #[error("cannot create {path}")]
    Create {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Writing to an open output failed.
    #[error("write failed")]
    Io(#[from] io::Error),
    /// CSV encoding failed.
    #[error("CSV encoding failed")]
    Csv(#[from] csv::Error),
    /// JSON encoding failed.
    #[error("JSON encoding failed")]
    Json(#[from] serde_json::Error),
}

/// Write the full analysis as pretty-printed JSON.
pub fn write_summary_json<W: Write>(mut writer: W, analysis: &Analysis) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut writer, analysis)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, ReportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ReportError::Create {
            path: path.to_path_buf(),
            source,
        })
}

/// Write every artifact into `out_dir`, creating it if needed. Returns the
/// written paths in a fixed order.
pub fn write_reports(analysis: &Analysis, out_dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(out_dir).map_err(|source| ReportError::Create {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let path = |name: &str| out_dir.join(name);
    let written = vec![
        path(VALIDATION_CSV),
        path(CODON_COUNTS_CSV),
        path(CDS_DETAILS_CSV),
        path(SUMMARY_JSON),
        path(REPORT_MD),
    ];

    write_validation_csv(create(&written[0])?, &analysis.validation)?;
    write_codon_csv(create(&written[1])?, &analysis.aggregates.codons.rows)?;
    write_cds_csv(create(&written[2])?, &analysis.aggregates.cds_details)?;
    write_summary_json(create(&written[3])?, analysis)?;
    write_markdown(&mut create(&written[4])?, analysis)?;

    info!(dir = %out_dir.display(), files = written.len(), "reports written");
    Ok(written)
}
