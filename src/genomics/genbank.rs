//! GenBank flat-file loader.
//!
//! Reads the first record of a `.gbk` file into a [`GenomeRecord`]: header
//! identifiers, the `gene` / `CDS` entries of the FEATURES table and the
//! ORIGIN sequence. Structural problems in individual features are recorded
//! as [`RecordIssue`]s and the feature is skipped; only I/O failures and a
//! missing record or sequence abort the load.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::sequence::Composition;
use super::types::{CodingRegion, GenomeRecord, RecordIssue, Strand};

/// Column where qualifier and continuation lines start in the FEATURES table.
const QUALIFIER_INDENT: usize = 21;

/// Fatal errors raised while loading a genome record.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input file is absent or cannot be opened.
    #[error("genome file {path} is missing or unreadable")]
    MissingInput {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Reading failed part-way through the file.
    #[error("failed to read line {line}")]
    Read {
        /// 1-based line number.
        line: usize,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The input contained no LOCUS record.
    #[error("no GenBank record found")]
    NoRecord,
    /// The record has no ORIGIN sequence.
    #[error("record {0} has no sequence")]
    EmptySequence(String),
}

/// Load the first GenBank record from `path`.
pub fn load_genome(path: impl AsRef<Path>) -> Result<GenomeRecord, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "loading genome record");
    let record = read_genome(BufReader::new(file))?;
    // The file handle is released here, before any analysis runs.
    Ok(record)
}

/// Parse the first GenBank record from any buffered reader.
pub fn read_genome<R: BufRead>(reader: R) -> Result<GenomeRecord, LoadError> {
    let raw = RawRecord::parse(reader)?;
    raw.into_genome()
}

/// Unvalidated feature table entry.
#[derive(Debug, Clone)]
struct RawFeature {
    key: String,
    location: String,
    qualifiers: Vec<(String, String)>,
    open_qualifier: Option<(String, String)>,
}

impl RawFeature {
    fn new(key: &str, location: &str) -> Self {
        Self {
            key: key.to_string(),
            location: location.trim().to_string(),
            qualifiers: Vec::new(),
            open_qualifier: None,
        }
    }

    fn qualifier(&self, key: &str) -> Option<String> {
        self.qualifiers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn close_qualifier(&mut self) {
        if let Some((key, value)) = self.open_qualifier.take() {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            self.qualifiers.push((key, value.to_string()));
        }
    }

    fn push_content(&mut self, content: &str) {
        if let Some(stripped) = content.strip_prefix('/') {
            self.close_qualifier();
            match stripped.split_once('=') {
                Some((key, value)) => {
                    self.open_qualifier = Some((key.to_string(), value.to_string()));
                    if is_closed_value(value) {
                        self.close_qualifier();
                    }
                }
                None => self.qualifiers.push((stripped.to_string(), String::new())),
            }
        } else if let Some((_, value)) = self.open_qualifier.as_mut() {
            value.push(' ');
            value.push_str(content);
            if is_closed_value(value) {
                self.close_qualifier();
            }
        } else if self.qualifiers.is_empty() {
            // Long locations wrap onto continuation lines.
            self.location.push_str(content.trim());
        }
    }

    fn label(&self) -> String {
        self.qualifier("locus_tag")
            .or_else(|| self.qualifier("gene"))
            .unwrap_or_else(|| format!("{} {}", self.key, self.location))
    }
}

fn is_closed_value(value: &str) -> bool {
    !value.starts_with('"') || (value.len() > 1 && value.ends_with('"'))
}

#[derive(Debug, Default)]
struct RawRecord {
    locus: String,
    definition: String,
    accession: String,
    version: Option<String>,
    features: Vec<RawFeature>,
    sequence: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Features,
    Origin,
}

impl RawRecord {
    fn parse<R: BufRead>(reader: R) -> Result<Self, LoadError> {
        let mut record = RawRecord::default();
        let mut section = Section::Header;
        let mut current: Option<RawFeature> = None;
        let mut seen_locus = false;
        let mut last_header = "";

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| LoadError::Read {
                line: idx + 1,
                source,
            })?;

            if line.starts_with("//") {
                if seen_locus {
                    break;
                }
                continue;
            }

            if line.starts_with("LOCUS") {
                seen_locus = true;
                record.locus = line.split_whitespace().nth(1).unwrap_or_default().to_string();
                last_header = "LOCUS";
                continue;
            }

            match section {
                Section::Origin => {
                    record.sequence.extend(
                        line.bytes()
                            .filter(u8::is_ascii_alphabetic)
                            .map(|b| b.to_ascii_uppercase()),
                    );
                }
                Section::Features if line.starts_with(' ') => {
                    let content = line.get(QUALIFIER_INDENT..).unwrap_or("").trim_end();
                    let margin = line.get(..QUALIFIER_INDENT).unwrap_or(&line);
                    let is_key_line = line.len() > 5 && !margin.trim().is_empty();
                    if is_key_line {
                        if let Some(mut feature) = current.take() {
                            feature.close_qualifier();
                            record.features.push(feature);
                        }
                        let mut parts = line.trim().splitn(2, char::is_whitespace);
                        let key = parts.next().unwrap_or_default();
                        let location = parts.next().unwrap_or_default();
                        current = Some(RawFeature::new(key, location));
                    } else if let Some(feature) = current.as_mut() {
                        feature.push_content(content);
                    }
                }
                _ => {
                    if line.starts_with("FEATURES") {
                        section = Section::Features;
                    } else if line.starts_with("ORIGIN") {
                        if let Some(mut feature) = current.take() {
                            feature.close_qualifier();
                            record.features.push(feature);
                        }
                        section = Section::Origin;
                    } else if section == Section::Header {
                        record.parse_header(&line, &mut last_header);
                    }
                }
            }
        }

        if let Some(mut feature) = current.take() {
            feature.close_qualifier();
            record.features.push(feature);
        }

        if !seen_locus {
            return Err(LoadError::NoRecord);
        }
        Ok(record)
    }

    fn parse_header(&mut self, line: &str, last_header: &mut &'static str) {
        let second_field = || line.split_whitespace().nth(1).map(str::to_string);
        if line.starts_with("DEFINITION") {
            self.definition = line.get(12..).unwrap_or("").trim().to_string();
            *last_header = "DEFINITION";
        } else if line.starts_with("ACCESSION") {
            self.accession = second_field().unwrap_or_default();
            *last_header = "ACCESSION";
        } else if line.starts_with("VERSION") {
            self.version = second_field();
            *last_header = "VERSION";
        } else if line.starts_with(' ') && *last_header == "DEFINITION" {
            self.definition.push(' ');
            self.definition.push_str(line.trim());
        } else if !line.starts_with(' ') {
            *last_header = "";
        }
    }

    fn into_genome(self) -> Result<GenomeRecord, LoadError> {
        let id = self
            .version
            .clone()
            .filter(|v| !v.is_empty())
            .or_else(|| Some(self.accession.clone()).filter(|a| !a.is_empty()))
            .unwrap_or_else(|| self.locus.clone());

        if self.sequence.is_empty() {
            return Err(LoadError::EmptySequence(id));
        }

        let mut issues = Vec::new();
        let composition = Composition::of(&self.sequence);
        if composition.other > 0 {
            warn!(count = composition.other, "sequence contains non-ACGT symbols");
            issues.push(RecordIssue::NonAcgtSymbols {
                count: composition.other,
            });
        }

        let sequence_len = self.sequence.len();
        let mut gene_count = 0usize;
        let mut coding_regions = Vec::new();

        for feature in &self.features {
            match feature.key.as_str() {
                "gene" => gene_count += 1,
                "CDS" => match coding_region(feature, sequence_len) {
                    Ok(region) => coding_regions.push(region),
                    Err(issue) => {
                        warn!(%issue, "skipping malformed CDS");
                        issues.push(issue);
                    }
                },
                _ => {}
            }
        }

        info!(
            id = %id,
            length = sequence_len,
            cds = coding_regions.len(),
            genes = gene_count,
            skipped = issues.len(),
            "genome record loaded"
        );

        Ok(GenomeRecord {
            id,
            description: self.definition,
            sequence: self.sequence,
            coding_regions,
            gene_count,
            issues,
        })
    }
}

/// Parsed feature location: 1-based inclusive segments plus strand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLocation {
    /// Strand implied by `complement(...)`.
    pub strand: Strand,
    /// Segments in the order written, as 1-based inclusive `(start, end)`.
    pub segments: Vec<(usize, usize)>,
}

/// Parse a GenBank location string such as `complement(join(<1..20,30..>40))`.
///
/// Returns `None` for locations this loader does not model: remote
/// references (`J01636.1:1..20`), between-base sites (`12^13`) and empty
/// expressions.
pub fn parse_location(location: &str) -> Option<FeatureLocation> {
    let location: String = location.chars().filter(|c| !c.is_whitespace()).collect();
    if location.is_empty() || location.contains(':') || location.contains('^') {
        return None;
    }

    let strand = if location.contains("complement(") {
        Strand::Reverse
    } else {
        Strand::Forward
    };

    let body: String = location
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
        .collect();

    let mut segments = Vec::new();
    for part in body.split(',') {
        let segment = match part.split_once("..") {
            Some((start, end)) => (start.parse().ok()?, end.parse().ok()?),
            None => {
                let pos: usize = part.parse().ok()?;
                (pos, pos)
            }
        };
        segments.push(segment);
    }

    if segments.is_empty() {
        return None;
    }
    Some(FeatureLocation { strand, segments })
}

fn coding_region(feature: &RawFeature, sequence_len: usize) -> Result<CodingRegion, RecordIssue> {
    let parsed = parse_location(&feature.location).ok_or_else(|| RecordIssue::UnparsableLocation {
        feature: feature.key.clone(),
        location: feature.location.clone(),
    })?;

    let label = feature.label();
    for &(start, end) in &parsed.segments {
        if start == 0 || end < start {
            return Err(RecordIssue::EndBeforeStart { label, start, end });
        }
    }

    // Written segment order follows transcription; an origin-spanning join
    // breaks monotonic order and is not representable as a single span.
    let descending = feature.location.trim_start().starts_with("join(complement(")
        || feature.location.trim_start().starts_with("order(complement(");
    let ordered = parsed.segments.windows(2).all(|pair| {
        if descending {
            pair[1].1 < pair[0].0
        } else {
            pair[1].0 > pair[0].1
        }
    });
    let start = parsed.segments.iter().map(|s| s.0).min().unwrap_or(0);
    let end = parsed.segments.iter().map(|s| s.1).max().unwrap_or(0);
    if !ordered {
        return Err(RecordIssue::EndBeforeStart {
            label,
            start: parsed.segments[0].0,
            end: parsed.segments[parsed.segments.len() - 1].1,
        });
    }
    if end > sequence_len {
        return Err(RecordIssue::OutOfBounds {
            label,
            end,
            sequence_len,
        });
    }

    debug!(label = %label, start, end, strand = %parsed.strand, "parsed CDS");
    Ok(CodingRegion {
        start: start - 1,
        end,
        strand: parsed.strand,
        locus_tag: feature.qualifier("locus_tag"),
        gene: feature.qualifier("gene"),
        product: feature.qualifier("product"),
        protein_id: feature.qualifier("protein_id"),
    })
}
