use std::io::Write;

use serde::Serialize;

use super::ReportError;
use crate::stats::{CdsDetail, CodonRow, Measure};
use crate::validation::ValidationEntry;

#[derive(Serialize)]
struct ValidationRow<'a> {
    metric: &'a str,
    observed: String,
    expected_or_range: &'a str,
    deviation_percent: String,
    status: &'a str,
}

#[derive(Serialize)]
struct CodonCsvRow<'a> {
    scope: &'a str,
    codon: &'a str,
    count: usize,
    density_per_kb: String,
    proportion_pct: String,
}

#[derive(Serialize)]
struct CdsRow<'a> {
    locus_tag: &'a str,
    gene: &'a str,
    product: &'a str,
    start: usize,
    end: usize,
    length: usize,
    strand: char,
    gc_pct: String,
    start_codon: &'a str,
    stop_codon: &'a str,
}

fn cell(value: Measure) -> String {
    value.format(2)
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn finish<W: Write>(mut writer: csv::Writer<W>) -> Result<(), ReportError> {
    writer.flush()?;
    Ok(())
}

/// Write `validation.csv`.
pub fn write_validation_csv<W: Write>(
    writer: W,
    entries: &[ValidationEntry],
) -> Result<(), ReportError> {
    let mut out = csv::Writer::from_writer(writer);
    for entry in entries {
        out.serialize(ValidationRow {
            metric: entry.metric.name(),
            observed: cell(entry.observed),
            expected_or_range: &entry.expected_or_range,
            deviation_percent: cell(entry.deviation_percent),
            status: entry.status.as_str(),
        })?;
    }
    finish(out)
}

/// Write `codon_counts.csv`.
pub fn write_codon_csv<W: Write>(writer: W, rows: &[CodonRow]) -> Result<(), ReportError> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(CodonCsvRow {
            scope: row.scope.as_str(),
            codon: row.codon.as_str(),
            count: row.count,
            density_per_kb: cell(row.density_per_kb),
            proportion_pct: cell(row.proportion_pct),
        })?;
    }
    finish(out)
}

/// Write `cds_details.csv`. Coordinates are 1-based inclusive.
pub fn write_cds_csv<W: Write>(writer: W, details: &[CdsDetail]) -> Result<(), ReportError> {
    let mut out = csv::Writer::from_writer(writer);
    for detail in details {
        out.serialize(CdsRow {
            locus_tag: text(&detail.locus_tag),
            gene: text(&detail.gene),
            product: text(&detail.product),
            start: detail.start,
            end: detail.end,
            length: detail.length,
            strand: detail.strand.symbol(),
            gc_pct: cell(detail.gc_percent),
            start_codon: text(&detail.start_codon),
            stop_codon: text(&detail.stop_codon),
        })?;
    }
    finish(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::Codon;
    use crate::scanner::Scope;
    use crate::validation::{Expectation, Expected, Metric};

    fn render(write: impl FnOnce(&mut Vec<u8>) -> Result<(), ReportError>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn validation_csv_has_fixed_columns() {
        let expected = Expected {
            metric: Metric::CdsStopTaaPct,
            expectation: Expectation::Range {
                low: 55.0,
                high: 70.0,
                nominal: Some(61.0),
            },
            source: "test",
            interpretation: "test",
        };
        let entries = vec![
            expected.check(Measure::Value(61.0)),
            expected.check(Measure::Undefined),
        ];
        let out = render(|buf| write_validation_csv(buf, &entries));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "metric,observed,expected_or_range,deviation_percent,status"
        );
        assert_eq!(lines[1], "cds_stop_taa_pct,61.00,55-70,0.00,PASS");
        assert_eq!(lines[2], "cds_stop_taa_pct,N/A,55-70,N/A,N/A");
    }

    #[test]
    fn codon_csv_rounds_to_two_decimals() {
        let rows = vec![CodonRow {
            scope: Scope::Cds,
            codon: Codon::TAA,
            count: 2,
            density_per_kb: Measure::Value(0.666_666),
            proportion_pct: Measure::Value(66.666_666),
        }];
        let out = render(|buf| write_codon_csv(buf, &rows));
        assert_eq!(
            out,
            "scope,codon,count,density_per_kb,proportion_pct\ncds,TAA,2,0.67,66.67\n"
        );
    }
}
