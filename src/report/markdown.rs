use std::io::{self, Write};

use anyhow::{anyhow, Result};

use crate::genomics::Codon;
use crate::scanner::Scope;
use crate::stats::{Measure, SizeClass};
use crate::validation::StatusCounts;
use crate::Analysis;

fn pct(value: Measure) -> String {
    if value.is_defined() {
        format!("{value}%")
    } else {
        value.to_string()
    }
}

/// Write the human-readable summary.
pub fn write_markdown<W: Write>(writer: &mut W, analysis: &Analysis) -> io::Result<()> {
    let genome = &analysis.aggregates.genome;
    let codons = &analysis.aggregates.codons;

    writeln!(writer, "# Codon analysis: {}", genome.id)?;
    writeln!(writer)?;
    if !genome.description.is_empty() {
        writeln!(writer, "{}", genome.description)?;
        writeln!(writer)?;
    }
    writeln!(
        writer,
        "Frame policy: `{}`. Window size: {} bp.",
        codons.frame_policy, codons.window_size
    )?;
    writeln!(writer)?;

    writeln!(writer, "## Genome")?;
    writeln!(writer)?;
    writeln!(writer, "| Metric | Value |")?;
    writeln!(writer, "|---|---|")?;
    writeln!(writer, "| Length | {} bp |", genome.length)?;
    writeln!(writer, "| GC content | {} |", pct(genome.gc_percent))?;
    writeln!(writer, "| Annotated genes | {} |", genome.gene_count)?;
    writeln!(writer, "| CDS | {} |", genome.cds_count)?;
    writeln!(writer, "| Genes per Mb | {} |", genome.genes_per_mb)?;
    writeln!(writer, "| bp per gene | {} |", genome.bp_per_gene)?;
    writeln!(writer, "| Coding | {} |", pct(genome.coding_percent))?;
    writeln!(writer, "| Non-coding | {} |", pct(genome.non_coding_percent))?;
    writeln!(
        writer,
        "| Strand +/- | {} / {} ({} / {}) |",
        genome.strand.plus,
        genome.strand.minus,
        pct(genome.strand.plus_percent),
        pct(genome.strand.minus_percent)
    )?;
    writeln!(writer)?;

    writeln!(writer, "## Codons")?;
    writeln!(writer)?;
    writeln!(writer, "| Scope | Codon | Count | Per kb | Proportion |")?;
    writeln!(writer, "|---|---|---:|---:|---:|")?;
    for row in &codons.rows {
        writeln!(
            writer,
            "| {} | {} | {} | {} | {} |",
            row.scope.as_str(),
            row.codon,
            row.count,
            row.density_per_kb,
            pct(row.proportion_pct)
        )?;
    }
    writeln!(writer)?;
    writeln!(
        writer,
        "Genome-wide ATG per CDS: {}. CDS starting with ATG: {} of {} inspected ({} alternative starts, {} non-canonical stops).",
        codons.atg_per_cds,
        codons
            .row(Scope::Cds, Codon::ATG)
            .map_or(0, |row| row.count),
        codons.regions_inspected,
        codons.alternative_starts,
        codons.non_canonical_stops
    )?;
    writeln!(writer)?;

    writeln!(writer, "### Stop codon preference")?;
    writeln!(writer)?;
    writeln!(writer, "| Codon | CDS | Genome | Enrichment | Preference |")?;
    writeln!(writer, "|---|---:|---:|---:|---|")?;
    for stop in &codons.stop_preferences {
        writeln!(
            writer,
            "| {} | {} | {} | {} | {} |",
            stop.codon,
            pct(stop.cds_percent),
            pct(stop.genome_percent),
            stop.enrichment,
            stop.preference.map_or("N/A", |p| p.as_str())
        )?;
    }
    writeln!(writer)?;

    let lengths = &genome.cds_lengths;
    writeln!(writer, "## CDS lengths")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Mean {} bp, median {} bp, sd {} bp, range {}-{} bp, IQR {} bp.",
        lengths.mean, lengths.median, lengths.std_dev, lengths.min, lengths.max, lengths.iqr
    )?;
    writeln!(
        writer,
        "Outliers (1.5 x IQR): {} ({}). Length multiple of 3: {}.",
        genome.length_outliers.total(),
        pct(genome.length_outliers.percent),
        pct(genome.multiple_of_three_percent)
    )?;
    let proteins = &genome.protein_lengths;
    writeln!(
        writer,
        "Protein length: mean {} aa, median {} aa, range {}-{} aa.",
        proteins.mean, proteins.median, proteins.min, proteins.max
    )?;
    writeln!(writer)?;
    writeln!(writer, "| Size class | CDS | Share |")?;
    writeln!(writer, "|---|---:|---:|")?;
    for class in SizeClass::ALL {
        writeln!(
            writer,
            "| {} | {} | {} |",
            class.label(),
            genome.size_classes.get(class),
            pct(genome.size_class_percent.get(class))
        )?;
    }
    writeln!(writer)?;

    let counts = StatusCounts::of(&analysis.validation);
    writeln!(writer, "## Validation")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{} passed, {} failed, {} not available.",
        counts.pass, counts.fail, counts.not_available
    )?;
    writeln!(writer)?;
    writeln!(
        writer,
        "| Metric | Observed | Expected | Deviation | Status | Source |"
    )?;
    writeln!(writer, "|---|---:|---|---:|---|---|")?;
    for entry in &analysis.validation {
        writeln!(
            writer,
            "| {} | {} | {} | {} | {} | {} |",
            entry.metric,
            entry.observed,
            entry.expected_or_range,
            pct(entry.deviation_percent),
            entry.status,
            entry.source
        )?;
    }
    writeln!(writer)?;

    if !analysis.issues.is_empty() {
        writeln!(writer, "## Skipped features")?;
        writeln!(writer)?;
        for issue in &analysis.issues {
            writeln!(writer, "- {issue}")?;
        }
        writeln!(writer)?;
    }

    writer.flush()
}

/// Render the summary into a string.
pub fn render_markdown(analysis: &Analysis) -> Result<String> {
    let mut buffer = Vec::new();
    write_markdown(&mut buffer, analysis)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered report is not valid UTF-8"))
}
