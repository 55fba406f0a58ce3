#[path = "common/mod.rs"]
mod common;

use std::fs;

use codonscope::report::{self, write_cds_csv, write_codon_csv, write_validation_csv};
use codonscope::stats::Measure;
use codonscope::{
    AnalysisConfig, Analyzer, Codon, FramePolicy, RecordIssue, Scope, Status, Strand,
};
use common::{assert_snapshot, fixture};

fn analyze_mini() -> codonscope::Analysis {
    Analyzer::new(AnalysisConfig::default().with_window_size(20))
        .run(fixture("mini_genome.gbk"))
        .expect("fixture analyzes")
}

fn render<F>(write: F) -> String
where
    F: FnOnce(&mut Vec<u8>) -> Result<(), report::ReportError>,
{
    let mut buffer = Vec::new();
    write(&mut buffer).expect("render succeeds");
    String::from_utf8(buffer).expect("utf-8 output")
}

#[test]
fn loads_fixture_and_skips_malformed_cds() {
    let analysis = analyze_mini();
    let genome = &analysis.aggregates.genome;
    assert_eq!(genome.id, "MINI_2.1");
    assert_eq!(genome.length, 60);
    assert_eq!(genome.gene_count, 4);
    assert_eq!(genome.cds_count, 4);
    assert_eq!(genome.strand.plus, 3);
    assert_eq!(genome.strand.minus, 1);
    assert_eq!(genome.coding_bp, 48);
    assert_eq!(genome.protein_lengths.mean, Measure::Value(4.0));
    assert_eq!(genome.size_class_percent.very_small, Measure::Value(100.0));
    assert_eq!(analysis.issues.len(), 1);
    assert!(matches!(
        &analysis.issues[0],
        RecordIssue::EndBeforeStart { label, .. } if label == "m0005"
    ));
}

#[test]
fn cds_counts_come_from_boundaries_only() {
    let analysis = analyze_mini();
    let codons = &analysis.aggregates.codons;
    assert_eq!(codons.regions_inspected, 4);
    assert_eq!(codons.cds.get(Codon::ATG), 3);
    assert_eq!(codons.alternative_starts, 1);
    assert_eq!(codons.non_canonical_stops, 0);
    assert_eq!(codons.cds.stop_total(), codons.regions_inspected);
    assert_eq!(codons.genome.get(Codon::ATG), 4);
    assert_eq!(codons.genome.get(Codon::TAG), 0);
    assert_eq!(codons.atg_per_cds, Measure::Value(1.0));
    assert_eq!(codons.atg_windows, vec![1, 0, 3]);
}

#[test]
fn undefined_enrichment_has_no_preference() {
    let analysis = analyze_mini();
    let tag = analysis
        .aggregates
        .codons
        .stop_preferences
        .iter()
        .find(|stop| stop.codon == Codon::TAG)
        .expect("TAG row");
    assert_eq!(tag.genome_percent, Measure::Value(0.0));
    assert_eq!(tag.enrichment, Measure::Undefined);
    assert_eq!(tag.preference, None);
}

#[test]
fn reverse_strand_cds_reads_reverse_complement() {
    let analysis = analyze_mini();
    let reverse = analysis
        .aggregates
        .cds_details
        .iter()
        .find(|detail| detail.strand == Strand::Reverse)
        .expect("reverse CDS");
    assert_eq!(reverse.locus_tag.as_deref(), Some("m0003"));
    assert_eq!(reverse.start_codon.as_deref(), Some("ATG"));
    assert_eq!(reverse.stop_codon.as_deref(), Some("TAG"));
}

#[test]
fn codon_table_matches_golden() {
    let analysis = analyze_mini();
    let actual = render(|buf| write_codon_csv(buf, &analysis.aggregates.codons.rows));
    assert_snapshot("mini/codon_counts.csv", &actual);
}

#[test]
fn cds_table_matches_golden() {
    let analysis = analyze_mini();
    let actual = render(|buf| write_cds_csv(buf, &analysis.aggregates.cds_details));
    assert_snapshot("mini/cds_details.csv", &actual);
}

#[test]
fn validation_table_matches_golden() {
    let analysis = analyze_mini();
    assert!(analysis
        .validation
        .iter()
        .all(|entry| entry.status == Status::Fail));
    let actual = render(|buf| write_validation_csv(buf, &analysis.validation));
    assert_snapshot("mini/validation.csv", &actual);
}

#[test]
fn frame_policy_restricts_genome_counts_only() {
    let frame0 = Analyzer::new(AnalysisConfig::default().with_frame_policy(FramePolicy::Frame(0)))
        .run(fixture("mini_genome.gbk"))
        .expect("fixture analyzes");
    let all = analyze_mini();
    let genome = |a: &codonscope::Analysis, codon| {
        a.aggregates
            .codons
            .row(Scope::Genome, codon)
            .map(|row| row.count)
    };
    assert!(genome(&frame0, Codon::ATG) <= genome(&all, Codon::ATG));
    assert_eq!(frame0.aggregates.codons.cds, all.aggregates.codons.cds);
}

#[test]
fn writes_every_artifact() {
    let analysis = analyze_mini();
    let out_dir = std::env::temp_dir().join(format!("codonscope-reports-{}", std::process::id()));
    let written = report::write_reports(&analysis, &out_dir).expect("reports written");

    let names: Vec<String> = written
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "validation.csv",
            "codon_counts.csv",
            "cds_details.csv",
            "summary.json",
            "report.md"
        ]
    );

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["aggregates"]["genome"]["id"], "MINI_2.1");
    assert_eq!(summary["validation"][0]["status"], "FAIL");
    assert_eq!(
        summary["aggregates"]["codons"]["stop_preferences"][1]["enrichment"],
        "N/A"
    );

    let markdown = fs::read_to_string(out_dir.join("report.md")).unwrap();
    assert!(markdown.starts_with("# Codon analysis: MINI_2.1"));
    assert!(markdown.contains("0 passed, 11 failed, 0 not available."));
    assert!(markdown.contains("## Skipped features"));
    assert!(markdown.contains("| <300 bp | 4 | 100.00% |"));
    assert!(markdown.contains("| >=2400 bp | 0 | 0.00% |"));
    assert!(markdown.contains("Protein length: mean 4.00 aa"));

    fs::remove_dir_all(&out_dir).ok();
}
