use serde::Serialize;
use tracing::debug;

use super::descriptive::{
    summarize, LengthSummary, OutlierSummary, SizeClassCounts, SizeClassShares,
};
use super::{density_per_kb, density_per_mb, enrichment, proportion, Measure, Preference};
use crate::genomics::{CodingRegion, Codon, Composition, GenomeRecord, Strand};
use crate::scanner::{start_codon, stop_codon, window_counts, CodonCounts, ScanResult, Scope};
use crate::AnalysisConfig;

/// Nucleotide shares of the whole sequence, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BasePercents {
    /// Adenine.
    pub a: Measure,
    /// Cytosine.
    pub c: Measure,
    /// Guanine.
    pub g: Measure,
    /// Thymine.
    pub t: Measure,
    /// Ambiguous symbols.
    pub other: Measure,
}

/// CDS counts per strand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrandDistribution {
    /// Regions on the plus strand.
    pub plus: usize,
    /// Regions on the minus strand.
    pub minus: usize,
    /// Plus-strand share, percent.
    pub plus_percent: Measure,
    /// Minus-strand share, percent.
    pub minus_percent: Measure,
}

impl StrandDistribution {
    fn of(regions: &[&CodingRegion]) -> Self {
        let plus = regions
            .iter()
            .filter(|r| r.strand == Strand::Forward)
            .count();
        let minus = regions.len() - plus;
        Self {
            plus,
            minus,
            plus_percent: proportion(plus, regions.len()),
            minus_percent: proportion(minus, regions.len()),
        }
    }
}

/// Short description of one CDS for extreme-length listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CdsBrief {
    /// Locus tag or gene name.
    pub label: String,
    /// `/product` qualifier.
    pub product: Option<String>,
    /// Length in base pairs.
    pub length: usize,
    /// Coding strand.
    pub strand: Strand,
}

/// Per-CDS row of the detailed table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CdsDetail {
    /// `/locus_tag` qualifier.
    pub locus_tag: Option<String>,
    /// `/gene` qualifier.
    pub gene: Option<String>,
    /// `/product` qualifier.
    pub product: Option<String>,
    /// `/protein_id` qualifier.
    pub protein_id: Option<String>,
    /// 1-based inclusive start.
    pub start: usize,
    /// 1-based inclusive end.
    pub end: usize,
    /// Length in base pairs.
    pub length: usize,
    /// Length in whole codons.
    pub protein_length: usize,
    /// Coding strand.
    pub strand: Strand,
    /// GC share of the region, percent.
    pub gc_percent: Measure,
    /// Initial codon, when readable.
    pub start_codon: Option<String>,
    /// Terminal codon, when readable.
    pub stop_codon: Option<String>,
}

/// Size, composition, density and length statistics of the genome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenomeStatistics {
    /// Record identifier.
    pub id: String,
    /// Record description.
    pub description: String,
    /// Sequence length in bases.
    pub length: usize,
    /// Raw nucleotide counts.
    pub composition: Composition,
    /// Nucleotide shares.
    pub composition_percent: BasePercents,
    /// G+C over unambiguous bases, percent.
    pub gc_percent: Measure,
    /// Annotated `gene` features.
    pub gene_count: usize,
    /// Annotated CDS that passed structural checks.
    pub cds_count: usize,
    /// CDS per megabase.
    pub genes_per_mb: Measure,
    /// CDS per kilobase.
    pub genes_per_kb: Measure,
    /// Genome length divided by CDS count.
    pub bp_per_gene: Measure,
    /// Sum of CDS lengths (overlapping CDS counted twice).
    pub coding_bp: usize,
    /// `length - coding_bp`, floored at zero.
    pub non_coding_bp: usize,
    /// Coding share, percent.
    pub coding_percent: Measure,
    /// `100 - coding_percent`.
    pub non_coding_percent: Measure,
    /// CDS per strand.
    pub strand: StrandDistribution,
    /// CDS length distribution.
    pub cds_lengths: LengthSummary,
    /// Length outliers.
    pub length_outliers: OutlierSummary,
    /// CDS per length class.
    pub size_classes: SizeClassCounts,
    /// Share of CDS per length class, percent.
    pub size_class_percent: SizeClassShares,
    /// Distribution of encoded protein lengths, in residues.
    pub protein_lengths: LengthSummary,
    /// CDS whose length is a whole number of codons.
    pub multiple_of_three: usize,
    /// Share of CDS with whole-codon length, percent.
    pub multiple_of_three_percent: Measure,
    /// Distribution of per-CDS GC percent.
    pub cds_gc: LengthSummary,
    /// Shortest CDS, ascending.
    pub shortest: Vec<CdsBrief>,
    /// Longest CDS, descending.
    pub longest: Vec<CdsBrief>,
}

/// One row of the codon table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodonRow {
    /// Counting scope.
    pub scope: Scope,
    /// Codon.
    pub codon: Codon,
    /// Occurrences.
    pub count: usize,
    /// Occurrences per kilobase of genome.
    pub density_per_kb: Measure,
    /// Share within the codon's category (starts or stops), percent.
    pub proportion_pct: Measure,
}

/// Stop-codon usage in CDS versus the whole genome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopPreference {
    /// Stop codon.
    pub codon: Codon,
    /// Share among CDS terminal codons, percent.
    pub cds_percent: Measure,
    /// Share among genome-wide stop occurrences, percent.
    pub genome_percent: Measure,
    /// `cds_percent / genome_percent`.
    pub enrichment: Measure,
    /// Classification of the enrichment ratio.
    pub preference: Option<Preference>,
}

/// Codon counts and the ratios derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodonStatistics {
    /// Frame policy used for genome-wide counts.
    pub frame_policy: crate::scanner::FramePolicy,
    /// Genome-wide counts.
    pub genome: CodonCounts,
    /// CDS boundary counts.
    pub cds: CodonCounts,
    /// Regions whose boundary codons were read.
    pub regions_inspected: usize,
    /// Non-ATG initial codons.
    pub alternative_starts: usize,
    /// Terminal codons outside TAA/TAG/TGA.
    pub non_canonical_stops: usize,
    /// Flattened table of counts, densities and proportions.
    pub rows: Vec<CodonRow>,
    /// Genome-wide ATG occurrences per annotated CDS.
    pub atg_per_cds: Measure,
    /// Genome-wide ATG per kilobase.
    pub atg_density_per_kb: Measure,
    /// Share of inspected CDS starting with ATG, percent.
    pub cds_atg_start_percent: Measure,
    /// Stop-codon enrichment in CDS relative to the genome.
    pub stop_preferences: Vec<StopPreference>,
    /// Window size for the positional ATG distribution.
    pub window_size: usize,
    /// Genome-wide ATG occurrences per window.
    pub atg_windows: Vec<usize>,
}

/// Everything the aggregator derives from one record and its scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    /// Genome-level statistics.
    pub genome: GenomeStatistics,
    /// Codon-level statistics.
    pub codons: CodonStatistics,
    /// Per-CDS detail rows.
    pub cds_details: Vec<CdsDetail>,
}

fn gc_percent(composition: &Composition) -> Measure {
    let unambiguous = composition.total() - composition.other;
    proportion(composition.gc(), unambiguous)
}

fn brief(region: &CodingRegion) -> CdsBrief {
    CdsBrief {
        label: region.label().to_string(),
        product: region.product.clone(),
        length: region.len(),
        strand: region.strand,
    }
}

fn region_gc(sequence: &[u8], region: &CodingRegion) -> Measure {
    sequence
        .get(region.range())
        .map_or(Measure::Undefined, |bases| gc_percent(&Composition::of(bases)))
}

fn codon_text(codon: Result<[u8; 3], crate::genomics::RecordIssue>) -> Option<String> {
    codon.ok().map(|c| String::from_utf8_lossy(&c).into_owned())
}

impl GenomeStatistics {
    /// Compute genome-level statistics; `extremes` bounds the shortest /
    /// longest listings. Regions outside the sequence are ignored.
    pub fn compute(record: &GenomeRecord, extremes: usize) -> Self {
        let length = record.len();
        let regions: Vec<&CodingRegion> = record.valid_regions().collect();
        let composition = Composition::of(&record.sequence);
        let cds_count = regions.len();

        let lengths: Vec<f64> = regions.iter().map(|r| r.len() as f64).collect();
        let cds_lengths = summarize(&lengths);
        let length_outliers = OutlierSummary::detect(&lengths, &cds_lengths);
        let protein_lengths: Vec<f64> =
            regions.iter().map(|r| (r.len() / 3) as f64).collect();

        let gc_values: Vec<f64> = regions
            .iter()
            .filter_map(|r| region_gc(&record.sequence, r).value())
            .collect();

        let coding_bp: usize = regions.iter().map(|r| r.len()).sum();
        let coding_percent = proportion(coding_bp, length);
        let multiple_of_three = regions.iter().filter(|r| r.len() % 3 == 0).count();
        let size_classes = SizeClassCounts::from_lengths(regions.iter().map(|r| r.len()));

        let mut by_length = regions.clone();
        by_length.sort_by_key(|r| (r.len(), r.start));
        let shortest = by_length.iter().take(extremes).map(|r| brief(r)).collect();
        let longest = by_length.iter().rev().take(extremes).map(|r| brief(r)).collect();

        Self {
            id: record.id.clone(),
            description: record.description.clone(),
            length,
            composition,
            composition_percent: BasePercents {
                a: proportion(composition.a, length),
                c: proportion(composition.c, length),
                g: proportion(composition.g, length),
                t: proportion(composition.t, length),
                other: proportion(composition.other, length),
            },
            gc_percent: gc_percent(&composition),
            gene_count: record.gene_count,
            cds_count,
            genes_per_mb: density_per_mb(cds_count, length),
            genes_per_kb: density_per_kb(cds_count, length),
            bp_per_gene: Measure::ratio(length as f64, cds_count as f64),
            coding_bp,
            non_coding_bp: length.saturating_sub(coding_bp),
            coding_percent,
            non_coding_percent: coding_percent.map(|pct| 100.0 - pct),
            strand: StrandDistribution::of(&regions),
            cds_lengths,
            length_outliers,
            size_class_percent: size_classes.shares(),
            size_classes,
            protein_lengths: summarize(&protein_lengths),
            multiple_of_three,
            multiple_of_three_percent: proportion(multiple_of_three, cds_count),
            cds_gc: summarize(&gc_values),
            shortest,
            longest,
        }
    }
}

impl CodonStatistics {
    /// Derive codon statistics from a scan of `record`.
    pub fn compute(record: &GenomeRecord, scan: &ScanResult, config: &AnalysisConfig) -> Self {
        let length = record.len();
        let genome = scan.genome.clone();
        let cds = scan.cds.counts.clone();
        let genome_stops = genome.stop_total();
        let cds_stops = cds.stop_total();

        let mut rows = Vec::with_capacity(Codon::ALL.len() * 2);
        for counts in [&genome, &cds] {
            for codon in Codon::ALL {
                let count = counts.get(codon);
                let category_total = match (counts.scope, codon.is_stop()) {
                    (Scope::Genome, true) => genome_stops,
                    (Scope::Cds, true) => cds_stops,
                    (Scope::Genome, false) => count,
                    (Scope::Cds, false) => scan.cds.regions_inspected,
                };
                rows.push(CodonRow {
                    scope: counts.scope,
                    codon,
                    count,
                    density_per_kb: density_per_kb(count, length),
                    proportion_pct: proportion(count, category_total),
                });
            }
        }

        let stop_preferences = Codon::STOPS
            .into_iter()
            .map(|codon| {
                let cds_percent = proportion(cds.get(codon), cds_stops);
                let genome_percent = proportion(genome.get(codon), genome_stops);
                let ratio = enrichment(cds_percent, genome_percent);
                StopPreference {
                    codon,
                    cds_percent,
                    genome_percent,
                    enrichment: ratio,
                    preference: Preference::classify(ratio),
                }
            })
            .collect();

        let atg = genome.get(Codon::ATG);
        debug!(atg, genome_stops, cds_stops, "codon statistics derived");

        Self {
            frame_policy: config.frame_policy,
            regions_inspected: scan.cds.regions_inspected,
            alternative_starts: scan.cds.alternative_starts,
            non_canonical_stops: scan.cds.non_canonical_stops,
            rows,
            atg_per_cds: Measure::ratio(atg as f64, record.valid_regions().count() as f64),
            atg_density_per_kb: density_per_kb(atg, length),
            cds_atg_start_percent: proportion(cds.get(Codon::ATG), scan.cds.regions_inspected),
            stop_preferences,
            window_size: config.window_size,
            atg_windows: window_counts(&scan.atg_positions, length, config.window_size),
            genome,
            cds,
        }
    }

    /// Row for `codon` in `scope`.
    pub fn row(&self, scope: Scope, codon: Codon) -> Option<&CodonRow> {
        self.rows
            .iter()
            .find(|row| row.scope == scope && row.codon == codon)
    }
}

/// Per-CDS detail rows, in annotation order. Regions outside the sequence
/// are left out.
pub fn cds_details(record: &GenomeRecord) -> Vec<CdsDetail> {
    record
        .valid_regions()
        .map(|region| CdsDetail {
            locus_tag: region.locus_tag.clone(),
            gene: region.gene.clone(),
            product: region.product.clone(),
            protein_id: region.protein_id.clone(),
            start: region.start + 1,
            end: region.end,
            length: region.len(),
            protein_length: region.len() / 3,
            strand: region.strand,
            gc_percent: region_gc(&record.sequence, region),
            start_codon: codon_text(start_codon(&record.sequence, region)),
            stop_codon: codon_text(stop_codon(&record.sequence, region)),
        })
        .collect()
}

/// Run the aggregator over a loaded record and its scan.
pub fn aggregate(record: &GenomeRecord, scan: &ScanResult, config: &AnalysisConfig) -> Aggregates {
    Aggregates {
        genome: GenomeStatistics::compute(record, config.extremes),
        codons: CodonStatistics::compute(record, scan, config),
        cds_details: cds_details(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;

    fn toy_record() -> GenomeRecord {
        // Two forward CDS ending in TAA and TGA, one reverse CDS ending in TAG.
        let sequence = b"ATGAAATAAccATGCCCTGAggCTACATgg";
        GenomeRecord::new(
            "toy",
            sequence,
            vec![
                CodingRegion::new(0, 9, Strand::Forward).with_locus_tag("t1"),
                CodingRegion::new(11, 20, Strand::Forward).with_locus_tag("t2"),
                CodingRegion::new(22, 28, Strand::Reverse).with_locus_tag("t3"),
            ],
        )
    }

    #[test]
    fn genome_statistics_for_toy_record() {
        let record = toy_record();
        let stats = GenomeStatistics::compute(&record, 2);
        assert_eq!(stats.length, 30);
        assert_eq!(stats.cds_count, 3);
        assert_eq!(stats.coding_bp, 24);
        assert_eq!(stats.coding_percent, Measure::Value(80.0));
        assert_eq!(stats.strand.plus, 2);
        assert_eq!(stats.strand.minus, 1);
        assert_eq!(stats.genes_per_kb, Measure::Value(100.0));
        assert_eq!(stats.multiple_of_three, 3);
        assert_eq!(stats.shortest[0].label, "t3");
        assert_eq!(stats.longest[0].label, "t2");
        assert_eq!(stats.shortest.len(), 2);
    }

    #[test]
    fn protein_lengths_and_size_class_shares() {
        let stats = GenomeStatistics::compute(&toy_record(), 2);
        // 9, 9 and 6 bp encode 3, 3 and 2 residues.
        assert_eq!(stats.protein_lengths.count, 3);
        assert_eq!(stats.protein_lengths.min, Measure::Value(2.0));
        assert_eq!(stats.protein_lengths.max, Measure::Value(3.0));
        assert_eq!(stats.size_classes.very_small, 3);
        assert_eq!(stats.size_class_percent.very_small, Measure::Value(100.0));
        assert_eq!(stats.size_class_percent.large, Measure::Value(0.0));
    }

    #[test]
    fn regions_outside_the_sequence_are_ignored() {
        let mut record = toy_record();
        record
            .coding_regions
            .push(CodingRegion::new(25, 40, Strand::Forward).with_locus_tag("past_end"));
        record
            .coding_regions
            .push(CodingRegion::new(12, 4, Strand::Reverse).with_locus_tag("inverted"));

        let stats = GenomeStatistics::compute(&record, 5);
        assert_eq!(stats.cds_count, 3);
        assert_eq!(stats.coding_bp, 24);
        assert_eq!(stats.cds_gc.count, 3);
        let details = cds_details(&record);
        assert_eq!(details.len(), 3);
        assert!(details.iter().all(|d| d.locus_tag.as_deref() != Some("past_end")));

        let config = AnalysisConfig::default();
        let scan = scan(&record, config.frame_policy);
        let codons = CodonStatistics::compute(&record, &scan, &config);
        let atg = codons.genome.get(Codon::ATG) as f64;
        assert_eq!(codons.atg_per_cds, Measure::ratio(atg, 3.0));
    }

    #[test]
    fn codon_proportions_for_toy_record() {
        let record = toy_record();
        let config = AnalysisConfig::default();
        let scan = scan(&record, config.frame_policy);
        let codons = CodonStatistics::compute(&record, &scan, &config);

        assert_eq!(codons.regions_inspected, 3);
        assert_eq!(codons.cds.get(Codon::ATG), 3);
        for codon in Codon::STOPS {
            let row = codons.row(Scope::Cds, codon).unwrap();
            assert_eq!(row.count, 1, "{codon}");
        }
        let total: f64 = Codon::STOPS
            .into_iter()
            .filter_map(|c| codons.row(Scope::Cds, c).unwrap().proportion_pct.value())
            .sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(
            codons.row(Scope::Cds, Codon::ATG).unwrap().proportion_pct,
            Measure::Value(100.0)
        );
    }

    #[test]
    fn empty_annotation_yields_undefined_ratios() {
        let record = GenomeRecord::new("bare", b"ACGTACGT", Vec::new());
        let stats = GenomeStatistics::compute(&record, 5);
        assert_eq!(stats.bp_per_gene, Measure::Undefined);
        assert_eq!(stats.strand.plus_percent, Measure::Undefined);
        assert_eq!(stats.cds_lengths.mean, Measure::Undefined);
        assert!(stats.shortest.is_empty());
    }

    #[test]
    fn details_use_one_based_coordinates() {
        let details = cds_details(&toy_record());
        assert_eq!(details[0].start, 1);
        assert_eq!(details[0].end, 9);
        assert_eq!(details[0].start_codon.as_deref(), Some("ATG"));
        assert_eq!(details[2].stop_codon.as_deref(), Some("TAG"));
        assert_eq!(details[2].strand, Strand::Reverse);
    }
}
