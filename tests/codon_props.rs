use proptest::prelude::*;

use codonscope::scanner::{cds_codon_tally, count_pattern, genome_codon_counts, FramePolicy};
use codonscope::stats::{aggregate, density_per_kb, Measure};
use codonscope::{AnalysisConfig, CodingRegion, Codon, GenomeRecord, Strand};

fn dna(max: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')],
        0..max,
    )
}

fn brute_force(sequence: &[u8], pattern: &[u8], policy: FramePolicy) -> usize {
    let mut count = 0;
    for i in 0..sequence.len() {
        let in_frame = match policy {
            FramePolicy::AllFrames => true,
            FramePolicy::Frame(f) => i % 3 == f as usize,
        };
        if in_frame && i + 3 <= sequence.len() && &sequence[i..i + 3] == pattern {
            count += 1;
        }
    }
    count
}

fn policies() -> impl Strategy<Value = FramePolicy> {
    prop_oneof![
        Just(FramePolicy::AllFrames),
        (0u8..3).prop_map(FramePolicy::Frame),
    ]
}

/// Genes built as ATG + filler codons + one stop, laid end to end.
fn gene_layout() -> impl Strategy<Value = (Vec<u8>, Vec<CodingRegion>)> {
    let stop = prop_oneof![Just(*b"TAA"), Just(*b"TAG"), Just(*b"TGA")];
    let gene = (0usize..5, stop, any::<bool>());
    proptest::collection::vec(gene, 1..12).prop_map(|genes| {
        let mut sequence = Vec::new();
        let mut regions = Vec::new();
        for (filler, stop, reverse) in genes {
            let mut body = b"ATG".to_vec();
            for _ in 0..filler {
                body.extend_from_slice(b"GCC");
            }
            body.extend_from_slice(&stop);
            let start = sequence.len();
            let strand = if reverse {
                body = codonscope::genomics::reverse_complement(&body);
                Strand::Reverse
            } else {
                Strand::Forward
            };
            sequence.extend_from_slice(&body);
            regions.push(CodingRegion::new(start, sequence.len(), strand));
            sequence.extend_from_slice(b"CC");
        }
        (sequence, regions)
    })
}

proptest! {
    #[test]
    fn substring_count_matches_brute_force(sequence in dna(200), policy in policies()) {
        let counts = genome_codon_counts(&sequence, policy);
        for codon in Codon::ALL {
            let expected = brute_force(&sequence, codon.pattern(), policy);
            prop_assert_eq!(count_pattern(&sequence, codon.pattern(), policy), expected);
            prop_assert_eq!(counts.get(codon), expected);
        }
    }

    #[test]
    fn stops_account_for_every_region((sequence, regions) in gene_layout()) {
        let tally = cds_codon_tally(&sequence, &regions);
        prop_assert_eq!(tally.regions_inspected, regions.len());
        prop_assert_eq!(tally.non_canonical_stops, 0);
        prop_assert_eq!(tally.stop_total(), regions.len());
        prop_assert_eq!(tally.atg_starts(), regions.len());
    }

    #[test]
    fn cds_stop_proportions_sum_to_100((sequence, regions) in gene_layout()) {
        let record = GenomeRecord::new("prop", &sequence, regions);
        let config = AnalysisConfig::default();
        let scan = codonscope::scanner::scan(&record, config.frame_policy);
        let codons = aggregate(&record, &scan, &config).codons;
        let total: f64 = Codon::STOPS
            .into_iter()
            .filter_map(|codon| codons.row(codonscope::Scope::Cds, codon))
            .filter_map(|row| row.proportion_pct.value())
            .sum();
        prop_assert!((total - 100.0).abs() < 1e-9, "total = {}", total);
    }

    #[test]
    fn density_ignores_region_order((sequence, regions) in gene_layout()) {
        let mut reversed = regions.clone();
        reversed.reverse();
        let config = AnalysisConfig::default();

        let forward = GenomeRecord::new("a", &sequence, regions);
        let backward = GenomeRecord::new("b", &sequence, reversed);
        let a = aggregate(&forward, &codonscope::scanner::scan(&forward, config.frame_policy), &config);
        let b = aggregate(&backward, &codonscope::scanner::scan(&backward, config.frame_policy), &config);

        prop_assert_eq!(a.genome.genes_per_kb, b.genome.genes_per_kb);
        prop_assert_eq!(&a.codons.rows, &b.codons.rows);
        prop_assert_eq!(a.genome.coding_percent, b.genome.coding_percent);
    }

    #[test]
    fn density_is_undefined_only_for_empty_sequences(count in 0usize..1000, length in 0usize..10_000) {
        let density = density_per_kb(count, length);
        prop_assert_eq!(density == Measure::Undefined, length == 0);
    }
}
