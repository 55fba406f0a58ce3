//! Scanner throughput on a synthetic genome.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use codonscope::scanner::{cds_codon_tally, genome_codon_counts, FramePolicy};
use codonscope::{CodingRegion, Strand};

fn synthetic_genome(len: usize) -> Vec<u8> {
    // Deterministic LCG so runs are comparable.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            b"ACGT"[(state >> 62) as usize]
        })
        .collect()
}

fn benchmark_scanner(c: &mut Criterion) {
    let genome = synthetic_genome(1_000_000);
    let regions: Vec<CodingRegion> = (0..genome.len() / 1_000)
        .map(|i| {
            let strand = if i % 2 == 0 { Strand::Forward } else { Strand::Reverse };
            CodingRegion::new(i * 1_000, i * 1_000 + 900, strand)
        })
        .collect();

    c.bench_function("genome_counts_1mb_all_frames", |b| {
        b.iter(|| genome_codon_counts(black_box(&genome), FramePolicy::AllFrames));
    });
    c.bench_function("genome_counts_1mb_frame0", |b| {
        b.iter(|| genome_codon_counts(black_box(&genome), FramePolicy::Frame(0)));
    });
    c.bench_function("cds_tally_1000_regions", |b| {
        b.iter(|| cds_codon_tally(black_box(&genome), black_box(&regions)));
    });
}

criterion_group!(benches, benchmark_scanner);
criterion_main!(benches);
