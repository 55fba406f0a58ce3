//! Literature reference values for *Escherichia coli* K-12 MG1655.

use super::{Expectation, Expected, Metric};

/// The expected table, in reporting order.
pub static MG1655: &[Expected] = &[
    Expected {
        metric: Metric::GenomeSizeBp,
        expectation: Expectation::Tolerance {
            expected: 4_641_652.0,
            tolerance: 1_000.0,
        },
        source: "Blattner et al. 1997, Science 277:1453; NCBI RefSeq NC_000913.3",
        interpretation: "Complete circular chromosome of strain MG1655",
    },
    Expected {
        metric: Metric::GcContentPct,
        expectation: Expectation::Tolerance {
            expected: 50.8,
            tolerance: 0.5,
        },
        source: "Blattner et al. 1997; NCBI Genome",
        interpretation: "Balanced base composition typical of enterobacteria",
    },
    Expected {
        metric: Metric::TotalCds,
        expectation: Expectation::Tolerance {
            expected: 4_300.0,
            tolerance: 200.0,
        },
        source: "NCBI RefSeq NC_000913.3 annotation; Riley et al. 2006, NAR 34:1",
        interpretation: "Protein-coding genes; exact count varies with annotation release",
    },
    Expected {
        metric: Metric::CodingPct,
        expectation: Expectation::Range {
            low: 85.0,
            high: 90.0,
            nominal: Some(87.8),
        },
        source: "Blattner et al. 1997",
        interpretation: "Compact bacterial genome with little intergenic space",
    },
    Expected {
        metric: Metric::GenesPerMb,
        expectation: Expectation::Tolerance {
            expected: 930.0,
            tolerance: 50.0,
        },
        source: "Derived from NC_000913.3 size and CDS count",
        interpretation: "Roughly one gene per kilobase",
    },
    Expected {
        metric: Metric::MeanCdsLengthBp,
        expectation: Expectation::Range {
            low: 800.0,
            high: 1_100.0,
            nominal: Some(950.0),
        },
        source: "Riley et al. 2006; Blattner et al. 1997",
        interpretation: "Average protein of about 316 amino acids",
    },
    Expected {
        metric: Metric::AtgPerCdsRatio,
        expectation: Expectation::Range {
            low: 15.0,
            high: 20.0,
            nominal: Some(17.5),
        },
        source: "Expected from random ATG frequency (1/64 per position, both frames) over genome size",
        interpretation: "Most ATG occurrences are internal Met codons or out of frame",
    },
    Expected {
        metric: Metric::CdsStopTaaPct,
        expectation: Expectation::Range {
            low: 55.0,
            high: 70.0,
            nominal: Some(61.0),
        },
        source: "Nakamura et al. 2000, NAR 28:292 (Codon Usage Database); Sharp et al. 2010",
        interpretation: "TAA is the dominant stop codon in highly expressed E. coli genes",
    },
    Expected {
        metric: Metric::CdsStopTagPct,
        expectation: Expectation::Range {
            low: 5.0,
            high: 15.0,
            nominal: Some(9.0),
        },
        source: "Nakamura et al. 2000; Sharp et al. 2010",
        interpretation: "TAG is the rarest stop codon, recognised only by RF1",
    },
    Expected {
        metric: Metric::CdsStopTgaPct,
        expectation: Expectation::Range {
            low: 25.0,
            high: 35.0,
            nominal: Some(30.0),
        },
        source: "Nakamura et al. 2000; Sharp et al. 2010",
        interpretation: "TGA is intermediate, recognised only by RF2",
    },
    Expected {
        metric: Metric::PlusStrandPct,
        expectation: Expectation::Tolerance {
            expected: 50.0,
            tolerance: 5.0,
        },
        source: "Blattner et al. 1997",
        interpretation: "Genes split almost evenly between the two strands",
    },
];
