use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codonscope::genomics::load_genome;
use codonscope::scanner::{self, FramePolicy};
use codonscope::{report, AnalysisConfig, Analyzer, Codon, Status};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "codonscope",
    version,
    about = "Start/stop codon counts and genome statistics for GenBank genomes"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full analysis and write every report artifact.
    Analyze {
        /// Annotated genome in GenBank format.
        genbank: PathBuf,
        /// Directory receiving the CSV, JSON and Markdown reports.
        #[arg(long, default_value = "results")]
        out_dir: PathBuf,
        /// Reading frames for genome-wide counts: all, 0, 1 or 2.
        #[arg(long, default_value = "all")]
        frame: FramePolicy,
        /// Window size in bases for the positional ATG distribution.
        #[arg(long, default_value_t = 100_000)]
        window: usize,
        /// Number of shortest and longest CDS to list.
        #[arg(long, default_value_t = 10)]
        extremes: usize,
    },
    /// Print genome-wide and CDS codon counts.
    Scan {
        /// Annotated genome in GenBank format.
        genbank: PathBuf,
        /// Reading frames for genome-wide counts: all, 0, 1 or 2.
        #[arg(long, default_value = "all")]
        frame: FramePolicy,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            genbank,
            out_dir,
            frame,
            window,
            extremes,
        } => {
            let config = AnalysisConfig::default()
                .with_frame_policy(frame)
                .with_window_size(window)
                .with_extremes(extremes);
            run_analyze(genbank, out_dir, config)?
        }
        Commands::Scan { genbank, frame } => run_scan(genbank, frame)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_analyze(genbank: PathBuf, out_dir: PathBuf, config: AnalysisConfig) -> Result<()> {
    let analysis = Analyzer::new(config)
        .run(&genbank)
        .with_context(|| format!("failed to analyze {}", genbank.display()))?;
    let written = report::write_reports(&analysis, &out_dir)
        .with_context(|| format!("failed to write reports to {}", out_dir.display()))?;

    for entry in &analysis.validation {
        println!(
            "{:<20} {:>14} {:>18} {}",
            entry.metric, entry.observed, entry.expected_or_range, entry.status
        );
    }
    let passed = analysis
        .validation
        .iter()
        .filter(|entry| entry.status == Status::Pass)
        .count();
    println!(
        "{passed}/{} metrics within literature ranges",
        analysis.validation.len()
    );
    for path in written {
        println!("wrote {}", path.display());
    }

    Ok(())
}

fn run_scan(genbank: PathBuf, frame: FramePolicy) -> Result<()> {
    let record = load_genome(&genbank)
        .with_context(|| format!("failed to load {}", genbank.display()))?;
    let scan = scanner::scan(&record, frame);

    println!("{}\t{} bp\t{} CDS", record.id, record.len(), record.coding_regions.len());
    println!("codon\tgenome\tcds");
    for codon in Codon::ALL {
        println!(
            "{codon}\t{}\t{}",
            scan.genome.get(codon),
            scan.cds.counts.get(codon)
        );
    }
    println!(
        "alternative_starts\t-\t{}\nnon_canonical_stops\t-\t{}",
        scan.cds.alternative_starts, scan.cds.non_canonical_stops
    );

    Ok(())
}
