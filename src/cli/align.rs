use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::warn;

use crate::cli::OutputFormat;
use crate::core::config::AlignConfig;
use crate::parsing::fasta::{is_fasta_file, read_queries, read_reference, SequenceSet};
use crate::pipeline::{self, AlignmentReport};
use crate::utils::validation::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

#[derive(Args)]
pub struct AlignArgs {
    /// Reference FASTA (optionally gzip compressed)
    #[arg(required = true)]
    pub reference: PathBuf,

    /// Reads FASTA (optionally gzip compressed)
    #[arg(required = true)]
    pub reads: PathBuf,

    /// Shortest read length in the input
    #[arg(long)]
    pub min_read_len: usize,

    /// Longest read length in the input
    #[arg(long)]
    pub max_read_len: usize,

    /// Maximum differences per alignment
    #[arg(short = 'k', long, default_value = "2")]
    pub max_differences: usize,

    /// Allow insertions and deletions
    #[arg(long)]
    pub indels: bool,

    /// Only report reads whose best alignment is unique
    #[arg(long)]
    pub filter: bool,

    /// Queries and references aligned per batch in a seed group
    #[arg(long, default_value = "128")]
    pub block_size: usize,

    /// Copies of each low-complexity reference seed
    #[arg(long, default_value = "1")]
    pub redundancy: u32,

    /// Shuffle partitions of the alignment stage
    #[arg(long, default_value = "16")]
    pub partitions: usize,

    /// Shuffle partitions of the --filter stage
    #[arg(long, default_value = "16")]
    pub filter_partitions: usize,

    /// Bases per reference chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Bases shared by consecutive reference chunks
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,
}

impl AlignArgs {
    fn config(&self) -> AlignConfig {
        AlignConfig {
            min_read_len: self.min_read_len,
            max_read_len: self.max_read_len,
            k: self.max_differences,
            allow_indels: self.indels,
            block_size: self.block_size,
            redundancy: self.redundancy,
            filter_ambiguous: self.filter,
            partitions: self.partitions,
            filter_partitions: self.filter_partitions,
            chunk_overlap: self.chunk_overlap,
        }
    }
}

/// Execute align subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read, the parameters are
/// inconsistent, or a read is outside the accepted length range.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AlignArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config();
    config.validate()?;

    for path in [&args.reference, &args.reads] {
        if !is_fasta_file(path) {
            warn!("{} does not have a FASTA extension", path.display());
        }
    }

    let references = read_reference(&args.reference, args.chunk_size, args.chunk_overlap)
        .with_context(|| format!("Failed to read reference {}", args.reference.display()))?;
    let reads = read_queries(&args.reads)
        .with_context(|| format!("Failed to read reads {}", args.reads.display()))?;

    if verbose {
        eprintln!(
            "Loaded {} reference sequences ({} chunks) and {} reads; seed length {}",
            references.names.len(),
            references.chunks.len(),
            reads.names.len(),
            config.seed_len()
        );
    }

    let report = pipeline::run(&config, &references.chunks, &reads.chunks)?;

    if verbose {
        let stats = &report.stats;
        eprintln!(
            "{} seeds, {} seed groups, {} pairs extended, {} alignments for {} reads",
            stats.emit.seeds, stats.join.groups, stats.join.pairs, stats.alignments, stats.aligned_reads
        );
    }

    match format {
        OutputFormat::Text => print_text(&report, &references, &reads),
        OutputFormat::Json => print_json(&report, &references, &reads)?,
        OutputFormat::Tsv => print_tsv(&report, &references, &reads),
    }

    Ok(())
}

fn name(set: &SequenceSet, id: u32) -> &str {
    set.name(id).unwrap_or("?")
}

fn print_text(report: &AlignmentReport, references: &SequenceSet, reads: &SequenceSet) {
    if report.alignments.is_empty() {
        println!("No alignments found.");
        return;
    }

    for record in &report.alignments {
        let a = &record.alignment;
        println!(
            "{}  {}:{}-{}  {}  differences={}",
            name(reads, record.read_id),
            name(references, a.ref_id),
            a.ref_start,
            a.ref_end,
            a.strand(),
            a.differences
        );
    }
}

fn print_json(report: &AlignmentReport, references: &SequenceSet, reads: &SequenceSet) -> anyhow::Result<()> {
    let output: Vec<serde_json::Value> = report
        .alignments
        .iter()
        .map(|record| {
            let a = &record.alignment;
            serde_json::json!({
                "read": name(reads, record.read_id),
                "reference": name(references, a.ref_id),
                "start": a.ref_start,
                "end": a.ref_end,
                "strand": a.strand().to_string(),
                "differences": a.differences,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(report: &AlignmentReport, references: &SequenceSet, reads: &SequenceSet) {
    println!("read\treference\tstart\tend\tstrand\tdifferences");
    for record in &report.alignments {
        let a = &record.alignment;
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            name(reads, record.read_id),
            name(references, a.ref_id),
            a.ref_start,
            a.ref_end,
            a.strand(),
            a.differences
        );
    }
}
