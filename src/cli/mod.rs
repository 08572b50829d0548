//! Command-line interface for burst-align.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **align**: Map short reads against a reference with at most `k` differences
//!
//! ## Usage
//!
//! ```text
//! # Up to two mismatches, reads of 36 bases
//! burst-align align ref.fa reads.fa --min-read-len 36 --max-read-len 36
//!
//! # Allow indels and keep only uniquely mapped reads
//! burst-align align ref.fa.gz reads.fa --min-read-len 30 --max-read-len 36 -k 3 --indels --filter
//!
//! # TSV output for scripting
//! burst-align align ref.fa reads.fa --min-read-len 36 --max-read-len 36 --format tsv
//! ```

use clap::{Parser, Subcommand};

pub mod align;

#[derive(Parser)]
#[command(name = "burst-align")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Seed-and-extend short read mapping with bounded differences")]
#[command(
    long_about = "burst-align reports every alignment of each read to the reference with at most k mismatches (or mismatches and indels).\n\nReads are split into k+1 seeds; any alignment within the budget shares an exact seed with the reference, which is then extended over both flanks. With --filter only reads whose best alignment is unique are reported."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align reads against a reference
    Align(align::AlignArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
