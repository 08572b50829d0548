//! # burst-align
//!
//! Seed-and-extend short read mapping over a partition / shuffle / group model.
//!
//! Every read is aligned to every reference locus it matches with at most `k`
//! differences (mismatches, or mismatches and indels). Reads are split into
//! `k + 1` non-overlapping seeds; by the pigeonhole principle any qualifying
//! alignment shares at least one exact seed with the reference. Seeds from
//! both inputs are shuffled so equal seeds meet in one group, and every
//! reference/query pair in a group is extended over its flanks with a
//! budget-limited Landau–Vishkin computation.
//!
//! ## Features
//!
//! - **Exhaustive within the budget**: every alignment with at most `k` differences is reported once
//! - **Indels**: optional insertions and deletions in the extension
//! - **Unique best hits**: optional second stage keeps only reads with a single best alignment
//! - **Low-complexity sharding**: repetitive seeds can be spread over several groups
//!
//! ## Example
//!
//! ```rust,no_run
//! use burst_align::{pipeline, AlignConfig, GenomicChunk};
//!
//! let config = AlignConfig {
//!     min_read_len: 16,
//!     max_read_len: 16,
//!     k: 1,
//!     allow_indels: false,
//!     block_size: 128,
//!     redundancy: 1,
//!     filter_ambiguous: false,
//!     partitions: 4,
//!     filter_partitions: 4,
//!     chunk_overlap: 1024,
//! };
//!
//! let references = vec![GenomicChunk::reference(0, b"TTACGTACGTACGTACGTAA".to_vec(), 0, true)];
//! let reads = vec![GenomicChunk::read(0, b"ACGTACGTACGTACGT".to_vec())];
//!
//! let report = pipeline::run(&config, &references, &reads).unwrap();
//! for hit in &report.alignments {
//!     println!("read {} at {}..{}", hit.read_id, hit.alignment.ref_start, hit.alignment.ref_end);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Sequence encoding, seed keys, records and configuration
//! - [`seeding`]: Seed emission and shuffle routing
//! - [`matching`]: Flank extension, the seed join and best-hit resolution
//! - [`mapreduce`]: Execution traits and the in-process executor
//! - [`pipeline`]: The two-stage alignment run
//! - [`parsing`]: Chunked FASTA input
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod mapreduce;
pub mod matching;
pub mod parsing;
pub mod pipeline;
pub mod seeding;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::config::AlignConfig;
pub use core::types::*;
pub use pipeline::{AlignmentReport, PipelineError};
