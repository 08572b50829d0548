//! Input readers.
//!
//! - **FASTA**: reference records cut into overlapping [`GenomicChunk`]s and
//!   reads as single chunks, plain or gzip compressed
//!
//! ## Example
//!
//! ```rust,no_run
//! use burst_align::parsing::fasta::{read_queries, read_reference};
//! use std::path::Path;
//!
//! let reference = read_reference(Path::new("ref.fa"), 65_536, 1024).unwrap();
//! let reads = read_queries(Path::new("reads.fa")).unwrap();
//! println!("{} chunks, {} reads", reference.chunks.len(), reads.chunks.len());
//! ```
//!
//! [`GenomicChunk`]: crate::core::types::GenomicChunk

pub mod fasta;

pub use fasta::{ParseError, SequenceSet};
