//! Core data types for seed-and-extend read mapping.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`GenomicChunk`]: A slice of a reference record or a whole read
//! - [`SeedKey`]: A packed seed window with a trailing reference/query discriminator
//! - [`SeedOccurrence`]: A seed position plus the flanks needed to extend it
//! - [`AlignmentCandidate`]: A validated alignment of a read to a reference span
//! - [`AlignConfig`]: Run parameters and the derived seed/flank lengths
//!
//! ## Seed length
//!
//! With `k` allowed differences the seed length is `min_read_len / (k + 1)`.
//! A read of at least `min_read_len` bases contains `k + 1` disjoint windows
//! of that length, and `k` differences can touch at most `k` of them, so every
//! alignment shares at least one exact seed with the reference.
//!
//! [`GenomicChunk`]: types::GenomicChunk
//! [`SeedKey`]: seed::SeedKey
//! [`SeedOccurrence`]: types::SeedOccurrence
//! [`AlignmentCandidate`]: types::AlignmentCandidate
//! [`AlignConfig`]: config::AlignConfig

pub mod config;
pub mod dna;
pub mod seed;
pub mod types;
