//! Seed extraction and shuffle routing.
//!
//! [`SeedEmitter`] is the map side of the seed stage: it turns reference
//! chunks and reads into `(SeedKey, SeedOccurrence)` records. [`SeedKeyPolicy`]
//! routes those records so every occurrence of a seed lands in one group with
//! its reference occurrences ahead of its query occurrences.
//!
//! ## Redundancy
//!
//! Low-complexity seeds (homopolymers, dinucleotide and trinucleotide repeats)
//! can produce groups far larger than the rest. With `redundancy = R > 1`
//! each low-complexity reference seed is emitted `R` times with shard tags
//! `0..R`, and each low-complexity query seed carries shard `read_id % R`.
//! Every query occurrence still meets every matching reference occurrence,
//! but the work is spread over `R` groups.

pub mod emitter;
pub mod partition;

pub use emitter::{EmitError, EmitStats, SeedEmitter};
pub use partition::SeedKeyPolicy;
