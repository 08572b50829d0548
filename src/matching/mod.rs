//! Seed extension, the seed join, and best-hit resolution.
//!
//! - [`LandauVishkin`]: budget-limited extension of a seed's flanks
//! - [`JoinReducer`]: stage one, joins reference and query occurrences of a
//!   seed group and emits candidate alignments keyed by read id
//! - [`BestHitReducer`]: optional stage two, keeps a read only when its
//!   minimal-difference alignment is unique
//!
//! ## Canonical seeds
//!
//! A read with `k` differences may share several exact seeds with the same
//! reference locus. Each seed would rediscover the same alignment, so a seed
//! only reports an alignment when every seed window to its left contains a
//! difference. The alignment is then reported by exactly one seed: the
//! leftmost error-free one.

pub mod best_hit;
pub mod extension;
pub mod join;

pub use best_hit::{BestHitCombiner, BestHitReducer, BestHits, ReadIdPolicy, ResolveStats};
pub use extension::{is_canonical_seed, Edit, Extension, LandauVishkin};
pub use join::{BestAlignmentState, JoinContext, JoinError, JoinReducer, JoinStats};
