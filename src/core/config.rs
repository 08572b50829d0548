use serde::{Deserialize, Serialize};

use crate::utils::validation::{validate_config, ConfigError};

/// Run parameters consumed by the alignment core.
///
/// Every field is required; callers (the CLI) own the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Shortest accepted read
    pub min_read_len: usize,

    /// Longest accepted read
    pub max_read_len: usize,

    /// Maximum differences per alignment
    pub k: usize,

    /// Allow insertions and deletions, not just mismatches
    pub allow_indels: bool,

    /// Query batch size and reference tile size in the join
    pub block_size: usize,

    /// Copies of each low-complexity reference seed
    pub redundancy: u32,

    /// Only report reads with a single best alignment
    pub filter_ambiguous: bool,

    /// Shuffle partitions of the alignment stage
    pub partitions: usize,

    /// Shuffle partitions of the ambiguity filter stage
    pub filter_partitions: usize,

    /// Bases shared by consecutive reference chunks
    pub chunk_overlap: usize,
}

impl AlignConfig {
    /// Seed length guaranteed to be error-free in at least one window of
    /// every read with at most `k` differences.
    #[must_use]
    pub fn seed_len(&self) -> usize {
        self.min_read_len / (self.k + 1)
    }

    /// Context kept on each side of a seed.
    #[must_use]
    pub fn flank_len(&self) -> usize {
        (self.max_read_len + self.k).saturating_sub(self.seed_len())
    }

    /// Check the parameters for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_config(self)
    }
}

#[cfg(test)]
pub(crate) fn test_config(min_read_len: usize, max_read_len: usize, k: usize) -> AlignConfig {
    AlignConfig {
        min_read_len,
        max_read_len,
        k,
        allow_indels: false,
        block_size: 128,
        redundancy: 1,
        filter_ambiguous: false,
        partitions: 4,
        filter_partitions: 2,
        chunk_overlap: 1024,
    }
}
