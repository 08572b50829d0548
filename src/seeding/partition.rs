use std::cmp::Ordering;
use std::hash::Hasher;

use rustc_hash::FxHasher;

use crate::core::seed::SeedKey;
use crate::mapreduce::KeyPolicy;

/// Shuffle policy for seed keys.
///
/// Routing and grouping use the key content only, so reference and query
/// occurrences of a seed meet in one group. Sorting uses the full key, so the
/// reference occurrences of a group always come first.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeedKeyPolicy;

impl SeedKeyPolicy {
    fn content_hash(key: &SeedKey) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(key.content());
        hasher.finish()
    }
}

impl KeyPolicy<SeedKey> for SeedKeyPolicy {
    fn partition(&self, key: &SeedKey, num_partitions: usize) -> usize {
        let n = num_partitions.max(1) as u64;
        // Remainder is below num_partitions, so it fits in usize
        (Self::content_hash(key) % n) as usize
    }

    fn sort_cmp(&self, a: &SeedKey, b: &SeedKey) -> Ordering {
        a.as_bytes().cmp(b.as_bytes())
    }

    fn group_cmp(&self, a: &SeedKey, b: &SeedKey) -> Ordering {
        a.cmp_content(b)
    }
}
