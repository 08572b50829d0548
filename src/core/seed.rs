//! Packed seed keys.
//!
//! Layout, in order:
//!
//! | Bytes | Content |
//! |-------|---------|
//! | `ceil(seed_len / 4)` | 2-bit packed bases, MSB first, zero padded |
//! | 4 (only when redundancy > 1) | shard tag, big-endian `u32` |
//! | 1 | side discriminator: 0 = reference, 1 = query |
//!
//! Everything except the final byte is the key *content*. Joining, grouping
//! and partitioning look only at content; the discriminator exists so a full
//! bytewise sort puts reference occurrences ahead of query occurrences.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::dna::{pack_window, packed_len, unpack_window};

/// Discriminator byte for reference-side keys.
pub const REFERENCE_TAG: u8 = 0;

/// Discriminator byte for query-side keys.
pub const QUERY_TAG: u8 = 1;

/// Bytes used by the shard tag when redundancy sharding is active.
pub const SHARD_TAG_LEN: usize = 4;

/// Total encoded key length for a seed length and redundancy factor.
#[must_use]
pub fn key_len(seed_len: usize, redundancy: u32) -> usize {
    let shard = if redundancy > 1 { SHARD_TAG_LEN } else { 0 };
    packed_len(seed_len) + shard + 1
}

/// A fixed-width encoded seed window plus trailing discriminator.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedKey(Vec<u8>);

impl SeedKey {
    /// Encode `bases[start..start + seed_len]`.
    ///
    /// `shard` is reduced modulo `redundancy`; it is only written when
    /// `redundancy > 1`.
    #[must_use]
    pub fn encode(
        bases: &[u8],
        start: usize,
        seed_len: usize,
        shard: u32,
        redundancy: u32,
        is_reference: bool,
    ) -> Self {
        let mut buf = vec![0u8; key_len(seed_len, redundancy)];
        let packed = packed_len(seed_len);
        pack_window(bases, start, seed_len, &mut buf[..packed]);

        if redundancy > 1 {
            let tag = shard % redundancy;
            buf[packed..packed + SHARD_TAG_LEN].copy_from_slice(&tag.to_be_bytes());
        }

        let last = buf.len() - 1;
        buf[last] = if is_reference { REFERENCE_TAG } else { QUERY_TAG };
        Self(buf)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key bytes without the trailing discriminator.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        match self.0.split_last() {
            Some((_, content)) => content,
            None => &[],
        }
    }

    /// True when the key was emitted from a reference chunk.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.0.last() == Some(&REFERENCE_TAG)
    }

    /// Shard tag carried by the key, 0 when sharding is off.
    #[must_use]
    pub fn shard(&self, seed_len: usize, redundancy: u32) -> u32 {
        if redundancy <= 1 {
            return 0;
        }
        let packed = packed_len(seed_len);
        let mut tag = [0u8; SHARD_TAG_LEN];
        tag.copy_from_slice(&self.0[packed..packed + SHARD_TAG_LEN]);
        u32::from_be_bytes(tag)
    }

    /// Decode the seed bases, mostly for diagnostics.
    #[must_use]
    pub fn bases(&self, seed_len: usize) -> Vec<u8> {
        unpack_window(&self.0, seed_len)
    }

    /// Compare key content, ignoring the discriminator.
    #[must_use]
    pub fn cmp_content(&self, other: &Self) -> Ordering {
        self.content().cmp(other.content())
    }
}

impl fmt::Debug for SeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeedKey(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}
