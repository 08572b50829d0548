use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::core::config::AlignConfig;
use crate::core::dna::{contains_ambiguous, count_ambiguous, is_low_complexity, reverse_complement_in_place};
use crate::core::seed::SeedKey;
use crate::core::types::{GenomicChunk, SeedOccurrence, SequenceId};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EmitError {
    #[error("Read {id} has length {len}, shorter than the minimum read length {min}")]
    ReadTooShort {
        id: SequenceId,
        len: usize,
        min: usize,
    },

    #[error("Read {id} has length {len}, longer than the maximum read length {max}")]
    ReadTooLong {
        id: SequenceId,
        len: usize,
        max: usize,
    },
}

/// Counters for one or more emitted chunks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmitStats {
    /// Seeds handed to the sink, shard copies included
    pub seeds: u64,

    /// Seed windows skipped for ambiguous bases
    pub skipped_ambiguous: u64,

    /// Seed positions flagged low complexity
    pub low_complexity: u64,

    /// Reads dropped for having more ambiguous bases than `k`
    pub reads_discarded: u64,
}

impl EmitStats {
    pub fn merge(&mut self, other: &Self) {
        self.seeds += other.seeds;
        self.skipped_ambiguous += other.skipped_ambiguous;
        self.low_complexity += other.low_complexity;
        self.reads_discarded += other.reads_discarded;
    }
}

/// Turns genomic chunks into `(SeedKey, SeedOccurrence)` pairs.
///
/// Reference chunks emit a seed at every position they own; reads emit the
/// non-overlapping windows of both strands. Low-complexity seeds are sharded
/// across `redundancy` reference copies when `redundancy > 1`.
#[derive(Debug, Clone)]
pub struct SeedEmitter {
    seed_len: usize,
    flank_len: usize,
    min_read_len: usize,
    max_read_len: usize,
    k: usize,
    redundancy: u32,
    chunk_overlap: usize,
}

impl SeedEmitter {
    #[must_use]
    pub fn new(config: &AlignConfig) -> Self {
        Self {
            seed_len: config.seed_len(),
            flank_len: config.flank_len(),
            min_read_len: config.min_read_len,
            max_read_len: config.max_read_len,
            k: config.k,
            redundancy: config.redundancy,
            chunk_overlap: config.chunk_overlap,
        }
    }

    /// Emit all seeds of `chunk` into `sink`.
    ///
    /// # Errors
    ///
    /// Returns `EmitError` when a read is outside the accepted length range.
    pub fn emit<F>(&self, chunk: &GenomicChunk, mut sink: F) -> Result<EmitStats, EmitError>
    where
        F: FnMut(SeedKey, SeedOccurrence),
    {
        let mut stats = EmitStats::default();
        if chunk.is_reference {
            self.emit_reference(chunk, &mut sink, &mut stats);
        } else {
            self.emit_query(chunk, &mut sink, &mut stats)?;
        }
        Ok(stats)
    }

    fn emit_reference<F>(&self, chunk: &GenomicChunk, sink: &mut F, stats: &mut EmitStats)
    where
        F: FnMut(SeedKey, SeedOccurrence),
    {
        let seq = &chunk.sequence;
        let len = seq.len();
        let s = self.seed_len;
        let f = self.flank_len;

        // Positions left of this point were emitted by the previous chunk
        let first = if chunk.offset == 0 {
            0
        } else {
            (self.chunk_overlap + 1).saturating_sub(f + s)
        };

        // Keep room for a whole seed, and for a full right flank unless this is the end
        let mut end = (len + 1).saturating_sub(s);
        if !chunk.is_last {
            end = end.saturating_sub(f);
        }

        for pos in first..end {
            if contains_ambiguous(seq, pos, s) {
                stats.skipped_ambiguous += 1;
                continue;
            }

            let occurrence = SeedOccurrence {
                id: chunk.id,
                is_reference: true,
                is_rc: false,
                offset: chunk.offset + pos as u64,
                left_flank: seq[pos.saturating_sub(f)..pos].iter().rev().copied().collect(),
                right_flank: seq[pos + s..(pos + s + f).min(len)].to_vec(),
            };

            if self.redundancy > 1 && is_low_complexity(seq, pos, s) {
                stats.low_complexity += 1;
                for shard in 0..self.redundancy {
                    let key = SeedKey::encode(seq, pos, s, shard, self.redundancy, true);
                    sink(key, occurrence.clone());
                    stats.seeds += 1;
                }
            } else {
                let key = SeedKey::encode(seq, pos, s, 0, self.redundancy, true);
                sink(key, occurrence);
                stats.seeds += 1;
            }
        }
    }

    fn emit_query<F>(
        &self,
        chunk: &GenomicChunk,
        sink: &mut F,
        stats: &mut EmitStats,
    ) -> Result<(), EmitError>
    where
        F: FnMut(SeedKey, SeedOccurrence),
    {
        let len = chunk.len();
        if len < self.min_read_len {
            return Err(EmitError::ReadTooShort {
                id: chunk.id,
                len,
                min: self.min_read_len,
            });
        }
        if len > self.max_read_len {
            return Err(EmitError::ReadTooLong {
                id: chunk.id,
                len,
                max: self.max_read_len,
            });
        }

        // Cannot align end-to-end within the budget
        let ambiguous = count_ambiguous(&chunk.sequence);
        if ambiguous > self.k {
            debug!(
                "Discarding read {} with {ambiguous} ambiguous bases (k={})",
                chunk.id, self.k
            );
            stats.reads_discarded += 1;
            return Ok(());
        }

        let s = self.seed_len;
        let mut seq = chunk.sequence.clone();

        for is_rc in [false, true] {
            if is_rc {
                reverse_complement_in_place(&mut seq);
            }

            for pos in (0..len).step_by(s).take_while(|pos| pos + s <= len) {
                if contains_ambiguous(&seq, pos, s) {
                    stats.skipped_ambiguous += 1;
                    continue;
                }

                let shard = if self.redundancy > 1 && is_low_complexity(&seq, pos, s) {
                    stats.low_complexity += 1;
                    chunk.id % self.redundancy
                } else {
                    0
                };

                let key = SeedKey::encode(&seq, pos, s, shard, self.redundancy, false);
                let occurrence = SeedOccurrence {
                    id: chunk.id,
                    is_reference: false,
                    is_rc,
                    offset: pos as u64,
                    left_flank: seq[..pos].iter().rev().copied().collect(),
                    right_flank: seq[pos + s..].to_vec(),
                };
                sink(key, occurrence);
                stats.seeds += 1;
            }
        }

        Ok(())
    }
}
