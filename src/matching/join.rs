use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::core::config::AlignConfig;
use crate::core::seed::SeedKey;
use crate::core::types::{AlignmentCandidate, SeedOccurrence, SequenceId};
use crate::mapreduce::{GroupReducer, Sink};
use crate::matching::extension::LandauVishkin;

#[derive(Error, Debug)]
pub enum JoinError {
    #[error(
        "Reference occurrence of sequence {ref_id} arrived after {queries} query occurrences in seed group {seed:?}; groups must list references first"
    )]
    ReferenceAfterQuery {
        seed: SeedKey,
        ref_id: SequenceId,
        queries: usize,
    },
}

/// Counters accumulated by one join worker.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    pub groups: u64,

    /// Groups with query occurrences but no reference occurrence
    pub abandoned_groups: u64,

    pub references: u64,
    pub queries: u64,

    /// Reference/query pairs handed to the extender
    pub pairs: u64,

    pub emitted: u64,
}

impl JoinStats {
    pub fn merge(&mut self, other: &Self) {
        self.groups += other.groups;
        self.abandoned_groups += other.abandoned_groups;
        self.references += other.references;
        self.queries += other.queries;
        self.pairs += other.pairs;
        self.emitted += other.emitted;
    }
}

/// Best and runner-up candidate of one query occurrence within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestAlignmentState {
    best_differences: u32,
    best: Option<AlignmentCandidate>,
    second: Option<AlignmentCandidate>,
    has_tie: bool,
}

impl BestAlignmentState {
    /// Empty state; nothing above `k` differences can become best.
    #[must_use]
    pub fn new(k: u32) -> Self {
        Self {
            best_differences: k + 1,
            best: None,
            second: None,
            has_tie: false,
        }
    }

    pub fn reset(&mut self, k: u32) {
        *self = Self::new(k);
    }

    pub fn offer(&mut self, candidate: AlignmentCandidate) {
        if candidate.differences < self.best_differences {
            self.best_differences = candidate.differences;
            self.best = Some(candidate);
            self.second = None;
            self.has_tie = false;
        } else if candidate.differences == self.best_differences {
            self.second = Some(candidate);
            self.has_tie = true;
        }
    }

    /// The best candidate, plus the runner-up when it ties the best.
    pub fn winners(&self) -> impl Iterator<Item = AlignmentCandidate> {
        let second = if self.has_tie && self.best.is_some() {
            self.second
        } else {
            None
        };
        self.best.into_iter().chain(second)
    }
}

/// Scratch owned by one join worker and reused for every group it handles.
#[derive(Debug)]
pub struct JoinContext {
    references: Vec<SeedOccurrence>,
    queries: Vec<SeedOccurrence>,
    best: Vec<BestAlignmentState>,
    extender: LandauVishkin,
    pub stats: JoinStats,
}

/// Stage-one reducer: joins the reference and query occurrences of a seed
/// and extends every pair.
///
/// References of a group are buffered; queries are aligned in batches of
/// `block_size` against `block_size` tiles of the buffered references. In
/// filtering mode only the best (and a tying runner-up) candidate of each
/// query occurrence in a batch is emitted.
#[derive(Debug, Clone)]
pub struct JoinReducer {
    seed_len: usize,
    k: usize,
    block_size: usize,
    allow_indels: bool,
    filter_ambiguous: bool,
}

impl JoinReducer {
    #[must_use]
    pub fn new(config: &AlignConfig) -> Self {
        Self {
            seed_len: config.seed_len(),
            k: config.k,
            block_size: config.block_size.max(1),
            allow_indels: config.allow_indels,
            filter_ambiguous: config.filter_ambiguous,
        }
    }

    fn max_differences(&self) -> u32 {
        u32::try_from(self.k).unwrap_or(u32::MAX - 1)
    }

    fn align_batch(
        &self,
        ctx: &mut JoinContext,
        sink: &mut dyn Sink<SequenceId, AlignmentCandidate>,
    ) {
        let JoinContext {
            references,
            queries,
            best,
            extender,
            stats,
        } = ctx;

        if self.filter_ambiguous {
            best.clear();
            best.resize(queries.len(), BestAlignmentState::new(self.max_differences()));
        }

        for tile in references.chunks(self.block_size) {
            for (qi, query) in queries.iter().enumerate() {
                for reference in tile {
                    stats.pairs += 1;
                    let Some(candidate) =
                        extender.extend_seed_pair(reference, query, self.seed_len, self.k)
                    else {
                        continue;
                    };

                    if self.filter_ambiguous {
                        best[qi].offer(candidate);
                    } else {
                        sink.collect(query.id, candidate);
                        stats.emitted += 1;
                    }
                }
            }
        }

        if self.filter_ambiguous {
            for (query, state) in queries.iter().zip(best.iter()) {
                for candidate in state.winners() {
                    sink.collect(query.id, candidate);
                    stats.emitted += 1;
                }
            }
        }
    }
}

impl GroupReducer for JoinReducer {
    type Key = SeedKey;
    type Value = SeedOccurrence;
    type OutKey = SequenceId;
    type OutValue = AlignmentCandidate;
    type Context = JoinContext;
    type Error = JoinError;

    fn new_context(&self) -> JoinContext {
        JoinContext {
            references: Vec::new(),
            queries: Vec::with_capacity(self.block_size),
            best: Vec::new(),
            extender: LandauVishkin::with_budget(self.allow_indels, self.k),
            stats: JoinStats::default(),
        }
    }

    fn reduce(
        &self,
        ctx: &mut JoinContext,
        key: &SeedKey,
        values: &mut dyn Iterator<Item = SeedOccurrence>,
        sink: &mut dyn Sink<SequenceId, AlignmentCandidate>,
    ) -> Result<(), JoinError> {
        ctx.references.clear();
        ctx.queries.clear();
        ctx.stats.groups += 1;

        let mut queries_seen = 0;
        for occurrence in values {
            if occurrence.is_reference {
                if queries_seen > 0 {
                    return Err(JoinError::ReferenceAfterQuery {
                        seed: key.clone(),
                        ref_id: occurrence.id,
                        queries: queries_seen,
                    });
                }
                ctx.references.push(occurrence);
                ctx.stats.references += 1;
                continue;
            }

            if ctx.references.is_empty() {
                debug!("Seed {key:?} has no reference occurrences, skipping group");
                ctx.stats.abandoned_groups += 1;
                return Ok(());
            }

            queries_seen += 1;
            ctx.stats.queries += 1;
            ctx.queries.push(occurrence);
            if ctx.queries.len() == self.block_size {
                self.align_batch(ctx, sink);
                ctx.queries.clear();
            }
        }

        if !ctx.queries.is_empty() {
            self.align_batch(ctx, sink);
            ctx.queries.clear();
        }

        Ok(())
    }
}
