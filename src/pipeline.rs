//! End-to-end alignment over the local substrate.
//!
//! Stage one emits seeds from every reference chunk and read, shuffles them
//! by seed, and joins each seed group with [`JoinReducer`]. When ambiguous
//! reads are filtered, stage two regroups the complete stage-one output by
//! read id and keeps only reads with a unique best alignment.

use std::convert::Infallible;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::config::AlignConfig;
use crate::core::types::{AlignmentCandidate, GenomicChunk, ReadAlignment, SequenceId};
use crate::mapreduce::{CodecError, LocalExecutor};
use crate::matching::best_hit::{BestHitCombiner, BestHitReducer, ReadIdPolicy, ResolveStats};
use crate::matching::join::{JoinError, JoinReducer, JoinStats};
use crate::seeding::{EmitError, EmitStats, SeedEmitter, SeedKeyPolicy};
use crate::utils::validation::ConfigError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<Infallible> for PipelineError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub reference_chunks: usize,
    pub reads: usize,
    pub emit: EmitStats,
    pub join: JoinStats,

    /// Present when ambiguous reads were filtered
    pub resolve: Option<ResolveStats>,

    pub aligned_reads: usize,
    pub alignments: usize,
}

/// Alignments sorted by read, reference, start, end and strand.
#[derive(Debug, Clone, Serialize)]
pub struct AlignmentReport {
    pub alignments: Vec<ReadAlignment>,
    pub stats: PipelineStats,
}

/// Align `reads` against the reference chunks.
///
/// Reference chunks must come from one chunking pass (consistent ids, offsets
/// and overlap); reads are whole-read chunks with unique ids.
///
/// # Errors
///
/// Returns `PipelineError::Config` for inconsistent parameters,
/// `PipelineError::Emit` for reads outside the accepted length range,
/// `PipelineError::Join` if a seed group is out of order, or
/// `PipelineError::Codec` if shuffle records cannot be encoded or decoded.
pub fn run(
    config: &AlignConfig,
    references: &[GenomicChunk],
    reads: &[GenomicChunk],
) -> Result<AlignmentReport, PipelineError> {
    config.validate()?;

    if references.is_empty() {
        warn!("No reference sequence to align against");
    }
    if reads.is_empty() {
        warn!("No reads to align");
    }

    let mut stats = PipelineStats {
        reference_chunks: references.len(),
        reads: reads.len(),
        ..PipelineStats::default()
    };

    info!(
        "Aligning {} reads against {} reference chunks (seed length {}, k={}, indels={})",
        reads.len(),
        references.len(),
        config.seed_len(),
        config.k,
        config.allow_indels
    );

    let executor = LocalExecutor::new(config.partitions);
    let emitter = SeedEmitter::new(config);
    let chunks: Vec<&GenomicChunk> = references.iter().chain(reads).collect();

    let tasks = executor.map(&chunks, |chunk, records| {
        emitter.emit(chunk, |key, occurrence| records.push((key, occurrence)))
    })?;

    let mut seeds = Vec::with_capacity(tasks.len());
    for task in tasks {
        stats.emit.merge(&task.stats);
        seeds.push(task.records);
    }
    debug!(
        "Emitted {} seeds ({} ambiguous windows skipped, {} low complexity, {} reads discarded)",
        stats.emit.seeds,
        stats.emit.skipped_ambiguous,
        stats.emit.low_complexity,
        stats.emit.reads_discarded
    );

    let partitions = executor.shuffle(seeds, &SeedKeyPolicy, None)?;
    let joined =
        executor.reduce::<_, _, PipelineError>(partitions, &SeedKeyPolicy, &JoinReducer::new(config))?;
    for ctx in &joined.contexts {
        stats.join.merge(&ctx.stats);
    }
    info!(
        "Alignment stage: {} seed groups, {} pairs extended, {} candidates",
        stats.join.groups, stats.join.pairs, stats.join.emitted
    );

    let candidates = if config.filter_ambiguous {
        let filter = LocalExecutor::new(config.filter_partitions);
        let partitions = filter.shuffle(joined.partitions, &ReadIdPolicy, Some(&BestHitCombiner))?;
        let resolved = filter.reduce::<_, _, PipelineError>(partitions, &ReadIdPolicy, &BestHitReducer)?;

        let mut resolve = ResolveStats::default();
        for ctx in &resolved.contexts {
            resolve.merge(ctx);
        }
        info!(
            "Filter stage: {} reads with candidates, {} unique, {} ambiguous",
            resolve.reads, resolve.unique, resolve.ambiguous
        );
        stats.resolve = Some(resolve);
        resolved.partitions
    } else {
        joined.partitions
    };

    let alignments = into_report(candidates);
    stats.alignments = alignments.len();
    stats.aligned_reads = count_reads(&alignments);
    info!(
        "Reported {} alignments for {} of {} reads",
        stats.alignments, stats.aligned_reads, stats.reads
    );

    Ok(AlignmentReport { alignments, stats })
}

/// Flatten partition output, sort it, and collapse strand-equivalent
/// duplicates of the same read.
fn into_report(partitions: Vec<Vec<(SequenceId, AlignmentCandidate)>>) -> Vec<ReadAlignment> {
    let mut alignments: Vec<ReadAlignment> = partitions
        .into_iter()
        .flatten()
        .map(|(read_id, alignment)| ReadAlignment { read_id, alignment })
        .collect();

    alignments.sort_by_key(|a| (a.read_id, a.alignment.report_key()));
    alignments.dedup_by(|later, earlier| {
        later.read_id == earlier.read_id && later.alignment.same_locus(&earlier.alignment)
    });
    alignments
}

fn count_reads(alignments: &[ReadAlignment]) -> usize {
    let mut reads = 0;
    let mut last = None;
    for alignment in alignments {
        if last != Some(alignment.read_id) {
            reads += 1;
            last = Some(alignment.read_id);
        }
    }
    reads
}
