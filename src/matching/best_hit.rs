use std::cmp::Ordering;
use std::convert::Infallible;

use serde::Serialize;

use crate::core::types::{collapse_strand_duplicates, AlignmentCandidate, SequenceId};
use crate::mapreduce::{Combiner, GroupReducer, KeyPolicy, Sink};

/// Minimal-difference candidates of one read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BestHits {
    hits: Vec<AlignmentCandidate>,
}

impl BestHits {
    pub fn offer(&mut self, candidate: AlignmentCandidate) {
        match self.hits.first() {
            Some(best) if candidate.differences > best.differences => {}
            Some(best) if candidate.differences < best.differences => {
                self.hits.clear();
                self.hits.push(candidate);
            }
            _ => self.hits.push(candidate),
        }
    }

    /// Distinct minimal alignments, forward strand kept for palindromic loci.
    #[must_use]
    pub fn into_distinct(mut self) -> Vec<AlignmentCandidate> {
        collapse_strand_duplicates(&mut self.hits);
        self.hits
    }

    /// The minimal alignment if exactly one distinct alignment attains it.
    #[must_use]
    pub fn into_unique(self) -> Option<AlignmentCandidate> {
        match self.into_distinct().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

impl FromIterator<AlignmentCandidate> for BestHits {
    fn from_iter<I: IntoIterator<Item = AlignmentCandidate>>(iter: I) -> Self {
        let mut hits = Self::default();
        for candidate in iter {
            hits.offer(candidate);
        }
        hits
    }
}

/// Map-side reduction of a read's candidates to at most two distinct minimal
/// ones, which is all the resolver needs to decide uniqueness.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestHitCombiner;

impl Combiner<SequenceId, AlignmentCandidate> for BestHitCombiner {
    fn combine(&self, _read: &SequenceId, values: Vec<AlignmentCandidate>) -> Vec<AlignmentCandidate> {
        let mut distinct = values.into_iter().collect::<BestHits>().into_distinct();
        distinct.truncate(2);
        distinct
    }
}

/// Routes filter-stage records by read id.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadIdPolicy;

impl KeyPolicy<SequenceId> for ReadIdPolicy {
    fn partition(&self, key: &SequenceId, num_partitions: usize) -> usize {
        *key as usize % num_partitions.max(1)
    }

    fn sort_cmp(&self, a: &SequenceId, b: &SequenceId) -> Ordering {
        a.cmp(b)
    }

    fn group_cmp(&self, a: &SequenceId, b: &SequenceId) -> Ordering {
        a.cmp(b)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    pub reads: u64,
    pub unique: u64,
    pub ambiguous: u64,
}

impl ResolveStats {
    pub fn merge(&mut self, other: &Self) {
        self.reads += other.reads;
        self.unique += other.unique;
        self.ambiguous += other.ambiguous;
    }
}

/// Stage-two reducer: keeps a read only when its minimal-difference alignment
/// is unique across the whole reference.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestHitReducer;

impl GroupReducer for BestHitReducer {
    type Key = SequenceId;
    type Value = AlignmentCandidate;
    type OutKey = SequenceId;
    type OutValue = AlignmentCandidate;
    type Context = ResolveStats;
    type Error = Infallible;

    fn new_context(&self) -> ResolveStats {
        ResolveStats::default()
    }

    fn reduce(
        &self,
        ctx: &mut ResolveStats,
        key: &SequenceId,
        values: &mut dyn Iterator<Item = AlignmentCandidate>,
        sink: &mut dyn Sink<SequenceId, AlignmentCandidate>,
    ) -> Result<(), Infallible> {
        let hits: BestHits = values.collect();
        ctx.reads += 1;
        match hits.into_unique() {
            Some(best) => {
                ctx.unique += 1;
                sink.collect(*key, best);
            }
            None => ctx.ambiguous += 1,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapreduce::LocalExecutor;
    use crate::pipeline::PipelineError;

    fn hit(ref_id: SequenceId, start: u64, differences: u32, is_rc: bool) -> AlignmentCandidate {
        AlignmentCandidate {
            ref_id,
            ref_start: start,
            ref_end: start + 20,
            differences,
            is_rc,
        }
    }

    #[test]
    fn test_unique_minimum_wins() {
        let hits: BestHits = [hit(0, 5, 2, false), hit(0, 90, 1, true), hit(1, 3, 2, false)]
            .into_iter()
            .collect();
        assert_eq!(hits.into_unique(), Some(hit(0, 90, 1, true)));
    }

    #[test]
    fn test_tied_minimum_is_ambiguous() {
        let hits: BestHits = [hit(0, 5, 1, false), hit(0, 90, 1, true), hit(1, 3, 2, false)]
            .into_iter()
            .collect();
        assert_eq!(hits.into_unique(), None);
    }

    #[test]
    fn test_strand_duplicates_are_one_alignment() {
        let hits: BestHits = [hit(0, 5, 0, true), hit(0, 5, 0, false), hit(0, 5, 0, true)]
            .into_iter()
            .collect();
        assert_eq!(hits.into_unique(), Some(hit(0, 5, 0, false)));
    }

    #[test]
    fn test_combiner_keeps_two_minimal() {
        let combined = BestHitCombiner.combine(
            &3,
            vec![hit(0, 9, 1, false), hit(0, 1, 1, false), hit(0, 4, 2, false), hit(0, 5, 1, false)],
        );
        assert_eq!(combined, vec![hit(0, 1, 1, false), hit(0, 5, 1, false)]);
    }

    fn resolve(
        tasks: Vec<Vec<(SequenceId, AlignmentCandidate)>>,
        combiner: Option<&dyn Combiner<SequenceId, AlignmentCandidate>>,
    ) -> Vec<(SequenceId, AlignmentCandidate)> {
        let executor = LocalExecutor::new(3);
        let partitions = executor.shuffle(tasks, &ReadIdPolicy, combiner).unwrap();
        let output = executor
            .reduce::<_, _, PipelineError>(partitions, &ReadIdPolicy, &BestHitReducer)
            .unwrap();
        let mut out: Vec<_> = output.partitions.into_iter().flatten().collect();
        out.sort_by_key(|(id, c)| (*id, c.report_key()));
        out
    }

    #[test]
    fn test_combiner_is_transparent() {
        let tasks = vec![
            vec![(0, hit(0, 10, 1, false)), (1, hit(0, 50, 0, false)), (2, hit(1, 7, 1, false))],
            vec![(0, hit(0, 30, 1, false)), (1, hit(0, 60, 1, true)), (2, hit(1, 7, 1, true))],
            vec![(0, hit(0, 40, 2, false)), (3, hit(2, 0, 2, false)), (3, hit(2, 0, 2, false))],
        ];

        let plain = resolve(tasks.clone(), None);
        let combined = resolve(tasks, Some(&BestHitCombiner));
        assert_eq!(plain, combined);
        assert_eq!(
            plain,
            vec![
                (1, hit(0, 50, 0, false)),
                (2, hit(1, 7, 1, false)),
                (3, hit(2, 0, 2, false)),
            ]
        );
    }
}
