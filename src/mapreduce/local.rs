use std::cmp::Ordering;

use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::codec::{self, CodecError};
use super::{Combiner, GroupReducer, KeyPolicy};

/// Output of one map task.
#[derive(Debug)]
pub struct MapTask<K, V, S> {
    pub records: Vec<(K, V)>,
    pub stats: S,
}

/// Shuffled records of one partition, sorted by [`KeyPolicy::sort_cmp`].
/// Values are held in their wire encoding.
#[derive(Debug)]
pub struct Partition<K> {
    pub records: Vec<(K, Vec<u8>)>,
}

impl<K> Partition<K> {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

/// Output of a reduce phase.
#[derive(Debug)]
pub struct ReduceOutput<K, V, C> {
    /// Reducer output, one vector per partition
    pub partitions: Vec<Vec<(K, V)>>,

    /// Final reducer context of each partition worker
    pub contexts: Vec<C>,

    /// Number of groups reduced across all partitions
    pub groups: usize,
}

impl<K, V, C> ReduceOutput<K, V, C> {
    /// Total records written by all partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process execution substrate.
#[derive(Debug, Clone, Copy)]
pub struct LocalExecutor {
    partitions: usize,
}

impl LocalExecutor {
    /// Create an executor with `partitions` shuffle partitions (at least one).
    #[must_use]
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions: partitions.max(1),
        }
    }

    #[must_use]
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Run one map task per input in parallel. Tasks share no state.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by any task.
    pub fn map<In, K, V, S, E, F>(&self, inputs: &[In], task: F) -> Result<Vec<MapTask<K, V, S>>, E>
    where
        In: Sync,
        K: Send,
        V: Send,
        S: Send,
        E: Send,
        F: Fn(&In, &mut Vec<(K, V)>) -> Result<S, E> + Sync,
    {
        inputs
            .par_iter()
            .map(|input| {
                let mut records = Vec::new();
                let stats = task(input, &mut records)?;
                Ok(MapTask { records, stats })
            })
            .collect()
    }

    /// Route map output to partitions, apply the combiner per task and
    /// partition, encode values, and sort every partition.
    ///
    /// Partition contents keep task order for equal keys, so the result is
    /// deterministic for a given input order.
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if a value cannot be encoded.
    pub fn shuffle<K, V, P>(
        &self,
        tasks: Vec<Vec<(K, V)>>,
        policy: &P,
        combiner: Option<&dyn Combiner<K, V>>,
    ) -> Result<Vec<Partition<K>>, CodecError>
    where
        K: Clone + Send + Sync,
        V: Serialize + Send,
        P: KeyPolicy<K>,
    {
        let n = self.partitions;

        let routed: Vec<Vec<Vec<(K, Vec<u8>)>>> = tasks
            .into_par_iter()
            .map(|records| {
                let mut buckets: Vec<Vec<(K, V)>> = (0..n).map(|_| Vec::new()).collect();
                for (key, value) in records {
                    let p = policy.partition(&key, n);
                    buckets[p].push((key, value));
                }

                buckets
                    .into_iter()
                    .map(|bucket| {
                        let bucket = match combiner {
                            Some(combiner) => combine_bucket(bucket, policy, combiner),
                            None => bucket,
                        };
                        bucket
                            .into_iter()
                            .map(|(key, value)| Ok((key, codec::encode(&value)?)))
                            .collect::<Result<Vec<_>, CodecError>>()
                    })
                    .collect::<Result<Vec<_>, CodecError>>()
            })
            .collect::<Result<_, _>>()?;

        let mut partitions: Vec<Partition<K>> = (0..n).map(|_| Partition::empty()).collect();
        for task in routed {
            for (p, bucket) in task.into_iter().enumerate() {
                partitions[p].records.extend(bucket);
            }
        }

        partitions
            .par_iter_mut()
            .for_each(|partition| partition.records.sort_by(|a, b| policy.sort_cmp(&a.0, &b.0)));

        for (i, partition) in partitions.iter().enumerate() {
            debug!("Partition {i}: {} records", partition.records.len());
        }

        Ok(partitions)
    }

    /// Reduce every partition in parallel. Each partition is handled by one
    /// worker with its own reducer context; groups within a partition are
    /// reduced sequentially in sort order.
    ///
    /// # Errors
    ///
    /// Returns the first reducer or decoding error; the stage output is
    /// discarded in that case.
    pub fn reduce<R, P, E>(
        &self,
        partitions: Vec<Partition<R::Key>>,
        policy: &P,
        reducer: &R,
    ) -> Result<ReduceOutput<R::OutKey, R::OutValue, R::Context>, E>
    where
        R: GroupReducer,
        R::Key: Send + Sync,
        R::Value: DeserializeOwned,
        R::OutKey: Send,
        R::OutValue: Send,
        P: KeyPolicy<R::Key>,
        E: From<R::Error> + From<CodecError> + Send,
    {
        let results = partitions
            .into_par_iter()
            .map(|partition| reduce_partition::<R, P, E>(&partition, policy, reducer))
            .collect::<Result<Vec<_>, E>>()?;

        let mut output = ReduceOutput {
            partitions: Vec::with_capacity(results.len()),
            contexts: Vec::with_capacity(results.len()),
            groups: 0,
        };
        for (records, ctx, groups) in results {
            output.partitions.push(records);
            output.contexts.push(ctx);
            output.groups += groups;
        }

        Ok(output)
    }
}

type PartitionResult<R> = (
    Vec<(<R as GroupReducer>::OutKey, <R as GroupReducer>::OutValue)>,
    <R as GroupReducer>::Context,
    usize,
);

fn reduce_partition<R, P, E>(
    partition: &Partition<R::Key>,
    policy: &P,
    reducer: &R,
) -> Result<PartitionResult<R>, E>
where
    R: GroupReducer,
    R::Value: DeserializeOwned,
    P: KeyPolicy<R::Key>,
    E: From<R::Error> + From<CodecError>,
{
    let records = &partition.records;
    let mut ctx = reducer.new_context();
    let mut out: Vec<(R::OutKey, R::OutValue)> = Vec::new();
    let mut groups = 0;

    let mut start = 0;
    while start < records.len() {
        let key = &records[start].0;
        let mut end = start + 1;
        while end < records.len() && policy.group_cmp(key, &records[end].0) == Ordering::Equal {
            end += 1;
        }

        let values = records[start..end]
            .iter()
            .map(|(_, bytes)| codec::decode(bytes))
            .collect::<Result<Vec<R::Value>, CodecError>>()?;

        reducer.reduce(&mut ctx, key, &mut values.into_iter(), &mut out)?;
        groups += 1;
        start = end;
    }

    Ok((out, ctx, groups))
}

/// Sort a map-side bucket, group it, and replace every group's values with
/// the combiner's output.
fn combine_bucket<K, V, P>(
    mut bucket: Vec<(K, V)>,
    policy: &P,
    combiner: &dyn Combiner<K, V>,
) -> Vec<(K, V)>
where
    K: Clone,
    P: KeyPolicy<K>,
{
    bucket.sort_by(|a, b| policy.sort_cmp(&a.0, &b.0));

    let mut combined = Vec::with_capacity(bucket.len());
    let mut records = bucket.into_iter().peekable();
    while let Some((key, value)) = records.next() {
        let mut values = vec![value];
        while let Some((_, value)) =
            records.next_if(|(next, _)| policy.group_cmp(&key, next) == Ordering::Equal)
        {
            values.push(value);
        }
        for value in combiner.combine(&key, values) {
            combined.push((key.clone(), value));
        }
    }
    combined
}
