//! Partition / shuffle / group / reduce execution model.
//!
//! The alignment core plugs into an execution substrate through three small
//! capabilities:
//!
//! - [`KeyPolicy`]: which partition a key goes to, how keys sort inside a
//!   partition, and which keys belong to the same group
//! - [`GroupReducer`]: processes one group of values with a per-worker context
//! - [`Combiner`]: optional map-side partial aggregation
//!
//! [`local::LocalExecutor`] is an in-process substrate: map tasks and
//! partitions fan out over rayon, values cross the shuffle as bincode bytes
//! (see [`codec`]), and each partition is reduced by one worker that owns one
//! reducer context and walks its groups in order.

use std::cmp::Ordering;

pub mod codec;
pub mod local;

pub use codec::CodecError;
pub use local::LocalExecutor;

/// Routing, ordering and grouping of shuffle keys.
pub trait KeyPolicy<K>: Sync {
    /// Partition index in `0..num_partitions`.
    fn partition(&self, key: &K, num_partitions: usize) -> usize;

    /// Total order used to sort a partition before grouping.
    fn sort_cmp(&self, a: &K, b: &K) -> Ordering;

    /// Keys comparing `Equal` here are delivered to one reducer call.
    /// Must be coarser than (consistent with) [`KeyPolicy::sort_cmp`].
    fn group_cmp(&self, a: &K, b: &K) -> Ordering;
}

/// Destination for reducer output.
pub trait Sink<K, V> {
    fn collect(&mut self, key: K, value: V);
}

impl<K, V> Sink<K, V> for Vec<(K, V)> {
    fn collect(&mut self, key: K, value: V) {
        self.push((key, value));
    }
}

/// Processes the values of one group.
///
/// A context is created per worker and reused for every group that worker
/// handles; a context is never shared between workers.
pub trait GroupReducer: Sync {
    type Key;
    type Value;
    type OutKey;
    type OutValue;
    type Context: Send;
    type Error;

    fn new_context(&self) -> Self::Context;

    /// Reduce one group. `key` is the first key of the group in sort order.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole stage.
    fn reduce(
        &self,
        ctx: &mut Self::Context,
        key: &Self::Key,
        values: &mut dyn Iterator<Item = Self::Value>,
        sink: &mut dyn Sink<Self::OutKey, Self::OutValue>,
    ) -> Result<(), Self::Error>;
}

/// Map-side partial aggregation. Must be commutative and associative so
/// applying it any number of times never changes the reduced result.
pub trait Combiner<K, V>: Sync {
    fn combine(&self, key: &K, values: Vec<V>) -> Vec<V>;
}
