//! Splits an issue set into LLM-sized batches.

/// Partitions `items` into contiguous batches of at most `max_per_chunk`.
///
/// Batches keep the original order; only the last may be smaller. Empty
/// input yields no batches, and a `max_per_chunk` of 0 is treated as 1.
#[must_use]
pub fn plan_chunks<T>(items: &[T], max_per_chunk: usize) -> Vec<&[T]> {
    items.chunks(max_per_chunk.max(1)).collect()
}
