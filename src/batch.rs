//! Chunking of bulk writes into bounded, contiguous index ranges.

use std::ops::RangeInclusive;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Inclusive index pair `[i, j]` into the collection being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub i: usize,
    pub j: usize,
}

impl Batch {
    pub fn range(&self) -> RangeInclusive<usize> {
        self.i..=self.j
    }

    pub fn len(&self) -> usize {
        self.j - self.i + 1
    }
}

/// Produces `[0, size-1], [size, 2*size-1], ...` until `length` is covered,
/// with the last range clamped to `length - 1`.
///
/// A zero length or a zero batch size yields no batches at all.
#[derive(Debug, Clone)]
pub struct Batcher {
    length: usize,
    batch_size: usize,
    next_start: usize,
}

impl Batcher {
    pub fn new(length: usize, batch_size: usize) -> Self {
        let next_start = if batch_size == 0 { length } else { 0 };
        Self { length, batch_size, next_start }
    }

    pub fn has_next(&self) -> bool {
        self.next_start < self.length
    }
}

impl Iterator for Batcher {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if !self.has_next() {
            return None;
        }
        let i = self.next_start;
        let j = i.saturating_add(self.batch_size - 1).min(self.length - 1);
        self.next_start = j + 1;
        Some(Batch { i, j })
    }
}

/// A transaction that accepts slices of items and is finished exactly once.
#[async_trait]
pub trait BatchWriter<T: Sync>: Send + Sized {
    type Error: std::fmt::Display + Send;

    /// Writes one slice, returning the number of rows written.
    async fn insert_batch(&mut self, items: &[T]) -> Result<u64, Self::Error>;

    async fn commit(self) -> Result<(), Self::Error>;

    async fn rollback(self) -> Result<(), Self::Error>;
}

/// Writes `items` through `writer` in batches of `batch_size`.
///
/// Commits once after every batch succeeded. The first failing batch rolls
/// back the whole transaction, including the batches already written.
pub async fn write_in_batches<T, W>(mut writer: W, items: &[T], batch_size: usize) -> Result<u64, W::Error>
where
    T: Sync,
    W: BatchWriter<T>,
{
    let mut written = 0;
    for batch in Batcher::new(items.len(), batch_size) {
        debug!("Writing batch [{}, {}]", batch.i, batch.j);
        match writer.insert_batch(&items[batch.range()]).await {
            Ok(count) => written += count,
            Err(e) => {
                warn!("Batch [{}, {}] failed, rolling back: {}", batch.i, batch.j, e);
                if let Err(rollback_err) = writer.rollback().await {
                    warn!("Rollback failed: {}", rollback_err);
                }
                return Err(e);
            }
        }
    }
    writer.commit().await?;
    Ok(written)
}
