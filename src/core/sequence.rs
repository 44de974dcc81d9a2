//! Lazy async sequences.
//!
//! Each producer returns a fresh [`Stream`]; calling it again starts over
//! from the beginning, while a stream in progress can only move forward.

use std::num::NonZeroUsize;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};

/// Yield each element of `items` in order, then end.
pub fn from_collection<I>(items: I) -> impl Stream<Item = I::Item>
where
    I: IntoIterator,
{
    stream::iter(items)
}

/// Yield each element of `items`, pausing for `interval` after every element.
///
/// The first element is available immediately. The pause also follows the
/// last element, so the stream ends one interval after its final item.
pub fn delayed<I>(items: I, interval: Duration) -> impl Stream<Item = I::Item>
where
    I: IntoIterator,
{
    stream::unfold((items.into_iter(), false), move |(mut iter, pause)| async move {
        if pause {
            tokio::time::sleep(interval).await;
        }
        let item = iter.next()?;
        Some((item, (iter, true)))
    })
}

/// Group `source` into non-overlapping batches of `size` in arrival order.
///
/// A final partial batch is emitted if the source ends with leftovers; an
/// empty source yields nothing.
pub fn batch<St>(source: St, size: NonZeroUsize) -> impl Stream<Item = Vec<St::Item>>
where
    St: Stream,
{
    source.chunks(size.get())
}
