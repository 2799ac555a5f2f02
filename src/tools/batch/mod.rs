//! Batch Tools

mod tests;

use futures_util::stream::{self, StreamExt};
use std::future::Future;

/// Run `operation` over `items` with at most `concurrency` in flight.
///
/// Results come back in completion order. A concurrency of 0 is treated as 1.
pub async fn batch<T, F, Fut, R>(items: Vec<T>, concurrency: usize, operation: F) -> Vec<R>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    stream::iter(items)
        .map(operation)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

/// Like [`batch`], but results line up with `items`.
pub async fn batch_ordered<T, F, Fut, R>(items: Vec<T>, concurrency: usize, operation: F) -> Vec<R>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    let indexed: Vec<(usize, T)> = items.into_iter().enumerate().collect();
    let mut results = batch(indexed, concurrency, move |(i, item)| {
        let fut = operation(item);
        async move { (i, fut.await) }
    })
    .await;
    results.sort_by_key(|(i, _)| *i);
    results.into_iter().map(|(_, r)| r).collect()
}
