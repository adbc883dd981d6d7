//! Fan-out helpers for detail fetches.
//!
//! `fetch_parallel` is the interactive burst: a bounded prefix of the
//! requests, all at once. `fetch_batched` is the import path: every request,
//! in fixed-size concurrent groups with a pause between groups.

use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Run `f` over at most `limit` requests concurrently, preserving order.
pub async fn fetch_parallel<'a, Req, T, F, Fut>(requests: &'a [Req], limit: usize, f: F) -> Vec<T>
where
    F: Fn(&'a Req) -> Fut,
    Fut: Future<Output = T>,
{
    join_all(requests.iter().take(limit).map(&f)).await
}

/// Run `f` over all requests in groups of `group_size`, waiting `delay`
/// between groups (never after the last one). Results keep request order.
pub async fn fetch_batched<'a, Req, T, F, Fut>(
    requests: &'a [Req],
    group_size: usize,
    delay: Duration,
    f: F,
) -> Vec<T>
where
    F: Fn(&'a Req) -> Fut,
    Fut: Future<Output = T>,
{
    let group_size = group_size.max(1);
    let groups = requests.len().div_ceil(group_size);
    let mut results = Vec::with_capacity(requests.len());

    for (i, group) in requests.chunks(group_size).enumerate() {
        debug!(group = i + 1, groups, size = group.len(), "Fetching detail group");
        results.extend(join_all(group.iter().map(&f)).await);
        if i + 1 < groups && !delay.is_zero() {
            sleep(delay).await;
        }
    }
    results
}
