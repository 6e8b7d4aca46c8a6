//! Enumeration of whole collections
//!
//! A producer fetches pages and pushes their items onto a bounded queue while
//! a consumer drains it, drops duplicate identities and invokes the caller's
//! handler. Both stages share one cancellation scope; the first error wins.

use super::types::{Cursor, Page};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::future::Future;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Number of fetched but not yet consumed page batches allowed at once
pub const LOOKAHEAD_PAGES: usize = 2;

/// Single-page fetch primitive supplied by the surrounding client
#[async_trait]
pub trait PageFetcher<T: Send>: Send + Sync {
    /// Fetch the page at `cursor`, or the first page for `None`
    async fn fetch_page(
        &self,
        cursor: Option<Cursor>,
        cancel: &CancellationToken,
    ) -> Result<Page<T>>;
}

/// Turn "not found" on a page past the first into an empty, terminal page.
///
/// Items deleted while a collection is enumerated shrink the page count, so a
/// page announced by the previous response may no longer exist. The same
/// condition on the first page is a genuine error.
pub fn absorb_missing_page<T>(cursor: Option<&Cursor>, result: Result<Page<T>>) -> Result<Page<T>> {
    match result {
        Err(e) if e.is_not_found() && cursor.is_some_and(|c| c.page() > 1) => {
            debug!(
                page = cursor.map(Cursor::page),
                "Page no longer available, treating as end of collection"
            );
            Ok(Page::empty())
        }
        other => other,
    }
}

/// Enumerate every item from `start` (default: first page) to the end.
///
/// `handler` is invoked once per distinct identity, in page order and then
/// server order within a page. Returns the first error raised by fetching, by
/// the handler or by cancellation. Items delivered before an error stay
/// delivered.
pub async fn list_all<T, F, I, H, Fut>(
    fetcher: &F,
    identity: I,
    start: Option<Cursor>,
    cancel: &CancellationToken,
    handler: H,
) -> Result<()>
where
    T: Send,
    F: PageFetcher<T> + ?Sized,
    I: Fn(&T) -> i64,
    H: FnMut(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let scope = cancel.child_token();
    let (queue_tx, queue_rx) = mpsc::channel::<Vec<T>>(LOOKAHEAD_PAGES);

    let producer = async {
        let result = produce(fetcher, start, &scope, queue_tx).await;
        if result.is_err() {
            scope.cancel();
        }
        result
    };

    let consumer = async {
        let result = consume(queue_rx, identity, &scope, handler).await;
        if result.is_err() {
            scope.cancel();
        }
        result
    };

    let (produced, consumed) = tokio::join!(producer, consumer);

    match (produced, consumed) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        // The stage that failed first cancelled the other one
        (Err(p), Err(c)) => Err(if p.is_cancelled() { c } else { p }),
    }
}

async fn produce<T, F>(
    fetcher: &F,
    start: Option<Cursor>,
    scope: &CancellationToken,
    queue: mpsc::Sender<Vec<T>>,
) -> Result<()>
where
    T: Send,
    F: PageFetcher<T> + ?Sized,
{
    let mut cursor = start;

    loop {
        let page = tokio::select! {
            biased;
            () = scope.cancelled() => return Err(Error::Cancelled),
            result = fetcher.fetch_page(cursor, scope) => {
                absorb_missing_page(cursor.as_ref(), result)?
            }
        };

        debug!(
            page = cursor.map_or(1, |c| c.page().max(1)),
            items = page.items.len(),
            "Fetched page"
        );

        let next = page.next;

        tokio::select! {
            biased;
            () = scope.cancelled() => return Err(Error::Cancelled),
            sent = queue.send(page.items) => {
                if sent.is_err() {
                    // Consumer is gone
                    return Ok(());
                }
            }
        }

        match next {
            Some(next) => cursor = Some(next),
            None => return Ok(()),
        }
    }
}

async fn consume<T, I, H, Fut>(
    mut queue: mpsc::Receiver<Vec<T>>,
    identity: I,
    scope: &CancellationToken,
    mut handler: H,
) -> Result<()>
where
    I: Fn(&T) -> i64,
    H: FnMut(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut seen = HashSet::new();

    loop {
        let batch = tokio::select! {
            biased;
            () = scope.cancelled() => return Err(Error::Cancelled),
            batch = queue.recv() => match batch {
                Some(batch) => batch,
                None => return Ok(()),
            },
        };

        for item in batch {
            if scope.is_cancelled() {
                return Err(Error::Cancelled);
            }

            // Items moving across a page boundary between two fetches show
            // up twice
            if !seen.insert(identity(&item)) {
                continue;
            }

            handler(item).await?;
        }
    }
}
