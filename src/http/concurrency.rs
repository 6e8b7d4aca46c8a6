//! Concurrency limiting for outbound requests
//!
//! Uses a tokio semaphore as a counting admission gate. Tokio's semaphore
//! hands out permits in FIFO order, so waiters are not starved.

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Caps the number of requests in flight at the same time
#[derive(Clone, Default)]
pub struct ConcurrencyGovernor {
    semaphore: Option<Arc<Semaphore>>,
    limit: usize,
}

impl ConcurrencyGovernor {
    /// Create a governor allowing `max_concurrent` simultaneous requests.
    ///
    /// Zero or less disables the limit; the governor then passes requests
    /// through without allocating anything.
    pub fn new(max_concurrent: i64) -> Self {
        if max_concurrent <= 0 {
            return Self::unlimited();
        }

        let limit = usize::try_from(max_concurrent).unwrap_or(Semaphore::MAX_PERMITS);
        let limit = limit.min(Semaphore::MAX_PERMITS);

        Self {
            semaphore: Some(Arc::new(Semaphore::new(limit))),
            limit,
        }
    }

    /// Governor without a limit
    pub fn unlimited() -> Self {
        Self {
            semaphore: None,
            limit: 0,
        }
    }

    /// Whether requests are gated at all
    pub fn is_enabled(&self) -> bool {
        self.semaphore.is_some()
    }

    /// Configured limit, `None` when disabled
    pub fn limit(&self) -> Option<usize> {
        self.is_enabled().then_some(self.limit)
    }

    /// Permits currently free, `None` when disabled
    pub fn available(&self) -> Option<usize> {
        self.semaphore.as_ref().map(|s| s.available_permits())
    }

    /// Run `send` once a permit is available.
    ///
    /// Waiting for the permit observes `cancel`; when it fires first the send
    /// is never started and [`Error::Cancelled`] is returned. The permit is
    /// released when `send` completes, fails or is dropped.
    pub async fn dispatch<F, T>(&self, cancel: &CancellationToken, send: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let Some(semaphore) = &self.semaphore else {
            return send.await;
        };

        let _permit = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            permit = semaphore.acquire() => {
                permit.map_err(|_| Error::Other("concurrency governor closed".into()))?
            }
        };

        send.await
    }
}

impl std::fmt::Debug for ConcurrencyGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrencyGovernor")
            .field("limit", &self.limit())
            .field("available", &self.available())
            .finish()
    }
}
