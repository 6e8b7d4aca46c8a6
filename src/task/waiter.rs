//! Polling a task until it finishes

use super::backoff::Backoff;
use super::types::{Task, TaskStatus};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Verdict of a [`WaitCondition`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOutcome {
    /// Stop polling
    Satisfied,
    /// Poll again; the reason is logged
    Pending(String),
}

/// Decides whether a task snapshot ends the wait
pub type WaitCondition = Arc<dyn Fn(&Task) -> ConditionOutcome + Send + Sync>;

/// Satisfied once the task reached a terminal status
pub fn default_wait_condition(task: &Task) -> ConditionOutcome {
    if task.status.is_terminal() {
        ConditionOutcome::Satisfied
    } else {
        ConditionOutcome::Pending(format!(
            "task {:?} has non-terminal status {:?}",
            task.task_id,
            task.status.as_str()
        ))
    }
}

/// How long and for what to wait
#[derive(Clone)]
pub struct WaitPolicy {
    pub condition: WaitCondition,
    /// Total polling budget; zero selects [`Backoff::TASK_MAX_ELAPSED`]
    pub max_elapsed: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            condition: Arc::new(default_wait_condition),
            max_elapsed: Backoff::TASK_MAX_ELAPSED,
        }
    }
}

impl WaitPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the completion condition
    #[must_use]
    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Task) -> ConditionOutcome + Send + Sync + 'static,
    {
        self.condition = Arc::new(condition);
        self
    }

    #[must_use]
    pub fn max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    /// Budget after substituting the default for zero
    pub fn effective_max_elapsed(&self) -> Duration {
        if self.max_elapsed.is_zero() {
            Backoff::TASK_MAX_ELAPSED
        } else {
            self.max_elapsed
        }
    }

    fn backoff(&self) -> Backoff {
        Backoff::for_task_wait(self.effective_max_elapsed())
    }
}

impl fmt::Debug for WaitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitPolicy")
            .field("max_elapsed", &self.max_elapsed)
            .finish_non_exhaustive()
    }
}

/// Source of task snapshots
#[async_trait]
pub trait TaskFetcher: Send + Sync {
    async fn fetch_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<Task>;
}

/// Polls a task with exponential backoff until its condition is met.
///
/// Server errors (5xx) and unmet conditions are retried; any other error ends
/// the wait immediately. A satisfied task with a status other than
/// [`TaskStatus::Success`] becomes [`Error::TaskFailed`].
pub struct TaskWaiter<'a, F: TaskFetcher + ?Sized> {
    fetcher: &'a F,
    policy: WaitPolicy,
    backoff: Backoff,
}

impl<'a, F: TaskFetcher + ?Sized> TaskWaiter<'a, F> {
    pub fn new(fetcher: &'a F, policy: WaitPolicy) -> Self {
        let backoff = policy.backoff();
        Self {
            fetcher,
            policy,
            backoff,
        }
    }

    /// Use a custom schedule instead of the one derived from the policy
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Poll until the condition holds, the budget runs out, a fatal error
    /// occurs or `cancel` fires.
    pub async fn wait(mut self, task_id: &str, cancel: &CancellationToken) -> Result<Task> {
        let started = Instant::now();
        self.backoff.reset();

        loop {
            let fetched = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                fetched = self.fetcher.fetch_task(task_id, cancel) => fetched,
            };

            let reason = match fetched {
                Ok(task) => match (self.policy.condition)(&task) {
                    ConditionOutcome::Satisfied => return finish(task),
                    ConditionOutcome::Pending(reason) => reason,
                },
                Err(e) if e.is_server_error() => e.to_string(),
                Err(e) => return Err(e),
            };

            let elapsed = started.elapsed();
            let Some(delay) = self.backoff.next_delay(elapsed) else {
                return Err(Error::WaitTimeout {
                    task_id: task_id.to_string(),
                    elapsed,
                    reason,
                });
            };

            debug!(
                task_id = %task_id,
                delay = ?delay,
                reason = %reason,
                "Condition not met, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn finish(task: Task) -> Result<Task> {
    if task.status == TaskStatus::Success {
        Ok(task)
    } else {
        Err(Error::task_failed(task))
    }
}
