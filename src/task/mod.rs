//! Task module
//!
//! Models server-side tasks and waits for them to finish.
//!
//! # Overview
//!
//! [`TaskWaiter`] repeatedly asks a [`TaskFetcher`] for the task snapshot,
//! sleeping according to a [`Backoff`] schedule between attempts, until the
//! [`WaitPolicy`] condition is satisfied. Only server errors are retried.

mod backoff;
mod types;
mod waiter;

pub use backoff::Backoff;
pub use types::{Task, TaskStatus};
pub use waiter::{
    default_wait_condition, ConditionOutcome, TaskFetcher, TaskWaiter, WaitCondition, WaitPolicy,
};
