//! Task endpoints

use super::Client;
use crate::error::{Error, Result};
use crate::http::RequestConfig;
use crate::task::{Task, TaskFetcher, TaskWaiter, WaitPolicy};
use async_trait::async_trait;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

const TASKS_PATH: &str = "api/tasks/";

impl Client {
    /// All tasks known to the server
    pub async fn list_tasks(&self, cancel: &CancellationToken) -> Result<Vec<Task>> {
        self.http
            .get_json(TASKS_PATH, RequestConfig::new(), cancel)
            .await
    }

    /// Look up a task by its external ID.
    ///
    /// No match is reported as a 404 request error, several matches as 300.
    pub async fn get_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<Task> {
        let mut tasks: Vec<Task> = self
            .http
            .get_json(
                TASKS_PATH,
                RequestConfig::new().query("task_id", task_id),
                cancel,
            )
            .await?;

        match tasks.len() {
            0 => Err(Error::request(
                StatusCode::NOT_FOUND.as_u16(),
                format!("task {task_id:?} not found"),
            )),
            1 => Ok(tasks.remove(0)),
            n => Err(Error::request(
                StatusCode::MULTIPLE_CHOICES.as_u16(),
                format!("received {n} tasks for ID {task_id:?}"),
            )),
        }
    }

    /// Poll a task until `policy` is satisfied.
    ///
    /// Returns the final snapshot when the task succeeded and
    /// [`Error::TaskFailed`] when it finished otherwise.
    pub async fn wait_for_task(
        &self,
        task_id: &str,
        policy: WaitPolicy,
        cancel: &CancellationToken,
    ) -> Result<Task> {
        TaskWaiter::new(self, policy).wait(task_id, cancel).await
    }
}

#[async_trait]
impl TaskFetcher for Client {
    async fn fetch_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<Task> {
        self.get_task(task_id, cancel).await
    }
}
