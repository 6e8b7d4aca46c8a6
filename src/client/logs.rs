//! Log endpoints

use super::Client;
use crate::error::Result;
use crate::http::RequestConfig;
use crate::logs::{LogEntry, LogParser};
use tokio_util::sync::CancellationToken;

impl Client {
    /// Names of the available log files
    pub async fn list_logs(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        self.http
            .get_json("api/logs/", RequestConfig::new(), cancel)
            .await
    }

    /// All entries of the named log file, timestamps interpreted in the
    /// server timezone
    pub async fn get_log(&self, name: &str, cancel: &CancellationToken) -> Result<Vec<LogEntry>> {
        let path = format!("api/logs/{}/", escape_path_segment(name));
        let lines: Vec<String> = self.http.get_json(&path, RequestConfig::new(), cancel).await?;

        Ok(LogParser::new(self.timezone).parse(&lines))
    }
}

fn escape_path_segment(segment: &str) -> String {
    // Form encoding writes spaces as '+', which is literal in a path
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
