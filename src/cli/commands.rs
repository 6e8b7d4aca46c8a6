//! CLI commands and argument parsing

use crate::auth::AuthConfig;
use crate::config::{
    ClientConfig, ENV_AUTH_PASSWORD, ENV_AUTH_PASSWORD_FILE, ENV_AUTH_TOKEN, ENV_AUTH_TOKEN_FILE,
    ENV_AUTH_USERNAME, ENV_CLIENT_DEBUG, ENV_MAX_CONCURRENT_REQUESTS, ENV_SERVER_TIMEZONE, ENV_URL,
};
use crate::error::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for the Paperless-ngx API
#[derive(Parser, Debug)]
#[command(name = "paperhooks")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML); flags and environment override it
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// HTTP(S) URL for Paperless
    #[arg(long, env = ENV_URL, global = true)]
    pub url: Option<String>,

    /// Number of concurrent requests allowed to be in flight
    #[arg(long, env = ENV_MAX_CONCURRENT_REQUESTS, global = true)]
    pub max_concurrent_requests: Option<i64>,

    /// Authenticate via token
    #[arg(long, env = ENV_AUTH_TOKEN, hide_env_values = true, global = true)]
    pub auth_token: Option<String>,

    /// Read the authentication token from a file
    #[arg(long, env = ENV_AUTH_TOKEN_FILE, global = true)]
    pub auth_token_file: Option<PathBuf>,

    /// Username for HTTP basic authentication
    #[arg(long, env = ENV_AUTH_USERNAME, global = true)]
    pub auth_username: Option<String>,

    /// Password for HTTP basic authentication
    #[arg(long, env = ENV_AUTH_PASSWORD, hide_env_values = true, global = true)]
    pub auth_password: Option<String>,

    /// Read the password from a file
    #[arg(long, env = ENV_AUTH_PASSWORD_FILE, global = true)]
    pub auth_password_file: Option<PathBuf>,

    /// HTTP header to set on all requests, as `Name: value`
    #[arg(long = "header", value_parser = parse_header, global = true)]
    pub headers: Vec<(String, String)>,

    /// Timezone for parsing timestamps without offset
    #[arg(long, env = ENV_SERVER_TIMEZONE, global = true)]
    pub server_timezone: Option<String>,

    /// Enable verbose log messages
    #[arg(long, env = ENV_CLIENT_DEBUG, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test whether the API is available
    Ping,

    /// List all tags
    Tags {
        /// Only tags whose name contains this text (case-insensitive)
        #[arg(long)]
        name: Option<String>,

        /// Field to order by, prefixed with `-` for descending order
        #[arg(long)]
        ordering: Option<String>,

        /// Items requested per page
        #[arg(long)]
        page_size: Option<u64>,
    },

    /// List all tasks
    Tasks,

    /// Wait for a task to finish
    WaitTask {
        /// Task ID as returned when a document is uploaded
        task_id: String,

        /// Give up after this many seconds (default: one hour)
        #[arg(long)]
        max_elapsed: Option<u64>,
    },

    /// List log files, or show the entries of one
    Logs {
        /// Log file name
        name: Option<String>,
    },

    /// Show the health of the server and its services
    Status,

    /// Show the authenticated user
    Whoami,

    /// Upload a document for consumption
    Upload {
        /// File to upload
        file: PathBuf,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Correspondent ID
        #[arg(long)]
        correspondent: Option<i64>,

        /// Document type ID
        #[arg(long)]
        document_type: Option<i64>,

        /// Tag ID; may be repeated
        #[arg(long = "tag")]
        tags: Vec<i64>,

        /// Wait for consumption to finish and print the task
        #[arg(long)]
        wait: bool,

        /// Give up waiting after this many seconds (default: one hour)
        #[arg(long, requires = "wait")]
        max_elapsed: Option<u64>,
    },

    /// Download a document file
    Download {
        /// Document ID
        id: i64,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,

        /// Which rendition to fetch
        #[arg(long, value_enum, default_value = "original")]
        variant: DownloadVariant,
    },

    /// Print the environment of a post-consumption script
    PostConsume {
        /// Also fetch the consumed document from the API
        #[arg(long)]
        fetch: bool,
    },

    /// Print the environment of a pre-consumption script
    PreConsume,
}

/// Document renditions available for download
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DownloadVariant {
    /// File as consumed
    Original,
    /// Archived PDF/A
    Archived,
    /// Preview image
    Thumbnail,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one item per line)
    Json,
    /// Human-readable JSON
    Pretty,
}

impl Cli {
    /// Client configuration from the optional file with flags applied on top
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_yaml_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(url) = &self.url {
            config.base_url.clone_from(url);
        }

        if let Some(max) = self.max_concurrent_requests {
            config.max_concurrent_requests = max;
        }

        if let Some(token) = &self.auth_token {
            config.auth = AuthConfig::token(token.clone());
        } else if let Some(username) = &self.auth_username {
            config.auth = AuthConfig::basic(
                username.clone(),
                self.auth_password.clone().unwrap_or_default(),
            );
        }

        if self.auth_token_file.is_some() {
            config.auth_token_file.clone_from(&self.auth_token_file);
        }

        if self.auth_password_file.is_some() {
            config.auth_password_file.clone_from(&self.auth_password_file);
        }

        config.headers.extend(self.headers.iter().cloned());

        if self.server_timezone.is_some() {
            config.server_timezone.clone_from(&self.server_timezone);
        }

        config.debug |= self.debug;

        Ok(config)
    }
}

fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::invalid_value("header", format!("expected `Name: value`, got {raw:?}")))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_value("header", "empty header name"));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("X-Header: value").unwrap(),
            ("X-Header".to_string(), "value".to_string())
        );
        assert_eq!(
            parse_header("X-Empty:").unwrap(),
            ("X-Empty".to_string(), String::new())
        );
        assert!(parse_header("no separator").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_parse_wait_task() {
        let cli = Cli::try_parse_from([
            "paperhooks",
            "--url",
            "http://localhost:8000",
            "--auth-token",
            "abc",
            "--header",
            "X-Test: 1",
            "wait-task",
            "2e84c704",
            "--max-elapsed",
            "90",
        ])
        .unwrap();

        match &cli.command {
            Commands::WaitTask {
                task_id,
                max_elapsed,
            } => {
                assert_eq!(task_id, "2e84c704");
                assert_eq!(*max_elapsed, Some(90));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let config = cli.client_config().unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.auth, AuthConfig::token("abc"));
        assert_eq!(config.headers.get("X-Test"), Some(&"1".to_string()));
    }

    #[test]
    fn test_config_file_enables_debug_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.yaml");
        std::fs::write(&path, "base_url: http://from-file:8000\ndebug: true\n").unwrap();

        let cli = Cli::try_parse_from(["paperhooks", "-C", path.to_str().unwrap(), "ping"]).unwrap();

        let config = cli.client_config().unwrap();
        assert!(config.debug);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_parse_upload() {
        let cli = Cli::try_parse_from([
            "paperhooks",
            "upload",
            "scan.pdf",
            "--title",
            "Invoice",
            "--tag",
            "1",
            "--tag",
            "7",
            "--wait",
            "--max-elapsed",
            "60",
        ])
        .unwrap();

        match cli.command {
            Commands::Upload {
                file,
                title,
                tags,
                wait,
                max_elapsed,
                ..
            } => {
                assert_eq!(file, PathBuf::from("scan.pdf"));
                assert_eq!(title.as_deref(), Some("Invoice"));
                assert_eq!(tags, vec![1, 7]);
                assert!(wait);
                assert_eq!(max_elapsed, Some(60));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_upload_max_elapsed_requires_wait() {
        let result = Cli::try_parse_from(["paperhooks", "upload", "scan.pdf", "--max-elapsed", "60"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_download() {
        let cli = Cli::try_parse_from([
            "paperhooks",
            "download",
            "42",
            "-o",
            "out.pdf",
            "--variant",
            "archived",
        ])
        .unwrap();

        match cli.command {
            Commands::Download { id, output, variant } => {
                assert_eq!(id, 42);
                assert_eq!(output, PathBuf::from("out.pdf"));
                assert_eq!(variant, DownloadVariant::Archived);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.yaml");
        std::fs::write(
            &path,
            "base_url: http://from-file:8000\nmax_concurrent_requests: 8\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "paperhooks",
            "-C",
            path.to_str().unwrap(),
            "--max-concurrent-requests",
            "2",
            "ping",
        ])
        .unwrap();

        let config = cli.client_config().unwrap();
        assert_eq!(config.max_concurrent_requests, 2);
        assert!(!config.base_url.is_empty());
    }
}
