//! Client configuration
//!
//! A [`ClientConfig`] can be written in YAML, read from `PAPERLESS_*`
//! environment variables or assembled in code, and turns into a ready
//! [`Client`].

use crate::auth::AuthConfig;
use crate::client::Client;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, HttpClientConfig};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Environment Variables
// ============================================================================

pub const ENV_URL: &str = "PAPERLESS_URL";
pub const ENV_MAX_CONCURRENT_REQUESTS: &str = "PAPERLESS_MAX_CONCURRENT_REQUESTS";
pub const ENV_AUTH_TOKEN: &str = "PAPERLESS_AUTH_TOKEN";
pub const ENV_AUTH_TOKEN_FILE: &str = "PAPERLESS_AUTH_TOKEN_FILE";
pub const ENV_AUTH_USERNAME: &str = "PAPERLESS_AUTH_USERNAME";
pub const ENV_AUTH_PASSWORD: &str = "PAPERLESS_AUTH_PASSWORD";
pub const ENV_AUTH_PASSWORD_FILE: &str = "PAPERLESS_AUTH_PASSWORD_FILE";
pub const ENV_SERVER_TIMEZONE: &str = "PAPERLESS_SERVER_TIMEZONE";
pub const ENV_CLIENT_DEBUG: &str = "PAPERLESS_CLIENT_DEBUG";

// ============================================================================
// Client Config
// ============================================================================

/// Everything needed to construct a [`Client`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// HTTP(S) URL of the Paperless instance; may contain a path
    #[serde(default)]
    pub base_url: String,

    /// Credentials given inline
    #[serde(default)]
    pub auth: AuthConfig,

    /// Read the API token from this file. Takes precedence over `auth`.
    #[serde(default)]
    pub auth_token_file: Option<PathBuf>,

    /// Read the Basic auth password from this file
    #[serde(default)]
    pub auth_password_file: Option<PathBuf>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Requests allowed in flight at once; zero or less is unlimited
    #[serde(default)]
    pub max_concurrent_requests: i64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// IANA name of the timezone the server writes log timestamps in
    #[serde(default)]
    pub server_timezone: Option<String>,

    /// Verbose logging
    #[serde(default)]
    pub debug: bool,
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth: AuthConfig::None,
            auth_token_file: None,
            auth_password_file: None,
            headers: HashMap::new(),
            max_concurrent_requests: 0,
            timeout: default_timeout(),
            server_timezone: None,
            debug: false,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Read the `PAPERLESS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let mut config = Self::default();

        if let Some(url) = get(ENV_URL) {
            config.base_url = url;
        }

        if let Some(max) = get(ENV_MAX_CONCURRENT_REQUESTS) {
            config.max_concurrent_requests = max
                .trim()
                .parse()
                .map_err(|e| Error::invalid_value(ENV_MAX_CONCURRENT_REQUESTS, format!("{e}")))?;
        }

        if let Some(token) = get(ENV_AUTH_TOKEN) {
            config.auth = AuthConfig::token(token);
        } else if let Some(username) = get(ENV_AUTH_USERNAME) {
            config.auth = AuthConfig::basic(username, get(ENV_AUTH_PASSWORD).unwrap_or_default());
        }

        config.auth_token_file = get(ENV_AUTH_TOKEN_FILE).map(PathBuf::from);
        config.auth_password_file = get(ENV_AUTH_PASSWORD_FILE).map(PathBuf::from);
        config.server_timezone = get(ENV_SERVER_TIMEZONE);

        if let Some(debug) = get(ENV_CLIENT_DEBUG) {
            config.debug = parse_bool(&debug)
                .ok_or_else(|| Error::invalid_value(ENV_CLIENT_DEBUG, format!("not a boolean: {debug:?}")))?;
        }

        Ok(config)
    }

    /// Effective credentials after reading secret files.
    ///
    /// A token file wins over every inline credential. A password file
    /// replaces the inline Basic auth password.
    pub fn resolve_auth(&self) -> Result<AuthConfig> {
        if let Some(path) = &self.auth_token_file {
            let token = read_secret(path).context("reading authentication token failed")?;
            if !token.is_empty() {
                return Ok(AuthConfig::token(token));
            }
        }

        match &self.auth {
            AuthConfig::Basic { username, password } => {
                let password = match &self.auth_password_file {
                    Some(path) => read_secret(path).context("reading password failed")?,
                    None => password.clone(),
                };
                Ok(AuthConfig::basic(username.clone(), password))
            }
            other => Ok(other.clone()),
        }
    }

    /// Parsed server timezone; `None` means local time
    pub fn timezone(&self) -> Result<Option<Tz>> {
        self.server_timezone
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|e| Error::invalid_value("server_timezone", e.to_string()))
            })
            .transpose()
    }

    /// Default log filter: `debug` when verbose logging is enabled
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    /// Transport configuration derived from this config
    pub fn http_config(&self) -> Result<HttpClientConfig> {
        if self.base_url.is_empty() {
            return Err(Error::config("Paperless URL is not specified"));
        }

        url::Url::parse(&self.base_url)?;

        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.timeout))
            .max_concurrent_requests(self.max_concurrent_requests)
            .auth(self.resolve_auth()?);

        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }

        Ok(builder.build())
    }

    /// Construct the client
    pub fn build(&self) -> Result<Client> {
        let http = HttpClient::with_config(self.http_config()?)?;
        Ok(Client::new(http).with_timezone(self.timezone()?))
    }
}

fn read_secret(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.trim_end().to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ClientConfig`]
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.config.auth = auth;
        self
    }

    pub fn auth_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.auth_token_file = Some(path.into());
        self
    }

    pub fn auth_password_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.auth_password_file = Some(path.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    pub fn max_concurrent_requests(mut self, max: i64) -> Self {
        self.config.max_concurrent_requests = max;
        self
    }

    /// Request timeout in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.timeout = seconds;
        self
    }

    pub fn server_timezone(mut self, name: impl Into<String>) -> Self {
        self.config.server_timezone = Some(name.into());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
