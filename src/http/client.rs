//! HTTP client with concurrency limiting
//!
//! Provides the transport used by every API call:
//! - Base URL handling (the Paperless URL may include a path)
//! - Authentication and default headers
//! - Concurrency limiting through [`ConcurrencyGovernor`]
//! - Cancellation of in-flight requests
//! - Conversion of non-success responses into [`Error::Request`]

use super::concurrency::ConcurrencyGovernor;
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use reqwest::header::ACCEPT;
use reqwest::multipart::Form;
use reqwest::{redirect, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Media type requested from the server, pinning API version 2
pub const ACCEPT_JSON_V2: &str = "application/json; version=2";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Number of requests allowed in flight at once; zero or less disables
    /// the limit
    pub max_concurrent_requests: i64,
    /// Credentials
    pub auth: AuthConfig,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_concurrent_requests: 0,
            auth: AuthConfig::None,
            default_headers: HashMap::new(),
            user_agent: format!("paperhooks/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Limit the number of concurrent requests
    pub fn max_concurrent_requests(mut self, max: i64) -> Self {
        self.config.max_concurrent_requests = max;
        self
    }

    /// Set credentials
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.config.auth = auth;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add several query parameters
    #[must_use]
    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add the fields of a serializable options struct as query parameters.
    ///
    /// `null` fields are skipped, arrays become comma-separated lists.
    pub fn query_from<S: Serialize>(mut self, options: &S) -> Result<Self> {
        let value = serde_json::to_value(options)?;

        let Value::Object(fields) = value else {
            return match value {
                Value::Null => Ok(self),
                _ => Err(Error::decode("query options must serialize to an object")),
            };
        };

        for (key, value) in fields {
            if let Some(text) = query_value(&value) {
                self.query.push((key, text));
            }
        }

        Ok(self)
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Value of the first query parameter named `key`
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(query_value).collect();
            (!parts.is_empty()).then(|| parts.join(","))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

/// HTTP client for the Paperless API
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Authenticator,
    governor: ConcurrencyGovernor,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        // Redirects are reported as errors instead of being followed
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(redirect::Policy::none())
            .build()?;

        let governor = ConcurrencyGovernor::new(config.max_concurrent_requests);
        let authenticator = Authenticator::new(config.auth.clone());

        Ok(Self {
            client,
            config,
            authenticator,
            governor,
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// The governor limiting concurrent requests
    pub fn governor(&self) -> &ConcurrencyGovernor {
        &self.governor
    }

    /// Send a request and return the response regardless of its status.
    ///
    /// The request waits for the concurrency governor and observes `cancel`
    /// both while waiting and while in flight.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        let req = self.prepare(method.clone(), path, &config);
        let req = match config.body {
            Some(ref body) => req.json(body),
            None => req,
        };

        self.execute(&method, path, req, cancel).await
    }

    /// POST a multipart form, returning the response regardless of its status
    pub async fn send_multipart(
        &self,
        path: &str,
        config: RequestConfig,
        form: Form,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        let req = self.prepare(Method::POST, path, &config).multipart(form);
        self.execute(&Method::POST, path, req, cancel).await
    }

    fn prepare(&self, method: Method, path: &str, config: &RequestConfig) -> RequestBuilder {
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        // Build request
        let mut req = self
            .client
            .request(method, self.build_url(path))
            .header(ACCEPT, ACCEPT_JSON_V2);

        // Add default headers
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        // Add request-specific headers
        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        // Add query parameters
        if !config.query.is_empty() {
            req = req.query(&config.query);
        }

        self.authenticator.apply(req.timeout(timeout))
    }

    async fn execute(
        &self,
        method: &Method,
        path: &str,
        req: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        let response = self
            .governor
            .dispatch(cancel, async {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(Error::Cancelled),
                    sent = req.send() => sent.map_err(Error::Transport),
                }
            })
            .await?;

        debug!(
            method = %method,
            url = %self.build_url(path),
            status = response.status().as_u16(),
            "Request completed"
        );

        Ok(response)
    }

    /// Send a request; statuses other than 200 and 204 become errors
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        self.request_expecting(
            method,
            path,
            config,
            &[StatusCode::OK, StatusCode::NO_CONTENT],
            cancel,
        )
        .await
    }

    /// Send a request; statuses not listed in `expected` become errors
    pub async fn request_expecting(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
        expected: &[StatusCode],
        cancel: &CancellationToken,
    ) -> Result<Response> {
        let response = self.send(method, path, config, cancel).await?;

        if expected.contains(&response.status()) {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Make a request and parse JSON response
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let response = self.request(method, path, config, cancel).await?;
        read_json(response, cancel).await
    }

    /// Make a GET request and parse JSON response
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
        cancel: &CancellationToken,
    ) -> Result<T> {
        self.request_json(Method::GET, path, config, cancel).await
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("governor", &self.governor)
            .finish_non_exhaustive()
    }
}

/// Read and decode a JSON response body
pub async fn read_json<T: DeserializeOwned>(
    response: Response,
    cancel: &CancellationToken,
) -> Result<T> {
    let body = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(Error::Cancelled),
        body = response.bytes() => body?,
    };

    Ok(serde_json::from_slice(&body)?)
}

/// Convert a non-success response into [`Error::Request`].
///
/// The message is the compacted JSON error body when there is one, the
/// status line otherwise.
pub async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let mut message = compact_json(&body).unwrap_or_default();

    if message.is_empty() {
        message = status_line(status);
    }

    if message.is_empty() {
        message = "unknown error".to_string();
    }

    Error::request(status.as_u16(), message)
}

/// Strip insignificant whitespace from a JSON document, keeping member order
/// and string escapes as sent. `None` when the text is not valid JSON.
pub fn compact_json(text: &str) -> Option<String> {
    serde_json::from_str::<serde::de::IgnoredAny>(text).ok()?;

    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if !c.is_ascii_whitespace() {
            out.push(c);
        }
    }

    Some(out)
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}
