//! HTTP client for the gateway's dashboard endpoints.
//!
//! The gateway exposes three endpoints under its base path (historically
//! `/smsgateway`):
//!
//! - `ajax/getsms` - POST with form fields `all` and `date`, returns an
//!   HTML fragment with the SMS table
//! - `ajax/getrouting` - GET, returns an HTML fragment with the routing table
//! - `ajax/status` - POST, returns the router/watchdog JSON snapshot
//!
//! Session expiry is signalled inside the response body, not via HTTP
//! status, so every call simply returns the body text; the orchestrator
//! runs the guard on it. Deployments commonly sit behind a self-signed
//! certificate, hence the `accept_invalid_certs` knob.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// Errors from gateway requests.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The gateway answered with a non-success status.
    #[error("gateway returned status {0}")]
    Status(u16),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("request timed out")]
    Timeout,

    /// Client could not be constructed from the given settings.
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

/// Client for the gateway dashboard endpoints.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    endpoint: String,
}

impl GatewayClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> GatewayClientBuilder {
        GatewayClientBuilder::default()
    }

    /// The configured base endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the SMS table fragment.
    ///
    /// `all` selects between every stored SMS and only those matching the
    /// date filter; `date` is the `YYYY-MM-DD%` wildcard value.
    pub async fn get_sms(&self, all: bool, date: &str) -> Result<String, ClientError> {
        let all = if all { "true" } else { "false" };
        debug!(all, date, "fetching SMS fragment");
        let response = self
            .client
            .post(self.url("ajax/getsms"))
            .form(&[("all", all), ("date", date)])
            .send()
            .await?;
        Self::body(response).await
    }

    /// Submit the SMS filter form: the `date` and `mobile` field values
    /// posted to the form's action URL.
    pub async fn post_sms_form(&self, date: &str, mobile: &str) -> Result<String, ClientError> {
        debug!(date, mobile, "submitting SMS filter form");
        let response = self
            .client
            .post(self.url("ajax/getsms"))
            .form(&[("date", date), ("mobile", mobile)])
            .send()
            .await?;
        Self::body(response).await
    }

    /// Fetch the routing table fragment.
    pub async fn get_routing(&self) -> Result<String, ClientError> {
        debug!("fetching routing fragment");
        let response = self.client.get(self.url("ajax/getrouting")).send().await?;
        Self::body(response).await
    }

    /// Fetch the raw status body. The caller parses it as JSON.
    pub async fn get_status(&self) -> Result<String, ClientError> {
        debug!("fetching status");
        let response = self.client.post(self.url("ajax/status")).send().await?;
        Self::body(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    async fn body(response: reqwest::Response) -> Result<String, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Builder for [`GatewayClient`].
#[derive(Debug, Default)]
pub struct GatewayClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
    session_cookie: Option<String>,
}

impl GatewayClientBuilder {
    /// Set the gateway base endpoint (e.g. "https://10.0.0.5/smsgateway").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Skip TLS certificate verification, for self-signed deployments.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Carry a pre-established session cookie on every request.
    pub fn session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GatewayClient, ClientError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let mut headers = HeaderMap::new();
        if let Some(cookie) = &self.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ClientError::Build(format!("invalid session cookie: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(GatewayClient {
            client,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| crate::settings::DEFAULT_ENDPOINT.to_string()),
        })
    }
}
