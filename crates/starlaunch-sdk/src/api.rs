//! Shared HTTP plumbing for the REST collaborators.

use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::error::SdkError;

/// `{ "error": "..." }` payload returned by the control API on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Base URL plus a pooled HTTP client.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Same as [`new`](Self::new) but reuses an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, SdkError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "API URL must start with http:// or https://, got \"{base_url}\""
            )));
        }
        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    /// Absolute URL for an API path such as `/missions`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The API root this client was built with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Read the human-readable reason out of a failed response.
///
/// Prefers the `error` field of a JSON body, then the raw body, then the
/// status line.
pub(crate) async fn failure_reason(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => status_line(status),
        Err(_) => body,
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}
