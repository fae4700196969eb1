use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Listing endpoint descriptor. The backend names the items array after the
/// resource (`receipts`, `entries`, ...), so the key travels with the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub path: &'static str,
    pub items_key: &'static str,
}

impl Resource {
    pub const fn new(path: &'static str, items_key: &'static str) -> Self {
        Resource { path, items_key }
    }
}

/// Pagination metadata as the backend reports it. Some endpoints omit the
/// whole object for single-page results, others send `totalPages: 1`; both
/// forms mean the same thing and callers must not distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// One page of a listing endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-2xx response; `message` is the server's `{"error": ...}` body when
    /// it sent one, otherwise a generic `HTTP <status>` line.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{0}")]
    Transport(String),
    #[error("invalid listing envelope for {resource}: {reason}")]
    Envelope { resource: String, reason: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            let url = error
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".into());
            FetchError::Timeout { url }
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the dashboard backend's paginated listing endpoints.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of `resource` as `GET <base>/<path>?page=<n>&limit=<m>`.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        resource: &Resource,
        page: u32,
        limit: u32,
    ) -> Result<Page<T>, FetchError> {
        self.fetch_page_with(resource, page, limit, &[]).await
    }

    /// Same as [`fetch_page`](Self::fetch_page) with extra query parameters
    /// passed through verbatim (server-side filters like `siteId`).
    pub async fn fetch_page_with<T: DeserializeOwned>(
        &self,
        resource: &Resource,
        page: u32,
        limit: u32,
        extra: &[(&str, String)],
    ) -> Result<Page<T>, FetchError> {
        let url = format!("{}/{}", self.base_url, resource.path);
        let mut request = self
            .client
            .get(&url)
            .query(&[("page", page.to_string()), ("limit", limit.to_string())]);
        for (name, value) in extra {
            request = request.query(&[(name, value)]);
        }

        tracing::debug!(
            target: "sitedesk",
            resource = resource.path,
            page,
            limit,
            "fetch page"
        );

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .and_then(|e| e.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| {
                    format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("request failed")
                    )
                });
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response.json().await?;
        let items_value = body.get(resource.items_key).cloned().ok_or_else(|| {
            FetchError::Envelope {
                resource: resource.path.to_string(),
                reason: format!("missing `{}` array", resource.items_key),
            }
        })?;
        let items: Vec<T> =
            serde_json::from_value(items_value).map_err(|err| FetchError::Envelope {
                resource: resource.path.to_string(),
                reason: err.to_string(),
            })?;

        // A malformed pagination object is treated like an absent one; the
        // page-1 items then stand as the complete result.
        let pagination = body
            .get("pagination")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok());

        Ok(Page { items, pagination })
    }
}
