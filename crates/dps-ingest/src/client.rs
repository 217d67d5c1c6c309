//! HTTP access to the site's JSON endpoints
//!
//! The request driver only talks to a [`PageFetcher`]; [`HttpFetcher`] is the
//! reqwest implementation used by the binary.

use crate::config::CrawlConfig;
use async_trait::async_trait;
use dps_common::{DpsError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, Url};
use tracing::debug;

/// One request as built by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    /// URL-encoded form POST, used by the paginated list endpoints
    Form {
        url: String,
        form: Vec<(String, String)>,
    },
    /// Plain GET, used by the detail endpoints
    Get { url: String },
}

impl FetchRequest {
    pub fn url(&self) -> &str {
        match self {
            FetchRequest::Form { url, .. } | FetchRequest::Get { url } => url,
        }
    }

    /// Value of a form field, if this is a form request
    pub fn form_value(&self, key: &str) -> Option<&str> {
        match self {
            FetchRequest::Form { form, .. } => form
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            FetchRequest::Get { .. } => None,
        }
    }
}

/// Delivers the body of a request, or a terminal failure.
///
/// Implementations own retries and transport concerns; the driver never
/// retries a failed request.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<String>;
}

/// Join an endpoint path onto the site root
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Join an endpoint path and one percent-encoded seed segment onto the site root
pub fn detail_url(base_url: &str, path: &str, seed: &str) -> Result<String> {
    let mut url = Url::parse(&endpoint_url(base_url, path))
        .map_err(|e| DpsError::config(format!("invalid endpoint URL for {}: {}", path, e)))?;
    url.path_segments_mut()
        .map_err(|_| DpsError::config(format!("base URL cannot carry a path: {}", base_url)))?
        .pop_if_empty()
        .push(seed);
    Ok(url.into())
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client with the site's expected XHR headers
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9"));
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        let referer = format!("{}/", config.base_url.trim_end_matches('/'));
        headers.insert(
            REFERER,
            HeaderValue::from_str(&referer)
                .map_err(|e| DpsError::config(format!("invalid base URL {}: {}", config.base_url, e)))?,
        );

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| DpsError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<String> {
        let builder = match request {
            FetchRequest::Form { url, form } => self.client.post(url).form(form),
            FetchRequest::Get { url } => self.client.get(url),
        };

        let response = builder
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DpsError::network(format!("{}: {}", request.url(), e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| DpsError::network(format!("{}: {}", request.url(), e)))?;

        debug!(url = request.url(), bytes = body.len(), "Fetched response body");
        Ok(body)
    }
}
