//! HTTP fetcher implementation
//!
//! One GET per URL, with the configured User-Agent and no retry. Every
//! failure is returned as a [`FetchError`] naming the URL so the caller can
//! abandon just the affected subtree.

use crate::config::UserAgentConfig;
use crate::FetchError;
use reqwest::{Client, StatusCode};

/// A page body returned by a successful fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The requested URL
    pub url: String,

    /// Decoded response body
    pub body: String,
}

/// Builds the HTTP client shared by every worker
///
/// # Example
///
/// ```no_run
/// use textbook_harvest::config::UserAgentConfig;
/// use textbook_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.value.as_str())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a single page
///
/// | Condition | Result |
/// |-----------|--------|
/// | Connection / request failure | `FetchError::Transport` |
/// | Status other than 200 | `FetchError::Status` |
/// | Body cannot be decoded | `FetchError::Decode` |
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })?;

    tracing::trace!("Fetched {} ({} bytes)", url, body.len());

    Ok(FetchedPage {
        url: url.to_string(),
        body,
    })
}
