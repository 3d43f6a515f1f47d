//! HTTP access to the Census table API and the NTD archive mirror.
//!
//! Requests are issued one at a time; there is no retry, timeout or
//! backoff. A slow request blocks its caller.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

async fn get<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let http_err = |source| FetchError::Http {
        url: url.to_string(),
        source,
    };
    let resp = client.execute(req).await.map_err(http_err)?;
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(http_err)?;

    debug!(url, %status, bytes = bytes.len(), "Response received");
    Ok(bytes.to_vec())
}

/// Downloads the raw body at `url`.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>, FetchError> {
    get(client, url).await
}

/// Fetches `url` and decodes the body as JSON.
///
/// Returns `Ok(None)` when the body is empty so the caller can skip the
/// request.
///
/// # Errors
///
/// [`FetchError::Parse`] when the body is non-empty but not JSON, and
/// [`FetchError::Http`] when the request itself fails.
pub async fn fetch_json<C: HttpClient>(client: &C, url: &str) -> Result<Option<Value>, FetchError> {
    let bytes = get(client, url).await?;
    if bytes.is_empty() {
        return Ok(None);
    }

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
}

#[cfg(test)]
pub(crate) mod stub {
    use super::HttpClient;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers requests from canned bodies keyed by full URL. Unknown URLs
    /// get an empty `200` body.
    #[derive(Default)]
    pub struct StubClient {
        bodies: HashMap<String, Vec<u8>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl StubClient {
        pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.bodies.insert(url.to_string(), body.into());
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for StubClient {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let url = req.url().to_string();
            self.requested.lock().unwrap().push(url.clone());
            let body = self.bodies.get(&url).cloned().unwrap_or_default();
            Ok(http::Response::builder()
                .status(200)
                .body(body)
                .unwrap()
                .into())
        }
    }
}
