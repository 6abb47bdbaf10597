//! HTTP transport spreading requests over a cluster of registry nodes.
//!
//! Every call starts at a uniformly random base URL and walks the list
//! round-robin. Connection failures and 5xx responses move on to the next
//! node until the retry budget is spent; there is no backoff between
//! attempts. Any other non-success status is surfaced immediately as a
//! [`RegistryError`].

use bytes::Bytes;
use rand::Rng;
use reqwest::header::CONTENT_TYPE as CONTENT_TYPE_HEADER;
use reqwest::{Client, Method, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{ClientError, RegistryError};

/// Media type sent with every registry request.
pub const CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Per-attempt timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Failover-aware HTTP transport for a set of registry base URLs.
#[derive(Debug, Clone)]
pub struct RegistryTransport {
    client: Client,
    base_urls: Vec<String>,
    retries: usize,
}

impl RegistryTransport {
    /// Creates a transport for the given base URLs.
    ///
    /// A negative `retries` means one retry per configured URL. A call makes
    /// at most `retries + 1` attempts.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if `base_urls` is empty and
    /// `ClientError::Transport` if the HTTP client cannot be built.
    pub fn new(base_urls: &[String], retries: i32, timeout: Duration) -> Result<Self, ClientError> {
        if base_urls.is_empty() {
            return Err(ClientError::Config(
                "at least one schema registry URL is required".to_string(),
            ));
        }

        let base_urls: Vec<String> = base_urls
            .iter()
            .map(|url| url.trim_end_matches('/').to_string())
            .collect();

        let retries = usize::try_from(retries).unwrap_or(base_urls.len());

        let client = Client::builder().timeout(timeout).build()?;

        debug!(
            urls = ?base_urls,
            retries = retries,
            timeout_ms = timeout.as_millis() as u64,
            "Created schema registry transport"
        );

        Ok(Self {
            client,
            base_urls,
            retries,
        })
    }

    /// Returns the normalized base URLs.
    pub fn base_urls(&self) -> &[String] {
        &self.base_urls
    }

    /// Returns the number of retries after the first attempt.
    pub fn retries(&self) -> usize {
        self.retries
    }

    /// Issues a request against the cluster and returns the response body.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - Path appended to the chosen base URL, starting with `/`
    /// * `body` - Optional JSON request body
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` when the last attempt fails at the
    /// connection level, and `ClientError::Registry` for any response outside
    /// `[200, 400)` that is not retried.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, ClientError> {
        let node_count = self.base_urls.len();
        let offset = rand::rng().random_range(0..node_count);

        let mut attempt = 0;
        loop {
            let url = format!(
                "{}{}",
                self.base_urls[(attempt + offset) % node_count],
                path
            );

            let mut request = self
                .client
                .request(method.clone(), &url)
                .header(CONTENT_TYPE_HEADER, CONTENT_TYPE);
            if let Some(body) = &body {
                request = request.body(body.clone());
            }

            let result = request.send().await;

            if attempt < self.retries && is_retriable(&result) {
                match &result {
                    Ok(response) => warn!(
                        url = %url,
                        status = response.status().as_u16(),
                        attempt = attempt,
                        "Schema registry node returned server error, retrying"
                    ),
                    Err(e) => warn!(
                        url = %url,
                        error = %e,
                        attempt = attempt,
                        "Schema registry request failed, retrying"
                    ),
                }
                attempt += 1;
                continue;
            }

            let response = result?;
            let status = response.status();
            if !is_ok_status(status) {
                let body = response.bytes().await.unwrap_or_default();
                let error = RegistryError::from_response(status.as_u16(), &body);
                debug!(
                    url = %url,
                    status = status.as_u16(),
                    code = error.code,
                    "Schema registry returned error"
                );
                return Err(error.into());
            }

            debug!(url = %url, status = status.as_u16(), "Schema registry call succeeded");
            return Ok(response.bytes().await?);
        }
    }
}

fn is_retriable(result: &Result<Response, reqwest::Error>) -> bool {
    match result {
        Ok(response) => response.status().is_server_error(),
        Err(_) => true,
    }
}

fn is_ok_status(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_requires_urls() {
        let result = RegistryTransport::new(&[], 3, DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_negative_retries_default_to_url_count() {
        let transport = RegistryTransport::new(
            &urls(&["http://a:8081", "http://b:8081", "http://c:8081"]),
            -1,
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(transport.retries(), 3);
    }

    #[test]
    fn test_explicit_retries_kept() {
        let transport =
            RegistryTransport::new(&urls(&["http://a:8081"]), 0, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(transport.retries(), 0);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let transport =
            RegistryTransport::new(&urls(&["http://a:8081/", "http://b:8081"]), 1, DEFAULT_TIMEOUT)
                .unwrap();
        assert_eq!(transport.base_urls(), &urls(&["http://a:8081", "http://b:8081"])[..]);
    }

    #[test]
    fn test_ok_status_range() {
        assert!(is_ok_status(StatusCode::OK));
        assert!(is_ok_status(StatusCode::NO_CONTENT));
        assert!(is_ok_status(StatusCode::NOT_MODIFIED));
        assert!(!is_ok_status(StatusCode::NOT_FOUND));
        assert!(!is_ok_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_ok_status(StatusCode::CONTINUE));
    }

    #[tokio::test]
    async fn test_unreachable_node_surfaces_transport_error() {
        // port 9 (discard) is closed on test hosts; connection is refused fast
        let transport =
            RegistryTransport::new(&urls(&["http://127.0.0.1:9"]), 1, Duration::from_millis(500))
                .unwrap();
        let result = transport.call(Method::GET, "/subjects", None).await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
