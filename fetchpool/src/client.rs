//! HTTP client abstraction for testability.
//!
//! The worker never calls reqwest directly; it goes through the
//! [`FetchClient`] trait so tests can inject mock clients with canned
//! responses and the gate stays independent of any particular HTTP stack.

use crate::error::FetchError;
use crate::job::RequestOptions;
use bytes::Bytes;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default timeout for a single fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("fetchpool/", env!("CARGO_PKG_VERSION"));

/// A completed HTTP exchange, whatever its status.
///
/// The gate returns these untouched. Whether a given status counts as a
/// success, a not-found, or a failure is the completion handler's call.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response body. Empty for bodyless responses.
    pub body: Bytes,
}

impl FetchResponse {
    /// Creates a response from a status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 404, the "resource absent" status.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Trait for asynchronous fetch operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock clients in tests.
pub trait FetchClient: Send + Sync {
    /// Performs an HTTP GET of `url` with the given options.
    ///
    /// Any status counts as a completed exchange and is returned as `Ok`;
    /// `Err` is reserved for transport-level failures (connect, timeout,
    /// body read).
    fn fetch(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

/// Real fetch client backed by reqwest's pooled async client.
///
/// Tuned for bursts of many small requests: a warm connection pool,
/// TCP keepalive, and nodelay.
#[derive(Clone)]
pub struct ReqwestFetchClient {
    client: reqwest::Client,
}

impl ReqwestFetchClient {
    /// Creates a client with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(64)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl FetchClient for ReqwestFetchClient {
    async fn fetch(&self, url: &str, options: &RequestOptions) -> Result<FetchResponse, FetchError> {
        trace!(url = url, "fetch starting");

        let mut request = self.client.get(url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = match request.send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "request failed"
                );
                return Err(FetchError::Transport(e.to_string()));
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => {
                trace!(url = url, bytes = body.len(), "response body read");
                Ok(FetchResponse { status, body })
            }
            Err(e) => {
                warn!(url = url, error = %e, "failed to read response body");
                Err(FetchError::Body(e.to_string()))
            }
        }
    }
}
