//! Transport seam between the API client and the network.
//!
//! [`SearchTransport::send_batch`] is the only place requests run
//! concurrently: all requests of a pagination round are driven together
//! with `join_all` and awaited together.

use std::time::Duration;

use async_trait::async_trait;

use super::error::{ApiError, ApiResult};
use super::protocol::{SearchRequest, SearchResponse};

/// Upper bound on a single response body (one page of rows).
const MAX_RESPONSE_BYTES: u64 = 256 * 1024 * 1024;

/// Sends prepared search requests.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Send one request and decode its response.
    async fn send(&self, request: &SearchRequest) -> ApiResult<SearchResponse>;

    /// Send a batch of requests concurrently.
    ///
    /// Results are returned in request order, one per request.
    async fn send_batch(&self, requests: &[SearchRequest]) -> Vec<ApiResult<SearchResponse>> {
        let futures: Vec<_> = requests.iter().map(|request| self.send(request)).collect();
        futures::future::join_all(futures).await
    }
}

/// HTTP transport backed by `ureq`.
///
/// `ureq` is synchronous, so each call runs in `spawn_blocking` to keep the
/// async runtime free.
pub struct HttpTransport {
    agent: ureq::Agent,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
            timeout,
        }
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn send(&self, request: &SearchRequest) -> ApiResult<SearchResponse> {
        let agent = self.agent.clone();
        let request = request.clone();
        let timeout_secs = self.timeout.as_secs();

        tokio::task::spawn_blocking(move || {
            let mut call = agent.post(&request.url);
            for (name, value) in &request.headers {
                call = call.header(name.as_str(), value.as_str());
            }

            let response = call
                .send_json(&request.body)
                .map_err(|e| classify(e, timeout_secs))?;

            let status = response.status().as_u16();
            let mut body = response.into_body();
            if !(200..300).contains(&status) {
                let text = body.read_to_string().unwrap_or_default();
                return Err(ApiError::Status { status, body: text });
            }

            body.with_config()
                .limit(MAX_RESPONSE_BYTES)
                .read_json::<SearchResponse>()
                .map_err(|e| ApiError::Decode(e.to_string()))
        })
        .await
        .map_err(|e| ApiError::TaskJoin(e.to_string()))?
    }
}

/// Map a ureq failure onto [`ApiError`].
///
/// Only connection-level failures become `Transport` (retryable). A bad
/// URL, a body that cannot be encoded or a protocol violation is `Request`.
fn classify(error: ureq::Error, timeout_secs: u64) -> ApiError {
    match error {
        ureq::Error::Timeout(_) => ApiError::Timeout(timeout_secs),
        ureq::Error::Io(_) | ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
            ApiError::Transport(error.to_string())
        }
        other => ApiError::Request(other.to_string()),
    }
}
