//! Tenant-scoped search client with round-based pagination.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::Stream;
use tracing::{debug, warn};

use super::credentials::CredentialProvider;
use super::error::{ApiError, ApiResult, TenantFailure};
use super::protocol::{
    SearchBody, SearchRequest, SearchResponse, DEVELOPER_TOKEN_HEADER, LOGIN_CUSTOMER_HEADER,
};
use super::transport::SearchTransport;
use crate::config::{ApiSettings, RetryConfig};
use crate::query::QueryDefinition;
use crate::row::Row;
use crate::tenant::{normalize_all, CustomerId};

/// Client for the search endpoint, bound to one login customer.
///
/// The client holds no per-query state; every [`ApiClient::query`] call
/// returns an independent [`RowStream`].
pub struct ApiClient {
    settings: ApiSettings,
    page_size: u32,
    login_customer_id: Option<CustomerId>,
    developer_token: Option<String>,
    credentials: Arc<CredentialProvider>,
    transport: Arc<dyn SearchTransport>,
    retry: RetryConfig,
}

impl ApiClient {
    pub fn new(
        settings: ApiSettings,
        login_customer_id: Option<CustomerId>,
        credentials: Arc<CredentialProvider>,
        transport: Arc<dyn SearchTransport>,
    ) -> Self {
        let page_size = settings.effective_page_size();
        Self {
            settings,
            page_size,
            login_customer_id,
            developer_token: None,
            credentials,
            transport,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_developer_token(mut self, token: Option<String>) -> Self {
        self.developer_token = token;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn login_customer_id(&self) -> Option<&CustomerId> {
        self.login_customer_id.as_ref()
    }

    /// Start a query across `customer_ids`.
    ///
    /// Ids are normalized up front; any malformed id fails the call before a
    /// request is sent. Nothing goes over the network until the returned
    /// stream is polled.
    pub fn query<T, S>(
        &self,
        customer_ids: &[T],
        query: &QueryDefinition,
        extra_wheres: &[S],
    ) -> ApiResult<RowStream<'_>>
    where
        T: AsRef<str>,
        S: AsRef<str>,
    {
        let customer_ids = normalize_all(customer_ids)?;
        let query_text = query.compile(extra_wheres);
        let stream = RowStream::new(self, query_text, customer_ids);
        debug!(stream = %stream.id, query = %stream.query, "starting search");
        Ok(stream)
    }

    fn build_request(&self, query: &str, cursor: &Cursor, token: &str) -> SearchRequest {
        let mut headers = vec![("Authorization".to_string(), format!("Bearer {token}"))];
        if let Some(developer_token) = &self.developer_token {
            headers.push((DEVELOPER_TOKEN_HEADER.to_string(), developer_token.clone()));
        }
        if let Some(login) = &self.login_customer_id {
            headers.push((LOGIN_CUSTOMER_HEADER.to_string(), login.to_string()));
        }

        SearchRequest {
            customer_id: cursor.customer_id.clone(),
            url: self.settings.search_url(cursor.customer_id.as_str()),
            headers,
            body: SearchBody {
                page_size: self.page_size,
                query: query.to_string(),
                customer_id: cursor.customer_id.to_string(),
                page_token: cursor.page_token.clone(),
            },
        }
    }

    /// Send one page request per cursor as a single batch.
    ///
    /// Failed requests are retried (alone) while every failure is retryable
    /// and attempts remain. Responses come back in cursor order.
    async fn fetch_round(
        &self,
        query: &str,
        cursors: &[Cursor],
    ) -> ApiResult<Vec<SearchResponse>> {
        let token = self.credentials.token().await?;

        let mut indices: Vec<usize> = (0..cursors.len()).collect();
        let mut requests: Vec<SearchRequest> = cursors
            .iter()
            .map(|cursor| self.build_request(query, cursor, token))
            .collect();
        let mut responses: Vec<Option<SearchResponse>> = vec![None; cursors.len()];
        let mut attempt = 0;

        loop {
            let results = self.transport.send_batch(&requests).await;
            if results.len() != requests.len() {
                return Err(ApiError::Transport(format!(
                    "batch returned {} responses for {} requests",
                    results.len(),
                    requests.len()
                )));
            }

            let mut retry_indices = Vec::new();
            let mut retry_requests = Vec::new();
            let mut failures = Vec::new();
            for ((index, request), result) in indices.into_iter().zip(requests).zip(results) {
                match result {
                    Ok(response) => responses[index] = Some(response),
                    Err(error) => {
                        failures.push(TenantFailure {
                            customer_id: request.customer_id.clone(),
                            error,
                        });
                        retry_indices.push(index);
                        retry_requests.push(request);
                    }
                }
            }

            if failures.is_empty() {
                break;
            }

            let retryable = failures.iter().all(|f| f.error.is_retryable());
            if !retryable || !self.retry.should_retry(attempt) {
                return Err(ApiError::Tenants(failures));
            }

            attempt += 1;
            let delay = self.retry.delay_for_attempt(attempt);
            let failed = failures.len();
            let error = ApiError::Tenants(failures);
            warn!(
                attempt,
                failed,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "retrying failed search requests"
            );
            tokio::time::sleep(delay).await;

            indices = retry_indices;
            requests = retry_requests;
        }

        Ok(responses.into_iter().flatten().collect())
    }
}

/// Position of one customer's result stream.
#[derive(Debug, Clone)]
struct Cursor {
    customer_id: CustomerId,
    page_token: Option<String>,
}

/// Lazy, single-pass sequence of result rows for one query.
///
/// Each round sends the next page for every customer that still has one,
/// all in one batch; the next round is only built once the current one is
/// fully decoded. Rows of one customer keep their page order. Rows of
/// different customers interleave in no guaranteed order.
///
/// After the last row, or after an error, the stream yields `None` forever.
pub struct RowStream<'a> {
    client: &'a ApiClient,
    id: uuid::Uuid,
    query: String,
    pending: Vec<Cursor>,
    buffer: VecDeque<Row>,
    rounds: u32,
    finished: bool,
}

impl<'a> RowStream<'a> {
    fn new(client: &'a ApiClient, query: String, customer_ids: Vec<CustomerId>) -> Self {
        let pending = customer_ids
            .into_iter()
            .map(|customer_id| Cursor {
                customer_id,
                page_token: None,
            })
            .collect();

        Self {
            client,
            id: uuid::Uuid::new_v4(),
            query,
            pending,
            buffer: VecDeque::new(),
            rounds: 0,
            finished: false,
        }
    }

    /// The compiled query text this stream runs.
    pub fn query_text(&self) -> &str {
        &self.query
    }

    /// Number of pagination rounds dispatched so far.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Pull the next row, dispatching a new round when the buffer is empty.
    pub async fn next(&mut self) -> Option<ApiResult<Row>> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Some(Ok(row));
            }
            if self.finished || self.pending.is_empty() {
                self.finished = true;
                return None;
            }
            if let Err(e) = self.advance().await {
                self.finished = true;
                self.pending.clear();
                return Some(Err(e));
            }
        }
    }

    async fn advance(&mut self) -> ApiResult<()> {
        let cursors = std::mem::take(&mut self.pending);
        self.rounds += 1;
        debug!(
            stream = %self.id,
            round = self.rounds,
            requests = cursors.len(),
            "dispatching search round"
        );

        let responses = self.client.fetch_round(&self.query, &cursors).await?;
        for (cursor, response) in cursors.into_iter().zip(responses) {
            if let Some(token) = response.continuation() {
                self.pending.push(Cursor {
                    customer_id: cursor.customer_id,
                    page_token: Some(token.to_string()),
                });
            }
            self.buffer.extend(response.results);
        }
        Ok(())
    }

    /// Drain the stream into a vector.
    pub async fn collect_rows(mut self) -> ApiResult<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Adapt into a [`futures::Stream`].
    pub fn into_stream(self) -> impl Stream<Item = ApiResult<Row>> + 'a {
        futures::stream::unfold(self, |mut rows| async move {
            rows.next().await.map(|row| (row, rows))
        })
    }
}
