// tests/common/mod.rs
//! In-memory search backend shared by the integration tests.
#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use launchmon::api::protocol::{SearchRequest, SearchResponse};
use launchmon::api::{
    ApiClient, ApiError, ApiResult, ClientFactory, CredentialProvider, SearchTransport, StaticToken,
};
use launchmon::config::{ApiSettings, RetryConfig};
use launchmon::report::ReportFactory;
use launchmon::row::{text_at, Row};
use launchmon::tenant::TenantScope;
use serde_json::json;

/// Rows per (customer, source), paged `page_rows` at a time.
///
/// Page tokens are row offsets. A `<source>.id IN (...)` predicate in the
/// query text filters rows by id; every other predicate is ignored.
pub struct FakeBackend {
    page_rows: usize,
    rows: Mutex<HashMap<(String, String), Vec<Row>>>,
    failures: Mutex<HashMap<(String, String), (usize, usize, u16)>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl FakeBackend {
    pub fn new(page_rows: usize) -> Arc<Self> {
        Arc::new(Self {
            page_rows,
            rows: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn add_rows(&self, customer: &str, source: &str, rows: Vec<Row>) {
        self.rows
            .lock()
            .unwrap()
            .entry((customer.to_string(), source.to_string()))
            .or_default()
            .extend(rows);
    }

    /// Register `customer` as an enabled leaf account of itself.
    pub fn add_leaf(&self, customer: &str) {
        self.add_rows(
            customer,
            "customer_client",
            vec![account(customer, "ENABLED", false)],
        );
    }

    /// Fail the next `times` requests for `customer` on `source` with `status`.
    pub fn fail(&self, customer: &str, source: &str, times: usize, status: u16) {
        self.fail_after(customer, source, 0, times, status);
    }

    /// Serve `skip` requests normally, then fail the next `times` with `status`.
    pub fn fail_after(&self, customer: &str, source: &str, skip: usize, times: usize, status: u16) {
        self.failures.lock().unwrap().insert(
            (customer.to_string(), source.to_string()),
            (skip, times, status),
        );
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Query texts of all requests against `source`.
    pub fn queries_for(&self, source: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.body.query)
            .filter(|q| source_of(q) == source)
            .collect()
    }

    fn take_failure(&self, key: &(String, String)) -> Option<u16> {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(key) {
            Some((skip, _, _)) if *skip > 0 => {
                *skip -= 1;
                None
            }
            Some((_, times, status)) if *times > 0 => {
                *times -= 1;
                Some(*status)
            }
            _ => None,
        }
    }
}

#[async_trait]
impl SearchTransport for FakeBackend {
    async fn send(&self, request: &SearchRequest) -> ApiResult<SearchResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let query = &request.body.query;
        let source = source_of(query);
        let key = (request.customer_id.to_string(), source.clone());
        if let Some(status) = self.take_failure(&key) {
            return Err(ApiError::Status {
                status,
                body: "injected failure".into(),
            });
        }

        let mut rows = self.rows.lock().unwrap().get(&key).cloned().unwrap_or_default();
        if let Some(ids) = id_filter(query, &source) {
            let path = format!("{source}.id");
            rows.retain(|row| text_at(row, &path).is_some_and(|id| ids.contains(&id)));
        }

        let offset: usize = request
            .body
            .page_token
            .as_deref()
            .map(|t| t.parse().unwrap())
            .unwrap_or(0);
        let end = (offset + self.page_rows).min(rows.len());
        Ok(SearchResponse {
            results: rows[offset..end].to_vec(),
            next_page_token: (end < rows.len()).then(|| end.to_string()),
        })
    }
}

pub fn source_of(query: &str) -> String {
    query
        .split(" FROM ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or_default()
        .to_string()
}

fn id_filter(query: &str, source: &str) -> Option<BTreeSet<String>> {
    let marker = format!("{source}.id IN (");
    let start = query.find(&marker)? + marker.len();
    let end = start + query[start..].find(')')?;
    Some(
        query[start..end]
            .split(',')
            .map(|k| k.trim().trim_matches('\'').to_string())
            .collect(),
    )
}

/// A `customer_client` row.
pub fn account(id: &str, status: &str, manager: bool) -> Row {
    json!({"customerClient": {
        "id": id,
        "descriptiveName": format!("Account {id}"),
        "manager": manager,
        "status": status,
        "level": "1",
    }})
}

pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        enabled: true,
        max_retries,
        base_delay_ms: 1,
        max_delay_ms: 5,
        jitter_factor: 0.0,
    }
}

pub fn client_factory(backend: &Arc<FakeBackend>, retry: RetryConfig) -> Arc<ClientFactory> {
    let factory = ClientFactory::new(
        ApiSettings {
            developer_token: Some("dev-token".into()),
            ..Default::default()
        },
        retry,
        Arc::new(CredentialProvider::new(StaticToken::new("test-token"))),
        backend.clone(),
    )
    .unwrap();
    Arc::new(factory)
}

pub fn api_client(backend: &Arc<FakeBackend>, retry: RetryConfig) -> Arc<ApiClient> {
    client_factory(backend, retry).client(None)
}

pub fn report_factory(backend: &Arc<FakeBackend>, ids: &str, login: Option<&str>) -> ReportFactory {
    let scope = TenantScope::parse(ids, login).unwrap();
    ReportFactory::new(scope, client_factory(backend, RetryConfig::disabled()))
}
