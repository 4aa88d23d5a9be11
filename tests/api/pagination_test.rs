// tests/api/pagination_test.rs
#[path = "../common/mod.rs"]
mod common;

use common::{api_client, FakeBackend};
use futures::StreamExt;
use launchmon::api::protocol::{DEVELOPER_TOKEN_HEADER, LOGIN_CUSTOMER_HEADER};
use launchmon::config::{ApiSettings, RetryConfig, PAGE_SIZE};
use launchmon::query::QueryDefinition;
use launchmon::row::text_at;
use serde_json::json;

fn campaign_rows(customer: &str, count: usize) -> Vec<serde_json::Value> {
    (0..count)
        .map(|i| json!({"campaign": {"id": format!("{customer}{i:02}")}}))
        .collect()
}

fn campaign_query() -> QueryDefinition {
    QueryDefinition::new("campaign").select(["campaign.id"])
}

#[tokio::test]
async fn test_every_page_of_every_customer() {
    let backend = FakeBackend::new(10);
    backend.add_rows("1", "campaign", campaign_rows("1", 24));
    backend.add_rows("2", "campaign", campaign_rows("2", 5));
    let client = api_client(&backend, RetryConfig::disabled());

    let mut stream = client.query(&["1", "2"], &campaign_query(), &[] as &[&str]).unwrap();
    let mut rows = Vec::new();
    while let Some(row) = stream.next().await {
        rows.push(row.unwrap());
    }

    assert_eq!(rows.len(), 29);
    assert_eq!(stream.rounds(), 3);

    let ids = |prefix: &str| -> Vec<String> {
        rows.iter()
            .filter_map(|r| text_at(r, "campaign.id"))
            .filter(|id| id.starts_with(prefix))
            .collect()
    };
    let expected: Vec<String> = (0..24).map(|i| format!("1{i:02}")).collect();
    assert_eq!(ids("1"), expected);
    assert_eq!(ids("2").len(), 5);

    // 2 requests in the first round, then only customer 1 continues.
    let requests = backend.requests();
    assert_eq!(requests.len(), 4);
    let tokens: Vec<Option<&str>> = requests.iter().map(|r| r.body.page_token.as_deref()).collect();
    assert_eq!(tokens, vec![None, None, Some("10"), Some("20")]);
}

#[tokio::test]
async fn test_stream_is_lazy_and_single_pass() {
    let backend = FakeBackend::new(10);
    backend.add_rows("1", "campaign", campaign_rows("1", 3));
    let client = api_client(&backend, RetryConfig::disabled());

    let mut stream = client.query(&["1"], &campaign_query(), &[] as &[&str]).unwrap();
    assert!(backend.requests().is_empty());

    let rows = stream.next().await;
    assert!(rows.is_some());
    assert_eq!(backend.requests().len(), 1);

    let rest: Vec<_> = stream.into_stream().collect().await;
    assert_eq!(rest.len(), 2);
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_same_query_text_for_every_customer() {
    let backend = FakeBackend::new(10);
    let client = api_client(&backend, RetryConfig::disabled());

    let rows = client
        .query(&["1,2", "3"], &campaign_query(), &["campaign.status = 'ENABLED'"])
        .unwrap()
        .collect_rows()
        .await
        .unwrap();
    assert!(rows.is_empty());

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(
            request.body.query,
            "SELECT campaign.id FROM campaign WHERE campaign.status = 'ENABLED'"
        );
        assert_eq!(request.body.customer_id, request.customer_id.as_str());
        assert!(request.url.ends_with(&format!(
            "/customers/{}/googleAds:search",
            request.customer_id
        )));
        assert_eq!(request.header("Authorization"), Some("Bearer test-token"));
        assert_eq!(request.header(DEVELOPER_TOKEN_HEADER), Some("dev-token"));
        assert_eq!(request.header(LOGIN_CUSTOMER_HEADER), None);
    }
}

#[tokio::test]
async fn test_page_size_override_is_ignored() {
    let settings = ApiSettings {
        page_size: Some(500),
        ..Default::default()
    };
    assert_eq!(settings.effective_page_size(), PAGE_SIZE);

    let backend = FakeBackend::new(10);
    let client = api_client(&backend, RetryConfig::disabled());
    client
        .query(&["1"], &campaign_query(), &[] as &[&str])
        .unwrap()
        .collect_rows()
        .await
        .unwrap();
    assert_eq!(backend.requests()[0].body.page_size, 10_000);
}

#[tokio::test]
async fn test_malformed_id_fails_before_sending() {
    let backend = FakeBackend::new(10);
    let client = api_client(&backend, RetryConfig::disabled());

    let result = client.query(&["1", "2x"], &campaign_query(), &[] as &[&str]);
    assert!(result.is_err());
    assert!(backend.requests().is_empty());
}
