// tests/report/fetch_test.rs
#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{report_factory, FakeBackend};
use launchmon::api::ApiError;
use launchmon::query::QueryDefinition;
use launchmon::report::{field, field_or_empty, Joins, Record, ReportDefinition, ReportError, TransformError};
use launchmon::row::Row;
use serde_json::json;

fn item(row: &Row, _joins: &Joins) -> Result<(String, Record), TransformError> {
    let id = field(row, "item.id")?;
    let name = field_or_empty(row, "item.name");
    if name == "-" {
        return Ok((id, Record::new()));
    }
    Ok((
        id.clone(),
        Record::from([("id".to_string(), id), ("name".to_string(), name)]),
    ))
}

fn items() -> Arc<ReportDefinition> {
    Arc::new(ReportDefinition::new(
        "items",
        QueryDefinition::new("item").select(["item.id", "item.name"]),
        ["id", "name"],
        item,
    ))
}

fn backend(rows: Vec<Row>) -> Arc<FakeBackend> {
    let backend = FakeBackend::new(2);
    backend.add_leaf("1");
    backend.add_rows("1", "item", rows);
    backend
}

#[tokio::test]
async fn test_duplicate_key_last_row_wins() {
    let backend = backend(vec![
        json!({"item": {"id": "a", "name": "first"}}),
        json!({"item": {"id": "b", "name": "second"}}),
        json!({"item": {"id": "a", "name": "third"}}),
    ]);
    let factory = report_factory(&backend, "1", None);
    let report = factory.create(items()).await.unwrap();

    let output = report.fetch::<&str>(&[]).await.unwrap();
    assert_eq!(output.len(), 2);
    assert_eq!(output["a"]["name"], "third");
    assert_eq!(output["b"]["name"], "second");
}

#[tokio::test]
async fn test_refetch_is_identical() {
    let backend = backend(vec![
        json!({"item": {"id": "x", "name": "one"}}),
        json!({"item": {"id": "y", "name": "two"}}),
        json!({"item": {"id": "z", "name": "three"}}),
    ]);
    let factory = report_factory(&backend, "1", None);
    let report = factory.create(items()).await.unwrap();

    let first = serde_json::to_string(&report.fetch::<&str>(&[]).await.unwrap()).unwrap();
    let second = serde_json::to_string(&report.fetch::<&str>(&[]).await.unwrap()).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_bad_and_empty_rows_dropped() {
    let backend = backend(vec![
        json!({"item": {"name": "no id"}}),
        json!({"item": {"id": "e", "name": "-"}}),
        json!({"item": {"id": "k", "name": "kept"}}),
    ]);
    let factory = report_factory(&backend, "1", None);
    let report = factory.create(items()).await.unwrap();

    let output = report.fetch::<&str>(&[]).await.unwrap();
    assert_eq!(output.keys().collect::<Vec<_>>(), ["k"]);
}

#[tokio::test]
async fn test_extra_wheres_and_table() {
    let backend = backend(vec![json!({"item": {"id": "a", "name": "alpha"}})]);
    let factory = report_factory(&backend, "1", None);
    let report = factory.create(items()).await.unwrap();

    let output = report.fetch(&["item.name LIKE 'a%'"]).await.unwrap();
    assert_eq!(
        backend.queries_for("item"),
        vec!["SELECT item.id, item.name FROM item WHERE item.name LIKE 'a%'"]
    );
    assert_eq!(
        report.to_table(&output),
        vec![
            vec!["id".to_string(), "name".to_string()],
            vec!["a".to_string(), "alpha".to_string()],
        ]
    );
}

#[tokio::test]
async fn test_api_failure_aborts_fetch() {
    let backend = backend(vec![json!({"item": {"id": "a"}})]);
    backend.fail("1", "item", 1, 403);
    let factory = report_factory(&backend, "1", None);
    let report = factory.create(items()).await.unwrap();

    let err = report.fetch::<&str>(&[]).await.unwrap_err();
    assert!(matches!(err, ReportError::Api(ApiError::Tenants(_))));
}

#[tokio::test]
async fn test_failure_after_first_page_discards_partial_rows() {
    let backend = backend(vec![
        json!({"item": {"id": "a", "name": "alpha"}}),
        json!({"item": {"id": "b", "name": "beta"}}),
        json!({"item": {"id": "c", "name": "gamma"}}),
    ]);
    backend.fail_after("1", "item", 1, 1, 400);
    let factory = report_factory(&backend, "1", None);
    let report = factory.create(items()).await.unwrap();

    let err = report.fetch::<&str>(&[]).await.unwrap_err();
    assert!(matches!(err, ReportError::Api(ApiError::Tenants(_))));
    assert_eq!(backend.queries_for("item").len(), 2);
}
