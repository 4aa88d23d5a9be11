//! Account hierarchy expansion.
//!
//! A manager account is expanded into the enabled, non-manager accounts
//! below it by querying `customer_client` under that account. A leaf
//! account queried the same way returns just itself.

use super::definition::{field, field_or_empty, Record, ReportDefinition};
use super::error::TransformError;
use super::joins::Joins;
use crate::query::QueryDefinition;
use crate::row::Row;

pub const HIERARCHY_REPORT: &str = "leaf_accounts";

/// The definition used to resolve leaf accounts.
pub fn leaf_accounts() -> ReportDefinition {
    ReportDefinition::new(
        HIERARCHY_REPORT,
        QueryDefinition::new("customer_client")
            .select([
                "customer_client.id",
                "customer_client.descriptive_name",
                "customer_client.manager",
                "customer_client.status",
                "customer_client.level",
            ])
            .filter("customer_client.status = 'ENABLED'")
            .filter("customer_client.manager = false"),
        ["id", "name", "status", "level"],
        leaf_account,
    )
}

fn leaf_account(row: &Row, _joins: &Joins) -> Result<(String, Record), TransformError> {
    let id = field(row, "customer_client.id")?;
    let status = field(row, "customer_client.status")?;
    if status != "ENABLED" {
        return Err(TransformError::Rejected(format!("account {id} is {status}")));
    }
    if field_or_empty(row, "customer_client.manager") == "true" {
        return Err(TransformError::Rejected(format!("account {id} is a manager")));
    }

    let record = Record::from([
        ("id".to_string(), id.clone()),
        ("name".to_string(), field_or_empty(row, "customer_client.descriptive_name")),
        ("status".to_string(), status),
        ("level".to_string(), field_or_empty(row, "customer_client.level")),
    ]);
    Ok((id, record))
}
