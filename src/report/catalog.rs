//! Built-in report definitions.
//!
//! | name        | source     | joins                         |
//! |-------------|------------|-------------------------------|
//! | `customers` | `customer` |                               |
//! | `campaigns` | `campaign` | `customer.id` -> `customers`  |
//! | `ad_groups` | `ad_group` | `campaign.id` -> `campaigns`  |
//!
//! `ad_groups` reaches customer fields through `campaigns`, whose own join
//! is resolved when the campaigns report is fetched.

use std::sync::Arc;

use super::definition::{field, field_or_empty, Record, ReportDefinition};
use super::error::{ReportError, ReportResult, TransformError};
use super::hierarchy;
use super::joins::Joins;
use crate::query::QueryDefinition;
use crate::row::Row;

/// Names accepted by [`lookup`], in listing order.
pub const REPORT_NAMES: [&str; 4] = ["customers", "campaigns", "ad_groups", hierarchy::HIERARCHY_REPORT];

/// A catalog report by name.
pub fn lookup(name: &str) -> ReportResult<Arc<ReportDefinition>> {
    match name {
        "customers" => Ok(customers()),
        "campaigns" => campaigns(),
        "ad_groups" => ad_groups(),
        hierarchy::HIERARCHY_REPORT => Ok(Arc::new(hierarchy::leaf_accounts())),
        other => Err(ReportError::UnknownReport(other.to_string())),
    }
}

pub fn customers() -> Arc<ReportDefinition> {
    Arc::new(ReportDefinition::new(
        "customers",
        QueryDefinition::new("customer").select([
            "customer.id",
            "customer.descriptive_name",
            "customer.currency_code",
            "customer.time_zone",
        ]),
        ["id", "name", "currency", "time_zone"],
        customer,
    ))
}

fn customer(row: &Row, _joins: &Joins) -> Result<(String, Record), TransformError> {
    let id = field(row, "customer.id")?;
    let record = Record::from([
        ("id".to_string(), id.clone()),
        ("name".to_string(), field_or_empty(row, "customer.descriptive_name")),
        ("currency".to_string(), field_or_empty(row, "customer.currency_code")),
        ("time_zone".to_string(), field_or_empty(row, "customer.time_zone")),
    ]);
    Ok((id, record))
}

pub fn campaigns() -> ReportResult<Arc<ReportDefinition>> {
    let definition = ReportDefinition::new(
        "campaigns",
        QueryDefinition::new("campaign")
            .select([
                "campaign.id",
                "campaign.name",
                "campaign.status",
                "campaign.advertising_channel_type",
                "customer.id",
            ])
            .filter("campaign.status != 'REMOVED'"),
        [
            "id",
            "name",
            "status",
            "channel",
            "customer_id",
            "customer_name",
            "currency",
        ],
        campaign,
    )
    .with_join("customer.id", customers())?;
    Ok(Arc::new(definition))
}

fn campaign(row: &Row, joins: &Joins) -> Result<(String, Record), TransformError> {
    let id = field(row, "campaign.id")?;
    let customer = joins.lookup(row, "customer.id")?;
    let record = Record::from([
        ("id".to_string(), id.clone()),
        ("name".to_string(), field_or_empty(row, "campaign.name")),
        ("status".to_string(), field_or_empty(row, "campaign.status")),
        (
            "channel".to_string(),
            field_or_empty(row, "campaign.advertising_channel_type"),
        ),
        ("customer_id".to_string(), field(row, "customer.id")?),
        ("customer_name".to_string(), joined(customer, "name")),
        ("currency".to_string(), joined(customer, "currency")),
    ]);
    Ok((id, record))
}

pub fn ad_groups() -> ReportResult<Arc<ReportDefinition>> {
    let definition = ReportDefinition::new(
        "ad_groups",
        QueryDefinition::new("ad_group")
            .select([
                "ad_group.id",
                "ad_group.name",
                "ad_group.status",
                "ad_group.cpc_bid_micros",
                "campaign.id",
            ])
            .filter("ad_group.status != 'REMOVED'"),
        [
            "id",
            "name",
            "status",
            "cpc_bid_micros",
            "campaign_id",
            "campaign_name",
            "customer_name",
        ],
        ad_group,
    )
    .with_join("campaign.id", campaigns()?)?;
    Ok(Arc::new(definition))
}

fn ad_group(row: &Row, joins: &Joins) -> Result<(String, Record), TransformError> {
    let id = field(row, "ad_group.id")?;
    let campaign = joins.lookup(row, "campaign.id")?;
    let record = Record::from([
        ("id".to_string(), id.clone()),
        ("name".to_string(), field_or_empty(row, "ad_group.name")),
        ("status".to_string(), field_or_empty(row, "ad_group.status")),
        (
            "cpc_bid_micros".to_string(),
            field_or_empty(row, "ad_group.cpc_bid_micros"),
        ),
        ("campaign_id".to_string(), field(row, "campaign.id")?),
        ("campaign_name".to_string(), joined(campaign, "name")),
        ("customer_name".to_string(), joined(campaign, "customer_name")),
    ]);
    Ok((id, record))
}

fn joined(record: &Record, name: &str) -> String {
    record.get(name).cloned().unwrap_or_default()
}
