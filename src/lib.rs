//! # Launchmon
//!
//! Reporting engine for a multi-tenant advertising search API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        ReportDefinition (query, output, transform,       │
//! │                          joins)                          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [ReportFactory: leaf accounts]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Report::fetch                            │
//! │   primary pass ─► join resolution ─► transform           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │        ApiClient::query ─► RowStream (paginated)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [SearchTransport]
//! ┌─────────────────────────────────────────────────────────┐
//! │           POST /customers/<id>/googleAds:search          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The result of a fetch is a map from primary key to a flat record of
//! output fields, ready for tabular consumers.

pub mod api;
pub mod config;
pub mod query;
pub mod report;
pub mod row;
pub mod tenant;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::api::{ApiClient, ApiError, ClientFactory, CredentialProvider, SearchTransport};
    pub use crate::config::Settings;
    pub use crate::query::{id_in_predicate, QueryDefinition};
    pub use crate::report::{
        catalog, Joins, Record, Report, ReportDefinition, ReportError, ReportFactory, ReportOutput,
        TransformError,
    };
    pub use crate::row::{text_at, value_at, Row};
    pub use crate::tenant::{parse_customer_ids, CustomerId, TenantScope};
}

pub use query::QueryDefinition;
pub use report::{Report, ReportDefinition, ReportFactory, ReportOutput};
pub use tenant::{CustomerId, TenantScope};
