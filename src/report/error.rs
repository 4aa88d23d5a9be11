//! Report error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::tenant::TenantError;

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Why a transform could not represent a row.
///
/// Always row-local: the row is dropped and the fetch carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A required field is absent or not a scalar.
    #[error("missing field '{0}'")]
    MissingField(String),

    /// The joined report has no record for the row's foreign key.
    #[error("no '{join}' record for key '{key}'")]
    MissingJoin { join: String, key: String },

    /// The row is well formed but not representable.
    #[error("{0}")]
    Rejected(String),
}

/// Errors that abort a report fetch.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The primary query failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The tenant scope is invalid.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// A join key path is not one of the report's selected fields.
    #[error("report '{report}' joins on '{key}', which it does not select")]
    InvalidJoin { report: String, key: String },

    /// Resolving a joined report failed.
    #[error("join '{key}' of report '{report}' failed: {source}")]
    Join {
        report: String,
        key: String,
        #[source]
        source: Box<ReportError>,
    },

    /// Hierarchy expansion found no enabled leaf accounts.
    #[error("no enabled leaf accounts under {0}")]
    NoLeafAccounts(String),

    /// No catalog report has this name.
    #[error("unknown report '{0}'")]
    UnknownReport(String),
}
