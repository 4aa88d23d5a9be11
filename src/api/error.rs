//! Search API error types.

use std::fmt;

use crate::tenant::{CustomerId, TenantError};

/// Result type for search API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors raised while obtaining a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The configured environment variable is not set.
    #[error("token environment variable not set: {0}")]
    MissingEnvVar(String),

    /// The token command could not be run or exited unsuccessfully.
    #[error("token command '{program}' failed: {message}")]
    Command { program: String, message: String },

    /// The source produced an empty token.
    #[error("token source returned an empty token")]
    Empty,
}

/// Errors that can occur while querying the search endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A customer id failed validation.
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// No bearer token could be obtained.
    #[error("credentials unavailable: {0}")]
    Credentials(#[from] CredentialError),

    /// Connection or I/O failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// The request could not be built or sent and would fail again as is.
    #[error("invalid request: {0}")]
    Request(String),

    /// The call did not complete within the configured timeout.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The endpoint answered with a non-success status.
    #[error("search returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a valid search response.
    #[error("failed to decode search response: {0}")]
    Decode(String),

    /// The blocking HTTP task panicked or was cancelled.
    #[error("task join error: {0}")]
    TaskJoin(String),

    /// One or more customers failed in a pagination round.
    #[error("search failed for {}", DisplayFailures(.0))]
    Tenants(Vec<TenantFailure>),
}

impl ApiError {
    /// Check if this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Tenants(failures) => failures.iter().all(|f| f.error.is_retryable()),
            _ => false,
        }
    }

    /// Customers named by this error, if it is a per-customer failure.
    pub fn failed_customers(&self) -> Vec<&CustomerId> {
        match self {
            Self::Tenants(failures) => failures.iter().map(|f| &f.customer_id).collect(),
            _ => Vec::new(),
        }
    }
}

/// A single customer's failure within a round.
#[derive(Debug)]
pub struct TenantFailure {
    pub customer_id: CustomerId,
    pub error: ApiError,
}

struct DisplayFailures<'a>(&'a [TenantFailure]);

impl fmt::Display for DisplayFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} customer(s)", self.0.len())?;
        for (i, failure) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{} ({})", failure.customer_id, failure.error)?;
        }
        Ok(())
    }
}
