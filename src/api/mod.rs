//! Search API access.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       ClientFactory                          │
//! │  - one ApiClient per login customer (DashMap)                │
//! │  - shared CredentialProvider (token fetched once)            │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                ApiClient::query -> RowStream                 │
//! │  round 1: page 1 of every customer        (one batch)        │
//! │  round 2: page 2 of customers with more   (one batch)        │
//! │  ...until no continuation tokens remain                      │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │           SearchTransport::send_batch (join_all)             │
//! │           HttpTransport: ureq POST in spawn_blocking         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use launchmon::api::ClientFactory;
//! use launchmon::query::QueryDefinition;
//!
//! let factory = ClientFactory::from_settings(&settings)?;
//! let client = factory.client(scope.login_customer_id());
//!
//! let query = QueryDefinition::new("campaign").select(["campaign.id", "campaign.name"]);
//! let mut rows = client.query(scope.customer_ids(), &query, &["campaign.status = 'ENABLED'"])?;
//! while let Some(row) = rows.next().await {
//!     println!("{}", row?);
//! }
//! ```

mod client;
pub mod credentials;
mod error;
mod factory;
pub mod protocol;
pub mod transport;

pub use client::{ApiClient, RowStream};
pub use credentials::{CommandToken, CredentialProvider, EnvToken, StaticToken, TokenSource};
pub use error::{ApiError, ApiResult, CredentialError, TenantFailure};
pub use factory::ClientFactory;
pub use transport::{HttpTransport, SearchTransport};
