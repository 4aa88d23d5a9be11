//! Reports: definitions, joins and the fetch algorithm.
//!
//! # Fetch
//!
//! ```text
//! ReportFactory::create(definition)
//!     │  leaf accounts resolved once per factory (hierarchy report)
//!     ▼
//! Report::fetch(extra_wheres)
//!     │
//!     ├─ no joins ──► stream rows ──────────────────────────► transform
//!     │
//!     └─ joins ─────► buffer rows, collect foreign keys per join path
//!                        │
//!                        ▼
//!                     one joined fetch per join:
//!                     WHERE <joined source>.id IN (k1,k2,...)
//!                        │
//!                        ▼
//!                     Joins { path -> joined output } ────────► transform
//! ```
//!
//! Transform errors and empty records drop the row. API errors abort the
//! whole fetch.

pub mod catalog;
mod definition;
mod error;
mod factory;
pub mod hierarchy;
mod joins;
#[allow(clippy::module_inception)]
mod report;

pub use definition::{field, field_or_empty, Record, ReportDefinition, ReportOutput, TransformFn};
pub use error::{ReportError, ReportResult, TransformError};
pub use factory::ReportFactory;
pub use joins::Joins;
pub use report::Report;
