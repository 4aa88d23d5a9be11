//! Join dictionaries handed to report transforms.

use std::collections::BTreeMap;

use super::definition::{Record, ReportOutput};
use super::error::TransformError;
use crate::row::{text_at, Row};

/// Resolved joins of one fetch: join key path -> joined report output.
///
/// Built once per fetch after the primary pass and never mutated while
/// rows are transformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Joins {
    by_path: BTreeMap<String, ReportOutput>,
}

impl Joins {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, path: impl Into<String>, output: ReportOutput) {
        self.by_path.insert(path.into(), output);
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Every record of the report joined on `path`.
    pub fn dictionary(&self, path: &str) -> Option<&ReportOutput> {
        self.by_path.get(path)
    }

    pub fn get(&self, path: &str, key: &str) -> Option<&Record> {
        self.dictionary(path)?.get(key)
    }

    /// The joined record for `key`, or a row-local error.
    pub fn require(&self, path: &str, key: &str) -> Result<&Record, TransformError> {
        self.get(path, key).ok_or_else(|| TransformError::MissingJoin {
            join: path.to_string(),
            key: key.to_string(),
        })
    }

    /// Follow the foreign key stored at `path` in `row`.
    pub fn lookup(&self, row: &Row, path: &str) -> Result<&Record, TransformError> {
        let key = text_at(row, path).ok_or_else(|| TransformError::MissingField(path.into()))?;
        self.require(path, &key)
    }
}
