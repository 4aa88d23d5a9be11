//! Static report definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::error::{ReportError, ReportResult, TransformError};
use super::joins::Joins;
use crate::query::QueryDefinition;
use crate::row::{text_at, Row};

/// One flat output record: output field -> text.
pub type Record = BTreeMap<String, String>;

/// A fetched report: primary key -> record.
pub type ReportOutput = BTreeMap<String, Record>;

/// Turns one result row into its primary key and record.
///
/// Must be pure in `row` and `joins`. An error drops the row.
pub type TransformFn = fn(&Row, &Joins) -> Result<(String, Record), TransformError>;

/// A query, the fields it outputs, the row transform and any joins.
///
/// Definitions are built once and shared as `Arc`s. A join target must
/// exist before the definition that joins it, so join graphs are acyclic.
#[derive(Clone)]
pub struct ReportDefinition {
    name: String,
    query: QueryDefinition,
    output: Vec<String>,
    transform: TransformFn,
    joins: BTreeMap<String, Arc<ReportDefinition>>,
}

impl ReportDefinition {
    pub fn new<I, S>(name: &str, query: QueryDefinition, output: I, transform: TransformFn) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            query,
            output: output.into_iter().map(Into::into).collect(),
            transform,
            joins: BTreeMap::new(),
        }
    }

    /// Declare that the value at `path` is the primary key of `target`.
    ///
    /// `path` must be one of this report's selected fields.
    pub fn with_join(mut self, path: &str, target: Arc<ReportDefinition>) -> ReportResult<Self> {
        if !self.query.selects(path) {
            return Err(ReportError::InvalidJoin {
                report: self.name,
                key: path.into(),
            });
        }
        self.joins.insert(path.into(), target);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn query(&self) -> &QueryDefinition {
        &self.query
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn has_joins(&self) -> bool {
        !self.joins.is_empty()
    }

    /// Join key paths and their target definitions, ordered by path.
    pub fn joins(&self) -> impl Iterator<Item = (&str, &Arc<ReportDefinition>)> {
        self.joins.iter().map(|(path, target)| (path.as_str(), target))
    }

    pub fn transform(&self, row: &Row, joins: &Joins) -> Result<(String, Record), TransformError> {
        (self.transform)(row, joins)
    }

    /// Header plus one line per record, columns in `output` order.
    pub fn to_table(&self, output: &ReportOutput) -> Vec<Vec<String>> {
        let mut table = Vec::with_capacity(output.len() + 1);
        table.push(self.output.clone());
        for record in output.values() {
            table.push(
                self.output
                    .iter()
                    .map(|field| record.get(field).cloned().unwrap_or_default())
                    .collect(),
            );
        }
        table
    }
}

impl fmt::Debug for ReportDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportDefinition")
            .field("name", &self.name)
            .field("query", &self.query)
            .field("output", &self.output)
            .field("joins", &self.joins.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The text at `path`, or [`TransformError::MissingField`].
pub fn field(row: &Row, path: &str) -> Result<String, TransformError> {
    text_at(row, path).ok_or_else(|| TransformError::MissingField(path.into()))
}

/// The text at `path`, or an empty string.
pub fn field_or_empty(row: &Row, path: &str) -> String {
    text_at(row, path).unwrap_or_default()
}
