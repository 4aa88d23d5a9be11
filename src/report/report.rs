//! Fetching a report: primary pass, join resolution, transform.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use super::definition::{ReportDefinition, ReportOutput};
use super::error::{ReportError, ReportResult};
use super::factory::ReportFactory;
use super::joins::Joins;
use crate::api::ApiClient;
use crate::query::id_in_predicate;
use crate::row::{text_at, Row};
use crate::tenant::CustomerId;

/// A report definition bound to customers and a client.
///
/// Created by [`ReportFactory::create`]; joined reports are created through
/// the same factory.
pub struct Report {
    definition: Arc<ReportDefinition>,
    customer_ids: Vec<CustomerId>,
    client: Arc<ApiClient>,
    factory: ReportFactory,
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("definition", &self.definition.name())
            .field("customer_ids", &self.customer_ids)
            .field("login_customer_id", &self.client.login_customer_id())
            .finish()
    }
}

/// Per-fetch counters for the summary log line.
#[derive(Debug, Default)]
struct FetchStats {
    rows: usize,
    dropped: usize,
}

impl Report {
    pub(crate) fn new(
        definition: Arc<ReportDefinition>,
        customer_ids: Vec<CustomerId>,
        client: Arc<ApiClient>,
        factory: ReportFactory,
    ) -> Self {
        Self {
            definition,
            customer_ids,
            client,
            factory,
        }
    }

    pub fn definition(&self) -> &ReportDefinition {
        &self.definition
    }

    pub fn customer_ids(&self) -> &[CustomerId] {
        &self.customer_ids
    }

    /// Run the report and return its records keyed by primary key.
    ///
    /// Without joins, rows stream straight into the transform. With joins,
    /// all rows are buffered first so every foreign key is known before any
    /// joined report is queried; each join then costs exactly one joined
    /// fetch. Rows whose transform fails, or whose record is empty, are
    /// dropped. When two rows share a key the later one wins.
    pub async fn fetch<S: AsRef<str>>(&self, extra_wheres: &[S]) -> ReportResult<ReportOutput> {
        let wheres = extra_wheres
            .iter()
            .map(|w| w.as_ref().to_string())
            .collect();
        self.fetch_with(wheres).await
    }

    /// Render `output` as header plus rows in output column order.
    pub fn to_table(&self, output: &ReportOutput) -> Vec<Vec<String>> {
        self.definition.to_table(output)
    }

    // Boxed so joined reports can recurse through it.
    fn fetch_with(&self, wheres: Vec<String>) -> BoxFuture<'_, ReportResult<ReportOutput>> {
        async move {
            let name = self.definition.name();
            let mut rows = self
                .client
                .query(self.customer_ids.as_slice(), self.definition.query(), wheres.as_slice())?;
            let mut output = ReportOutput::new();
            let mut stats = FetchStats::default();

            if !self.definition.has_joins() {
                let joins = Joins::new();
                while let Some(row) = rows.next().await {
                    self.apply(&row?, &joins, &mut output, &mut stats);
                }
            } else {
                let mut foreign_keys: Vec<(&str, &Arc<ReportDefinition>, BTreeSet<String>)> = self
                    .definition
                    .joins()
                    .map(|(path, target)| (path, target, BTreeSet::new()))
                    .collect();
                let mut buffered = Vec::new();

                while let Some(row) = rows.next().await {
                    let row = row?;
                    for (path, _, keys) in foreign_keys.iter_mut() {
                        if let Some(key) = text_at(&row, path) {
                            keys.insert(key);
                        }
                    }
                    buffered.push(row);
                }
                debug!(report = name, rows = buffered.len(), "primary pass complete");

                let joins = self.resolve_joins(foreign_keys).await?;
                for row in &buffered {
                    self.apply(row, &joins, &mut output, &mut stats);
                }
            }

            info!(
                report = name,
                customers = self.customer_ids.len(),
                rounds = rows.rounds(),
                rows = stats.rows,
                records = output.len(),
                dropped = stats.dropped,
                "fetched report"
            );
            Ok(output)
        }
        .boxed()
    }

    async fn resolve_joins(
        &self,
        foreign_keys: Vec<(&str, &Arc<ReportDefinition>, BTreeSet<String>)>,
    ) -> ReportResult<Joins> {
        let mut joins = Joins::new();
        for (path, target, keys) in foreign_keys {
            if keys.is_empty() {
                debug!(report = self.definition.name(), join = path, "no foreign keys, skipping join");
                joins.insert(path, ReportOutput::new());
                continue;
            }

            let predicate = id_in_predicate(&target.query().from, &keys);
            debug!(
                report = self.definition.name(),
                join = path,
                target = target.name(),
                keys = keys.len(),
                "resolving join"
            );

            let wrap = |source: ReportError| ReportError::Join {
                report: self.definition.name().to_string(),
                key: path.to_string(),
                source: Box::new(source),
            };
            let joined = self.factory.create(Arc::clone(target)).await.map_err(wrap)?;
            let output = joined.fetch_with(vec![predicate]).await.map_err(wrap)?;
            joins.insert(path, output);
        }
        Ok(joins)
    }

    fn apply(&self, row: &Row, joins: &Joins, output: &mut ReportOutput, stats: &mut FetchStats) {
        stats.rows += 1;
        match self.definition.transform(row, joins) {
            Ok((key, record)) if record.is_empty() => {
                debug!(report = self.definition.name(), key = %key, "dropping empty record");
                stats.dropped += 1;
            }
            Ok((key, record)) => {
                output.insert(key, record);
            }
            Err(error) => {
                warn!(report = self.definition.name(), error = %error, "dropping row");
                stats.dropped += 1;
            }
        }
    }
}
