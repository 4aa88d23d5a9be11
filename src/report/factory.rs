//! Report construction and leaf-account resolution.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::definition::ReportDefinition;
use super::error::{ReportError, ReportResult};
use super::hierarchy;
use super::report::Report;
use crate::api::{ApiClient, ClientFactory};
use crate::tenant::{CustomerId, TenantScope};

/// Creates reports scoped to the leaf accounts under a tenant scope.
///
/// The leaf set is resolved on the first [`ReportFactory::create`] (or
/// [`ReportFactory::leaf_accounts`]) and kept for the factory's lifetime.
/// Clones share the leaf cache and the client cache.
#[derive(Clone)]
pub struct ReportFactory {
    inner: Arc<FactoryInner>,
}

struct FactoryInner {
    scope: TenantScope,
    clients: Arc<ClientFactory>,
    leaves: OnceCell<Vec<CustomerId>>,
}

impl ReportFactory {
    pub fn new(scope: TenantScope, clients: Arc<ClientFactory>) -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                scope,
                clients,
                leaves: OnceCell::new(),
            }),
        }
    }

    /// Parse and validate a scope, then build a factory over it.
    pub fn from_ids(
        clients: Arc<ClientFactory>,
        customer_ids: &str,
        login_customer_id: Option<&str>,
    ) -> ReportResult<Self> {
        let scope = TenantScope::parse(customer_ids, login_customer_id)?;
        Ok(Self::new(scope, clients))
    }

    /// The scope as supplied, before leaf expansion.
    pub fn scope(&self) -> &TenantScope {
        &self.inner.scope
    }

    /// Login customer for queries made on behalf of this scope.
    ///
    /// A single manager account without an explicit login acts as its own
    /// login customer.
    fn login_customer_id(&self) -> Option<CustomerId> {
        let scope = &self.inner.scope;
        match (scope.login_customer_id(), scope.customer_ids()) {
            (Some(login), _) => Some(login.clone()),
            (None, [only]) => Some(only.clone()),
            (None, _) => None,
        }
    }

    fn client(&self) -> Arc<ApiClient> {
        self.inner.clients.client(self.login_customer_id().as_ref())
    }

    /// Enabled non-manager accounts under the scope, resolved once.
    pub async fn leaf_accounts(&self) -> ReportResult<&[CustomerId]> {
        let leaves = self
            .inner
            .leaves
            .get_or_try_init(|| self.discover_leaves())
            .await?;
        Ok(leaves.as_slice())
    }

    async fn discover_leaves(&self) -> ReportResult<Vec<CustomerId>> {
        let scope = &self.inner.scope;
        let report = Report::new(
            Arc::new(hierarchy::leaf_accounts()),
            scope.customer_ids().to_vec(),
            self.client(),
            self.clone(),
        );

        let output = report.fetch::<&str>(&[]).await?;
        let leaves = output
            .keys()
            .map(|id| id.parse::<CustomerId>())
            .collect::<Result<Vec<_>, _>>()?;

        if leaves.is_empty() {
            let ids: Vec<&str> = scope.customer_ids().iter().map(CustomerId::as_str).collect();
            return Err(ReportError::NoLeafAccounts(ids.join(", ")));
        }

        info!(
            customers = scope.customer_ids().len(),
            leaves = leaves.len(),
            "resolved leaf accounts"
        );
        Ok(leaves)
    }

    /// Bind `definition` to the leaf accounts of this factory's scope.
    pub async fn create(&self, definition: Arc<ReportDefinition>) -> ReportResult<Report> {
        let leaves = self.leaf_accounts().await?.to_vec();
        let scope = TenantScope::new(leaves, self.login_customer_id())?;
        let client = self.inner.clients.client(scope.login_customer_id());

        debug!(
            report = definition.name(),
            customers = scope.customer_ids().len(),
            "created report"
        );
        Ok(Report::new(
            definition,
            scope.customer_ids().to_vec(),
            client,
            self.clone(),
        ))
    }
}
