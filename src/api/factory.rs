//! Shared construction of [`ApiClient`]s.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::client::ApiClient;
use super::credentials::CredentialProvider;
use super::transport::{HttpTransport, SearchTransport};
use crate::config::{ApiSettings, RetryConfig, Settings, SettingsError};
use crate::tenant::CustomerId;

/// Builds API clients and caches one per login customer.
///
/// Every client shares the same credential provider and transport, so the
/// bearer token is fetched at most once per factory.
pub struct ClientFactory {
    settings: ApiSettings,
    retry: RetryConfig,
    developer_token: Option<String>,
    credentials: Arc<CredentialProvider>,
    transport: Arc<dyn SearchTransport>,
    clients: DashMap<Option<CustomerId>, Arc<ApiClient>>,
}

impl ClientFactory {
    pub fn new(
        settings: ApiSettings,
        retry: RetryConfig,
        credentials: Arc<CredentialProvider>,
        transport: Arc<dyn SearchTransport>,
    ) -> Result<Self, SettingsError> {
        let developer_token = settings.resolved_developer_token()?;
        Ok(Self {
            settings,
            retry,
            developer_token,
            credentials,
            transport,
            clients: DashMap::new(),
        })
    }

    /// A factory talking HTTP, configured from the loaded settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        let credentials = CredentialProvider::from_settings(&settings.auth)?;
        let transport = HttpTransport::new(settings.api.timeout());
        Self::new(
            settings.api.clone(),
            settings.retry.clone(),
            Arc::new(credentials),
            Arc::new(transport),
        )
    }

    /// The client for `login_customer_id`, created on first request.
    pub fn client(&self, login_customer_id: Option<&CustomerId>) -> Arc<ApiClient> {
        let key = login_customer_id.cloned();
        let entry = self.clients.entry(key.clone()).or_insert_with(|| {
            debug!(login_customer = ?key, "creating api client");
            Arc::new(
                ApiClient::new(
                    self.settings.clone(),
                    key,
                    Arc::clone(&self.credentials),
                    Arc::clone(&self.transport),
                )
                .with_developer_token(self.developer_token.clone())
                .with_retry(self.retry.clone()),
            )
        });
        Arc::clone(entry.value())
    }

    /// Number of distinct clients created so far.
    pub fn cached_clients(&self) -> usize {
        self.clients.len()
    }
}
