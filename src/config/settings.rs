//! TOML-based configuration for launchmon.
//!
//! Supports a config file (launchmon.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [api]
//! host = "googleads.googleapis.com"
//! version = "v17"
//! developer_token = "${ADS_DEVELOPER_TOKEN}"
//! timeout_seconds = 120
//!
//! [auth]
//! token_command = ["gcloud", "auth", "print-access-token"]
//!
//! [scope]
//! customer_ids = "123-456-7890"
//! login_customer_id = "999-000-1111"
//!
//! [retry]
//! max_retries = 3
//! base_delay_ms = 500
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::logging::LoggingSettings;
use super::retry::RetryConfig;
use crate::tenant::{TenantError, TenantScope};

/// The only page size the search endpoint is driven with.
pub const PAGE_SIZE: u32 = 10_000;

/// Default timeout for a single search call (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid tenant scope: {0}")]
    Scope(#[from] TenantError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub auth: AuthSettings,
    pub scope: ScopeSettings,
    pub retry: RetryConfig,
    pub logging: LoggingSettings,
}

/// Search endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSettings {
    /// API host, without scheme.
    pub host: String,

    /// API version path segment (e.g. "v17").
    pub version: String,

    /// Search method appended to the customer path.
    pub search_call: String,

    /// Product developer token (supports ${ENV_VAR} expansion).
    pub developer_token: Option<String>,

    /// Timeout for one search call, in seconds.
    pub timeout_seconds: u64,

    /// Requested page size. Only [`PAGE_SIZE`] is honored.
    pub page_size: Option<u32>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            host: "googleads.googleapis.com".to_string(),
            version: "v17".to_string(),
            search_call: "googleAds:search".to_string(),
            developer_token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            page_size: None,
        }
    }
}

impl ApiSettings {
    /// The search URL for one customer.
    pub fn search_url(&self, customer_id: &str) -> String {
        format!(
            "https://{}/{}/customers/{}/{}",
            self.host.trim_end_matches('/'),
            self.version,
            customer_id,
            self.search_call
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// The page size actually used. Overrides are ignored with a warning.
    pub fn effective_page_size(&self) -> u32 {
        match self.page_size {
            Some(requested) if requested != PAGE_SIZE => {
                tracing::warn!(
                    requested,
                    page_size = PAGE_SIZE,
                    "page size cannot be overridden; using the fixed page size"
                );
                PAGE_SIZE
            }
            _ => PAGE_SIZE,
        }
    }

    /// Developer token with environment variables expanded.
    pub fn resolved_developer_token(&self) -> Result<Option<String>, SettingsError> {
        self.developer_token
            .as_deref()
            .map(expand_env_vars)
            .transpose()
    }
}

/// Bearer token source. Exactly one field should be set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Literal token (supports ${ENV_VAR} expansion).
    pub token: Option<String>,

    /// Name of an environment variable holding the token.
    pub token_env: Option<String>,

    /// Command whose trimmed stdout is the token.
    pub token_command: Option<Vec<String>>,
}

/// Default tenant scope for commands that don't pass one explicitly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScopeSettings {
    /// Comma-separated customer ids.
    pub customer_ids: Option<String>,

    /// Login (manager) customer id.
    pub login_customer_id: Option<String>,
}

impl ScopeSettings {
    /// Build a scope, letting explicit arguments win over configured values.
    pub fn resolve(
        &self,
        customer_ids: Option<&str>,
        login_customer_id: Option<&str>,
    ) -> Result<TenantScope, SettingsError> {
        let ids = customer_ids
            .or(self.customer_ids.as_deref())
            .ok_or_else(|| SettingsError::InvalidConfig("no customer ids configured".into()))?;
        let login = login_customer_id.or(self.login_customer_id.as_deref());
        Ok(TenantScope::parse(ids, login)?)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `LAUNCHMON_CONFIG`
    /// 2. `./launchmon.toml`
    /// 3. `~/.config/launchmon/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("LAUNCHMON_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("launchmon.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("launchmon").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    var_name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
