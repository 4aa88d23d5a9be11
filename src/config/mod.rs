//! Configuration module for launchmon.
//!
//! Handles the TOML settings file, environment variable expansion, retry
//! policy and logging setup.

mod logging;
mod retry;
mod settings;

pub use logging::{LogFormat, LogLevel, LoggingSettings};
pub use retry::RetryConfig;
pub use settings::{
    expand_env_vars, ApiSettings, AuthSettings, ScopeSettings, Settings, SettingsError, PAGE_SIZE,
};
