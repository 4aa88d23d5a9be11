//! Bearer token provider.
//!
//! The token is fetched once, on first use, and reused for the rest of the
//! process. There is no refresh path.

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::OnceCell;

use super::error::CredentialError;
use crate::config::{expand_env_vars, AuthSettings, SettingsError};

pub type CredentialResult<T> = Result<T, CredentialError>;

/// Somewhere a bearer token can be obtained from.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> CredentialResult<String>;
}

/// A token known up front.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn fetch_token(&self) -> CredentialResult<String> {
        non_empty(self.0.clone())
    }
}

/// A token read from an environment variable at first use.
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl TokenSource for EnvToken {
    async fn fetch_token(&self) -> CredentialResult<String> {
        let token =
            std::env::var(&self.var).map_err(|_| CredentialError::MissingEnvVar(self.var.clone()))?;
        non_empty(token)
    }
}

/// A token printed on stdout by an external command, e.g.
/// `gcloud auth print-access-token`.
pub struct CommandToken {
    program: String,
    args: Vec<String>,
}

impl CommandToken {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl TokenSource for CommandToken {
    async fn fetch_token(&self) -> CredentialResult<String> {
        let command_error = |message: String| CredentialError::Command {
            program: self.program.clone(),
            message,
        };

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| command_error(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(command_error(format!("{}: {}", output.status, stderr)));
        }

        non_empty(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

fn non_empty(token: String) -> CredentialResult<String> {
    let token = token.trim();
    if token.is_empty() {
        Err(CredentialError::Empty)
    } else {
        Ok(token.to_string())
    }
}

/// Caches the token of a [`TokenSource`] for the provider's lifetime.
///
/// A failed fetch is not cached; the next call tries again.
pub struct CredentialProvider {
    source: Box<dyn TokenSource>,
    token: OnceCell<String>,
}

impl CredentialProvider {
    pub fn new(source: impl TokenSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            token: OnceCell::new(),
        }
    }

    /// Build a provider from the `[auth]` section. Exactly one source must be set.
    pub fn from_settings(auth: &AuthSettings) -> Result<Self, SettingsError> {
        match (&auth.token, &auth.token_env, &auth.token_command) {
            (Some(token), None, None) => Ok(Self::new(StaticToken::new(expand_env_vars(token)?))),
            (None, Some(var), None) => Ok(Self::new(EnvToken::new(var.clone()))),
            (None, None, Some(argv)) => match argv.split_first() {
                Some((program, args)) => Ok(Self::new(CommandToken::new(
                    program.clone(),
                    args.to_vec(),
                ))),
                None => Err(SettingsError::InvalidConfig(
                    "auth.token_command is empty".into(),
                )),
            },
            (None, None, None) => Err(SettingsError::InvalidConfig(
                "no token source configured in [auth]".into(),
            )),
            _ => Err(SettingsError::InvalidConfig(
                "set only one of auth.token, auth.token_env, auth.token_command".into(),
            )),
        }
    }

    /// The bearer token, fetched on first call.
    pub async fn token(&self) -> CredentialResult<&str> {
        self.token
            .get_or_try_init(|| self.source.fetch_token())
            .await
            .map(String::as_str)
    }
}
