//! Service and store configuration.
//!
//! Credentials are never embedded in code: they arrive through the builder or
//! the `IDENTECO_*` environment variables and travel as [`SecretString`].

use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::time::Duration;
use url::Url;

const ENV_DSN: &str = "IDENTECO_DSN";
const ENV_DB_USERNAME: &str = "IDENTECO_DB_USERNAME";
const ENV_DB_PASSWORD: &str = "IDENTECO_DB_PASSWORD";
const ENV_TOKEN_LENGTH: &str = "IDENTECO_TOKEN_LENGTH";
const ENV_PASSWORD_PEPPER: &str = "IDENTECO_PASSWORD_PEPPER";

const DEFAULT_TOKEN_LENGTH: usize = 32;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for the Postgres-backed user store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    dsn: String,
    username: Option<String>,
    password: Option<SecretString>,
    max_connections: u32,
    acquire_timeout: Duration,
    query_timeout: Duration,
}

impl StoreConfig {
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            username: None,
            password: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.username = Some(username.into());
        self.password = Some(password);
        self
    }

    #[must_use]
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    #[must_use]
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Upper bound for a single query; elapsed queries surface as storage
    /// failures rather than hanging the caller.
    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    #[must_use]
    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    #[must_use]
    pub fn acquire_timeout(&self) -> Duration {
        self.acquire_timeout
    }

    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Compose the connection URL, injecting credentials into the DSN.
    pub fn dsn(&self) -> Result<Url> {
        let mut dsn = Url::parse(&self.dsn).context("invalid store DSN")?;

        if let Some(username) = &self.username {
            dsn.set_username(username)
                .map_err(|()| anyhow!("Error setting username"))?;
        }

        if let Some(password) = &self.password {
            dsn.set_password(Some(password.expose_secret()))
                .map_err(|()| anyhow!("Error setting password"))?;
        }

        Ok(dsn)
    }

    /// Load store configuration from `IDENTECO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let dsn = env::var(ENV_DSN).with_context(|| format!("{ENV_DSN} is not set"))?;
        let mut config = Self::new(dsn);

        if let (Ok(username), Ok(password)) =
            (env::var(ENV_DB_USERNAME), env::var(ENV_DB_PASSWORD))
        {
            config = config.with_credentials(username, SecretString::from(password));
        }

        Ok(config)
    }
}

/// Tunables for the identity service itself.
#[derive(Clone, Debug, Default)]
pub struct ServiceConfig {
    token_length: Option<usize>,
    password_pepper: Option<SecretString>,
}

impl ServiceConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token_length(mut self, length: usize) -> Self {
        self.token_length = Some(length);
        self
    }

    /// Server-side pepper mixed into password hashes.
    #[must_use]
    pub fn with_password_pepper(mut self, pepper: SecretString) -> Self {
        self.password_pepper = Some(pepper);
        self
    }

    #[must_use]
    pub fn token_length(&self) -> usize {
        self.token_length.unwrap_or(DEFAULT_TOKEN_LENGTH)
    }

    pub(crate) fn pepper_bytes(&self) -> Option<&[u8]> {
        self.password_pepper
            .as_ref()
            .map(|pepper| pepper.expose_secret().as_bytes())
    }

    /// Load service configuration from `IDENTECO_*` environment variables.
    /// Unparseable values fall back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Some(length) = env::var(ENV_TOKEN_LENGTH)
            .ok()
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|&length| length > 0)
        {
            config = config.with_token_length(length);
        }

        if let Ok(pepper) = env::var(ENV_PASSWORD_PEPPER) {
            config = config.with_password_pepper(SecretString::from(pepper));
        }

        config
    }
}
