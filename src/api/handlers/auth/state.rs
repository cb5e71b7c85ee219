//! Auth configuration and the shared state handed to handlers.

use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};

use crate::{
    accounts::{AccountRepository, AuthService, DEFAULT_STORAGE_TIMEOUT},
    credentials::CredentialHasher,
    token::{TokenManager, DEFAULT_TOKEN_TTL},
};

const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:5173";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    token_ttl_seconds: u64,
    storage_timeout_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            token_ttl_seconds: DEFAULT_TOKEN_TTL.as_secs(),
            storage_timeout_seconds: DEFAULT_STORAGE_TIMEOUT.as_secs(),
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: u64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_storage_timeout_seconds(mut self, seconds: u64) -> Self {
        self.storage_timeout_seconds = seconds;
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }

    #[must_use]
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_seconds)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FRONTEND_BASE_URL.to_string())
    }
}

#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    service: AuthService,
}

impl AuthState {
    pub fn new(config: AuthConfig, service: AuthService) -> Self {
        Self { config, service }
    }

    /// Wire the token manager and service from configuration.
    ///
    /// # Errors
    /// Returns an error if the signing secret is empty, the token ttl is out of
    /// range or the hasher cannot produce the login dummy hash.
    pub fn build(
        config: AuthConfig,
        token_secret: SecretString,
        repo: Arc<dyn AccountRepository>,
        hasher: CredentialHasher,
    ) -> Result<Self> {
        let tokens = Arc::new(TokenManager::new(token_secret, config.token_ttl())?);
        let service = AuthService::new(repo, hasher, tokens)
            .context("failed to precompute login dummy hash")?
            .with_storage_timeout(config.storage_timeout());
        Ok(Self::new(config, service))
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> &AuthService {
        &self.service
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        self.service.tokens()
    }
}
