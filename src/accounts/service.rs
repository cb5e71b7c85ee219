//! Signup, login and profile lookup.

use anyhow::anyhow;
use std::{future::Future, sync::Arc, time::Duration};
use tokio::task;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::models::{normalize_email, AccountSummary, NewAccount};
use super::repo::{AccountRepository, RepositoryError};
use crate::credentials::{CredentialHasher, HashError};
use crate::error::AuthError;
use crate::token::TokenManager;

pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);
pub const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub account: AccountSummary,
}

pub struct AuthService {
    repo: Arc<dyn AccountRepository>,
    hasher: CredentialHasher,
    tokens: Arc<TokenManager>,
    storage_timeout: Duration,
    // Verified against on unknown emails so they cost the same as a wrong password.
    dummy_hash: Arc<str>,
}

impl AuthService {
    /// Build the service and precompute the dummy hash with `hasher`'s own cost.
    ///
    /// # Errors
    /// Returns an error if the dummy hash cannot be computed.
    pub fn new(
        repo: Arc<dyn AccountRepository>,
        hasher: CredentialHasher,
        tokens: Arc<TokenManager>,
    ) -> Result<Self, HashError> {
        let dummy_hash = hasher.hash("passage-dummy-credential")?;
        Ok(Self {
            repo,
            hasher,
            tokens,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    #[must_use]
    pub fn with_storage_timeout(mut self, storage_timeout: Duration) -> Self {
        self.storage_timeout = storage_timeout;
        self
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    #[must_use]
    pub fn storage_timeout(&self) -> Duration {
        self.storage_timeout
    }

    /// Create an account. No token is issued; the caller logs in afterwards.
    ///
    /// # Errors
    /// `Validation` for missing fields, NUL characters in the name or email or a
    /// short password, `Conflict` when the
    /// normalized email is taken and `Internal` for hashing or storage failures.
    #[instrument(skip_all)]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AccountSummary, AuthError> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Name, email, and password are required",
            ));
        }
        if name.contains('\0') || email.contains('\0') {
            return Err(AuthError::Validation(
                "Name and email must not contain NUL characters",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::Validation(
                "Password must be at least 6 characters",
            ));
        }

        let credential_hash = self.hash(password).await?;
        let created = self
            .storage(
                "create",
                self.repo.create(NewAccount {
                    name: name.to_string(),
                    email,
                    credential_hash,
                }),
            )
            .await?;

        match created {
            Ok(account) => {
                info!(account_id = %account.id, "account created");
                Ok(account.into())
            }
            Err(RepositoryError::EmailExists) => Err(AuthError::Conflict),
            Err(err) => Err(storage_failure("create", err)),
        }
    }

    /// Check credentials and issue a session token.
    ///
    /// # Errors
    /// `Validation` for missing fields, `InvalidCredentials` for an unknown email
    /// or a wrong password alike, and `Internal` for storage or signing failures.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Email and password are required"));
        }

        // No stored email can contain NUL, and PostgreSQL rejects it in TEXT.
        if email.contains('\0') {
            return self.reject_unknown_email(password).await;
        }

        let found = self
            .storage("find_by_email", self.repo.find_by_email(&email))
            .await?;
        let account = match found {
            Ok(account) => account,
            Err(RepositoryError::NotFound) => return self.reject_unknown_email(password).await,
            Err(err) => return Err(storage_failure("find_by_email", err)),
        };

        if !self
            .verify(Arc::from(account.credential_hash.as_str()), password)
            .await?
        {
            debug!(account_id = %account.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(account.id, &account.email)
            .map_err(|err| AuthError::Internal(err.into()))?;
        info!(account_id = %account.id, "session token issued");

        Ok(LoginOutcome {
            token,
            account: account.into(),
        })
    }

    /// Load the public view of an authenticated account.
    ///
    /// # Errors
    /// `Unauthorized` if the account no longer exists, `Internal` on storage failure.
    #[instrument(skip(self))]
    pub async fn profile(&self, account_id: Uuid) -> Result<AccountSummary, AuthError> {
        match self
            .storage("find_by_id", self.repo.find_by_id(account_id))
            .await?
        {
            Ok(account) => Ok(account.into()),
            Err(RepositoryError::NotFound) => {
                debug!("token subject has no account");
                Err(AuthError::Unauthorized)
            }
            Err(err) => Err(storage_failure("find_by_id", err)),
        }
    }

    /// Probe the account store.
    ///
    /// # Errors
    /// Returns an error if the store is unreachable or slower than the storage timeout.
    pub async fn ping(&self) -> Result<(), AuthError> {
        self.storage("ping", self.repo.ping())
            .await?
            .map_err(|err| storage_failure("ping", err))
    }

    async fn reject_unknown_email<T>(&self, password: &str) -> Result<T, AuthError> {
        self.verify(Arc::clone(&self.dummy_hash), password).await?;
        debug!("login for unknown email");
        Err(AuthError::InvalidCredentials)
    }

    async fn storage<T, F>(
        &self,
        operation: &'static str,
        call: F,
    ) -> Result<Result<T, RepositoryError>, AuthError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        tokio::time::timeout(self.storage_timeout, call)
            .await
            .map_err(|_| {
                AuthError::Internal(anyhow!(
                    "storage {operation} timed out after {:?}",
                    self.storage_timeout
                ))
            })
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| AuthError::Internal(anyhow!("hashing task failed: {err}")))?
            .map_err(|err| AuthError::Internal(err.into()))
    }

    async fn verify(&self, stored: Arc<str>, password: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        task::spawn_blocking(move || hasher.verify(&stored, &password))
            .await
            .map_err(|err| AuthError::Internal(anyhow!("verification task failed: {err}")))
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .field("storage_timeout", &self.storage_timeout)
            .finish_non_exhaustive()
    }
}

fn storage_failure(operation: &'static str, err: RepositoryError) -> AuthError {
    AuthError::Internal(anyhow::Error::new(err).context(format!("storage {operation} failed")))
}
