use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{normalize_email, Account, NewAccount, DEFAULT_RATING};
use super::repo::{AccountRepository, RepositoryError};

/// Process-local account store used by tests and ephemeral deployments.
///
/// The email index and the account map are updated under one write lock, so a
/// check-then-insert on the same email cannot interleave.
#[derive(Debug, Default)]
pub struct MemoryAccountRepository {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    by_email: HashMap<String, Uuid>,
}

impl MemoryAccountRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop an account. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        match inner.accounts.remove(&id) {
            Some(account) => {
                inner.by_email.remove(&account.email);
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let email = normalize_email(&account.email);
        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(&email) {
            return Err(RepositoryError::EmailExists);
        }

        let stored = Account {
            id: Uuid::new_v4(),
            name: account.name.trim().to_string(),
            email: email.clone(),
            credential_hash: account.credential_hash,
            rating: DEFAULT_RATING,
            // TIMESTAMPTZ keeps microseconds; match it so both backends agree.
            created_at: Utc::now().trunc_subsecs(6),
        };
        inner.by_email.insert(email, stored.id);
        inner.accounts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Account, RepositoryError> {
        let inner = self.inner.read().await;
        inner
            .by_email
            .get(&normalize_email(email))
            .and_then(|id| inner.accounts.get(id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Account, RepositoryError> {
        self.inner
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
