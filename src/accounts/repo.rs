use async_trait::async_trait;
use sqlx::{Connection, PgPool};
use thiserror::Error;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::models::{normalize_email, Account, NewAccount, DEFAULT_RATING};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("email already exists")]
    EmailExists,
    #[error("account not found")]
    NotFound,
    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
}

/// Durable storage of accounts.
///
/// Email uniqueness must be enforced by the backend itself so that concurrent
/// creators racing on the same normalized email see exactly one success.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Account, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Account, RepositoryError>;
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[derive(Clone, Debug)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, name, email, credential_hash, rating, created_at";

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let query = r"
            INSERT INTO accounts
                (id, name, email, credential_hash, rating)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, credential_hash, rating, created_at
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query_as::<_, Account>(query)
            .bind(Uuid::new_v4())
            .bind(account.name.trim())
            .bind(normalize_email(&account.email))
            .bind(&account.credential_hash)
            .bind(DEFAULT_RATING)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    RepositoryError::EmailExists
                } else {
                    RepositoryError::Storage(err)
                }
            })
    }

    async fn find_by_email(&self, email: &str) -> Result<Account, RepositoryError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM accounts WHERE email = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Account, RepositoryError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM accounts WHERE id = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}

/// SQLSTATE 23505: the insert collided with a unique constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}
