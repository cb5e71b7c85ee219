//! PostgreSQL-backed account repository tests.
//!
//! Each test starts a fresh PostgreSQL container and applies the bundled schema.
//! Enable with: cargo test --features postgres_tests

#![cfg(feature = "postgres_tests")]

use anyhow::{Context, Result};
use passage::{
    accounts::{
        ensure_schema, AccountRepository, AuthService, NewAccount, PgAccountRepository,
        RepositoryError,
    },
    credentials::CredentialHasher,
    error::AuthError,
    token::{TokenManager, DEFAULT_TOKEN_TTL},
};
use secrecy::SecretString;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

struct TestDatabase {
    pool: PgPool,
    _container: ContainerAsync<Postgres>,
}

impl TestDatabase {
    async fn new() -> Result<Self> {
        let container = Postgres::default()
            .start()
            .await
            .context("failed to start PostgreSQL container")?;
        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(5432).await?;
        let url = format!("postgresql://postgres:postgres@{host}:{port}/postgres");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .context("failed to connect test pool")?;
        ensure_schema(&pool).await?;

        Ok(Self {
            pool,
            _container: container,
        })
    }

    fn repo(&self) -> PgAccountRepository {
        PgAccountRepository::new(self.pool.clone())
    }
}

fn new_account(email: &str) -> NewAccount {
    NewAccount {
        name: "Ana".to_string(),
        email: email.to_string(),
        credential_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
    }
}

#[tokio::test]
async fn schema_is_idempotent() -> Result<()> {
    let db = TestDatabase::new().await?;
    ensure_schema(&db.pool).await?;
    ensure_schema(&db.pool).await?;
    Ok(())
}

#[tokio::test]
async fn create_and_find_account() -> Result<()> {
    let db = TestDatabase::new().await?;
    let repo = db.repo();

    let created = repo.create(new_account(" Ana@Example.com ")).await?;
    assert_eq!(created.email, "ana@example.com");
    assert_eq!(created.name, "Ana");
    assert!((created.rating - 5.0).abs() < f64::EPSILON);

    let by_email = repo.find_by_email("ANA@example.com").await?;
    assert_eq!(by_email.id, created.id);
    assert_eq!(by_email.created_at, created.created_at);

    let by_id = repo.find_by_id(created.id).await?;
    assert_eq!(by_id.email, created.email);
    assert_eq!(by_id.credential_hash, created.credential_hash);

    assert!(matches!(
        repo.find_by_id(Uuid::new_v4()).await,
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repo.find_by_email("nobody@example.com").await,
        Err(RepositoryError::NotFound)
    ));
    repo.ping().await?;
    Ok(())
}

#[tokio::test]
async fn unique_violation_maps_to_email_exists() -> Result<()> {
    let db = TestDatabase::new().await?;
    let repo = db.repo();

    repo.create(new_account("ana@example.com")).await?;
    assert!(matches!(
        repo.create(new_account("ANA@example.com ")).await,
        Err(RepositoryError::EmailExists)
    ));
    Ok(())
}

#[tokio::test]
async fn concurrent_creates_yield_one_account() -> Result<()> {
    let db = TestDatabase::new().await?;
    let repo = Arc::new(db.repo());

    let mut handles = Vec::new();
    for email in [" Race@Example.com", "race@example.com ", "RACE@EXAMPLE.COM", "race@example.com"] {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move { repo.create(new_account(email)).await }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => created += 1,
            Err(RepositoryError::EmailExists) => conflicts += 1,
            Err(err) => return Err(err.into()),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 3);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(&db.pool)
        .await?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn service_signup_login_profile_against_postgres() -> Result<()> {
    let db = TestDatabase::new().await?;
    let tokens = Arc::new(TokenManager::new(
        SecretString::from("integration-secret".to_string()),
        DEFAULT_TOKEN_TTL,
    )?);
    let service = AuthService::new(
        Arc::new(db.repo()),
        CredentialHasher::with_params(1024, 1, 1)?,
        tokens,
    )?;

    let created = service.signup("Ana", " Ana@Example.com ", "secret1").await?;
    let outcome = service.login("ana@example.com", "secret1").await?;
    assert_eq!(outcome.account.id, created.id);

    let claims = service.tokens().verify(&outcome.token)?;
    assert_eq!(claims.account_id(), Some(created.id));
    assert_eq!(service.profile(created.id).await?, created);

    assert!(matches!(
        service.signup("Ana", "ana@example.com", "secret1").await,
        Err(AuthError::Conflict)
    ));
    assert!(matches!(
        service.login("ana@example.com", "wrong-password").await,
        Err(AuthError::InvalidCredentials)
    ));
    Ok(())
}

#[tokio::test]
async fn schema_rejects_unnormalized_email() -> Result<()> {
    let db = TestDatabase::new().await?;
    let result = sqlx::query(
        "INSERT INTO accounts (id, name, email, credential_hash) VALUES ($1, 'Ana', ' Ana@x.com', 'h')",
    )
    .bind(Uuid::new_v4())
    .execute(&db.pool)
    .await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn nul_input_never_reaches_postgres() -> Result<()> {
    let db = TestDatabase::new().await?;
    let tokens = Arc::new(TokenManager::new(
        SecretString::from("integration-secret".to_string()),
        DEFAULT_TOKEN_TTL,
    )?);
    let service = AuthService::new(
        Arc::new(db.repo()),
        CredentialHasher::with_params(1024, 1, 1)?,
        tokens,
    )?;

    assert!(matches!(
        service.signup("A\0", "ana@example.com", "secret1").await,
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        service.login("nobody\0@example.com", "secret1").await,
        Err(AuthError::InvalidCredentials)
    ));
    Ok(())
}
