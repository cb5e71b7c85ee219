//! Accounts: the stored record, its repositories and the service that drives
//! signup, login and profile lookup.

pub mod memory;
pub mod models;
pub mod repo;
pub mod schema;
pub mod service;

pub use memory::MemoryAccountRepository;
pub use models::{normalize_email, Account, AccountSummary, NewAccount, DEFAULT_RATING};
pub use repo::{AccountRepository, PgAccountRepository, RepositoryError};
pub use schema::ensure_schema;
pub use service::{AuthService, LoginOutcome, DEFAULT_STORAGE_TIMEOUT, MIN_PASSWORD_CHARS};
