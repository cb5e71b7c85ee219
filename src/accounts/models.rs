use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use sqlx::{postgres::PgRow, FromRow, Row};
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_RATING: f64 = 5.0;

/// Normalize an email for lookup and uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A stored account, including its credential hash.
#[derive(Clone)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub credential_hash: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("credential_hash", &"***")
            .field("rating", &self.rating)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl<'r> FromRow<'r, PgRow> for Account {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            credential_hash: row.try_get("credential_hash")?,
            rating: row.try_get("rating")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Input for creating an account. The email is normalized by the repository.
#[derive(Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub credential_hash: String,
}

/// Public projection of an account; never carries the credential hash.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub rating: f64,
    #[serde(serialize_with = "serialize_utc_seconds")]
    #[schema(value_type = String, format = DateTime, example = "2024-01-01T00:00:00Z")]
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            rating: account.rating,
            created_at: account.created_at,
        }
    }
}

fn serialize_utc_seconds<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
}
