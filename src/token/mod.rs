//! Stateless session tokens.
//!
//! Tokens are compact HS256 JWS strings carrying the account id (`sub`), its
//! email, the issue and expiry instants and a ULID `jti`. Nothing is stored
//! server side: a token is valid while its MAC checks out under the current
//! secret and `now < exp`. There is no revocation; rotating the secret (building
//! a new [`TokenManager`]) invalidates every outstanding token.

mod jwt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use ulid::Ulid;
use uuid::Uuid;

pub use jwt::{Error as JwtError, ALGORITHM};

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    /// Parse the subject back into an account id.
    #[must_use]
    pub fn account_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing secret must not be empty")]
    EmptySecret,
    #[error("token ttl must be between one second and i64::MAX seconds")]
    InvalidTtl,
    #[error("failed to sign token: {0}")]
    Signing(JwtError),
}

/// Opaque verification failure; the reason is deliberately not exposed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid token")]
pub struct InvalidToken;

pub struct TokenManager {
    secret: SecretString,
    ttl: Duration,
    ttl_secs: i64,
}

impl TokenManager {
    /// Build a manager around a signing secret and token lifetime.
    ///
    /// # Errors
    /// Returns an error if the secret is empty or the ttl is shorter than one
    /// second or does not fit a claim timestamp.
    pub fn new(secret: SecretString, ttl: Duration) -> Result<Self, TokenError> {
        if secret.expose_secret().is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|_| TokenError::InvalidTtl)?;
        if ttl_secs == 0 {
            return Err(TokenError::InvalidTtl);
        }
        Ok(Self {
            secret,
            ttl,
            ttl_secs,
        })
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `account_id` valid from now until now + ttl.
    ///
    /// # Errors
    /// Returns an error if the claims cannot be signed.
    pub fn issue(&self, account_id: Uuid, email: &str) -> Result<String, TokenError> {
        self.issue_at(account_id, email, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns an error if the claims cannot be signed.
    pub fn issue_at(
        &self,
        account_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: account_id.to_string(),
            email: email.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
            jti: Ulid::new().to_string(),
        };
        jwt::sign_hs256(self.secret.expose_secret().as_bytes(), &claims).map_err(TokenError::Signing)
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    /// Returns [`InvalidToken`] for malformed tokens, foreign algorithms, bad
    /// signatures and expired tokens alike.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns [`InvalidToken`] on any failure.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, InvalidToken> {
        self.check(token, now).map_err(|reason| {
            debug!(reason = %reason, "rejected session token");
            InvalidToken
        })
    }

    fn check(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, jwt::Error> {
        let claims: Claims = jwt::verify_hs256(self.secret.expose_secret().as_bytes(), token)?;
        if now.timestamp() >= claims.exp {
            return Err(jwt::Error::Expired);
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("secret", &"***")
            .field("ttl", &self.ttl)
            .finish()
    }
}
