//! Authenticated principal extraction.
//!
//! Protected handlers take a [`Principal`] argument. The extractor reads the
//! `Authorization: Bearer <token>` header, verifies the token and hands over the
//! account id. Every failure is the same 401 so callers cannot tell a missing
//! header from an expired or forged token.

use anyhow::anyhow;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::sync::Arc;
use uuid::Uuid;

use super::state::AuthState;
use crate::error::AuthError;

/// Authenticated account context derived from the bearer token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub account_id: Uuid,
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = parts
            .extensions
            .get::<Arc<AuthState>>()
            .cloned()
            .ok_or_else(|| AuthError::Internal(anyhow!("auth state extension missing")))?;

        let token = bearer_token(&parts.headers).ok_or(AuthError::Unauthorized)?;
        let claims = auth_state
            .tokens()
            .verify(token)
            .map_err(|_| AuthError::Unauthorized)?;
        let account_id = claims.account_id().ok_or(AuthError::Unauthorized)?;

        Ok(Self { account_id })
    }
}

/// Extract the credential of a `Bearer` authorization header. The scheme is
/// matched case-insensitively.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, credential) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let credential = credential.trim();
    if credential.is_empty() {
        None
    } else {
        Some(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    #[test]
    fn bearer_token_accepts_any_scheme_case() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("BEARER  abc ")), Some("abc"));
    }

    #[test]
    fn bearer_token_rejects_other_shapes() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Basic YWxhZGRpbjpvcGVu")), None);
        assert_eq!(bearer_token(&headers("Token abc")), None);
        assert_eq!(bearer_token(&headers("abc.def.ghi")), None);
    }

    #[test]
    fn bearer_token_rejects_non_utf8() {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_bytes(b"Bearer \xff\xfe") {
            headers.insert(AUTHORIZATION, value);
        }
        assert_eq!(bearer_token(&headers), None);
    }
}
