//! Request/response types for auth endpoints.

use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::{accounts::AccountSummary, error::AuthError};

// Missing fields deserialize as empty strings and fail validation with the
// service's message instead of a serde error.
#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: AccountSummary,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct ProfileResponse {
    pub user: AccountSummary,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// Collapse every body rejection (syntax, wrong shape, content type) into one message.
pub(crate) fn invalid_json(rejection: JsonRejection) -> AuthError {
    debug!("rejected request body: {rejection}");
    AuthError::Validation("Invalid JSON payload")
}
