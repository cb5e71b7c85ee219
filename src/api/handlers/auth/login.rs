use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use std::sync::Arc;

use super::{
    state::AuthState,
    types::{invalid_json, ErrorResponse, LoginRequest, LoginResponse},
};
use crate::error::AuthError;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 400, description = "Invalid payload or validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let Json(request) = payload.map_err(invalid_json)?;

    let outcome = auth_state
        .service()
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        user: outcome.account,
    }))
}
