use axum::{extract::Extension, Json};
use std::sync::Arc;

use super::{
    principal::Principal,
    state::AuthState,
    types::{ErrorResponse, ProfileResponse},
};
use crate::error::AuthError;

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated account", body = ProfileResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(
    principal: Principal,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<Json<ProfileResponse>, AuthError> {
    let user = auth_state.service().profile(principal.account_id).await?;
    Ok(Json(ProfileResponse { user }))
}
