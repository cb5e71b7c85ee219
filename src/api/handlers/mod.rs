//! API handlers.
//!
//! Every failure response, including the router fallbacks below, carries a
//! `{"error": "..."}` JSON body.

pub mod auth;
pub mod health;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Known path, unsupported method.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
