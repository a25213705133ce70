//! Authentication-related handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::{get_user_email, AppState};

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The authenticated user's email or identifier
    pub user: String,
    /// How the user was authenticated
    pub auth_method: String,
}

/// GET /api/me - Get the current identity
pub async fn get_me(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<MeResponse> {
    let user = get_user_email(&headers);

    let auth_method = match user.as_str() {
        "api-key" => "api_key",
        "local-dev" => "none",
        _ if !state.config.require_auth => "none",
        _ => "cloudflare_header",
    };

    Json(MeResponse {
        user,
        auth_method: auth_method.to_string(),
    })
}
