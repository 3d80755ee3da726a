use crate::{
    error::Result,
    models::user::{AuthUser, UpdateProfileRequest},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", put(update_my_profile))
        .route("/:username", get(get_user_profile))
        .route("/:username/follow", post(toggle_follow_user))
}

/// Public profile with published checklist count.
/// GET /api/users/:username
pub async fn get_user_profile(
    State(app_state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    debug!("Fetching profile for: {}", username);

    let profile = app_state
        .user_service
        .get_profile_by_username(&username)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": profile
    })))
}

/// Update the viewer's own profile.
/// PUT /api/users/me
pub async fn update_my_profile(
    State(app_state): State<Arc<AppState>>,
    viewer: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    let profile = app_state
        .user_service
        .update_profile(viewer.id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": profile
    })))
}

/// Toggle the viewer's follow on another user.
/// POST /api/users/:username/follow
pub async fn toggle_follow_user(
    State(app_state): State<Arc<AppState>>,
    Path(username): Path<String>,
    viewer: AuthUser,
) -> Result<Json<Value>> {
    let result = app_state
        .follow_service
        .toggle_follow_user(&viewer, &username)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": result
    })))
}
