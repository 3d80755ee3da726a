use crate::{error::Result, models::user::AuthUser, state::AppState};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/:id", delete(dismiss_notification))
}

/// The viewer's notifications, newest first.
/// GET /api/notifications
pub async fn list_notifications(
    State(app_state): State<Arc<AppState>>,
    viewer: AuthUser,
) -> Result<Json<Value>> {
    let notifications = app_state
        .notification_service
        .list_for_user(viewer.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": notifications
    })))
}

/// Dismiss one notification. Recipient only.
/// DELETE /api/notifications/:id
pub async fn dismiss_notification(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    viewer: AuthUser,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    app_state.notification_service.dismiss(id, viewer.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Notification dismissed"
    })))
}
