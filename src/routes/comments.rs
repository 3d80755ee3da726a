use crate::{
    error::Result,
    models::comment::{CreateCommentRequest, UpdateCommentRequest},
    models::user::{AuthUser, Viewer},
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
use uuid::Uuid;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/checklist/:checklist_id", get(get_checklist_comments))
        .route("/", post(create_comment))
        .route("/:id", put(update_comment).delete(delete_comment))
}

/// The comment tree for a checklist, newest first at both levels.
/// GET /api/comments/checklist/:checklist_id
pub async fn get_checklist_comments(
    State(app_state): State<Arc<AppState>>,
    Path(checklist_id): Path<String>,
    viewer: Viewer,
) -> Result<Json<Value>> {
    let checklist_id = Uuid::parse_str(&checklist_id)?;
    debug!("Fetching comments for checklist: {}", checklist_id);

    let comments = app_state
        .comment_service
        .list_for_checklist(checklist_id, viewer.user_id())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": comments
    })))
}

/// Comment on a checklist, optionally replying to a top-level comment.
/// POST /api/comments
pub async fn create_comment(
    State(app_state): State<Arc<AppState>>,
    user: AuthUser,
    Json(request): Json<CreateCommentRequest>,
) -> Result<Json<Value>> {
    let comment = app_state.comment_service.create_comment(&user, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": comment
    })))
}

/// Edit a comment. Comment author only.
/// PUT /api/comments/:id
pub async fn update_comment(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: AuthUser,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let comment = app_state
        .comment_service
        .update_comment(id, user.id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": comment
    })))
}

/// Delete a comment. Comment author only; threads with replies stay.
/// DELETE /api/comments/:id
pub async fn delete_comment(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: AuthUser,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    app_state.comment_service.delete_comment(id, user.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Comment deleted successfully"
    })))
}
