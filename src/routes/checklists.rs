use crate::{
    error::Result,
    models::checklist::{CreateChecklistRequest, UpdateChecklistRequest},
    models::item::CreateItemRequest,
    models::user::{AuthUser, Viewer},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_checklist))
        .route(
            "/:id",
            get(get_checklist).put(update_checklist).delete(delete_checklist),
        )
        .route("/:id/publish", post(publish_checklist))
        .route("/:id/save", post(save_checklist))
        .route("/:id/upvote", post(toggle_upvote))
        .route("/:id/bookmark", post(toggle_bookmark))
        .route("/:id/follow", post(toggle_follow))
        .route("/:id/items", post(create_item))
}

/// Create a checklist, published or as a draft.
/// POST /api/checklists
pub async fn create_checklist(
    State(app_state): State<Arc<AppState>>,
    author: AuthUser,
    Json(request): Json<CreateChecklistRequest>,
) -> Result<Json<Value>> {
    debug!("Creating checklist: {}", request.title);

    let checklist = app_state
        .checklist_service
        .create_checklist(&author, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": checklist
    })))
}

/// Checklist detail with items and the viewer's interaction flags.
/// GET /api/checklists/:id
pub async fn get_checklist(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    viewer: Viewer,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;
    debug!("Fetching checklist: {}", id);

    let detail = app_state
        .checklist_service
        .get_checklist_with_details(id, viewer.user_id())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": detail
    })))
}

/// Update a checklist's fields. Author only.
/// PUT /api/checklists/:id
pub async fn update_checklist(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    author: AuthUser,
    Json(request): Json<UpdateChecklistRequest>,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let checklist = app_state
        .checklist_service
        .update_checklist(id, author.id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": checklist
    })))
}

/// Delete a checklist and everything hanging off it. Author only.
/// DELETE /api/checklists/:id
pub async fn delete_checklist(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    author: AuthUser,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    app_state
        .checklist_service
        .delete_checklist(id, author.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Checklist deleted successfully"
    })))
}

/// Publish a draft. Author only.
/// POST /api/checklists/:id/publish
pub async fn publish_checklist(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    author: AuthUser,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let checklist = app_state
        .checklist_service
        .publish_checklist(id, author.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": checklist
    })))
}

/// Save someone else's checklist as a copy owned by the viewer.
/// POST /api/checklists/:id/save
pub async fn save_checklist(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    viewer: AuthUser,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let checklist = app_state.checklist_service.save_and_edit(id, &viewer).await?;

    Ok(Json(json!({
        "success": true,
        "data": checklist
    })))
}

/// Toggle the viewer's upvote.
/// POST /api/checklists/:id/upvote
pub async fn toggle_upvote(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    viewer: AuthUser,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let result = app_state.engagement_service.toggle_upvote(&viewer, id).await?;

    Ok(Json(json!({
        "success": true,
        "data": result
    })))
}

/// Toggle the viewer's bookmark.
/// POST /api/checklists/:id/bookmark
pub async fn toggle_bookmark(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    viewer: AuthUser,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let result = app_state
        .engagement_service
        .toggle_bookmark(&viewer, id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": result
    })))
}

/// Toggle the viewer's follow on a checklist.
/// POST /api/checklists/:id/follow
pub async fn toggle_follow(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    viewer: AuthUser,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let result = app_state
        .follow_service
        .toggle_follow_checklist(&viewer, id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": result
    })))
}

/// Add an item to a checklist. Author only.
/// POST /api/checklists/:id/items
pub async fn create_item(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    author: AuthUser,
    Json(request): Json<CreateItemRequest>,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let item = app_state
        .item_service
        .create_item(author.id, id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": item
    })))
}
