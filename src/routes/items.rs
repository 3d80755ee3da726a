use crate::{
    error::Result,
    models::item::UpdateItemRequest,
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
use uuid::Uuid;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/:id/toggle", post(toggle_item))
}

/// Fetch one item.
/// GET /api/items/:id
pub async fn get_item(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    viewer: Viewer,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let item = app_state.item_service.get_item(id, viewer.user_id()).await?;

    Ok(Json(json!({
        "success": true,
        "data": item
    })))
}

/// Rename an item. Author only.
/// PUT /api/items/:id
pub async fn update_item(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    author: AuthUser,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let item = app_state
        .item_service
        .update_item(id, author.id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": item
    })))
}

/// Flip an item between done and not done. Author only.
/// POST /api/items/:id/toggle
pub async fn toggle_item(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    author: AuthUser,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    let item = app_state.item_service.toggle_completed(id, author.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": item
    })))
}

/// Delete an item. Author only.
/// DELETE /api/items/:id
pub async fn delete_item(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    author: AuthUser,
) -> Result<Json<Value>> {
    let id = Uuid::parse_str(&id)?;

    app_state.item_service.delete_item(id, author.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Item deleted successfully"
    })))
}
