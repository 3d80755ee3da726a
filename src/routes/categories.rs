use crate::{
    error::Result,
    models::category::CreateCategoryRequest,
    models::user::AuthUser,
    state::AppState,
};
use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_categories).post(create_category))
}

/// All categories, alphabetical.
/// GET /api/categories
pub async fn list_categories(State(app_state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let categories = app_state.category_service.list_categories().await?;

    Ok(Json(json!({
        "success": true,
        "data": categories
    })))
}

/// Add a category. Any signed-in user.
/// POST /api/categories
pub async fn create_category(
    State(app_state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<Json<Value>> {
    let category = app_state.category_service.create_category(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": category
    })))
}
