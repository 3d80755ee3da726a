use crate::{
    error::Result,
    models::checklist::FeedQuery,
    models::user::{AuthUser, Viewer},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/home", get(home_feed))
        .route("/user/:username", get(user_feed))
        .route("/drafts", get(drafts_feed))
        .route("/category/:name", get(category_feed))
        .route("/search", get(search_feed))
        .route("/bookmarked", get(bookmarked_feed))
        .route("/upvoted", get(upvoted_feed))
}

/// All published checklists, newest first.
/// GET /api/feeds/home
pub async fn home_feed(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
    viewer: Viewer,
) -> Result<Json<Value>> {
    debug!("Fetching home feed, page: {:?}", query.page);

    let page = app_state
        .feed_service
        .assemble_home(&viewer, query.page.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": page
    })))
}

/// One user's published checklists with their profile.
/// GET /api/feeds/user/:username
pub async fn user_feed(
    State(app_state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<FeedQuery>,
    viewer: Viewer,
) -> Result<Json<Value>> {
    debug!("Fetching user feed for: {}", username);

    let feed = app_state
        .feed_service
        .assemble_user(&username, &viewer, query.page.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": feed
    })))
}

/// The signed-in author's drafts.
/// GET /api/feeds/drafts
pub async fn drafts_feed(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
    author: AuthUser,
) -> Result<Json<Value>> {
    debug!("Fetching drafts feed for user: {}", author.id);

    let page = app_state
        .feed_service
        .assemble_drafts(&author, query.page.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": page
    })))
}

/// Published checklists in one category.
/// GET /api/feeds/category/:name
pub async fn category_feed(
    State(app_state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<FeedQuery>,
    viewer: Viewer,
) -> Result<Json<Value>> {
    debug!("Fetching category feed for: {}", name);

    let feed = app_state
        .feed_service
        .assemble_category(&name, &viewer, query.page.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": feed
    })))
}

/// Published checklists matching the query in title or content.
/// GET /api/feeds/search?q=
pub async fn search_feed(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
    viewer: Viewer,
) -> Result<Json<Value>> {
    debug!("Searching checklists, q: {:?}", query.q);

    let page = app_state
        .feed_service
        .assemble_search(query.q.as_deref(), &viewer, query.page.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": page
    })))
}

/// The viewer's bookmarked checklists.
/// GET /api/feeds/bookmarked
pub async fn bookmarked_feed(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
    viewer: AuthUser,
) -> Result<Json<Value>> {
    debug!("Fetching bookmarked feed for user: {}", viewer.id);

    let page = app_state
        .feed_service
        .assemble_bookmarked(&viewer, query.page.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": page
    })))
}

/// The viewer's upvoted checklists.
/// GET /api/feeds/upvoted
pub async fn upvoted_feed(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
    viewer: AuthUser,
) -> Result<Json<Value>> {
    debug!("Fetching upvoted feed for user: {}", viewer.id);

    let page = app_state
        .feed_service
        .assemble_upvoted(&viewer, query.page.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": page
    })))
}
