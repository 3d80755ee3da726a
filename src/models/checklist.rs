use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::category::Category;
use super::item::Item;
use super::user::ProfileResponse;
use crate::utils::pagination::Page;

/// A user-authored checklist. Drafts stay private to their author until
/// published.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Checklist {
    pub id: Uuid,
    pub title: String,
    /// Sanitized rich-text HTML.
    pub content: String,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub is_draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Checklist {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// A checklist joined with its aggregate interaction state for one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub checklist: Checklist,
    pub upvote_count: i64,
    pub viewer_upvoted: bool,
    pub viewer_bookmarked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateChecklistRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 50000))]
    pub content: String,
    pub category_id: Option<Uuid>,
    pub is_draft: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateChecklistRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 50000))]
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_draft: Option<bool>,
}

/// Query parameters shared by the feed endpoints. The page value stays a
/// raw string so out-of-range and junk values can be clamped instead of
/// rejected at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub page: Option<String>,
    pub q: Option<String>,
}

/// A user's feed page: their public profile, whether the viewer follows
/// them, and a page of their published checklists.
#[derive(Debug, Serialize)]
pub struct UserFeedResponse {
    pub profile: ProfileResponse,
    pub viewer_follows: bool,
    pub checklists: Page<FeedEntry>,
}

#[derive(Debug, Serialize)]
pub struct CategoryFeedResponse {
    pub category: Category,
    pub checklists: Page<FeedEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChecklistDetailResponse {
    #[serde(flatten)]
    pub checklist: Checklist,
    pub author_username: String,
    pub category_name: Option<String>,
    pub items: Vec<Item>,
    pub upvote_count: i64,
    pub viewer_upvoted: bool,
    pub viewer_bookmarked: bool,
    pub viewer_following: bool,
}
