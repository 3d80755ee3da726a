use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What a notification is about. Stored as the `notification_kind` enum in
/// Postgres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone upvoted one of the recipient's checklists.
    Upvote,
    /// Someone started following the recipient.
    UserFollow,
    /// Someone started following one of the recipient's checklists.
    ChecklistFollow,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub kind: NotificationKind,
    pub checklist_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A notification joined with the display fields the feed needs.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NotificationFeedItem {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub from_username: String,
    pub kind: NotificationKind,
    pub checklist_id: Option<Uuid>,
    pub checklist_title: Option<String>,
    pub created_at: DateTime<Utc>,
}
