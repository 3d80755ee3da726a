use crate::{
    error::{AppError, Result},
    models::engagement::{BookmarkToggleResponse, ToggleState, UpvoteToggleResponse},
    models::notification::NotificationKind,
    models::user::AuthUser,
    services::{Database, NotificationService},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Upvote and bookmark toggles. Both are idempotent pairs: toggling an
/// absent marker creates it, toggling a present one removes it.
#[derive(Clone)]
pub struct EngagementService {
    db: Arc<Database>,
    notifications: NotificationService,
}

impl EngagementService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        let notifications = NotificationService::new(db.clone()).await?;
        Ok(Self { db, notifications })
    }

    pub async fn toggle_upvote(
        &self,
        user: &AuthUser,
        checklist_id: Uuid,
    ) -> Result<UpvoteToggleResponse> {
        debug!("User {} toggling upvote on {}", user.id, checklist_id);

        let (author_id, _) = self.checklist_meta(checklist_id, user.id).await?;
        if author_id == user.id {
            return Err(AppError::forbidden("Cannot upvote your own checklist"));
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM upvotes WHERE user_id = $1 AND checklist_id = $2)",
        )
        .bind(user.id)
        .bind(checklist_id)
        .fetch_one(self.db.pool())
        .await?;

        let state = ToggleState::from_exists(exists).toggled();

        match state {
            ToggleState::Active => {
                sqlx::query(
                    "INSERT INTO upvotes (id, user_id, checklist_id, created_at) \
                     VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
                )
                .bind(Uuid::new_v4())
                .bind(user.id)
                .bind(checklist_id)
                .bind(Utc::now())
                .execute(self.db.pool())
                .await?;

                // A retracted upvote never removes the notification it
                // produced, so only the Active transition notifies.
                if let Err(e) = self
                    .notifications
                    .notify(user.id, author_id, NotificationKind::Upvote, Some(checklist_id))
                    .await
                {
                    warn!("Failed to record upvote notification: {}", e);
                }
            }
            ToggleState::Inactive => {
                sqlx::query("DELETE FROM upvotes WHERE user_id = $1 AND checklist_id = $2")
                    .bind(user.id)
                    .bind(checklist_id)
                    .execute(self.db.pool())
                    .await?;
            }
        }

        let upvote_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM upvotes WHERE checklist_id = $1")
                .bind(checklist_id)
                .fetch_one(self.db.pool())
                .await?;

        info!(
            "User {} upvote on checklist {} is now {:?}",
            user.id, checklist_id, state
        );
        Ok(UpvoteToggleResponse {
            state,
            upvote_count,
        })
    }

    pub async fn toggle_bookmark(
        &self,
        user: &AuthUser,
        checklist_id: Uuid,
    ) -> Result<BookmarkToggleResponse> {
        debug!("User {} toggling bookmark on {}", user.id, checklist_id);

        let (author_id, _) = self.checklist_meta(checklist_id, user.id).await?;
        if author_id == user.id {
            return Err(AppError::forbidden("Cannot bookmark your own checklist"));
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookmarks WHERE user_id = $1 AND checklist_id = $2)",
        )
        .bind(user.id)
        .bind(checklist_id)
        .fetch_one(self.db.pool())
        .await?;

        let state = ToggleState::from_exists(exists).toggled();

        match state {
            ToggleState::Active => {
                sqlx::query(
                    "INSERT INTO bookmarks (id, user_id, checklist_id, created_at) \
                     VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
                )
                .bind(Uuid::new_v4())
                .bind(user.id)
                .bind(checklist_id)
                .bind(Utc::now())
                .execute(self.db.pool())
                .await?;
            }
            ToggleState::Inactive => {
                sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND checklist_id = $2")
                    .bind(user.id)
                    .bind(checklist_id)
                    .execute(self.db.pool())
                    .await?;
            }
        }

        info!(
            "User {} bookmark on checklist {} is now {:?}",
            user.id, checklist_id, state
        );
        Ok(BookmarkToggleResponse { state })
    }

    /// Author and draft flag of a checklist the user is allowed to see.
    /// Drafts belong to their author alone, so everyone else gets
    /// NotFound rather than a hint the row exists.
    async fn checklist_meta(&self, checklist_id: Uuid, user_id: Uuid) -> Result<(Uuid, bool)> {
        let row: Option<(Uuid, bool)> =
            sqlx::query_as("SELECT author_id, is_draft FROM checklists WHERE id = $1")
                .bind(checklist_id)
                .fetch_optional(self.db.pool())
                .await?;

        let (author_id, is_draft) = row.ok_or_else(|| AppError::not_found("Checklist"))?;
        if is_draft && author_id != user_id {
            return Err(AppError::not_found("Checklist"));
        }

        Ok((author_id, is_draft))
    }
}
