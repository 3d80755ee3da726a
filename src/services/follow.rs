use crate::{
    error::{AppError, Result},
    models::engagement::ToggleState,
    models::follow::FollowToggleResponse,
    models::notification::NotificationKind,
    models::user::AuthUser,
    services::{Database, NotificationService},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// User-to-user and user-to-checklist follows, both toggles.
#[derive(Clone)]
pub struct FollowService {
    db: Arc<Database>,
    notifications: NotificationService,
}

impl FollowService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        let notifications = NotificationService::new(db.clone()).await?;
        Ok(Self { db, notifications })
    }

    pub async fn toggle_follow_user(
        &self,
        follower: &AuthUser,
        username: &str,
    ) -> Result<FollowToggleResponse> {
        debug!("User {} toggling follow on user {}", follower.id, username);

        let following_id: Uuid =
            sqlx::query_scalar("SELECT user_id FROM profiles WHERE username = $1")
                .bind(username)
                .fetch_optional(self.db.pool())
                .await?
                .ok_or_else(|| AppError::not_found("User"))?;

        if following_id == follower.id {
            return Err(AppError::forbidden("Cannot follow yourself"));
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
        )
        .bind(follower.id)
        .bind(following_id)
        .fetch_one(self.db.pool())
        .await?;

        let state = ToggleState::from_exists(exists).toggled();

        match state {
            ToggleState::Active => {
                sqlx::query(
                    "INSERT INTO follows (id, follower_id, following_id, created_at) \
                     VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
                )
                .bind(Uuid::new_v4())
                .bind(follower.id)
                .bind(following_id)
                .bind(Utc::now())
                .execute(self.db.pool())
                .await?;

                if let Err(e) = self
                    .notifications
                    .notify(follower.id, following_id, NotificationKind::UserFollow, None)
                    .await
                {
                    warn!("Failed to record follow notification: {}", e);
                }
            }
            ToggleState::Inactive => {
                sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
                    .bind(follower.id)
                    .bind(following_id)
                    .execute(self.db.pool())
                    .await?;
            }
        }

        info!(
            "User {} follow on user {} is now {:?}",
            follower.id, following_id, state
        );
        Ok(FollowToggleResponse { state })
    }

    pub async fn toggle_follow_checklist(
        &self,
        user: &AuthUser,
        checklist_id: Uuid,
    ) -> Result<FollowToggleResponse> {
        debug!("User {} toggling follow on checklist {}", user.id, checklist_id);

        let row: Option<(Uuid, bool)> =
            sqlx::query_as("SELECT author_id, is_draft FROM checklists WHERE id = $1")
                .bind(checklist_id)
                .fetch_optional(self.db.pool())
                .await?;

        let (author_id, is_draft) = row.ok_or_else(|| AppError::not_found("Checklist"))?;
        if is_draft && author_id != user.id {
            return Err(AppError::not_found("Checklist"));
        }
        if author_id == user.id {
            return Err(AppError::forbidden("Cannot follow your own checklist"));
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM checklist_follows WHERE user_id = $1 AND checklist_id = $2)",
        )
        .bind(user.id)
        .bind(checklist_id)
        .fetch_one(self.db.pool())
        .await?;

        let state = ToggleState::from_exists(exists).toggled();

        match state {
            ToggleState::Active => {
                sqlx::query(
                    "INSERT INTO checklist_follows (id, user_id, checklist_id, created_at) \
                     VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
                )
                .bind(Uuid::new_v4())
                .bind(user.id)
                .bind(checklist_id)
                .bind(Utc::now())
                .execute(self.db.pool())
                .await?;

                if let Err(e) = self
                    .notifications
                    .notify(
                        user.id,
                        author_id,
                        NotificationKind::ChecklistFollow,
                        Some(checklist_id),
                    )
                    .await
                {
                    warn!("Failed to record checklist follow notification: {}", e);
                }
            }
            ToggleState::Inactive => {
                sqlx::query(
                    "DELETE FROM checklist_follows WHERE user_id = $1 AND checklist_id = $2",
                )
                .bind(user.id)
                .bind(checklist_id)
                .execute(self.db.pool())
                .await?;
            }
        }

        info!(
            "User {} follow on checklist {} is now {:?}",
            user.id, checklist_id, state
        );
        Ok(FollowToggleResponse { state })
    }
}
