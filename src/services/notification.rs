use crate::{
    error::{AppError, Result},
    models::notification::{Notification, NotificationFeedItem, NotificationKind},
    services::Database,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct NotificationService {
    db: Arc<Database>,
}

impl NotificationService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// Record a notification for `to_user_id`. Callers treat failures as
    /// non-fatal; the action that triggered the notification has already
    /// happened.
    pub async fn notify(
        &self,
        from_user_id: Uuid,
        to_user_id: Uuid,
        kind: NotificationKind,
        checklist_id: Option<Uuid>,
    ) -> Result<Notification> {
        debug!(
            "Notifying user {} about {:?} from {}",
            to_user_id, kind, from_user_id
        );

        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, from_user_id, to_user_id, kind, checklist_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, from_user_id, to_user_id, kind, checklist_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(kind)
        .bind(checklist_id)
        .bind(Utc::now())
        .fetch_one(self.db.pool())
        .await?;

        Ok(notification)
    }

    /// The recipient's notifications, newest first, with the sender's
    /// username and the checklist title resolved for display.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<NotificationFeedItem>> {
        let notifications = sqlx::query_as::<_, NotificationFeedItem>(
            "SELECT n.id, n.from_user_id, p.username AS from_username, n.kind, \
                    n.checklist_id, c.title AS checklist_title, n.created_at \
             FROM notifications n \
             JOIN profiles p ON p.user_id = n.from_user_id \
             LEFT JOIN checklists c ON c.id = n.checklist_id \
             WHERE n.to_user_id = $1 \
             ORDER BY n.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(notifications)
    }

    /// Delete one notification. Only the recipient can dismiss it; anyone
    /// else sees NotFound.
    pub async fn dismiss(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND to_user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification"));
        }

        Ok(())
    }
}
