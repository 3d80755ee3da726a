use crate::{
    error::{AppError, Result},
    models::item::{CreateItemRequest, Item, UpdateItemRequest},
    services::Database,
    utils::validation,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// Checklist entries. Only the owning checklist's author can create,
/// edit, complete or delete them.
#[derive(Clone)]
pub struct ItemService {
    db: Arc<Database>,
}

impl ItemService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn create_item(
        &self,
        author_id: Uuid,
        checklist_id: Uuid,
        request: CreateItemRequest,
    ) -> Result<Item> {
        debug!("Creating item on checklist: {}", checklist_id);

        request.validate().map_err(AppError::ValidatorError)?;
        validation::validate_title(&request.title)?;

        let row: Option<(Uuid, bool)> =
            sqlx::query_as("SELECT author_id, is_draft FROM checklists WHERE id = $1")
                .bind(checklist_id)
                .fetch_optional(self.db.pool())
                .await?;

        let (checklist_author, is_draft) = row.ok_or_else(|| AppError::not_found("Checklist"))?;
        if is_draft && checklist_author != author_id {
            return Err(AppError::not_found("Checklist"));
        }
        if checklist_author != author_id {
            return Err(AppError::forbidden("Only the author can add items to this checklist"));
        }

        let item = sqlx::query_as::<_, Item>(
            "INSERT INTO items (id, checklist_id, title, completed, created_at) \
             VALUES ($1, $2, $3, FALSE, $4) \
             RETURNING id, checklist_id, title, completed, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(checklist_id)
        .bind(request.title.trim())
        .bind(Utc::now())
        .fetch_one(self.db.pool())
        .await?;

        info!("Created item: {} on checklist: {}", item.id, checklist_id);
        Ok(item)
    }

    /// Fetch an item the viewer is allowed to see, following the owning
    /// checklist's draft visibility.
    pub async fn get_item(&self, id: Uuid, viewer_id: Option<Uuid>) -> Result<Item> {
        let (item, author_id, is_draft) = self.item_with_owner(id).await?;

        if is_draft && viewer_id != Some(author_id) {
            return Err(AppError::not_found("Item"));
        }

        Ok(item)
    }

    pub async fn update_item(
        &self,
        id: Uuid,
        author_id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<Item> {
        request.validate().map_err(AppError::ValidatorError)?;
        validation::validate_title(&request.title)?;

        let (item, owner_id, is_draft) = self.item_with_owner(id).await?;
        if is_draft && owner_id != author_id {
            return Err(AppError::not_found("Item"));
        }
        if owner_id != author_id {
            return Err(AppError::forbidden("Only the author can update this item"));
        }

        let item = sqlx::query_as::<_, Item>(
            "UPDATE items SET title = $2 WHERE id = $1 \
             RETURNING id, checklist_id, title, completed, created_at",
        )
        .bind(item.id)
        .bind(request.title.trim())
        .fetch_one(self.db.pool())
        .await?;

        Ok(item)
    }

    /// Flip an item between done and not done.
    pub async fn toggle_completed(&self, id: Uuid, author_id: Uuid) -> Result<Item> {
        let (item, owner_id, is_draft) = self.item_with_owner(id).await?;
        if is_draft && owner_id != author_id {
            return Err(AppError::not_found("Item"));
        }
        if owner_id != author_id {
            return Err(AppError::forbidden("Only the author can complete this item"));
        }

        let item = sqlx::query_as::<_, Item>(
            "UPDATE items SET completed = NOT completed WHERE id = $1 \
             RETURNING id, checklist_id, title, completed, created_at",
        )
        .bind(item.id)
        .fetch_one(self.db.pool())
        .await?;

        debug!("Item {} completed is now {}", item.id, item.completed);
        Ok(item)
    }

    pub async fn delete_item(&self, id: Uuid, author_id: Uuid) -> Result<()> {
        let (item, owner_id, is_draft) = self.item_with_owner(id).await?;
        if is_draft && owner_id != author_id {
            return Err(AppError::not_found("Item"));
        }
        if owner_id != author_id {
            return Err(AppError::forbidden("Only the author can delete this item"));
        }

        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(item.id)
            .execute(self.db.pool())
            .await?;

        info!("Deleted item: {}", item.id);
        Ok(())
    }

    /// Item plus the owning checklist's author and draft flag.
    async fn item_with_owner(&self, id: Uuid) -> Result<(Item, Uuid, bool)> {
        let row: Option<(Uuid, Uuid, String, bool, chrono::DateTime<chrono::Utc>, Uuid, bool)> =
            sqlx::query_as(
                "SELECT i.id, i.checklist_id, i.title, i.completed, i.created_at, \
                        c.author_id, c.is_draft \
                 FROM items i JOIN checklists c ON c.id = i.checklist_id \
                 WHERE i.id = $1",
            )
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        let (id, checklist_id, title, completed, created_at, author_id, is_draft) =
            row.ok_or_else(|| AppError::not_found("Item"))?;

        Ok((
            Item {
                id,
                checklist_id,
                title,
                completed,
                created_at,
            },
            author_id,
            is_draft,
        ))
    }
}
