use crate::{
    error::{AppError, Result},
    models::checklist::*,
    models::item::Item,
    models::user::AuthUser,
    services::Database,
    utils::{sanitize::RichTextSanitizer, validation},
};
use chrono::Utc;
use sqlx::{Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

const CHECKLIST_COLUMNS: &str =
    "id, title, content, author_id, category_id, is_draft, created_at, updated_at";

/// Predicate for [`ChecklistService::list_checklists`]. Every feed variant
/// is expressed as one of these; the listing code itself never branches on
/// the variant.
#[derive(Debug, Clone, Default)]
pub struct ChecklistFilter {
    pub draft: bool,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub search_text: Option<String>,
}

impl ChecklistFilter {
    pub fn published() -> Self {
        Self::default()
    }

    pub fn drafts_of(author_id: Uuid) -> Self {
        Self {
            draft: true,
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    pub fn by_author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    pub fn in_category(category_id: Uuid) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn matching(search_text: String) -> Self {
        Self {
            search_text: Some(search_text),
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct ChecklistService {
    db: Arc<Database>,
    sanitizer: RichTextSanitizer,
}

impl ChecklistService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            db,
            sanitizer: RichTextSanitizer::new(),
        })
    }

    /// List checklists matching `filter`, newest first.
    ///
    /// Draft rows only ever appear when the filter explicitly asks for
    /// drafts, which callers restrict to the requesting author.
    pub async fn list_checklists(&self, filter: &ChecklistFilter) -> Result<Vec<Checklist>> {
        debug!("Listing checklists with filter: {:?}", filter);

        let mut query = Self::list_query(filter);
        let checklists = query
            .build_query_as::<Checklist>()
            .fetch_all(self.db.pool())
            .await?;

        Ok(checklists)
    }

    fn list_query(filter: &ChecklistFilter) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {} FROM checklists WHERE is_draft = ",
            CHECKLIST_COLUMNS
        ));
        query.push_bind(filter.draft);

        if let Some(author_id) = filter.author_id {
            query.push(" AND author_id = ");
            query.push_bind(author_id);
        }

        if let Some(category_id) = filter.category_id {
            query.push(" AND category_id = ");
            query.push_bind(category_id);
        }

        if let Some(search_text) = &filter.search_text {
            let pattern = format!("%{}%", escape_like(search_text));
            query.push(" AND (title ILIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR content ILIKE ");
            query.push_bind(pattern);
            query.push(")");
        }

        query.push(" ORDER BY created_at DESC");
        query
    }

    /// The viewer's bookmarked checklists, most recently bookmarked first.
    pub async fn list_bookmarked_by(&self, user_id: Uuid) -> Result<Vec<Checklist>> {
        let checklists = sqlx::query_as::<_, Checklist>(
            "SELECT c.id, c.title, c.content, c.author_id, c.category_id, c.is_draft, c.created_at, c.updated_at \
             FROM checklists c \
             JOIN bookmarks b ON b.checklist_id = c.id \
             WHERE b.user_id = $1 AND c.is_draft = FALSE \
             ORDER BY b.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(checklists)
    }

    /// The viewer's upvoted checklists, most recently upvoted first.
    pub async fn list_upvoted_by(&self, user_id: Uuid) -> Result<Vec<Checklist>> {
        let checklists = sqlx::query_as::<_, Checklist>(
            "SELECT c.id, c.title, c.content, c.author_id, c.category_id, c.is_draft, c.created_at, c.updated_at \
             FROM checklists c \
             JOIN upvotes u ON u.checklist_id = c.id \
             WHERE u.user_id = $1 AND c.is_draft = FALSE \
             ORDER BY u.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(checklists)
    }

    pub async fn get_checklist(&self, id: Uuid) -> Result<Option<Checklist>> {
        let checklist = sqlx::query_as::<_, Checklist>(&format!(
            "SELECT {} FROM checklists WHERE id = $1",
            CHECKLIST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(checklist)
    }

    /// Fetch a checklist the viewer is allowed to see. Drafts belong to
    /// their author alone; everyone else gets NotFound, not Forbidden, so
    /// the draft's existence is not revealed.
    pub async fn get_visible_checklist(&self, id: Uuid, viewer_id: Option<Uuid>) -> Result<Checklist> {
        let checklist = self
            .get_checklist(id)
            .await?
            .ok_or_else(|| AppError::not_found("Checklist"))?;

        if checklist.is_draft && viewer_id != Some(checklist.author_id) {
            return Err(AppError::not_found("Checklist"));
        }

        Ok(checklist)
    }

    /// Checklist detail with items and the viewer's interaction flags.
    pub async fn get_checklist_with_details(
        &self,
        id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> Result<ChecklistDetailResponse> {
        debug!("Fetching checklist details: {}", id);

        let checklist = self.get_visible_checklist(id, viewer_id).await?;

        let author_username: String =
            sqlx::query_scalar("SELECT username FROM profiles WHERE user_id = $1")
                .bind(checklist.author_id)
                .fetch_one(self.db.pool())
                .await?;

        let category_name: Option<String> = match checklist.category_id {
            Some(category_id) => {
                sqlx::query_scalar("SELECT name FROM categories WHERE id = $1")
                    .bind(category_id)
                    .fetch_optional(self.db.pool())
                    .await?
            }
            None => None,
        };

        let items = self.list_items(id).await?;

        let upvote_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM upvotes WHERE checklist_id = $1")
                .bind(id)
                .fetch_one(self.db.pool())
                .await?;

        // Anonymous viewers are reported as having already acted, matching
        // the feed aggregation.
        let (viewer_upvoted, viewer_bookmarked, viewer_following) = match viewer_id {
            None => (true, true, true),
            Some(user_id) => (
                self.marker_exists("upvotes", user_id, id).await?,
                self.marker_exists("bookmarks", user_id, id).await?,
                self.marker_exists("checklist_follows", user_id, id).await?,
            ),
        };

        Ok(ChecklistDetailResponse {
            checklist,
            author_username,
            category_name,
            items,
            upvote_count,
            viewer_upvoted,
            viewer_bookmarked,
            viewer_following,
        })
    }

    async fn marker_exists(&self, table: &str, user_id: Uuid, checklist_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1 AND checklist_id = $2)",
            table
        ))
        .bind(user_id)
        .bind(checklist_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(exists)
    }

    pub async fn list_items(&self, checklist_id: Uuid) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, checklist_id, title, completed, created_at \
             FROM items WHERE checklist_id = $1 ORDER BY title",
        )
        .bind(checklist_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(items)
    }

    pub async fn create_checklist(
        &self,
        author: &AuthUser,
        request: CreateChecklistRequest,
    ) -> Result<Checklist> {
        debug!("Creating checklist for user: {}", author.id);

        request.validate().map_err(AppError::ValidatorError)?;
        validation::validate_title(&request.title)?;

        if let Some(category_id) = request.category_id {
            self.require_category(category_id).await?;
        }

        let now = Utc::now();
        let checklist = sqlx::query_as::<_, Checklist>(&format!(
            "INSERT INTO checklists (id, title, content, author_id, category_id, is_draft, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            CHECKLIST_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(request.title.trim())
        .bind(self.sanitizer.clean(&request.content))
        .bind(author.id)
        .bind(request.category_id)
        .bind(request.is_draft.unwrap_or(false))
        .bind(now)
        .bind(now)
        .fetch_one(self.db.pool())
        .await?;

        info!("Created checklist: {} by user: {}", checklist.id, author.id);
        Ok(checklist)
    }

    pub async fn update_checklist(
        &self,
        id: Uuid,
        author_id: Uuid,
        request: UpdateChecklistRequest,
    ) -> Result<Checklist> {
        debug!("Updating checklist: {} by user: {}", id, author_id);

        request.validate().map_err(AppError::ValidatorError)?;

        let mut checklist = self
            .get_checklist(id)
            .await?
            .ok_or_else(|| AppError::not_found("Checklist"))?;

        if !checklist.is_authored_by(author_id) {
            return Err(AppError::forbidden("Only the author can update this checklist"));
        }

        if let Some(title) = request.title {
            validation::validate_title(&title)?;
            checklist.title = title.trim().to_string();
        }

        if let Some(content) = request.content {
            checklist.content = self.sanitizer.clean(&content);
        }

        if let Some(category_id) = request.category_id {
            self.require_category(category_id).await?;
            checklist.category_id = Some(category_id);
        }

        if let Some(is_draft) = request.is_draft {
            checklist.is_draft = is_draft;
        }

        let checklist = sqlx::query_as::<_, Checklist>(&format!(
            "UPDATE checklists SET title = $2, content = $3, category_id = $4, is_draft = $5, updated_at = $6 \
             WHERE id = $1 RETURNING {}",
            CHECKLIST_COLUMNS
        ))
        .bind(id)
        .bind(&checklist.title)
        .bind(&checklist.content)
        .bind(checklist.category_id)
        .bind(checklist.is_draft)
        .bind(Utc::now())
        .fetch_one(self.db.pool())
        .await?;

        Ok(checklist)
    }

    /// Delete a checklist. The schema cascades to items, comments, upvotes,
    /// bookmarks, follows and notifications.
    pub async fn delete_checklist(&self, id: Uuid, author_id: Uuid) -> Result<()> {
        let checklist = self
            .get_checklist(id)
            .await?
            .ok_or_else(|| AppError::not_found("Checklist"))?;

        if !checklist.is_authored_by(author_id) {
            return Err(AppError::forbidden("Only the author can delete this checklist"));
        }

        sqlx::query("DELETE FROM checklists WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        info!("Deleted checklist: {} by user: {}", id, author_id);
        Ok(())
    }

    /// Turn a draft into a published checklist.
    pub async fn publish_checklist(&self, id: Uuid, author_id: Uuid) -> Result<Checklist> {
        let checklist = self
            .get_checklist(id)
            .await?
            .ok_or_else(|| AppError::not_found("Checklist"))?;

        if !checklist.is_authored_by(author_id) {
            return Err(AppError::forbidden("Only the author can publish this checklist"));
        }

        if !checklist.is_draft {
            return Err(AppError::bad_request("Checklist is already published"));
        }

        let checklist = sqlx::query_as::<_, Checklist>(&format!(
            "UPDATE checklists SET is_draft = FALSE, updated_at = $2 WHERE id = $1 RETURNING {}",
            CHECKLIST_COLUMNS
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_one(self.db.pool())
        .await?;

        info!("Published checklist: {} by user: {}", id, author_id);
        Ok(checklist)
    }

    /// Clone someone else's checklist (items included) into a new published
    /// checklist owned by the viewer, retitled "<title> by <username>".
    pub async fn save_and_edit(&self, id: Uuid, viewer: &AuthUser) -> Result<Checklist> {
        debug!("User {} saving checklist {}", viewer.id, id);

        let source = self.get_visible_checklist(id, Some(viewer.id)).await?;

        if source.is_authored_by(viewer.id) {
            return Err(AppError::forbidden("Cannot save your own checklist"));
        }

        let new_title = format!("{} by {}", source.title, viewer.username);

        let already_saved: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM checklists \
             WHERE title = $1 AND content = $2 AND author_id = $3 \
             AND category_id IS NOT DISTINCT FROM $4)",
        )
        .bind(&new_title)
        .bind(&source.content)
        .bind(viewer.id)
        .bind(source.category_id)
        .fetch_one(self.db.pool())
        .await?;

        if already_saved {
            return Err(AppError::conflict("You have already saved this checklist"));
        }

        let mut tx = self.db.pool().begin().await?;
        let now = Utc::now();

        let saved = sqlx::query_as::<_, Checklist>(&format!(
            "INSERT INTO checklists (id, title, content, author_id, category_id, is_draft, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7) RETURNING {}",
            CHECKLIST_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new_title)
        .bind(&source.content)
        .bind(viewer.id)
        .bind(source.category_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let items = sqlx::query_as::<_, Item>(
            "SELECT id, checklist_id, title, completed, created_at \
             FROM items WHERE checklist_id = $1 ORDER BY title",
        )
        .bind(source.id)
        .fetch_all(&mut *tx)
        .await?;

        // Completed flags carry over as-is.
        for item in &items {
            sqlx::query(
                "INSERT INTO items (id, checklist_id, title, completed, created_at) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(saved.id)
            .bind(&item.title)
            .bind(item.completed)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "User {} saved checklist {} as {} ({} items)",
            viewer.id,
            source.id,
            saved.id,
            items.len()
        );
        Ok(saved)
    }

    async fn require_category(&self, category_id: Uuid) -> Result<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(self.db.pool())
                .await?;

        if !exists {
            return Err(AppError::not_found("Category"));
        }

        Ok(())
    }
}

fn escape_like(pattern: &str) -> String {
    pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_list_query_orders_newest_first() {
        let sql_string = ChecklistService::list_query(&ChecklistFilter::published())
            .sql()
            .to_string();
        assert!(sql_string.contains("WHERE is_draft ="));
        assert!(sql_string.ends_with("ORDER BY created_at DESC"));
    }

    #[test]
    fn test_list_query_composes_predicates() {
        let filter = ChecklistFilter {
            draft: false,
            author_id: Some(Uuid::new_v4()),
            category_id: Some(Uuid::new_v4()),
            search_text: Some("groceries".to_string()),
        };
        let sql_string = ChecklistService::list_query(&filter).sql().to_string();
        assert!(sql_string.contains("author_id ="));
        assert!(sql_string.contains("category_id ="));
        assert!(sql_string.contains("title ILIKE"));
        assert!(sql_string.contains("OR content ILIKE"));
    }

    #[test]
    fn test_filter_constructors() {
        let author = Uuid::new_v4();

        let drafts = ChecklistFilter::drafts_of(author);
        assert!(drafts.draft);
        assert_eq!(drafts.author_id, Some(author));

        let home = ChecklistFilter::published();
        assert!(!home.draft);
        assert!(home.author_id.is_none());
        assert!(home.category_id.is_none());
        assert!(home.search_text.is_none());
    }
}
