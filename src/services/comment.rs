use crate::{
    error::{AppError, Result},
    models::comment::{Comment, CommentWithReplies, CreateCommentRequest, UpdateCommentRequest},
    models::user::AuthUser,
    services::Database,
    utils::sanitize::RichTextSanitizer,
};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

#[derive(FromRow)]
struct CommentRecord {
    id: Uuid,
    checklist_id: Uuid,
    user_id: Uuid,
    parent_id: Option<Uuid>,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    username: String,
}

impl CommentRecord {
    fn into_node(self) -> CommentWithReplies {
        CommentWithReplies {
            comment: Comment {
                id: self.id,
                checklist_id: self.checklist_id,
                user_id: self.user_id,
                parent_id: self.parent_id,
                body: self.body,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            username: self.username,
            replies: Vec::new(),
        }
    }
}

/// Two-level comment threads on checklists: top-level comments and one
/// layer of replies, newest first at both levels.
#[derive(Clone)]
pub struct CommentService {
    db: Arc<Database>,
    sanitizer: RichTextSanitizer,
}

impl CommentService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            db,
            sanitizer: RichTextSanitizer::new(),
        })
    }

    pub async fn create_comment(
        &self,
        user: &AuthUser,
        request: CreateCommentRequest,
    ) -> Result<Comment> {
        debug!("Creating comment on checklist: {}", request.checklist_id);

        request.validate().map_err(AppError::ValidatorError)?;

        let row: Option<(Uuid, bool)> =
            sqlx::query_as("SELECT author_id, is_draft FROM checklists WHERE id = $1")
                .bind(request.checklist_id)
                .fetch_optional(self.db.pool())
                .await?;

        let (checklist_author, is_draft) = row.ok_or_else(|| AppError::not_found("Checklist"))?;
        if is_draft && checklist_author != user.id {
            return Err(AppError::not_found("Checklist"));
        }

        match request.parent_id {
            Some(parent_id) => {
                let parent: Option<(Uuid, Option<Uuid>)> =
                    sqlx::query_as("SELECT checklist_id, parent_id FROM comments WHERE id = $1")
                        .bind(parent_id)
                        .fetch_optional(self.db.pool())
                        .await?;

                let (parent_checklist, parent_parent) =
                    parent.ok_or_else(|| AppError::not_found("Parent comment"))?;

                if parent_checklist != request.checklist_id {
                    return Err(AppError::bad_request(
                        "Parent comment belongs to a different checklist",
                    ));
                }
                if parent_parent.is_some() {
                    return Err(AppError::bad_request("Replies cannot be nested further"));
                }
            }
            None => {
                // Authors join discussions through replies, they do not
                // open threads on their own checklist.
                if checklist_author == user.id {
                    return Err(AppError::forbidden(
                        "Cannot start a comment thread on your own checklist",
                    ));
                }
            }
        }

        let now = Utc::now();
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, checklist_id, user_id, parent_id, body, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, checklist_id, user_id, parent_id, body, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(request.checklist_id)
        .bind(user.id)
        .bind(request.parent_id)
        .bind(self.sanitizer.clean(&request.body))
        .bind(now)
        .bind(now)
        .fetch_one(self.db.pool())
        .await?;

        info!(
            "Created comment: {} on checklist: {}",
            comment.id, comment.checklist_id
        );
        Ok(comment)
    }

    /// The comment tree for a checklist the viewer can see.
    pub async fn list_for_checklist(
        &self,
        checklist_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> Result<Vec<CommentWithReplies>> {
        let row: Option<(Uuid, bool)> =
            sqlx::query_as("SELECT author_id, is_draft FROM checklists WHERE id = $1")
                .bind(checklist_id)
                .fetch_optional(self.db.pool())
                .await?;

        let (author_id, is_draft) = row.ok_or_else(|| AppError::not_found("Checklist"))?;
        if is_draft && viewer_id != Some(author_id) {
            return Err(AppError::not_found("Checklist"));
        }

        let records = sqlx::query_as::<_, CommentRecord>(
            "SELECT c.id, c.checklist_id, c.user_id, c.parent_id, c.body, \
                    c.created_at, c.updated_at, p.username \
             FROM comments c \
             JOIN profiles p ON p.user_id = c.user_id \
             WHERE c.checklist_id = $1 \
             ORDER BY c.created_at DESC",
        )
        .bind(checklist_id)
        .fetch_all(self.db.pool())
        .await?;

        let nodes = records.into_iter().map(CommentRecord::into_node).collect();
        Ok(build_tree(nodes))
    }

    pub async fn update_comment(
        &self,
        id: Uuid,
        user_id: Uuid,
        request: UpdateCommentRequest,
    ) -> Result<Comment> {
        request.validate().map_err(AppError::ValidatorError)?;

        let comment = self.require_comment(id).await?;
        if comment.user_id != user_id {
            return Err(AppError::forbidden("Only the comment author can edit it"));
        }

        let comment = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET body = $2, updated_at = $3 WHERE id = $1 \
             RETURNING id, checklist_id, user_id, parent_id, body, created_at, updated_at",
        )
        .bind(id)
        .bind(self.sanitizer.clean(&request.body))
        .bind(Utc::now())
        .fetch_one(self.db.pool())
        .await?;

        Ok(comment)
    }

    /// Delete a comment. A top-level comment keeps its thread alive, so it
    /// cannot go while replies exist.
    pub async fn delete_comment(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let comment = self.require_comment(id).await?;
        if comment.user_id != user_id {
            return Err(AppError::forbidden("Only the comment author can delete it"));
        }

        if comment.is_top_level() {
            let has_replies: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM comments WHERE parent_id = $1)")
                    .bind(id)
                    .fetch_one(self.db.pool())
                    .await?;

            if has_replies {
                return Err(AppError::conflict("Cannot delete a comment that has replies"));
            }
        }

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        info!("Deleted comment: {}", id);
        Ok(())
    }

    async fn require_comment(&self, id: Uuid) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, checklist_id, user_id, parent_id, body, created_at, updated_at \
             FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        comment.ok_or_else(|| AppError::not_found("Comment"))
    }
}

/// Group a flat newest-first comment list into top-level comments with
/// their replies attached, preserving the incoming order at both levels.
fn build_tree(nodes: Vec<CommentWithReplies>) -> Vec<CommentWithReplies> {
    let mut top_level = Vec::new();
    let mut replies: HashMap<Uuid, Vec<CommentWithReplies>> = HashMap::new();

    for node in nodes {
        match node.comment.parent_id {
            Some(parent_id) => replies.entry(parent_id).or_default().push(node),
            None => top_level.push(node),
        }
    }

    for node in &mut top_level {
        if let Some(children) = replies.remove(&node.comment.id) {
            node.replies = children;
        }
    }

    top_level
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(parent_id: Option<Uuid>, body: &str) -> CommentWithReplies {
        let now = Utc::now();
        CommentWithReplies {
            comment: Comment {
                id: Uuid::new_v4(),
                checklist_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                parent_id,
                body: body.to_string(),
                created_at: now,
                updated_at: now,
            },
            username: "dave".to_string(),
            replies: Vec::new(),
        }
    }

    #[test]
    fn test_build_tree_attaches_replies_to_parents() {
        let first = node(None, "newest thread");
        let second = node(None, "older thread");
        let reply_to_second = node(Some(second.comment.id), "reply");

        let tree = build_tree(vec![first, reply_to_second, second]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment.body, "newest thread");
        assert!(tree[0].replies.is_empty());
        assert_eq!(tree[1].replies.len(), 1);
        assert_eq!(tree[1].replies[0].comment.body, "reply");
    }

    #[test]
    fn test_build_tree_keeps_newest_first_within_replies() {
        let thread = node(None, "thread");
        let newer_reply = node(Some(thread.comment.id), "newer");
        let older_reply = node(Some(thread.comment.id), "older");

        let tree = build_tree(vec![newer_reply, older_reply, thread]);

        assert_eq!(tree.len(), 1);
        let bodies: Vec<&str> = tree[0]
            .replies
            .iter()
            .map(|r| r.comment.body.as_str())
            .collect();
        assert_eq!(bodies, vec!["newer", "older"]);
    }

    #[test]
    fn test_build_tree_empty_input() {
        assert!(build_tree(Vec::new()).is_empty());
    }
}
