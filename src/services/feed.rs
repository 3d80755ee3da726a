use crate::{
    error::{AppError, Result},
    models::category::Category,
    models::checklist::{CategoryFeedResponse, Checklist, FeedEntry, UserFeedResponse},
    models::user::{AuthUser, Profile, Viewer},
    services::{ChecklistFilter, ChecklistService, Database},
    utils::pagination::{paginate, Page},
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Upvote counts plus the viewer's own markers for one batch of
/// checklists, loaded in two queries instead of per row.
#[derive(Debug, Default)]
pub struct EngagementSnapshot {
    pub upvote_counts: HashMap<Uuid, i64>,
    pub upvoted: HashSet<Uuid>,
    pub bookmarked: HashSet<Uuid>,
}

impl EngagementSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Assembles every checklist feed: filter, annotate with engagement,
/// then paginate. Annotation always runs over the full filtered set so
/// page boundaries never change what a row knows about the viewer.
#[derive(Clone)]
pub struct FeedService {
    db: Arc<Database>,
    checklists: ChecklistService,
    per_page: usize,
}

impl FeedService {
    pub async fn new(db: Arc<Database>, per_page: usize) -> Result<Self> {
        let checklists = ChecklistService::new(db.clone()).await?;
        Ok(Self {
            db,
            checklists,
            per_page,
        })
    }

    /// All published checklists, newest first.
    pub async fn assemble_home(
        &self,
        viewer: &Viewer,
        page: Option<&str>,
    ) -> Result<Page<FeedEntry>> {
        let checklists = self
            .checklists
            .list_checklists(&ChecklistFilter::published())
            .await?;
        self.compose_page(checklists, viewer, page).await
    }

    /// One user's published checklists plus their profile and whether the
    /// viewer follows them.
    pub async fn assemble_user(
        &self,
        username: &str,
        viewer: &Viewer,
        page: Option<&str>,
    ) -> Result<UserFeedResponse> {
        debug!("Assembling user feed for: {}", username);

        let profile = sqlx::query_as::<_, Profile>(
            "SELECT user_id, username, email, avatar_url, created_at, updated_at \
             FROM profiles WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

        let checklist_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM checklists WHERE author_id = $1 AND is_draft = FALSE",
        )
        .bind(profile.user_id)
        .fetch_one(self.db.pool())
        .await?;

        // Same convention as the feed flags: anonymous viewers read as
        // already following.
        let viewer_follows = match viewer.user_id() {
            None => true,
            Some(viewer_id) => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
                )
                .bind(viewer_id)
                .bind(profile.user_id)
                .fetch_one(self.db.pool())
                .await?
            }
        };

        let checklists = self
            .checklists
            .list_checklists(&ChecklistFilter::by_author(profile.user_id))
            .await?;
        let page = self.compose_page(checklists, viewer, page).await?;

        Ok(UserFeedResponse {
            profile: profile.to_response(checklist_count),
            viewer_follows,
            checklists: page,
        })
    }

    /// The author's own drafts. Never reachable for anyone else.
    pub async fn assemble_drafts(
        &self,
        author: &AuthUser,
        page: Option<&str>,
    ) -> Result<Page<FeedEntry>> {
        let checklists = self
            .checklists
            .list_checklists(&ChecklistFilter::drafts_of(author.id))
            .await?;
        let viewer = Viewer::User(author.clone());
        self.compose_page(checklists, &viewer, page).await
    }

    /// Published checklists in one category.
    pub async fn assemble_category(
        &self,
        name: &str,
        viewer: &Viewer,
        page: Option<&str>,
    ) -> Result<CategoryFeedResponse> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name FROM categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

        let checklists = self
            .checklists
            .list_checklists(&ChecklistFilter::in_category(category.id))
            .await?;
        let page = self.compose_page(checklists, viewer, page).await?;

        Ok(CategoryFeedResponse {
            category,
            checklists: page,
        })
    }

    /// Published checklists whose title or content contains the query.
    ///
    /// A request without a `q` parameter is rejected; a blank query
    /// returns an empty first page rather than the whole site.
    pub async fn assemble_search(
        &self,
        query: Option<&str>,
        viewer: &Viewer,
        page: Option<&str>,
    ) -> Result<Page<FeedEntry>> {
        let query = query.ok_or_else(|| AppError::bad_request("Missing search query parameter 'q'"))?;

        if query.trim().is_empty() {
            return Ok(Page::empty(self.per_page));
        }

        let checklists = self
            .checklists
            .list_checklists(&ChecklistFilter::matching(query.to_string()))
            .await?;
        self.compose_page(checklists, viewer, page).await
    }

    /// The viewer's bookmarks, most recently bookmarked first.
    pub async fn assemble_bookmarked(
        &self,
        viewer: &AuthUser,
        page: Option<&str>,
    ) -> Result<Page<FeedEntry>> {
        let checklists = self.checklists.list_bookmarked_by(viewer.id).await?;
        let viewer = Viewer::User(viewer.clone());
        self.compose_page(checklists, &viewer, page).await
    }

    /// The viewer's upvoted checklists, most recently upvoted first.
    pub async fn assemble_upvoted(
        &self,
        viewer: &AuthUser,
        page: Option<&str>,
    ) -> Result<Page<FeedEntry>> {
        let checklists = self.checklists.list_upvoted_by(viewer.id).await?;
        let viewer = Viewer::User(viewer.clone());
        self.compose_page(checklists, &viewer, page).await
    }

    /// Annotate the full filtered set, then cut the requested page.
    async fn compose_page(
        &self,
        checklists: Vec<Checklist>,
        viewer: &Viewer,
        page: Option<&str>,
    ) -> Result<Page<FeedEntry>> {
        let snapshot = self.load_engagement(&checklists, viewer).await?;
        let entries = annotate(checklists, viewer, &snapshot);
        Ok(paginate(entries, page, self.per_page))
    }

    /// Batch-load engagement for a set of checklists: one query for the
    /// upvote counts, one for the viewer's own markers.
    async fn load_engagement(
        &self,
        checklists: &[Checklist],
        viewer: &Viewer,
    ) -> Result<EngagementSnapshot> {
        if checklists.is_empty() {
            return Ok(EngagementSnapshot::empty());
        }

        let ids: Vec<Uuid> = checklists.iter().map(|c| c.id).collect();

        let counts = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT checklist_id, COUNT(*) FROM upvotes \
             WHERE checklist_id = ANY($1) GROUP BY checklist_id",
        )
        .bind(&ids)
        .fetch_all(self.db.pool())
        .await?;

        let mut snapshot = EngagementSnapshot {
            upvote_counts: counts.into_iter().collect(),
            ..EngagementSnapshot::empty()
        };

        // Anonymous flags are fixed, no point loading markers.
        if let Some(viewer_id) = viewer.user_id() {
            let upvoted: Vec<Uuid> = sqlx::query_scalar(
                "SELECT checklist_id FROM upvotes WHERE user_id = $1 AND checklist_id = ANY($2)",
            )
            .bind(viewer_id)
            .bind(&ids)
            .fetch_all(self.db.pool())
            .await?;
            snapshot.upvoted = upvoted.into_iter().collect();

            let bookmarked: Vec<Uuid> = sqlx::query_scalar(
                "SELECT checklist_id FROM bookmarks WHERE user_id = $1 AND checklist_id = ANY($2)",
            )
            .bind(viewer_id)
            .bind(&ids)
            .fetch_all(self.db.pool())
            .await?;
            snapshot.bookmarked = bookmarked.into_iter().collect();
        }

        Ok(snapshot)
    }
}

/// Attach engagement data to each checklist, preserving input order.
///
/// Anonymous viewers get `viewer_upvoted` and `viewer_bookmarked` as
/// `true` on every row; the frontend renders those states as plain
/// markers instead of action buttons, so nothing ever invites an
/// anonymous upvote.
fn annotate(
    checklists: Vec<Checklist>,
    viewer: &Viewer,
    snapshot: &EngagementSnapshot,
) -> Vec<FeedEntry> {
    checklists
        .into_iter()
        .map(|checklist| {
            let upvote_count = snapshot
                .upvote_counts
                .get(&checklist.id)
                .copied()
                .unwrap_or(0);

            let (viewer_upvoted, viewer_bookmarked) = match viewer {
                Viewer::Anonymous => (true, true),
                Viewer::User(_) => (
                    snapshot.upvoted.contains(&checklist.id),
                    snapshot.bookmarked.contains(&checklist.id),
                ),
            };

            FeedEntry {
                checklist,
                upvote_count,
                viewer_upvoted,
                viewer_bookmarked,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_checklist(title: &str) -> Checklist {
        let now = Utc::now();
        Checklist {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: format!("<p>{}</p>", title),
            author_id: Uuid::new_v4(),
            category_id: None,
            is_draft: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn signed_in() -> Viewer {
        Viewer::User(AuthUser {
            id: Uuid::new_v4(),
            username: "carol".to_string(),
        })
    }

    #[test]
    fn test_annotate_preserves_input_order() {
        let newer = sample_checklist("list2");
        let older = sample_checklist("list1");
        let expected = vec![newer.id, older.id];

        let entries = annotate(
            vec![newer, older],
            &Viewer::Anonymous,
            &EngagementSnapshot::empty(),
        );

        let got: Vec<Uuid> = entries.iter().map(|e| e.checklist.id).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_annotate_anonymous_flags_all_true() {
        let checklists = vec![sample_checklist("a"), sample_checklist("b")];

        let entries = annotate(checklists, &Viewer::Anonymous, &EngagementSnapshot::empty());

        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert!(entry.viewer_upvoted);
            assert!(entry.viewer_bookmarked);
            assert_eq!(entry.upvote_count, 0);
        }
    }

    #[test]
    fn test_annotate_reflects_viewer_markers() {
        let upvoted_list = sample_checklist("upvoted");
        let bookmarked_list = sample_checklist("bookmarked");
        let untouched_list = sample_checklist("untouched");

        let mut snapshot = EngagementSnapshot::empty();
        snapshot.upvote_counts.insert(upvoted_list.id, 3);
        snapshot.upvoted.insert(upvoted_list.id);
        snapshot.bookmarked.insert(bookmarked_list.id);

        let entries = annotate(
            vec![upvoted_list, bookmarked_list, untouched_list],
            &signed_in(),
            &snapshot,
        );

        assert_eq!(entries[0].upvote_count, 3);
        assert!(entries[0].viewer_upvoted);
        assert!(!entries[0].viewer_bookmarked);

        assert_eq!(entries[1].upvote_count, 0);
        assert!(!entries[1].viewer_upvoted);
        assert!(entries[1].viewer_bookmarked);

        assert!(!entries[2].viewer_upvoted);
        assert!(!entries[2].viewer_bookmarked);
    }

    #[test]
    fn test_annotate_missing_count_defaults_to_zero() {
        let checklist = sample_checklist("quiet");
        let entries = annotate(vec![checklist], &signed_in(), &EngagementSnapshot::empty());
        assert_eq!(entries[0].upvote_count, 0);
    }

    #[test]
    fn test_two_checklists_fit_one_page_newest_first() {
        let newer = sample_checklist("list2");
        let older = sample_checklist("list1");
        let expected = vec![newer.id, older.id];

        let entries = annotate(
            vec![newer, older],
            &Viewer::Anonymous,
            &EngagementSnapshot::empty(),
        );
        let page = paginate(entries, None, 5);

        assert_eq!(page.page, 1);
        assert_eq!(page.total, 2);
        assert!(!page.has_other_pages);
        let got: Vec<Uuid> = page.items.iter().map(|e| e.checklist.id).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_annotate_then_paginate_keeps_annotations_on_every_page() {
        let checklists: Vec<Checklist> = (0..7)
            .map(|i| sample_checklist(&format!("list{}", i)))
            .collect();

        let entries = annotate(checklists, &Viewer::Anonymous, &EngagementSnapshot::empty());
        let second = paginate(entries, Some("2"), 5);

        assert_eq!(second.page, 2);
        assert_eq!(second.total_pages, 2);
        assert_eq!(second.items.len(), 2);
        assert!(second.items.iter().all(|e| e.viewer_upvoted));
    }
}
