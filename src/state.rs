use crate::{
    config::Config,
    error::Result,
    services::{
        CategoryService, ChecklistService, CommentService, Database, EngagementService,
        FeedService, FollowService, ItemService, NotificationService, UserService,
    },
};
use std::sync::Arc;

/// Shared application state: configuration, the database handle and one
/// instance of every service.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Arc<Database>,
    pub user_service: UserService,
    pub feed_service: FeedService,
    pub checklist_service: ChecklistService,
    pub engagement_service: EngagementService,
    pub follow_service: FollowService,
    pub item_service: ItemService,
    pub comment_service: CommentService,
    pub category_service: CategoryService,
    pub notification_service: NotificationService,
}

impl AppState {
    /// Build the state tree. The pool connects lazily, so this succeeds
    /// without a reachable database; callers that need one verify it
    /// explicitly.
    pub async fn new(config: Config) -> Result<Self> {
        let db = Arc::new(Database::new(&config)?);

        let user_service = UserService::new(db.clone(), &config).await?;
        let feed_service = FeedService::new(db.clone(), config.checklists_per_page).await?;
        let checklist_service = ChecklistService::new(db.clone()).await?;
        let engagement_service = EngagementService::new(db.clone()).await?;
        let follow_service = FollowService::new(db.clone()).await?;
        let item_service = ItemService::new(db.clone()).await?;
        let comment_service = CommentService::new(db.clone()).await?;
        let category_service = CategoryService::new(db.clone()).await?;
        let notification_service = NotificationService::new(db.clone()).await?;

        Ok(Self {
            config,
            db,
            user_service,
            feed_service,
            checklist_service,
            engagement_service,
            follow_service,
            item_service,
            comment_service,
            category_service,
            notification_service,
        })
    }
}
