pub mod category;
pub mod checklist;
pub mod comment;
pub mod database;
pub mod engagement;
pub mod feed;
pub mod follow;
pub mod item;
pub mod notification;
pub mod user;

pub use category::CategoryService;
pub use checklist::{ChecklistFilter, ChecklistService};
pub use comment::CommentService;
pub use database::Database;
pub use engagement::EngagementService;
pub use feed::FeedService;
pub use follow::FollowService;
pub use item::ItemService;
pub use notification::NotificationService;
pub use user::UserService;
