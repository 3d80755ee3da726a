pub mod categories;
pub mod checklists;
pub mod comments;
pub mod feeds;
pub mod items;
pub mod notifications;
pub mod users;
