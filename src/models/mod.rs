pub mod category;
pub mod checklist;
pub mod comment;
pub mod engagement;
pub mod follow;
pub mod item;
pub mod notification;
pub mod user;
