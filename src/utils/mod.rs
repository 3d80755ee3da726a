pub mod middleware;
pub mod pagination;
pub mod sanitize;
pub mod validation;
