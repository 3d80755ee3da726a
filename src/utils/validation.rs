use crate::error::{AppError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Validate a username: 3-30 characters, letters, digits, underscores and
/// hyphens only.
pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(AppError::validation("Username cannot be empty"));
    }

    if username.len() < 3 {
        return Err(AppError::validation("Username must be at least 3 characters"));
    }

    if username.len() > 30 {
        return Err(AppError::validation("Username cannot exceed 30 characters"));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let pattern = USERNAME_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
    if !pattern.is_match(username) {
        return Err(AppError::validation(
            "Username can only contain letters, numbers, underscores and hyphens",
        ));
    }

    Ok(())
}

/// Validate a category name: 1-30 characters, letters, digits, spaces and
/// hyphens, starting with a letter or digit.
pub fn validate_category_name(name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Category name cannot be empty"));
    }

    if name.len() > 30 {
        return Err(AppError::validation("Category name cannot exceed 30 characters"));
    }

    static CATEGORY_REGEX: OnceLock<Regex> = OnceLock::new();
    let pattern = CATEGORY_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9 -]*$").unwrap());
    if !pattern.is_match(name) {
        return Err(AppError::validation(
            "Category name can only contain letters, numbers, spaces and hyphens",
        ));
    }

    Ok(())
}

/// Validate a checklist or item title: non-blank after trimming, at most
/// 100 characters. The length limit also sits on the request structs; this
/// catches whitespace-only titles those checks let through.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::validation("Title cannot be empty"));
    }

    if title.len() > 100 {
        return Err(AppError::validation("Title cannot exceed 100 characters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("user123").is_ok());
        assert!(validate_username("test_user").is_ok());
        assert!(validate_username("user-name").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("user name").is_err());
        assert!(validate_username("user@name").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_category_name() {
        assert!(validate_category_name("Home").is_ok());
        assert!(validate_category_name("Daily Routine").is_ok());
        assert!(validate_category_name("self-care").is_ok());

        assert!(validate_category_name("").is_err());
        assert!(validate_category_name("   ").is_err());
        assert!(validate_category_name("-leading").is_err());
        assert!(validate_category_name(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Weekly groceries").is_ok());

        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"a".repeat(101)).is_err());
    }
}
