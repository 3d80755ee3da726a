use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Per-user display data. Identity itself lives in the upstream auth
/// service; this row is created lazily the first time a user is seen.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn to_response(&self, checklist_count: i64) -> ProfileResponse {
        ProfileResponse {
            user_id: self.user_id,
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
            checklist_count,
            joined_at: self.created_at,
        }
    }
}

/// Public profile shape. Email never leaves the service.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: String,
    pub checklist_count: i64,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 30))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub avatar_url: Option<String>,
}

/// The authenticated identity the gateway established for this request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// Who a request acts as. Threaded explicitly through every service call
/// instead of living in ambient request state.
#[derive(Debug, Clone)]
pub enum Viewer {
    Anonymous,
    User(AuthUser),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(user) => Some(user.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_user_id() {
        assert_eq!(Viewer::Anonymous.user_id(), None);

        let id = Uuid::new_v4();
        let viewer = Viewer::User(AuthUser {
            id,
            username: "testuser".to_string(),
        });
        assert_eq!(viewer.user_id(), Some(id));
    }
}
