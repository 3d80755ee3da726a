use crate::{
    config::Config,
    error::{AppError, Result},
    models::user::{Profile, ProfileResponse, UpdateProfileRequest},
    services::Database,
    utils::validation,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

const PROFILE_COLUMNS: &str = "user_id, username, email, avatar_url, created_at, updated_at";

/// Local profiles for identities minted upstream. The first request a
/// user makes materializes their profile row.
#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
    default_avatar_url: String,
}

impl UserService {
    pub async fn new(db: Arc<Database>, config: &Config) -> Result<Self> {
        Ok(Self {
            db,
            default_avatar_url: config.default_avatar_url.clone(),
        })
    }

    /// Fetch the profile for a gateway identity, creating it on first
    /// sight and keeping the username in sync with the gateway's.
    pub async fn get_or_create_profile(&self, user_id: Uuid, username: &str) -> Result<Profile> {
        if let Some(profile) = self.get_profile_by_user_id(user_id).await? {
            if profile.username != username {
                debug!("Syncing username for user {}: {}", user_id, username);
                let profile = sqlx::query_as::<_, Profile>(&format!(
                    "UPDATE profiles SET username = $2, updated_at = $3 WHERE user_id = $1 \
                     RETURNING {}",
                    PROFILE_COLUMNS
                ))
                .bind(user_id)
                .bind(username)
                .bind(Utc::now())
                .fetch_one(self.db.pool())
                .await?;
                return Ok(profile);
            }
            return Ok(profile);
        }

        debug!("Creating profile for user: {}", user_id);

        let now = Utc::now();
        // Concurrent first requests race here; the conflict clause lets
        // the loser fall through to the fetch below.
        sqlx::query(
            "INSERT INTO profiles (user_id, username, email, avatar_url, created_at, updated_at) \
             VALUES ($1, $2, NULL, $3, $4, $5) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(username)
        .bind(&self.default_avatar_url)
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        self.get_profile_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::internal("Failed to create user profile"))
    }

    pub async fn get_profile_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(profile)
    }

    /// Public profile view with the user's published checklist count.
    pub async fn get_profile_by_username(&self, username: &str) -> Result<ProfileResponse> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE username = $1",
            PROFILE_COLUMNS
        ))
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

        Ok(profile.to_response(checklist_count))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<Profile> {
        debug!("Updating profile for user: {}", user_id);

        request.validate().map_err(AppError::ValidatorError)?;

        let mut profile = self
            .get_profile_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if let Some(username) = request.username {
            validation::validate_username(&username)?;

            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM profiles WHERE username = $1 AND user_id != $2)",
            )
            .bind(&username)
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;

            if taken {
                return Err(AppError::conflict("Username already taken"));
            }

            profile.username = username;
        }

        if let Some(email) = request.email {
            profile.email = Some(email);
        }

        if let Some(avatar_url) = request.avatar_url {
            profile.avatar_url = avatar_url;
        }

        let profile = sqlx::query_as::<_, Profile>(&format!(
            "UPDATE profiles SET username = $2, email = $3, avatar_url = $4, updated_at = $5 \
             WHERE user_id = $1 RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(&profile.avatar_url)
        .bind(Utc::now())
        .fetch_one(self.db.pool())
        .await?;

        info!("Updated profile for user: {}", user_id);
        Ok(profile)
    }
}
