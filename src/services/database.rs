use crate::config::Config;
use crate::error::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{error, info};

/// Connection pool wrapper every service holds a handle to.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Build the connection pool. Connections are established lazily, so
    /// this succeeds without a reachable server; `verify_connection` does
    /// the first real round trip.
    pub fn new(config: &Config) -> Result<Self> {
        info!("Initializing database pool");
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect_lazy(&config.database_url)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn verify_connection(&self) -> Result<()> {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(e.into())
            }
        }
    }

    /// Create any missing schema objects. Every statement is idempotent,
    /// so startup runs this unconditionally.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r#"
    DO $$ BEGIN
        CREATE TYPE notification_kind AS ENUM ('upvote', 'user_follow', 'checklist_follow');
    EXCEPTION WHEN duplicate_object THEN NULL;
    END $$
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        user_id UUID PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT,
        avatar_url TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS checklists (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        author_id UUID NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
        category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
        is_draft BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id UUID PRIMARY KEY,
        checklist_id UUID NOT NULL REFERENCES checklists(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS upvotes (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
        checklist_id UUID NOT NULL REFERENCES checklists(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL,
        UNIQUE (user_id, checklist_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bookmarks (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
        checklist_id UUID NOT NULL REFERENCES checklists(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL,
        UNIQUE (user_id, checklist_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS follows (
        id UUID PRIMARY KEY,
        follower_id UUID NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
        following_id UUID NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL,
        UNIQUE (follower_id, following_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS checklist_follows (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
        checklist_id UUID NOT NULL REFERENCES checklists(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL,
        UNIQUE (user_id, checklist_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id UUID PRIMARY KEY,
        from_user_id UUID NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
        to_user_id UUID NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
        kind notification_kind NOT NULL,
        checklist_id UUID REFERENCES checklists(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id UUID PRIMARY KEY,
        checklist_id UUID NOT NULL REFERENCES checklists(id) ON DELETE CASCADE,
        user_id UUID NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
        parent_id UUID REFERENCES comments(id) ON DELETE CASCADE,
        body TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_checklists_created_at ON checklists (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_checklists_author ON checklists (author_id)",
    "CREATE INDEX IF NOT EXISTS idx_checklists_category ON checklists (category_id)",
    "CREATE INDEX IF NOT EXISTS idx_items_checklist ON items (checklist_id)",
    "CREATE INDEX IF NOT EXISTS idx_upvotes_checklist ON upvotes (checklist_id)",
    "CREATE INDEX IF NOT EXISTS idx_bookmarks_checklist ON bookmarks (checklist_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_checklist ON comments (checklist_id)",
    "CREATE INDEX IF NOT EXISTS idx_notifications_recipient ON notifications (to_user_id, created_at DESC)",
];
