use crate::{
    error::{AppError, Result},
    models::category::{Category, CreateCategoryRequest},
    services::Database,
    utils::validation,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<Database>,
}

impl CategoryService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(self.db.pool())
                .await?;

        Ok(categories)
    }

    /// Create a category. Any signed-in user can add one; names are
    /// unique across the site.
    pub async fn create_category(&self, request: CreateCategoryRequest) -> Result<Category> {
        request.validate().map_err(AppError::ValidatorError)?;
        validation::validate_category_name(&request.name)?;
        let name = request.name.trim();

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)")
                .bind(name)
                .fetch_one(self.db.pool())
                .await?;

        if exists {
            return Err(AppError::conflict("Category already exists"));
        }

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(self.db.pool())
        .await?;

        info!("Created category: {}", category.name);
        Ok(category)
    }
}
