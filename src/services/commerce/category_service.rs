use crate::{
    entities::category::{self, Entity as Category},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Category tree maintenance
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    #[validate(length(min = 3))]
    pub name: String,
    #[validate(length(min = 3))]
    pub slug: String,
    #[validate(length(min = 5))]
    pub description: String,
    #[validate(url)]
    pub image_url: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    #[validate(length(min = 3))]
    pub name: Option<String>,
    #[validate(length(min = 5))]
    pub description: Option<String>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        Ok(Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: Uuid) -> Result<category::Model, ServiceError> {
        Category::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        self.ensure_unique_slug(&input.slug).await?;

        if let Some(parent_id) = input.parent_id {
            if Category::find_by_id(parent_id).one(&*self.db).await?.is_none() {
                return Err(ServiceError::NotFound(
                    "Parent category not found".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let category = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            image_url: Set(input.image_url),
            parent_id: Set(input.parent_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!("Created category: {}", category.id);
        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_category(id).await?;

        let mut active: category::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.updated_at = Set(Utc::now());

        let category = active.update(&*self.db).await?;
        info!("Updated category: {}", id);
        Ok(category)
    }

    /// Deletes a category. Children and products referencing it are detached.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> Result<category::Model, ServiceError> {
        let existing = self.get_category(id).await?;
        Category::delete_by_id(id).exec(&*self.db).await?;
        info!("Deleted category: {}", id);
        Ok(existing)
    }

    async fn ensure_unique_slug(&self, slug: &str) -> Result<(), ServiceError> {
        let taken = Category::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&*self.db)
            .await?
            .is_some();

        if taken {
            return Err(ServiceError::Conflict(format!(
                "Category slug '{}' already exists",
                slug
            )));
        }
        Ok(())
    }
}
