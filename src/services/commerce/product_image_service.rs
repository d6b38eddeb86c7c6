use crate::{
    entities::{
        product::Entity as Product,
        product_image::{self, Entity as ProductImage},
    },
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

#[derive(Clone)]
pub struct ProductImageService {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateImageInput {
    pub product_id: Uuid,
    #[validate(url)]
    pub image_url: String,
    #[validate(length(max = 255))]
    pub alt_text: Option<String>,
    #[validate(range(min = 0))]
    pub display_order: Option<i32>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageInput {
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(length(max = 255))]
    pub alt_text: Option<String>,
    #[validate(range(min = 0))]
    pub display_order: Option<i32>,
    pub is_primary: Option<bool>,
}

impl ProductImageService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_images(&self) -> Result<Vec<product_image::Model>, ServiceError> {
        Ok(ProductImage::find()
            .order_by_asc(product_image::Column::ProductId)
            .order_by_asc(product_image::Column::DisplayOrder)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_image(&self, id: Uuid) -> Result<product_image::Model, ServiceError> {
        ProductImage::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Image not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create_image(
        &self,
        input: CreateImageInput,
    ) -> Result<product_image::Model, ServiceError> {
        input.validate()?;

        if Product::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound("Product not found".to_string()));
        }

        let now = Utc::now();
        let image = product_image::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(input.product_id),
            image_url: Set(input.image_url),
            alt_text: Set(input.alt_text),
            display_order: Set(input.display_order.unwrap_or(0)),
            is_primary: Set(input.is_primary.unwrap_or(false)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(product_id = %image.product_id, "Created product image: {}", image.id);
        Ok(image)
    }

    #[instrument(skip(self))]
    pub async fn update_image(
        &self,
        id: Uuid,
        input: UpdateImageInput,
    ) -> Result<product_image::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_image(id).await?;

        let mut active: product_image::ActiveModel = existing.into();
        if let Some(image_url) = input.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(alt_text) = input.alt_text {
            active.alt_text = Set(Some(alt_text));
        }
        if let Some(display_order) = input.display_order {
            active.display_order = Set(display_order);
        }
        if let Some(is_primary) = input.is_primary {
            active.is_primary = Set(is_primary);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_image(&self, id: Uuid) -> Result<product_image::Model, ServiceError> {
        let existing = self.get_image(id).await?;
        ProductImage::delete_by_id(id).exec(&*self.db).await?;
        info!("Deleted product image: {}", id);
        Ok(existing)
    }

    /// Images of one product in display order.
    pub async fn images_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<product_image::Model>, ServiceError> {
        Ok(ProductImage::find()
            .filter(product_image::Column::ProductId.eq(product_id))
            .order_by_asc(product_image::Column::DisplayOrder)
            .all(&*self.db)
            .await?)
    }
}
