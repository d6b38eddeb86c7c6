use crate::{
    entities::{
        category::Entity as Category,
        order_item,
        product::{self, Entity as Product},
    },
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("price_negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    #[validate(length(min = 3))]
    pub name: String,
    #[validate(length(min = 3))]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock: i32,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    #[validate(length(min = 3))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        Ok(Product::find()
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        self.ensure_unique_slug(&input.slug).await?;
        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }

        let now = Utc::now();
        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            price: Set(input.price),
            stock: Set(input.stock),
            category_id: Set(input.category_id),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!("Created product: {}", product.id);
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_product(id).await?;
        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let product = active.update(&*self.db).await?;
        info!("Updated product: {}", id);
        Ok(product)
    }

    /// Deletes a product together with its images, variants and cart lines.
    /// Products that appear on an order are kept for the order history.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        let existing = self.get_product(id).await?;

        let ordered = order_item::Entity::find()
            .filter(order_item::Column::ProductId.eq(id))
            .count(&*self.db)
            .await?;
        if ordered > 0 {
            return Err(ServiceError::Conflict(
                "Product is referenced by existing orders".to_string(),
            ));
        }

        Product::delete_by_id(id).exec(&*self.db).await?;
        info!("Deleted product: {}", id);
        Ok(existing)
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<(), ServiceError> {
        Category::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))
    }

    async fn ensure_unique_slug(&self, slug: &str) -> Result<(), ServiceError> {
        let taken = Product::find()
            .filter(product::Column::Slug.eq(slug))
            .count(&*self.db)
            .await?;
        if taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "Product slug '{}' already exists",
                slug
            )));
        }
        Ok(())
    }
}
