use crate::{
    entities::{
        product::Entity as Product,
        product_variant::{self, Entity as ProductVariant},
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

#[derive(Clone)]
pub struct ProductVariantService {
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
pub struct CreateVariantInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariantInput {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
}

/// Query string for listing variants
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantFilter {
    pub product_id: Option<Uuid>,
}

impl ProductVariantService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_variants(
        &self,
        filter: VariantFilter,
    ) -> Result<Vec<product_variant::Model>, ServiceError> {
        let mut query = ProductVariant::find();
        if let Some(product_id) = filter.product_id {
            query = query.filter(product_variant::Column::ProductId.eq(product_id));
        }
        Ok(query
            .order_by_asc(product_variant::Column::Sku)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_variant(&self, id: Uuid) -> Result<product_variant::Model, ServiceError> {
        ProductVariant::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product variant not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn create_variant(
        &self,
        input: CreateVariantInput,
    ) -> Result<product_variant::Model, ServiceError> {
        input.validate()?;

        if Product::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound("Product not found".to_string()));
        }

        let sku_taken = ProductVariant::find()
            .filter(product_variant::Column::Sku.eq(input.sku.as_str()))
            .count(&*self.db)
            .await?;
        if sku_taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "SKU '{}' already exists",
                input.sku
            )));
        }

        let now = Utc::now();
        let variant = product_variant::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(input.product_id),
            sku: Set(input.sku),
            name: Set(input.name),
            price: Set(input.price),
            stock: Set(input.stock),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(product_id = %variant.product_id, "Created variant: {}", variant.sku);
        Ok(variant)
    }

    #[instrument(skip(self))]
    pub async fn update_variant(
        &self,
        id: Uuid,
        input: UpdateVariantInput,
    ) -> Result<product_variant::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_variant(id).await?;

        let mut active: product_variant::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(price) = input.price {
            active.price = Set(Some(price));
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_variant(&self, id: Uuid) -> Result<product_variant::Model, ServiceError> {
        let existing = self.get_variant(id).await?;
        ProductVariant::delete_by_id(id).exec(&*self.db).await?;
        info!("Deleted variant: {}", id);
        Ok(existing)
    }
}
