use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveValue::Set,
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::cart_store::{
    quantity_limit_exceeded, CartItemDetails, CartStore, CartWithItems, NewCartLine,
};
use crate::entities::{
    cart::{self, Entity as Cart},
    cart_item::{self, Entity as CartItem, MAX_LINE_QUANTITY},
    product::{self, Entity as Product},
    product_variant::{self, Entity as ProductVariant},
};
use crate::errors::ServiceError;

/// [`CartStore`] backed by the relational schema.
#[derive(Debug, Clone)]
pub struct SeaOrmCartStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCartStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_item(
        &self,
        filter: sea_orm::Condition,
    ) -> Result<Option<CartItemDetails>, DbErr> {
        let item = CartItem::find().filter(filter).one(&*self.db).await?;
        match item {
            Some(item) => Ok(attach_details(&*self.db, vec![item]).await?.pop()),
            None => Ok(None),
        }
    }
}

/// Populates product and variant for each line with two batched lookups.
async fn attach_details<C: ConnectionTrait>(
    conn: &C,
    items: Vec<cart_item::Model>,
) -> Result<Vec<CartItemDetails>, DbErr> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let variant_ids: Vec<Uuid> = items.iter().filter_map(|i| i.variant_id).collect();

    let products: HashMap<Uuid, product::Model> = Product::find()
        .filter(product::Column::Id.is_in(product_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let variants: HashMap<Uuid, product_variant::Model> = if variant_ids.is_empty() {
        HashMap::new()
    } else {
        ProductVariant::find()
            .filter(product_variant::Column::Id.is_in(variant_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect()
    };

    Ok(items
        .into_iter()
        .map(|item| CartItemDetails {
            product: products.get(&item.product_id).cloned(),
            variant: item.variant_id.and_then(|id| variants.get(&id).cloned()),
            item,
        })
        .collect())
}

#[async_trait]
impl CartStore for SeaOrmCartStore {
    async fn find_cart(&self, user_id: Uuid) -> Result<Option<cart::Model>, ServiceError> {
        Ok(Cart::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?)
    }

    async fn load_cart(&self, user_id: Uuid) -> Result<Option<CartWithItems>, ServiceError> {
        let Some(cart) = self.find_cart(user_id).await? else {
            return Ok(None);
        };

        let items = CartItem::find()
            .filter(cart_item::Column::CartId.eq(cart.id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let cart_items = attach_details(&*self.db, items).await?;
        Ok(Some(CartWithItems { cart, cart_items }))
    }

    async fn ensure_cart(&self, user_id: Uuid) -> Result<cart::Model, ServiceError> {
        let now = Utc::now();
        let model = cart::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = Cart::insert(model)
            .on_conflict(
                OnConflict::column(cart::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;
        debug!(%user_id, inserted, "Ensured cart row");

        self.find_cart(user_id).await?.ok_or_else(|| {
            ServiceError::InternalError(format!("Cart for user {} vanished after insert", user_id))
        })
    }

    async fn product_exists(&self, product_id: Uuid) -> Result<bool, ServiceError> {
        let count = Product::find_by_id(product_id).count(&*self.db).await?;
        Ok(count > 0)
    }

    async fn variant_exists(
        &self,
        product_id: Uuid,
        variant_id: Uuid,
    ) -> Result<bool, ServiceError> {
        let count = ProductVariant::find_by_id(variant_id)
            .filter(product_variant::Column::ProductId.eq(product_id))
            .count(&*self.db)
            .await?;
        Ok(count > 0)
    }

    async fn upsert_item(
        &self,
        cart_id: Uuid,
        line: NewCartLine,
    ) -> Result<CartItemDetails, ServiceError> {
        let now = Utc::now();
        let line_key = cart_item::line_key(line.product_id, line.variant_id);
        let model = cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart_id),
            product_id: Set(line.product_id),
            variant_id: Set(line.variant_id),
            quantity: Set(line.quantity),
            line_key: Set(line_key.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // INSERT ... ON CONFLICT (cart_id, line_key)
        //   DO UPDATE SET quantity = cart_items.quantity + excluded.quantity
        //   WHERE cart_items.quantity + excluded.quantity <= MAX_LINE_QUANTITY
        let accumulated = Expr::col((CartItem, cart_item::Column::Quantity))
            .add(Expr::cust("excluded.quantity"));
        let written = CartItem::insert(model)
            .on_conflict(
                OnConflict::columns([cart_item::Column::CartId, cart_item::Column::LineKey])
                    .value(cart_item::Column::Quantity, accumulated.clone())
                    .update_column(cart_item::Column::UpdatedAt)
                    .action_and_where(Expr::expr(accumulated).lte(MAX_LINE_QUANTITY))
                    .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;

        if written == 0 {
            debug!(%cart_id, %line_key, "Cart line quantity limit reached");
            return Err(quantity_limit_exceeded());
        }

        self.find_item(
            sea_orm::Condition::all()
                .add(cart_item::Column::CartId.eq(cart_id))
                .add(cart_item::Column::LineKey.eq(line_key)),
        )
        .await?
        .ok_or_else(|| ServiceError::InternalError("Cart item missing after upsert".to_string()))
    }

    async fn set_item_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemDetails>, ServiceError> {
        let result = CartItem::update_many()
            .col_expr(cart_item::Column::Quantity, Expr::value(quantity))
            .col_expr(cart_item::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(cart_item::Column::Id.eq(item_id))
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(self
            .find_item(sea_orm::Condition::all().add(cart_item::Column::Id.eq(item_id)))
            .await?)
    }

    async fn delete_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, ServiceError> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::Id.eq(item_id))
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn clear_items(&self, cart_id: Uuid) -> Result<u64, ServiceError> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
