use crate::{
    entities::{
        order::{self, Entity as Order, OrderStatus},
        order_item::{self, Entity as OrderItem},
        product::Entity as Product,
        product_variant::Entity as ProductVariant,
    },
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

/// An order with its lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: order::Model,
    pub order_items: Vec<order_item::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderLineInput>,
    #[validate(length(min = 5))]
    pub shipping_address: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderInput {
    #[validate(length(min = 5))]
    pub shipping_address: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Who is acting on an order.
#[derive(Debug, Clone, Copy)]
pub struct OrderActor {
    pub user_id: Uuid,
    pub is_admin: bool,
}

/// Service for placing and managing orders
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Orders placed by `user_id`, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderWithItems>, ServiceError> {
        let rows = Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .find_with_related(OrderItem)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(order, order_items)| OrderWithItems { order, order_items })
            .collect())
    }

    /// Looks up an order owned by `user_id`. Other users' orders are reported
    /// as missing.
    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderWithItems, ServiceError> {
        let order = self.find_owned(user_id, order_id).await?;
        let order_items = order.find_related(OrderItem).all(&*self.db).await?;
        Ok(OrderWithItems { order, order_items })
    }

    /// Places an order. Unit prices are captured from the catalog at this
    /// moment and the total is the sum of the line totals.
    #[instrument(skip(self, input), fields(lines = input.items.len()))]
    pub async fn create_order(
        &self,
        user_id: Uuid,
        input: CreateOrderInput,
    ) -> Result<OrderWithItems, ServiceError> {
        input.validate()?;
        for line in &input.items {
            line.validate()?;
        }

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        let mut priced = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let product = Product::find_by_id(line.product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

            if !product.is_active {
                return Err(ServiceError::validation(format!(
                    "Product '{}' is not available",
                    product.name
                )));
            }

            let unit_price = match line.variant_id {
                Some(variant_id) => {
                    let variant = ProductVariant::find_by_id(variant_id)
                        .one(&txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound("Product variant not found".to_string())
                        })?;
                    if variant.product_id != product.id {
                        return Err(ServiceError::validation(
                            "Variant does not belong to product",
                        ));
                    }
                    variant.effective_price(&product)
                }
                None => product.price,
            };

            priced.push((line, unit_price));
        }

        let total_amount = order_total(priced.iter().map(|(line, price)| (*price, line.quantity)));

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(user_id),
            status: Set(OrderStatus::Pending),
            total_amount: Set(total_amount),
            shipping_address: Set(input.shipping_address.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut order_items = Vec::with_capacity(priced.len());
        for (line, unit_price) in priced {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                variant_id: Set(line.variant_id),
                quantity: Set(line.quantity),
                unit_price: Set(unit_price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            order_items.push(item);
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, %order_id, "Failed to commit order creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(%order_id, %user_id, total = %total_amount, "Order created");
        Ok(OrderWithItems { order, order_items })
    }

    /// Updates the shipping address or status of the actor's own order.
    ///
    /// Customers may only cancel, and only while the order is pending.
    /// Admins may move an order to any status.
    #[instrument(skip(self))]
    pub async fn update_order(
        &self,
        actor: OrderActor,
        order_id: Uuid,
        input: UpdateOrderInput,
    ) -> Result<OrderWithItems, ServiceError> {
        input.validate()?;
        let existing = self.find_owned(actor.user_id, order_id).await?;

        if !actor.is_admin {
            if let Some(status) = input.status {
                if status != OrderStatus::Cancelled {
                    return Err(ServiceError::Forbidden(
                        "Only administrators may change order status".to_string(),
                    ));
                }
            }
            if existing.status != OrderStatus::Pending {
                return Err(ServiceError::validation(
                    "Only pending orders can be modified",
                ));
            }
        }

        let mut active: order::ActiveModel = existing.into();
        if let Some(address) = input.shipping_address {
            active.shipping_address = Set(address);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now());

        let order = active.update(&*self.db).await?;
        let order_items = order.find_related(OrderItem).all(&*self.db).await?;
        info!(%order_id, status = ?order.status, "Order updated");
        Ok(OrderWithItems { order, order_items })
    }

    /// Deletes any order with its lines.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<order::Model, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        Order::delete_by_id(order_id).exec(&*self.db).await?;
        info!(%order_id, "Order deleted");
        Ok(order)
    }

    async fn find_owned(&self, user_id: Uuid, order_id: Uuid) -> Result<order::Model, ServiceError> {
        Order::find_by_id(order_id)
            .filter(order::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }
}

fn order_total(lines: impl Iterator<Item = (Decimal, i32)>) -> Decimal {
    lines.fold(Decimal::ZERO, |acc, (price, quantity)| {
        acc + price * Decimal::from(quantity)
    })
}
