use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{
    cart,
    cart_item::{self, MAX_LINE_QUANTITY},
    product, product_variant,
};
use crate::errors::ServiceError;

/// A cart line with the product and variant it points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDetails {
    #[serde(flatten)]
    pub item: cart_item::Model,
    pub product: Option<product::Model>,
    pub variant: Option<product_variant::Model>,
}

/// A cart with every line eagerly loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartWithItems {
    #[serde(flatten)]
    pub cart: cart::Model,
    pub cart_items: Vec<CartItemDetails>,
}

impl CartWithItems {
    pub fn empty(cart: cart::Model) -> Self {
        Self {
            cart,
            cart_items: Vec::new(),
        }
    }
}

/// What to put in a cart. Quantity is the amount to add, not the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCartLine {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
}

/// Error for an add that would push a line over [`MAX_LINE_QUANTITY`].
pub fn quantity_limit_exceeded() -> ServiceError {
    ServiceError::invalid_field(
        format!("Cart item quantity cannot exceed {}", MAX_LINE_QUANTITY),
        "quantity",
        "max",
    )
}

/// Persistence gateway for the cart workflow.
///
/// Every write that could race with a concurrent request for the same user is
/// a single statement backed by a uniqueness constraint, so implementations
/// never need an application-level lock.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_cart(&self, user_id: Uuid) -> Result<Option<cart::Model>, ServiceError>;

    /// The user's cart with items, products and variants populated.
    async fn load_cart(&self, user_id: Uuid) -> Result<Option<CartWithItems>, ServiceError>;

    /// Returns the user's cart, creating it if absent. Concurrent callers for
    /// the same user all observe the same row.
    async fn ensure_cart(&self, user_id: Uuid) -> Result<cart::Model, ServiceError>;

    async fn product_exists(&self, product_id: Uuid) -> Result<bool, ServiceError>;

    /// Whether `variant_id` exists and belongs to `product_id`.
    async fn variant_exists(
        &self,
        product_id: Uuid,
        variant_id: Uuid,
    ) -> Result<bool, ServiceError>;

    /// Inserts the line, or adds `line.quantity` to the existing line for the
    /// same product/variant pair. The accumulated quantity never passes
    /// [`MAX_LINE_QUANTITY`]; an add that would is rejected and the line is
    /// left unchanged.
    async fn upsert_item(
        &self,
        cart_id: Uuid,
        line: NewCartLine,
    ) -> Result<CartItemDetails, ServiceError>;

    /// Overwrites the quantity of `item_id` if it belongs to `cart_id`.
    async fn set_item_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemDetails>, ServiceError>;

    /// Deletes `item_id` if it belongs to `cart_id`. Returns whether a row went away.
    async fn delete_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, ServiceError>;

    /// Removes every line of the cart, keeping the cart itself.
    async fn clear_items(&self, cart_id: Uuid) -> Result<u64, ServiceError>;
}
