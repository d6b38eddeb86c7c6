use crate::{
    errors::ServiceError,
    repositories::{CartItemDetails, CartStore, CartWithItems, NewCartLine},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Cart workflow for authenticated users.
///
/// Each user owns at most one cart, created lazily the first time it is read
/// or written. Lines are keyed by product and optional variant; adding the
/// same pair again accumulates quantity instead of creating a second line.
/// Every lookup of an existing line is scoped to the caller's own cart.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn CartStore>,
}

/// Outcome of [`CartService::get_or_create_cart`].
#[derive(Debug, Clone, PartialEq)]
pub enum CartLookup {
    Existing(CartWithItems),
    Created(CartWithItems),
}

impl CartLookup {
    pub fn into_cart(self) -> CartWithItems {
        match self {
            CartLookup::Existing(cart) | CartLookup::Created(cart) => cart,
        }
    }
}

/// Outcome of [`CartService::clear_cart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The user never had a cart; nothing was created.
    AlreadyEmpty,
    Cleared { removed: u64 },
}

/// Input for adding an item to the cart
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartInput {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    #[validate(range(min = 1, max = 10000))]
    pub quantity: i32,
}

/// Input for overwriting the quantity of a cart line
#[derive(Debug, Clone, Validate)]
pub struct UpdateCartItemInput {
    #[validate(custom = "validate_uuid")]
    pub item_id: String,
    #[validate(range(min = 1, max = 10000))]
    pub quantity: i32,
}

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid"))
}

impl CartService {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self { store }
    }

    /// Returns the user's cart with items, creating an empty one if needed.
    #[instrument(skip(self))]
    pub async fn get_or_create_cart(&self, user_id: Uuid) -> Result<CartLookup, ServiceError> {
        if let Some(cart) = self.store.load_cart(user_id).await? {
            return Ok(CartLookup::Existing(cart));
        }

        let cart = self.store.ensure_cart(user_id).await?;
        info!(cart_id = %cart.id, %user_id, "Created cart");
        Ok(CartLookup::Created(CartWithItems::empty(cart)))
    }

    /// Adds `quantity` of a product (and optional variant) to the user's cart.
    ///
    /// Unknown products, and variants that are unknown or belong to another
    /// product, are reported as `MissingReference`, which renders as 400
    /// rather than 404.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        input: AddToCartInput,
    ) -> Result<CartItemDetails, ServiceError> {
        input.validate()?;

        let cart = self.store.ensure_cart(user_id).await?;

        if !self.store.product_exists(input.product_id).await? {
            return Err(ServiceError::MissingReference(
                "Product not found".to_string(),
            ));
        }

        if let Some(variant_id) = input.variant_id {
            if !self.store.variant_exists(input.product_id, variant_id).await? {
                return Err(ServiceError::MissingReference(
                    "Product variant not found".to_string(),
                ));
            }
        }

        let item = self
            .store
            .upsert_item(
                cart.id,
                NewCartLine {
                    product_id: input.product_id,
                    variant_id: input.variant_id,
                    quantity: input.quantity,
                },
            )
            .await?;

        info!(
            cart_id = %cart.id,
            item_id = %item.item.id,
            quantity = item.item.quantity,
            "Added item to cart"
        );
        Ok(item)
    }

    /// Overwrites the quantity of a line in the user's own cart.
    #[instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        user_id: Uuid,
        input: UpdateCartItemInput,
    ) -> Result<CartItemDetails, ServiceError> {
        input.validate()?;
        let item_id = Uuid::parse_str(&input.item_id)
            .map_err(|_| ServiceError::invalid_field("Invalid input data", "itemId", "uuid"))?;

        let cart = self
            .store
            .find_cart(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart not found".to_string()))?;

        let item = self
            .store
            .set_item_quantity(cart.id, item_id, input.quantity)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart item not found".to_string()))?;

        info!(cart_id = %cart.id, %item_id, quantity = input.quantity, "Updated cart item");
        Ok(item)
    }

    /// Removes a line from the user's own cart. A user without a cart gets
    /// the same not-found as a foreign or missing line.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: Uuid, item_id: &str) -> Result<(), ServiceError> {
        let item_id = Uuid::parse_str(item_id)
            .map_err(|_| ServiceError::invalid_field("Invalid item ID", "itemId", "uuid"))?;

        let not_found = || ServiceError::NotFound("Cart item not found".to_string());

        let cart = self.store.find_cart(user_id).await?.ok_or_else(not_found)?;
        if !self.store.delete_item(cart.id, item_id).await? {
            return Err(not_found());
        }

        info!(cart_id = %cart.id, %item_id, "Removed cart item");
        Ok(())
    }

    /// Empties the user's cart. The cart row itself is kept.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: Uuid) -> Result<ClearOutcome, ServiceError> {
        let Some(cart) = self.store.find_cart(user_id).await? else {
            return Ok(ClearOutcome::AlreadyEmpty);
        };

        let removed = self.store.clear_items(cart.id).await?;
        info!(cart_id = %cart.id, removed, "Cleared cart");
        Ok(ClearOutcome::Cleared { removed })
    }
}
