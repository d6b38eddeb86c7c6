use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::cart_store::{
    quantity_limit_exceeded, CartItemDetails, CartStore, CartWithItems, NewCartLine,
};
use crate::entities::{
    cart,
    cart_item::{self, MAX_LINE_QUANTITY},
    product, product_variant,
};
use crate::errors::ServiceError;

#[derive(Default)]
struct State {
    carts: Vec<cart::Model>,
    items: Vec<cart_item::Model>,
    products: HashMap<Uuid, product::Model>,
    variants: HashMap<Uuid, product_variant::Model>,
}

impl State {
    fn details(&self, item: &cart_item::Model) -> CartItemDetails {
        CartItemDetails {
            item: item.clone(),
            product: self.products.get(&item.product_id).cloned(),
            variant: item
                .variant_id
                .and_then(|id| self.variants.get(&id).cloned()),
        }
    }

    fn cart_for(&self, user_id: Uuid) -> Option<&cart::Model> {
        self.carts.iter().find(|c| c.user_id == user_id)
    }
}

/// [`CartStore`] held in process memory. Enforces the same one-cart-per-user
/// and one-line-per-product/variant rules as the database schema, and counts
/// every call so tests can assert that nothing touched storage.
#[derive(Default)]
pub struct InMemoryCartStore {
    state: Mutex<State>,
    calls: AtomicUsize,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: product::Model) {
        self.state
            .lock()
            .await
            .products
            .insert(product.id, product);
    }

    pub async fn insert_variant(&self, variant: product_variant::Model) {
        self.state
            .lock()
            .await
            .variants
            .insert(variant.id, variant);
    }

    /// Number of gateway calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn cart_count(&self) -> usize {
        self.state.lock().await.carts.len()
    }

    /// Every stored line, across all carts.
    pub async fn items(&self) -> Vec<cart_item::Model> {
        self.state.lock().await.items.clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn find_cart(&self, user_id: Uuid) -> Result<Option<cart::Model>, ServiceError> {
        self.record_call();
        Ok(self.state.lock().await.cart_for(user_id).cloned())
    }

    async fn load_cart(&self, user_id: Uuid) -> Result<Option<CartWithItems>, ServiceError> {
        self.record_call();
        let state = self.state.lock().await;
        Ok(state.cart_for(user_id).cloned().map(|cart| {
            let cart_items = state
                .items
                .iter()
                .filter(|i| i.cart_id == cart.id)
                .map(|i| state.details(i))
                .collect();
            CartWithItems { cart, cart_items }
        }))
    }

    async fn ensure_cart(&self, user_id: Uuid) -> Result<cart::Model, ServiceError> {
        self.record_call();
        let mut state = self.state.lock().await;
        if let Some(existing) = state.cart_for(user_id) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let cart = cart::Model {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        state.carts.push(cart.clone());
        Ok(cart)
    }

    async fn product_exists(&self, product_id: Uuid) -> Result<bool, ServiceError> {
        self.record_call();
        Ok(self.state.lock().await.products.contains_key(&product_id))
    }

    async fn variant_exists(
        &self,
        product_id: Uuid,
        variant_id: Uuid,
    ) -> Result<bool, ServiceError> {
        self.record_call();
        Ok(self
            .state
            .lock()
            .await
            .variants
            .get(&variant_id)
            .is_some_and(|variant| variant.product_id == product_id))
    }

    async fn upsert_item(
        &self,
        cart_id: Uuid,
        line: NewCartLine,
    ) -> Result<CartItemDetails, ServiceError> {
        self.record_call();
        let mut state = self.state.lock().await;
        let line_key = cart_item::line_key(line.product_id, line.variant_id);
        let now = Utc::now();

        let position = state
            .items
            .iter()
            .position(|i| i.cart_id == cart_id && i.line_key == line_key);

        let index = match position {
            Some(index) => {
                let item = &mut state.items[index];
                item.quantity = item
                    .quantity
                    .checked_add(line.quantity)
                    .filter(|total| *total <= MAX_LINE_QUANTITY)
                    .ok_or_else(quantity_limit_exceeded)?;
                item.updated_at = now;
                index
            }
            None => {
                state.items.push(cart_item::Model {
                    id: Uuid::new_v4(),
                    cart_id,
                    product_id: line.product_id,
                    variant_id: line.variant_id,
                    quantity: line.quantity,
                    line_key,
                    created_at: now,
                    updated_at: now,
                });
                state.items.len() - 1
            }
        };

        Ok(state.details(&state.items[index]))
    }

    async fn set_item_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemDetails>, ServiceError> {
        self.record_call();
        let mut state = self.state.lock().await;
        let Some(index) = state
            .items
            .iter()
            .position(|i| i.id == item_id && i.cart_id == cart_id)
        else {
            return Ok(None);
        };

        let item = &mut state.items[index];
        item.quantity = quantity;
        item.updated_at = Utc::now();
        Ok(Some(state.details(&state.items[index])))
    }

    async fn delete_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, ServiceError> {
        self.record_call();
        let mut state = self.state.lock().await;
        let before = state.items.len();
        state
            .items
            .retain(|i| !(i.id == item_id && i.cart_id == cart_id));
        Ok(state.items.len() < before)
    }

    async fn clear_items(&self, cart_id: Uuid) -> Result<u64, ServiceError> {
        self.record_call();
        let mut state = self.state.lock().await;
        let before = state.items.len();
        state.items.retain(|i| i.cart_id != cart_id);
        Ok((before - state.items.len()) as u64)
    }
}
