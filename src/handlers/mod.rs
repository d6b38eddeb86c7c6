pub mod auth;
pub mod commerce;
pub mod common;
pub mod health;
pub mod orders;
pub mod users;

use crate::db::DbPool;
use crate::repositories::{CartStore, SeaOrmCartStore};
use crate::services::{
    commerce::{
        CartService, CategoryService, ProductImageService, ProductService, ProductVariantService,
    },
    orders::OrderService,
    users::UserService,
};
use std::sync::Arc;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub category: Arc<CategoryService>,
    pub product: Arc<ProductService>,
    pub product_image: Arc<ProductImageService>,
    pub product_variant: Arc<ProductVariantService>,
    pub cart: Arc<CartService>,
    pub orders: Arc<OrderService>,
}

impl AppServices {
    /// Build every service over one shared connection pool.
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        let cart_store: Arc<dyn CartStore> = Arc::new(SeaOrmCartStore::new(db_pool.clone()));

        Self {
            users: Arc::new(UserService::new(db_pool.clone())),
            category: Arc::new(CategoryService::new(db_pool.clone())),
            product: Arc::new(ProductService::new(db_pool.clone())),
            product_image: Arc::new(ProductImageService::new(db_pool.clone())),
            product_variant: Arc::new(ProductVariantService::new(db_pool.clone())),
            cart: Arc::new(CartService::new(cart_store)),
            orders: Arc::new(OrderService::new(db_pool)),
        }
    }
}
