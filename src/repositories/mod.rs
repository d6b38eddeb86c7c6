pub mod cart_store;
pub mod in_memory_cart_store;
pub mod sea_orm_cart_store;

pub use cart_store::{CartItemDetails, CartStore, CartWithItems, NewCartLine};
pub use in_memory_cart_store::InMemoryCartStore;
pub use sea_orm_cart_store::SeaOrmCartStore;
