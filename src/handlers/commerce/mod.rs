pub mod carts;
pub mod categories;
pub mod product_images;
pub mod product_variants;
/// Catalog and cart handlers
pub mod products;

// Re-export route builders
pub use carts::carts_routes;
pub use categories::categories_routes;
pub use products::products_routes;
