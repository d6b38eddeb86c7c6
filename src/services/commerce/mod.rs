pub mod cart_service;
pub mod category_service;
pub mod product_image_service;
pub mod product_service;
pub mod product_variant_service;

pub use cart_service::{CartLookup, CartService, ClearOutcome};
pub use category_service::CategoryService;
pub use product_image_service::ProductImageService;
pub use product_service::ProductService;
pub use product_variant_service::ProductVariantService;
