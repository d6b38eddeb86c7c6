use crate::auth::AuthRouterExt;
use crate::entities::user::UserRole;
use crate::errors::ApiError;
use crate::handlers::common::{created_response, parse_id, success_response, JsonBody};
use crate::services::commerce::product_service::{CreateProductInput, UpdateProductInput};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use super::{product_images::product_images_routes, product_variants::product_variants_routes};

/// Creates the router for product endpoints, including the image and
/// variant sub-resources.
pub fn products_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(create_product))
        .route("/:id", put(update_product).delete(delete_product))
        .with_role(UserRole::Admin);

    Router::new()
        .nest("/image", product_images_routes())
        .nest("/variant", product_variants_routes())
        .route("/", get(list_products))
        .route("/:id", get(get_product))
        .merge(admin)
}

async fn list_products(State(state): State<AppState>) -> Result<Response, ApiError> {
    let products = state.services.product.list_products().await?;
    Ok(success_response(
        "Products fetched successfully",
        json!({ "products": products }),
    ))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let product = state.services.product.get_product(parse_id(&id)?).await?;
    Ok(success_response(
        "Product fetched successfully",
        json!({ "product": product }),
    ))
}

async fn create_product(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateProductInput>,
) -> Result<Response, ApiError> {
    let product = state.services.product.create_product(payload).await?;
    Ok(created_response(
        "Product created successfully",
        json!({ "product": product }),
    ))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateProductInput>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let product = state.services.product.update_product(id, payload).await?;
    Ok(success_response(
        "Product updated successfully",
        json!({ "product": product }),
    ))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let product = state.services.product.delete_product(parse_id(&id)?).await?;
    Ok(success_response(
        "Product deleted successfully",
        json!({ "product": product }),
    ))
}
