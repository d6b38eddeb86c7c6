use crate::auth::{AuthRouterExt, AuthUser};
use crate::errors::ApiError;
use crate::handlers::common::{message_response, success_response, JsonBody};
use crate::services::commerce::{
    cart_service::{AddToCartInput, UpdateCartItemInput},
    CartLookup, ClearOutcome,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

/// Creates the router for cart endpoints. Every route requires a bearer token.
pub fn carts_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/:id", put(update_item).delete(remove_item))
        .with_auth()
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// Get the caller's cart, creating it on first access
async fn get_cart(user: AuthUser, State(state): State<AppState>) -> Result<Response, ApiError> {
    let response = match state.services.cart.get_or_create_cart(user.user_id).await? {
        CartLookup::Existing(cart) => success_response("Cart retrieved successfully", cart),
        CartLookup::Created(cart) => success_response("Cart created successfully", cart),
    };
    Ok(response)
}

/// Add a product (optionally a specific variant) to the cart
async fn add_item(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<AddToCartInput>,
) -> Result<Response, ApiError> {
    let item = state.services.cart.add_item(user.user_id, payload).await?;
    Ok(success_response("Item added to cart successfully", item))
}

/// Overwrite the quantity of one cart line
async fn update_item(
    user: AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateQuantityRequest>,
) -> Result<Response, ApiError> {
    let input = UpdateCartItemInput {
        item_id,
        quantity: payload.quantity,
    };
    let item = state
        .services
        .cart
        .update_item_quantity(user.user_id, input)
        .await?;
    Ok(success_response("Cart item updated successfully", item))
}

async fn remove_item(
    user: AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Response, ApiError> {
    state
        .services
        .cart
        .remove_item(user.user_id, &item_id)
        .await?;
    Ok(message_response("Cart item removed successfully"))
}

/// Empty the cart. Safe to call when the caller never had one.
async fn clear_cart(user: AuthUser, State(state): State<AppState>) -> Result<Response, ApiError> {
    let message = match state.services.cart.clear_cart(user.user_id).await? {
        ClearOutcome::AlreadyEmpty => "Cart is already empty",
        ClearOutcome::Cleared { .. } => "Cart cleared successfully",
    };
    Ok(success_response(message, json!({ "cart": null })))
}
