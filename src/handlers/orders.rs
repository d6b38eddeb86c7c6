use crate::{
    auth::{AuthRouterExt, AuthUser},
    entities::user::UserRole,
    errors::ApiError,
    handlers::common::{created_response, parse_id, success_response, JsonBody},
    services::orders::{CreateOrderInput, OrderActor, UpdateOrderInput},
    AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, put},
    Router,
};
use serde_json::json;

/// Creates the router for order endpoints
pub fn orders_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/:id", delete(delete_order))
        .with_role(UserRole::Admin);

    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order))
        .route("/:id", put(update_order))
        .with_auth()
        .merge(admin)
}

/// List the caller's orders
async fn list_orders(user: AuthUser, State(state): State<AppState>) -> Result<Response, ApiError> {
    let orders = state.services.orders.list_orders(user.user_id).await?;
    Ok(success_response(
        "Orders fetched successfully",
        json!({ "orders": orders }),
    ))
}

async fn get_order(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let order = state
        .services
        .orders
        .get_order(user.user_id, parse_id(&id)?)
        .await?;
    Ok(success_response(
        "Order fetched successfully",
        json!({ "order": order }),
    ))
}

/// Place an order from an explicit list of lines
async fn create_order(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateOrderInput>,
) -> Result<Response, ApiError> {
    let order = state
        .services
        .orders
        .create_order(user.user_id, payload)
        .await?;
    Ok(created_response(
        "Order created successfully",
        json!({ "order": order }),
    ))
}

async fn update_order(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateOrderInput>,
) -> Result<Response, ApiError> {
    let actor = OrderActor {
        user_id: user.user_id,
        is_admin: user.is_admin(),
    };
    let order = state
        .services
        .orders
        .update_order(actor, parse_id(&id)?, payload)
        .await?;
    Ok(success_response(
        "Order updated successfully",
        json!({ "order": order }),
    ))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let order = state.services.orders.delete_order(parse_id(&id)?).await?;
    Ok(success_response(
        "Order deleted successfully",
        json!({ "order": order }),
    ))
}
