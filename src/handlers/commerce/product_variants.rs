use crate::auth::AuthRouterExt;
use crate::entities::user::UserRole;
use crate::errors::ApiError;
use crate::handlers::common::{created_response, parse_id, success_response, JsonBody};
use crate::services::commerce::product_variant_service::{
    CreateVariantInput, UpdateVariantInput, VariantFilter,
};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Router,
};
use serde_json::json;

pub fn product_variants_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(create_variant))
        .route("/:id", put(update_variant).delete(delete_variant))
        .with_role(UserRole::Admin);

    Router::new()
        .route("/", get(list_variants))
        .route("/:id", get(get_variant))
        .merge(admin)
}

/// List variants, optionally narrowed with `?productId=`
async fn list_variants(
    State(state): State<AppState>,
    query: Result<Query<VariantFilter>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(filter) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let variants = state.services.product_variant.list_variants(filter).await?;
    Ok(success_response(
        "Product variants fetched successfully",
        json!({ "variants": variants }),
    ))
}

async fn get_variant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let variant = state
        .services
        .product_variant
        .get_variant(parse_id(&id)?)
        .await?;
    Ok(success_response(
        "Product variant fetched successfully",
        json!({ "variant": variant }),
    ))
}

async fn create_variant(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateVariantInput>,
) -> Result<Response, ApiError> {
    let variant = state.services.product_variant.create_variant(payload).await?;
    Ok(created_response(
        "Product variant created successfully",
        json!({ "variant": variant }),
    ))
}

async fn update_variant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateVariantInput>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let variant = state
        .services
        .product_variant
        .update_variant(id, payload)
        .await?;
    Ok(success_response(
        "Product variant updated successfully",
        json!({ "variant": variant }),
    ))
}

async fn delete_variant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let variant = state
        .services
        .product_variant
        .delete_variant(parse_id(&id)?)
        .await?;
    Ok(success_response(
        "Product variant deleted successfully",
        json!({ "variant": variant }),
    ))
}
