use crate::auth::AuthRouterExt;
use crate::entities::user::UserRole;
use crate::errors::ApiError;
use crate::handlers::common::{created_response, parse_id, success_response, JsonBody};
use crate::services::commerce::product_image_service::{CreateImageInput, UpdateImageInput};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post, put},
    Router,
};
use serde_json::json;

pub fn product_images_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(create_image))
        .route("/:id", put(update_image).delete(delete_image))
        .with_role(UserRole::Admin);

    Router::new()
        .route("/", get(list_images))
        .route("/:id", get(get_image))
        .merge(admin)
}

async fn list_images(State(state): State<AppState>) -> Result<Response, ApiError> {
    let images = state.services.product_image.list_images().await?;
    Ok(success_response(
        "Product images fetched successfully",
        json!({ "images": images }),
    ))
}

async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let image = state.services.product_image.get_image(parse_id(&id)?).await?;
    Ok(success_response(
        "Image fetched successfully",
        json!({ "image": image }),
    ))
}

async fn create_image(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateImageInput>,
) -> Result<Response, ApiError> {
    let image = state.services.product_image.create_image(payload).await?;
    Ok(created_response(
        "Image created successfully",
        json!({ "image": image }),
    ))
}

async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateImageInput>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let image = state.services.product_image.update_image(id, payload).await?;
    Ok(success_response(
        "Image updated successfully",
        json!({ "image": image }),
    ))
}

async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let image = state.services.product_image.delete_image(parse_id(&id)?).await?;
    Ok(success_response(
        "Image deleted successfully",
        json!({ "image": image }),
    ))
}
