use crate::auth::AuthRouterExt;
use crate::entities::user::UserRole;
use crate::errors::ApiError;
use crate::handlers::common::{created_response, parse_id, success_response, JsonBody};
use crate::services::commerce::category_service::{CreateCategoryInput, UpdateCategoryInput};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post},
    Router,
};
use serde_json::json;

/// Reads are public; writes need an admin token.
pub fn categories_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(create_category))
        .route("/:id", axum::routing::put(update_category).delete(delete_category))
        .with_role(UserRole::Admin);

    Router::new()
        .route("/", get(list_categories))
        .route("/:id", get(get_category))
        .merge(admin)
}

async fn list_categories(State(state): State<AppState>) -> Result<Response, ApiError> {
    let categories = state.services.category.list_categories().await?;
    Ok(success_response(
        "Categories fetched successfully",
        json!({ "categories": categories }),
    ))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let category = state.services.category.get_category(parse_id(&id)?).await?;
    Ok(success_response(
        "Category fetched successfully",
        json!({ "category": category }),
    ))
}

async fn create_category(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCategoryInput>,
) -> Result<Response, ApiError> {
    let category = state.services.category.create_category(payload).await?;
    Ok(created_response(
        "Category created successfully",
        json!({ "category": category }),
    ))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateCategoryInput>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let category = state.services.category.update_category(id, payload).await?;
    Ok(success_response(
        "Category updated successfully",
        json!({ "category": category }),
    ))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let category = state.services.category.delete_category(parse_id(&id)?).await?;
    Ok(success_response(
        "Category deleted successfully",
        json!({ "category": category }),
    ))
}
