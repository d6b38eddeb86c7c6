use crate::{
    auth::{AuthRouterExt, AuthUser},
    entities::user::UserRole,
    errors::{ApiError, ServiceError},
    handlers::common::{parse_id, success_response, JsonBody},
    services::users::UpdateUserInput,
    AppState,
};
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, put},
    Router,
};
use serde_json::json;
use uuid::Uuid;

/// User management routes. Listing and deletion are admin-only; a user may
/// read and edit their own profile.
pub fn users_routes() -> Router<AppState> {
    let admin = Router::new()
        .route("/", get(list_users))
        .route("/:id", axum::routing::delete(delete_user))
        .with_role(UserRole::Admin);

    Router::new()
        .route("/me", get(current_user))
        .route("/:id", put(update_user).get(get_user))
        .with_auth()
        .merge(admin)
}

fn ensure_access(caller: &AuthUser, user_id: Uuid) -> Result<(), ApiError> {
    if caller.can_access_user(user_id) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("Access denied.".to_string()).into())
    }
}

async fn list_users(State(state): State<AppState>) -> Result<Response, ApiError> {
    let users = state.services.users.list_users().await?;
    Ok(success_response(
        "Users fetched successfully",
        json!({ "users": users }),
    ))
}

async fn current_user(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let user = state.services.users.get_user(caller.user_id).await?;
    Ok(success_response(
        "User fetched successfully",
        json!({ "user": user }),
    ))
}

async fn get_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    ensure_access(&caller, id)?;
    let user = state.services.users.get_user(id).await?;
    Ok(success_response(
        "User fetched successfully",
        json!({ "user": user }),
    ))
}

async fn update_user(
    caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateUserInput>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    ensure_access(&caller, id)?;
    let user = state
        .services
        .users
        .update_user(id, payload, caller.is_admin())
        .await?;
    Ok(success_response(
        "User updated successfully",
        json!({ "user": user }),
    ))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let user = state.services.users.delete_user(parse_id(&id)?).await?;
    Ok(success_response(
        "User deleted successfully",
        json!({ "user": user }),
    ))
}
