use crate::{
    auth::TokenPair,
    entities::user,
    errors::{ApiError, ServiceError},
    handlers::common::{created_response, success_response, JsonBody},
    services::users::{LoginInput, RegisterInput},
    AppState,
};
use axum::{extract::State, response::Response, routing::post, Router};
use serde::Serialize;

/// Account plus a freshly issued access token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: user::Model,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

fn issue(state: &AppState, user: user::Model) -> Result<AuthPayload, ApiError> {
    let tokens = state
        .auth
        .generate_token(&user)
        .map_err(|e| ServiceError::InternalError(e.to_string()))?;
    Ok(AuthPayload { user, tokens })
}

/// Register handler
async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterInput>,
) -> Result<Response, ApiError> {
    let user = state.services.users.register(payload).await?;
    let body = issue(&state, user)?;
    Ok(created_response("User registered successfully", body))
}

/// Login handler
async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginInput>,
) -> Result<Response, ApiError> {
    let user = state.services.users.authenticate(payload).await?;
    let body = issue(&state, user)?;
    Ok(success_response("Login successful", body))
}
