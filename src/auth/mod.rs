/*!
 * # Authentication and Authorization Module
 *
 * HS256 access tokens, Argon2 password hashing, and the router layers that
 * gate routes on a valid bearer token and, optionally, on a role.
 */

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::user::{self, UserRole};
use crate::errors::ErrorResponse;

mod password;

pub use password::{hash_password, verify_password};

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
}

/// Authenticated caller, inserted into request extensions by [`auth_middleware`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }

    /// True when the caller is `user_id` or an admin.
    pub fn can_access_user(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.is_admin()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, jwt_issuer: String, access_token_expiration: Duration) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            access_token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

/// Issues and validates access tokens.
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Generate an access token for a user
    pub fn generate_token(&self, user: &user::Model) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access_exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        debug!(user_id = %user.id, jti = %claims.jti, "Issued access token");

        Ok(TokenPair {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Turns a bearer token into the caller it names.
    pub fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthUser {
            user_id,
            email: claims.email,
            role: claims.role,
            token_id: claims.jti,
        })
    }
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingAuth,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth | Self::InvalidToken | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::TokenCreation(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "authentication failure");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse::new(message, None))).into_response()
    }
}

fn access_denied_message(role: UserRole) -> String {
    match role {
        UserRole::Admin => "Access denied. Admins only.".to_string(),
        UserRole::User => "Access denied.".to_string(),
    }
}

/// Role middleware to check if a user has the required role
pub async fn role_middleware(
    State(required_role): State<UserRole>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    // admins pass every role gate
    if !user.has_role(required_role) && !user.is_admin() {
        warn!(user_id = %user.user_id, required = required_role.as_str(), "Role check failed");
        return Err(AuthError::Forbidden(access_denied_message(required_role)));
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("Authentication service not available".to_string())
                .into_response();
        }
    };

    match extract_auth_from_headers(request.headers(), &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingAuth)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingAuth)?;

    auth_service.authenticate(token)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: UserRole) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: UserRole) -> Self {
        self.layer(axum::middleware::from_fn_with_state(role, role_middleware))
            .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Extension, Router};
    use tower::ServiceExt;

    const SECRET: &str = "unit_test_signing_secret_with_enough_length";

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new(
            SECRET.into(),
            "shopfront-api".into(),
            Duration::from_secs(600),
        ))
    }

    fn user(role: UserRole) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            password_hash: String::new(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    fn app(auth: Arc<AuthService>) -> Router {
        let admin = Router::new()
            .route("/admin", get(|| async { "admin" }))
            .with_role(UserRole::Admin);
        Router::new()
            .route(
                "/me",
                get(|caller: AuthUser| async move { caller.user_id.to_string() }),
            )
            .with_auth()
            .merge(admin)
            .layer(Extension(auth))
    }

    fn get_with_token(uri: &str, token: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let auth = service();
        let account = user(UserRole::Admin);
        let pair = auth.generate_token(&account).unwrap();

        let caller = auth.authenticate(&pair.access_token).unwrap();
        assert_eq!(caller.user_id, account.id);
        assert!(caller.is_admin());
        assert_eq!(pair.token_type, "Bearer");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = AuthService::new(AuthConfig::new(
            "a_completely_different_signing_secret_xyz".into(),
            "shopfront-api".into(),
            Duration::from_secs(600),
        ));
        let pair = other.generate_token(&user(UserRole::User)).unwrap();
        assert!(matches!(
            service().validate_token(&pair.access_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_from_other_issuer_is_rejected() {
        let other = AuthService::new(AuthConfig::new(
            SECRET.into(),
            "someone-else".into(),
            Duration::from_secs(600),
        ));
        let pair = other.generate_token(&user(UserRole::User)).unwrap();
        assert!(service().validate_token(&pair.access_token).is_err());
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let response = app(Arc::new(service()))
            .oneshot(get_with_token("/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let auth = Arc::new(service());
        let token = auth
            .generate_token(&user(UserRole::User))
            .unwrap()
            .access_token;
        let response = app(auth)
            .oneshot(get_with_token("/me", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn non_admin_is_forbidden_from_admin_routes() {
        let auth = Arc::new(service());
        let user_token = auth
            .generate_token(&user(UserRole::User))
            .unwrap()
            .access_token;
        let admin_token = auth
            .generate_token(&user(UserRole::Admin))
            .unwrap()
            .access_token;

        let denied = app(auth.clone())
            .oneshot(get_with_token("/admin", Some(&user_token)))
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(denied.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["message"], "Access denied. Admins only.");

        let allowed = app(auth)
            .oneshot(get_with_token("/admin", Some(&admin_token)))
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
    }
}
