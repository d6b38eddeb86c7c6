//! Shopfront API library
//!
//! JSON REST backend for a small storefront: accounts, catalog, per-user
//! carts and orders, persisted through SeaORM.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{middleware, routing::get, Extension, Router};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{AuthConfig, AuthService};
use crate::handlers::AppServices;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth: Arc<AuthService>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
        let services = AppServices::new(db.clone());
        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

/// Outcome marker carried by every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Success half of the response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            data: None,
        }
    }
}

/// Builds the full application router with request id and HTTP tracing layers.
///
/// Transport concerns such as CORS, compression and timeouts are added by the
/// binary so tests can drive this router directly.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .nest("/health", handlers::health::health_routes())
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/users", handlers::users::users_routes())
        .nest("/category", handlers::commerce::categories_routes())
        .nest("/product", handlers::commerce::products_routes())
        .nest("/cart", handlers::commerce::carts_routes())
        .nest("/orders", handlers::orders::orders_routes())
        .layer(Extension(state.auth.clone()))
        .layer(crate::tracing::configure_http_tracing())
        .layer(middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
