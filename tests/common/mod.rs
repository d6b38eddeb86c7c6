#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shopfront_api::{app_router, config::AppConfig, db, entities::user, AppState};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration_signing_secret_for_tests_0123456789";
pub const PASSWORD: &str = "correct-horse-battery";

/// Helper harness for driving the application router against an in-memory
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

/// A registered account and its bearer token.
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestApp {
    /// Construct a new test application with a fresh, migrated database.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // one connection, otherwise each pooled connection sees its own empty database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = app_router(state.clone());
        Self { router, state }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and returns status and parsed JSON body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Registers a customer through the public endpoint.
    pub async fn register(&self, email: &str) -> TestUser {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/register",
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "firstName": "Test",
                    "lastName": "Shopper",
                })),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        TestUser {
            id: Uuid::parse_str(body["data"]["user"]["id"].as_str().expect("user id"))
                .expect("uuid user id"),
            email: email.to_string(),
            token: body["data"]["accessToken"]
                .as_str()
                .expect("access token")
                .to_string(),
        }
    }

    /// Creates an admin account directly and issues its token.
    pub async fn admin(&self) -> TestUser {
        let email = format!("admin-{}@example.com", Uuid::new_v4().simple());
        let admin: user::Model = self
            .state
            .services
            .users
            .ensure_admin(&email, PASSWORD)
            .await
            .expect("admin account");
        let tokens = self.state.auth.generate_token(&admin).expect("admin token");
        TestUser {
            id: admin.id,
            email,
            token: tokens.access_token,
        }
    }

    /// Creates a product through the admin API and returns its JSON.
    pub async fn create_product(&self, admin: &TestUser, slug: &str, price: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/product",
                Some(json!({
                    "name": format!("Product {slug}"),
                    "slug": slug,
                    "description": "Seeded for tests",
                    "price": price,
                    "stock": 25,
                })),
                Some(&admin.token),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create product failed: {body}");
        body["data"]["product"].clone()
    }

    /// Creates a variant through the admin API and returns its JSON.
    pub async fn create_variant(
        &self,
        admin: &TestUser,
        product_id: &str,
        sku: &str,
        price: Option<&str>,
    ) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/product/variant",
                Some(json!({
                    "productId": product_id,
                    "sku": sku,
                    "name": format!("Variant {sku}"),
                    "price": price,
                    "stock": 5,
                })),
                Some(&admin.token),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create variant failed: {body}");
        body["data"]["variant"].clone()
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Reads a decimal that may have been serialized as a string or a number.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}
