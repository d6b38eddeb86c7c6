mod common;

use axum::http::{Method, StatusCode};
use common::{unique_email, TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn register_issues_a_token_and_hides_the_hash() {
    let app = TestApp::new().await;
    let email = unique_email("Mixed.Case");

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/register",
            Some(json!({
                "email": email,
                "password": PASSWORD,
                "firstName": "Ada",
                "lastName": "Byron",
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "Success");
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["data"]["user"]["email"], email.to_lowercase());
    assert_eq!(body["data"]["user"]["role"], "USER");
    assert_eq!(body["data"]["tokenType"], "Bearer");
    assert!(body["data"]["accessToken"].as_str().is_some());
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/register",
            Some(json!({
                "email": email.to_uppercase(),
                "password": PASSWORD,
                "firstName": "Ada",
                "lastName": "Byron",
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn register_validates_input() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/register",
            Some(json!({
                "email": "not-an-email",
                "password": "short",
                "firstName": "A",
                "lastName": "B",
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid input data");
    assert!(body["error"]["email"].is_array());
    assert!(body["error"]["password"].is_array());
}

#[tokio::test]
async fn login_checks_credentials() {
    let app = TestApp::new().await;
    let user = app.register(&unique_email("login")).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": user.email, "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    let token = body["data"]["accessToken"].as_str().unwrap().to_string();

    let (status, body) = app.call(Method::GET, "/users/me", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], user.id.to_string());

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": user.email, "password": "wrong-password" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/login",
            Some(json!({ "email": unique_email("ghost"), "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn malformed_tokens_are_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(Method::GET, "/users/me", None, Some("not.a.jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "Error");
}

#[tokio::test]
async fn users_reach_only_their_own_profile() {
    let app = TestApp::new().await;
    let alice = app.register(&unique_email("alice")).await;
    let bob = app.register(&unique_email("bob")).await;

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/users/{}", bob.id),
            None,
            Some(&alice.token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied.");

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/users/{}", alice.id),
            Some(json!({ "firstName": "Alicia" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["firstName"], "Alicia");

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/users/{}", alice.id),
            Some(json!({ "role": "ADMIN" })),
            Some(&alice.token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call(Method::GET, "/users", None, Some(&alice.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admins_manage_every_account() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let customer = app.register(&unique_email("customer")).await;

    let (status, body) = app.call(Method::GET, "/users", None, Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["users"].as_array().unwrap().len(), 2);

    let uri = format!("/users/{}", customer.id);
    let (status, body) = app
        .call(
            Method::PUT,
            &uri,
            Some(json!({ "role": "ADMIN" })),
            Some(&admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"], "ADMIN");

    let (status, _) = app.call(Method::DELETE, &uri, None, Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call(Method::GET, &uri, None, Some(&admin.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}
