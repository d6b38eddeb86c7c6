//! End-to-end tests for the cart workflow over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use common::{unique_email, TestApp};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use shopfront_api::entities::{cart, cart_item, cart_item::MAX_LINE_QUANTITY, product};
use shopfront_api::errors::ServiceError;
use shopfront_api::repositories::{CartStore, InMemoryCartStore, SeaOrmCartStore};
use shopfront_api::services::commerce::cart_service::AddToCartInput;
use shopfront_api::services::commerce::CartService;
use std::sync::Arc;
use uuid::Uuid;

async fn cart_rows(app: &TestApp, user_id: Uuid) -> u64 {
    cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .count(&*app.state.db)
        .await
        .unwrap()
}

async fn item_rows(app: &TestApp) -> Vec<cart_item::Model> {
    cart_item::Entity::find().all(&*app.state.db).await.unwrap()
}

#[tokio::test]
async fn cart_routes_require_a_token() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "Error");

    let (status, _) = app
        .call(Method::GET, "/cart", None, Some("not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn first_get_creates_then_retrieves() {
    let app = TestApp::new().await;
    let user = app.register(&unique_email("shopper")).await;

    let (status, body) = app
        .call(Method::GET, "/cart", None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Success");
    assert_eq!(body["message"], "Cart created successfully");
    assert_eq!(body["data"]["userId"], user.id.to_string());
    assert_eq!(body["data"]["cartItems"], json!([]));

    let (status, body) = app
        .call(Method::GET, "/cart", None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart retrieved successfully");
    assert_eq!(cart_rows(&app, user.id).await, 1);
}

#[tokio::test]
async fn repeated_add_accumulates_into_one_line() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let product = app.create_product(&admin, "pour-over-kettle", "49.00").await;
    let user = app.register(&unique_email("shopper")).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/cart/items",
            Some(json!({ "productId": product["id"], "quantity": 2 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Item added to cart successfully");
    assert_eq!(body["data"]["quantity"], 2);
    assert_eq!(body["data"]["product"]["id"], product["id"]);
    assert!(body["data"]["variant"].is_null());
    let first_id = body["data"]["id"].clone();

    let (status, body) = app
        .call(
            Method::POST,
            "/cart/items",
            Some(json!({ "productId": product["id"], "quantity": 3 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 5);
    assert_eq!(body["data"]["id"], first_id);

    let items = item_rows(&app).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);
    assert_eq!(cart_rows(&app, user.id).await, 1);

    let (_, cart) = app
        .call(Method::GET, "/cart", None, Some(&user.token))
        .await;
    assert_eq!(cart["data"]["cartItems"].as_array().unwrap().len(), 1);
    assert_eq!(cart["data"]["cartItems"][0]["productId"], product["id"]);
}

#[tokio::test]
async fn line_quantity_is_capped_and_cart_stays_readable() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let product = app.create_product(&admin, "bulk-filters", "3.00").await;
    let user = app.register(&unique_email("shopper")).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/cart/items",
            Some(json!({ "productId": product["id"], "quantity": i32::MAX })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid input data");
    assert!(body["error"]["quantity"].is_array());
    assert!(item_rows(&app).await.is_empty());

    for quantity in [MAX_LINE_QUANTITY - 1, 1] {
        let (status, _) = app
            .call(
                Method::POST,
                "/cart/items",
                Some(json!({ "productId": product["id"], "quantity": quantity })),
                Some(&user.token),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app
        .call(
            Method::POST,
            "/cart/items",
            Some(json!({ "productId": product["id"], "quantity": 1 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "Error");
    assert_eq!(body["error"]["quantity"], "max");

    let items = item_rows(&app).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, MAX_LINE_QUANTITY);

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/cart/items/{}", items[0].id),
            Some(json!({ "quantity": MAX_LINE_QUANTITY + 1 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = app
        .call(Method::GET, "/cart", None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cartItems"][0]["quantity"], MAX_LINE_QUANTITY);
}

#[tokio::test]
async fn both_cart_stores_agree_at_the_quantity_limit() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let created = app.create_product(&admin, "parity-mug", "11.00").await;
    let product_id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();
    let user = app.register(&unique_email("shopper")).await;

    let memory = Arc::new(InMemoryCartStore::new());
    memory
        .insert_product(
            product::Entity::find_by_id(product_id)
                .one(&*app.state.db)
                .await
                .unwrap()
                .unwrap(),
        )
        .await;
    let stores: [Arc<dyn CartStore>; 2] = [
        Arc::new(SeaOrmCartStore::new(app.state.db.clone())),
        memory,
    ];

    for store in stores {
        let service = CartService::new(store);
        let add = |quantity| AddToCartInput {
            product_id,
            variant_id: None,
            quantity,
        };

        let full = service
            .add_item(user.id, add(MAX_LINE_QUANTITY))
            .await
            .unwrap();
        assert_eq!(full.item.quantity, MAX_LINE_QUANTITY);

        let err = service.add_item(user.id, add(1)).await.unwrap_err();
        assert!(
            matches!(err, ServiceError::ValidationError { .. }),
            "unexpected {err:?}"
        );

        let cart = service.get_or_create_cart(user.id).await.unwrap().into_cart();
        assert_eq!(cart.cart_items.len(), 1);
        assert_eq!(cart.cart_items[0].item.quantity, MAX_LINE_QUANTITY);
    }
}

#[tokio::test]
async fn variant_of_another_product_is_400() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let apron = app.create_product(&admin, "work-apron", "30.00").await;
    let gloves = app.create_product(&admin, "work-gloves", "12.00").await;
    let apron_large = app
        .create_variant(&admin, apron["id"].as_str().unwrap(), "APRON-L", None)
        .await;
    let user = app.register(&unique_email("shopper")).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/cart/items",
            Some(json!({
                "productId": gloves["id"],
                "variantId": apron_large["id"],
                "quantity": 1,
            })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product variant not found");
    assert!(item_rows(&app).await.is_empty());
}

#[tokio::test]
async fn variant_and_bare_product_are_separate_lines() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let product = app.create_product(&admin, "linen-apron", "30.00").await;
    let variant = app
        .create_variant(&admin, product["id"].as_str().unwrap(), "APRON-XL", Some("34.00"))
        .await;
    let user = app.register(&unique_email("shopper")).await;

    for payload in [
        json!({ "productId": product["id"], "quantity": 1 }),
        json!({ "productId": product["id"], "variantId": variant["id"], "quantity": 1 }),
        json!({ "productId": product["id"], "variantId": variant["id"], "quantity": 4 }),
    ] {
        let (status, _) = app
            .call(Method::POST, "/cart/items", Some(payload), Some(&user.token))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let mut quantities: Vec<i32> = item_rows(&app).await.iter().map(|i| i.quantity).collect();
    quantities.sort();
    assert_eq!(quantities, vec![1, 5]);
}

#[tokio::test]
async fn add_rejects_bad_input_before_touching_storage() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let product = app.create_product(&admin, "milk-frother", "22.00").await;
    let user = app.register(&unique_email("shopper")).await;

    for payload in [
        json!({ "productId": product["id"], "quantity": 0 }),
        json!({ "productId": product["id"], "quantity": 1.5 }),
        json!({ "productId": product["id"], "quantity": "2" }),
        json!({ "productId": "nope", "quantity": 1 }),
        json!({ "productId": product["id"], "variantId": "nope", "quantity": 1 }),
    ] {
        let (status, body) = app
            .call(Method::POST, "/cart/items", Some(payload.clone()), Some(&user.token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(body["status"], "Error");
        assert_eq!(body["message"], "Invalid input data");
        assert!(body["error"].is_object(), "payload {payload}");
    }

    assert_eq!(cart_rows(&app, user.id).await, 0);
    assert!(item_rows(&app).await.is_empty());
}

#[tokio::test]
async fn unknown_product_or_variant_is_400() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let product = app.create_product(&admin, "tamper", "18.00").await;
    let user = app.register(&unique_email("shopper")).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/cart/items",
            Some(json!({ "productId": Uuid::new_v4(), "quantity": 1 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product not found");

    let (status, body) = app
        .call(
            Method::POST,
            "/cart/items",
            Some(json!({ "productId": product["id"], "variantId": Uuid::new_v4(), "quantity": 1 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product variant not found");

    assert!(item_rows(&app).await.is_empty());
    assert_eq!(cart_rows(&app, user.id).await, 1);
}

#[tokio::test]
async fn update_overwrites_and_is_scoped_to_owner() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let product = app.create_product(&admin, "scale", "25.00").await;
    let owner = app.register(&unique_email("owner")).await;
    let other = app.register(&unique_email("other")).await;

    let (_, added) = app
        .call(
            Method::POST,
            "/cart/items",
            Some(json!({ "productId": product["id"], "quantity": 3 })),
            Some(&owner.token),
        )
        .await;
    let item_uri = format!("/cart/items/{}", added["data"]["id"].as_str().unwrap());

    let (status, body) = app
        .call(Method::PUT, &item_uri, Some(json!({ "quantity": 7 })), Some(&owner.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart item updated successfully");
    assert_eq!(body["data"]["quantity"], 7);

    // no cart yet
    let (status, body) = app
        .call(Method::PUT, &item_uri, Some(json!({ "quantity": 1 })), Some(&other.token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cart not found");

    app.call(Method::GET, "/cart", None, Some(&other.token)).await;
    let (status, body) = app
        .call(Method::PUT, &item_uri, Some(json!({ "quantity": 1 })), Some(&other.token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cart item not found");

    let (status, _) = app
        .call(Method::DELETE, &item_uri, None, Some(&other.token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let items = item_rows(&app).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 7);
}

#[tokio::test]
async fn update_validates_id_and_quantity() {
    let app = TestApp::new().await;
    let user = app.register(&unique_email("shopper")).await;

    let (status, body) = app
        .call(
            Method::PUT,
            "/cart/items/not-a-uuid",
            Some(json!({ "quantity": 0 })),
            Some(&user.token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid input data");
}

#[tokio::test]
async fn remove_item_lifecycle() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let product = app.create_product(&admin, "filter-papers", "6.00").await;
    let user = app.register(&unique_email("shopper")).await;

    let (status, body) = app
        .call(Method::DELETE, "/cart/items/12", None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid item ID");

    let missing = format!("/cart/items/{}", Uuid::new_v4());
    let (status, body) = app
        .call(Method::DELETE, &missing, None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cart item not found");
    assert_eq!(cart_rows(&app, user.id).await, 0);

    let (_, added) = app
        .call(
            Method::POST,
            "/cart/items",
            Some(json!({ "productId": product["id"], "quantity": 1 })),
            Some(&user.token),
        )
        .await;
    let item_uri = format!("/cart/items/{}", added["data"]["id"].as_str().unwrap());

    let (status, body) = app
        .call(Method::DELETE, &item_uri, None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart item removed successfully");
    assert!(body.get("data").is_none());
    assert!(item_rows(&app).await.is_empty());
}

#[tokio::test]
async fn clear_cart_is_idempotent_and_keeps_cart_row() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let product = app.create_product(&admin, "dripper", "28.00").await;
    let user = app.register(&unique_email("shopper")).await;

    let (status, body) = app
        .call(Method::DELETE, "/cart", None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart is already empty");
    assert_eq!(body["data"], json!({ "cart": null }));
    assert_eq!(cart_rows(&app, user.id).await, 0);

    app.call(
        Method::POST,
        "/cart/items",
        Some(json!({ "productId": product["id"], "quantity": 2 })),
        Some(&user.token),
    )
    .await;

    let (status, body) = app
        .call(Method::DELETE, "/cart", None, Some(&user.token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart cleared successfully");
    assert_eq!(body["data"], json!({ "cart": null }));
    assert!(item_rows(&app).await.is_empty());
    assert_eq!(cart_rows(&app, user.id).await, 1);

    let (_, body) = app
        .call(Method::DELETE, "/cart", None, Some(&user.token))
        .await;
    assert_eq!(body["message"], "Cart cleared successfully");
}

#[tokio::test]
async fn concurrent_adds_keep_one_cart_and_one_line() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let product = app.create_product(&admin, "grinder", "120.00").await;
    let user = app.register(&unique_email("shopper")).await;

    let payload = json!({ "productId": product["id"], "quantity": 1 });
    let (a, b, c) = tokio::join!(
        app.call(Method::POST, "/cart/items", Some(payload.clone()), Some(&user.token)),
        app.call(Method::POST, "/cart/items", Some(payload.clone()), Some(&user.token)),
        app.call(Method::POST, "/cart/items", Some(payload.clone()), Some(&user.token)),
    );
    for (status, body) in [a, b, c] {
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    assert_eq!(cart_rows(&app, user.id).await, 1);
    let items = item_rows(&app).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
}
