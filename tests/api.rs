//! End-to-end tests driving the router against a real Postgres database.
//!
//! These run against `DATABASE_URL` and are ignored by default; run with
//! `cargo test -- --ignored` once a database is available.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use shopcore::events::EventPublisher;
use shopcore::AppState;

async fn setup() -> (Router, PgPool) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for API tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to postgres");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed");
    let state = AppState::new(pool.clone(), EventPublisher::disabled(), Duration::hours(24));
    (shopcore::app(state), pool)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Signs up a fresh user and returns (user_id, bearer token).
async fn signup_and_login(app: &Router, pool: &PgPool, role: &str) -> (Uuid, String) {
    let email = format!("u{}@example.com", Uuid::new_v4().simple());
    let (status, _) = send(
        app,
        Method::POST,
        "/api/users/signup",
        None,
        Some(serde_json::json!({
            "name": "John",
            "email": email,
            "password": "123456",
            "address": "12 Long Street, Springfield",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/users/login",
        None,
        Some(serde_json::json!({"email": email, "password": "123456"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap().to_string();

    let row: (Uuid,) = sqlx::query_as("SELECT user_id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(pool)
        .await
        .unwrap();
    (row.0, token)
}

async fn seed_product(pool: &PgPool, price: Decimal, stock: i32) -> Uuid {
    let product_id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO products (product_id, name, description, price, stock) \
         VALUES ($1, $2, 'test product', $3, $4)",
    )
    .bind(product_id)
    .bind(format!("widget-{product_id}"))
    .bind(price)
    .bind(stock)
    .execute(pool)
    .await
    .unwrap();
    product_id
}

async fn seed_coupon(pool: &PgPool, discount: Decimal) -> String {
    let code = format!("save{}", Uuid::new_v4().simple());
    sqlx::query("INSERT INTO coupons (coupon_id, code, discount) VALUES ($1, $2, $3)")
        .bind(Uuid::now_v7())
        .bind(&code)
        .bind(discount)
        .execute(pool)
        .await
        .unwrap();
    code
}

async fn stock_of(pool: &PgPool, product_id: Uuid) -> i32 {
    let row: (i32,) = sqlx::query_as("SELECT stock FROM products WHERE product_id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_health() {
    let (app, _pool) = setup().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "shopcore");
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_signup_rejects_duplicate_email() {
    let (app, _pool) = setup().await;
    let email = format!("dup{}@example.com", Uuid::new_v4().simple());
    let body = serde_json::json!({
        "name": "John",
        "email": email,
        "password": "123456",
        "address": "12 Long Street, Springfield",
    });
    let (status, _) = send(&app, Method::POST, "/api/users/signup", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, response) =
        send(&app, Method::POST, "/api/users/signup", None, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["success"], false);
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_login_failures() {
    let (app, _pool) = setup().await;
    let email = format!("u{}@example.com", Uuid::new_v4().simple());
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/signup",
        None,
        Some(serde_json::json!({
            "name": "John",
            "email": email,
            "password": "123456",
            "address": "12 Long Street, Springfield",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Unknown email.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/login",
        None,
        Some(serde_json::json!({"email": "nobody@example.com", "password": "123456"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Wrong password.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/login",
        None,
        Some(serde_json::json!({"email": email, "password": "654321"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_cart_add_merges_lines() {
    let (app, pool) = setup().await;
    let (user_id, token) = signup_and_login(&app, &pool, "USER").await;
    let product_id = seed_product(&pool, Decimal::new(10, 0), 10).await;

    for quantity in [2, 3] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/cart/add",
            Some(&token),
            Some(serde_json::json!({"productId": product_id, "quantity": quantity})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/cart/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let products = body["result"]["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["quantity"], 5);

    // Pushing the merged quantity past the stock of 10 must fail.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cart/add",
        Some(&token),
        Some(serde_json::json!({"productId": product_id, "quantity": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_roles_round_trip_through_text_columns() {
    let (app, pool) = setup().await;
    let (user_id, _) = signup_and_login(&app, &pool, "USER").await;
    let (admin_id, admin_token) = signup_and_login(&app, &pool, "ADMIN").await;

    // Roles live in a plain TEXT column; encoding must write the bare label.
    let row: (String,) = sqlx::query_as("SELECT role FROM users WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.0, "USER");
    let row: (String,) = sqlx::query_as("SELECT role FROM users WHERE user_id = $1")
        .bind(admin_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.0, "ADMIN");

    // Decoding runs on every authenticated request via the session join; an
    // admin reading another user's cart exercises both the decode and the
    // role check it feeds.
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/cart/{user_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Nothing in Cart");
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_concurrent_adds_of_new_product_merge() {
    let (app, pool) = setup().await;
    let (user_id, token) = signup_and_login(&app, &pool, "USER").await;
    let product_id = seed_product(&pool, Decimal::new(10, 0), 10).await;

    // Both adds race past the "no line yet" read; the upsert must merge
    // instead of one of them tripping the unique constraint.
    let (a, b) = tokio::join!(
        shopcore::service::cart::add_line(&pool, user_id, product_id, 2),
        shopcore::service::cart::add_line(&pool, user_id, product_id, 3),
    );
    a.unwrap();
    b.unwrap();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/cart/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["products"][0]["quantity"], 5);
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_cart_add_rejects_overflowing_merge() {
    let (app, pool) = setup().await;
    let (user_id, token) = signup_and_login(&app, &pool, "USER").await;
    let product_id = seed_product(&pool, Decimal::new(10, 0), i32::MAX).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cart/add",
        Some(&token),
        Some(serde_json::json!({"productId": product_id, "quantity": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // A merge that would overflow i32 fails cleanly as a stock error and
    // leaves the line untouched.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cart/add",
        Some(&token),
        Some(serde_json::json!({"productId": product_id, "quantity": i32::MAX - 2})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/cart/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["result"]["products"][0]["quantity"], 5);
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_order_conversion_snapshots_and_clears_cart() {
    let (app, pool) = setup().await;
    let (user_id, token) = signup_and_login(&app, &pool, "USER").await;
    let p1 = seed_product(&pool, Decimal::new(10, 0), 10).await;
    let p2 = seed_product(&pool, Decimal::new(20, 0), 10).await;

    for (product_id, quantity) in [(p1, 2), (p2, 1)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/cart/add",
            Some(&token),
            Some(serde_json::json!({"productId": product_id, "quantity": quantity})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::POST, "/api/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["result"]["finalPrice"], "40.00");
    assert_eq!(body["result"]["status"], "PENDING");

    assert_eq!(stock_of(&pool, p1).await, 8);
    assert_eq!(stock_of(&pool, p2).await, 9);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/cart/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Nothing in Cart");

    // A second conversion finds the cart empty.
    let (status, _) = send(&app, Method::POST, "/api/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_order_conversion_aborts_when_stock_lost() {
    let (app, pool) = setup().await;
    let (user_id, token) = signup_and_login(&app, &pool, "USER").await;
    let product_id = seed_product(&pool, Decimal::new(10, 0), 5).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cart/add",
        Some(&token),
        Some(serde_json::json!({"productId": product_id, "quantity": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Simulate a concurrent conversion winning the race after the cart was
    // filled: stock drops below the cart quantity.
    sqlx::query("UPDATE products SET stock = 3 WHERE product_id = $1")
        .bind(product_id)
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = send(&app, Method::POST, "/api/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was applied: stock untouched, cart intact, no order row.
    assert_eq!(stock_of(&pool, product_id).await, 3);
    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/cart/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["result"]["products"][0]["quantity"], 5);
    let orders: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orders.0, 0);
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_coupon_is_flat_floored_and_idempotent() {
    let (app, pool) = setup().await;
    let (_user_id, token) = signup_and_login(&app, &pool, "USER").await;
    let product_id = seed_product(&pool, Decimal::new(40, 0), 10).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/cart/add",
        Some(&token),
        Some(serde_json::json!({"productId": product_id, "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = send(&app, Method::POST, "/api/orders", Some(&token), None).await;
    let order_id = body["result"]["orderId"].as_str().unwrap().to_string();

    let code = seed_coupon(&pool, Decimal::new(5, 0)).await;
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/orders/apply-coupon",
            Some(&token),
            Some(serde_json::json!({"orderId": order_id, "discountNumber": code})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["result"]["totalPrice"], "35.00");
        assert_eq!(body["result"]["discountApplied"], "5.00");
    }

    // An oversized discount floors at zero instead of going negative.
    let big = seed_coupon(&pool, Decimal::new(500, 0)).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders/apply-coupon",
        Some(&token),
        Some(serde_json::json!({"orderId": order_id, "discountNumber": big})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["result"]["totalPrice"], "0");
}

#[tokio::test]
#[ignore = "requires postgres (DATABASE_URL)"]
async fn test_read_paths_enforce_ownership_and_roles() {
    let (app, pool) = setup().await;
    let (owner_id, owner_token) = signup_and_login(&app, &pool, "USER").await;
    let (_other_id, other_token) = signup_and_login(&app, &pool, "USER").await;
    let (_admin_id, admin_token) = signup_and_login(&app, &pool, "ADMIN").await;

    let product_id = seed_product(&pool, Decimal::new(10, 0), 10).await;
    let (_, _) = send(
        &app,
        Method::POST,
        "/api/cart/add",
        Some(&owner_token),
        Some(serde_json::json!({"productId": product_id, "quantity": 1})),
    )
    .await;
    let (_, body) = send(&app, Method::POST, "/api/orders", Some(&owner_token), None).await;
    let order_id = body["result"]["orderId"].as_str().unwrap().to_string();

    // Another user can see neither the order, the cart, nor the history.
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/orders/{order_id}"),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("result").is_none());
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/cart/{owner_id}"),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/users/{owner_id}/orders"),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins read anything; status updates are admin-only.
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/orders/{order_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/orders/{order_id}/status"),
        Some(&owner_token),
        Some(serde_json::json!({"status": "SHIPPED"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/orders/{order_id}/status"),
        Some(&admin_token),
        Some(serde_json::json!({"status": "SHIPPED"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Status Updated to SHIPPED");

    // No token at all is rejected up front.
    let (status, _) = send(&app, Method::POST, "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
