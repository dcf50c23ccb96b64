//! End-to-end tests of the API client against a mock backend.

use std::sync::Arc;

use chrono::Duration;
use serde_json::json;
use storefront_core::api::{ApiClient, ApiError, CurrencyClient};
use storefront_core::auth::{
    Authenticator, CredentialStore, ManualClock, MemoryBackend, RequestHook,
};
use storefront_core::models::RegisterRequest;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Hook that tags requests and then defers to the authenticator.
struct TaggingHook {
    inner: Authenticator,
}

impl RequestHook for TaggingHook {
    fn on_request(&self, mut request: reqwest::Request) -> reqwest::Request {
        request.headers_mut().insert(
            "x-client",
            reqwest::header::HeaderValue::from_static("storefront-test"),
        );
        self.inner.on_request(request)
    }
}

fn api_url(server: &MockServer) -> String {
    format!("{}/api/", server.uri())
}

async fn mount_login(server: &MockServer, token: &str, user_id: i64) {
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .and(body_json(json!({"email": "alice@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "userId": user_id,
            "username": "alice",
            "email": "alice@example.com",
            "role": "Customer"
        })))
        .mount(server)
        .await;
}

async fn authorization_headers(server: &MockServer) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
        .collect()
}

fn cart_json() -> serde_json::Value {
    json!({
        "cartId": 3,
        "userId": 42,
        "totalPrice": 25.0,
        "status": "Active",
        "items": [
            {"cartItemId": 1, "productId": 10, "productName": "Pen", "price": 2.5, "quantity": 10, "subTotal": 25.0}
        ]
    })
}

#[tokio::test]
async fn test_login_stores_session_and_authenticates_requests() {
    let server = MockServer::start().await;
    mount_login(&server, "abc123", 42).await;
    Mock::given(method("GET"))
        .and(path("/api/Cart"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_json()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(CredentialStore::in_memory());
    let client = ApiClient::new(&api_url(&server), store.clone()).expect("client");

    let login = client
        .login("alice@example.com", "secret")
        .await
        .expect("login");
    assert_eq!(login.user_id, 42);
    assert_eq!(store.token().as_deref(), Some("abc123"));
    assert_eq!(store.user_id(), Some(42));
    assert!(client.is_authenticated());

    let cart = client.fetch_cart().await.expect("cart");
    assert_eq!(cart.cart_id, 3);
    assert_eq!(cart.item_count(), 10);
}

#[tokio::test]
async fn test_requests_without_session_have_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Product/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"productId": 1, "productName": "Pen", "price": 2.5, "categoryId": 1},
            {"productId": 2, "productName": "Notebook", "price": 12.5, "categoryId": 2}
        ])))
        .mount(&server)
        .await;

    let client = ApiClient::new(&api_url(&server), Arc::new(CredentialStore::in_memory()))
        .expect("client");
    let products = client.fetch_products().await.expect("products");
    assert_eq!(products.len(), 2);

    assert_eq!(authorization_headers(&server).await, vec![None]);
}

#[tokio::test]
async fn test_logout_drops_authorization() {
    let server = MockServer::start().await;
    mount_login(&server, "abc123", 42).await;
    Mock::given(method("GET"))
        .and(path("/api/Category/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"categoryId": 1, "categoryName": "Stationery"}
        ])))
        .mount(&server)
        .await;

    let store = Arc::new(CredentialStore::in_memory());
    let client = ApiClient::new(&api_url(&server), store.clone()).expect("client");
    client
        .login("alice@example.com", "secret")
        .await
        .expect("login");

    client.fetch_categories().await.expect("categories");
    client.logout();
    assert!(!store.is_valid());
    let categories = client.fetch_categories().await.expect("categories");
    assert_eq!(categories[0].category_name, "Stationery");

    let headers = authorization_headers(&server).await;
    // login, authenticated fetch, unauthenticated fetch
    assert_eq!(
        headers,
        vec![None, Some("Bearer abc123".to_string()), None]
    );
}

#[tokio::test]
async fn test_expired_session_sends_unauthenticated() {
    let server = MockServer::start().await;
    mount_login(&server, "abc123", 42).await;
    Mock::given(method("GET"))
        .and(path("/api/Cart"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::default());
    let store = Arc::new(CredentialStore::open(
        MemoryBackend::new(),
        clock.clone(),
        Duration::hours(3),
    ));
    let client = ApiClient::new(&api_url(&server), store.clone()).expect("client");
    client
        .login("alice@example.com", "secret")
        .await
        .expect("login");

    clock.advance(Duration::hours(3) + Duration::minutes(1));
    let err = client.fetch_cart().await.expect_err("server rejects");
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)));

    assert_eq!(authorization_headers(&server).await, vec![None, None]);
    assert!(store.token().is_none());
    assert!(store.user_id().is_none());
}

#[tokio::test]
async fn test_login_without_token_is_rejected() {
    let server = MockServer::start().await;
    mount_login(&server, "", 42).await;

    let store = Arc::new(CredentialStore::in_memory());
    let client = ApiClient::new(&api_url(&server), store.clone()).expect("client");

    let err = client
        .login("alice@example.com", "secret")
        .await
        .expect_err("empty token");
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::InvalidResponse(_))));
    assert!(!store.is_valid());
}

#[tokio::test]
async fn test_login_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Wrong password"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(CredentialStore::in_memory());
    let client = ApiClient::new(&api_url(&server), store.clone()).expect("client");

    let err = client
        .login("alice@example.com", "wrong")
        .await
        .expect_err("bad login");
    assert!(err.to_string().contains("Wrong password"));
    assert!(store.token().is_none());
}

#[tokio::test]
async fn test_register_posts_all_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Auth/register"))
        .and(body_json(json!({
            "username": "alice",
            "password": "secret",
            "email": "alice@example.com",
            "phoneNumber": "0901234567",
            "address": "1 Main St"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": 42,
            "username": "alice",
            "email": "alice@example.com",
            "phoneNumber": "0901234567",
            "address": "1 Main St",
            "role": "Customer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(CredentialStore::in_memory());
    let client = ApiClient::new(&api_url(&server), store.clone()).expect("client");
    let request = RegisterRequest {
        username: "alice".to_string(),
        password: "secret".to_string(),
        email: "alice@example.com".to_string(),
        phone_number: "0901234567".to_string(),
        address: "1 Main St".to_string(),
    };

    let response = client.register(&request).await.expect("register");
    assert_eq!(response.user_id, 42);
    assert_eq!(response.role.as_deref(), Some("Customer"));
    // Registering does not log in
    assert!(!store.is_valid());
}

#[tokio::test]
async fn test_current_user_uses_session_user_id() {
    let server = MockServer::start().await;
    mount_login(&server, "abc123", 42).await;
    Mock::given(method("GET"))
        .and(path("/api/User/42"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": 42,
            "username": "alice",
            "email": "alice@example.com",
            "phoneNumber": null,
            "address": null,
            "role": "Customer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&api_url(&server), Arc::new(CredentialStore::in_memory()))
        .expect("client");
    client
        .login("alice@example.com", "secret")
        .await
        .expect("login");

    let user = client
        .fetch_current_user()
        .await
        .expect("user")
        .expect("signed in");
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_product_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Product/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "productId": 5,
            "productName": "Laptop",
            "briefDescription": "Thin",
            "fullDescription": "Thin and light",
            "technicalSpecifications": "16GB RAM",
            "price": 999.0,
            "imageUrl": null,
            "categoryId": 3,
            "cartItems": [],
            "category": {"categoryId": 3, "categoryName": "Computers"}
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&api_url(&server), Arc::new(CredentialStore::in_memory()))
        .expect("client");
    let product = client.fetch_product(5).await.expect("product");
    assert_eq!(product.product_name, "Laptop");
    assert_eq!(product.category_name(), "Computers");
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Product/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Product not found"))
        .mount(&server)
        .await;

    let client = ApiClient::new(&api_url(&server), Arc::new(CredentialStore::in_memory()))
        .expect("client");
    let err = client.fetch_product(999).await.expect_err("404");
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::NotFound(msg)) => assert_eq!(msg, "Product not found"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_cart_mutations_send_bodies_with_bearer() {
    let server = MockServer::start().await;
    mount_login(&server, "abc123", 42).await;
    Mock::given(method("POST"))
        .and(path("/api/Cart/add"))
        .and(header("authorization", "Bearer abc123"))
        .and(body_json(json!({"productId": 10, "quantity": 2})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    for endpoint in ["increase", "decrease", "remove"] {
        Mock::given(method("POST"))
            .and(path(format!("/api/Cart/{}", endpoint)))
            .and(header("authorization", "Bearer abc123"))
            .and(body_json(json!({"productId": 10})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = ApiClient::new(&api_url(&server), Arc::new(CredentialStore::in_memory()))
        .expect("client");
    client
        .login("alice@example.com", "secret")
        .await
        .expect("login");

    client.add_to_cart(10, 2).await.expect("add");
    client.increase_quantity(10).await.expect("increase");
    client.decrease_quantity(10).await.expect("decrease");
    client.remove_from_cart(10).await.expect("remove");
}

#[tokio::test]
async fn test_currency_live_rates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/live"))
        .and(query_param("access_key", "key-123"))
        .and(query_param("currencies", "VND"))
        .and(query_param("source", "USD"))
        .and(query_param("format", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "timestamp": 1700000000,
            "source": "USD",
            "quotes": {"USDVND": 24000.0}
        })))
        .mount(&server)
        .await;

    let client = CurrencyClient::new(&server.uri(), "key-123").expect("client");
    let quote = client.fetch_live("VND", "USD").await.expect("rates");
    assert_eq!(quote.rate("USD", "VND"), Some(24000.0));
    assert_eq!(authorization_headers(&server).await, vec![None]);
}

#[tokio::test]
async fn test_currency_failure_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"code": 101, "info": "You have not supplied a valid API Access Key."}
        })))
        .mount(&server)
        .await;

    let client = CurrencyClient::new(&server.uri(), "bad").expect("client");
    let err = client.fetch_live("VND", "USD").await.expect_err("failure");
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::InvalidResponse(msg)) => assert!(msg.contains("valid API Access Key")),
        other => panic!("unexpected error: {:?}", other),
    }
}

/// Base URL of a local port with nothing listening on it.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_transport_failures_are_network_errors() {
    let base = closed_port_url();

    let currency = CurrencyClient::new(&base, "key-123").expect("client");
    let err = currency
        .fetch_live("VND", "USD")
        .await
        .expect_err("unreachable");
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NetworkError(_))));

    let api = ApiClient::new(&base, Arc::new(CredentialStore::in_memory())).expect("client");
    let err = api.fetch_products().await.expect_err("unreachable");
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NetworkError(_))));
}

#[tokio::test]
async fn test_custom_hook_runs_before_send() {
    let server = MockServer::start().await;
    mount_login(&server, "abc123", 42).await;
    Mock::given(method("GET"))
        .and(path("/api/Cart"))
        .and(header("x-client", "storefront-test"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_json()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(CredentialStore::in_memory());
    let client = ApiClient::new(&api_url(&server), store.clone()).expect("client");
    client
        .login("alice@example.com", "secret")
        .await
        .expect("login");

    let tagged = client.with_hook(Arc::new(TaggingHook {
        inner: Authenticator::new(store),
    }));
    let cart = tagged.fetch_cart().await.expect("cart");
    assert_eq!(cart.user_id, 42);
}
