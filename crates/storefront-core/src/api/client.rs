//! API client for communicating with the storefront REST API.
//!
//! This module provides the `ApiClient` struct for the auth, user, product,
//! category and cart endpoints. Every request is passed through a
//! `RequestHook` (normally the `Authenticator`) right before it is sent.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::auth::{Authenticator, CredentialStore, RequestHook};
use crate::config::Config;
use crate::models::{
    AddCartItemRequest, CartRequest, CartResponse, CategoryResponse, LoginRequest, LoginResponse,
    ProductDetailResponse, ProductResponse, RegisterRequest, RegisterResponse, UserResponse,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of a backend running on the local machine
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Parse a base URL, making sure relative endpoint paths join under it.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Url::parse(&normalized).with_context(|| format!("Invalid base URL: {}", base_url))
}

/// API client for the storefront backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    store: Arc<CredentialStore>,
    hook: Arc<dyn RequestHook>,
}

impl ApiClient {
    /// Create a client that authenticates requests from `store`.
    pub fn new(base_url: &str, store: Arc<CredentialStore>) -> Result<Self> {
        Self::with_timeout(base_url, store, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        store: Arc<CredentialStore>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            hook: Arc::new(Authenticator::new(store.clone())),
            store,
        })
    }

    pub fn from_config(config: &Config, store: Arc<CredentialStore>) -> Result<Self> {
        Self::with_timeout(
            &config.api_base_url,
            store,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Replace the pre-request hook, sharing the connection pool.
    pub fn with_hook(&self, hook: Arc<dyn RequestHook>) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            store: self.store.clone(),
            hook,
        }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path: {}", path))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Run the hook, send, and reject non-2xx responses.
    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let request = builder.build().context("Failed to build request")?;
        let request = self.hook.on_request(request);

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(
            %method,
            %url,
            authenticated = request.headers().contains_key(header::AUTHORIZATION),
            "Sending request"
        );

        let response = self.client.execute(request).await.map_err(ApiError::from)?;

        Self::check_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self.send(self.client.get(url.clone())).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path)?;
        let response = self.send(self.client.post(url.clone()).json(body)).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// POST where the backend answers with an empty body.
    async fn post_no_content<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path)?;
        self.send(self.client.post(url).json(body)).await?;
        Ok(())
    }

    // ===== Auth =====

    /// Create a new account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        if !request.has_required_fields() {
            return Err(
                ApiError::InvalidRequest("Please fill all required fields".to_string()).into(),
            );
        }
        let response: RegisterResponse = self.post("Auth/register", request).await?;
        info!(user_id = response.user_id, "Registered new account");
        Ok(response)
    }

    /// Log in and start a new session in the credential store.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest::new(email, password);
        if !request.has_required_fields() {
            return Err(
                ApiError::InvalidRequest("Please fill all required fields".to_string()).into(),
            );
        }

        let response: LoginResponse = self.post("Auth/login", &request).await?;
        if response.token.is_empty() {
            return Err(
                ApiError::InvalidResponse("Server didn't return a token".to_string()).into(),
            );
        }

        self.store.save_session(&response.token, response.user_id);
        info!(user_id = response.user_id, "Logged in");
        Ok(response)
    }

    /// End the current session. Nothing is sent to the server.
    pub fn logout(&self) {
        self.store.clear();
        info!("Logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_valid()
    }

    // ===== Users =====

    pub async fn fetch_user(&self, user_id: i64) -> Result<UserResponse> {
        self.get(&format!("User/{}", user_id)).await
    }

    /// Profile of the signed-in user, or `None` when there is no live session.
    pub async fn fetch_current_user(&self) -> Result<Option<UserResponse>> {
        match self.store.user_id() {
            Some(user_id) => self.fetch_user(user_id).await.map(Some),
            None => Ok(None),
        }
    }

    // ===== Catalog =====

    pub async fn fetch_product(&self, product_id: i64) -> Result<ProductDetailResponse> {
        self.get(&format!("Product/{}", product_id)).await
    }

    pub async fn fetch_products(&self) -> Result<Vec<ProductResponse>> {
        self.get("Product/all").await
    }

    pub async fn fetch_categories(&self) -> Result<Vec<CategoryResponse>> {
        self.get("Category/all").await
    }

    // ===== Cart =====

    pub async fn fetch_cart(&self) -> Result<CartResponse> {
        self.get("Cart").await
    }

    pub async fn add_to_cart(&self, product_id: i64, quantity: i32) -> Result<()> {
        if quantity < 1 {
            return Err(ApiError::InvalidRequest("Quantity must be >= 1".to_string()).into());
        }
        self.post_no_content("Cart/add", &AddCartItemRequest { product_id, quantity })
            .await
    }

    pub async fn increase_quantity(&self, product_id: i64) -> Result<()> {
        self.post_no_content("Cart/increase", &CartRequest { product_id })
            .await
    }

    pub async fn decrease_quantity(&self, product_id: i64) -> Result<()> {
        self.post_no_content("Cart/decrease", &CartRequest { product_id })
            .await
    }

    pub async fn remove_from_cart(&self, product_id: i64) -> Result<()> {
        self.post_no_content("Cart/remove", &CartRequest { product_id })
            .await
    }
}
