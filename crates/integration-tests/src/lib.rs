//! Integration tests for SpaceGoods.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p spacegoods-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - Session-backed cart over HTTP
//! - `storefront_planets` - Planet API over HTTP
//! - `cart_persistence` - File-backed carts across instances
//!
//! Tests drive the storefront router in-process; no server or network is
//! needed. [`TestContext`] carries the session cookie between requests the
//! way a browser would.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::Value;
use spacegoods_storefront::{app, config::StorefrontConfig, state::AppState};
use tower::ServiceExt;

/// Largest response body the helpers will read.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Response captured by [`TestContext`].
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// In-process storefront with a cookie jar of one.
pub struct TestContext {
    router: Router,
    cookie: Option<String>,
}

impl TestContext {
    /// Storefront with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StorefrontConfig::default())
    }

    /// Storefront with the given configuration.
    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        Self::with_state(AppState::new(config))
    }

    /// Storefront over prepared application state.
    #[must_use]
    pub fn with_state(state: AppState) -> Self {
        Self {
            router: app(state),
            cookie: None,
        }
    }

    /// Same storefront, fresh visitor (no session cookie).
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri), Body::empty()).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&mut self, uri: &str, body: &Value) -> TestResponse {
        self.send(
            Request::post(uri).header(header::CONTENT_TYPE, "application/json"),
            Body::from(body.to_string()),
        )
        .await
    }

    /// Send a POST request with a raw JSON-typed body.
    pub async fn post_raw(&mut self, uri: &str, body: &str) -> TestResponse {
        self.send(
            Request::post(uri).header(header::CONTENT_TYPE, "application/json"),
            Body::from(body.to_owned()),
        )
        .await
    }

    /// Send a POST request with a JSON body and bearer token.
    pub async fn post_with_token(&mut self, uri: &str, body: &Value, token: &str) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {token}")),
            Body::from(body.to_string()),
        )
        .await
    }

    async fn send(&mut self, mut builder: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(body).expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_owned());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
