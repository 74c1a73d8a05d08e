//! Storefront backend API clients.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; every response carries a `success` flag
//! - The backend cart is the source of truth, the local cache only mirrors it
//! - Product listings are cached in memory via `moka` (5 minute TTL)
//! - Cart calls are never cached and never retried
//!
//! # APIs
//!
//! ## Cart API (`/api/cart*`, `/api/order/create`)
//! - Requires a logged-in session (cookie)
//! - Login-protected endpoints redirect anonymous callers to the login page,
//!   so redirects and 401/403 are both reported as [`RemoteError::Unauthenticated`]
//!
//! ## Catalog API (`/api/products`)
//! - Public, paginated, filterable by category and search text
//!
//! # Example
//!
//! ```rust,ignore
//! use zentro_storefront::api::{ApiClient, CartApi};
//!
//! let client = ApiClient::new(&config)?;
//! client.add_item(ProductId::new(7), Quantity::ONE).await?;
//! let cart = client.fetch_cart().await?;
//! ```

mod cart;
mod catalog;
mod conversions;
pub mod types;

pub use cart::CartApi;
pub use catalog::{CatalogClient, ProductPage, ProductQuery, ProductSort};

use std::sync::Arc;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::StorefrontConfig;
use types::Envelope;

/// Name of the backend's session cookie.
const SESSION_COOKIE_NAME: &str = "session";

/// Longest slice of a response body copied into logs.
const LOGGED_BODY_CHARS: usize = 500;

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The endpoint requires a logged-in session.
    #[error("Not logged in")]
    Unauthenticated,

    /// The backend answered with a non-success status.
    #[error("Server returned HTTP {status}")]
    Status { status: u16, message: String },

    /// The backend answered `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The session cookie contains characters that cannot go in a header.
    #[error("Invalid session cookie")]
    InvalidCookie,
}

impl RemoteError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront backend's JSON API.
///
/// Cheaply cloneable; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cookie is not a valid header value or
    /// the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let mut value = HeaderValue::from_str(&format!(
                "{SESSION_COOKIE_NAME}={}",
                cookie.expose_secret()
            ))
            .map_err(|_| RemoteError::InvalidCookie)?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            // A redirect from a login-protected endpoint means "not logged in"
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Resolve an API path against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// GET a JSON document.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        self.execute(self.inner.client.get(url)).await
    }

    /// POST an optional JSON body and decode the JSON response.
    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, RemoteError> {
        let mut request = self.inner.client.post(self.endpoint(path)?);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await
    }

    /// POST and require `success: true` in the response.
    async fn post_command<B: Serialize + Sync>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), RemoteError> {
        let envelope: Envelope = self.post(path, body).await?;
        envelope.into_result()
    }

    /// Send a request and decode its JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = request.send().await.map_err(RemoteError::from_reqwest)?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
            || status.is_redirection()
        {
            debug!(status = %status, "Backend requires login");
            return Err(RemoteError::Unauthenticated);
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await.map_err(RemoteError::from_reqwest)?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
                "Backend returned non-success status"
            );
            let message = serde_json::from_str::<Envelope>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
                "Failed to parse backend response"
            );
            RemoteError::Parse(e)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        assert_eq!(RemoteError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            RemoteError::Status {
                status: 503,
                message: "Cart service is under development".to_string(),
            }
            .to_string(),
            "Server returned HTTP 503"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = StorefrontConfig::for_base_url("http://localhost:5000/zentro").unwrap();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("api/cart/add").unwrap().as_str(),
            "http://localhost:5000/zentro/api/cart/add"
        );
    }

    #[test]
    fn test_cookie_with_newline_is_rejected() {
        let config = StorefrontConfig::for_base_url("http://localhost:5000")
            .unwrap()
            .with_session_cookie("abc\ndef");
        assert!(matches!(
            ApiClient::new(&config),
            Err(RemoteError::InvalidCookie)
        ));
    }
}
