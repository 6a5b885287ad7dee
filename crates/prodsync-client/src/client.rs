//! HTTP client for the products REST API.
//!
//! Wraps `reqwest` with typed envelope parsing. Requests are sent one at a
//! time and never retried; a failed request is reported to the caller as-is.

use std::time::Duration;

use prodsync_core::{AppConfig, Product, ProductId};
use reqwest::{Client, StatusCode, Url};

use crate::error::ClientError;
use crate::types::{ApiErrorBody, ApiResponse, UpdateOutcome};

/// Longest raw (non-JSON) error body echoed back in a rejection message.
const MAX_RAW_MESSAGE_CHARS: usize = 200;

/// Client for the products API.
///
/// Use [`ProductsClient::from_config`] in the binary or
/// [`ProductsClient::new`] to point at a mock server in tests.
pub struct ProductsClient {
    client: Client,
    base_url: Url,
}

impl ProductsClient {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:3131/api`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so endpoint paths append to the API root
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "expected an http or https URL".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Creates a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// See [`ProductsClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Fetches the whole product collection from `GET /products`.
    ///
    /// Order is preserved as returned by the server. The API answers an empty
    /// collection with `404 {"success": false, ...}`; that is returned as an
    /// empty `Vec`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not JSON or has no
    ///   `results` array of objects.
    pub async fn fetch_products(&self) -> Result<Vec<Product>, ClientError> {
        let url = self.endpoint(&["products"]);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%url, status = status.as_u16(), "fetched products collection");

        if status == StatusCode::NOT_FOUND {
            let err = ApiErrorBody::parse(&body);
            if err.success == Some(false) {
                tracing::info!(
                    server_message = err.message.as_deref().unwrap_or(""),
                    "products API reported an empty collection"
                );
                return Ok(Vec::new());
            }
        }

        if !status.is_success() {
            return Err(unexpected_status(status, &url, &body));
        }

        let envelope: ApiResponse<Vec<Product>> =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: format!("products collection from {url}"),
                source: e,
            })?;

        Ok(envelope.results)
    }

    /// Fetches one product from `GET /products/{id}`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] on 404.
    /// - [`ClientError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a `results` envelope.
    pub async fn fetch_product(&self, id: &ProductId) -> Result<Product, ClientError> {
        let url = self.endpoint(&["products", id.as_str()]);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(unexpected_status(status, &url, &body));
        }

        let envelope: ApiResponse<Product> =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: format!("product {id}"),
                source: e,
            })?;

        Ok(envelope.results)
    }

    /// Sends the full record to `PUT /products/{id}`.
    ///
    /// Any response the server sends back is an outcome, not an error:
    /// non-2xx statuses come back as [`UpdateOutcome::Rejected`].
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if a 2xx body is not a `results`
    ///   envelope.
    pub async fn update_product(
        &self,
        id: &ProductId,
        product: &Product,
    ) -> Result<UpdateOutcome, ClientError> {
        let url = self.endpoint(&["products", id.as_str()]);
        let response = self.client.put(url.clone()).json(product).send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%url, status = status.as_u16(), "sent product update");

        if !status.is_success() {
            return Ok(UpdateOutcome::Rejected {
                status: status.as_u16(),
                message: rejection_message(&body),
            });
        }

        let envelope: ApiResponse<Product> =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: format!("update of product {id}"),
                source: e,
            })?;

        if let Some(server_message) = envelope.message.as_deref() {
            tracing::debug!(product_id = %id, server_message, "server acknowledged update");
        }

        Ok(UpdateOutcome::Updated(envelope.results))
    }

    /// Appends percent-encoded path segments to the API root.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Cannot fail: `new` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn unexpected_status(status: StatusCode, url: &Url, body: &str) -> ClientError {
    ClientError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_string(),
        message: rejection_message(body),
    }
}

/// The envelope's `message`, else the raw body (trimmed and truncated), else `None`.
fn rejection_message(body: &str) -> Option<String> {
    if let Some(message) = ApiErrorBody::parse(body).message {
        return Some(message);
    }
    let raw = body.trim();
    if raw.is_empty() {
        return None;
    }
    Some(raw.chars().take(MAX_RAW_MESSAGE_CHARS).collect())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
