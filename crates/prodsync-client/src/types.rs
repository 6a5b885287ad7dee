//! Products API response types.
//!
//! Every response from the products API is wrapped in a
//! `{"results": ..., "success": ..., "message": ...}` envelope; error bodies
//! carry only `success: false` and a `message`.

use prodsync_core::Product;
use serde::Deserialize;

/// Success envelope. `results` is a list for the collection endpoint and a
/// single record for the per-product endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub results: T,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error envelope: `{"success": false, "message": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Best-effort parse; non-JSON bodies yield an empty error body.
    pub(crate) fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

/// Result of a `PUT /products/{id}` that reached the server.
///
/// A rejection is not an error: the caller reports it and moves on.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// 2xx: the server's updated representation.
    Updated(Product),
    /// Non-2xx, with the server's `message` when it sent one.
    Rejected {
        status: u16,
        message: Option<String>,
    },
}
