//! Transport adapter between the operation layer and the backend
//!
//! [`Transport`] is the seam: operations only see JSON values and byte blobs,
//! and every failure arrives as one of the three [`TransportError`] kinds.
//! [`HttpTransport`] is the reqwest-backed implementation.

mod error;
mod http;

pub use error::TransportError;
pub use http::{BuildError, HttpTransport};
pub use reqwest::Method;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

pub type Result<T> = std::result::Result<T, TransportError>;

/// Request dispatch against a fixed base endpoint
///
/// Paths are relative to the base endpoint (`/apply-job`). Implementations
/// must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a JSON request and parse the response body as JSON
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value>;

    /// Fetch a binary body with GET
    async fn fetch_binary(&self, path: &str) -> Result<Bytes>;
}
