//! Transport capability used to reach the grid endpoint.

mod form;
mod http;

pub use form::encode_form;
pub use http::*;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::TransportError;

/// Header name/value pairs attached to a request.
pub type Headers = Vec<(String, String)>;

/// Form fields of a page request, in bracket-key notation.
pub type FormFields = Vec<(String, String)>;

/// Sends requests to the grid endpoint and decodes JSON replies.
///
/// The session never retries on its own; retry and timeout policy belong to
/// the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Read-only query; `url` already carries the query string.
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError>;

    /// State-changing form post.
    async fn post_form(
        &self,
        url: &Url,
        headers: &Headers,
        form: &FormFields,
    ) -> Result<Value, TransportError>;
}

/// Returns `endpoint` with `params` appended to its query string.
pub fn with_query(endpoint: &Url, params: &[(&str, &str)]) -> Url {
    let mut url = endpoint.clone();
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    url
}
