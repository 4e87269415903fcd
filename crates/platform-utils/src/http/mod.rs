//! HTTP client abstraction.
//!
//! The protocol code only ever issues GET requests and inspects the status,
//! a handful of headers and the body, so that is all this trait exposes.

use std::collections::HashMap;

use crate::HttpError;

mod native;

pub use native::BitreqHttpClient;

/// Default HTTP client type.
pub type DefaultHttpClient = BitreqHttpClient;

/// Default request timeout in seconds.
pub const REQUEST_TIMEOUT: u64 = 30;

/// Response from an HTTP request.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Response headers, keyed by lowercase header name.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// Returns true if the status code indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parse the response body as JSON.
    pub fn json<T>(&self) -> Result<T, HttpError>
    where
        for<'a> T: serde::de::Deserialize<'a>,
    {
        serde_json::from_str::<T>(&self.body).map_err(|e| HttpError::Json(e.to_string()))
    }

    /// Turns a non-2xx response into [`HttpError::Status`].
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(HttpError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// HTTP client trait for making requests.
///
/// Implementations must be usable from several concurrent tasks, discovery
/// issues its well-known requests in parallel over a shared client.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Makes a GET request.
    async fn get(
        &self,
        url: String,
        headers: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpError>;
}

/// Create a new HTTP client with the given user agent.
pub fn create_http_client(user_agent: Option<&str>) -> Box<dyn HttpClient> {
    Box::new(BitreqHttpClient::new(user_agent.map(String::from)))
}
