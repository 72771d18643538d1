//! HTTP collaborator: "issue a request with headers, get back bytes and status".
//!
//! Everything above this layer (retry, resolver, mux engine) talks to the
//! [`HttpClient`] trait so it can be driven by a scripted client in tests.
//! [`CurlClient`] is the libcurl-backed production implementation.

mod curl_client;
mod headers;
#[cfg(test)]
pub(crate) mod testing;

pub use curl_client::CurlClient;
pub use headers::{HeaderProfile, HeaderProfiles};

use std::collections::HashMap;
use std::time::Duration;

/// Request headers, name -> value.
pub type Headers = HashMap<String, String>;

/// HTTP method used by [`HttpClient::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Raw response: status code plus the full body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

/// Transport-level failure (no usable HTTP status).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    #[error("{0}")]
    Message(String),
}

/// Issue one request and return the body and status, or a transport error.
///
/// Implementations must not retry; retry policy lives in [`crate::retry`].
/// Calls block the current thread for up to `timeout`.
pub trait HttpClient: Send + Sync {
    fn request(
        &self,
        method: Method,
        url: &str,
        headers: &Headers,
        body: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;

    /// Convenience GET without a body.
    fn get(
        &self,
        url: &str,
        headers: &Headers,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.request(Method::Get, url, headers, None, timeout)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for std::sync::Arc<T> {
    fn request(
        &self,
        method: Method,
        url: &str,
        headers: &Headers,
        body: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        (**self).request(method, url, headers, body, timeout)
    }
}
