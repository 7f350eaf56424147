//! HTTP types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data, so the session layer can be
//! exercised without a network: `SessionClient` builds an `HttpRequest`,
//! an injected [`Transport`] executes it, and the response comes back as
//! data regardless of status code. All fields use owned types so values
//! can be recorded and replayed freely in tests.

use async_trait::async_trait;

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `SessionClient` and handed to a [`Transport`] for execution.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes an [`HttpRequest`] against the real network, or stands in for
/// it in tests.
///
/// Implementations must return non-2xx responses as `Ok`; only failures
/// that prevented a response entirely (DNS, refused connection, timeout)
/// are `Err`. Status interpretation belongs to the session layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
