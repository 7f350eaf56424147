//! Error types for the fridge API client.
//!
//! # Design
//! Status classification happens once, inside `SessionClient::request`, so
//! every caller sees the same taxonomy: 401/403 become `Auth`, 404 becomes
//! `NotFound`, other 4xx become `Validation` and 5xx become `Server`.
//! Client-side structural checks reuse `Validation` and never reach the
//! network.

use thiserror::Error;

/// Network-level failure reported by a [`Transport`](crate::Transport).
///
/// Non-2xx HTTP statuses are not transport errors; they come back as data
/// and are classified into [`ApiError`] variants by the session layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No response arrived within the transport's deadline.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established (DNS, refused, TLS).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The connection broke while sending or receiving.
    #[error("network I/O failed: {0}")]
    Io(String),
}

/// Errors surfaced by [`SessionClient`](crate::SessionClient) and
/// [`InventoryController`](crate::InventoryController).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server rejected the credential (HTTP 401 or 403).
    #[error("not authorized (HTTP {status})")]
    Auth { status: u16 },

    /// The server returned 404 for the addressed resource.
    #[error("resource not found")]
    NotFound,

    /// A structural check failed client-side, or the server rejected the
    /// payload with a 4xx other than 401/403/404.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server returned 5xx, or a status outside the classified ranges.
    #[error("server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A mutation for the same product is already in flight.
    #[error("another operation for this product is still in flight")]
    InFlight,

    /// The request was cancelled before a response arrived.
    #[error("request cancelled")]
    Cancelled,
}
