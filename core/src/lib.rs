//! Client core for a household fridge-inventory service.
//!
//! # Overview
//! Two components: [`SessionClient`], the single choke point for outbound
//! API calls (bearer credential, JSON bodies, centralized status
//! classification), and [`InventoryController`], which keeps a cached
//! product list plus the active filter and mediates every mutation with a
//! guaranteed refresh-after-write. The backend is external, reached under
//! a fixed `/api` base path; a presentation layer renders the controller's
//! snapshots.
//!
//! # Design
//! - Requests and responses are plain data; an injected [`Transport`]
//!   executes them, so everything above the network is deterministic and
//!   testable.
//! - Non-2xx statuses are classified once, in the session layer; callers
//!   only ever see [`ApiError`] variants.
//! - The credential lives in an injected [`SessionStore`], set by an
//!   external login flow and cleared on logout; [`SessionClient::logout`]
//!   returns the redirect target instead of navigating.
//! - Mutations are single-flight per product and cancellable through the
//!   client's [`CancellationToken`](tokio_util::sync::CancellationToken).

pub mod error;
pub mod http;
pub mod inventory;
pub mod session;
pub mod transport;
pub mod types;

pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use inventory::InventoryController;
pub use session::{LogoutRedirect, SessionClient, SessionStore, DEFAULT_LOGIN_REDIRECT};
pub use transport::HttpTransport;
pub use types::{FilterConfig, Product, ProductDraft, SortField};
