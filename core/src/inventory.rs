//! Product-list controller: cached state, filters and mutations.
//!
//! # Design
//! Every remote operation goes through [`SessionClient`] and every
//! successful mutation is followed by a full reload, so the cached list
//! only ever holds server-confirmed state. The controller is shared behind
//! `Arc` by the presentation layer; interior locks guard short sections
//! with no await points. A single-flight table rejects duplicate
//! concurrent mutations per product.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError, RwLock};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::session::SessionClient;
use crate::types::{FilterConfig, Product, ProductDraft};

/// Mutation kinds tracked by the single-flight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MutationKind {
    Update,
    Delete,
}

type FlightKey = (MutationKind, Uuid);

/// Client-side view of the product list and the active filter.
pub struct InventoryController {
    client: SessionClient,
    products: RwLock<Vec<Product>>,
    filter: RwLock<FilterConfig>,
    in_flight: Mutex<HashSet<FlightKey>>,
}

impl InventoryController {
    pub fn new(client: SessionClient) -> Self {
        Self {
            client,
            products: RwLock::new(Vec::new()),
            filter: RwLock::new(FilterConfig::default()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Snapshot of the cached product list, in server order.
    pub fn products(&self) -> Vec<Product> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the active filter.
    pub fn current_filter(&self) -> FilterConfig {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch the list matching the current filter and replace the cache
    /// wholesale. On any failure the cached list is left untouched.
    pub async fn load_products(&self) -> Result<(), ApiError> {
        let endpoint = format!("/products?{}", self.current_filter().to_query());
        let response = self
            .client
            .request::<()>(&endpoint, HttpMethod::Get, None)
            .await?;
        let list: Vec<Product> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        debug!(count = list.len(), "product list refreshed");
        *self
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner) = list;
        Ok(())
    }

    /// Validate, create server-side, then resync. Returns the product as
    /// the server stored it. Validation failures perform no network call.
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Product, ApiError> {
        draft.validate()?;
        let response = self
            .client
            .request("/products", HttpMethod::Post, Some(&draft))
            .await?;
        let created: Product = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;
        self.resync().await?;
        Ok(created)
    }

    /// Validate, replace the product server-side, then resync. A missing
    /// id surfaces as [`ApiError::NotFound`] from the response.
    pub async fn update_product(&self, id: Uuid, draft: ProductDraft) -> Result<(), ApiError> {
        draft.validate()?;
        let _guard = self.begin_mutation(MutationKind::Update, id)?;
        let endpoint = format!("/products/{id}");
        self.client
            .request(&endpoint, HttpMethod::Put, Some(&draft))
            .await?;
        self.resync().await
    }

    /// Remove a product server-side, then resync. Asking the user for
    /// confirmation is the presentation layer's job; this method deletes
    /// unconditionally.
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ApiError> {
        let _guard = self.begin_mutation(MutationKind::Delete, id)?;
        let endpoint = format!("/products/{id}");
        self.client
            .request::<()>(&endpoint, HttpMethod::Delete, None)
            .await?;
        self.resync().await
    }

    /// Replace the whole filter, then reload once. Partial updates are the
    /// caller's job: clone [`current_filter`](Self::current_filter), edit,
    /// re-apply.
    pub async fn apply_filters(&self, filter: FilterConfig) -> Result<(), ApiError> {
        *self.filter.write().unwrap_or_else(PoisonError::into_inner) = filter;
        self.load_products().await
    }

    /// Reload after a confirmed mutation. A failure here means the server
    /// accepted the change but the cached list is stale; the caller must
    /// hear about it.
    async fn resync(&self) -> Result<(), ApiError> {
        self.load_products().await.map_err(|err| {
            warn!(error = %err, "resync after mutation failed, cached list is stale");
            err
        })
    }

    fn begin_mutation(&self, kind: MutationKind, id: Uuid) -> Result<FlightGuard<'_>, ApiError> {
        let mut slots = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !slots.insert((kind, id)) {
            return Err(ApiError::InFlight);
        }
        Ok(FlightGuard {
            slots: &self.in_flight,
            key: (kind, id),
        })
    }
}

/// Releases a single-flight slot when the mutation finishes, whichever way
/// it ends.
struct FlightGuard<'a> {
    slots: &'a Mutex<HashSet<FlightKey>>,
    key: FlightKey,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
