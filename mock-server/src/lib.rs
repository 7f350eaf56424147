use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub quantity: i64,
}

#[derive(Deserialize)]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub quantity: i64,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    #[serde(default)]
    pub search: String,
    pub sort_by: Option<String>,
}

// A Vec keeps insertion order, so listings are stable across calls.
pub type Db = Arc<RwLock<Vec<Product>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    let api = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .with_state(db);
    Router::new().nest("/api", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Any bearer token passes; issuing them is outside this fixture's scope.
fn bearer_present(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.starts_with("Bearer "))
}

fn sort_products(products: &mut [Product], sort_by: &str) {
    match sort_by {
        "name" => products.sort_by(|a, b| a.name.cmp(&b.name)),
        "category" => products.sort_by(|a, b| a.category.cmp(&b.category)),
        "quantity" => products.sort_by(|a, b| a.quantity.cmp(&b.quantity)),
        _ => products.sort_by(|a, b| a.expiry_date.cmp(&b.expiry_date)),
    }
}

async fn list_products(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<Vec<Product>>, StatusCode> {
    if !bearer_present(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let products = db.read().await;
    let needle = params.search.to_lowercase();
    let mut listed: Vec<Product> = products
        .iter()
        .filter(|p| {
            params
                .category
                .as_ref()
                .map_or(true, |c| p.category.as_deref() == Some(c.as_str()))
        })
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    sort_products(&mut listed, params.sort_by.as_deref().unwrap_or("expiry_date"));
    Ok(Json(listed))
}

async fn create_product(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), StatusCode> {
    if !bearer_present(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let product = Product {
        id: Uuid::new_v4(),
        name: input.name,
        category: input.category,
        expiry_date: input.expiry_date,
        quantity: input.quantity,
    };
    db.write().await.push(product.clone());
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(input): Json<ProductDraft>,
) -> Result<Json<Product>, StatusCode> {
    if !bearer_present(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let mut products = db.write().await;
    let product = products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    product.name = input.name;
    product.category = input.category;
    product.expiry_date = input.expiry_date;
    product.quantity = input.quantity;
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    if !bearer_present(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let mut products = db.write().await;
    let position = products
        .iter()
        .position(|p| p.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    products.remove(position);
    Ok(StatusCode::NO_CONTENT)
}
