//! Product and category endpoints.
//!
//! Reads are open to every caller; writes need catalog rights. `DELETE`
//! deactivates.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{CategoryId, ProductId};
use domain::{Category, CategoryChanges, NewCategory, NewProduct, Product, ProductChanges};
use queries::{CategoryListQuery, InventoryStats, Page, ProductListQuery, ProductView};
use store::Store;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentActor};
use crate::state::AppState;

// -- Products --

pub async fn list_products<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> Result<Json<Page<ProductView>>, ApiError> {
    Ok(Json(state.queries.list_products(&query).await?))
}

pub async fn get_product<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(state.queries.product(id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn create_product<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiJson(req): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.catalog.create_product(actor, req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[tracing::instrument(skip(state))]
pub async fn update_product<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(req): ApiJson<ProductChanges>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.update_product(actor, id, req).await?))
}

#[tracing::instrument(skip(state))]
pub async fn deactivate_product<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.deactivate_product(actor, id).await?))
}

/// GET /products/stats
pub async fn inventory_stats<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<InventoryStats>, ApiError> {
    Ok(Json(state.queries.inventory_stats(actor).await?))
}

// -- Categories --

pub async fn list_categories<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiQuery(query): ApiQuery<CategoryListQuery>,
) -> Result<Json<Page<Category>>, ApiError> {
    Ok(Json(state.queries.list_categories(&query).await?))
}

pub async fn get_category<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.queries.category(id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn create_category<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiJson(req): ApiJson<NewCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.catalog.create_category(actor, req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[tracing::instrument(skip(state))]
pub async fn update_category<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(req): ApiJson<CategoryChanges>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.catalog.update_category(actor, id, req).await?))
}

/// DELETE /categories/{id}: 409 while active products still use it.
#[tracing::instrument(skip(state))]
pub async fn deactivate_category<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.catalog.deactivate_category(actor, id).await?))
}
