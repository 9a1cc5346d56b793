//! Order endpoints.
//!
//! `DELETE /orders/{id}` cancels the order; orders are never physically removed.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::OrderId;
use queries::{OrderDetail, OrderListQuery, OrderStats, OrderSummary, Page};
use services::{ChangeState, CreateOrder};
use store::Store;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentActor};
use crate::state::AppState;

/// POST /orders: reserve stock and place the order.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiJson(req): ApiJson<CreateOrder>,
) -> Result<(StatusCode, Json<OrderDetail>), ApiError> {
    let order = state.orders.create_order(actor, req).await?;
    let detail = state.queries.order_detail(&order).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /orders?estado=&search=&page=
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(query): ApiQuery<OrderListQuery>,
) -> Result<Json<Page<OrderSummary>>, ApiError> {
    Ok(Json(state.queries.list_orders(actor, &query).await?))
}

/// GET /orders/{id}: the order with product names and allowed next states.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = state.orders.get_order(actor, id).await?;
    Ok(Json(state.queries.order_detail(&order).await?))
}

/// PUT /orders/{id} with `{"estado": ...}`.
#[tracing::instrument(skip(state))]
pub async fn change_state<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(req): ApiJson<ChangeState>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = state.orders.change_state(actor, id, req.state).await?;
    Ok(Json(state.queries.order_detail(&order).await?))
}

/// DELETE /orders/{id}: cancel and return the reserved stock.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = state.orders.cancel_order(actor, id).await?;
    Ok(Json(state.queries.order_detail(&order).await?))
}

/// GET /orders/stats
pub async fn stats<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<OrderStats>, ApiError> {
    Ok(Json(state.queries.order_stats(actor).await?))
}
