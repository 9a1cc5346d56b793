//! Report endpoints. Customers work with their own reports; staff with all.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::ReportId;
use domain::{NewReport, Report, ReportChanges};
use queries::{Page, ReportListQuery, ReportView};
use store::Store;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentActor};
use crate::state::AppState;

pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(query): ApiQuery<ReportListQuery>,
) -> Result<Json<Page<ReportView>>, ApiError> {
    Ok(Json(state.queries.list_reports(actor, &query).await?))
}

pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<ReportId>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.reports.get_report(actor, id).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiJson(req): ApiJson<NewReport>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let report = state.reports.create_report(actor, req).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<ReportId>,
    ApiJson(req): ApiJson<ReportChanges>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.reports.update_report(actor, id, req).await?))
}

#[tracing::instrument(skip(state))]
pub async fn deactivate<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<ReportId>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(state.reports.deactivate_report(actor, id).await?))
}
