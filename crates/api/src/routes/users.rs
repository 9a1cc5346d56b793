//! User endpoints. Password hashes never leave the server.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::UserId;
use domain::{NewUser, User, UserChanges};
use queries::{Page, RoleView, UserListQuery};
use store::Store;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, CurrentActor};
use crate::state::AppState;

pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<Json<Page<User>>, ApiError> {
    Ok(Json(state.queries.list_users(actor, &query).await?))
}

pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.queries.user(actor, id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiJson(req): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.users.create_user(actor, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[tracing::instrument(skip(state))]
pub async fn update<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(req): ApiJson<UserChanges>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.update_user(actor, id, req).await?))
}

#[tracing::instrument(skip(state))]
pub async fn deactivate<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentActor(actor): CurrentActor,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.deactivate_user(actor, id).await?))
}

/// The role catalog. Open to every caller.
pub async fn roles<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<RoleView>> {
    Json(state.queries.roles())
}
