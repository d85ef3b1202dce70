//! Location administration, sync and browse handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use sharemirror_core::error::AppError;
use sharemirror_entity::view::ViewNode;
use sharemirror_worker::JobKind;

use crate::dto::request::{CreateLocationRequest, SyncQuery};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::handlers::enqueue;
use crate::state::AppState;

/// GET /api/locations
///
/// One lazy root view per location.
pub async fn list_root_views(
    State(state): State<AppState>,
) -> Result<Json<Vec<ViewNode>>, ApiError> {
    Ok(Json(state.mirror.list_root_views().await?))
}

/// POST /api/locations
pub async fn create_location(
    State(state): State<AppState>,
    Json(req): Json<CreateLocationRequest>,
) -> Result<Response, ApiError> {
    let location = state.mirror.create_location(&req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(location))).into_response())
}

/// GET /api/locations/{id}
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let status = state.mirror.location_status(id).await?;
    Ok(Json(ApiResponse::ok(status)).into_response())
}

/// DELETE /api/locations/{id}
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.mirror.delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/locations/{id}/sync
pub async fn sync_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SyncQuery>,
) -> Result<Response, ApiError> {
    if query.background {
        state.mirror.locations().get(id).await?;
        let accepted = enqueue(&state, JobKind::SyncLocation { location_id: id })?;
        return Ok((StatusCode::ACCEPTED, Json(ApiResponse::ok(accepted))).into_response());
    }

    let report = state.mirror.sync_location(id).await?;
    Ok(Json(ApiResponse::ok(report)).into_response())
}

/// GET /api/locations/{id}/tree
pub async fn location_tree(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ViewNode>, ApiError> {
    Ok(Json(state.mirror.location_tree(id).await?))
}

/// GET /api/locations/{id}/paths
pub async fn list_all_paths(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let paths = state.mirror.list_all_paths(id).await?.ok_or_else(|| {
        AppError::remote(format!("Share of location {id} could not be listed"))
    })?;
    Ok(Json(ApiResponse::ok(paths)).into_response())
}
