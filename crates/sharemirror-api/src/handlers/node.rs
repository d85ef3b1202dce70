//! Node view, sync, availability and content handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use sharemirror_core::error::AppError;
use sharemirror_entity::view::ViewNode;
use sharemirror_worker::JobKind;

use crate::dto::request::{SyncQuery, ViewQuery};
use crate::dto::response::{ApiResponse, AvailabilityResponse};
use crate::error::ApiError;
use crate::handlers::enqueue;
use crate::state::AppState;

/// GET /api/nodes/{id}/view
pub async fn get_node_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<ViewNode>, ApiError> {
    Ok(Json(state.mirror.get_node_view(id, query.lazy()).await?))
}

/// POST /api/nodes/{id}/sync
pub async fn sync_node(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SyncQuery>,
) -> Result<Response, ApiError> {
    let lazy = query.lazy.unwrap_or(true);

    if query.background {
        state.mirror.node(id).await?;
        let accepted = enqueue(&state, JobKind::SyncNode { node_id: id, lazy })?;
        return Ok((StatusCode::ACCEPTED, Json(ApiResponse::ok(accepted))).into_response());
    }

    let report = state.mirror.sync_node(id, lazy).await?;
    Ok(Json(ApiResponse::ok(report)).into_response())
}

/// GET /api/nodes/{id}/available
pub async fn is_available(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AvailabilityResponse>>, ApiError> {
    let available = state.mirror.is_node_available(id).await?;
    Ok(Json(ApiResponse::ok(AvailabilityResponse {
        node_id: id,
        available,
    })))
}

/// GET /api/nodes/{id}/content
pub async fn download_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let node = state.mirror.node(id).await?;
    let contents = state
        .mirror
        .retrieve_node_contents(id)
        .await?
        .ok_or_else(|| {
            AppError::remote(format!("Contents of node {id} could not be retrieved"))
        })?;

    let size = contents.size;
    let file = tokio::fs::File::from_std(contents.file.into_file());
    let body = Body::from_stream(ReaderStream::new(file));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", node.name.replace('"', "")),
        )
        .header(header::CONTENT_LENGTH, size)
        .body(body)
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
