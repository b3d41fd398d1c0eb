//! File record handlers: create, read, list, visibility and content.

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use cabinet_core::error::{AppError, ErrorKind};
use cabinet_core::types::PageRequest;

use crate::dto::request::{CreateFileRequest, DownloadQuery, ListFilesQuery};
use crate::dto::response::FileResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, Token};
use crate::state::AppState;

/// POST /files
pub async fn create_file(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<CreateFileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FileResponse>), ApiError> {
    let Json(req) = body.map_err(|e| {
        AppError::with_source(ErrorKind::Validation, "Invalid request body", e)
    })?;

    let record = state.upload_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    let record = state.file_service.get(&auth, &id).await?;
    Ok(Json(record.into()))
}

/// GET /files?parentId=...&page=...
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<Vec<FileResponse>>, ApiError> {
    let page = PageRequest::parse(query.page.as_deref());
    let records = state
        .file_service
        .list(&auth, query.parent_id.as_deref(), page)
        .await?;
    Ok(Json(records.into_iter().map(FileResponse::from).collect()))
}

/// PUT /files/{id}/publish
pub async fn publish_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    let record = state.file_service.set_visibility(&auth, &id, true).await?;
    Ok(Json(record.into()))
}

/// PUT /files/{id}/unpublish
pub async fn unpublish_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    let record = state.file_service.set_visibility(&auth, &id, false).await?;
    Ok(Json(record.into()))
}

/// GET /files/{id}/data?size=...
///
/// Anonymous callers may read public records. Owners read their private
/// records by presenting their token.
pub async fn download_file(
    State(state): State<AppState>,
    token: Token,
    Path(id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let result = state
        .download_service
        .download(&id, token.as_deref(), query.size.as_deref())
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(header::CONTENT_LENGTH, result.data.len())
        .body(Body::from(result.data))
        .map_err(|e| ApiError(AppError::internal(format!("Response build failed: {e}"))))
}
