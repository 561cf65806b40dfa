//! API request handlers
//!
//! This module implements HTTP request handlers for all API endpoints.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use labelforge_core::{AssetRef, ImageId, ImageRecord, ProjectId};
use labelforge_service::ServiceRegistry;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    error::{ApiError, ApiResult},
    responses::{created, ApiResponse, ComponentHealth, HealthResponse, StatusResponse},
};

/// Multipart field carrying uploaded files
pub const FILES_FIELD: &str = "files";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Service registry
    pub services: Arc<ServiceRegistry>,
}

impl AppState {
    /// Create new application state
    pub fn new(services: ServiceRegistry) -> Self {
        Self {
            services: Arc::new(services),
        }
    }
}

fn parse_project_id(raw: &str) -> ApiResult<ProjectId> {
    raw.parse::<ProjectId>()
        .map_err(|e| ApiError::bad_request(format!("Invalid project ID: {}", e)))
}

fn parse_image_id(raw: &str) -> ApiResult<ImageId> {
    raw.parse::<ImageId>()
        .map_err(|e| ApiError::bad_request(format!("Invalid image ID: {}", e)))
}

// ============================================================================
// Image Handlers
// ============================================================================

/// Upload images into a project
#[instrument(skip(state, multipart))]
pub async fn upload_images(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<ImageRecord>>>)> {
    let project_id = parse_project_id(&project_id)?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let content = field.bytes().await?;

        debug!("Received {} ({}, {} bytes)", filename, content_type, content.len());
        files.push(AssetRef::new(filename, content, content_type));
    }

    info!("Uploading {} files to project {}", files.len(), project_id);

    let images = state
        .services
        .ingest()
        .upload_project_images(&project_id, files)
        .await?;

    Ok(created(images))
}

/// Delete one image of a project
#[instrument(skip(state))]
pub async fn delete_image(
    State(state): State<AppState>,
    Path((project_id, image_id)): Path<(String, String)>,
) -> ApiResult<StatusResponse> {
    let project_id = parse_project_id(&project_id)?;
    let image_id = parse_image_id(&image_id)?;

    state
        .services
        .ingest()
        .delete_project_image(&project_id, &image_id)
        .await?;

    Ok(StatusResponse::success())
}

// ============================================================================
// Project Handlers
// ============================================================================

/// Delete a project and all of its remote assets
#[instrument(skip(state))]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<StatusResponse> {
    let project_id = parse_project_id(&project_id)?;

    state.services.ingest().delete_project(&project_id).await?;

    Ok(StatusResponse::success())
}

/// Download a project as a zip archive
#[instrument(skip(state))]
pub async fn export_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Response> {
    let project_id = parse_project_id(&project_id)?;

    let archive = state.services.exporter().export(&project_id).await?;
    let disposition = content_disposition(&archive.filename)?;
    info!("Streaming {} ({} bytes)", archive.filename, archive.len());

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, Body::from_stream(archive.into_stream())).into_response())
}

/// `attachment; filename="..."` with characters unsafe in a quoted header value replaced
fn content_disposition(filename: &str) -> ApiResult<HeaderValue> {
    let safe: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe))
        .map_err(|e| ApiError::internal_server_error(format!("Invalid header value: {}", e)))
}

// ============================================================================
// Health and Info Handlers
// ============================================================================

/// Health check endpoint
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> HealthResponse {
    debug!("Health check requested");

    let repository = match state.services.repository.health_check().await {
        Ok(()) => ComponentHealth::healthy(),
        Err(e) => ComponentHealth::unhealthy(format!("Repository error: {}", e)),
    };

    HealthResponse::healthy()
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_check("repository", repository)
        .with_check("service", ComponentHealth::healthy())
        .compute_status()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        let value = content_disposition("demo_annotations.zip").unwrap();
        assert_eq!(value, "attachment; filename=\"demo_annotations.zip\"");
    }

    #[test]
    fn test_content_disposition_sanitizes() {
        let value = content_disposition("caf\u{e9} \"x\"_annotations.zip").unwrap();
        assert_eq!(value, "attachment; filename=\"caf_ _x__annotations.zip\"");
    }

    #[test]
    fn test_parse_ids() {
        assert!(parse_project_id("not-a-ulid").is_err());
        let id = ProjectId::new();
        assert_eq!(parse_project_id(&id.to_string()).unwrap(), id);
    }
}
