//! API route definitions
//!
//! This module defines all API routes and builds the router.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{
    delete_image, delete_project, export_project, health_check, upload_images, AppState,
};

/// Build the API router with all routes
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/v1", build_v1_routes())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Build v1 API routes
fn build_v1_routes() -> Router<AppState> {
    Router::new()
        // Projects
        .route("/projects/:project_id", delete(delete_project))
        .route("/projects/:project_id/export", get(export_project))
        // Images
        .route("/projects/:project_id/images", post(upload_images))
        .route(
            "/projects/:project_id/images/:image_id",
            delete(delete_image),
        )
}
