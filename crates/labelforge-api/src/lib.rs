//! Labelforge API Layer
//!
//! This crate provides the REST API layer for Labelforge using Axum: image
//! upload and deletion, project deletion and dataset export.
//!
//! # Architecture
//!
//! The API layer is organized into:
//!
//! - **Handlers**: Request handlers for all API endpoints
//! - **Routes**: Route definitions and router configuration
//! - **Middleware**: Tower middleware for tracing, CORS and request IDs
//! - **Error Handling**: Conversion of service errors to `{status, message}` failure bodies
//! - **Responses**: Standard response wrappers and types
//!
//! # Example
//!
//! ```rust,no_run
//! use labelforge_api::build_api_server;
//! use labelforge_service::ServiceRegistry;
//!
//! # async fn example(services: ServiceRegistry) {
//! let app = build_api_server(services);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod routes;

// Re-export main types for convenience
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::AppState;
pub use middleware::{MiddlewareConfig, UuidRequestIdGenerator};
pub use responses::{
    created, ok, ApiResponse, ComponentHealth, HealthResponse, HealthStatus, StatusResponse,
};
pub use routes::build_router;

use axum::Router;
use labelforge_service::ServiceRegistry;

/// Build a complete API server with default middleware
pub fn build_api_server(services: ServiceRegistry) -> Router {
    build_api_server_with_config(services, MiddlewareConfig::default())
}

/// Build API server with custom middleware configuration
///
/// # Example
///
/// ```rust,no_run
/// use labelforge_api::{build_api_server_with_config, MiddlewareConfig};
/// use labelforge_service::ServiceRegistry;
///
/// # fn example(services: ServiceRegistry) {
/// let middleware_config = MiddlewareConfig::new()
///     .with_cors(false)
///     .with_max_body_bytes(10 * 1024 * 1024);
///
/// let app = build_api_server_with_config(services, middleware_config);
/// # }
/// ```
pub fn build_api_server_with_config(
    services: ServiceRegistry,
    middleware_config: MiddlewareConfig,
) -> Router {
    let state = AppState::new(services);
    let mut router = build_router(state, middleware_config.max_body_bytes);

    if middleware_config.enable_cors {
        router = router.layer(middleware::cors_layer());
    }

    if middleware_config.enable_tracing {
        router = router.layer(middleware::trace_layer());
    }

    // Apply request ID generation
    router
        .layer(tower_http::request_id::PropagateRequestIdLayer::x_request_id())
        .layer(tower_http::request_id::SetRequestIdLayer::x_request_id(
            UuidRequestIdGenerator,
        ))
}
