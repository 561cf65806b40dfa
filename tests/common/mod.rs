//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: a running
//! API server backed by an in-memory repository and a `wiremock` stand-in for
//! the remote content store.

#![allow(dead_code)]

use labelforge_api::{build_api_server, ErrorResponse};
use labelforge_core::ProjectRecord;
use labelforge_db::{InMemoryProjectRepository, ProjectRepository};
use labelforge_service::{AssetStoreConfig, HttpAssetStore, ServiceRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use wiremock::MockServer;

pub mod fixtures;

pub const CLOUD_NAME: &str = "demo";
pub const API_KEY: &str = "test-key";
pub const API_SECRET: &str = "test-secret";

/// Asset store configuration pointing at a mock server
pub fn asset_config(store: &MockServer) -> AssetStoreConfig {
    AssetStoreConfig::new(CLOUD_NAME, API_KEY, API_SECRET)
        .with_base_url(format!("{}/v1_1", store.uri()))
        .with_call_timeout(Duration::from_secs(5))
}

/// Test application state
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryProjectRepository>,
    pub store: MockServer,
}

impl TestApp {
    /// Create a new test application with default retry settings
    pub async fn new() -> Self {
        Self::with_max_attempts(3).await
    }

    /// Create a new test application with a specific attempt budget
    pub async fn with_max_attempts(max_attempts: u32) -> Self {
        let store = MockServer::start().await;
        let config = asset_config(&store).with_max_attempts(max_attempts);

        let repository = Arc::new(InMemoryProjectRepository::new());
        let http_store =
            HttpAssetStore::new(config.clone()).expect("Failed to create asset store client");
        let services = ServiceRegistry::new(config, repository.clone(), Arc::new(http_store));

        let app = build_api_server(services);

        // Start server on random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = listener.local_addr().expect("Failed to get local address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to start test server");
        });

        Self {
            address: format!("http://{}", address),
            repository,
            store,
        }
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Create HTTP client
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build client")
    }

    /// Store a project directly in the repository
    pub async fn create_project(&self, name: &str) -> ProjectRecord {
        self.repository
            .create_project(ProjectRecord::new(name).expect("valid project name"))
            .await
            .expect("Failed to create project")
    }
}

/// Assert response status
pub fn assert_status(response: &reqwest::Response, expected: reqwest::StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Parse a failure body and check its envelope
pub async fn failure_message(response: reqwest::Response) -> String {
    let body: ErrorResponse = response.json().await.expect("Failed to parse error body");
    assert_eq!(body.status, "Failed");
    body.message
}
