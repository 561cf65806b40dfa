//! Service layer for Labelforge
//!
//! This crate sits between the HTTP surface and the storage collaborator. It
//! owns every interaction with the remote content store and the construction
//! of dataset archives.
//!
//! # Architecture
//!
//! - **BatchExecutor**: concurrent fan-out with per-call timeouts and whole-batch retry
//! - **AssetStore / HttpAssetStore**: wire contract of the remote store
//! - **AssetGateway**: signed upload, fetch and delete operations built on the executor
//! - **DatasetExporter**: zip archive with images and a COCO-style `annotations.json`
//! - **ImageIngestService**: project bookkeeping around the gateway
//!
//! # Example
//!
//! ```rust,no_run
//! use labelforge_service::{AssetStoreConfig, HttpAssetStore, ServiceRegistry};
//! use std::sync::Arc;
//!
//! # fn example(repository: Arc<dyn labelforge_db::ProjectRepository>) -> labelforge_service::ServiceResult<()> {
//! let config = AssetStoreConfig::new("demo", "api-key", "api-secret");
//! let store = Arc::new(HttpAssetStore::new(config.clone())?);
//! let services = ServiceRegistry::new(config, repository, store);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod export;
pub mod gateway;
pub mod ingest;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AssetStoreConfig;
pub use error::{ServiceError, ServiceResult};
pub use executor::{BatchExecutor, BatchKind};
pub use export::{DatasetExporter, ExportArchive};
pub use gateway::AssetGateway;
pub use ingest::{DefaultImageIngestService, ImageIngestService};
pub use store::{AssetStore, HttpAssetStore, StoreError, StoreResult};

use labelforge_db::ProjectRepository;
use std::sync::Arc;

/// Service registry that holds all service instances
#[derive(Clone)]
pub struct ServiceRegistry {
    /// Image ingestion and removal
    pub ingest: Arc<dyn ImageIngestService>,
    /// Dataset export
    pub exporter: Arc<DatasetExporter>,
    /// Direct access to the remote store
    pub gateway: Arc<AssetGateway>,
    /// Storage collaborator
    pub repository: Arc<dyn ProjectRepository>,
}

impl ServiceRegistry {
    /// Create a registry with default implementations sharing one gateway
    pub fn new(
        config: AssetStoreConfig,
        repository: Arc<dyn ProjectRepository>,
        store: Arc<dyn AssetStore>,
    ) -> Self {
        let gateway = Arc::new(AssetGateway::new(config, store));
        let ingest = Arc::new(DefaultImageIngestService::new(
            repository.clone(),
            gateway.clone(),
        ));
        let exporter = Arc::new(DatasetExporter::new(repository.clone(), gateway.clone()));

        Self {
            ingest,
            exporter,
            gateway,
            repository,
        }
    }

    /// Get the ingest service
    pub fn ingest(&self) -> &Arc<dyn ImageIngestService> {
        &self.ingest
    }

    /// Get the exporter
    pub fn exporter(&self) -> &Arc<DatasetExporter> {
        &self.exporter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAssetStore;
    use labelforge_db::InMemoryProjectRepository;

    #[test]
    fn test_registry_shares_configuration() {
        let services = ServiceRegistry::new(
            AssetStoreConfig::new("demo", "key", "secret").with_root_folder("DATA"),
            Arc::new(InMemoryProjectRepository::new()),
            Arc::new(MockAssetStore::new()),
        );
        assert_eq!(services.gateway.config().root_folder, "DATA");
    }
}
