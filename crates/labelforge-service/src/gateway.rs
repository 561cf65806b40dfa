//! Asset gateway
//!
//! Public face of the remote content store. Each operation is one call into
//! the [`BatchExecutor`], so every failure mode ends in either a complete
//! result or a single `ServiceError::AssetStore`.

use bytes::Bytes;
use labelforge_core::{
    unix_timestamp, AssetRef, ProjectRecord, SignedRequestBuilder, UploadedAsset,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::AssetStoreConfig;
use crate::error::ServiceResult;
use crate::executor::{BatchExecutor, BatchKind};
use crate::store::{AssetStore, SignedDestroy, SignedUpload, StoreError};

/// Signs, uploads, fetches and deletes assets against an [`AssetStore`]
pub struct AssetGateway {
    config: AssetStoreConfig,
    store: Arc<dyn AssetStore>,
    executor: BatchExecutor,
}

impl AssetGateway {
    /// Create a gateway; the configuration is fixed for its lifetime
    pub fn new(config: AssetStoreConfig, store: Arc<dyn AssetStore>) -> Self {
        let executor = BatchExecutor::from_config(&config);
        Self {
            config,
            store,
            executor,
        }
    }

    pub fn config(&self) -> &AssetStoreConfig {
        &self.config
    }

    /// Remote folder holding a project's assets
    pub fn project_folder(&self, project: &ProjectRecord) -> String {
        project.asset_folder(&self.config.root_folder)
    }

    /// Upload every asset into `folder`
    ///
    /// The public id of each asset is its filename stem, so callers must
    /// allocate unique names before calling. Each call signs with a fresh
    /// timestamp, including on retry.
    #[instrument(skip(self, assets), fields(count = assets.len()))]
    pub async fn upload_images(
        &self,
        assets: Vec<AssetRef>,
        folder: &str,
    ) -> ServiceResult<Vec<UploadedAsset>> {
        for asset in &assets {
            asset.validate()?;
        }

        let api_secret = self.config.api_secret.expose_secret().as_str();

        let uploaded = self
            .executor
            .run(BatchKind::Upload, &assets, |asset: AssetRef| {
                let store = Arc::clone(&self.store);
                let folder = folder.to_string();
                async move {
                    let public_id = asset.stem().to_string();
                    let filename = asset.filename.clone();
                    let timestamp = unix_timestamp();
                    let signature =
                        SignedRequestBuilder::sign(&folder, &public_id, timestamp, api_secret);

                    let response = store
                        .upload(SignedUpload {
                            asset,
                            folder,
                            public_id,
                            timestamp,
                            signature,
                        })
                        .await?;

                    Ok(UploadedAsset {
                        url: response.secure_url,
                        filename,
                        width: response.width,
                        height: response.height,
                    })
                }
            })
            .await?;

        info!("Uploaded {} assets", uploaded.len());
        Ok(uploaded)
    }

    /// Download the bytes behind every URL, in input order
    #[instrument(skip(self, urls), fields(count = urls.len()))]
    pub async fn fetch_images(&self, urls: &[String]) -> ServiceResult<Vec<Bytes>> {
        self.executor
            .run(BatchKind::Fetch, urls, |url: String| {
                let store = Arc::clone(&self.store);
                async move { store.fetch(&url).await }
            })
            .await
    }

    /// Delete one asset, identified by the content id derived from its URL
    #[instrument(skip(self, asset), fields(url = %asset.url))]
    pub async fn delete_image(&self, asset: &UploadedAsset) -> ServiceResult<()> {
        let public_id = asset.public_id()?;
        let api_secret = self.config.api_secret.expose_secret().as_str();

        self.executor
            .run_one(BatchKind::Delete, || {
                let store = Arc::clone(&self.store);
                let public_id = public_id.clone();
                async move {
                    let timestamp = unix_timestamp();
                    let signature =
                        SignedRequestBuilder::sign_destroy(&public_id, timestamp, api_secret);
                    let response = store
                        .destroy(SignedDestroy {
                            public_id: public_id.clone(),
                            timestamp,
                            signature,
                        })
                        .await?;

                    if response.is_ok() {
                        Ok(())
                    } else {
                        Err(StoreError::NotConfirmed(format!(
                            "deletion of {} (result: {})",
                            public_id, response.result
                        )))
                    }
                }
            })
            .await?;

        info!("Deleted asset {}", public_id);
        Ok(())
    }

    /// Delete every asset under `folder` with one prefix call
    #[instrument(skip(self))]
    pub async fn delete_project_assets(&self, folder: &str) -> ServiceResult<()> {
        let prefix = format!("{}/", folder.trim_end_matches('/'));

        let response = self
            .executor
            .run_one(BatchKind::Delete, || {
                let store = Arc::clone(&self.store);
                let prefix = prefix.clone();
                async move { store.delete_by_prefix(&prefix).await }
            })
            .await?;

        info!("Deleted {} assets under {}", response.deleted.len(), prefix);
        Ok(())
    }
}
