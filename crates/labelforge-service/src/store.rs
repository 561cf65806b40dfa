//! Remote content store seam
//!
//! [`AssetStore`] is the narrow wire contract the gateway talks to: one
//! method per remote call, each returning a strongly typed response. Any
//! missing required field in a response is a decode failure, never a silent
//! default. [`HttpAssetStore`] implements it over HTTP with `reqwest`.

use async_trait::async_trait;
use bytes::Bytes;
use labelforge_core::{AssetRef, Signature};
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::AssetStoreConfig;
use crate::error::{ServiceError, ServiceResult};

/// Result type alias for single remote calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure of a single remote call
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Remote store returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Unexpected response from remote store: {0}")]
    Decode(String),

    /// Response did not confirm the requested operation
    #[error("Remote store did not confirm {0}")]
    NotConfirmed(String),

    /// Call exceeded its timeout
    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),
}

/// A signed upload of one asset
#[derive(Debug, Clone)]
pub struct SignedUpload {
    pub asset: AssetRef,
    pub folder: String,
    pub public_id: String,
    pub timestamp: i64,
    pub signature: Signature,
}

/// A signed destroy call for one content identifier
#[derive(Debug, Clone)]
pub struct SignedDestroy {
    pub public_id: String,
    pub timestamp: i64,
    pub signature: Signature,
}

/// Upload response; all three fields are required
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    pub secure_url: String,
    pub width: u32,
    pub height: u32,
}

/// Destroy response; deletion is confirmed by `result == "ok"`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DestroyResponse {
    pub result: String,
}

impl DestroyResponse {
    pub fn is_ok(&self) -> bool {
        self.result == "ok"
    }
}

/// Delete-by-prefix response; the presence of `deleted` confirms the call
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrefixDeleteResponse {
    pub deleted: serde_json::Map<String, serde_json::Value>,
}

/// Wire contract of the remote content store
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store one asset
    async fn upload(&self, request: SignedUpload) -> StoreResult<UploadResponse>;

    /// Download the raw bytes behind a delivery URL
    async fn fetch(&self, url: &str) -> StoreResult<Bytes>;

    /// Delete one asset by content identifier
    async fn destroy(&self, request: SignedDestroy) -> StoreResult<DestroyResponse>;

    /// Delete every asset whose content identifier starts with `prefix`
    async fn delete_by_prefix(&self, prefix: &str) -> StoreResult<PrefixDeleteResponse>;
}

/// [`AssetStore`] over the store's HTTP API
pub struct HttpAssetStore {
    client: reqwest::Client,
    config: AssetStoreConfig,
}

impl HttpAssetStore {
    /// Create a client for the configured account
    pub fn new(config: AssetStoreConfig) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.call_timeout())
            .build()
            .map_err(|e| ServiceError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn upload(&self, request: SignedUpload) -> StoreResult<UploadResponse> {
        let SignedUpload {
            asset,
            folder,
            public_id,
            timestamp,
            signature,
        } = request;

        let file = Part::bytes(asset.content.to_vec())
            .file_name(asset.filename)
            .mime_str(&asset.content_type)?;

        let form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("public_id", public_id)
            .text("folder", folder)
            .text("signature", signature.to_string())
            .part("file", file);

        let response = self
            .client
            .post(self.config.endpoint("image/upload"))
            .multipart(form)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn fetch(&self, url: &str) -> StoreResult<Bytes> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        Ok(response.bytes().await?)
    }

    async fn destroy(&self, request: SignedDestroy) -> StoreResult<DestroyResponse> {
        let timestamp = request.timestamp.to_string();
        let signature = request.signature.to_string();
        let form = [
            ("public_id", request.public_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
        ];

        let response = self
            .client
            .post(self.config.endpoint("image/destroy"))
            .form(&form)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn delete_by_prefix(&self, prefix: &str) -> StoreResult<PrefixDeleteResponse> {
        let response = self
            .client
            .delete(self.config.endpoint("resources/image/upload"))
            .query(&[("prefix", prefix)])
            .basic_auth(
                &self.config.api_key,
                Some(self.config.api_secret.expose_secret()),
            )
            .send()
            .await?;

        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_requires_all_fields() {
        let ok: UploadResponse = serde_json::from_str(
            r#"{"secure_url": "https://x/a.png", "width": 10, "height": 20, "bytes": 99}"#,
        )
        .unwrap();
        assert_eq!(ok.width, 10);

        let missing = serde_json::from_str::<UploadResponse>(r#"{"secure_url": "https://x/a.png"}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_destroy_response() {
        let ok: DestroyResponse = serde_json::from_str(r#"{"result": "ok"}"#).unwrap();
        assert!(ok.is_ok());
        let missing: DestroyResponse = serde_json::from_str(r#"{"result": "not found"}"#).unwrap();
        assert!(!missing.is_ok());
    }

    #[test]
    fn test_prefix_delete_requires_deleted_key() {
        let ok: PrefixDeleteResponse =
            serde_json::from_str(r#"{"deleted": {"FASTAPI/DEMO/image-aaaaa": "deleted"}}"#)
                .unwrap();
        assert_eq!(ok.deleted.len(), 1);

        let empty: PrefixDeleteResponse = serde_json::from_str(r#"{"deleted": {}}"#).unwrap();
        assert!(empty.deleted.is_empty());

        assert!(serde_json::from_str::<PrefixDeleteResponse>(r#"{"error": "nope"}"#).is_err());
    }

    #[test]
    fn test_http_store_builds() {
        let store = HttpAssetStore::new(AssetStoreConfig::new("demo", "key", "secret"));
        assert!(store.is_ok());
    }
}
