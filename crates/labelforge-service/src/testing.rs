//! In-process asset store double used by unit tests

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::store::{
    AssetStore, DestroyResponse, PrefixDeleteResponse, SignedDestroy, SignedUpload, StoreError,
    StoreResult, UploadResponse,
};

/// Records every call and echoes back canned responses
pub(crate) struct MockAssetStore {
    pub uploads: Mutex<Vec<SignedUpload>>,
    pub upload_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub destroyed: Mutex<Vec<String>>,
    pub prefixes: Mutex<Vec<String>>,
    fail_uploads: bool,
    fail_fetch_for: Option<String>,
    destroy_result: String,
}

impl MockAssetStore {
    pub fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            upload_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            destroyed: Mutex::new(Vec::new()),
            prefixes: Mutex::new(Vec::new()),
            fail_uploads: false,
            fail_fetch_for: None,
            destroy_result: "ok".to_string(),
        }
    }

    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn failing_fetch_for(mut self, url: impl Into<String>) -> Self {
        self.fail_fetch_for = Some(url.into());
        self
    }

    pub fn with_destroy_result(mut self, result: &str) -> Self {
        self.destroy_result = result.to_string();
        self
    }

    /// Bytes served for `url`
    pub fn content_for(url: &str) -> Bytes {
        Bytes::from(format!("content of {}", url))
    }
}

#[async_trait]
impl AssetStore for MockAssetStore {
    async fn upload(&self, request: SignedUpload) -> StoreResult<UploadResponse> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads {
            return Err(StoreError::Status {
                status: 500,
                body: "upload rejected".to_string(),
            });
        }

        let secure_url = format!(
            "https://res.example.com/demo/image/upload/v1700000000/{}/{}",
            request.folder, request.asset.filename
        );
        self.uploads.lock().unwrap().push(request);

        Ok(UploadResponse {
            secure_url,
            width: 10,
            height: 20,
        })
    }

    async fn fetch(&self, url: &str) -> StoreResult<Bytes> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch_for.as_deref() == Some(url) {
            return Err(StoreError::Status {
                status: 404,
                body: String::new(),
            });
        }
        Ok(Self::content_for(url))
    }

    async fn destroy(&self, request: SignedDestroy) -> StoreResult<DestroyResponse> {
        self.destroyed.lock().unwrap().push(request.public_id);
        Ok(DestroyResponse {
            result: self.destroy_result.clone(),
        })
    }

    async fn delete_by_prefix(&self, prefix: &str) -> StoreResult<PrefixDeleteResponse> {
        self.prefixes.lock().unwrap().push(prefix.to_string());
        let mut deleted = serde_json::Map::new();
        deleted.insert(
            format!("{}image-aaaaa", prefix),
            serde_json::Value::String("deleted".to_string()),
        );
        Ok(PrefixDeleteResponse { deleted })
    }
}
