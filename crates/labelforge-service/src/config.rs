//! Remote asset store configuration
//!
//! Built once at startup and handed to [`AssetGateway::new`](crate::AssetGateway::new)
//! and [`HttpAssetStore::new`](crate::HttpAssetStore::new); never mutated afterwards.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{ServiceError, ServiceResult};

/// Credentials and tuning for the remote content store
#[derive(Debug, Clone, Deserialize)]
pub struct AssetStoreConfig {
    /// Account (cloud) name, part of every endpoint path
    pub cloud_name: String,

    /// Public API key
    pub api_key: String,

    /// API secret used for signing and basic auth
    pub api_secret: SecretString,

    /// API base URL, without the cloud name
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Folder every project folder is nested under
    #[serde(default = "default_root_folder")]
    pub root_folder: String,

    /// Attempts per batch, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Timeout applied to every individual remote call, in milliseconds
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_root_folder() -> String {
    "FASTAPI".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

impl AssetStoreConfig {
    /// Create a configuration with default endpoint, folder and retry settings
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: SecretString::new(api_secret.into()),
            base_url: default_base_url(),
            root_folder: default_root_folder(),
            max_attempts: default_max_attempts(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_root_folder(mut self, root_folder: impl Into<String>) -> Self {
        self.root_folder = root_folder.into();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the per-call timeout; sub-millisecond precision is dropped
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Per-call timeout as a duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Endpoint for `path` under this account, e.g. `image/upload`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.cloud_name,
            path.trim_start_matches('/')
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> ServiceResult<()> {
        if self.cloud_name.trim().is_empty() {
            return Err(ServiceError::Validation(
                "asset_store.cloud_name cannot be empty".to_string(),
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(ServiceError::Validation(
                "asset_store.api_key cannot be empty".to_string(),
            ));
        }
        if self.api_secret.expose_secret().is_empty() {
            return Err(ServiceError::Validation(
                "asset_store.api_secret cannot be empty".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ServiceError::Validation(
                "asset_store.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.call_timeout_ms == 0 {
            return Err(ServiceError::Validation(
                "asset_store.call_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
