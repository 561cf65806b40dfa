//! Bounded-retry concurrent batch execution
//!
//! A batch is an ordered run of same-kind remote calls. Every attempt fans
//! out one call per item, each bounded by the per-call timeout, then fans in
//! by waiting for all of them. If any call fails the attempt fails and the
//! whole batch is resubmitted; successes from a failed attempt are
//! discarded. Results come back in input order.

use futures::future::join_all;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AssetStoreConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::store::{StoreError, StoreResult};

/// Kind of remote operation a batch performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKind {
    Upload,
    Fetch,
    Delete,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchKind::Upload => write!(f, "upload"),
            BatchKind::Fetch => write!(f, "fetch"),
            BatchKind::Delete => write!(f, "delete"),
        }
    }
}

/// Runs batches with whole-batch retry
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    max_attempts: u32,
    call_timeout: Duration,
}

impl BatchExecutor {
    /// Create an executor; `max_attempts` is clamped to at least one
    pub fn new(max_attempts: u32, call_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            call_timeout,
        }
    }

    pub fn from_config(config: &AssetStoreConfig) -> Self {
        Self::new(config.max_attempts, config.call_timeout())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` over every item concurrently, retrying the entire batch on
    /// any failure
    ///
    /// # Errors
    /// * `ServiceError::Validation` - If `items` is empty
    /// * `ServiceError::AssetStore` - After `max_attempts` failed attempts,
    ///   carrying the last underlying failure
    pub async fn run<I, T, F, Fut>(
        &self,
        kind: BatchKind,
        items: &[I],
        op: F,
    ) -> ServiceResult<Vec<T>>
    where
        I: Clone,
        F: Fn(I) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        if items.is_empty() {
            return Err(ServiceError::Validation(format!(
                "Cannot run an empty {} batch",
                kind
            )));
        }

        let mut last_error: Option<StoreError> = None;

        for attempt in 1..=self.max_attempts {
            debug!(%kind, attempt, items = items.len(), "Dispatching batch attempt");

            let calls = items.iter().cloned().map(|item| self.bounded(op(item)));
            let outcome: StoreResult<Vec<T>> = join_all(calls).await.into_iter().collect();

            match outcome {
                Ok(results) => {
                    debug!(%kind, attempt, "Batch attempt succeeded");
                    return Ok(results);
                }
                Err(err) => {
                    warn!(%kind, attempt, max_attempts = self.max_attempts, error = %err, "Batch attempt failed");
                    last_error = Some(err);
                }
            }
        }

        Err(ServiceError::AssetStore {
            kind,
            attempts: self.max_attempts,
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt was made".to_string()),
        })
    }

    /// Run a single remote call under the same retry policy
    pub async fn run_one<T, F, Fut>(&self, kind: BatchKind, op: F) -> ServiceResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut results = self.run(kind, &[()], |_| op()).await?;
        results
            .pop()
            .ok_or_else(|| ServiceError::Internal(format!("{} call returned no result", kind)))
    }

    async fn bounded<T, Fut>(&self, call: Fut) -> StoreResult<T>
    where
        Fut: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.call_timeout)),
        }
    }
}
