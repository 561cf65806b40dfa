//! Request signing for the remote content store
//!
//! The store authenticates signed calls with a SHA-1 digest over a canonical
//! `key=value&...` string followed directly by the API secret. Field order is
//! fixed by the store and must not change.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

use crate::error::{CoreError, Result};

/// Length of a SHA-1 digest in hexadecimal characters
pub const SIGNATURE_HEX_LEN: usize = 40;

/// A hex-encoded request signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// Wrap an existing signature, validating its format
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into().to_lowercase();

        if value.len() != SIGNATURE_HEX_LEN {
            return Err(CoreError::ValidationError(format!(
                "Invalid signature length: expected {} characters, got {}",
                SIGNATURE_HEX_LEN,
                value.len()
            )));
        }

        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::ValidationError(
                "Invalid signature format: must be hexadecimal string".to_string(),
            ));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds signatures for store calls
pub struct SignedRequestBuilder;

impl SignedRequestBuilder {
    /// Canonical string signed for an upload, without the secret
    pub fn upload_payload(folder: &str, public_id: &str, timestamp: i64) -> String {
        format!(
            "folder={}&public_id={}&timestamp={}",
            folder, public_id, timestamp
        )
    }

    /// Sign an upload of `public_id` into `folder` at `timestamp`
    pub fn sign(folder: &str, public_id: &str, timestamp: i64, api_secret: &str) -> Signature {
        Self::digest(&Self::upload_payload(folder, public_id, timestamp), api_secret)
    }

    /// Sign a destroy call for a single public id
    pub fn sign_destroy(public_id: &str, timestamp: i64, api_secret: &str) -> Signature {
        let payload = format!("public_id={}&timestamp={}", public_id, timestamp);
        Self::digest(&payload, api_secret)
    }

    fn digest(payload: &str, api_secret: &str) -> Signature {
        let mut hasher = Sha1::new();
        hasher.update(payload.as_bytes());
        hasher.update(api_secret.as_bytes());
        Signature(format!("{:x}", hasher.finalize()))
    }
}

/// Current Unix time in whole seconds
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_payload_field_order() {
        assert_eq!(
            SignedRequestBuilder::upload_payload("FASTAPI/DEMO", "image-abcde", 1700000000),
            "folder=FASTAPI/DEMO&public_id=image-abcde&timestamp=1700000000"
        );
    }

    #[test]
    fn test_sign_matches_plain_sha1() {
        // sha1("folder=f&public_id=p&timestamp=1s") computed independently
        let expected = {
            let mut hasher = Sha1::new();
            hasher.update(b"folder=f&public_id=p&timestamp=1s");
            format!("{:x}", hasher.finalize())
        };
        let signature = SignedRequestBuilder::sign("f", "p", 1, "s");
        assert_eq!(signature.as_str(), expected);
    }

    #[test]
    fn test_sign_is_deterministic_hex() {
        let a = SignedRequestBuilder::sign("FASTAPI/DEMO", "image-abcde", 1700000000, "secret");
        let b = SignedRequestBuilder::sign("FASTAPI/DEMO", "image-abcde", 1700000000, "secret");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), SIGNATURE_HEX_LEN);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_changes_with_every_input() {
        let base = SignedRequestBuilder::sign("F", "p", 100, "s");
        assert_ne!(base, SignedRequestBuilder::sign("G", "p", 100, "s"));
        assert_ne!(base, SignedRequestBuilder::sign("F", "q", 100, "s"));
        assert_ne!(base, SignedRequestBuilder::sign("F", "p", 101, "s"));
        assert_ne!(base, SignedRequestBuilder::sign("F", "p", 100, "t"));
    }

    #[test]
    fn test_sign_destroy_differs_from_upload() {
        let destroy = SignedRequestBuilder::sign_destroy("F/p", 100, "s");
        assert_ne!(destroy, SignedRequestBuilder::sign("F", "p", 100, "s"));
        assert_eq!(destroy.as_str().len(), SIGNATURE_HEX_LEN);
    }

    #[test]
    fn test_signature_validation() {
        assert!(Signature::new("a".repeat(40)).is_ok());
        assert!(Signature::new("a".repeat(39)).is_err());
        assert!(Signature::new("g".repeat(40)).is_err());
        assert_eq!(Signature::new("A".repeat(40)).unwrap().as_str(), "a".repeat(40));
    }

    #[test]
    fn test_unix_timestamp_is_recent() {
        assert!(unix_timestamp() > 1_600_000_000);
    }
}
