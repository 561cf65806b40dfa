//! Remote asset descriptors
//!
//! An [`AssetRef`] is what a caller hands over for upload; an
//! [`UploadedAsset`] is what the remote content store reports back once the
//! binary is stored. The remote store addresses assets by a *public id*
//! (folder path plus file stem) which can be recovered from the delivery URL.

use bytes::Bytes;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::error::{CoreError, Result};

/// An image binary queued for upload
///
/// Lives only for the duration of one batch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// File name, including extension, used as the basis of the public id
    pub filename: String,

    /// Raw file contents
    pub content: Bytes,

    /// MIME type reported by the caller
    pub content_type: String,
}

impl AssetRef {
    /// Create a new asset reference
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<Bytes>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    /// File name without its extension; this is the public id inside the folder
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }

    /// Extension of the file name, if any
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.filename)
            .extension()
            .and_then(|s| s.to_str())
    }

    /// Whether the caller declared an image content type
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Validate the reference before any network call is made
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Asset filename cannot be empty".to_string(),
            ));
        }

        if self.filename.contains('/') {
            return Err(CoreError::ValidationError(format!(
                "Asset filename must not contain '/': {}",
                self.filename
            )));
        }

        if !self.content_type.contains('/') {
            return Err(CoreError::ValidationError(format!(
                "Invalid content type format: {}",
                self.content_type
            )));
        }

        if self.content.is_empty() {
            return Err(CoreError::ValidationError(format!(
                "Asset {} has no content",
                self.filename
            )));
        }

        Ok(())
    }
}

/// Metadata of an asset stored in the remote content store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Secure delivery URL
    pub url: String,

    /// File name the asset was uploaded under
    pub filename: String,

    /// Pixel width reported by the store
    pub width: u32,

    /// Pixel height reported by the store
    pub height: u32,
}

impl UploadedAsset {
    /// Content identifier of this asset in the remote store
    pub fn public_id(&self) -> Result<String> {
        public_id_from_url(&self.url)
    }
}

/// Derive the remote store's content identifier from a delivery URL.
///
/// Delivery URLs look like
/// `https://host/v1/demo/image/upload/v123/FOLDER/PROJECT/image-abcde.jpg`.
/// The identifier is everything after the `v<digits>` version segment with the
/// extension stripped. URLs without a version segment keep their last three
/// segments.
pub fn public_id_from_url(asset_url: &str) -> Result<String> {
    let parsed = Url::parse(asset_url)?;

    let segments = parsed
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| decode_segment(s, asset_url))
                .collect::<Result<Vec<String>>>()
        })
        .transpose()?
        .unwrap_or_default();

    let tail = match segments.iter().rposition(|s| is_version_segment(s)) {
        Some(pos) => &segments[pos + 1..],
        None => &segments[segments.len().saturating_sub(3)..],
    };

    // folder and stem at minimum
    if tail.len() < 2 {
        return Err(CoreError::InvalidAssetUrl(format!(
            "{} does not contain a folder and a file name",
            asset_url
        )));
    }

    let (folder, file) = tail.split_at(tail.len() - 1);
    let file = file[0].as_str();
    let stem = match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    };

    Ok(format!("{}/{}", folder.join("/"), stem))
}

/// Path segments arrive percent-encoded; public ids are stored decoded.
fn decode_segment(segment: &str, asset_url: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| {
            CoreError::InvalidAssetUrl(format!("{} has an invalid path segment: {}", asset_url, e))
        })
}

fn is_version_segment(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}
