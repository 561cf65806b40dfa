//! Project, image, category and annotation records
//!
//! These are the relational records supplied by the storage collaborator.
//! The core treats them as immutable input; the only derived quantity is the
//! annotation area, which is recomputed from the bounding box on every read.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::asset::UploadedAsset;
use crate::error::{CoreError, Result};
use crate::types::{AnnotationId, CategoryId, ImageId, ProjectId};

/// Axis-aligned bounding box with a top-left origin, in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a validated bounding box
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        let bbox = Self {
            x,
            y,
            width,
            height,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check that all coordinates are finite and the extent is non-negative
    pub fn validate(&self) -> Result<()> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(CoreError::ValidationError(
                "Bounding box coordinates must be finite".to_string(),
            ));
        }

        if self.width < 0.0 || self.height < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Bounding box extent must be non-negative, got {}x{}",
                self.width, self.height
            )));
        }

        Ok(())
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// COCO ordering: `[x, y, width, height]`
    pub fn to_xywh(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// A bounding-box annotation drawn on one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,
    pub bbox: BoundingBox,
}

impl AnnotationRecord {
    /// Create a new annotation with a fresh id
    pub fn new(image_id: ImageId, category_id: CategoryId, bbox: BoundingBox) -> Self {
        Self {
            id: AnnotationId::new(),
            image_id,
            category_id,
            bbox,
        }
    }

    /// Area derived from the bounding box
    pub fn area(&self) -> f64 {
        self.bbox.area()
    }

    /// Annotations are never crowd regions
    pub fn is_crowd(&self) -> u8 {
        0
    }
}

/// A label category; names are lower-cased and unique within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
}

impl CategoryRecord {
    /// Create a category, normalizing its name
    pub fn new(name: impl AsRef<str>, color: impl Into<String>) -> Result<Self> {
        let name = Self::normalize_name(name.as_ref());
        if name.is_empty() {
            return Err(CoreError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: CategoryId::new(),
            name,
            color: color.into(),
        })
    }

    /// Normalized form used for storage and uniqueness checks
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

/// An uploaded image as persisted by the storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub url: String,
}

impl ImageRecord {
    /// Build the record persisted for a freshly uploaded asset
    pub fn from_uploaded(asset: UploadedAsset) -> Self {
        Self {
            id: ImageId::new(),
            filename: asset.filename,
            width: asset.width,
            height: asset.height,
            url: asset.url,
        }
    }

    /// Back to the remote-store view of this image
    pub fn to_uploaded(&self) -> UploadedAsset {
        UploadedAsset {
            url: self.url.clone(),
            filename: self.filename.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

/// An annotation project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
}

impl ProjectRecord {
    /// Create a new project
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::ValidationError(
                "Project name cannot be empty".to_string(),
            ));
        }
        if trimmed.contains('/') {
            return Err(CoreError::ValidationError(format!(
                "Project name must not contain '/': {}",
                trimmed
            )));
        }

        Ok(Self {
            id: ProjectId::new(),
            name: trimmed.to_string(),
        })
    }

    /// Remote-store folder holding this project's images
    pub fn asset_folder(&self, root_folder: &str) -> String {
        format!("{}/{}", root_folder, self.name.to_uppercase())
    }
}

/// Read-only, fully joined view of a project used to build an export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub project_name: String,
    pub images: Vec<ImageRecord>,
    pub categories: Vec<CategoryRecord>,
    pub annotations: Vec<AnnotationRecord>,
}

impl ExportSnapshot {
    /// Delivery URLs of every image, in snapshot order
    pub fn image_urls(&self) -> Vec<String> {
        self.images.iter().map(|image| image.url.clone()).collect()
    }

    /// Check referential integrity of the snapshot
    ///
    /// Every annotation must point at an image and a category that are part of
    /// the snapshot, and bounding boxes must be well formed.
    pub fn validate(&self) -> Result<()> {
        let image_ids: HashSet<ImageId> = self.images.iter().map(|i| i.id).collect();
        let category_ids: HashSet<CategoryId> = self.categories.iter().map(|c| c.id).collect();

        for annotation in &self.annotations {
            if !image_ids.contains(&annotation.image_id) {
                return Err(CoreError::MissingReference(format!(
                    "annotation {} references unknown image {}",
                    annotation.id, annotation.image_id
                )));
            }
            if !category_ids.contains(&annotation.category_id) {
                return Err(CoreError::MissingReference(format!(
                    "annotation {} references unknown category {}",
                    annotation.id, annotation.category_id
                )));
            }
            annotation.bbox.validate()?;
        }

        Ok(())
    }
}
