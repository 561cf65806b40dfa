//! COCO-style dataset document
//!
//! The export archive carries one `annotations.json` in this shape:
//!
//! ```json
//! {
//!   "categories": [{"id": "...", "name": "car"}],
//!   "images": [{"id": "...", "filename": "image-abcde.png", "width": 640, "height": 480}],
//!   "annotations": [{"id": "...", "image_id": "...", "category_id": "...",
//!                    "iscrowd": 0, "area": 12.0, "bbox": [x, y, w, h]}]
//! }
//! ```
//!
//! Delivery URLs are deliberately absent; only derived metadata is written.

use serde::{Deserialize, Serialize};

use crate::annotation::ExportSnapshot;
use crate::error::Result;
use crate::types::{AnnotationId, CategoryId, ImageId};

/// Top-level document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoDocument {
    pub categories: Vec<CocoCategory>,
    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: ImageId,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,
    pub iscrowd: u8,
    pub area: f64,
    pub bbox: [f64; 4],
}

impl CocoDocument {
    /// Build the document from a snapshot, recomputing every area
    pub fn from_snapshot(snapshot: &ExportSnapshot) -> Self {
        let categories = snapshot
            .categories
            .iter()
            .map(|category| CocoCategory {
                id: category.id,
                name: category.name.to_lowercase(),
            })
            .collect();

        let images = snapshot
            .images
            .iter()
            .map(|image| CocoImage {
                id: image.id,
                filename: image.filename.clone(),
                width: image.width,
                height: image.height,
            })
            .collect();

        let annotations = snapshot
            .annotations
            .iter()
            .map(|annotation| CocoAnnotation {
                id: annotation.id,
                image_id: annotation.image_id,
                category_id: annotation.category_id,
                iscrowd: annotation.is_crowd(),
                area: annotation.area(),
                bbox: annotation.bbox.to_xywh(),
            })
            .collect();

        Self {
            categories,
            images,
            annotations,
        }
    }

    /// Pretty-printed UTF-8 JSON
    pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
