//! Core domain models and types for Labelforge
//!
//! This crate contains the data structures and pure domain logic shared by the
//! asset pipeline and the dataset exporter: image and annotation records,
//! remote asset descriptors, collision-free name allocation, request signing
//! for the remote content store and the COCO document model.
//!
//! Nothing in this crate performs I/O.

pub mod annotation;
pub mod asset;
pub mod coco;
pub mod error;
pub mod naming;
pub mod signature;
pub mod types;

// Re-exports for convenience
pub use annotation::{
    AnnotationRecord, BoundingBox, CategoryRecord, ExportSnapshot, ImageRecord, ProjectRecord,
};
pub use asset::{public_id_from_url, AssetRef, UploadedAsset};
pub use coco::{CocoAnnotation, CocoCategory, CocoDocument, CocoImage};
pub use error::{CoreError, Result};
pub use naming::NameAllocator;
pub use signature::{unix_timestamp, Signature, SignedRequestBuilder};
pub use types::{AnnotationId, CategoryId, ImageId, ProjectId};
