//! Repository trait for project persistence
//!
//! This module defines the ProjectRepository trait, the contract between the
//! asset pipeline and whatever relational store backs the application.

use async_trait::async_trait;
use labelforge_core::{
    AnnotationRecord, CategoryId, CategoryRecord, ExportSnapshot, ImageId, ImageRecord,
    ProjectId, ProjectRecord,
};

use crate::error::DbResult;

/// Repository trait for project, image, category and annotation records
///
/// Implementations must be thread-safe (Send + Sync) for use in async contexts.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Create a new project
    ///
    /// # Returns
    /// * `Err(DbError::AlreadyExists)` - If a project with the same name exists
    async fn create_project(&self, project: ProjectRecord) -> DbResult<ProjectRecord>;

    /// Find a project by id
    async fn find_project(&self, id: &ProjectId) -> DbResult<Option<ProjectRecord>>;

    /// Delete a project together with its images, categories and annotations
    ///
    /// # Returns
    /// * `Err(DbError::NotFound)` - If the project doesn't exist
    async fn delete_project(&self, id: &ProjectId) -> DbResult<()>;

    /// Add a category to a project
    ///
    /// The category name is stored lower-cased.
    ///
    /// # Returns
    /// * `Err(DbError::UniqueViolation)` - If the project already has a category of that name
    /// * `Err(DbError::NotFound)` - If the project doesn't exist
    async fn add_category(
        &self,
        project_id: &ProjectId,
        category: CategoryRecord,
    ) -> DbResult<CategoryRecord>;

    /// Delete a category and every annotation using it
    async fn delete_category(&self, id: &CategoryId) -> DbResult<()>;

    /// Persist uploaded images for a project, preserving their order
    async fn add_images(
        &self,
        project_id: &ProjectId,
        images: Vec<ImageRecord>,
    ) -> DbResult<Vec<ImageRecord>>;

    /// Find an image belonging to a project
    ///
    /// # Returns
    /// * `Ok(None)` - If the image doesn't exist or belongs to another project
    async fn find_image(
        &self,
        project_id: &ProjectId,
        image_id: &ImageId,
    ) -> DbResult<Option<ImageRecord>>;

    /// Delete an image and every annotation drawn on it
    async fn delete_image(&self, id: &ImageId) -> DbResult<()>;

    /// Add an annotation
    ///
    /// # Returns
    /// * `Err(DbError::ForeignKeyViolation)` - If the image or category is unknown, or
    ///   they belong to different projects
    async fn add_annotation(&self, annotation: AnnotationRecord) -> DbResult<AnnotationRecord>;

    /// File stems of every image stored for a project
    ///
    /// Used as the exclusion set when allocating new asset names.
    async fn project_image_names(&self, project_id: &ProjectId) -> DbResult<Vec<String>>;

    /// Fully joined, read-only view of a project for export
    ///
    /// # Returns
    /// * `Ok(None)` - If the project doesn't exist
    async fn export_snapshot(&self, project_id: &ProjectId) -> DbResult<Option<ExportSnapshot>>;

    /// Health check - verify repository is operational
    async fn health_check(&self) -> DbResult<()>;
}
