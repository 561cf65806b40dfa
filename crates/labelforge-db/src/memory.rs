//! In-memory implementation of the project repository
//!
//! Records live behind a single `RwLock`, so every operation observes a
//! consistent state. Insertion order of images, categories and annotations is
//! preserved and is the order in which snapshots list them.

use async_trait::async_trait;
use labelforge_core::{
    AnnotationRecord, CategoryId, CategoryRecord, ExportSnapshot, ImageId, ImageRecord,
    ProjectId, ProjectRecord,
};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{DbError, DbResult};
use crate::repository::ProjectRepository;

#[derive(Debug)]
struct ProjectRow {
    record: ProjectRecord,
    categories: Vec<CategoryRecord>,
    images: Vec<ImageRecord>,
    annotations: Vec<AnnotationRecord>,
}

impl ProjectRow {
    fn new(record: ProjectRecord) -> Self {
        Self {
            record,
            categories: Vec::new(),
            images: Vec::new(),
            annotations: Vec::new(),
        }
    }

    fn has_image(&self, id: &ImageId) -> bool {
        self.images.iter().any(|image| &image.id == id)
    }

    fn has_category(&self, id: &CategoryId) -> bool {
        self.categories.iter().any(|category| &category.id == id)
    }
}

/// Project repository backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    projects: RwLock<HashMap<ProjectId, ProjectRow>>,
}

impl InMemoryProjectRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    #[instrument(skip(self, project), fields(project_name = %project.name))]
    async fn create_project(&self, project: ProjectRecord) -> DbResult<ProjectRecord> {
        let mut projects = self.projects.write().await;

        if projects.values().any(|row| row.record.name == project.name) {
            return Err(DbError::AlreadyExists(format!("project '{}'", project.name)));
        }

        debug!("Creating project {}", project.id);
        projects.insert(project.id, ProjectRow::new(project.clone()));
        Ok(project)
    }

    async fn find_project(&self, id: &ProjectId) -> DbResult<Option<ProjectRecord>> {
        let projects = self.projects.read().await;
        Ok(projects.get(id).map(|row| row.record.clone()))
    }

    #[instrument(skip(self))]
    async fn delete_project(&self, id: &ProjectId) -> DbResult<()> {
        let mut projects = self.projects.write().await;
        projects
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DbError::NotFound(format!("project {}", id)))
    }

    #[instrument(skip(self, category), fields(category_name = %category.name))]
    async fn add_category(
        &self,
        project_id: &ProjectId,
        mut category: CategoryRecord,
    ) -> DbResult<CategoryRecord> {
        let mut projects = self.projects.write().await;
        let row = projects
            .get_mut(project_id)
            .ok_or_else(|| DbError::NotFound(format!("project {}", project_id)))?;

        category.name = CategoryRecord::normalize_name(&category.name);
        if category.name.is_empty() {
            return Err(DbError::InvalidData("category name cannot be empty".to_string()));
        }
        if row.categories.iter().any(|c| c.name == category.name) {
            return Err(DbError::UniqueViolation(format!(
                "category '{}' already exists in project {}",
                category.name, project_id
            )));
        }

        row.categories.push(category.clone());
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: &CategoryId) -> DbResult<()> {
        let mut projects = self.projects.write().await;
        let row = projects
            .values_mut()
            .find(|row| row.has_category(id))
            .ok_or_else(|| DbError::NotFound(format!("category {}", id)))?;

        row.categories.retain(|category| &category.id != id);
        row.annotations.retain(|annotation| &annotation.category_id != id);
        Ok(())
    }

    #[instrument(skip(self, images), fields(count = images.len()))]
    async fn add_images(
        &self,
        project_id: &ProjectId,
        images: Vec<ImageRecord>,
    ) -> DbResult<Vec<ImageRecord>> {
        let mut projects = self.projects.write().await;
        let row = projects
            .get_mut(project_id)
            .ok_or_else(|| DbError::NotFound(format!("project {}", project_id)))?;

        row.images.extend(images.iter().cloned());
        debug!("Stored {} images for project {}", images.len(), project_id);
        Ok(images)
    }

    async fn find_image(
        &self,
        project_id: &ProjectId,
        image_id: &ImageId,
    ) -> DbResult<Option<ImageRecord>> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).and_then(|row| {
            row.images
                .iter()
                .find(|image| &image.id == image_id)
                .cloned()
        }))
    }

    #[instrument(skip(self))]
    async fn delete_image(&self, id: &ImageId) -> DbResult<()> {
        let mut projects = self.projects.write().await;
        let row = projects
            .values_mut()
            .find(|row| row.has_image(id))
            .ok_or_else(|| DbError::NotFound(format!("image {}", id)))?;

        row.images.retain(|image| &image.id != id);
        row.annotations.retain(|annotation| &annotation.image_id != id);
        Ok(())
    }

    async fn add_annotation(&self, annotation: AnnotationRecord) -> DbResult<AnnotationRecord> {
        annotation.bbox.validate()?;

        let mut projects = self.projects.write().await;
        let row = projects
            .values_mut()
            .find(|row| row.has_image(&annotation.image_id))
            .ok_or_else(|| {
                DbError::ForeignKeyViolation(format!("unknown image {}", annotation.image_id))
            })?;

        if !row.has_category(&annotation.category_id) {
            return Err(DbError::ForeignKeyViolation(format!(
                "category {} is not part of project {}",
                annotation.category_id, row.record.id
            )));
        }

        row.annotations.push(annotation.clone());
        Ok(annotation)
    }

    async fn project_image_names(&self, project_id: &ProjectId) -> DbResult<Vec<String>> {
        let projects = self.projects.read().await;
        let row = projects
            .get(project_id)
            .ok_or_else(|| DbError::NotFound(format!("project {}", project_id)))?;

        Ok(row
            .images
            .iter()
            .filter_map(|image| {
                Path::new(&image.url)
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn export_snapshot(&self, project_id: &ProjectId) -> DbResult<Option<ExportSnapshot>> {
        let projects = self.projects.read().await;
        let Some(row) = projects.get(project_id) else {
            return Ok(None);
        };

        // annotations grouped by image, in image order
        let annotations = row
            .images
            .iter()
            .flat_map(|image| {
                row.annotations
                    .iter()
                    .filter(move |annotation| annotation.image_id == image.id)
                    .cloned()
            })
            .collect();

        Ok(Some(ExportSnapshot {
            project_name: row.record.name.to_lowercase(),
            images: row.images.clone(),
            categories: row.categories.clone(),
            annotations,
        }))
    }

    async fn health_check(&self) -> DbResult<()> {
        let _ = self.projects.read().await;
        Ok(())
    }
}
