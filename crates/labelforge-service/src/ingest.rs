//! Project-level image ingestion and removal
//!
//! Wraps the gateway with project bookkeeping: name allocation against the
//! project's existing images, folder selection and persistence. The remote
//! call always happens before the repository write, so a failed remote call
//! leaves stored records untouched.

use async_trait::async_trait;
use labelforge_core::{AssetRef, ImageId, ImageRecord, NameAllocator, ProjectId};
use labelforge_db::ProjectRepository;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

use crate::error::{ServiceError, ServiceResult};
use crate::gateway::AssetGateway;

/// Prefix of every allocated image name
pub const IMAGE_NAME_PREFIX: &str = "image";

/// Trait for image ingestion operations
#[async_trait]
pub trait ImageIngestService: Send + Sync {
    /// Upload files into a project and persist the resulting image records
    async fn upload_project_images(
        &self,
        project_id: &ProjectId,
        files: Vec<AssetRef>,
    ) -> ServiceResult<Vec<ImageRecord>>;

    /// Delete one image remotely, then its record and annotations
    async fn delete_project_image(
        &self,
        project_id: &ProjectId,
        image_id: &ImageId,
    ) -> ServiceResult<()>;

    /// Delete every asset of a project remotely, then the project itself
    async fn delete_project(&self, project_id: &ProjectId) -> ServiceResult<()>;
}

/// Default implementation of ImageIngestService
pub struct DefaultImageIngestService {
    repository: Arc<dyn ProjectRepository>,
    gateway: Arc<AssetGateway>,
    allocator: Mutex<NameAllocator>,
}

impl DefaultImageIngestService {
    /// Create a new ingest service
    pub fn new(repository: Arc<dyn ProjectRepository>, gateway: Arc<AssetGateway>) -> Self {
        Self::with_allocator(repository, gateway, NameAllocator::new())
    }

    /// Create an ingest service with a specific name allocator
    pub fn with_allocator(
        repository: Arc<dyn ProjectRepository>,
        gateway: Arc<AssetGateway>,
        allocator: NameAllocator,
    ) -> Self {
        Self {
            repository,
            gateway,
            allocator: Mutex::new(allocator),
        }
    }

    /// Rename every file to a fresh `image-xxxxx` name, keeping its extension
    fn assign_names(
        &self,
        mut existing: HashSet<String>,
        files: Vec<AssetRef>,
    ) -> ServiceResult<Vec<AssetRef>> {
        let mut allocator = self
            .allocator
            .lock()
            .map_err(|_| ServiceError::Internal("name allocator lock poisoned".to_string()))?;

        Ok(files
            .into_iter()
            .map(|file| {
                let name = allocator.allocate(&mut existing, IMAGE_NAME_PREFIX);
                let filename = match file.extension() {
                    Some(ext) => format!("{}.{}", name, ext),
                    None => name,
                };
                AssetRef { filename, ..file }
            })
            .collect())
    }

    fn validate_files(files: &[AssetRef]) -> ServiceResult<()> {
        if files.is_empty() {
            return Err(ServiceError::Validation("No files provided".to_string()));
        }

        for file in files {
            if !file.is_image() {
                return Err(ServiceError::Validation(format!(
                    "{} is not an image ({})",
                    file.filename, file.content_type
                )));
            }
            file.validate()?;
        }

        Ok(())
    }
}

#[async_trait]
impl ImageIngestService for DefaultImageIngestService {
    #[instrument(skip(self, files), fields(count = files.len()))]
    async fn upload_project_images(
        &self,
        project_id: &ProjectId,
        files: Vec<AssetRef>,
    ) -> ServiceResult<Vec<ImageRecord>> {
        Self::validate_files(&files)?;

        let project = self
            .repository
            .find_project(project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("project {}", project_id)))?;

        let existing: HashSet<String> = self
            .repository
            .project_image_names(project_id)
            .await?
            .into_iter()
            .collect();
        debug!("Project already holds {} images", existing.len());

        let named = self.assign_names(existing, files)?;
        let folder = self.gateway.project_folder(&project);
        let uploaded = self.gateway.upload_images(named, &folder).await?;

        let records = uploaded.into_iter().map(ImageRecord::from_uploaded).collect();
        let stored = self.repository.add_images(project_id, records).await?;

        info!("Added {} images to project {}", stored.len(), project.name);
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn delete_project_image(
        &self,
        project_id: &ProjectId,
        image_id: &ImageId,
    ) -> ServiceResult<()> {
        let image = self
            .repository
            .find_image(project_id, image_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("image {}", image_id)))?;

        self.gateway.delete_image(&image.to_uploaded()).await?;
        self.repository.delete_image(image_id).await?;

        info!("Deleted image {}", image.filename);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_project(&self, project_id: &ProjectId) -> ServiceResult<()> {
        let project = self
            .repository
            .find_project(project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("project {}", project_id)))?;

        let folder = self.gateway.project_folder(&project);
        self.gateway.delete_project_assets(&folder).await?;
        self.repository.delete_project(project_id).await?;

        info!("Deleted project {}", project.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssetStoreConfig;
    use crate::testing::MockAssetStore;
    use labelforge_core::{AnnotationRecord, BoundingBox, CategoryRecord, ProjectRecord};
    use labelforge_db::InMemoryProjectRepository;
    use std::sync::atomic::Ordering;

    struct Fixture {
        repo: Arc<InMemoryProjectRepository>,
        store: Arc<MockAssetStore>,
        service: DefaultImageIngestService,
        project: ProjectRecord,
    }

    async fn fixture(store: MockAssetStore) -> Fixture {
        let repo = Arc::new(InMemoryProjectRepository::new());
        let store = Arc::new(store);
        let gateway = Arc::new(AssetGateway::new(
            AssetStoreConfig::new("demo", "key", "secret"),
            store.clone(),
        ));
        let project = repo
            .create_project(ProjectRecord::new("Demo").unwrap())
            .await
            .unwrap();
        let service =
            DefaultImageIngestService::with_allocator(repo.clone(), gateway, NameAllocator::with_seed(9));

        Fixture {
            repo,
            store,
            service,
            project,
        }
    }

    fn png(name: &str) -> AssetRef {
        AssetRef::new(name, vec![1u8, 2, 3], "image/png")
    }

    #[tokio::test]
    async fn test_upload_allocates_names_and_persists() {
        let f = fixture(MockAssetStore::new()).await;

        let stored = f
            .service
            .upload_project_images(&f.project.id, vec![png("a.png"), png("b.jpeg")])
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert!(stored[0].filename.starts_with("image-") && stored[0].filename.ends_with(".png"));
        assert!(stored[1].filename.ends_with(".jpeg"));
        assert_ne!(stored[0].filename, stored[1].filename);
        assert_eq!((stored[0].width, stored[0].height), (10, 20));

        {
            let uploads = f.store.uploads.lock().unwrap();
            assert!(uploads.iter().all(|u| u.folder == "FASTAPI/DEMO"));
        }

        let names = f.repo.project_image_names(&f.project.id).await.unwrap();
        assert_eq!(names.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_avoids_existing_names() {
        let f = fixture(MockAssetStore::new()).await;
        let first = f
            .service
            .upload_project_images(&f.project.id, vec![png("a.png")])
            .await
            .unwrap();
        let second = f
            .service
            .upload_project_images(&f.project.id, vec![png("a.png")])
            .await
            .unwrap();

        assert_ne!(first[0].filename, second[0].filename);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images_and_empty_batches() {
        let f = fixture(MockAssetStore::new()).await;

        let err = f
            .service
            .upload_project_images(&f.project.id, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = f
            .service
            .upload_project_images(
                &f.project.id,
                vec![AssetRef::new("notes.txt", "hello", "text/plain")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(f.store.upload_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upload_to_missing_project() {
        let f = fixture(MockAssetStore::new()).await;
        let err = f
            .service
            .upload_project_images(&ProjectId::new(), vec![png("a.png")])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_upload_persists_nothing() {
        let f = fixture(MockAssetStore::new().failing_uploads()).await;

        let err = f
            .service
            .upload_project_images(&f.project.id, vec![png("a.png"), png("b.png")])
            .await
            .unwrap_err();

        assert!(err.is_asset_store());
        assert!(f.repo.project_image_names(&f.project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_project_image() {
        let f = fixture(MockAssetStore::new()).await;
        let stored = f
            .service
            .upload_project_images(&f.project.id, vec![png("a.png")])
            .await
            .unwrap();
        let category = f
            .repo
            .add_category(&f.project.id, CategoryRecord::new("cat", "#123456").unwrap())
            .await
            .unwrap();
        f.repo
            .add_annotation(AnnotationRecord::new(
                stored[0].id,
                category.id,
                BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap(),
            ))
            .await
            .unwrap();

        f.service
            .delete_project_image(&f.project.id, &stored[0].id)
            .await
            .unwrap();

        let stem = stored[0].filename.trim_end_matches(".png");
        assert_eq!(
            *f.store.destroyed.lock().unwrap(),
            vec![format!("FASTAPI/DEMO/{}", stem)]
        );
        let snapshot = f.repo.export_snapshot(&f.project.id).await.unwrap().unwrap();
        assert!(snapshot.images.is_empty());
        assert!(snapshot.annotations.is_empty());
    }

    #[tokio::test]
    async fn test_delete_image_in_project_with_spaced_name() {
        let f = fixture(MockAssetStore::new()).await;
        let project = f
            .repo
            .create_project(ProjectRecord::new("My Cats").unwrap())
            .await
            .unwrap();
        let stored = f
            .service
            .upload_project_images(&project.id, vec![png("a.png")])
            .await
            .unwrap();

        f.service
            .delete_project_image(&project.id, &stored[0].id)
            .await
            .unwrap();

        let uploaded_id = {
            let uploads = f.store.uploads.lock().unwrap();
            format!("{}/{}", uploads[0].folder, uploads[0].public_id)
        };
        let stem = stored[0].filename.trim_end_matches(".png");
        assert_eq!(uploaded_id, format!("FASTAPI/MY CATS/{}", stem));
        assert_eq!(*f.store.destroyed.lock().unwrap(), vec![uploaded_id]);
        assert!(f
            .repo
            .find_image(&project.id, &stored[0].id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_failed_remote_delete_keeps_record() {
        let f = fixture(MockAssetStore::new().with_destroy_result("not found")).await;
        let stored = f
            .service
            .upload_project_images(&f.project.id, vec![png("a.png")])
            .await
            .unwrap();

        let err = f
            .service
            .delete_project_image(&f.project.id, &stored[0].id)
            .await
            .unwrap_err();

        assert!(err.is_asset_store());
        assert!(f
            .repo
            .find_image(&f.project.id, &stored[0].id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_unknown_image() {
        let f = fixture(MockAssetStore::new()).await;
        let err = f
            .service
            .delete_project_image(&f.project.id, &ImageId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(f.store.destroyed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_project() {
        let f = fixture(MockAssetStore::new()).await;

        f.service.delete_project(&f.project.id).await.unwrap();

        assert_eq!(*f.store.prefixes.lock().unwrap(), vec!["FASTAPI/DEMO/".to_string()]);
        assert!(f.repo.find_project(&f.project.id).await.unwrap().is_none());
    }
}
