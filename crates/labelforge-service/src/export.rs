//! Dataset export
//!
//! Turns a project snapshot into a zip archive holding every image under
//! `images/` plus one COCO-style `annotations.json`. Image bytes are fetched
//! through the gateway in one batch; if that batch fails, no archive is
//! produced at all.

use bytes::Bytes;
use futures::stream::{self, Stream};
use labelforge_core::{CocoDocument, ExportSnapshot, ProjectId};
use labelforge_db::ProjectRepository;
use std::io::{Cursor, Write};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ServiceError, ServiceResult};
use crate::gateway::AssetGateway;

/// Name of the annotations entry inside the archive
pub const ANNOTATIONS_ENTRY: &str = "annotations.json";

/// Directory holding image entries inside the archive
pub const IMAGES_DIR: &str = "images";

/// Size of the chunks an archive is streamed in
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// A finished export archive
#[derive(Debug, Clone)]
pub struct ExportArchive {
    /// Suggested download name, `{project}_annotations.zip`
    pub filename: String,

    /// Complete zip bytes
    pub bytes: Bytes,
}

impl ExportArchive {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Stream the archive in fixed-size chunks without copying it
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send {
        let bytes = self.bytes;
        let chunks: Vec<Bytes> = (0..bytes.len())
            .step_by(STREAM_CHUNK_SIZE)
            .map(|start| bytes.slice(start..(start + STREAM_CHUNK_SIZE).min(bytes.len())))
            .collect();

        stream::iter(chunks.into_iter().map(Ok))
    }
}

/// Builds export archives for projects
pub struct DatasetExporter {
    repository: Arc<dyn ProjectRepository>,
    gateway: Arc<AssetGateway>,
}

impl DatasetExporter {
    pub fn new(repository: Arc<dyn ProjectRepository>, gateway: Arc<AssetGateway>) -> Self {
        Self {
            repository,
            gateway,
        }
    }

    /// Export a project
    ///
    /// # Errors
    /// * `ServiceError::NotFound` - If the project doesn't exist
    /// * `ServiceError::AssetStore` - If any image could not be fetched
    #[instrument(skip(self))]
    pub async fn export(&self, project_id: &ProjectId) -> ServiceResult<ExportArchive> {
        let snapshot = self
            .repository
            .export_snapshot(project_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("project {}", project_id)))?;
        snapshot.validate()?;

        let urls = snapshot.image_urls();
        let images = if urls.is_empty() {
            Vec::new()
        } else {
            self.gateway.fetch_images(&urls).await?
        };
        debug!("Fetched {} images for export", images.len());

        let document = CocoDocument::from_snapshot(&snapshot);
        let bytes = write_archive(&snapshot, images, &document)?;

        info!(
            images = snapshot.images.len(),
            annotations = snapshot.annotations.len(),
            size = bytes.len(),
            "Export archive built"
        );

        Ok(ExportArchive {
            filename: format!("{}_annotations.zip", snapshot.project_name),
            bytes,
        })
    }
}

fn write_archive(
    snapshot: &ExportSnapshot,
    images: Vec<Bytes>,
    document: &CocoDocument,
) -> ServiceResult<Bytes> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    // images are already compressed
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (record, content) in snapshot.images.iter().zip(images) {
        writer.start_file(format!("{}/{}", IMAGES_DIR, record.filename), stored)?;
        writer.write_all(&content)?;
    }

    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(ANNOTATIONS_ENTRY, deflated)?;
    writer.write_all(&document.to_pretty_json()?)?;

    let cursor = writer.finish()?;
    Ok(Bytes::from(cursor.into_inner()))
}
