use crate::domain::graphic::{
    entity::GraphicRecord, errors::DomainError, repository::CatalogRepository,
};
use crate::infrastructure::imaging::traits::ImageAnalyzer;
use std::sync::Arc;

/// Longest side of report thumbnails, in pixels.
pub const THUMBNAIL_MAX_SIDE: u32 = 120;

/// Single-record lookups and blob retrieval.
pub struct GetGraphicUseCase {
    repository: Arc<dyn CatalogRepository>,
    analyzer: Arc<dyn ImageAnalyzer>,
}

impl GetGraphicUseCase {
    pub fn new(repository: Arc<dyn CatalogRepository>, analyzer: Arc<dyn ImageAnalyzer>) -> Self {
        Self {
            repository,
            analyzer,
        }
    }

    pub async fn find(&self, id: &str) -> Result<GraphicRecord, DomainError> {
        let snapshot = self.repository.load().await?;
        snapshot
            .catalog
            .find(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("Graphic {}", id)))
    }

    /// Record plus the original image bytes.
    pub async fn image(&self, id: &str) -> Result<(GraphicRecord, Vec<u8>), DomainError> {
        let record = self.find(id).await?;
        let data = self.repository.fetch_image(&record).await?;
        Ok((record, data))
    }

    /// PNG thumbnail bounded by [`THUMBNAIL_MAX_SIDE`].
    pub async fn thumbnail(&self, id: &str) -> Result<Vec<u8>, DomainError> {
        let (record, data) = self.image(id).await?;
        self.analyzer
            .thumbnail(&data, THUMBNAIL_MAX_SIDE)
            .await
            .map_err(|e| {
                tracing::warn!("Thumbnail for {} failed: {}", record.id, e);
                DomainError::InfrastructureError(format!("Failed to render thumbnail: {}", e))
            })
    }
}
