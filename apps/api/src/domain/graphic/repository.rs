use super::entity::{Catalog, CatalogSnapshot, GraphicRecord, StoredImage};
use super::errors::DomainError;
use async_trait::async_trait;

/// Persistence for the flat catalog document and the image blobs it references.
///
/// Implementations perform no locking: a `load` followed by `save` is a
/// read-modify-write that concurrent callers can interleave.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Reads the catalog. A missing document is an empty catalog; an
    /// unparseable one is an empty catalog with a warning.
    async fn load(&self) -> Result<CatalogSnapshot, DomainError>;

    /// Replaces the catalog document, backing up the previous content first.
    async fn save(&self, catalog: &Catalog) -> Result<(), DomainError>;

    async fn store_image(
        &self,
        stored_filename: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredImage, DomainError>;

    async fn fetch_image(&self, record: &GraphicRecord) -> Result<Vec<u8>, DomainError>;
}
