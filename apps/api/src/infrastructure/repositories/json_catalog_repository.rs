use crate::domain::graphic::{
    entity::{Catalog, CatalogSnapshot, GraphicRecord, StoredImage},
    errors::DomainError,
    repository::CatalogRepository,
};
use crate::infrastructure::storage::traits::StorageService;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Default name of the catalog document.
pub const DEFAULT_CATALOG_FILE: &str = "graphics_data.json";

/// Catalog kept as one pretty-printed JSON document next to the image blobs.
pub struct JsonCatalogRepository {
    storage: Arc<dyn StorageService>,
    document_name: String,
}

impl JsonCatalogRepository {
    pub fn new(storage: Arc<dyn StorageService>, document_name: impl Into<String>) -> Self {
        Self {
            storage,
            document_name: document_name.into(),
        }
    }
}

/// Serializes with two-space indentation, leaving non-ASCII text as-is.
pub fn to_document(catalog: &Catalog) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    catalog.serialize(&mut ser)?;
    Ok(buf)
}

#[async_trait]
impl CatalogRepository for JsonCatalogRepository {
    #[instrument(skip(self), fields(backend = self.storage.backend(), document = %self.document_name))]
    async fn load(&self) -> Result<CatalogSnapshot, DomainError> {
        let raw = self
            .storage
            .read_document(&self.document_name)
            .await
            .map_err(|e| {
                error!("Failed to read catalog document: {:#}", e);
                DomainError::InfrastructureError(format!("Failed to read catalog: {}", e))
            })?;

        let Some(raw) = raw else {
            debug!("Catalog document does not exist yet, starting empty");
            return Ok(CatalogSnapshot::default());
        };

        match serde_json::from_slice::<Catalog>(&raw) {
            Ok(catalog) => {
                debug!("Loaded catalog with {} graphics", catalog.len());
                Ok(CatalogSnapshot::new(catalog))
            }
            Err(e) => {
                warn!("Catalog document is unreadable, treating it as empty: {}", e);
                Ok(CatalogSnapshot::degraded(format!(
                    "Catalog file could not be parsed ({}); showing an empty catalog",
                    e
                )))
            }
        }
    }

    #[instrument(skip(self, catalog), fields(graphics = catalog.len()))]
    async fn save(&self, catalog: &Catalog) -> Result<(), DomainError> {
        let data = to_document(catalog).map_err(|e| {
            DomainError::InfrastructureError(format!("Failed to serialize catalog: {}", e))
        })?;

        let backup = self
            .storage
            .replace_document(&self.document_name, data)
            .await
            .map_err(|e| {
                error!("Failed to write catalog document: {:#}", e);
                DomainError::InfrastructureError(format!("Failed to save catalog: {}", e))
            })?;

        match backup {
            Some(name) => info!("Saved catalog ({} graphics), previous version in {}", catalog.len(), name),
            None => info!("Saved new catalog ({} graphics)", catalog.len()),
        }
        Ok(())
    }

    async fn store_image(
        &self,
        stored_filename: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredImage, DomainError> {
        let stored = self
            .storage
            .upload(stored_filename, data, content_type)
            .await
            .map_err(|e| {
                error!("Failed to store image {}: {:#}", stored_filename, e);
                DomainError::InfrastructureError(format!("Failed to store image: {}", e))
            })?;

        Ok(StoredImage {
            stored_filename: stored.key,
            remote_id: stored.remote_id,
        })
    }

    async fn fetch_image(&self, record: &GraphicRecord) -> Result<Vec<u8>, DomainError> {
        self.storage
            .download(record.blob_reference())
            .await
            .map_err(|e| {
                warn!("Failed to fetch image for {}: {:#}", record.id, e);
                DomainError::InfrastructureError(format!("Failed to fetch image: {}", e))
            })
    }
}
