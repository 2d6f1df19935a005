use crate::{
    application::upload_graphic::dto::{BusinessInput, UploadGraphicRequest},
    domain::graphic::{
        entity::{BusinessMetadata, GraphicRecord},
        errors::DomainError,
        repository::CatalogRepository,
        value_objects::{CampaignNumber, ImageExtension},
    },
    infrastructure::imaging::traits::ImageAnalyzer,
};
use chrono::SubsecRound;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Adds one image and its metadata to the catalog.
///
/// Nothing is written until the metadata has been validated, the bytes have
/// been decoded and the content hash is known to be new. The duplicate check
/// and the final save are a read-modify-write without locking.
pub struct UploadGraphicUseCase {
    repository: Arc<dyn CatalogRepository>,
    analyzer: Arc<dyn ImageAnalyzer>,
    markets: Vec<String>,
}

impl UploadGraphicUseCase {
    /// # Arguments
    /// * `repository` - Catalog document and blob persistence
    /// * `analyzer` - Extracts format, dimensions, ratio and palette
    /// * `markets` - Market values the form may submit
    pub fn new(
        repository: Arc<dyn CatalogRepository>,
        analyzer: Arc<dyn ImageAnalyzer>,
        markets: Vec<String>,
    ) -> Self {
        Self {
            repository,
            analyzer,
            markets,
        }
    }

    /// Runs the upload workflow.
    ///
    /// # Returns
    /// The record that was appended to the catalog.
    ///
    /// # Errors
    /// - `ValidationError` for bad metadata, an unsupported extension or unreadable bytes
    /// - `Duplicate` when an identical image is already catalogued
    /// - `InfrastructureError` when the catalog or blob store fails
    #[instrument(skip(self, request), fields(
        filename = %request.filename,
        market = %request.business.market,
        image_size = request.image_data.len()
    ))]
    pub async fn execute(&self, request: UploadGraphicRequest) -> Result<GraphicRecord, DomainError> {
        let business = self.validate_business(request.business)?;

        let extension = ImageExtension::from_filename(&request.filename).ok_or_else(|| {
            DomainError::ValidationError(format!(
                "Unsupported file type for '{}'. Allowed: png, jpg, jpeg, webp, gif",
                request.filename
            ))
        })?;

        let id = content_hash(&request.image_data);
        debug!("Content hash: {}", &id[..16]);

        let snapshot = self.repository.load().await?;
        if let Some(warning) = &snapshot.warning {
            warn!("Uploading into a degraded catalog: {}", warning);
        }
        let mut catalog = snapshot.catalog;
        if catalog.contains(&id) {
            warn!("Duplicate upload detected for hash: {}", &id[..16]);
            return Err(DomainError::Duplicate(id));
        }

        let technical = self
            .analyzer
            .analyze(&request.image_data, extension.as_str())
            .await
            .map_err(|e| {
                warn!("Rejecting unreadable image {}: {}", request.filename, e);
                DomainError::ValidationError(format!("File is not a readable image: {}", e))
            })?;

        let stored_filename = format!("{}.{}", id, extension.as_str());
        let stored = self
            .repository
            .store_image(
                &stored_filename,
                request.image_data.to_vec(),
                extension.content_type(),
            )
            .await?;

        let record = GraphicRecord {
            id: id.clone(),
            filename: request.filename,
            stored_filename: stored.stored_filename,
            drive_file_id: stored.remote_id,
            upload_date: chrono::Local::now().naive_local().trunc_subsecs(6),
            technical,
            business,
        };

        if !catalog.insert(record.clone()) {
            return Err(DomainError::Duplicate(id));
        }
        self.repository.save(&catalog).await.map_err(|e| {
            error!("Image {} stored but catalog save failed: {}", record.stored_filename, e);
            e
        })?;

        info!(
            "Catalogued {} as {} ({}x{}, {})",
            record.filename,
            record.id,
            record.technical.width(),
            record.technical.height(),
            record.technical.ratio
        );
        Ok(record)
    }

    fn validate_business(&self, input: BusinessInput) -> Result<BusinessMetadata, DomainError> {
        let input = BusinessInput {
            market: input.market.trim().to_string(),
            audience_type: input.audience_type.trim().to_string(),
            campaign_type: input.campaign_type.trim().to_string(),
            ctr: input.ctr,
            roas: input.roas,
            campaign_number: input
                .campaign_number
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        };
        input.validate()?;

        if !input.ctr.is_finite() || !input.roas.is_finite() {
            return Err(DomainError::ValidationError(
                "CTR and ROAS must be finite numbers".to_string(),
            ));
        }
        if !self.markets.iter().any(|m| *m == input.market) {
            return Err(DomainError::ValidationError(format!(
                "Unknown market '{}'. Allowed: {}",
                input.market,
                self.markets.join(", ")
            )));
        }
        let campaign_number = input
            .campaign_number
            .map(|n| CampaignNumber::new(n).map(|c| c.value))
            .transpose()
            .map_err(|_| {
                DomainError::ValidationError(
                    "Campaign number may only contain letters, digits, '_', '-', '/' and '.' (max 40)"
                        .to_string(),
                )
            })?;

        Ok(BusinessMetadata {
            market: input.market,
            audience_type: input.audience_type,
            campaign_type: input.campaign_type,
            ctr: input.ctr,
            roas: input.roas,
            campaign_number,
        })
    }
}

/// Hex SHA-256 of the image bytes.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
