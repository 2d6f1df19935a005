use crate::{
    config::{Config, StorageBackend},
    domain::graphic::repository::CatalogRepository,
    infrastructure::{
        drive::{
            auth::{ServiceAccountKey, TokenProvider},
            client::DriveClient,
        },
        imaging::{analyzer::ImageCrateAnalyzer, traits::ImageAnalyzer},
        repositories::json_catalog_repository::JsonCatalogRepository,
        storage::{
            drive_storage_service::DriveStorageService,
            local_storage_service::LocalStorageService, retry::RetryPolicy,
            traits::StorageService,
        },
    },
    presentation::http::errors::AppError,
};
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use ts_rs::TS;

/// Outcome of the storage connection check made at startup.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct StorageStatus {
    pub backend: String,
    pub available: bool,
    pub message: String,
    /// Identity the drive backend authenticates as; share the folder with it
    #[ts(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when the storage backend could not be set up
    pub catalog: Option<Arc<dyn CatalogRepository>>,
    pub analyzer: Arc<dyn ImageAnalyzer>,
    pub storage_status: Arc<StorageStatus>,
}

impl AppState {
    /// Builds the configured storage backend and probes it once.
    ///
    /// A backend that is misconfigured or unreachable does not stop the
    /// server: catalog endpoints answer 503 and `/api/v1/status` reports why.
    pub async fn from_config(config: Config) -> Self {
        let analyzer: Arc<dyn ImageAnalyzer> = Arc::new(ImageCrateAnalyzer::new(
            config.palette_color_count,
            config.ratio_strategy,
        ));
        let backend = config.storage_backend.as_str().to_string();

        let (catalog, storage_status) = match connect_storage(&config).await {
            Ok((storage, service_account)) => match storage.probe().await {
                Ok(message) => {
                    tracing::info!("Storage backend '{}' ready: {}", backend, message);
                    let repository: Arc<dyn CatalogRepository> = Arc::new(
                        JsonCatalogRepository::new(storage, config.catalog_file_name.clone()),
                    );
                    let status = StorageStatus {
                        backend,
                        available: true,
                        message,
                        service_account,
                    };
                    (Some(repository), status)
                }
                Err(e) => {
                    tracing::error!("Storage backend '{}' failed its probe: {:#}", backend, e);
                    let status = StorageStatus {
                        backend,
                        available: false,
                        message: format!("Storage check failed: {:#}", e),
                        service_account,
                    };
                    (None, status)
                }
            },
            Err(e) => {
                tracing::error!("Storage backend '{}' is not configured: {:#}", backend, e);
                let status = StorageStatus {
                    backend,
                    available: false,
                    message: format!("Storage not configured: {:#}", e),
                    service_account: None,
                };
                (None, status)
            }
        };

        Self {
            config,
            catalog,
            analyzer,
            storage_status: Arc::new(storage_status),
        }
    }

    /// The catalog repository, or 503 when storage is unavailable.
    pub fn catalog(&self) -> Result<Arc<dyn CatalogRepository>, AppError> {
        self.catalog
            .clone()
            .ok_or_else(|| AppError::ExternalService(self.storage_status.message.clone()))
    }
}

/// Instantiates the storage backend named by the configuration, returning
/// the service-account identity for the drive backend.
async fn connect_storage(
    config: &Config,
) -> anyhow::Result<(Arc<dyn StorageService>, Option<String>)> {
    match config.storage_backend {
        StorageBackend::Filesystem => {
            let storage = LocalStorageService::new(
                config.data_dir.clone(),
                config.upload_dir.clone(),
                config.backup_dir.clone(),
            );
            Ok((Arc::new(storage), None))
        }
        StorageBackend::Drive => {
            let folder_id = config
                .drive_folder_id
                .clone()
                .context("DRIVE_FOLDER_ID is not set")?;
            let key = match (
                &config.google_service_account_json,
                &config.google_service_account_file,
            ) {
                (Some(raw), _) => ServiceAccountKey::from_json(raw)?,
                (None, Some(path)) => ServiceAccountKey::from_file(path).await?,
                (None, None) => anyhow::bail!(
                    "set GOOGLE_SERVICE_ACCOUNT_JSON or GOOGLE_SERVICE_ACCOUNT_FILE"
                ),
            };

            let http = DriveClient::default_http().context("building HTTP client")?;
            let tokens = TokenProvider::new(key, http.clone());
            let client = DriveClient::new(http, tokens, config.drive_api_base_url.clone());
            let service_account = client.service_account_email().to_string();
            let retry = RetryPolicy::new(
                config.retry_max_attempts,
                Duration::from_millis(config.retry_base_delay_ms),
            );
            let storage = DriveStorageService::new(Arc::new(client), folder_id, retry);
            Ok((Arc::new(storage), Some(service_account)))
        }
    }
}
