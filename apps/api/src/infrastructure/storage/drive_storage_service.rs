//! Remote storage backend on a hosted drive folder.

use super::retry::{RetryPolicy, with_retry};
use super::traits::{StorageService, StoredObject, backup_name};
use crate::infrastructure::drive::client::{DriveApi, DriveFile};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub const IMAGES_FOLDER: &str = "images";
pub const BACKUPS_FOLDER: &str = "backups";
const JSON_MIME_TYPE: &str = "application/json";

/// Keeps blobs in an `images` subfolder, the catalog document in the root
/// folder and backups in a `backups` subfolder. Every remote call is retried
/// according to the configured [`RetryPolicy`].
pub struct DriveStorageService {
    api: Arc<dyn DriveApi>,
    root_folder_id: String,
    retry: RetryPolicy,
    images_folder: OnceCell<String>,
    backups_folder: OnceCell<String>,
}

impl DriveStorageService {
    pub fn new(api: Arc<dyn DriveApi>, root_folder_id: String, retry: RetryPolicy) -> Self {
        Self {
            api,
            root_folder_id,
            retry,
            images_folder: OnceCell::new(),
            backups_folder: OnceCell::new(),
        }
    }

    async fn find_or_create_folder(&self, name: &str) -> anyhow::Result<String> {
        let root = self.root_folder_id.as_str();
        let existing = with_retry(&self.retry, "find_folder", || self.api.find_folder(root, name)).await?;
        if let Some(folder) = existing {
            return Ok(folder.id);
        }
        let created =
            with_retry(&self.retry, "create_folder", || self.api.create_folder(root, name)).await?;
        tracing::info!("Created drive folder '{}' ({})", name, created.id);
        Ok(created.id)
    }

    /// Creates `name` under `parent` unless a file of that name is already
    /// there. A create that timed out may still have landed, so every
    /// attempt looks before it uploads.
    async fn create_if_absent(
        &self,
        operation: &str,
        parent: &str,
        name: &str,
        data: &[u8],
        mime_type: &str,
    ) -> anyhow::Result<DriveFile> {
        let file = with_retry(&self.retry, operation, || async move {
            match self.api.find_file(parent, name).await {
                Ok(Some(existing)) => {
                    tracing::debug!("Reusing drive file {} for {}", existing.id, name);
                    Ok(existing)
                }
                Ok(None) => self.api.upload(parent, name, data.to_vec(), mime_type).await,
                Err(e) => Err(e),
            }
        })
        .await?;
        Ok(file)
    }

    async fn images_folder(&self) -> anyhow::Result<&str> {
        self.images_folder
            .get_or_try_init(|| self.find_or_create_folder(IMAGES_FOLDER))
            .await
            .map(String::as_str)
    }

    async fn backups_folder(&self) -> anyhow::Result<&str> {
        self.backups_folder
            .get_or_try_init(|| self.find_or_create_folder(BACKUPS_FOLDER))
            .await
            .map(String::as_str)
    }
}

#[async_trait]
impl StorageService for DriveStorageService {
    fn backend(&self) -> &'static str {
        "drive"
    }

    async fn probe(&self) -> anyhow::Result<String> {
        let root = self.root_folder_id.as_str();
        let folder = with_retry(&self.retry, "get_metadata", || self.api.get_metadata(root)).await?;
        let name = if folder.name.is_empty() {
            "unnamed"
        } else {
            folder.name.as_str()
        };
        Ok(format!("Drive access OK. Folder: {}", name))
    }

    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<StoredObject> {
        let folder = self.images_folder().await?;
        let file = self
            .create_if_absent("upload", folder, key, &data, content_type)
            .await?;
        tracing::debug!("Uploaded {} to drive as {}", key, file.id);
        Ok(StoredObject {
            key: key.to_string(),
            remote_id: Some(file.id),
        })
    }

    async fn download(&self, reference: &str) -> anyhow::Result<Vec<u8>> {
        Ok(with_retry(&self.retry, "download", || self.api.download(reference)).await?)
    }

    async fn read_document(&self, name: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let root = self.root_folder_id.as_str();
        let Some(file) = with_retry(&self.retry, "find_file", || self.api.find_file(root, name)).await?
        else {
            return Ok(None);
        };
        let data = with_retry(&self.retry, "download", || self.api.download(&file.id)).await?;
        Ok(Some(data))
    }

    async fn replace_document(
        &self,
        name: &str,
        data: Vec<u8>,
    ) -> anyhow::Result<Option<String>> {
        let root = self.root_folder_id.as_str();
        let existing =
            with_retry(&self.retry, "find_file", || self.api.find_file(root, name)).await?;

        let Some(existing) = existing else {
            self.create_if_absent("create_document", root, name, &data, JSON_MIME_TYPE)
                .await?;
            return Ok(None);
        };

        let previous =
            with_retry(&self.retry, "download", || self.api.download(&existing.id)).await?;
        let backups = self.backups_folder().await?;
        let backup = backup_name(name, chrono::Local::now().naive_local());
        with_retry(&self.retry, "upload_backup", || {
            self.api.upload(backups, &backup, previous.clone(), JSON_MIME_TYPE)
        })
        .await?;
        tracing::info!("Backed up {} to drive as {}", name, backup);

        with_retry(&self.retry, "update_content", || {
            self.api.update_content(&existing.id, data.clone(), JSON_MIME_TYPE)
        })
        .await?;
        Ok(Some(backup))
    }
}
