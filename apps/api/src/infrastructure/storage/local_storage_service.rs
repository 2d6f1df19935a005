//! Local filesystem storage backend.

use super::traits::{StorageService, StoredObject, backup_name};
use crate::domain::graphic::value_objects::is_stored_filename;
use anyhow::{Context, bail};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const MAX_BACKUP_SUFFIX: u32 = 1000;

/// Stores blobs and documents on local disk:
/// ```text
/// {data_dir}/graphics_data.json
/// {upload_dir}/{hash}.{ext}
/// {backup_dir}/graphics_data_backup_{timestamp}.json
/// ```
pub struct LocalStorageService {
    data_dir: PathBuf,
    upload_dir: PathBuf,
    backup_dir: PathBuf,
}

impl LocalStorageService {
    pub fn new(data_dir: PathBuf, upload_dir: PathBuf, backup_dir: PathBuf) -> Self {
        Self {
            data_dir,
            upload_dir,
            backup_dir,
        }
    }

    /// Creates the three directories if they are missing.
    pub async fn ensure_layout(&self) -> anyhow::Result<()> {
        for dir in [&self.data_dir, &self.upload_dir, &self.backup_dir] {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        Ok(())
    }

    fn document_path(&self, name: &str) -> anyhow::Result<PathBuf> {
        if !is_plain_name(name) {
            bail!("invalid document name '{}'", name);
        }
        Ok(self.data_dir.join(name))
    }

    /// Writes `contents` to a backup file that did not exist before. Names
    /// already taken within the same millisecond get a numeric suffix.
    async fn write_backup(
        &self,
        name: &str,
        contents: &[u8],
        now: chrono::NaiveDateTime,
    ) -> anyhow::Result<String> {
        fs::create_dir_all(&self.backup_dir).await?;
        let base = backup_name(name, now);
        for attempt in 0..MAX_BACKUP_SUFFIX {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                let stem = base.strip_suffix(".json").unwrap_or(&base);
                format!("{}_{}.json", stem, attempt)
            };
            let backup_path = self.backup_dir.join(&candidate);
            let opened = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&backup_path)
                .await;
            match opened {
                Ok(mut file) => {
                    file.write_all(contents).await?;
                    file.sync_all().await?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("backing up to {}", backup_path.display()));
                }
            }
        }
        bail!("no free backup name for {}", base)
    }

    fn blob_path(&self, key: &str) -> anyhow::Result<PathBuf> {
        if !is_stored_filename(key) {
            bail!("invalid blob name '{}'", key);
        }
        Ok(self.upload_dir.join(key))
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .file_name()
            .is_some_and(|f| f.to_str() == Some(name))
}

#[async_trait]
impl StorageService for LocalStorageService {
    fn backend(&self) -> &'static str {
        "filesystem"
    }

    async fn probe(&self) -> anyhow::Result<String> {
        self.ensure_layout().await?;
        let meta = fs::metadata(&self.data_dir).await?;
        if meta.permissions().readonly() {
            bail!("data directory {} is read-only", self.data_dir.display());
        }
        Ok(format!("Local storage ready at {}", self.data_dir.display()))
    }

    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> anyhow::Result<StoredObject> {
        let path = self.blob_path(key)?;
        fs::create_dir_all(&self.upload_dir).await?;
        fs::write(&path, &data)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!("Stored {} bytes at {}", data.len(), path.display());
        Ok(StoredObject {
            key: key.to_string(),
            remote_id: None,
        })
    }

    async fn download(&self, reference: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.blob_path(reference)?;
        fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))
    }

    async fn read_document(&self, name: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.document_path(name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    async fn replace_document(
        &self,
        name: &str,
        data: Vec<u8>,
    ) -> anyhow::Result<Option<String>> {
        let path = self.document_path(name)?;
        fs::create_dir_all(&self.data_dir).await?;

        let backup = match fs::read(&path).await {
            Ok(current) => {
                let backup = self
                    .write_backup(name, &current, chrono::Local::now().naive_local())
                    .await?;
                tracing::info!("Backed up {} to {}", name, backup);
                Some(backup)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };

        // The canonical path only ever holds a complete document.
        let tmp_path = self.data_dir.join(format!("{}.tmp", name));
        let mut file = fs::File::create(&tmp_path)
            .await
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("renaming {} to {}", tmp_path.display(), path.display()))?;

        Ok(backup)
    }
}
