use async_trait::async_trait;

/// Result of storing a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Name the blob was written under
    pub key: String,
    /// Backend-assigned identifier when the backend does not address blobs by name
    pub remote_id: Option<String>,
}

/// Blob and document primitives shared by the filesystem and drive backends.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Short backend name used in logs and status output.
    fn backend(&self) -> &'static str;

    /// Verifies the backend is reachable, returning a human-readable status line.
    async fn probe(&self) -> anyhow::Result<String>;

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
    -> anyhow::Result<StoredObject>;

    /// Fetches a blob by the reference returned from [`StorageService::upload`].
    async fn download(&self, reference: &str) -> anyhow::Result<Vec<u8>>;

    /// Reads a named document; `None` when it does not exist yet.
    async fn read_document(&self, name: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Backs up the current content of `name` (if any) and then replaces it.
    ///
    /// Returns the name of the backup that was written.
    async fn replace_document(&self, name: &str, data: Vec<u8>)
    -> anyhow::Result<Option<String>>;
}

/// File name used for a backup of `document_name` taken at `now`.
pub fn backup_name(document_name: &str, now: chrono::NaiveDateTime) -> String {
    let stem = document_name
        .strip_suffix(".json")
        .unwrap_or(document_name);
    format!("{}_backup_{}.json", stem, now.format("%Y-%m-%d_%H-%M-%S-%3f"))
}
