use super::auth::TokenProvider;
use super::error::DriveError;
use async_trait::async_trait;
use reqwest::{Response, header};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// The subset of the Drive v3 files API the catalog needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DriveApi: Send + Sync {
    async fn get_metadata(&self, file_id: &str) -> Result<DriveFile, DriveError>;

    /// First non-trashed file named `name` directly inside `parent_id`.
    async fn find_file(&self, parent_id: &str, name: &str) -> Result<Option<DriveFile>, DriveError>;

    /// First non-trashed folder named `name` directly inside `parent_id`.
    async fn find_folder(&self, parent_id: &str, name: &str)
    -> Result<Option<DriveFile>, DriveError>;

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<DriveFile, DriveError>;

    async fn upload(
        &self,
        parent_id: &str,
        name: &str,
        data: Vec<u8>,
        mime_type: &str,
    ) -> Result<DriveFile, DriveError>;

    async fn update_content(
        &self,
        file_id: &str,
        data: Vec<u8>,
        mime_type: &str,
    ) -> Result<(), DriveError>;

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError>;
}

/// Drive v3 over HTTPS with service-account credentials.
pub struct DriveClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    base_url: String,
}

impl DriveClient {
    pub fn new(http: reqwest::Client, tokens: TokenProvider, base_url: impl Into<String>) -> Self {
        Self {
            http,
            tokens,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// HTTP client with the timeouts used for all drive traffic.
    pub fn default_http() -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
    }

    pub fn service_account_email(&self) -> &str {
        self.tokens.client_email()
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.base_url)
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/drive/v3/files", self.base_url)
    }

    async fn search(&self, query: String) -> Result<Option<DriveFile>, DriveError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(self.files_url())
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "1"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;
        let list: FileList = decode(check(response).await?).await?;
        Ok(list.files.into_iter().next())
    }
}

/// Escapes a value for use inside a single-quoted Drive query literal.
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

async fn check(response: Response) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DriveError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, DriveError> {
    response
        .json()
        .await
        .map_err(|e| DriveError::Decode(e.to_string()))
}

/// Builds a `multipart/related` body carrying JSON metadata and the media bytes.
fn related_body(metadata: &serde_json::Value, data: &[u8], mime_type: &str) -> (String, Vec<u8>) {
    let boundary = format!("catalog-{}", Uuid::now_v7().simple());
    let mut body = Vec::with_capacity(data.len() + 512);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    (boundary, body)
}

#[async_trait]
impl DriveApi for DriveClient {
    async fn get_metadata(&self, file_id: &str) -> Result<DriveFile, DriveError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(format!("{}/{}", self.files_url(), file_id))
            .bearer_auth(token)
            .query(&[("fields", "id,name"), ("supportsAllDrives", "true")])
            .send()
            .await?;
        decode(check(response).await?).await
    }

    async fn find_file(&self, parent_id: &str, name: &str) -> Result<Option<DriveFile>, DriveError> {
        self.search(format!(
            "name='{}' and '{}' in parents and trashed=false",
            quote(name),
            quote(parent_id)
        ))
        .await
    }

    async fn find_folder(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<Option<DriveFile>, DriveError> {
        self.search(format!(
            "name='{}' and '{}' in parents and mimeType='{}' and trashed=false",
            quote(name),
            quote(parent_id),
            FOLDER_MIME_TYPE
        ))
        .await
    }

    async fn create_folder(&self, parent_id: &str, name: &str) -> Result<DriveFile, DriveError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(self.files_url())
            .bearer_auth(token)
            .query(&[("fields", "id,name"), ("supportsAllDrives", "true")])
            .json(&json!({
                "name": name,
                "parents": [parent_id],
                "mimeType": FOLDER_MIME_TYPE,
            }))
            .send()
            .await?;
        decode(check(response).await?).await
    }

    async fn upload(
        &self,
        parent_id: &str,
        name: &str,
        data: Vec<u8>,
        mime_type: &str,
    ) -> Result<DriveFile, DriveError> {
        let token = self.tokens.access_token().await?;
        let metadata = json!({ "name": name, "parents": [parent_id] });
        let (boundary, body) = related_body(&metadata, &data, mime_type);
        let response = self
            .http
            .post(self.upload_url())
            .bearer_auth(token)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id,name"),
                ("supportsAllDrives", "true"),
            ])
            .header(
                header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await?;
        decode(check(response).await?).await
    }

    async fn update_content(
        &self,
        file_id: &str,
        data: Vec<u8>,
        mime_type: &str,
    ) -> Result<(), DriveError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .patch(format!("{}/{}", self.upload_url(), file_id))
            .bearer_auth(token)
            .query(&[("uploadType", "media"), ("supportsAllDrives", "true")])
            .header(header::CONTENT_TYPE, mime_type)
            .body(data)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, DriveError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(format!("{}/{}", self.files_url(), file_id))
            .bearer_auth(token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await?;
        let bytes = check(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
