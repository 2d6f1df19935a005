//! Application configuration loading from environment variables.
//!
//! All configuration is read once at startup. A `.env` file in the working
//! directory is honoured through `dotenvy`.
//!
//! # Environment Variables
//!
//! ## Storage
//! - `STORAGE_BACKEND`: `filesystem` or `drive` (default: "filesystem")
//! - `DATA_DIR`: Directory holding the catalog document (default: "./data")
//! - `CATALOG_FILE_NAME`: Catalog document name (default: "graphics_data.json")
//! - `UPLOAD_DIR`: Image blob directory (default: "<DATA_DIR>/uploads")
//! - `BACKUP_DIR`: Catalog backup directory (default: "<DATA_DIR>/backups")
//! - `DRIVE_FOLDER_ID`: Root folder of the drive backend
//! - `GOOGLE_SERVICE_ACCOUNT_FILE`: Path to a service-account key file
//! - `GOOGLE_SERVICE_ACCOUNT_JSON`: Inline service-account key (takes precedence over the file)
//! - `DRIVE_API_BASE_URL`: Drive API root (default: "https://www.googleapis.com")
//! - `RETRY_MAX_ATTEMPTS`: Attempts per remote call (default: 3)
//! - `RETRY_BASE_DELAY_MS`: Linear backoff step in milliseconds (default: 1000)
//!
//! ## Analysis
//! - `PALETTE_COLOR_COUNT`: Colours extracted per image (default: 6)
//! - `RATIO_STRATEGY`: `nearest` or `reduced` (default: "nearest")
//! - `MARKETS`: Comma-separated market choices (default: "medical,education,business")
//!
//! ## Upload gate
//! - `UPLOAD_PASSWORD_HASH`: Bcrypt hash of the upload password; unset disables the gate
//! - `SESSION_SECRET`: HS256 secret for session tokens, required when the gate is enabled
//! - `SESSION_TTL_MINUTES`: Session token lifetime (default: 480)
//!
//! ## Server
//! - `RUST_LOG`: Logging level (default: "info,catalog=debug,tower_http=debug")
//! - `HOST`: Server bind address (default: "0.0.0.0")
//! - `PORT`: Server port (default: 3000)
//! - `MAX_UPLOAD_BYTES`: Request body limit (default: 20 MiB)

use crate::domain::graphic::aspect_ratio::RatioStrategy;
use crate::infrastructure::repositories::json_catalog_repository::DEFAULT_CATALOG_FILE;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Filesystem,
    Drive,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Filesystem => "filesystem",
            StorageBackend::Drive => "drive",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filesystem" | "local" => Ok(StorageBackend::Filesystem),
            "drive" | "google_drive" => Ok(StorageBackend::Drive),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Complete server configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    pub storage_backend: StorageBackend,

    /// Directory holding the catalog document
    pub data_dir: PathBuf,

    pub catalog_file_name: String,

    /// Where image blobs are written by the filesystem backend
    pub upload_dir: PathBuf,

    /// Where catalog backups are written by the filesystem backend
    pub backup_dir: PathBuf,

    /// Root folder id for the drive backend
    pub drive_folder_id: Option<String>,

    pub google_service_account_file: Option<PathBuf>,

    pub google_service_account_json: Option<String>,

    pub drive_api_base_url: String,

    pub retry_max_attempts: u32,

    pub retry_base_delay_ms: u64,

    /// Number of dominant colours kept per image
    pub palette_color_count: usize,

    pub ratio_strategy: RatioStrategy,

    /// Market values accepted by the upload form
    pub markets: Vec<String>,

    /// Bcrypt hash of the shared upload password; `None` disables the gate
    pub upload_password_hash: Option<String>,

    /// Secret for signing session tokens
    pub session_secret: Option<String>,

    pub session_ttl_minutes: i64,

    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed, or if the upload gate
    /// is enabled without a session secret.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir: PathBuf = env_or(&get, "DATA_DIR", PathBuf::from("./data"))?;
        let upload_dir = env_or(&get, "UPLOAD_DIR", data_dir.join("uploads"))?;
        let backup_dir = env_or(&get, "BACKUP_DIR", data_dir.join("backups"))?;

        let markets: Vec<String> = env_or(
            &get,
            "MARKETS",
            "medical,education,business".to_string(),
        )?
        .split(',')
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
        if markets.is_empty() {
            anyhow::bail!("MARKETS must list at least one market");
        }

        let upload_password_hash = get("UPLOAD_PASSWORD_HASH");
        let session_secret = if upload_password_hash.is_some() {
            Some(env_required(&get, "SESSION_SECRET")?)
        } else {
            get("SESSION_SECRET")
        };

        Ok(Self {
            host: env_or(&get, "HOST", "0.0.0.0".to_string())?,
            port: env_or(&get, "PORT", 3000)?,
            storage_backend: env_or(&get, "STORAGE_BACKEND", StorageBackend::Filesystem)?,
            data_dir,
            catalog_file_name: env_or(&get, "CATALOG_FILE_NAME", DEFAULT_CATALOG_FILE.to_string())?,
            upload_dir,
            backup_dir,
            drive_folder_id: get("DRIVE_FOLDER_ID"),
            google_service_account_file: get("GOOGLE_SERVICE_ACCOUNT_FILE").map(PathBuf::from),
            google_service_account_json: get("GOOGLE_SERVICE_ACCOUNT_JSON"),
            drive_api_base_url: env_or(
                &get,
                "DRIVE_API_BASE_URL",
                "https://www.googleapis.com".to_string(),
            )?,
            retry_max_attempts: env_or(&get, "RETRY_MAX_ATTEMPTS", 3)?,
            retry_base_delay_ms: env_or(&get, "RETRY_BASE_DELAY_MS", 1000)?,
            palette_color_count: env_or(&get, "PALETTE_COLOR_COUNT", 6)?,
            ratio_strategy: env_or(&get, "RATIO_STRATEGY", RatioStrategy::Nearest)?,
            markets,
            upload_password_hash,
            session_secret,
            session_ttl_minutes: env_or(&get, "SESSION_TTL_MINUTES", 480)?,
            max_upload_bytes: env_or(&get, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
        })
    }

    pub fn upload_gate_enabled(&self) -> bool {
        self.upload_password_hash.is_some()
    }
}

/// Load a required variable.
///
/// # Errors
///
/// Returns an error if the variable is not set.
fn env_required(get: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<String> {
    get(key).ok_or_else(|| anyhow::anyhow!("Missing required environment variable: {}", key))
}

/// Load a variable with a default value.
///
/// # Errors
///
/// Returns an error if the variable is set but cannot be parsed.
fn env_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", key, e)),
        None => Ok(default),
    }
}
