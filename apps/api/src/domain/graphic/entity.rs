use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One catalog entry: an uploaded marketing image plus its metadata.
///
/// Records are created once by the upload workflow and never mutated
/// afterwards. There is no edit or delete path.
///
/// # Invariants
/// - `id` is the hex SHA-256 of the image bytes and is unique within a catalog
/// - `stored_filename` is `<id>.<extension>` with a lower-cased extension
/// - `technical` is computed at upload time and never recomputed
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
#[ts(export)]
pub struct GraphicRecord {
    /// Content hash of the image bytes, doubling as the dedup key
    pub id: String,

    /// File name as supplied by the uploader
    pub filename: String,

    /// Name the blob was stored under
    pub stored_filename: String,

    /// Remote file identifier, only set by the drive backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub drive_file_id: Option<String>,

    /// Local time of the upload, serialized as ISO-8601 without offset
    pub upload_date: NaiveDateTime,

    pub technical: TechnicalMetadata,

    pub business: BusinessMetadata,
}

impl GraphicRecord {
    /// Reference understood by the storage backend that holds the blob.
    pub fn blob_reference(&self) -> &str {
        self.drive_file_id.as_deref().unwrap_or(&self.stored_filename)
    }

    /// Lower-cased extension of the stored blob.
    pub fn extension(&self) -> &str {
        self.stored_filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("")
    }
}

/// Image properties extracted by the server.
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
#[ts(export)]
pub struct TechnicalMetadata {
    /// Container format as reported by the decoder (e.g. "PNG", "JPEG")
    pub format: String,

    /// `[width, height]` in pixels
    pub dimensions: [u32; 2],

    /// Label of the closest standard aspect ratio
    pub ratio: String,

    /// Size of the uploaded file in bytes
    pub file_size: u64,

    /// Dominant colours as `#rrggbb`, most dominant first; empty when extraction failed
    #[serde(default)]
    pub color_palette: Vec<String>,
}

impl TechnicalMetadata {
    pub fn width(&self) -> u32 {
        self.dimensions[0]
    }

    pub fn height(&self) -> u32 {
        self.dimensions[1]
    }
}

/// Campaign data supplied by the uploader.
///
/// Older catalogs were written with Polish keys; those are accepted as
/// aliases when reading.
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
#[ts(export)]
pub struct BusinessMetadata {
    #[serde(alias = "rynek")]
    pub market: String,

    #[serde(alias = "typ_odbiorcy")]
    pub audience_type: String,

    #[serde(alias = "typ_kampanii")]
    pub campaign_type: String,

    /// Click-through rate in percent
    pub ctr: f64,

    /// Return on ad spend
    pub roas: f64,

    #[serde(
        default,
        alias = "numer_kampanii",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional)]
    pub campaign_number: Option<String>,
}

/// The persisted catalog document: `{"graphics": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, PartialEq)]
#[ts(export)]
pub struct Catalog {
    #[serde(default)]
    pub graphics: Vec<GraphicRecord>,
}

impl Catalog {
    pub fn contains(&self, id: &str) -> bool {
        self.graphics.iter().any(|g| g.id == id)
    }

    pub fn find(&self, id: &str) -> Option<&GraphicRecord> {
        self.graphics.iter().find(|g| g.id == id)
    }

    pub fn len(&self) -> usize {
        self.graphics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty()
    }

    /// Appends a record unless one with the same id already exists.
    ///
    /// Returns `false` and leaves the catalog untouched on a duplicate.
    pub fn insert(&mut self, record: GraphicRecord) -> bool {
        if self.contains(&record.id) {
            return false;
        }
        self.graphics.push(record);
        true
    }
}

/// A loaded catalog plus the warning raised while reading it, if any.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub catalog: Catalog,
    pub warning: Option<String>,
}

impl CatalogSnapshot {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            warning: None,
        }
    }

    pub fn degraded(warning: impl Into<String>) -> Self {
        Self {
            catalog: Catalog::default(),
            warning: Some(warning.into()),
        }
    }
}

/// Where an uploaded blob ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub stored_filename: String,
    pub remote_id: Option<String>,
}
