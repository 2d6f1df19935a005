use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    static ref CAMPAIGN_NUMBER_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-/.]{0,39}$").unwrap();
    static ref STORED_FILENAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[0-9a-f]{16,128}\.(png|jpg|jpeg|webp|gif)$").unwrap();
}

/// File extensions accepted by the upload form.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CampaignNumber {
    #[validate(regex(path = *CAMPAIGN_NUMBER_REGEX))]
    pub value: String,
}

impl CampaignNumber {
    pub fn new(value: String) -> Result<Self, validator::ValidationErrors> {
        let number = Self { value };
        number.validate()?;
        Ok(number)
    }
}

/// Extension of an uploaded file, lower-cased and restricted to [`ALLOWED_EXTENSIONS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageExtension(String);

impl ImageExtension {
    /// Takes the text after the last dot of `filename`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        ALLOWED_EXTENSIONS
            .contains(&ext.as_str())
            .then_some(Self(ext))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn content_type(&self) -> &'static str {
        content_type_for_extension(&self.0)
    }
}

pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// True for names produced by the upload workflow (`<hex hash>.<ext>`).
///
/// Anything else is refused before touching the filesystem.
pub fn is_stored_filename(name: &str) -> bool {
    STORED_FILENAME_REGEX.is_match(name)
}
