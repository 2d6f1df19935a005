use bytes::Bytes;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

/// Business fields as submitted by the upload form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct BusinessInput {
    #[validate(length(min = 1, max = 120, message = "Market must be between 1 and 120 characters"))]
    pub market: String,

    #[validate(length(
        min = 1,
        max = 120,
        message = "Audience type must be between 1 and 120 characters"
    ))]
    pub audience_type: String,

    #[validate(length(
        min = 1,
        max = 120,
        message = "Campaign type must be between 1 and 120 characters"
    ))]
    pub campaign_type: String,

    #[validate(range(min = 0.0, message = "CTR cannot be negative"))]
    pub ctr: f64,

    #[validate(range(min = 0.0, message = "ROAS cannot be negative"))]
    pub roas: f64,

    #[ts(optional)]
    pub campaign_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadGraphicRequest {
    pub filename: String,
    pub image_data: Bytes,
    pub business: BusinessInput,
}

/// Choices offered by the upload form.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct UploadOptions {
    pub markets: Vec<String>,
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: u64,
    pub password_required: bool,
}
