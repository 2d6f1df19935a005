use crate::infrastructure::storage::retry::Transient;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("drive request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("drive returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("drive authentication failed: {0}")]
    Auth(String),

    #[error("unexpected drive response: {0}")]
    Decode(String),
}

impl Transient for DriveError {
    fn is_transient(&self) -> bool {
        match self {
            DriveError::Http(err) => {
                if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
                    return true;
                }
                let text = err.to_string().to_ascii_lowercase();
                ["ssl", "tls", "connection reset", "broken pipe", "eof"]
                    .iter()
                    .any(|needle| text.contains(needle))
            }
            DriveError::Status { status, .. } => {
                matches!(status, 408 | 429 | 500..=599)
            }
            DriveError::Auth(_) | DriveError::Decode(_) => false,
        }
    }
}
