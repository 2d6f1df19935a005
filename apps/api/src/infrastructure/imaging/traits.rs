use crate::domain::graphic::entity::TechnicalMetadata;
use async_trait::async_trait;

#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Reads format, dimensions and palette from raw image bytes.
    ///
    /// Fails only when the bytes are not a readable image; palette problems
    /// degrade to an empty palette.
    async fn analyze(&self, image_data: &[u8], extension: &str) -> anyhow::Result<TechnicalMetadata>;

    /// PNG thumbnail that fits within `max_side` pixels.
    async fn thumbnail(&self, image_data: &[u8], max_side: u32) -> anyhow::Result<Vec<u8>>;
}
