use super::palette::dominant_colors;
use super::traits::ImageAnalyzer;
use crate::domain::graphic::{aspect_ratio::RatioStrategy, entity::TechnicalMetadata};
use async_trait::async_trait;
use image::{ImageFormat, ImageReader, imageops::FilterType};
use std::io::Cursor;

/// [`ImageAnalyzer`] backed by the `image` crate and NeuQuant quantization.
pub struct ImageCrateAnalyzer {
    palette_colors: usize,
    ratio_strategy: RatioStrategy,
}

impl ImageCrateAnalyzer {
    pub fn new(palette_colors: usize, ratio_strategy: RatioStrategy) -> Self {
        Self {
            palette_colors,
            ratio_strategy,
        }
    }

    fn analyze_blocking(&self, data: &[u8], extension: &str) -> anyhow::Result<TechnicalMetadata> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader
            .format()
            .map(format_name)
            .unwrap_or_else(|| extension.to_ascii_uppercase());
        // Header-only reads accept truncated files, so decode every pixel.
        let img = reader.decode()?;
        let (width, height) = (img.width(), img.height());

        let ratio = self.ratio_strategy.classify(width, height);
        let color_palette = dominant_colors(&img, self.palette_colors);
        tracing::debug!(
            "Analyzed {} image {}x{} ratio={} palette={}",
            format,
            width,
            height,
            ratio,
            color_palette.len()
        );

        Ok(TechnicalMetadata {
            format,
            dimensions: [width, height],
            ratio,
            file_size: data.len() as u64,
            color_palette,
        })
    }
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        other => format!("{:?}", other).to_ascii_uppercase(),
    }
}

fn encode_thumbnail(data: &[u8], max_side: u32) -> anyhow::Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let thumb = if img.width() > max_side || img.height() > max_side {
        img.resize(max_side, max_side, FilterType::Triangle)
    } else {
        img
    };
    let mut buf = Cursor::new(Vec::new());
    thumb.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[async_trait]
impl ImageAnalyzer for ImageCrateAnalyzer {
    async fn analyze(&self, image_data: &[u8], extension: &str) -> anyhow::Result<TechnicalMetadata> {
        let data = image_data.to_vec();
        let extension = extension.to_string();
        let analyzer = Self::new(self.palette_colors, self.ratio_strategy);
        tokio::task::spawn_blocking(move || analyzer.analyze_blocking(&data, &extension)).await?
    }

    async fn thumbnail(&self, image_data: &[u8], max_side: u32) -> anyhow::Result<Vec<u8>> {
        let data = image_data.to_vec();
        tokio::task::spawn_blocking(move || encode_thumbnail(&data, max_side)).await?
    }
}
