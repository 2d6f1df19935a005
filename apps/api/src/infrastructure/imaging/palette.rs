use color_quant::NeuQuant;
use image::{DynamicImage, imageops::FilterType};
use std::borrow::Cow;

/// Images are downscaled to this bound before sampling.
const SAMPLE_MAX_SIDE: u32 = 256;
/// Coarsest NeuQuant sampling factor: 1 is slowest/best, 30 fastest.
const MAX_SAMPLE_FACTOR: usize = 10;
/// Pixels the network sees at least once while learning.
const MIN_TRAINING_PIXELS: usize = 4096;

/// Dominant colours of an encoded image as `#rrggbb`, most common first.
///
/// Returns at most `color_count` entries and an empty list on any failure.
pub fn extract_color_palette(image_data: &[u8], color_count: usize) -> Vec<String> {
    match image::load_from_memory(image_data) {
        Ok(img) => dominant_colors(&img, color_count),
        Err(e) => {
            tracing::warn!("Palette extraction failed: {}", e);
            Vec::new()
        }
    }
}

/// Same as [`extract_color_palette`] for an already decoded image.
pub fn dominant_colors(img: &DynamicImage, color_count: usize) -> Vec<String> {
    match try_extract(img, color_count) {
        Ok(colors) => colors,
        Err(e) => {
            tracing::warn!("Palette extraction failed: {}", e);
            Vec::new()
        }
    }
}

fn try_extract(img: &DynamicImage, color_count: usize) -> anyhow::Result<Vec<String>> {
    if color_count == 0 {
        return Ok(Vec::new());
    }
    let rgba = if img.width() > SAMPLE_MAX_SIDE || img.height() > SAMPLE_MAX_SIDE {
        img.resize(SAMPLE_MAX_SIDE, SAMPLE_MAX_SIDE, FilterType::Triangle)
            .to_rgba8()
    } else {
        img.to_rgba8()
    };

    // Fully transparent pixels carry no visible colour.
    let pixels: Vec<u8> = rgba
        .pixels()
        .filter(|p| p[3] >= 125)
        .flat_map(|p| [p[0], p[1], p[2], 255])
        .collect();
    if pixels.is_empty() {
        anyhow::bail!("image has no opaque pixels");
    }

    let (training, sample_factor) = training_set(&pixels);

    // The network needs at least two neurons to learn anything.
    let netsize = color_count.clamp(2, 256);
    let quant = NeuQuant::new(sample_factor, netsize, &training);
    let map = quant.color_map_rgb();

    let mut counts = vec![0usize; netsize];
    for px in pixels.chunks_exact(4) {
        counts[quant.index_of(px)] += 1;
    }

    let mut ranked: Vec<(usize, usize)> = counts
        .into_iter()
        .enumerate()
        .filter(|(_, count)| *count > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut colors: Vec<String> = Vec::with_capacity(color_count);
    for (idx, _) in ranked {
        let rgb = &map[idx * 3..idx * 3 + 3];
        let hex = format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]);
        if !colors.contains(&hex) {
            colors.push(hex);
        }
        if colors.len() == color_count {
            break;
        }
    }
    Ok(colors)
}

/// Pixel buffer and sampling factor that give NeuQuant at least
/// `MIN_TRAINING_PIXELS` learning steps. Small images are tiled.
fn training_set(pixels: &[u8]) -> (Cow<'_, [u8]>, i32) {
    let pixel_count = pixels.len() / 4;
    if pixel_count >= MIN_TRAINING_PIXELS {
        let factor = (pixel_count / MIN_TRAINING_PIXELS).clamp(1, MAX_SAMPLE_FACTOR);
        return (Cow::Borrowed(pixels), factor as i32);
    }
    let copies = MIN_TRAINING_PIXELS.div_ceil(pixel_count);
    (Cow::Owned(pixels.repeat(copies)), 1)
}
