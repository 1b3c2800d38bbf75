use crate::{
    error::{Result, StudioError},
    models::OutputFormat,
};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageFormat};
use std::io::Cursor;

pub const MAX_QUALITY: f32 = 1.0;
pub const MIN_QUALITY: f32 = 0.05;
pub const PROBE_ITERATIONS: usize = 7;

/// Encodes a decoded image at a quality in `[0, 1]`. Formats without a
/// quality knob ignore it.
pub trait QualityEncoder: Send + Sync {
    fn encode(&self, image: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RasterEncoder;

pub fn quality_to_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

impl QualityEncoder for RasterEncoder {
    fn encode(&self, image: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match format {
            OutputFormat::Jpeg => {
                JpegEncoder::new_with_quality(&mut out, quality_to_percent(quality))
                    .encode_image(&image.to_rgb8())
                    .map_err(|e| StudioError::ExportError(format!("JPEG encode: {}", e)))?;
            }
            OutputFormat::Png => {
                image
                    .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
                    .map_err(|e| StudioError::ExportError(format!("PNG encode: {}", e)))?;
            }
            OutputFormat::Webp => {
                let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
                let encoder = webp::Encoder::from_image(&rgba)
                    .map_err(|e| StudioError::ExportError(format!("WebP encode: {}", e)))?;
                out.extend_from_slice(&encoder.encode(quality_to_percent(quality) as f32));
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub quality: f32,
    /// Binary search probes spent, excluding the first full-quality attempt
    /// and the floor fallback.
    pub probes: usize,
}

/// Highest-quality encoding that fits `target_bytes`, found with a fixed
/// 7-step bisection over `[MIN_QUALITY, MAX_QUALITY]`. Falls back to the
/// quality floor when nothing fits.
pub fn encode_to_target<E: QualityEncoder + ?Sized>(
    encoder: &E,
    image: &DynamicImage,
    format: OutputFormat,
    target_bytes: u64,
) -> Result<EncodedImage> {
    let full = encoder.encode(image, format, MAX_QUALITY)?;
    if !format.supports_quality() || target_bytes == 0 || full.len() as u64 <= target_bytes {
        return Ok(EncodedImage {
            bytes: full,
            quality: MAX_QUALITY,
            probes: 0,
        });
    }

    log::debug!(
        "Full quality is {} bytes, searching for <= {} bytes",
        full.len(),
        target_bytes
    );

    let mut low = MIN_QUALITY;
    let mut high = MAX_QUALITY;
    let mut best: Option<(Vec<u8>, f32)> = None;

    for _ in 0..PROBE_ITERATIONS {
        let mid = (low + high) / 2.0;
        let bytes = encoder.encode(image, format, mid)?;
        if bytes.len() as u64 <= target_bytes {
            best = Some((bytes, mid));
            low = mid;
        } else {
            high = mid;
        }
    }

    match best {
        Some((bytes, quality)) => {
            log::debug!("Settled on quality {:.3} ({} bytes)", quality, bytes.len());
            Ok(EncodedImage {
                bytes,
                quality,
                probes: PROBE_ITERATIONS,
            })
        }
        None => {
            log::warn!(
                "Target of {} bytes is unreachable, using quality floor",
                target_bytes
            );
            Ok(EncodedImage {
                bytes: encoder.encode(image, format, MIN_QUALITY)?,
                quality: MIN_QUALITY,
                probes: PROBE_ITERATIONS,
            })
        }
    }
}
