use crate::{
    config::ExportConfig,
    error::{Result, StudioError},
    models::{GeneratedImage, OutputFormat},
    pipeline::encoder::{encode_to_target, QualityEncoder},
    traits::{Clock, SavePicker},
};
use image::{DynamicImage, RgbImage};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: OutputFormat,
    pub target_bytes: u64,
    pub ask_location: bool,
    pub output_dir: PathBuf,
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        ExportOptions {
            format: config.format,
            target_bytes: config.target_bytes(),
            ask_location: config.ask_location,
            output_dir: config.output_dir.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub mime_type: &'static str,
    pub size_bytes: u64,
    pub quality: f32,
}

pub fn suggested_filename(format: OutputFormat, millis: i64) -> String {
    format!("image-x-{}.{}", millis, format.extension())
}

/// Composites any transparency onto white; JPEG has no alpha channel.
pub fn flatten_onto_white(image: &DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image.clone();
    }
    let rgba = image.to_rgba8();
    let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let pixel = rgba.get_pixel(x, y);
        let alpha = pixel[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        image::Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])])
    });
    DynamicImage::ImageRgb8(flattened)
}

pub struct Exporter {
    encoder: Arc<dyn QualityEncoder>,
    clock: Arc<dyn Clock>,
    picker: Option<Arc<dyn SavePicker>>,
}

impl Exporter {
    pub fn new(encoder: Arc<dyn QualityEncoder>, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoder,
            clock,
            picker: None,
        }
    }

    pub fn with_picker(mut self, picker: Arc<dyn SavePicker>) -> Self {
        self.picker = Some(picker);
        self
    }

    /// Re-encodes `image` and writes it out. `Ok(None)` when the user
    /// dismissed the save dialog.
    pub async fn export(
        &self,
        image: &GeneratedImage,
        options: &ExportOptions,
    ) -> Result<Option<ExportedFile>> {
        let _timer = crate::logger::timer("export");
        let bytes = image
            .url
            .decode_bytes()
            .map_err(|e| StudioError::ExportError(format!("could not read image data: {}", e)))?;

        let encoder = Arc::clone(&self.encoder);
        let format = options.format;
        let target_bytes = options.target_bytes;
        if target_bytes > 0 && format.supports_quality() {
            log::info!("Optimizing size to {} bytes...", target_bytes);
        }

        let encoded = tokio::task::spawn_blocking(move || {
            let decoded = image::load_from_memory(&bytes)
                .map_err(|e| StudioError::ExportError(format!("could not decode image: {}", e)))?;
            let prepared = match format {
                OutputFormat::Jpeg => flatten_onto_white(&decoded),
                _ => decoded,
            };
            encode_to_target(encoder.as_ref(), &prepared, format, target_bytes)
        })
        .await
        .map_err(|e| StudioError::ExportError(format!("encoder task failed: {}", e)))??;

        let filename = suggested_filename(format, self.clock.now_millis());
        let path = match (&self.picker, options.ask_location) {
            (Some(picker), true) => {
                match picker
                    .pick(&filename, format.mime_type(), format.extension())
                    .await
                {
                    Ok(Some(path)) => path,
                    Ok(None) => {
                        log::info!("Save dialog dismissed, nothing written");
                        return Ok(None);
                    }
                    Err(e) => {
                        log::error!("Save file picker error: {}", e);
                        return Err(StudioError::ExportError(e.to_string()));
                    }
                }
            }
            _ => options.output_dir.join(&filename),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StudioError::ExportError(e.to_string()))?;
        }
        tokio::fs::write(&path, &encoded.bytes)
            .await
            .map_err(|e| StudioError::ExportError(format!("{}: {}", path.display(), e)))?;

        log::info!("💾 Image saved to: {}", path.display());
        Ok(Some(ExportedFile {
            path,
            mime_type: format.mime_type(),
            size_bytes: encoded.bytes.len() as u64,
            quality: encoded.quality,
        }))
    }
}
