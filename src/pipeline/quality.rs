//! Post-hoc resolution audit of generated images.

use crate::{
    error::{Result, StudioError},
    models::{ImagePayload, QualityMetadata},
};
use image::ImageReader;
use std::io::Cursor;

pub const MIN_PIXELS: u64 = 1_000_000;
pub const MIN_DIMENSION: u32 = 512;

pub const PASSED_REASON: &str = "Passed Quality Check";
pub const SMALL_DIMENSIONS_REASON: &str = "Dimensions too small";
pub const LOAD_ERROR_REASON: &str = "Image Load Error";

/// Decoded byte size estimated from the base64 text length.
pub fn approximate_size(payload_len: usize) -> u64 {
    (payload_len as u64 * 3).div_ceil(4)
}

pub fn verdict(width: u32, height: u32) -> (bool, String) {
    let pixels = width as u64 * height as u64;
    if pixels < MIN_PIXELS {
        (false, format!("Low Resolution ({}x{})", width, height))
    } else if width < MIN_DIMENSION || height < MIN_DIMENSION {
        (false, SMALL_DIMENSIONS_REASON.to_string())
    } else {
        (true, PASSED_REASON.to_string())
    }
}

pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StudioError::DecodeError(e.to_string()))?
        .into_dimensions()
        .map_err(|e| StudioError::DecodeError(e.to_string()))
}

pub fn measure(payload: &ImagePayload, width: u32, height: u32) -> QualityMetadata {
    let (passed_quality_check, check_reason) = verdict(width, height);
    QualityMetadata {
        width,
        height,
        size_bytes: approximate_size(payload.len()),
        passed_quality_check,
        check_reason,
    }
}

pub fn load_error() -> QualityMetadata {
    QualityMetadata {
        width: 0,
        height: 0,
        size_bytes: 0,
        passed_quality_check: false,
        check_reason: LOAD_ERROR_REASON.to_string(),
    }
}

/// Never fails: an undecodable payload comes back as a failed check.
pub async fn audit(payload: &ImagePayload) -> QualityMetadata {
    let owned = payload.clone();
    let probed = tokio::task::spawn_blocking(move || {
        let bytes = owned.decode_bytes()?;
        probe_dimensions(&bytes)
    })
    .await;

    match probed {
        Ok(Ok((width, height))) => {
            let metadata = measure(payload, width, height);
            log::debug!(
                "Audited {}x{} image: {}",
                width,
                height,
                metadata.check_reason
            );
            metadata
        }
        Ok(Err(e)) => {
            log::warn!("Quality audit could not decode image: {}", e);
            load_error()
        }
        Err(e) => {
            log::warn!("Quality audit task failed: {}", e);
            load_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png_payload(width: u32, height: u32) -> ImagePayload {
        let mut bytes = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImagePayload::from_bytes("image/png", &bytes)
    }

    #[test]
    fn test_verdict_boundaries() {
        assert_eq!(verdict(1000, 1000), (true, PASSED_REASON.to_string()));
        assert_eq!(verdict(1200, 1200).0, true);

        let (passed, reason) = verdict(999, 1000);
        assert!(!passed);
        assert_eq!(reason, "Low Resolution (999x1000)");

        let (passed, reason) = verdict(2000, 400);
        assert!(!passed);
        assert!(reason.starts_with("Low Resolution"));

        assert!(!verdict(600, 600).0);
    }

    #[test]
    fn test_wide_strip_fails_on_dimension() {
        let (passed, reason) = verdict(4000, 300);
        assert!(!passed);
        assert_eq!(reason, SMALL_DIMENSIONS_REASON);
    }

    #[test]
    fn test_approximate_size_rounds_up() {
        assert_eq!(approximate_size(4), 3);
        assert_eq!(approximate_size(5), 4);
        assert_eq!(approximate_size(0), 0);
    }

    #[tokio::test]
    async fn test_audit_decodes_dimensions() {
        let payload = png_payload(1000, 1000);
        let metadata = audit(&payload).await;
        assert_eq!((metadata.width, metadata.height), (1000, 1000));
        assert!(metadata.passed_quality_check);
        assert_eq!(metadata.size_bytes, approximate_size(payload.len()));

        let metadata = audit(&png_payload(600, 600)).await;
        assert!(!metadata.passed_quality_check);
        assert_eq!(metadata.check_reason, "Low Resolution (600x600)");
    }

    #[tokio::test]
    async fn test_audit_undecodable_payload() {
        let payload = ImagePayload::from_bytes("image/png", b"definitely not a png");
        assert_eq!(audit(&payload).await, load_error());

        let garbage = ImagePayload::from_base64(None, "%%%");
        let metadata = audit(&garbage).await;
        assert_eq!(metadata.check_reason, LOAD_ERROR_REASON);
        assert_eq!(metadata.size_bytes, 0);
    }
}
