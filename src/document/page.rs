//! Page image decoding and normalization

use crate::config::ImageConfig;
use crate::document::DocumentError;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbImage};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// A decoded page belonging to one issue
///
/// Owned by the assembler working on that issue and dropped once the issue's
/// document is written.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Position of the page within the issue
    pub index: usize,

    pub image: RgbImage,
}

impl PageImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Decodes page image bytes and resizes them to the configured page width
///
/// The height follows the source aspect ratio. Resampling uses Lanczos3.
/// JPEG data that ends before its end-of-image marker is only accepted with
/// `tolerate_truncated` set; if the decoder still refuses it, it is retried
/// with the marker appended.
pub fn decode_page(
    index: usize,
    bytes: &[u8],
    settings: &ImageConfig,
) -> Result<PageImage, DocumentError> {
    let truncated = is_truncated_jpeg(bytes);
    if truncated && !settings.tolerate_truncated {
        return Err(DocumentError::Decode(
            "JPEG data ends before its end-of-image marker".to_string(),
        ));
    }

    let decoded = match image::load_from_memory(bytes) {
        Ok(decoded) => decoded,
        Err(first_error) => {
            let repaired = truncated
                .then(|| repair_truncated_jpeg(bytes))
                .flatten()
                .ok_or_else(|| DocumentError::Decode(first_error.to_string()))?;

            tracing::debug!("Retrying page {} as truncated JPEG", index);
            image::load_from_memory_with_format(&repaired, ImageFormat::Jpeg)
                .map_err(|_| DocumentError::Decode(first_error.to_string()))?
        }
    };

    if truncated {
        tracing::debug!("Page {} accepted with truncated JPEG data", index);
    }

    let rgb = decoded.to_rgb8();
    let (width, height) = scaled_size(rgb.width(), rgb.height(), settings.page_width)?;
    let image = imageops::resize(&rgb, width, height, FilterType::Lanczos3);

    Ok(PageImage { index, image })
}

/// Size of a `width` x `height` image scaled to `target_width`
///
/// The height is truncated like the catalog's own page renderer, but never
/// below one pixel.
pub fn scaled_size(width: u32, height: u32, target_width: u32) -> Result<(u32, u32), DocumentError> {
    if width == 0 || height == 0 {
        return Err(DocumentError::Decode(format!(
            "empty image ({}x{})",
            width, height
        )));
    }

    let scaled = (u64::from(target_width) * u64::from(height)) / u64::from(width);
    let scaled = u32::try_from(scaled.max(1))
        .map_err(|_| DocumentError::Decode(format!("page too tall ({}x{})", width, height)))?;

    Ok((target_width, scaled))
}

/// Returns true for data that starts like a JPEG but has no end-of-image marker
///
/// Entropy-coded JPEG data escapes 0xFF bytes, so 0xFF 0xD9 only appears as
/// a marker.
pub fn is_truncated_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&JPEG_SOI)
        && !bytes[JPEG_SOI.len()..]
            .windows(2)
            .any(|w| w == JPEG_EOI.as_slice())
}

/// Appends a JPEG end-of-image marker to a truncated JPEG; returns None when
/// the data is not a truncated JPEG
pub fn repair_truncated_jpeg(bytes: &[u8]) -> Option<Vec<u8>> {
    if !is_truncated_jpeg(bytes) {
        return None;
    }

    let mut repaired = Vec::with_capacity(bytes.len() + JPEG_EOI.len());
    repaired.extend_from_slice(bytes);
    repaired.extend_from_slice(&JPEG_EOI);
    Some(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_resizes_to_page_width() {
        let page = decode_page(0, &png_bytes(400, 600), &ImageConfig::default()).unwrap();
        assert_eq!(page.width(), 800);
        assert_eq!(page.height(), 1200);
    }

    #[test]
    fn test_decode_downscales() {
        let page = decode_page(3, &png_bytes(1600, 1000), &ImageConfig::default()).unwrap();
        assert_eq!(page.index, 3);
        assert_eq!((page.width(), page.height()), (800, 500));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_page(0, b"<html>not an image</html>", &ImageConfig::default());
        assert!(matches!(err, Err(DocumentError::Decode(_))));
    }

    #[test]
    fn test_scaled_size_truncates() {
        assert_eq!(scaled_size(1000, 1333, 800).unwrap(), (800, 1066));
        assert_eq!(scaled_size(10_000, 1, 800).unwrap(), (800, 1));
        assert!(scaled_size(0, 10, 800).is_err());
    }

    #[test]
    fn test_repair_truncated_jpeg() {
        let truncated = [0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        let repaired = repair_truncated_jpeg(&truncated).unwrap();
        assert!(repaired.ends_with(&JPEG_EOI));
        assert_eq!(repaired.len(), truncated.len() + 2);

        assert!(repair_truncated_jpeg(&[0xFF, 0xD8, 0x00, 0xFF, 0xD9]).is_none());
        assert!(repair_truncated_jpeg(b"\x89PNG").is_none());
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
        buf.into_inner()
    }

    fn truncated_jpeg() -> Vec<u8> {
        let full = jpeg_bytes(256, 256);
        let cut = full[..full.len() * 6 / 10].to_vec();
        assert!(is_truncated_jpeg(&cut));
        cut
    }

    #[test]
    fn test_truncated_jpeg_accepted_when_tolerated() {
        let settings = ImageConfig {
            tolerate_truncated: true,
            ..ImageConfig::default()
        };
        let page = decode_page(0, &truncated_jpeg(), &settings).unwrap();
        assert_eq!((page.width(), page.height()), (800, 800));
    }

    #[test]
    fn test_truncated_jpeg_rejected_when_not_tolerated() {
        let settings = ImageConfig {
            tolerate_truncated: false,
            ..ImageConfig::default()
        };
        let err = decode_page(0, &truncated_jpeg(), &settings);
        assert!(matches!(err, Err(DocumentError::Decode(_))));
    }

    #[test]
    fn test_complete_jpeg_accepted_when_not_tolerated() {
        let settings = ImageConfig {
            tolerate_truncated: false,
            ..ImageConfig::default()
        };
        let full = jpeg_bytes(64, 32);
        assert!(!is_truncated_jpeg(&full));
        let page = decode_page(0, &full, &settings).unwrap();
        assert_eq!((page.width(), page.height()), (800, 400));
    }

    #[test]
    fn test_truncated_garbage_still_fails() {
        let settings = ImageConfig::default();
        let err = decode_page(0, &[0xFF, 0xD8, 0x01, 0x02], &settings);
        assert!(matches!(err, Err(DocumentError::Decode(_))));
    }
}
