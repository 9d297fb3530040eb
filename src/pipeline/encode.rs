//! Scaling and encoding: bitmap → base64 PNG/JPEG.
//!
//! ## Why bilinear with the quality knobs on?
//!
//! Output is always smaller than the 300-DPI source, and downscaling with a
//! filtered (antialiased) resampler preserves text edges that nearest-
//! neighbour would shred. That is an explicit trade of speed for fidelity —
//! reviewers read these images.

use crate::config::ImageFormat;
use crate::error::ConversionError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// The scaled-and-encoded image plus the metadata the response reports.
#[derive(Debug)]
pub struct EncodedImage {
    /// Base64 text of the encoded image bytes.
    pub base64: String,
    /// Output width after scaling (min 1).
    pub width: u32,
    /// Output height after scaling (min 1).
    pub height: u32,
    /// Encoded size in bytes, before Base64 expansion.
    pub file_size_bytes: usize,
}

/// Resize `bitmap` by `scale` and encode it in `format` as Base64.
///
/// Output dimensions are `round(dimension × scale)`, floored at 1×1 so a
/// tiny scale can never produce a zero-area image. The JPEG path flattens to
/// RGB first — JPEG has no alpha channel and the encoder rejects RGBA.
pub fn scale_and_encode(
    bitmap: &DynamicImage,
    scale: f32,
    format: ImageFormat,
) -> Result<EncodedImage, ConversionError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ConversionError::InvalidScale { scale });
    }

    let width = scaled_dimension(bitmap.width(), scale);
    let height = scaled_dimension(bitmap.height(), scale);

    let resized = bitmap.resize_exact(width, height, FilterType::Triangle);

    let mut buf = Vec::new();
    match format {
        ImageFormat::Png => resized
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|source| ConversionError::Encode { source })?,
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8())
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .map_err(|source| ConversionError::Encode { source })?,
    }

    if buf.is_empty() {
        return Err(ConversionError::EmptyOutput { stage: "encode" });
    }

    debug!(
        "encoded {}x{} {} → {} bytes",
        width,
        height,
        format,
        buf.len()
    );

    Ok(EncodedImage {
        base64: STANDARD.encode(&buf),
        width,
        height,
        file_size_bytes: buf.len(),
    })
}

/// `round(dimension × scale)`, floored at 1.
fn scaled_dimension(dimension: u32, scale: f32) -> u32 {
    let scaled = (dimension as f64 * scale as f64).round() as u32;
    scaled.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid_bitmap(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 40, 40, 255]),
        ))
    }

    #[test]
    fn scale_arithmetic_matches_contract() {
        // US Letter at 300 DPI, halved
        let encoded = scale_and_encode(&solid_bitmap(2550, 3300), 0.5, ImageFormat::Png).unwrap();
        assert_eq!(encoded.width, 1275);
        assert_eq!(encoded.height, 1650);
    }

    #[test]
    fn odd_dimensions_round_not_truncate() {
        let encoded = scale_and_encode(&solid_bitmap(101, 33), 0.5, ImageFormat::Png).unwrap();
        assert_eq!(encoded.width, 51); // round(50.5), not 50
        assert_eq!(encoded.height, 17); // round(16.5)
    }

    #[test]
    fn tiny_scale_floors_at_one_pixel() {
        let encoded = scale_and_encode(&solid_bitmap(40, 40), 0.001, ImageFormat::Png).unwrap();
        assert_eq!(encoded.width, 1);
        assert_eq!(encoded.height, 1);
    }

    #[test]
    fn png_bytes_have_png_signature() {
        let encoded = scale_and_encode(&solid_bitmap(16, 16), 1.0, ImageFormat::Png).unwrap();
        let bytes = STANDARD.decode(&encoded.base64).unwrap();
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(bytes.len(), encoded.file_size_bytes);
    }

    #[test]
    fn jpeg_bytes_have_jpeg_magic() {
        let encoded = scale_and_encode(&solid_bitmap(16, 16), 1.0, ImageFormat::Jpeg).unwrap();
        let bytes = STANDARD.decode(&encoded.base64).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let bitmap = solid_bitmap(8, 8);
        assert!(matches!(
            scale_and_encode(&bitmap, 0.0, ImageFormat::Png),
            Err(ConversionError::InvalidScale { .. })
        ));
        assert!(matches!(
            scale_and_encode(&bitmap, -1.0, ImageFormat::Png),
            Err(ConversionError::InvalidScale { .. })
        ));
        assert!(matches!(
            scale_and_encode(&bitmap, f32::NAN, ImageFormat::Png),
            Err(ConversionError::InvalidScale { .. })
        ));
    }

    #[test]
    fn upscale_is_allowed() {
        let encoded = scale_and_encode(&solid_bitmap(10, 10), 2.0, ImageFormat::Png).unwrap();
        assert_eq!(encoded.width, 20);
        assert_eq!(encoded.height, 20);
    }
}
