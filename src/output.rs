//! Result types for HTML-to-image conversion.

use crate::config::ImageFormat;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// The completed conversion: the encoded image plus its geometry.
///
/// Constructed once at the end of the pipeline and never mutated. Wire names
/// are camelCase (`base64Image`, `originalWidth`, ...) for the transport
/// layers. `reduced_width`/`reduced_height` always equal
/// `round(original × scale)`, floored at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    /// The scaled image, encoded in the requested format, as Base64 text.
    /// Guaranteed to decode to bytes a standard PNG/JPEG decoder accepts.
    pub base64_image: String,

    /// Format the image was encoded in.
    pub image_format: ImageFormat,

    /// Bitmap width at the fixed internal rasterization resolution.
    pub original_width: u32,

    /// Bitmap height at the fixed internal rasterization resolution.
    pub original_height: u32,

    /// Output width after scaling.
    pub reduced_width: u32,

    /// Output height after scaling.
    pub reduced_height: u32,

    /// Size of the encoded image in bytes (before Base64 expansion).
    pub file_size_bytes: usize,

    /// Per-stage timings, for observability at the transport layer.
    pub stats: ConversionStats,
}

impl ConversionResponse {
    /// Decode `base64_image` back into raw image bytes.
    pub fn image_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.base64_image)
    }
}

/// Wall-clock timings for the expensive pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    /// Layout + PDF serialization time.
    pub render_ms: u64,
    /// First-page rasterization time.
    pub raster_ms: u64,
    /// End-to-end pipeline time.
    pub total_ms: u64,
}
