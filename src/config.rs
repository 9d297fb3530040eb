//! Request types for HTML-to-image conversion.
//!
//! [`ConversionRequest`] is the single caller-facing knob set. It is owned by
//! the caller for the duration of one `convert` call and never mutated by
//! the pipeline. Wire names are camelCase (`htmlContent`, `imageFormat`) so
//! REST and MCP transports can deserialize request bodies directly into it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default output scale when the caller does not specify one.
pub const DEFAULT_SCALE: f32 = 0.5;

/// Raster output format for the final encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    /// Lossless; the default. Text stays crisp, which matters for creatives
    /// that are mostly copy.
    #[default]
    #[serde(rename = "PNG")]
    Png,
    /// Lossy but smaller; no alpha channel.
    #[serde(rename = "JPEG")]
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            other => Err(format!("unknown image format '{other}' (expected PNG or JPEG)")),
        }
    }
}

/// One conversion request: the raw (possibly transport-encoded) HTML plus
/// output sizing and format.
///
/// # Example
/// ```rust
/// use html2img::{ConversionRequest, ImageFormat};
///
/// let request = ConversionRequest::new("<h1>Hello</h1>")
///     .with_scale(0.25)
///     .with_format(ImageFormat::Jpeg);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    /// Raw HTML content, possibly URL/QP/entity-encoded one or more times.
    pub html_content: String,

    /// Output scale applied to the rasterized page. Must be finite and > 0.
    ///
    /// The page is always rasterized at the fixed internal resolution first;
    /// `scale` only controls the final output size. Whether a value is in a
    /// sane range (e.g. (0, 2]) is for the transport layer to enforce.
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Output raster format.
    #[serde(default)]
    pub image_format: ImageFormat,
}

fn default_scale() -> f32 {
    DEFAULT_SCALE
}

impl ConversionRequest {
    /// Build a request with the default scale (0.5) and format (PNG).
    pub fn new(html_content: impl Into<String>) -> Self {
        Self {
            html_content: html_content.into(),
            scale: DEFAULT_SCALE,
            image_format: ImageFormat::default(),
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_on_deserialization() {
        let request: ConversionRequest =
            serde_json::from_str(r#"{"htmlContent":"<p>x</p>"}"#).unwrap();
        assert_eq!(request.html_content, "<p>x</p>");
        assert_eq!(request.scale, DEFAULT_SCALE);
        assert_eq!(request.image_format, ImageFormat::Png);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_string(&ConversionRequest::new("<p>x</p>")).unwrap();
        assert!(json.contains("\"htmlContent\""));
        assert!(json.contains("\"imageFormat\":\"PNG\""));
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("PNG".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("jpeg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!("jpg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert!("webp".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn builder_setters_chain() {
        let request = ConversionRequest::new("x")
            .with_scale(1.5)
            .with_format(ImageFormat::Jpeg);
        assert_eq!(request.scale, 1.5);
        assert_eq!(request.image_format, ImageFormat::Jpeg);
    }
}
