//! Error types for the html2img library.
//!
//! One public error type, [`ConversionError`], covers every way the pipeline
//! can fail. The decode stage never contributes — it degrades to returning
//! its input rather than erroring — so every variant here originates in the
//! layout, rasterization, scaling, or encoding stages. Each variant keeps
//! the originating cause for diagnostics.
//!
//! Request-field validation (missing `htmlContent`, unknown format names) is
//! a transport-boundary concern and deliberately has no variant here.

use thiserror::Error;

/// All errors returned by the html2img library.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Document layout failed: the XHTML could not be laid out into a PDF.
    #[error("document layout failed: {source}")]
    Render {
        #[source]
        source: fullbleed::FullBleedError,
    },

    /// The rendered PDF could not be rasterized.
    #[error("rasterization failed: {source}")]
    Rasterize {
        #[source]
        source: fullbleed::FullBleedError,
    },

    /// The rasterized page bytes could not be decoded into a bitmap.
    #[error("rasterized page could not be decoded: {source}")]
    Bitmap {
        #[source]
        source: image::ImageError,
    },

    /// Encoding the scaled bitmap to PNG/JPEG failed.
    #[error("image encoding failed: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },

    /// A stage produced an empty buffer where output was required.
    #[error("pipeline stage '{stage}' produced no output")]
    EmptyOutput { stage: &'static str },

    /// The requested scale factor is unusable.
    #[error("scale factor must be a positive, finite number (got {scale})")]
    InvalidScale { scale: f32 },

    /// I/O failure while staging intermediate bytes or writing output.
    #[error("I/O error during conversion: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_scale_display() {
        let e = ConversionError::InvalidScale { scale: -0.5 };
        assert!(e.to_string().contains("-0.5"));
    }

    #[test]
    fn empty_output_display() {
        let e = ConversionError::EmptyOutput { stage: "rasterize" };
        assert!(e.to_string().contains("rasterize"));
    }

    #[test]
    fn io_error_carries_source() {
        use std::error::Error as _;
        let e = ConversionError::Io {
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("disk full"));
    }
}
