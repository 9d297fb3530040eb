//! Rasterization: PDF bytes → first-page bitmap.
//!
//! ## Why a fixed 300 DPI?
//!
//! The rasterization resolution controls source fidelity and is deliberately
//! decoupled from the caller's `scale`, which only controls final output
//! size. Rendering at 300 DPI and downscaling afterwards keeps small text
//! legible in the reduced image; rasterizing directly at the target size
//! would alias it away. A US Letter page at 300 DPI comes out 2550 × 3300 px.
//!
//! ## Why a temp file?
//!
//! The engine's finalized-PDF raster path takes a filesystem path. A managed
//! [`NamedTempFile`] gives it one and cleans up automatically when dropped,
//! even on panic.

use crate::error::ConversionError;
use fullbleed::FullBleed;
use image::DynamicImage;
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::debug;

/// Fixed internal rasterization resolution, in dots per inch.
pub const RASTER_DPI: u32 = 300;

/// Rasterize page 1 of `pdf` at [`RASTER_DPI`].
///
/// Only the first page is ever rasterized; multi-page documents are
/// truncated by design. Fails when the buffer cannot be parsed as a PDF,
/// produces no pages, or yields a page the bitmap decoder rejects.
pub fn rasterize_first_page(
    engine: &FullBleed,
    pdf: &[u8],
) -> Result<DynamicImage, ConversionError> {
    let mut staged = NamedTempFile::new().map_err(|source| ConversionError::Io { source })?;
    staged
        .write_all(pdf)
        .and_then(|_| staged.flush())
        .map_err(|source| ConversionError::Io { source })?;

    let pages = engine
        .render_finalized_pdf_image_pages(staged.path(), RASTER_DPI)
        .map_err(|source| ConversionError::Rasterize { source })?;

    let first = pages
        .into_iter()
        .next()
        .ok_or(ConversionError::EmptyOutput { stage: "rasterize" })?;
    if first.is_empty() {
        return Err(ConversionError::EmptyOutput { stage: "rasterize" });
    }

    let bitmap =
        image::load_from_memory(&first).map_err(|source| ConversionError::Bitmap { source })?;

    debug!(
        "rasterized page 1 → {}x{} px at {} DPI",
        bitmap.width(),
        bitmap.height(),
        RASTER_DPI
    );
    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{normalize, render};

    #[test]
    fn rasterizes_rendered_document() {
        let engine = render::build_engine().unwrap();
        let pdf = render::render(&engine, &normalize::normalize("<h1>Hi</h1>")).unwrap();
        let bitmap = rasterize_first_page(&engine, &pdf).expect("rasterization succeeds");
        assert!(bitmap.width() > 0);
        assert!(bitmap.height() > 0);
    }

    #[test]
    fn corrupt_buffer_is_an_error() {
        let engine = render::build_engine().unwrap();
        let result = rasterize_first_page(&engine, b"this is not a pdf");
        assert!(result.is_err());
    }
}
