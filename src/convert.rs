//! The pipeline orchestrator — the crate's sole conversion entry point.
//!
//! `convert` sequences the five stages strictly in order with no branching,
//! no skipped stages, and no partial pipelines: either every stage completes
//! and a full [`ConversionResponse`] comes back, or the call fails
//! atomically with a [`ConversionError`]. The decode stage is contractually
//! infallible; everything after it can fail.
//!
//! The pipeline is synchronous and stateless. Each call builds its own
//! layout engine and buffers and drops them on return, so concurrent calls
//! are independent without locking. There is no internal timeout —
//! pathological HTML can run long, and bounding that is the caller's job.

use crate::config::ConversionRequest;
use crate::error::ConversionError;
use crate::output::{ConversionResponse, ConversionStats};
use crate::pipeline::{decode, encode, normalize, rasterize, render};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert an HTML fragment (possibly transport-encoded) to a scaled raster
/// image.
///
/// # Errors
/// Returns [`ConversionError`] when layout, rasterization, scaling, or
/// encoding fails, or when `request.scale` is not a positive finite number.
/// Decoding and normalization cannot fail.
pub fn convert(request: &ConversionRequest) -> Result<ConversionResponse, ConversionError> {
    let total_start = Instant::now();

    // Reject unusable scales before doing any work; everything downstream
    // assumes a positive, finite factor.
    if !request.scale.is_finite() || request.scale <= 0.0 {
        return Err(ConversionError::InvalidScale {
            scale: request.scale,
        });
    }

    info!(
        "starting conversion: {} chars of HTML, scale {}, format {}",
        request.html_content.len(),
        request.scale,
        request.image_format
    );

    // ── Stage 1: strip transport encodings (infallible) ──────────────────
    let decoded = decode::decode(&request.html_content);
    debug!("decoded to {} chars", decoded.len());

    // ── Stage 2: normalize to strict XHTML ───────────────────────────────
    let xhtml = normalize::normalize(&decoded);

    // ── Stage 3: lay out and serialize to PDF ────────────────────────────
    let engine = render::build_engine()?;
    let render_start = Instant::now();
    let pdf = render::render(&engine, &xhtml)?;
    let render_ms = render_start.elapsed().as_millis() as u64;

    // ── Stage 4: rasterize page 1 at the fixed internal DPI ──────────────
    let raster_start = Instant::now();
    let bitmap = rasterize::rasterize_first_page(&engine, &pdf)?;
    let raster_ms = raster_start.elapsed().as_millis() as u64;
    let (original_width, original_height) = (bitmap.width(), bitmap.height());

    // ── Stage 5: scale and encode ────────────────────────────────────────
    let encoded = encode::scale_and_encode(&bitmap, request.scale, request.image_format)?;

    let stats = ConversionStats {
        render_ms,
        raster_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "conversion complete: {}x{} → {}x{} {} ({} bytes) in {}ms",
        original_width,
        original_height,
        encoded.width,
        encoded.height,
        request.image_format,
        encoded.file_size_bytes,
        stats.total_ms
    );

    Ok(ConversionResponse {
        base64_image: encoded.base64,
        image_format: request.image_format,
        original_width,
        original_height,
        reduced_width: encoded.width,
        reduced_height: encoded.height,
        file_size_bytes: encoded.file_size_bytes,
        stats,
    })
}

/// Convert and write the decoded image bytes to `path`.
///
/// Uses an atomic write (temp name + rename) so a crash mid-write never
/// leaves a truncated image behind.
pub fn convert_to_file(
    request: &ConversionRequest,
    path: impl AsRef<Path>,
) -> Result<ConversionResponse, ConversionError> {
    let response = convert(request)?;
    let path = path.as_ref();

    let bytes = response
        .image_bytes()
        .map_err(|e| ConversionError::Internal(format!("own base64 failed to decode: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ConversionError::Io { source })?;
        }
    }

    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, &bytes).map_err(|source| ConversionError::Io { source })?;
    std::fs::rename(&tmp_path, path).map_err(|source| ConversionError::Io { source })?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_scale_fails_before_any_rendering() {
        let request = ConversionRequest::new("<p>x</p>").with_scale(-1.0);
        assert!(matches!(
            convert(&request),
            Err(ConversionError::InvalidScale { .. })
        ));
    }
}
