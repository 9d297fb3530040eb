//! Document layout: normalized XHTML → PDF bytes.
//!
//! The fullbleed engine does the heavy lifting (CSS cascade, line breaking,
//! pagination, PDF serialization). We run a single layout pass with the
//! engine defaults — US Letter page, built-in base fonts — and keep the
//! whole document in memory. Multi-page creatives are laid out fully here;
//! the rasterizer downstream only ever looks at page 1.

use crate::error::ConversionError;
use fullbleed::FullBleed;
use tracing::debug;

/// Build a layout engine with default settings.
///
/// Construction is per-call: the pipeline holds no state across requests,
/// so there is nothing to share or pool.
pub fn build_engine() -> Result<FullBleed, ConversionError> {
    FullBleed::builder()
        .build()
        .map_err(|source| ConversionError::Render { source })
}

/// Lay out `xhtml` and serialize it to PDF bytes.
///
/// No stylesheet is passed beyond what the markup carries inline; email
/// creatives style themselves. Fails with a layout error when the engine
/// cannot place the content, and treats an empty buffer as a failure — a
/// zero-byte document would only poison the stages after it.
pub fn render(engine: &FullBleed, xhtml: &str) -> Result<Vec<u8>, ConversionError> {
    let pdf = engine
        .render_to_buffer(xhtml, "")
        .map_err(|source| ConversionError::Render { source })?;

    if pdf.is_empty() {
        return Err(ConversionError::EmptyOutput { stage: "render" });
    }

    debug!("laid out document: {} PDF bytes", pdf.len());
    Ok(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize;

    #[test]
    fn renders_simple_document() {
        let engine = build_engine().expect("engine builds with defaults");
        let xhtml = normalize::normalize("<h1>Hello</h1>");
        let pdf = render(&engine, &xhtml).expect("layout succeeds");
        assert!(pdf.starts_with(b"%PDF"), "output should be a PDF");
    }

    #[test]
    fn renders_malformed_input_after_normalization() {
        let engine = build_engine().unwrap();
        let xhtml = normalize::normalize("<div><p>text");
        assert!(render(&engine, &xhtml).is_ok());
    }
}
