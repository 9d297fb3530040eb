//! End-to-end integration tests for html2img.
//!
//! These drive the full five-stage pipeline through the public API, from raw
//! (sometimes transport-encoded) HTML all the way to decoded image bytes.
//! Everything runs in-process with no network or fixture files.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use html2img::{
    convert, convert_to_file, decode, ConversionError, ConversionRequest, ConversionResponse,
    ImageFormat, DEFAULT_SCALE,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

const PNG_SIGNATURE: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];
const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];

/// Assert the response is internally consistent: dimensions positive, the
/// reduced dimensions match the scale arithmetic, and the Base64 payload
/// decodes to exactly `file_size_bytes` bytes.
fn assert_response_consistent(response: &ConversionResponse, scale: f32, context: &str) {
    assert!(
        response.original_width > 0 && response.original_height > 0,
        "[{context}] original dimensions must be positive"
    );

    let expected_w = ((response.original_width as f64 * scale as f64).round() as u32).max(1);
    let expected_h = ((response.original_height as f64 * scale as f64).round() as u32).max(1);
    assert_eq!(
        response.reduced_width, expected_w,
        "[{context}] reduced width must be round(original × scale)"
    );
    assert_eq!(
        response.reduced_height, expected_h,
        "[{context}] reduced height must be round(original × scale)"
    );

    let bytes = response
        .image_bytes()
        .unwrap_or_else(|e| panic!("[{context}] Base64 payload must decode: {e}"));
    assert_eq!(
        bytes.len(),
        response.file_size_bytes,
        "[{context}] file_size_bytes must match the decoded payload"
    );
}

// ── Full pipeline, plain input ───────────────────────────────────────────────

#[test]
fn plain_html_defaults_to_half_scale_png() {
    let request = ConversionRequest::new("<h1>Hello</h1><p>A short creative.</p>");
    assert_eq!(request.scale, DEFAULT_SCALE);

    let response = convert(&request).expect("plain HTML must convert");
    assert_response_consistent(&response, DEFAULT_SCALE, "plain/default");

    assert_eq!(response.image_format, ImageFormat::Png);
    let bytes = response.image_bytes().unwrap();
    assert_eq!(&bytes[..4], &PNG_SIGNATURE, "default output must be PNG");
}

#[test]
fn jpeg_request_produces_jpeg_bytes() {
    let request = ConversionRequest::new("<h1>Hello</h1>").with_format(ImageFormat::Jpeg);

    let response = convert(&request).expect("JPEG conversion must succeed");
    assert_response_consistent(&response, DEFAULT_SCALE, "jpeg");

    assert_eq!(response.image_format, ImageFormat::Jpeg);
    let bytes = response.image_bytes().unwrap();
    assert_eq!(&bytes[..2], &JPEG_MAGIC, "output must be JPEG");
}

#[test]
fn custom_scale_changes_output_dimensions() {
    let html = "<h1>Scaled</h1>";
    let quarter = convert(&ConversionRequest::new(html).with_scale(0.25))
        .expect("quarter-scale conversion must succeed");
    let half = convert(&ConversionRequest::new(html).with_scale(0.5))
        .expect("half-scale conversion must succeed");

    assert_response_consistent(&quarter, 0.25, "scale=0.25");
    assert_response_consistent(&half, 0.5, "scale=0.5");

    // Same page, same DPI, so the raw raster is identical either way.
    assert_eq!(quarter.original_width, half.original_width);
    assert!(quarter.reduced_width < half.reduced_width);
}

// ── Transport-encoded input ──────────────────────────────────────────────────

#[test]
fn url_encoded_html_is_decoded_before_rendering() {
    // "<h1>Hi</h1>" URL-encoded; 8 of 23 chars are escapes, far past the
    // density heuristic.
    let request = ConversionRequest::new("%3Ch1%3EHi%3C%2Fh1%3E");

    let response = convert(&request).expect("URL-encoded HTML must convert");
    assert_response_consistent(&response, DEFAULT_SCALE, "url-encoded");
}

#[test]
fn quoted_printable_html_is_decoded_before_rendering() {
    let qp = "<h1>Ol=C3=A1 mundo</h1>";
    assert_eq!(decode(qp), "<h1>Olá mundo</h1>");

    let response =
        convert(&ConversionRequest::new(qp)).expect("Quoted-Printable HTML must convert");
    assert_response_consistent(&response, DEFAULT_SCALE, "quoted-printable");
}

#[test]
fn double_encoded_html_converges_and_renders() {
    // URL-encoded twice: each pass strips one layer.
    let once = "%3Ch1%3EHi%3C%2Fh1%3E";
    let twice = "%253Ch1%253EHi%253C%252Fh1%253E";
    assert_eq!(decode(twice), "<h1>Hi</h1>");
    assert_eq!(decode(once), decode(twice));

    let response = convert(&ConversionRequest::new(twice)).expect("double-encoded must convert");
    assert_response_consistent(&response, DEFAULT_SCALE, "double-encoded");
}

#[test]
fn entity_escaped_markup_is_unescaped() {
    let escaped = "&lt;h1&gt;Sale&lt;/h1&gt;";
    assert_eq!(decode(escaped), "<h1>Sale</h1>");

    let response = convert(&ConversionRequest::new(escaped)).expect("entity-escaped must convert");
    assert_response_consistent(&response, DEFAULT_SCALE, "entity-escaped");
}

// ── Malformed and fragment input ─────────────────────────────────────────────

#[test]
fn unclosed_tags_are_repaired_not_rejected() {
    let request = ConversionRequest::new("<div><p>unclosed paragraph<ul><li>item one");
    let response = convert(&request).expect("malformed HTML must be repaired and rendered");
    assert_response_consistent(&response, DEFAULT_SCALE, "malformed");
}

#[test]
fn bare_text_fragment_gets_a_document_shell() {
    let request = ConversionRequest::new("just some plain text, no markup at all");
    let response = convert(&request).expect("bare text must render inside a generated shell");
    assert_response_consistent(&response, DEFAULT_SCALE, "bare-text");
}

// ── Failure modes ────────────────────────────────────────────────────────────

#[test]
fn invalid_scale_is_rejected() {
    for bad in [0.0_f32, -0.5, f32::NAN, f32::INFINITY] {
        let request = ConversionRequest::new("<p>x</p>").with_scale(bad);
        assert!(
            matches!(convert(&request), Err(ConversionError::InvalidScale { .. })),
            "scale {bad} must be rejected"
        );
    }
}

// ── File output ──────────────────────────────────────────────────────────────

#[test]
fn convert_to_file_writes_the_image_bytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("creative.png");

    let request = ConversionRequest::new("<h1>On disk</h1>");
    let response = convert_to_file(&request, &path).expect("file conversion must succeed");

    let written = std::fs::read(&path).expect("output file must exist");
    assert_eq!(written.len(), response.file_size_bytes);
    assert_eq!(&written[..4], &PNG_SIGNATURE);

    // No stray temp file left behind by the atomic write.
    assert!(!dir.path().join("creative.tmp").exists());
}

// ── Serde wire format ────────────────────────────────────────────────────────

#[test]
fn response_serializes_with_camel_case_keys() {
    let request = ConversionRequest::new("<h1>Wire</h1>");
    let response = convert(&request).expect("conversion must succeed");

    let json = serde_json::to_string(&response).expect("response must serialize");
    for key in [
        "\"base64Image\"",
        "\"imageFormat\"",
        "\"originalWidth\"",
        "\"reducedWidth\"",
        "\"fileSizeBytes\"",
    ] {
        assert!(json.contains(key), "JSON must contain {key}: {json}");
    }
}
