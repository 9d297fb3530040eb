//! # html2img
//!
//! Convert email-style HTML fragments to scaled raster images (PNG/JPEG),
//! delivered as Base64 text.
//!
//! ## Why this crate?
//!
//! Creative-review workflows need to *see* an email or in-app creative
//! before compliance checks run against it. The HTML they hold is hostile
//! input: it may have been URL-encoded, Quoted-Printable-encoded,
//! entity-escaped, or Base64-wrapped one or more times in transit, with no
//! content-type hint, and the markup itself is frequently malformed. This
//! crate detects and strips the encoding layers, repairs the markup into
//! strict XHTML, lays it out, and hands back a picture.
//!
//! ## Pipeline Overview
//!
//! ```text
//! HTML (raw, possibly encoded N times)
//!  │
//!  ├─ 1. Decode     heuristic URL / entity / Quoted-Printable stripping
//!  ├─ 2. Normalize  tolerant parse → strict XHTML (fragments get a shell)
//!  ├─ 3. Render     single layout pass → in-memory PDF
//!  ├─ 4. Rasterize  page 1 only, fixed 300 DPI
//!  └─ 5. Encode     bilinear downscale → PNG/JPEG → Base64
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use html2img::{convert, ConversionRequest, ImageFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = ConversionRequest::new("<h1>50% off everything!</h1>")
//!         .with_scale(0.5)
//!         .with_format(ImageFormat::Png);
//!     let response = convert(&request)?;
//!     println!(
//!         "{}x{} → {}x{}, {} bytes",
//!         response.original_width, response.original_height,
//!         response.reduced_width, response.reduced_height,
//!         response.file_size_bytes,
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! * Decoding never fails — a wrong encoding guess degrades to the original
//!   text instead of blocking the render.
//! * Either all five stages complete and a full [`ConversionResponse`] is
//!   returned, or the call fails atomically with one [`ConversionError`]
//!   carrying the underlying cause.
//! * The pipeline is synchronous and shares no state across calls;
//!   concurrent use needs no locking.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `html2img` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionRequest, ImageFormat, DEFAULT_SCALE};
pub use convert::{convert, convert_to_file};
pub use error::ConversionError;
pub use output::{ConversionResponse, ConversionStats};
pub use pipeline::decode::{decode, decode_if_base64};
