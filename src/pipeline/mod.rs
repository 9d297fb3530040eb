//! Pipeline stages for HTML-to-image conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. the layout backend) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! decode ──▶ normalize ──▶ render ──▶ rasterize ──▶ encode
//! (strip      (strict      (layout    (page 1 at     (scale +
//!  encodings)  XHTML)       → PDF)     300 DPI)       base64)
//! ```
//!
//! 1. [`decode`]    — detect and strip transport encodings; never fails
//! 2. [`normalize`] — tolerant parse, strict XHTML re-serialization
//! 3. [`render`]    — single layout pass producing in-memory PDF bytes
//! 4. [`rasterize`] — first page only, fixed 300 DPI
//! 5. [`encode`]    — bilinear resize, PNG/JPEG encode, Base64 wrap

pub mod decode;
pub mod encode;
pub mod normalize;
pub mod rasterize;
pub mod render;
