//! Transport-encoding detection and decoding.
//!
//! ## Why heuristic detection?
//!
//! Creative HTML arrives from upstream review systems with no content-type
//! hint, and has often been URL-encoded, Quoted-Printable-encoded, or
//! entity-escaped one or more times in transit (sometimes several layers
//! deep). The decoder sniffs each layer with cheap regex/ratio checks and
//! peels them off until the text stops changing.
//!
//! ## Why is decoding infallible?
//!
//! A wrong guess here must never block rendering — decoding is advisory, not
//! authoritative. Every decode path degrades instead of erroring: invalid
//! UTF-8 falls back to ISO-8859-1, and escape sequences that fail to parse
//! are copied through literally. The worst case is that the original text
//! reaches the renderer unchanged.
//!
//! ## Ordering and thresholds
//!
//! Each pass applies URL → entities → Quoted-Printable, in that order, for at
//! most 5 passes. The detection thresholds (URL ratio 0.05, QP ratio 0.02)
//! are empirically tuned constants carried over from production behaviour;
//! do not re-derive them.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

/// Hard cap on decode passes; nested encodings deeper than this are left as-is.
const MAX_DECODE_PASSES: usize = 5;

/// A pass counts as URL-encoded when `%XX` escapes cover ≥ 5% of the text.
const URL_RATIO_THRESHOLD: f64 = 0.05;

/// A pass counts as Quoted-Printable when `=XX` escapes cover ≥ 2% of the text.
const QP_RATIO_THRESHOLD: f64 = 0.02;

/// Minimum length before a payload is even considered Base64.
const BASE64_MIN_LEN: usize = 20;

/// Reject a Base64 decode when more than 10% of the result is control noise.
const CONTROL_CHAR_CUTOFF: f64 = 0.10;

static RE_URL_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"%[0-9A-Fa-f]{2}").unwrap());
static RE_QP_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"=[0-9A-Fa-f]{2}").unwrap());
static RE_QP_SOFT_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"=\r?\n").unwrap());
static RE_BASE64_ALPHABET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").unwrap());

/// Explicit Quoted-Printable markers; any one of these is decisive on its own.
const QP_MARKERS: [&str; 4] = ["=3D", "=0A", "=0D", "=20"];

/// Entity markers that trigger the HTML-unescape stage.
const ENTITY_MARKERS: [&str; 6] = ["&lt;", "&gt;", "&amp;", "&quot;", "&apos;", "&#"];

/// Strip every detected transport encoding from `input`.
///
/// Runs up to [`MAX_DECODE_PASSES`] passes of URL → entity → Quoted-Printable
/// decoding and stops early once a pass is a no-op. Never fails; see the
/// module docs for the degradation rules.
pub fn decode(input: &str) -> String {
    let mut current = input.to_string();

    for pass in 0..MAX_DECODE_PASSES {
        let next = decode_pass(&current);
        if next == current {
            trace!("decode converged after {} pass(es)", pass);
            break;
        }
        current = next;
    }

    current
}

/// One detection/decode sweep over the text.
fn decode_pass(input: &str) -> String {
    let mut text = input.to_string();

    if url_escape_ratio(&text) >= URL_RATIO_THRESHOLD {
        debug!("URL-encoding detected (ratio ≥ {})", URL_RATIO_THRESHOLD);
        text = decode_url(&text);
    }

    if ENTITY_MARKERS.iter().any(|m| text.contains(m)) {
        debug!("HTML entities detected");
        text = decode_entities(&text);
    }

    if looks_quoted_printable(&text) {
        debug!("Quoted-Printable detected");
        text = decode_quoted_printable(&text);
    }

    text
}

// ── URL decoding ─────────────────────────────────────────────────────────

/// Fraction of the text covered by `%XX` escapes (each escape spans 3 chars).
fn url_escape_ratio(input: &str) -> f64 {
    if input.is_empty() {
        return 0.0;
    }
    let escaped = RE_URL_ESCAPE.find_iter(input).count() * 3;
    escaped as f64 / input.len() as f64
}

/// Percent-decode `input`. `+` becomes a space; a `%` not followed by two hex
/// digits is copied through literally rather than aborting the decode.
fn decode_url(input: &str) -> String {
    let raw = input.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        match raw[i] {
            b'%' if i + 2 < raw.len() => match hex_pair(raw[i + 1], raw[i + 2]) {
                Some(byte) => {
                    bytes.push(byte);
                    i += 3;
                }
                None => {
                    bytes.push(b'%');
                    i += 1;
                }
            },
            b'+' => {
                bytes.push(b' ');
                i += 1;
            }
            other => {
                bytes.push(other);
                i += 1;
            }
        }
    }

    bytes_to_text(bytes)
}

/// Decode two ASCII hex digits into a byte.
fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Interpret decoded bytes as UTF-8, retrying as ISO-8859-1 on failure.
///
/// Email tooling predating UTF-8 ubiquity still emits Latin-1 percent and QP
/// escapes; decoding them as Latin-1 recovers readable text instead of
/// replacement characters.
fn bytes_to_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => encoding_rs::mem::decode_latin1(err.as_bytes()).into_owned(),
    }
}

// ── HTML entity decoding ─────────────────────────────────────────────────

/// Unescape the common named entities plus numeric (`&#NN;` / `&#xNN;`)
/// references. Unknown entities are copied through untouched so that a stray
/// `&` in prose never derails the decode.
fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        // Entities are short; cap the scan so a lone '&' costs nothing.
        // Byte-level search keeps multibyte text after the '&' safe to slice.
        let semi = rest.bytes().take(12).position(|b| b == b';');
        match semi {
            Some(end) => {
                let name = &rest[1..end];
                match resolve_entity(name) {
                    Some(ch) => {
                        out.push(ch);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{A0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}

// ── Quoted-Printable decoding ────────────────────────────────────────────

/// True when any explicit QP marker, a soft line break, or a high enough
/// `=XX` escape density is present.
fn looks_quoted_printable(input: &str) -> bool {
    if QP_MARKERS.iter().any(|m| input.contains(m)) {
        return true;
    }
    if RE_QP_SOFT_BREAK.is_match(input) {
        return true;
    }
    if input.is_empty() {
        return false;
    }
    let escaped = RE_QP_ESCAPE.find_iter(input).count() * 3;
    escaped as f64 / input.len() as f64 >= QP_RATIO_THRESHOLD
}

/// Decode Quoted-Printable: strip soft line breaks, then replace each `=XX`
/// hex escape with its byte. An `=` not followed by two hex digits is copied
/// through literally (the byte-by-byte fallback strict decoders lack), and
/// non-UTF-8 results retry as ISO-8859-1.
fn decode_quoted_printable(input: &str) -> String {
    let unfolded = RE_QP_SOFT_BREAK.replace_all(input, "");
    let raw = unfolded.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        match raw[i] {
            b'=' if i + 2 < raw.len() => match hex_pair(raw[i + 1], raw[i + 2]) {
                Some(byte) => {
                    bytes.push(byte);
                    i += 3;
                }
                None => {
                    bytes.push(b'=');
                    i += 1;
                }
            },
            other => {
                bytes.push(other);
                i += 1;
            }
        }
    }

    bytes_to_text(bytes)
}

// ── Base64 (standalone, for non-HTML payloads) ───────────────────────────

/// Decode `input` if it plausibly is a Base64 payload, otherwise return it
/// unchanged.
///
/// Applies only when the trimmed text is at least [`BASE64_MIN_LEN`] chars,
/// a multiple of 4 long, and drawn from the Base64 alphabet. After decoding,
/// the result is rejected (and the original kept) when more than 10% of its
/// characters are control characters outside `\n`, `\r`, `\t` — this guards
/// against mangling plain text that merely looks like Base64.
pub fn decode_if_base64(input: &str) -> String {
    let stripped = input.trim();

    if stripped.len() < BASE64_MIN_LEN || stripped.len() % 4 != 0 {
        return input.to_string();
    }
    if !RE_BASE64_ALPHABET.is_match(stripped) {
        return input.to_string();
    }

    let decoded = match STANDARD.decode(stripped) {
        Ok(bytes) => bytes,
        Err(_) => return input.to_string(),
    };
    let text = match String::from_utf8(decoded) {
        Ok(text) => text,
        Err(_) => return input.to_string(),
    };

    let total = text.chars().count();
    if total == 0 {
        return input.to_string();
    }
    let control = text
        .chars()
        .filter(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        .count();
    if control as f64 / total as f64 > CONTROL_CHAR_CUTOFF {
        debug!(
            "Base64 decode rejected: {}% control characters",
            control * 100 / total
        );
        return input.to_string();
    }

    text
}

// ── Tests ────────────────────────────────────────────────────────────────
