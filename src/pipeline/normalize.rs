//! HTML normalization: arbitrary (possibly malformed) markup → strict XHTML.
//!
//! ## Why strict XHTML?
//!
//! The layout stage wants well-formed markup: balanced tags, self-closed
//! void elements, XML entity escaping. Email creatives deliver anything but —
//! unclosed `<p>` tags, bare fragments with no `<html>` shell, stray
//! prologs. We parse tolerantly (html5ever via kuchiki, the same parser the
//! layout engine itself uses) and re-serialize the tree as strict XML, so
//! downstream never sees the mess.
//!
//! Normalization is deterministic and side-effect-free, and it cannot fail:
//! a tolerant parser always produces *some* tree.

use kuchiki::traits::TendrilSink;
use kuchiki::{NodeData, NodeRef};

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Canonical XHTML 1.0 Transitional prolog, prepended to every document.
const XHTML_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
\"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n";

/// HTML void elements, serialized self-closing in XHTML.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Normalize decoded text into a strict XHTML document.
///
/// Fragments without an `<html>`/`<body>` shell are first wrapped in a
/// minimal one (UTF-8 meta tag plus a baseline body font). The result always
/// starts with the XHTML prolog and has a single namespaced `<html>` root;
/// any pre-existing DOCTYPE or XML prolog in the input is dropped.
pub fn normalize(decoded: &str) -> String {
    let markup = if needs_shell(decoded) {
        wrap_fragment(decoded)
    } else {
        decoded.to_string()
    };

    let document = kuchiki::parse_html().one(markup.as_str());

    let mut out = String::with_capacity(markup.len() + XHTML_PROLOG.len() + 64);
    out.push_str(XHTML_PROLOG);

    // Serializing from the <html> element discards whatever DOCTYPE or
    // <?xml?> prolog the input carried. html5ever always synthesizes the
    // root, so the fallback arm is for form only.
    match document.select_first("html") {
        Ok(html) => write_xhtml(html.as_node(), &mut out),
        Err(()) => {
            out.push_str("<html xmlns=\"");
            out.push_str(XHTML_NAMESPACE);
            out.push_str("\"><body>");
            escape_xml_text(decoded, &mut out);
            out.push_str("</body></html>");
        }
    }

    out
}

/// A fragment needs the minimal shell when it mentions neither `<html` nor
/// `<body` (case-insensitive, ignoring surrounding whitespace).
fn needs_shell(input: &str) -> bool {
    let probe = input.trim().to_ascii_lowercase();
    !probe.contains("<html") && !probe.contains("<body")
}

/// Wrap a bare fragment in a minimal email-safe document shell.
fn wrap_fragment(fragment: &str) -> String {
    format!(
        "<html><head>\
         <meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\" />\
         </head>\
         <body style=\"margin: 0; font-family: Helvetica, Arial, sans-serif; font-size: 12px;\">\
         {fragment}\
         </body></html>"
    )
}

/// Serialize a kuchiki subtree as strict XML.
///
/// kuchiki's own `to_string()` emits HTML serialization, which is not
/// necessarily well-formed XML (void elements left open, lax attribute
/// escaping). This walker emits XML: escaped text and attributes,
/// self-closed void elements, and an `xmlns` injected on the root `<html>`
/// when the input lacked one. Comments, doctypes, and processing
/// instructions are dropped — conditional-comment blocks target mail
/// clients, not the rasterizer.
fn write_xhtml(node: &NodeRef, out: &mut String) {
    match node.data() {
        NodeData::Element(el) => {
            let tag = el.name.local.as_ref();
            out.push('<');
            out.push_str(tag);

            let attrs = el.attributes.borrow();
            let mut has_xmlns = false;
            for (name, value) in attrs.map.iter() {
                let key = name.local.as_ref();
                if key.eq_ignore_ascii_case("xmlns") {
                    has_xmlns = true;
                }
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape_xml_attr(&value.value, out);
                out.push('"');
            }
            if tag.eq_ignore_ascii_case("html") && !has_xmlns {
                out.push_str(" xmlns=\"");
                out.push_str(XHTML_NAMESPACE);
                out.push('"');
            }

            if VOID_ELEMENTS.contains(&tag) {
                out.push_str("/>");
                return;
            }

            out.push('>');
            for child in node.children() {
                write_xhtml(&child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeData::Text(text) => {
            escape_xml_text(&text.borrow(), out);
        }
        _ => {}
    }
}

fn escape_xml_attr(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

fn escape_xml_text(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
