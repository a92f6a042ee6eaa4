//! Card preview projection for HTML note content.
//!
//! Core never parses or sanitizes note content for storage; this is a
//! read-only derivation for list/card rendering.

use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_MAX_CHARS: usize = 100;

static BLOCK_BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*(br|/p|/div|/li|/h[1-6])\s*/?\s*>").expect("valid block regex")
});
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Derives a plain-text preview from an HTML fragment.
///
/// Rules:
/// - Block-level closings and `<br>` become spaces, all other tags are dropped.
/// - Common entities are decoded, whitespace is collapsed.
/// - At most 100 chars are kept; blank results yield `None`.
pub fn derive_html_preview(content: &str) -> Option<String> {
    let with_breaks = BLOCK_BREAK_RE.replace_all(content, " ");
    let without_tags = HTML_TAG_RE.replace_all(&with_breaks, "");
    let decoded = decode_entities(&without_tags);
    let normalized = WHITESPACE_RE.replace_all(&decoded, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
}

fn decode_entities(value: &str) -> String {
    // `&amp;` last so `&amp;lt;` stays literal `&lt;`.
    value
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
