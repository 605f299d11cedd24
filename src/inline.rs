//! Inline markup, link-target sanitizing and heading slugs.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static CODE_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));

static STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));

static EMPHASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("valid regex"));

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));

static ALLOWED_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i-u:https?:|mailto:|/|#|\.)").expect("valid regex"));

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i-u:[a-z][a-z0-9+.\-]*):").expect("valid regex"));

/// Replacement href for links whose scheme is not allow-listed.
pub const BLOCKED_HREF: &str = "#blocked";

/// Escapes `&`, `<`, `>` and `"`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders one run of text as HTML.
///
/// The text is escaped first, then code spans, `**strong**`, `*em*`, `_em_`
/// and `[label](href)` links are substituted in that order. Markers without a
/// closing partner are left as literal text.
pub fn format_inline(text: &str) -> String {
    let text = escape_html(text);
    let text = CODE_SPAN_RE.replace_all(&text, "<code>${1}</code>");
    let text = STRONG_RE.replace_all(&text, "<strong>${1}</strong>");
    let text = EMPHASIS_RE.replace_all(&text, "<em>${1}</em>");
    let text = replace_underscore_emphasis(&text);
    LINK_RE
        .replace_all(&text, |caps: &Captures| {
            format!("<a href=\"{}\">{}</a>", sanitize_href(&caps[2]), &caps[1])
        })
        .into_owned()
}

/// Returns a link target that is safe to place in an `href`.
///
/// `http:`, `https:`, `mailto:`, absolute paths, fragments and `.`-relative
/// paths pass through. Any other `scheme:` prefix is replaced by
/// [`BLOCKED_HREF`]. Bare relative paths pass through.
///
/// Tabs and line breaks are removed and leading control characters trimmed
/// before the checks, matching how browsers read the attribute.
pub fn sanitize_href(url: &str) -> String {
    let cleaned: String = url
        .chars()
        .filter(|ch| !matches!(ch, '\t' | '\n' | '\r'))
        .collect();
    let cleaned = cleaned.trim_start_matches(|ch: char| ch <= ' ').trim_end();
    if ALLOWED_HREF_RE.is_match(cleaned) {
        return cleaned.to_string();
    }
    if SCHEME_RE.is_match(cleaned) {
        return BLOCKED_HREF.to_string();
    }
    cleaned.to_string()
}

/// Derives an anchor id from heading text.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(ch);
        } else if !slug.is_empty() {
            pending_hyphen = true;
        }
    }
    // A trailing run never flushes its hyphen.
    slug
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// `_em_` that is not glued to a word on either outer side, so identifiers
/// like `snake_case_name` survive untouched.
fn replace_underscore_emphasis(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        let opens = bytes[idx] == b'_' && (idx == 0 || !is_word_byte(bytes[idx - 1]));
        if opens {
            if let Some(close) = find_closing_underscore(bytes, idx + 1) {
                out.push_str(&text[copied..idx]);
                out.push_str("<em>");
                out.push_str(&text[idx + 1..close]);
                out.push_str("</em>");
                idx = close + 1;
                copied = idx;
                continue;
            }
        }
        idx += 1;
    }
    out.push_str(&text[copied..]);
    out
}

fn find_closing_underscore(bytes: &[u8], start: usize) -> Option<usize> {
    match bytes.get(start) {
        None | Some(b'\n') => return None,
        Some(_) => {}
    }
    let mut idx = start + 1;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\n' => return None,
            b'_' if !bytes.get(idx + 1).is_some_and(|next| is_word_byte(*next)) => {
                return Some(idx);
            }
            _ => {}
        }
        idx += 1;
    }
    None
}
