//! Page assembly around a parsed [`Document`].

use crate::ReportOptions;
use crate::inline::{escape_html, format_inline};
use crate::metadata::{Metadata, format_date};
use crate::parser::{Document, TocEntry};
use crate::persona::PersonaPalette;

const BASE_CSS: &str = include_str!("../data/report.css");
const CLIENT_JS: &str = include_str!("../data/report.js");

/// Metadata keys shown first, in this order.
const META_DISPLAY_ORDER: [&str; 4] = ["personas", "rounds", "focus", "date"];

/// Renders the complete HTML page.
pub fn render_html(document: &Document, palette: &PersonaPalette, options: &ReportOptions) -> String {
    let page_title = if document.title().is_empty() {
        options.default_title.as_str()
    } else {
        document.title()
    };
    let display_title = strip_title_prefix(document.title(), &options.title_prefix);
    let meta_bar = document.metadata().map(build_meta_bar).unwrap_or_default();
    let diagram_script = if document.has_diagrams() {
        format!(
            "\n<script src=\"{}\"></script>\n<script>mermaid.initialize({{ startOnLoad: true, theme: \"neutral\" }});</script>",
            options.mermaid_src
        )
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{css}{persona_css}</style>
</head>
<body>
<div class="progress-bar" id="progress"></div>
<nav class="sidebar" id="sidebar">
<div class="sidebar-brand"><span class="brand-mark"></span><span class="brand-text">{brand}</span></div>
{toc}
<div class="sidebar-footer">{footer}</div>
</nav>
<button class="burger" id="burger" aria-label="Toggle navigation"><span></span><span></span><span></span></button>
<div class="overlay" id="overlay"></div>
<main class="content">
<article>
<header class="report-header">
<div class="report-eyebrow">{eyebrow}</div>
<h1>{heading}</h1>
{meta_bar}
</header>
{preamble}
{sections}
</article>
</main>
<button class="back-to-top" id="back-to-top" aria-label="Back to top"><svg viewBox="0 0 24 24"><path d="M18 15l-6-6-6 6"/></svg></button>
<script>{script}</script>{diagram_script}
</body>
</html>"#,
        title = escape_html(page_title),
        css = BASE_CSS,
        persona_css = build_persona_css(palette),
        brand = escape_html(&options.brand),
        toc = build_toc(document.toc(), palette),
        footer = escape_html(&options.footer),
        eyebrow = escape_html(&options.eyebrow),
        heading = format_inline(display_title),
        meta_bar = meta_bar,
        preamble = document.preamble().join("\n"),
        sections = document.sections().join("\n"),
        script = CLIENT_JS,
        diagram_script = diagram_script,
    )
}

/// Drops the report-name prefix from the visible heading; the eyebrow already
/// carries it.
fn strip_title_prefix<'t>(title: &'t str, prefix: &str) -> &'t str {
    if prefix.is_empty() {
        return title;
    }
    match title.strip_prefix(prefix) {
        Some(rest) => rest.trim(),
        None => title,
    }
}

fn build_toc(entries: &[TocEntry], palette: &PersonaPalette) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut html = String::from("<ul class=\"toc\" id=\"toc\">");
    for entry in entries {
        let sub = if entry.level == 3 { " toc-sub" } else { "" };
        let persona = entry
            .persona
            .as_deref()
            .and_then(|name| palette.get(name))
            .map(|color| format!(" toc-persona-{}", color.name))
            .unwrap_or_default();
        html.push_str(&format!(
            "<li><a href=\"#{id}\" class=\"toc-link{sub}{persona}\" data-target=\"{id}\">{text}</a></li>",
            id = entry.id,
            text = escape_html(&entry.text),
        ));
    }
    html.push_str("</ul>");
    html
}

fn build_meta_bar(metadata: &Metadata) -> String {
    let mut ordered: Vec<&str> = META_DISPLAY_ORDER
        .iter()
        .copied()
        .filter(|key| metadata.contains_key(*key))
        .collect();
    ordered.extend(
        metadata
            .keys()
            .map(String::as_str)
            .filter(|key| !META_DISPLAY_ORDER.iter().any(|known| known == key)),
    );

    let mut items = String::new();
    for key in ordered {
        let Some(value) = metadata.get(key).filter(|value| !value.is_empty()) else {
            continue;
        };
        let display = if key == "date" {
            format_date(value)
        } else {
            value.clone()
        };
        items.push_str(&format!(
            "<div class=\"meta-item\"><span class=\"meta-label\">{}</span><span class=\"meta-value\">{}</span></div>",
            escape_html(&capitalize(key)),
            escape_html(&display)
        ));
    }
    if items.is_empty() {
        return String::new();
    }
    format!("<div class=\"meta-bar\">{items}</div>")
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Border/background and TOC dot rules for every palette color in use.
fn build_persona_css(palette: &PersonaPalette) -> String {
    let mut emitted: Vec<&str> = Vec::new();
    let mut css = String::new();
    for (_, color) in palette.iter() {
        if emitted.contains(&color.name) {
            continue;
        }
        emitted.push(color.name);
        css.push_str(&format!(
            "
.persona-{name} {{
  border-left-color: {hex};
  background: linear-gradient(to right, rgba({rgb},0.035), transparent 70%);
}}
.toc-link.toc-persona-{name}::before {{
  background: {hex};
}}
",
            name = color.name,
            hex = color.hex,
            rgb = color.rgb,
        ));
    }
    css
}
