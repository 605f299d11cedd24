//! Line-oriented block parser.
//!
//! The parser walks the document once with a forward cursor. Besides the
//! block constructs it tracks two overlays: the table of contents, and the
//! section/sub-region nesting that groups persona contributions. Output is a
//! [`Document`] holding already-rendered HTML fragments.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::inline::{escape_html, format_inline, slugify};
use crate::metadata::{Metadata, parse_metadata};
use crate::persona::{PersonaColor, PersonaPalette};

/// Fence language that renders as a diagram container instead of code.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,4})\s+(.+)$").expect("valid regex"));

static RULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-{3,}$").expect("valid regex"));

static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*]\s").expect("valid regex"));

static BULLET_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s+").expect("valid regex"));

static ORDERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s").expect("valid regex"));

static ORDERED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s+").expect("valid regex"));

static PHASE_RULES: LazyLock<Vec<PhaseRule>> = LazyLock::new(|| {
    vec![
        PhaseRule::new(r"^(?i-u:seed):\s*(.+)$", Phase::Seed),
        PhaseRule::new(
            r"^(?i-u:cross-pollination)(?:\s+(?i-u:round)\s+[0-9]+)?:\s*(.+)$",
            Phase::Cross,
        ),
        PhaseRule::new(r"^(?i-u:session)\s+(?i-u:record)$", Phase::SessionRecord),
        PhaseRule::new(r"^(?i-u:synthesis)$", Phase::Synthesis),
    ]
});

/// Semantic role of a level-2 section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Seed,
    Cross,
    SessionRecord,
    Synthesis,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Seed => "seed",
            Phase::Cross => "cross",
            Phase::SessionRecord => "session-record",
            Phase::Synthesis => "synthesis",
        }
    }

    fn section_class(self) -> &'static str {
        match self {
            Phase::Synthesis => " synthesis-section",
            Phase::SessionRecord => " session-record-section",
            Phase::Seed | Phase::Cross => "",
        }
    }
}

/// Phase detection rule. A rule with a capture group yields the persona name.
struct PhaseRule {
    pattern: Regex,
    phase: Phase,
}

impl PhaseRule {
    fn new(pattern: &str, phase: Phase) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid regex"),
            phase,
        }
    }
}

/// Classifies a level-2 heading, trying the rules in priority order.
pub fn detect_phase(text: &str) -> (Option<Phase>, Option<String>) {
    for rule in PHASE_RULES.iter() {
        if let Some(caps) = rule.pattern.captures(text) {
            let persona = caps
                .get(1)
                .map(|name| name.as_str().trim())
                .filter(|name| !name.is_empty())
                .map(str::to_string);
            return (Some(rule.phase), persona);
        }
    }
    (None, None)
}

/// One sidebar navigation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
    pub phase: Option<Phase>,
    pub persona: Option<String>,
}

/// Parsed report, ready for page assembly. Read-only once parsed.
#[derive(Debug, Clone, Default)]
pub struct Document {
    title: String,
    metadata: Option<Metadata>,
    preamble: Vec<String>,
    sections: Vec<String>,
    toc: Vec<TocEntry>,
    has_diagrams: bool,
}

impl Document {
    /// Text of the last level-1 heading, empty when there is none.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Fragments that appear before the first level-2 heading.
    pub fn preamble(&self) -> &[String] {
        &self.preamble
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    /// True when at least one diagram container was emitted.
    pub fn has_diagrams(&self) -> bool {
        self.has_diagrams
    }
}

/// Nested span inside an open section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubRegion {
    None,
    Synthesis,
    Persona(PersonaColor),
}

impl SubRegion {
    pub(crate) fn closing_markup(self) -> Option<&'static str> {
        match self {
            SubRegion::None => None,
            SubRegion::Synthesis => Some("</div>"),
            SubRegion::Persona(_) => Some("</div></div>"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct OpenSection {
    fragments: Vec<String>,
    sub: SubRegion,
}

impl OpenSection {
    fn new(opening: String) -> Self {
        Self {
            fragments: vec![opening],
            sub: SubRegion::None,
        }
    }

    /// Moves to `next`, emitting the closing markup of the current sub-region.
    pub(crate) fn enter(&mut self, next: SubRegion) {
        if let Some(markup) = self.sub.closing_markup() {
            if let SubRegion::Persona(color) = self.sub {
                debug!(color = color.name, "closing persona block");
            }
            self.fragments.push(markup.to_string());
        }
        self.sub = next;
    }

    fn finish(mut self) -> String {
        self.enter(SubRegion::None);
        self.fragments.push("</section>".to_string());
        self.fragments.join("\n")
    }
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn of(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if BULLET_RE.is_match(trimmed) {
            Some(ListKind::Unordered)
        } else if ORDERED_RE.is_match(trimmed) {
            Some(ListKind::Ordered)
        } else {
            None
        }
    }

    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }

    fn matches(self, line: &str) -> bool {
        let trimmed = line.trim();
        match self {
            ListKind::Unordered => BULLET_RE.is_match(trimmed),
            ListKind::Ordered => ORDERED_RE.is_match(trimmed),
        }
    }

    fn strip_marker(self, line: &str) -> String {
        let trimmed = line.trim();
        let marker = match self {
            ListKind::Unordered => &*BULLET_MARKER_RE,
            ListKind::Ordered => &*ORDERED_MARKER_RE,
        };
        marker.replace(trimmed, "").into_owned()
    }
}

fn is_fence(line: &str) -> bool {
    line.starts_with("```")
}

fn is_rule(line: &str) -> bool {
    RULE_RE.is_match(line.trim())
}

fn is_table_row(line: &str) -> bool {
    line.trim().starts_with('|')
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// True for lines that end a running paragraph.
fn starts_block(line: &str) -> bool {
    line.starts_with('#')
        || is_fence(line)
        || line.starts_with('>')
        || ListKind::of(line).is_some()
        || is_rule(line)
        || is_table_row(line)
}

fn split_cells(row: &str) -> Vec<&str> {
    row.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// Parses a whole document. Persona colors are allocated into `palette` in
/// the order their level-2 headings appear.
pub fn parse_markdown(markdown: &str, palette: &mut PersonaPalette) -> Document {
    let lines: Vec<&str> = markdown.lines().collect();
    BlockParser::new(&lines, palette).run()
}

struct BlockParser<'a, 'p> {
    lines: &'a [&'a str],
    pos: usize,
    palette: &'p mut PersonaPalette,
    doc: Document,
    suppressed_rule: bool,
    current: Option<OpenSection>,
}

impl<'a, 'p> BlockParser<'a, 'p> {
    fn new(lines: &'a [&'a str], palette: &'p mut PersonaPalette) -> Self {
        Self {
            lines,
            pos: 0,
            palette,
            doc: Document::default(),
            suppressed_rule: false,
            current: None,
        }
    }

    fn run(mut self) -> Document {
        while let Some(line) = self.peek(0) {
            if is_fence(line) {
                self.parse_fence(line);
            } else if let Some(caps) = HEADING_RE.captures(line) {
                let level = caps[1].len() as u8;
                let text = caps[2].to_string();
                self.pos += 1;
                self.parse_heading(level, &text);
            } else if line.starts_with('>') {
                self.parse_blockquote();
            } else if is_rule(line) {
                self.pos += 1;
                self.parse_rule();
            } else if is_table_row(line) {
                self.parse_table();
            } else if let Some(kind) = ListKind::of(line) {
                self.parse_list(kind);
            } else if is_blank(line) {
                self.pos += 1;
            } else {
                self.parse_paragraph();
            }
        }
        self.close_section();
        self.doc
    }

    fn peek(&self, offset: usize) -> Option<&'a str> {
        self.lines.get(self.pos + offset).copied()
    }

    fn emit(&mut self, html: String) {
        match self.current.as_mut() {
            Some(section) => section.fragments.push(html),
            None => self.doc.preamble.push(html),
        }
    }

    fn nothing_emitted(&self) -> bool {
        self.current.is_none() && self.doc.preamble.is_empty()
    }

    fn close_section(&mut self) {
        if let Some(section) = self.current.take() {
            self.doc.sections.push(section.finish());
        }
    }

    fn parse_fence(&mut self, opening: &str) {
        let lang: String = opening[3..]
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-')
            .collect();
        self.pos += 1;
        let mut body = Vec::new();
        while let Some(line) = self.peek(0) {
            if is_fence(line) {
                self.pos += 1;
                break;
            }
            body.push(escape_html(line));
            self.pos += 1;
        }
        let body = body.join("\n");
        if lang == DIAGRAM_LANGUAGE {
            debug!("diagram block");
            self.doc.has_diagrams = true;
            self.emit(format!("<div class=\"mermaid\">{body}</div>"));
        } else if lang.is_empty() {
            self.emit(format!("<pre><code>{body}</code></pre>"));
        } else {
            self.emit(format!(
                "<pre><code class=\"language-{lang}\">{body}</code></pre>"
            ));
        }
    }

    fn parse_heading(&mut self, level: u8, text: &str) {
        match level {
            1 => self.doc.title = text.to_string(),
            2 => self.open_section(text),
            3 => self.parse_subheading(text),
            _ => self.emit(format!("<h{level}>{}</h{level}>", format_inline(text))),
        }
    }

    fn open_section(&mut self, text: &str) {
        self.close_section();
        let id = slugify(text);
        let (phase, persona) = detect_phase(text);
        if let Some(persona) = persona.as_deref() {
            self.palette.color_for(persona);
        }
        debug!(id = %id, phase = phase.map(Phase::as_str), "opening section");

        let class = phase.map(Phase::section_class).unwrap_or("");
        let mut section = OpenSection::new(format!("<section id=\"{id}\" class=\"section{class}\">"));
        section
            .fragments
            .push(format!("<h2>{}</h2>", format_inline(text)));
        if phase == Some(Phase::Synthesis) {
            section
                .fragments
                .push("<div class=\"synthesis-callout\">".to_string());
            section.sub = SubRegion::Synthesis;
        }
        self.current = Some(section);
        self.doc.toc.push(TocEntry {
            id,
            text: text.to_string(),
            level: 2,
            phase,
            persona,
        });
    }

    fn parse_subheading(&mut self, text: &str) {
        if let Some(section) = self.current.as_mut() {
            if matches!(section.sub, SubRegion::Persona(_)) {
                section.enter(SubRegion::None);
            }
        }

        let parent = self.doc.toc.iter().rev().find(|entry| entry.level == 2);
        let id = match parent {
            Some(parent) => format!("{}-{}", parent.id, slugify(text)),
            None => slugify(text),
        };
        let persona = parent.and_then(|parent| parent.persona.clone());

        match (persona.as_deref(), self.current.as_mut()) {
            (Some(name), Some(section)) => {
                let color = self.palette.color_for(name);
                section.fragments.push(format!(
                    "<div class=\"persona-section persona-{}\" id=\"{id}\">",
                    color.name
                ));
                section.fragments.push(format!(
                    "<h3><span class=\"persona-badge\" style=\"color:{};background:rgba({},0.08)\">{}</span></h3>",
                    color.hex,
                    color.rgb,
                    escape_html(text)
                ));
                section
                    .fragments
                    .push("<div class=\"persona-content\">".to_string());
                section.sub = SubRegion::Persona(color);
            }
            _ => self.emit(format!("<h3 id=\"{id}\">{}</h3>", format_inline(text))),
        }

        self.doc.toc.push(TocEntry {
            id,
            text: text.to_string(),
            level: 3,
            phase: None,
            persona,
        });
    }

    fn parse_blockquote(&mut self) {
        let mut quoted = Vec::new();
        while let Some(line) = self.peek(0) {
            let Some(rest) = line.strip_prefix('>') else {
                break;
            };
            quoted.push(strip_one_whitespace(rest));
            self.pos += 1;
        }

        if self.doc.metadata.is_none() && self.nothing_emitted() {
            let metadata = parse_metadata(&quoted.join(" "));
            if !metadata.is_empty() {
                debug!(fields = metadata.len(), "found report metadata");
                self.doc.metadata = Some(metadata);
                return;
            }
        }

        let body = quoted
            .iter()
            .map(|line| format_inline(line))
            .collect::<Vec<_>>()
            .join("<br>");
        self.emit(format!("<blockquote>{body}</blockquote>"));
    }

    fn parse_rule(&mut self) {
        if self.doc.metadata.is_some() && !self.suppressed_rule && self.current.is_none() {
            debug!("suppressing rule after metadata");
            self.suppressed_rule = true;
            return;
        }
        if let Some(section) = self.current.as_mut() {
            if section.sub == SubRegion::Synthesis {
                section.enter(SubRegion::None);
                return;
            }
        }
        self.emit("<hr>".to_string());
    }

    fn parse_table(&mut self) {
        let mut rows = Vec::new();
        while let Some(line) = self.peek(0) {
            if !is_table_row(line) {
                break;
            }
            rows.push(line);
            self.pos += 1;
        }
        if rows.len() < 2 {
            debug!("dropping table without separator row");
            return;
        }

        let mut html = String::from("<div class=\"table-wrap\"><table><thead><tr>");
        for cell in split_cells(rows[0]) {
            html.push_str(&format!("<th>{}</th>", format_inline(cell)));
        }
        html.push_str("</tr></thead><tbody>");
        // Row 1 is the alignment row and is skipped by position.
        for row in &rows[2..] {
            html.push_str("<tr>");
            for cell in split_cells(row) {
                html.push_str(&format!("<td>{}</td>", format_inline(cell)));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table></div>");
        self.emit(html);
    }

    fn parse_list(&mut self, kind: ListKind) {
        let tag = kind.tag();
        let mut html = format!("<{tag}>");
        while let Some(line) = self.peek(0) {
            if kind.matches(line) {
                html.push_str(&format!(
                    "<li>{}</li>",
                    format_inline(&kind.strip_marker(line))
                ));
                self.pos += 1;
            } else if is_blank(line) && self.peek(1).is_some_and(|next| kind.matches(next)) {
                self.pos += 1;
            } else {
                break;
            }
        }
        html.push_str(&format!("</{tag}>"));
        self.emit(html);
    }

    fn parse_paragraph(&mut self) {
        let mut text = Vec::new();
        // The first line is taken unconditionally: a `#` line that is not a
        // valid heading would otherwise never be consumed.
        if let Some(first) = self.peek(0) {
            text.push(first);
            self.pos += 1;
        }
        while let Some(line) = self.peek(0) {
            if is_blank(line) || starts_block(line) {
                break;
            }
            text.push(line);
            self.pos += 1;
        }
        self.emit(format!("<p>{}</p>", format_inline(&text.join("\n"))));
    }
}

fn strip_one_whitespace(text: &str) -> &str {
    let mut chars = text.chars();
    match chars.next() {
        Some(ch) if ch.is_whitespace() => chars.as_str(),
        _ => text,
    }
}
