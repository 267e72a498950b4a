//! # Markdown/HTML Conversion
//!
//! Three representations of note content and the conversions between them:
//!
//! ```text
//!   Markdown ──render_to_html──▶ sanitized HTML ──to_plain_text──▶ plain text
//!      ▲                              │
//!      └─────── html_to_markdown ─────┘
//! ```
//!
//! Markdown is the stored form. HTML is derived on demand for display and for the
//! visual editor, and is never persisted. Rendering never fails: malformed
//! Markdown degrades to best-effort HTML.
//!
//! Content is data: fenced code is escaped and displayed, never interpreted, and
//! everything leaving [`render_to_html`] has been through the sanitizer
//! (see [`sanitize`]). The visual editor loads through
//! [`Converter::for_editor`], a wider policy that keeps what must survive a
//! round trip back to Markdown. A [`Converter::unsanitized`] exists for
//! contexts that never show the output to a person (tests, batch conversion).

use pulldown_cmark::{html, Options, Parser};

pub mod dom;
pub mod sanitize;
pub mod to_markdown;

pub use to_markdown::{html_to_markdown, html_to_markdown_with, MarkdownOptions};

use dom::{heading_level, is_block_tag, parse_fragment, pieces, Piece};

/// Separators accepted between a leading title and the rest of a snippet.
const TITLE_SEPARATORS: &[char] = &['-', '–', '—', ':', '|'];

const ELLIPSIS: char = '…';

/// How a content string should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Markdown,
    Html,
}

impl ContentKind {
    /// Guesses the kind of a stored string.
    ///
    /// Only text that *starts* with an opening block-level tag counts as HTML.
    /// Markdown that merely contains inline HTML (a styled `<span>`, a literal
    /// `<3`) stays Markdown; the Markdown parser passes such inline HTML through.
    pub fn sniff(text: &str) -> Self {
        let Some(rest) = text.trim_start().strip_prefix('<') else {
            return ContentKind::Markdown;
        };
        let rest = rest.trim_start();
        let name_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        let (name, after) = rest.split_at(name_len);
        let tag_ends = after.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/');
        let is_tag = name.starts_with(|c: char| c.is_ascii_alphabetic()) && tag_ends;
        if is_tag && is_block_tag(&name.to_ascii_lowercase()) && after.contains('>') {
            ContentKind::Html
        } else {
            ContentKind::Markdown
        }
    }
}

/// Which sanitizer, if any, rendered HTML goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    Display,
    Editor,
    Unsanitized,
}

/// Renders and extracts text, with or without sanitization.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    policy: Policy,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            policy: Policy::Display,
        }
    }
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A converter for loading the visual editor. Its sanitizer keeps what the
    /// editor has to write back to Markdown (code languages, tables).
    pub fn for_editor() -> Self {
        Self {
            policy: Policy::Editor,
        }
    }

    /// A converter that skips sanitization.
    ///
    /// Its HTML output must never be rendered for an end user.
    pub fn unsanitized() -> Self {
        Self {
            policy: Policy::Unsanitized,
        }
    }

    pub fn render_to_html(&self, markdown_or_html: &str) -> String {
        self.render_as(markdown_or_html, ContentKind::sniff(markdown_or_html))
    }

    pub fn render_as(&self, content: &str, kind: ContentKind) -> String {
        let raw = match kind {
            ContentKind::Html => content.to_string(),
            ContentKind::Markdown => markdown_to_html(content),
        };
        match self.policy {
            Policy::Display => sanitize::sanitize_html(&raw),
            Policy::Editor => sanitize::sanitize_for_editor(&raw),
            Policy::Unsanitized => raw,
        }
    }

    pub fn to_plain_text(&self, markdown_or_html: &str, title_to_strip: Option<&str>) -> String {
        let html = self.render_to_html(markdown_or_html);
        let fragment = parse_fragment(&html);
        let mut raw = String::new();
        let mut heading_dropped = false;
        collect_text(fragment.root_element(), &mut raw, &mut heading_dropped);
        let text = collapse_whitespace(&raw);
        match title_to_strip {
            Some(title) => strip_title_prefix(&text, title).to_string(),
            None => text,
        }
    }

    /// Plain text cut to at most `max_chars` characters, ellipsized when cut.
    pub fn snippet(&self, content: &str, title: Option<&str>, max_chars: usize) -> String {
        truncate_chars(&self.to_plain_text(content, title), max_chars)
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, parser_options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Sanitized HTML for any stored content string.
pub fn render_to_html(markdown_or_html: &str) -> String {
    Converter::default().render_to_html(markdown_or_html)
}

/// Text for list snippets: first h1/h2 dropped, whitespace collapsed, and a
/// leading `title` followed by a separator removed.
pub fn to_plain_text(markdown_or_html: &str, title_to_strip: Option<&str>) -> String {
    Converter::default().to_plain_text(markdown_or_html, title_to_strip)
}

pub fn snippet(content: &str, title: Option<&str>, max_chars: usize) -> String {
    Converter::default().snippet(content, title, max_chars)
}

fn collect_text(parent: scraper::ElementRef<'_>, out: &mut String, heading_dropped: &mut bool) {
    for piece in pieces(parent) {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Element(el) => {
                let name = el.value().name();
                if !*heading_dropped && matches!(heading_level(name), Some(1 | 2)) {
                    *heading_dropped = true;
                    out.push(' ');
                    continue;
                }
                let block = is_block_tag(name) || name == "br";
                if block {
                    out.push(' ');
                }
                collect_text(el, out, heading_dropped);
                if block {
                    out.push(' ');
                }
            }
        }
    }
}

/// Collapses every whitespace run (NBSP included) to one space and trims.
fn collapse_whitespace(text: &str) -> String {
    text.split(char::is_whitespace)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_title_prefix<'a>(text: &'a str, title: &str) -> &'a str {
    let title = title.trim();
    if title.is_empty() {
        return text;
    }
    let Some(rest) = strip_prefix_ignore_case(text, title) else {
        return text;
    };
    match rest.trim_start().strip_prefix(TITLE_SEPARATORS) {
        Some(after) => after.trim_start(),
        None => text,
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();
    let mut end = 0;
    for expected in prefix.chars() {
        let (idx, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        end = idx + actual.len_utf8();
    }
    Some(&text[end..])
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut out = text[..cut].trim_end().to_string();
            out.push(ELLIPSIS);
            out
        }
    }
}
