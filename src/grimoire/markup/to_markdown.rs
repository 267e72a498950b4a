//! HTML to Markdown serialization.
//!
//! The HTML tree is walked into a stream of `pulldown_cmark` events which
//! `pulldown_cmark_to_cmark` prints back as CommonMark. Inline HTML events carry
//! the two things Markdown has no syntax for: underline/highlight and text
//! color or font family spans. Simple tables become GFM tables; other unknown
//! block elements (figures, tables with block content) are kept verbatim as
//! HTML blocks.
//!
//! Text is escaped before it reaches the printer, which only guards the first
//! character of a text run. A literal `*` or a leading `1.` must not turn into
//! emphasis or a list on the next render.
//!
//! Output is not byte-stable against the input Markdown (`*` vs `-` bullets,
//! `__` vs `**`) but renders to the same HTML.

use super::dom::{
    escape_attr, has_text_style, heading_level, is_block_tag, is_transparent_tag, parse_fragment,
    pieces, style_property, text_content, Piece,
};
use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Tag};
use pulldown_cmark_to_cmark::{cmark_with_options, Options as CmarkOptions};
use scraper::ElementRef;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Keep `<span style="color:…; font-family:…">` as inline HTML.
    pub preserve_styled_spans: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            preserve_styled_spans: true,
        }
    }
}

pub fn html_to_markdown(html: &str) -> String {
    html_to_markdown_with(html, &MarkdownOptions::default())
}

pub fn html_to_markdown_with(html: &str, options: &MarkdownOptions) -> String {
    let fragment = parse_fragment(html);
    let mut walker = Walker {
        options,
        events: Vec::new(),
    };
    walker.blocks(fragment.root_element(), false);

    let mut out = String::new();
    match cmark_with_options(walker.events.iter(), &mut out, cmark_options()) {
        Ok(_) => out.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "markdown serialization failed, falling back to text");
            text_content(fragment.root_element())
                .split_ascii_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}

fn cmark_options() -> CmarkOptions<'static> {
    CmarkOptions {
        code_block_token_count: 3,
        list_token: '-',
        newlines_after_htmlblock: 2,
        ..Default::default()
    }
}

struct Walker<'o> {
    options: &'o MarkdownOptions,
    events: Vec<Event<'static>>,
}

impl Walker<'_> {
    /// Walks block content. Runs of inline content between blocks become
    /// paragraphs, or stay bare when `tight` (list items).
    fn blocks(&mut self, parent: ElementRef<'_>, tight: bool) {
        let mut run = Vec::new();
        for piece in pieces(parent) {
            match piece {
                Piece::Element(el) if is_block_tag(el.value().name()) => {
                    self.flush(&mut run, tight);
                    self.block(el, tight);
                }
                other => run.push(other),
            }
        }
        self.flush(&mut run, tight);
    }

    fn flush(&mut self, run: &mut Vec<Piece<'_>>, tight: bool) {
        let inline = self.inline_run(run.drain(..));
        if inline.is_empty() {
            return;
        }
        if tight {
            self.events.extend(inline);
        } else {
            self.wrap(Tag::Paragraph, inline);
        }
    }

    fn block(&mut self, el: ElementRef<'_>, tight: bool) {
        let name = el.value().name();
        if let Some(level) = heading_level(name) {
            let inline = self.inline_run(pieces(el));
            let level = HeadingLevel::try_from(level as usize).unwrap_or(HeadingLevel::H6);
            let heading = Tag::Heading {
                level,
                id: None,
                classes: vec![],
                attrs: vec![],
            };
            self.wrap(heading, inline);
            return;
        }
        match name {
            "p" => {
                let inline = self.inline_run(pieces(el));
                if !inline.is_empty() {
                    self.wrap(Tag::Paragraph, inline);
                }
            }
            "ul" | "ol" => self.list(el),
            "blockquote" => {
                let tag = Tag::BlockQuote(None);
                self.events.push(Event::Start(tag.clone()));
                self.blocks(el, false);
                self.events.push(Event::End(tag.to_end()));
            }
            "pre" => self.code_block(el),
            "hr" => self.events.push(Event::Rule),
            "li" => self.blocks(el, tight),
            "table" => self.table(el),
            _ if is_transparent_tag(name) => self.blocks(el, tight),
            _ => self.html_block(el),
        }
    }

    fn html_block(&mut self, el: ElementRef<'_>) {
        self.events.push(Event::Start(Tag::HtmlBlock));
        self.events.push(Event::Html(format!("{}\n", el.html()).into()));
        self.events.push(Event::End(Tag::HtmlBlock.to_end()));
    }

    /// A GFM table when the first row is a header and every cell holds inline
    /// content only; raw HTML otherwise.
    fn table(&mut self, el: ElementRef<'_>) {
        let rows = table_rows(el);
        let simple = rows.first().is_some_and(|(_, head)| *head)
            && rows.iter().skip(1).all(|(_, head)| !head)
            && rows
                .iter()
                .flat_map(|(row, _)| table_cells(*row))
                .all(|cell| !has_block_child(cell));
        if !simple {
            self.html_block(el);
            return;
        }

        let alignments: Vec<Alignment> = table_cells(rows[0].0).map(cell_alignment).collect();
        let table = Tag::Table(alignments);
        self.events.push(Event::Start(table.clone()));
        for (index, (row, _)) in rows.iter().enumerate() {
            let row_tag = if index == 0 {
                Tag::TableHead
            } else {
                Tag::TableRow
            };
            self.events.push(Event::Start(row_tag.clone()));
            for cell in table_cells(*row) {
                let inline = self.inline_run(pieces(cell));
                self.wrap(Tag::TableCell, inline);
            }
            self.events.push(Event::End(row_tag.to_end()));
        }
        self.events.push(Event::End(table.to_end()));
    }

    fn list(&mut self, el: ElementRef<'_>) {
        let start = (el.value().name() == "ol").then(|| {
            el.value()
                .attr("start")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(1)
        });
        let tag = Tag::List(start);
        self.events.push(Event::Start(tag.clone()));
        for piece in pieces(el) {
            if let Piece::Element(item) = piece {
                if item.value().name() == "li" {
                    self.events.push(Event::Start(Tag::Item));
                    self.blocks(item, true);
                    self.events.push(Event::End(Tag::Item.to_end()));
                }
            }
        }
        self.events.push(Event::End(tag.to_end()));
    }

    fn code_block(&mut self, el: ElementRef<'_>) {
        let lang = first_code_child(el)
            .and_then(|code| code.value().attr("class"))
            .and_then(|class| {
                class
                    .split_ascii_whitespace()
                    .find_map(|c| c.strip_prefix("language-"))
            })
            .unwrap_or_default()
            .to_string();
        let mut text = text_content(el);
        if !text.ends_with('\n') {
            text.push('\n');
        }
        let tag = Tag::CodeBlock(CodeBlockKind::Fenced(lang.into()));
        self.events.push(Event::Start(tag.clone()));
        self.events.push(Event::Text(text.into()));
        self.events.push(Event::End(tag.to_end()));
    }

    fn wrap(&mut self, tag: Tag<'static>, inner: Vec<Event<'static>>) {
        let end = tag.to_end();
        self.events.push(Event::Start(tag));
        self.events.extend(inner);
        self.events.push(Event::End(end));
    }

    fn inline_run<'a>(&self, run: impl IntoIterator<Item = Piece<'a>>) -> Vec<Event<'static>> {
        let mut raw = Vec::new();
        for piece in run {
            self.inline(piece, &mut raw);
        }
        tidy_inline(raw)
    }

    fn inline_children(&self, el: ElementRef<'_>, out: &mut Vec<Event<'static>>) {
        for piece in pieces(el) {
            self.inline(piece, out);
        }
    }

    fn inline_wrapped(&self, tag: Tag<'static>, el: ElementRef<'_>, out: &mut Vec<Event<'static>>) {
        let end = tag.to_end();
        out.push(Event::Start(tag));
        self.inline_children(el, out);
        out.push(Event::End(end));
    }

    fn inline(&self, piece: Piece<'_>, out: &mut Vec<Event<'static>>) {
        let el = match piece {
            Piece::Text(text) => {
                out.push(Event::Text(text.to_string().into()));
                return;
            }
            Piece::Element(el) => el,
        };
        let attr = |name: &str| el.value().attr(name).unwrap_or_default().to_string();
        match el.value().name() {
            "strong" | "b" => self.inline_wrapped(Tag::Strong, el, out),
            "em" | "i" => self.inline_wrapped(Tag::Emphasis, el, out),
            "s" | "del" | "strike" => self.inline_wrapped(Tag::Strikethrough, el, out),
            "code" => out.push(Event::Code(text_content(el).into())),
            "br" => out.push(Event::HardBreak),
            "input" if el.value().attr("type") == Some("checkbox") => {
                out.push(Event::TaskListMarker(el.value().attr("checked").is_some()))
            }
            "a" if el.value().attr("href").is_some() => {
                let link = Tag::Link {
                    link_type: LinkType::Inline,
                    dest_url: attr("href").into(),
                    title: attr("title").into(),
                    id: CowStr::Borrowed(""),
                };
                self.inline_wrapped(link, el, out);
            }
            "img" => {
                let image = Tag::Image {
                    link_type: LinkType::Inline,
                    dest_url: attr("src").into(),
                    title: attr("title").into(),
                    id: CowStr::Borrowed(""),
                };
                let end = image.to_end();
                out.push(Event::Start(image));
                let alt = attr("alt");
                if !alt.is_empty() {
                    out.push(Event::Text(alt.into()));
                }
                out.push(Event::End(end));
            }
            "span" if self.options.preserve_styled_spans && has_text_style(&attr("style")) => {
                let open = format!("<span style=\"{}\">", escape_attr(&attr("style")));
                out.push(Event::InlineHtml(open.into()));
                self.inline_children(el, out);
                out.push(Event::InlineHtml(CowStr::Borrowed("</span>")));
            }
            name @ ("u" | "mark") => {
                out.push(Event::InlineHtml(format!("<{}>", name).into()));
                self.inline_children(el, out);
                out.push(Event::InlineHtml(format!("</{}>", name).into()));
            }
            _ => self.inline_children(el, out),
        }
    }
}

/// Rows of a table with whether they sit in `thead`.
fn table_rows(table: ElementRef<'_>) -> Vec<(ElementRef<'_>, bool)> {
    let mut rows = Vec::new();
    for piece in pieces(table) {
        let Piece::Element(el) = piece else { continue };
        match el.value().name() {
            "tr" => rows.push((el, false)),
            section @ ("thead" | "tbody" | "tfoot") => {
                for child in pieces(el) {
                    if let Piece::Element(row) = child {
                        if row.value().name() == "tr" {
                            rows.push((row, section == "thead"));
                        }
                    }
                }
            }
            _ => {}
        }
    }
    rows
}

fn table_cells(row: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    pieces(row).filter_map(|piece| match piece {
        Piece::Element(el) if matches!(el.value().name(), "th" | "td") => Some(el),
        _ => None,
    })
}

fn has_block_child(el: ElementRef<'_>) -> bool {
    el.descendants()
        .filter_map(ElementRef::wrap)
        .any(|child| is_block_tag(child.value().name()))
}

fn cell_alignment(cell: ElementRef<'_>) -> Alignment {
    let style = cell.value().attr("style").unwrap_or_default();
    let align = style_property(style, "text-align").or_else(|| cell.value().attr("align"));
    match align.map(str::to_ascii_lowercase).as_deref() {
        Some("left") => Alignment::Left,
        Some("center") => Alignment::Center,
        Some("right") => Alignment::Right,
        _ => Alignment::None,
    }
}

fn first_code_child(pre: ElementRef<'_>) -> Option<ElementRef<'_>> {
    pieces(pre).find_map(|piece| match piece {
        Piece::Element(el) if el.value().name() == "code" => Some(el),
        _ => None,
    })
}

/// Collapses HTML whitespace in text events the way a browser would display
/// it. Spaces are moved out of inline tags so emphasis delimiters always hug
/// their content, and dropped at line starts and ends.
fn tidy_inline(events: Vec<Event<'static>>) -> Vec<Event<'static>> {
    let mut tidy = InlineTidy {
        out: Vec::with_capacity(events.len()),
        pending_space: false,
        line_start: true,
    };
    for event in events {
        match event {
            Event::Text(text) => tidy.text(&text),
            event @ (Event::HardBreak | Event::TaskListMarker(_)) => {
                tidy.pending_space = false;
                tidy.out.push(event);
                tidy.line_start = true;
            }
            event @ (Event::Start(_) | Event::End(_)) => tidy.out.push(event),
            event => tidy.content(event),
        }
    }
    tidy.out
}

struct InlineTidy {
    out: Vec<Event<'static>>,
    pending_space: bool,
    line_start: bool,
}

impl InlineTidy {
    fn content(&mut self, event: Event<'static>) {
        if self.pending_space && !self.line_start {
            let at = self
                .out
                .iter()
                .rposition(|e| !matches!(e, Event::Start(_)))
                .map_or(0, |i| i + 1);
            self.out.insert(at, Event::Text(CowStr::Borrowed(" ")));
        }
        self.pending_space = false;
        self.line_start = false;
        self.out.push(event);
    }

    fn text(&mut self, text: &str) {
        if text.starts_with(|c: char| c.is_ascii_whitespace()) {
            self.pending_space = true;
        }
        let words: Vec<&str> = text.split_ascii_whitespace().collect();
        if words.is_empty() {
            return;
        }
        // escaped here, so it must bypass the printer's own escaping
        let escaped = escape_markdown(&words.join(" "), self.line_start);
        self.content(Event::InlineHtml(escaped.into()));
        if text.ends_with(|c: char| c.is_ascii_whitespace()) {
            self.pending_space = true;
        }
    }
}

/// Characters that can open inline syntax anywhere in a line.
const INLINE_SYNTAX: &[char] = &['\\', '*', '_', '`', '[', ']', '<', '~', '|'];

/// Characters that open a block when they start a line.
const LINE_START_SYNTAX: &[char] = &['#', '>', '-', '+', '='];

/// Backslash-escapes text so that it renders literally. `line_start` also
/// guards block markers: headings, quotes, bullets and `1.`/`1)` items.
fn escape_markdown(text: &str, line_start: bool) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut rest = text;
    if line_start {
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let after = &rest[digits..];
        if digits > 0 && after.starts_with(['.', ')']) {
            out.push_str(&rest[..digits]);
            out.push('\\');
            rest = after;
        } else if rest.starts_with(LINE_START_SYNTAX) {
            out.push('\\');
        }
    }
    for (idx, c) in rest.char_indices() {
        if INLINE_SYNTAX.contains(&c) || (c == '&' && starts_entity(&rest[idx + 1..])) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// True when the text after an `&` would be read as a character reference.
fn starts_entity(after: &str) -> bool {
    let body = after.strip_prefix('#').unwrap_or(after);
    let name_len = body.len() - body.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).len();
    name_len > 0 && body[name_len..].starts_with(';')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Converter;

    #[test]
    fn heading_and_strong() {
        let md = html_to_markdown("<h2>Tea</h2><p>Hello <strong>world</strong></p>");
        assert_eq!(md, "## Tea\n\nHello **world**");
    }

    #[test]
    fn spaces_stay_outside_emphasis() {
        assert_eq!(html_to_markdown("<p>a<em> b </em>c</p>"), "a *b* c");
        assert_eq!(html_to_markdown("<p>  a \n  b  </p>"), "a b");
    }

    #[test]
    fn bullet_list_uses_dashes() {
        let md = html_to_markdown("<ul>\n<li>root</li>\n<li>tea</li>\n</ul>");
        assert!(md.contains("- root"));
        assert!(md.contains("- tea"));
        assert!(!md.contains('*'));
    }

    #[test]
    fn styled_span_survives_as_inline_html() {
        let html = r#"<p><span style="color:#ff0000">red</span> text</p>"#;
        let md = html_to_markdown(html);
        assert!(md.contains(r#"<span style="color:#ff0000">red</span>"#));

        let plain = html_to_markdown_with(
            html,
            &MarkdownOptions {
                preserve_styled_spans: false,
            },
        );
        assert_eq!(plain, "red text");
    }

    #[test]
    fn underline_is_kept_as_html() {
        let md = html_to_markdown("<p><u>under</u></p>");
        assert!(md.contains("<u>under</u>"));
    }

    #[test]
    fn fenced_code_keeps_language() {
        let md = html_to_markdown(r#"<pre><code class="language-rust">fn main() {}</code></pre>"#);
        assert_eq!(md, "```rust\nfn main() {}\n```");
    }

    #[test]
    fn links_and_images() {
        assert_eq!(
            html_to_markdown(r#"<p><a href="https://example.org">site</a></p>"#),
            "[site](https://example.org)"
        );
        assert_eq!(
            html_to_markdown(r#"<p><img src="data:image/png;base64,AAAA" alt="bild"></p>"#),
            "![bild](data:image/png;base64,AAAA)"
        );
    }

    #[test]
    fn loose_inline_content_becomes_paragraph() {
        assert_eq!(html_to_markdown("<div>just text</div>"), "just text");
    }

    #[test]
    fn unknown_blocks_pass_through_as_html() {
        let md = html_to_markdown("<table><tbody><tr><td>cell</td></tr></tbody></table>");
        assert!(md.starts_with("<table>"));
        assert!(md.contains("cell"));

        let md = html_to_markdown("<figure><p>caption</p></figure>");
        assert!(md.starts_with("<figure>"));
    }

    #[test]
    fn header_table_becomes_gfm() {
        let html = r#"<table><thead><tr><th>Namn</th><th style="text-align: right">Mängd</th></tr></thead><tbody><tr><td>salvia</td><td>2</td></tr></tbody></table>"#;
        let md = html_to_markdown(html);
        assert!(md.starts_with('|'));
        assert!(md.contains("salvia"));
        let back = Converter::unsanitized().render_to_html(&md);
        assert!(back.contains("<th style=\"text-align: right\">Mängd</th>"));
        assert!(back.contains("<td>salvia</td>"));
    }

    #[test]
    fn literal_syntax_characters_are_escaped() {
        assert_eq!(
            html_to_markdown("<p>a *not emphasis* b</p>"),
            r"a \*not emphasis\* b"
        );
        assert_eq!(html_to_markdown("<p>1. not a list</p>"), r"1\. not a list");
        assert_eq!(html_to_markdown("<p># not a heading</p>"), r"\# not a heading");
        assert_eq!(html_to_markdown("<p>snake_case</p>"), r"snake\_case");
        assert_eq!(html_to_markdown("<p>salt &amp; pepper</p>"), "salt & pepper");
    }

    #[test]
    fn task_checkboxes_become_markers() {
        let html = Converter::unsanitized().render_to_html("- [x] done\n- [ ] open");
        let md = html_to_markdown(&html);
        assert!(md.contains("[x]"));
        assert!(md.contains("[ ]"));
        assert_eq!(Converter::unsanitized().render_to_html(&md), html);
    }

    /// Markdown -> HTML -> Markdown must render to the same HTML again.
    fn assert_renders_same(source: &str) {
        let converter = Converter::unsanitized();
        let first = converter.render_to_html(source);
        let back = html_to_markdown(&first);
        assert_eq!(
            converter.render_to_html(&back),
            first,
            "{source:?} came back as {back:?}"
        );
    }

    #[test]
    fn escaped_text_renders_the_same() {
        for source in [
            r"a \*not emphasis\* b",
            r"1\. not a list",
            r"2\) not a list either",
            r"\- not a bullet",
            r"\> not a quote",
            r"\# not a heading",
            r"keep \`ticks\` and \[brackets\]",
            r"\&copy; stays literal",
            "line one  \n1\\. still text",
        ] {
            assert_renders_same(source);
        }
    }

    #[test]
    fn block_structure_renders_the_same() {
        for source in [
            "- a\n  - nested\n- b",
            "> - quoted item\n> - another",
            "- first para\n\n  second para\n- b",
            "```rust\nfn main() {}\n```",
            "| a | b |\n|---|---|\n| 1 | 2 |",
            "3. three\n4. four",
        ] {
            assert_renders_same(source);
        }
    }

    #[test]
    fn rendering_roundtrip_is_stable() {
        let converter = Converter::unsanitized();
        let source = "# Ginger\n\nGinger is **warming** and *spicy*.\n\n- root\n- tea";
        let first = converter.render_to_html(source);
        let back = html_to_markdown(&first);
        assert_eq!(converter.render_to_html(&back), first);
    }
}
