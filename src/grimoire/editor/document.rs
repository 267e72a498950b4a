//! Minimal block/inline document behind the bundled [`DocumentSurface`].
//!
//! Just enough structure to round-trip what the Markdown side can express:
//! paragraphs, headings, list items, quotes, code blocks and rules, with
//! inline marks for emphasis, links, code and text style. The model is flat,
//! so a list or quote it cannot hold as is (nested lists, multi-paragraph
//! items, quotes around other blocks, task lists, numbered lists not starting
//! at 1) is kept as a raw HTML block, as is anything else it does not know.
//!
//! Offsets are in `char`s within one block. An image or a line break counts
//! as one character.

use super::{FormatCommand, Selection, TextStyle, VisualSurface};
use crate::markup::dom::{
    escape_attr, escape_text, heading_level, is_block_tag, is_transparent_tag, parse_fragment,
    pieces, text_content, Piece,
};
use scraper::ElementRef;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub code: bool,
    pub link: Option<String>,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text { text: String, marks: Marks },
    Image { src: String, alt: String },
    LineBreak,
}

impl Inline {
    fn len(&self) -> usize {
        match self {
            Inline::Text { text, .. } => text.chars().count(),
            Inline::Image { .. } | Inline::LineBreak => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    BulletItem,
    OrderedItem,
    Quote,
    CodeBlock(Option<String>),
    Rule,
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub inlines: Vec<Inline>,
}

impl Block {
    fn new(kind: BlockKind, inlines: Vec<Inline>) -> Self {
        Self { kind, inlines }
    }

    pub fn len(&self) -> usize {
        self.inlines.iter().map(Inline::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text(&self) -> String {
        self.inlines
            .iter()
            .map(|inline| match inline {
                Inline::Text { text, .. } => text.as_str(),
                Inline::Image { .. } => "\u{fffc}",
                Inline::LineBreak => "\n",
            })
            .collect()
    }

    /// Index of the inline starting at `offset`, splitting a text run if needed.
    fn boundary(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for idx in 0..self.inlines.len() {
            if pos == offset {
                return idx;
            }
            let len = self.inlines[idx].len();
            if offset < pos + len {
                if let Inline::Text { text, marks } = &self.inlines[idx] {
                    let at = byte_offset(text, offset - pos);
                    let head = Inline::Text {
                        text: text[..at].to_string(),
                        marks: marks.clone(),
                    };
                    let tail = Inline::Text {
                        text: text[at..].to_string(),
                        marks: marks.clone(),
                    };
                    self.inlines[idx] = head;
                    self.inlines.insert(idx + 1, tail);
                    return idx + 1;
                }
            }
            pos += len;
        }
        self.inlines.len()
    }

    fn marks_mut(&mut self, start: usize, end: usize) -> impl Iterator<Item = &mut Marks> {
        let s = self.boundary(start);
        let e = self.boundary(end);
        self.inlines[s..e].iter_mut().filter_map(|inline| match inline {
            Inline::Text { marks, .. } => Some(marks),
            _ => None,
        })
    }

    /// Marks of the character just before `offset`.
    fn marks_before(&self, offset: usize) -> Marks {
        let mut pos = 0;
        let mut found = Marks::default();
        for inline in &self.inlines {
            if pos >= offset {
                break;
            }
            found = match inline {
                Inline::Text { marks, .. } => marks.clone(),
                _ => Marks::default(),
            };
            pos += inline.len();
        }
        found
    }

    /// Char range of the link run touching `offset`.
    fn link_span(&self, offset: usize) -> Option<(usize, usize, String)> {
        let mut spans: Vec<(usize, usize, Option<&String>)> = Vec::new();
        let mut pos = 0;
        for inline in &self.inlines {
            let len = inline.len();
            let link = match inline {
                Inline::Text { marks, .. } => marks.link.as_ref(),
                _ => None,
            };
            match spans.last_mut() {
                Some(last) if last.2.is_some() && last.2 == link => last.1 = pos + len,
                _ => spans.push((pos, pos + len, link)),
            }
            pos += len;
        }
        spans.into_iter().find_map(|(start, end, link)| {
            let href = link?;
            (start <= offset && offset <= end).then(|| (start, end, href.clone()))
        })
    }

    fn normalize(&mut self) {
        let mut merged: Vec<Inline> = Vec::with_capacity(self.inlines.len());
        for inline in self.inlines.drain(..) {
            match inline {
                Inline::Text { text, .. } if text.is_empty() => {}
                Inline::Text { text, marks } => match merged.last_mut() {
                    Some(Inline::Text {
                        text: prev,
                        marks: prev_marks,
                    }) if *prev_marks == marks => prev.push_str(&text),
                    _ => merged.push(Inline::Text { text, marks }),
                },
                other => merged.push(other),
            }
        }
        self.inlines = merged;
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(idx, _)| idx)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn from_html(html: &str) -> Self {
        let fragment = parse_fragment(html);
        let mut doc = Document::default();
        doc.read_blocks(fragment.root_element(), &BlockKind::Paragraph);
        doc
    }

    fn read_blocks(&mut self, parent: ElementRef<'_>, context: &BlockKind) {
        let mut run = Vec::new();
        for piece in pieces(parent) {
            match piece {
                Piece::Element(el) if is_block_tag(el.value().name()) => {
                    self.flush_run(&mut run, context);
                    self.read_block(el, context);
                }
                Piece::Element(el) => read_inline(el, &Marks::default(), &mut run),
                Piece::Text(text) => run.push(Inline::Text {
                    text: text.to_string(),
                    marks: Marks::default(),
                }),
            }
        }
        self.flush_run(&mut run, context);
    }

    fn flush_run(&mut self, run: &mut Vec<Inline>, context: &BlockKind) {
        let inlines = tidy(std::mem::take(run));
        if !inlines.is_empty() {
            self.blocks.push(Block::new(context.clone(), inlines));
        }
    }

    fn read_block(&mut self, el: ElementRef<'_>, context: &BlockKind) {
        let name = el.value().name();
        if let Some(level) = heading_level(name) {
            self.blocks
                .push(Block::new(BlockKind::Heading(level), inline_children(el)));
            return;
        }
        match name {
            "p" => self
                .blocks
                .push(Block::new(context.clone(), inline_children(el))),
            "ul" | "ol" if is_flat_list(el) => {
                let kind = if name == "ul" {
                    BlockKind::BulletItem
                } else {
                    BlockKind::OrderedItem
                };
                for piece in pieces(el) {
                    if let Piece::Element(item) = piece {
                        let before = self.blocks.len();
                        self.read_blocks(item, &kind);
                        if self.blocks.len() == before {
                            self.blocks.push(Block::new(kind.clone(), Vec::new()));
                        }
                    }
                }
            }
            "blockquote" if is_flat_quote(el) => self.read_blocks(el, &BlockKind::Quote),
            "pre" => {
                let lang = pieces(el).find_map(|piece| match piece {
                    Piece::Element(code) if code.value().name() == "code" => code
                        .value()
                        .attr("class")
                        .and_then(|class| {
                            class
                                .split_ascii_whitespace()
                                .find_map(|c| c.strip_prefix("language-"))
                        })
                        .map(str::to_string),
                    _ => None,
                });
                let text = text_content(el);
                let text = text.strip_suffix('\n').unwrap_or(&text).to_string();
                self.blocks.push(Block::new(
                    BlockKind::CodeBlock(lang),
                    vec![Inline::Text {
                        text,
                        marks: Marks::default(),
                    }],
                ));
            }
            "hr" => self.blocks.push(Block::new(BlockKind::Rule, vec![])),
            "li" => self.read_blocks(el, context),
            _ if is_transparent_tag(name) => self.read_blocks(el, context),
            _ => self
                .blocks
                .push(Block::new(BlockKind::Raw(el.html()), vec![])),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let mut i = 0;
        while i < self.blocks.len() {
            let kind = &self.blocks[i].kind;
            let group = match kind {
                BlockKind::BulletItem => Some(("ul", "li")),
                BlockKind::OrderedItem => Some(("ol", "li")),
                BlockKind::Quote => Some(("blockquote", "p")),
                _ => None,
            };
            match group {
                Some((outer, inner)) => {
                    out.push_str(&format!("<{}>", outer));
                    while i < self.blocks.len() && self.blocks[i].kind == *kind {
                        out.push_str(&format!("<{}>", inner));
                        render_inlines(&self.blocks[i].inlines, &mut out);
                        out.push_str(&format!("</{}>", inner));
                        i += 1;
                    }
                    out.push_str(&format!("</{}>", outer));
                }
                None => {
                    render_block(&self.blocks[i], &mut out);
                    i += 1;
                }
            }
            out.push('\n');
        }
        out
    }
}

/// A list whose items each hold inline content or a single paragraph.
fn is_flat_list(list: ElementRef<'_>) -> bool {
    let starts_at_one = list
        .value()
        .attr("start")
        .map_or(true, |start| start.trim() == "1");
    starts_at_one
        && pieces(list).all(|piece| match piece {
            Piece::Text(text) => text.trim().is_empty(),
            Piece::Element(item) => item.value().name() == "li" && is_flat_item(item),
        })
}

fn is_flat_item(item: ElementRef<'_>) -> bool {
    let mut paragraphs = 0;
    let mut loose_inline = false;
    for piece in pieces(item) {
        match piece {
            Piece::Text(text) => loose_inline |= !text.trim().is_empty(),
            Piece::Element(el) if el.value().name() == "p" => paragraphs += 1,
            Piece::Element(el) if is_block_tag(el.value().name()) => return false,
            Piece::Element(_) => loose_inline = true,
        }
    }
    let has_checkbox = item
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name() == "input");
    paragraphs + usize::from(loose_inline) <= 1 && !has_checkbox
}

/// A quote holding nothing but paragraphs.
fn is_flat_quote(quote: ElementRef<'_>) -> bool {
    pieces(quote).all(|piece| match piece {
        Piece::Text(text) => text.trim().is_empty(),
        Piece::Element(el) => el.value().name() == "p",
    })
}

fn inline_children(el: ElementRef<'_>) -> Vec<Inline> {
    let mut raw = Vec::new();
    for piece in pieces(el) {
        match piece {
            Piece::Text(text) => raw.push(Inline::Text {
                text: text.to_string(),
                marks: Marks::default(),
            }),
            Piece::Element(child) => read_inline(child, &Marks::default(), &mut raw),
        }
    }
    tidy(raw)
}

fn read_inline(el: ElementRef<'_>, marks: &Marks, out: &mut Vec<Inline>) {
    let mut marks = marks.clone();
    let attr = |name: &str| el.value().attr(name).unwrap_or_default().to_string();
    match el.value().name() {
        "strong" | "b" => marks.bold = true,
        "em" | "i" => marks.italic = true,
        "u" => marks.underline = true,
        "s" | "del" | "strike" => marks.strike = true,
        "code" => marks.code = true,
        "a" => marks.link = el.value().attr("href").map(str::to_string),
        "span" => marks.style.merge(&TextStyle::from_css(&attr("style"))),
        "br" => {
            out.push(Inline::LineBreak);
            return;
        }
        "img" => {
            out.push(Inline::Image {
                src: attr("src"),
                alt: attr("alt"),
            });
            return;
        }
        _ => {}
    }
    for piece in pieces(el) {
        match piece {
            Piece::Text(text) => out.push(Inline::Text {
                text: text.to_string(),
                marks: marks.clone(),
            }),
            Piece::Element(child) => read_inline(child, &marks, out),
        }
    }
}

/// Collapses whitespace runs, trims line ends and merges equal neighbours.
fn tidy(raw: Vec<Inline>) -> Vec<Inline> {
    let mut block = Block::new(BlockKind::Paragraph, Vec::with_capacity(raw.len()));
    let mut space_ok = false;
    for inline in raw {
        match inline {
            Inline::Text { text, marks } => {
                let mut collapsed = String::with_capacity(text.len());
                for c in text.chars() {
                    if c.is_ascii_whitespace() {
                        if space_ok {
                            collapsed.push(' ');
                            space_ok = false;
                        }
                    } else {
                        collapsed.push(c);
                        space_ok = true;
                    }
                }
                block.inlines.push(Inline::Text {
                    text: collapsed,
                    marks,
                });
            }
            Inline::LineBreak => {
                trim_trailing_space(&mut block.inlines);
                block.inlines.push(Inline::LineBreak);
                space_ok = false;
            }
            image => {
                block.inlines.push(image);
                space_ok = true;
            }
        }
    }
    trim_trailing_space(&mut block.inlines);
    block.normalize();
    block.inlines
}

fn trim_trailing_space(inlines: &mut Vec<Inline>) {
    for inline in inlines.iter_mut().rev() {
        match inline {
            Inline::Text { text, .. } if text.is_empty() => continue,
            Inline::Text { text, .. } => {
                if text.ends_with(' ') {
                    text.pop();
                }
                return;
            }
            _ => return,
        }
    }
}

fn render_block(block: &Block, out: &mut String) {
    match &block.kind {
        BlockKind::Paragraph => {
            out.push_str("<p>");
            render_inlines(&block.inlines, out);
            out.push_str("</p>");
        }
        BlockKind::Heading(level) => {
            out.push_str(&format!("<h{}>", level));
            render_inlines(&block.inlines, out);
            out.push_str(&format!("</h{}>", level));
        }
        BlockKind::CodeBlock(lang) => {
            match lang {
                Some(lang) => out.push_str(&format!(
                    "<pre><code class=\"language-{}\">",
                    escape_attr(lang)
                )),
                None => out.push_str("<pre><code>"),
            }
            out.push_str(&escape_text(&block.text()));
            out.push_str("\n</code></pre>");
        }
        BlockKind::Rule => out.push_str("<hr>"),
        BlockKind::Raw(html) => out.push_str(html),
        BlockKind::BulletItem | BlockKind::OrderedItem | BlockKind::Quote => {
            render_inlines(&block.inlines, out)
        }
    }
}

fn render_inlines(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { text, marks } => {
                let mut closers: Vec<&str> = Vec::new();
                if let Some(href) = &marks.link {
                    out.push_str(&format!("<a href=\"{}\">", escape_attr(href)));
                    closers.push("</a>");
                }
                if !marks.style.is_empty() {
                    out.push_str(&format!(
                        "<span style=\"{}\">",
                        escape_attr(&marks.style.to_css())
                    ));
                    closers.push("</span>");
                }
                for (on, open, close) in [
                    (marks.bold, "<strong>", "</strong>"),
                    (marks.italic, "<em>", "</em>"),
                    (marks.underline, "<u>", "</u>"),
                    (marks.strike, "<s>", "</s>"),
                    (marks.code, "<code>", "</code>"),
                ] {
                    if on {
                        out.push_str(open);
                        closers.push(close);
                    }
                }
                out.push_str(&escape_text(text));
                for close in closers.into_iter().rev() {
                    out.push_str(close);
                }
            }
            Inline::Image { src, alt } => out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">",
                escape_attr(src),
                escape_attr(alt)
            )),
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}

/// [`VisualSurface`] over a [`Document`].
///
/// Like browser rich-text editors, every document change drops the stored
/// style; the editing session puts it back.
#[derive(Debug, Default)]
pub struct DocumentSurface {
    doc: Document,
    selection: Selection,
    stored: Option<TextStyle>,
    revision: u64,
}

impl DocumentSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    fn changed(&mut self) {
        self.revision += 1;
        self.stored = None;
    }

    fn ensure_block(&mut self) {
        if self.doc.blocks.is_empty() {
            self.doc
                .blocks
                .push(Block::new(BlockKind::Paragraph, Vec::new()));
            self.selection = Selection::default();
        }
    }

    fn current(&mut self) -> &mut Block {
        &mut self.doc.blocks[self.selection.block]
    }

    fn clamp(&self, selection: Selection) -> Selection {
        let Some(last) = self.doc.blocks.len().checked_sub(1) else {
            return Selection::default();
        };
        let block = selection.block.min(last);
        let len = self.doc.blocks[block].len();
        let start = selection.start.min(selection.end).min(len);
        let end = selection.start.max(selection.end).min(len);
        Selection { block, start, end }
    }

    fn delete_selection(&mut self) {
        let Selection { start, end, .. } = self.selection;
        if start < end {
            let block = self.current();
            let s = block.boundary(start);
            let e = block.boundary(end);
            block.inlines.drain(s..e);
            block.normalize();
            self.selection.end = start;
        }
    }

    /// Rules and raw blocks hold no text; input lands in a new paragraph
    /// after them.
    fn leave_opaque_block(&mut self) {
        if !matches!(self.current().kind, BlockKind::Rule | BlockKind::Raw(_)) {
            return;
        }
        let index = self.selection.block + 1;
        self.doc
            .blocks
            .insert(index, Block::new(BlockKind::Paragraph, Vec::new()));
        self.selection = Selection::caret(index, 0);
    }

    fn insert_run(&mut self, text: &str) {
        let at = self.selection.start;
        let stored = self.stored.clone();
        let block = self.current();
        let mut marks = block.marks_before(at);
        if let Some(style) = stored {
            marks.style.merge(&style);
        }
        let idx = block.boundary(at);
        block.inlines.insert(
            idx,
            Inline::Text {
                text: text.to_string(),
                marks,
            },
        );
        block.normalize();
        let caret = at + text.chars().count();
        self.selection.start = caret;
        self.selection.end = caret;
    }

    fn split_block(&mut self) {
        let at = self.selection.start;
        let index = self.selection.block;
        let block = self.current();
        let idx = block.boundary(at);
        let tail = block.inlines.split_off(idx);
        let kind = match &block.kind {
            BlockKind::Heading(_) | BlockKind::Rule | BlockKind::Raw(_) => BlockKind::Paragraph,
            other => other.clone(),
        };
        self.doc.blocks.insert(index + 1, Block::new(kind, tail));
        self.selection = Selection {
            block: index + 1,
            start: 0,
            end: 0,
        };
    }

    fn toggle_kind(&mut self, kind: BlockKind) {
        let block = self.current();
        if matches!(block.kind, BlockKind::Rule | BlockKind::Raw(_)) {
            return;
        }
        block.kind = if block.kind == kind {
            BlockKind::Paragraph
        } else {
            kind
        };
    }

    fn toggle_mark(&mut self, get: fn(&Marks) -> bool, set: fn(&mut Marks, bool)) {
        let Selection { start, end, .. } = self.selection;
        if start == end {
            return;
        }
        let block = self.current();
        let all = block.marks_mut(start, end).all(|m| get(m));
        for marks in block.marks_mut(start, end) {
            set(marks, !all);
        }
        block.normalize();
    }

    fn set_link(&mut self, href: Option<&str>) {
        let Selection { start, end, .. } = self.selection;
        if start < end {
            let block = self.current();
            for marks in block.marks_mut(start, end) {
                marks.link = href.map(str::to_string);
            }
            block.normalize();
            return;
        }
        let span = self.doc.blocks[self.selection.block].link_span(start);
        match (span, href) {
            (Some((s, e, _)), href) => {
                let block = self.current();
                for marks in block.marks_mut(s, e) {
                    marks.link = href.map(str::to_string);
                }
                block.normalize();
            }
            (None, Some(href)) => {
                let at = self.selection.start;
                let block = self.current();
                let mut marks = block.marks_before(at);
                marks.link = Some(href.to_string());
                let idx = block.boundary(at);
                block.inlines.insert(
                    idx,
                    Inline::Text {
                        text: href.to_string(),
                        marks,
                    },
                );
                block.normalize();
                let caret = at + href.chars().count();
                self.selection.start = caret;
                self.selection.end = caret;
            }
            (None, None) => {}
        }
    }

    fn style_selection(&mut self, apply: impl Fn(&mut TextStyle)) {
        let Selection { start, end, .. } = self.selection;
        if start == end {
            return;
        }
        let block = self.current();
        for marks in block.marks_mut(start, end) {
            apply(&mut marks.style);
        }
        block.normalize();
    }

    fn insert_image(&mut self, src: &str, alt: &str) {
        self.delete_selection();
        self.leave_opaque_block();
        let at = self.selection.start;
        let block = self.current();
        let idx = block.boundary(at);
        block.inlines.insert(
            idx,
            Inline::Image {
                src: src.to_string(),
                alt: alt.to_string(),
            },
        );
        block.normalize();
        self.selection.start = at + 1;
        self.selection.end = at + 1;
    }
}

impl VisualSurface for DocumentSurface {
    fn load_html(&mut self, html: &str) {
        self.doc = Document::from_html(html);
        self.selection = self.clamp(self.selection);
        self.changed();
    }

    fn html(&self) -> String {
        self.doc.to_html()
    }

    fn canonicalize(&self, html: &str) -> String {
        Document::from_html(html).to_html()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn select(&mut self, selection: Selection) {
        self.selection = self.clamp(selection);
        self.stored = None;
    }

    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ensure_block();
        self.delete_selection();
        self.leave_opaque_block();
        let in_code = matches!(self.current().kind, BlockKind::CodeBlock(_));
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                if in_code {
                    self.insert_run("\n");
                } else {
                    self.split_block();
                }
            }
            if !line.is_empty() {
                self.insert_run(line);
            }
        }
        self.changed();
    }

    fn compose(&mut self, text: &str) {
        self.insert_text(text);
    }

    fn exec(&mut self, command: &FormatCommand) {
        self.ensure_block();
        match command {
            FormatCommand::Bold => self.toggle_mark(|m| m.bold, |m, on| m.bold = on),
            FormatCommand::Italic => self.toggle_mark(|m| m.italic, |m, on| m.italic = on),
            FormatCommand::Underline => {
                self.toggle_mark(|m| m.underline, |m, on| m.underline = on)
            }
            FormatCommand::BulletList => self.toggle_kind(BlockKind::BulletItem),
            FormatCommand::OrderedList => self.toggle_kind(BlockKind::OrderedItem),
            FormatCommand::Heading(level) => {
                self.toggle_kind(BlockKind::Heading((*level).clamp(1, 6)))
            }
            FormatCommand::Blockquote => self.toggle_kind(BlockKind::Quote),
            FormatCommand::SetLink(href) => self.set_link(href.as_deref()),
            FormatCommand::SetColor(color) => {
                self.style_selection(|style| style.color = Some(color.clone()))
            }
            FormatCommand::SetFontFamily(font) => {
                self.style_selection(|style| style.font_family = font.clone())
            }
            FormatCommand::InsertImage { src, alt } => self.insert_image(src, alt),
        }
        self.changed();
    }

    fn link_at_selection(&self) -> Option<String> {
        let block = self.doc.blocks.get(self.selection.block)?;
        block
            .link_span(self.selection.start)
            .map(|(_, _, href)| href)
    }

    fn stored_style(&self) -> Option<TextStyle> {
        self.stored.clone()
    }

    fn set_stored_style(&mut self, style: TextStyle) {
        self.stored = (!style.is_empty()).then_some(style);
    }

    fn clear_stored_style(&mut self) {
        self.stored = None;
    }
}
