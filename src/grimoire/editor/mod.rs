//! # Rich Text Editing Session
//!
//! One logical document, two ways to edit it:
//!
//! - **Source** (initial): the user edits Markdown text directly. Every edit
//!   notifies the host as-is.
//! - **Visual**: the Markdown is rendered to HTML and loaded into a
//!   [`VisualSurface`]. Every change on the surface is one transaction:
//!   mutate, serialize the surface HTML back to Markdown, notify the host if
//!   the Markdown changed.
//!
//! Markdown is always the source of record. Switching back to Source adopts the
//! serialized surface content; the visual document is rebuilt on every entry
//! into Visual mode.
//!
//! ## Surface readiness
//!
//! The surface is attached by the host once it exists. Until then the visual
//! toggle and every formatting control are reported disabled by [`Toolbar`],
//! and requests for them are ignored.
//!
//! ## Sticky text style
//!
//! Surfaces drop their stored style on every document change. A color or font
//! picked with a collapsed selection is therefore kept by the session and
//! re-asserted after each transaction and after composition input, until the
//! selection moves.

use crate::error::{GrimoireError, Result};
use crate::markup::dom::style_property;
use crate::markup::{html_to_markdown, Converter};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::debug;

pub mod document;

pub use document::DocumentSurface;

/// Link text used when the user leaves the text prompt empty.
pub const DEFAULT_LINK_TEXT: &str = "länk";
/// Alt text for inserted images.
pub const IMAGE_ALT: &str = "bild";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Source,
    Visual,
}

/// A caret or range inside one block of the surface, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub block: usize,
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn caret(block: usize, offset: usize) -> Self {
        Self {
            block,
            start: offset,
            end: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Inline text color and font family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub color: Option<String>,
    pub font_family: Option<String>,
}

impl TextStyle {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.font_family.is_none()
    }

    pub fn from_css(style: &str) -> Self {
        Self {
            color: style_property(style, "color").map(str::to_string),
            font_family: style_property(style, "font-family").map(str::to_string),
        }
    }

    pub fn to_css(&self) -> String {
        let mut decls = Vec::new();
        if let Some(color) = &self.color {
            decls.push(format!("color: {}", color));
        }
        if let Some(font) = &self.font_family {
            decls.push(format!("font-family: {}", font));
        }
        decls.join("; ")
    }

    /// Overrides every property set in `other`.
    pub fn merge(&mut self, other: &TextStyle) {
        if other.color.is_some() {
            self.color = other.color.clone();
        }
        if other.font_family.is_some() {
            self.font_family = other.font_family.clone();
        }
    }
}

/// Font families offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontChoice {
    System,
    Serif,
    Monospace,
    Calligraphic,
}

impl FontChoice {
    /// CSS font stack, `None` for the system default.
    pub fn stack(&self) -> Option<&'static str> {
        match self {
            FontChoice::System => None,
            FontChoice::Serif => Some("Georgia, 'Times New Roman', serif"),
            FontChoice::Monospace => Some("'Courier New', Courier, monospace"),
            FontChoice::Calligraphic => Some("'Apple Chancery', 'URW Chancery L', cursive"),
        }
    }
}

/// Commands a surface executes against its current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    BulletList,
    OrderedList,
    Heading(u8),
    Blockquote,
    /// `None` removes the link mark.
    SetLink(Option<String>),
    SetColor(String),
    SetFontFamily(Option<String>),
    InsertImage { src: String, alt: String },
}

/// The rich-text editing surface the session drives in Visual mode.
pub trait VisualSurface {
    /// Replaces the whole document. Always counts as a change.
    fn load_html(&mut self, html: &str);
    fn html(&self) -> String;
    /// The form `html()` would report after `load_html(html)`.
    fn canonicalize(&self, html: &str) -> String;
    /// Bumped on every document change.
    fn revision(&self) -> u64;
    fn selection(&self) -> Selection;
    fn select(&mut self, selection: Selection);
    fn insert_text(&mut self, text: &str);
    /// Commits IME composition input.
    fn compose(&mut self, text: &str);
    fn exec(&mut self, command: &FormatCommand);
    fn link_at_selection(&self) -> Option<String>;
    fn stored_style(&self) -> Option<TextStyle>;
    fn set_stored_style(&mut self, style: TextStyle);
    fn clear_stored_style(&mut self);
}

/// Asks the user for a line of text. `None` means cancelled.
pub trait Prompter {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Toolbar {
    pub visual_toggle: bool,
    pub formatting: bool,
}

type Listener = Box<dyn FnMut(&str)>;

pub struct EditingSession {
    markdown: String,
    mode: Mode,
    surface: Option<Box<dyn VisualSurface>>,
    converter: Converter,
    listeners: Vec<Listener>,
    sticky: Option<TextStyle>,
    /// Source-mode selection as char offsets into `markdown`.
    source_selection: (usize, usize),
}

impl EditingSession {
    pub fn new(markdown: impl Into<String>) -> Self {
        let markdown = markdown.into();
        let end = markdown.chars().count();
        Self {
            markdown,
            mode: Mode::Source,
            surface: None,
            converter: Converter::for_editor(),
            listeners: Vec::new(),
            sticky: None,
            source_selection: (end, end),
        }
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn surface(&self) -> Option<&dyn VisualSurface> {
        self.surface.as_deref()
    }

    pub fn attach_surface(&mut self, surface: Box<dyn VisualSurface>) {
        debug!("visual surface attached");
        self.surface = Some(surface);
        if self.mode == Mode::Visual {
            self.load_surface();
        }
    }

    /// Registers a host callback receiving the Markdown after each user change.
    pub fn on_change(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn toolbar(&self) -> Toolbar {
        let ready = self.surface.is_some();
        Toolbar {
            visual_toggle: ready,
            formatting: ready && self.mode == Mode::Visual,
        }
    }

    fn notify(&mut self) {
        let markdown = self.markdown.clone();
        for listener in self.listeners.iter_mut() {
            listener(&markdown);
        }
    }

    fn load_surface(&mut self) {
        let html = self.converter.render_to_html(&self.markdown);
        if let Some(surface) = self.surface.as_mut() {
            surface.load_html(&html);
        }
    }

    /// Switches modes. Entering Visual without a surface is ignored.
    pub fn switch_mode(&mut self, mode: Mode) -> bool {
        if mode == self.mode {
            return true;
        }
        match mode {
            Mode::Visual => {
                if self.surface.is_none() {
                    debug!("visual mode requested before the surface is ready");
                    return false;
                }
                self.mode = Mode::Visual;
                self.load_surface();
            }
            Mode::Source => {
                self.sync_from_surface();
                self.mode = Mode::Source;
                self.sticky = None;
                let end = self.markdown.chars().count();
                self.source_selection = (end, end);
            }
        }
        true
    }

    /// External update from the host. Never notifies.
    pub fn set_markdown(&mut self, markdown: &str) {
        self.markdown = markdown.to_string();
        self.clamp_source_selection();
        if self.mode != Mode::Visual {
            return;
        }
        let html = self.converter.render_to_html(markdown);
        if let Some(surface) = self.surface.as_mut() {
            if surface.canonicalize(&html) == surface.html() {
                debug!("external update matches the surface, not reloading");
                return;
            }
            surface.load_html(&html);
        }
    }

    /// A user edit of the Markdown text in Source mode.
    pub fn edit_source(&mut self, markdown: &str) {
        if self.mode != Mode::Source {
            return;
        }
        self.markdown = markdown.to_string();
        self.clamp_source_selection();
        self.notify();
    }

    pub fn set_source_selection(&mut self, start: usize, end: usize) {
        self.source_selection = (start.min(end), start.max(end));
        self.clamp_source_selection();
    }

    pub fn source_selection(&self) -> (usize, usize) {
        self.source_selection
    }

    fn clamp_source_selection(&mut self) {
        let len = self.markdown.chars().count();
        let (start, end) = self.source_selection;
        self.source_selection = (start.min(len), end.min(len));
    }

    fn formatting_enabled(&self) -> bool {
        self.toolbar().formatting
    }

    /// Serializes the surface and adopts the result; notifies if it changed.
    fn sync_from_surface(&mut self) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        if self.mode != Mode::Visual {
            return;
        }
        let markdown = html_to_markdown(&surface.html());
        if markdown != self.markdown {
            self.markdown = markdown;
            self.notify();
        }
    }

    fn after_transaction(&mut self) {
        if let (Some(surface), Some(style)) = (self.surface.as_mut(), self.sticky.as_ref()) {
            surface.set_stored_style(style.clone());
        }
        self.sync_from_surface();
    }

    /// Runs one formatting command as a transaction. Ignored when disabled.
    pub fn apply(&mut self, command: FormatCommand) -> bool {
        if !self.formatting_enabled() {
            debug!(?command, "formatting ignored, surface not ready");
            return false;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.exec(&command);
        }
        self.after_transaction();
        true
    }

    /// Typed text in Visual mode.
    pub fn type_text(&mut self, text: &str) -> bool {
        if !self.formatting_enabled() {
            return false;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.insert_text(text);
        }
        self.after_transaction();
        true
    }

    /// Committed composition (IME) input in Visual mode.
    pub fn compose(&mut self, text: &str) -> bool {
        if !self.formatting_enabled() {
            return false;
        }
        if let (Some(surface), Some(style)) = (self.surface.as_mut(), self.sticky.as_ref()) {
            surface.set_stored_style(style.clone());
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.compose(text);
        }
        self.after_transaction();
        true
    }

    /// Moves the visual selection; a real move drops the sticky style.
    pub fn select(&mut self, selection: Selection) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if surface.selection() != selection {
            self.sticky = None;
            surface.clear_stored_style();
        }
        surface.select(selection);
    }

    pub fn sticky_style(&self) -> Option<&TextStyle> {
        self.sticky.as_ref()
    }

    pub fn set_color(&mut self, color: &str) -> bool {
        if !self.formatting_enabled() {
            return false;
        }
        self.sticky
            .get_or_insert_with(TextStyle::default)
            .color = Some(color.to_string());
        self.apply(FormatCommand::SetColor(color.to_string()))
    }

    /// `System` clears the font and every pending style.
    pub fn set_font(&mut self, font: FontChoice) -> bool {
        if !self.formatting_enabled() {
            return false;
        }
        match font.stack() {
            Some(stack) => {
                self.sticky
                    .get_or_insert_with(TextStyle::default)
                    .font_family = Some(stack.to_string());
                self.apply(FormatCommand::SetFontFamily(Some(stack.to_string())))
            }
            None => {
                self.sticky = None;
                if let Some(surface) = self.surface.as_mut() {
                    surface.clear_stored_style();
                }
                self.apply(FormatCommand::SetFontFamily(None))
            }
        }
    }

    /// Prompts for a link and applies it in the current mode. Returns whether a
    /// link edit was made.
    pub fn insert_link(&mut self, prompter: &mut dyn Prompter) -> bool {
        match self.mode {
            Mode::Visual => self.insert_visual_link(prompter),
            Mode::Source => self.insert_source_link(prompter),
        }
    }

    fn insert_visual_link(&mut self, prompter: &mut dyn Prompter) -> bool {
        if !self.formatting_enabled() {
            return false;
        }
        let current = self
            .surface
            .as_ref()
            .and_then(|s| s.link_at_selection())
            .unwrap_or_else(|| "https://".to_string());
        let Some(url) = prompter.prompt("URL", &current) else {
            return false;
        };
        let url = url.trim();
        let href = (!url.is_empty()).then(|| url.to_string());
        self.apply(FormatCommand::SetLink(href))
    }

    fn insert_source_link(&mut self, prompter: &mut dyn Prompter) -> bool {
        let (start, end) = self.source_selection;
        let selected = char_slice(&self.markdown, start, end).to_string();
        let text = if start < end {
            selected
        } else {
            let text = prompter.prompt("Text", DEFAULT_LINK_TEXT).unwrap_or_default();
            if text.trim().is_empty() {
                DEFAULT_LINK_TEXT.to_string()
            } else {
                text
            }
        };
        let url = match prompter.prompt("URL", "https://") {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => return false,
        };
        self.replace_source_selection(&format!("[{}]({})", text, url));
        true
    }

    fn replace_source_selection(&mut self, snippet: &str) {
        let (start, end) = self.source_selection;
        let from = byte_index(&self.markdown, start);
        let to = byte_index(&self.markdown, end);
        self.markdown.replace_range(from..to, snippet);
        let caret = start + snippet.chars().count();
        self.source_selection = (caret, caret);
        self.notify();
    }

    /// Reads image files and inserts them at the caret.
    ///
    /// Returns the data URIs in input order so the host can keep them with the
    /// entry.
    pub fn insert_images(&mut self, paths: &[PathBuf]) -> Result<Vec<String>> {
        if self.mode == Mode::Visual && !self.formatting_enabled() {
            return Ok(Vec::new());
        }
        let uris = read_images(paths)?;
        if uris.is_empty() {
            return Ok(uris);
        }
        match self.mode {
            Mode::Source => {
                let snippet = uris
                    .iter()
                    .map(|uri| format!("![{}]({})", IMAGE_ALT, uri))
                    .collect::<Vec<_>>()
                    .join("\n");
                self.replace_source_selection(&snippet);
            }
            Mode::Visual => {
                if let Some(surface) = self.surface.as_mut() {
                    for uri in &uris {
                        surface.exec(&FormatCommand::InsertImage {
                            src: uri.clone(),
                            alt: IMAGE_ALT.to_string(),
                        });
                    }
                }
                self.after_transaction();
            }
        }
        Ok(uris)
    }
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(idx, _)| idx)
}

fn char_slice(text: &str, start: usize, end: usize) -> &str {
    &text[byte_index(text, start)..byte_index(text, end)]
}

/// Reads every file on its own thread and returns data URIs in input order.
pub fn read_images(paths: &[PathBuf]) -> Result<Vec<String>> {
    thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| scope.spawn(move || data_uri(path)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| GrimoireError::Api("image reader panicked".to_string()))?
            })
            .collect()
    })
}

fn data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format!(
        "data:{};base64,{}",
        mime_for(path),
        STANDARD.encode(bytes)
    ))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    struct Scripted(VecDeque<Option<String>>);

    impl Scripted {
        fn new(answers: &[Option<&str>]) -> Self {
            Self(answers.iter().map(|a| a.map(str::to_string)).collect())
        }
    }

    impl Prompter for Scripted {
        fn prompt(&mut self, _message: &str, _default: &str) -> Option<String> {
            self.0.pop_front().flatten()
        }
    }

    fn recorded(session: &mut EditingSession) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.on_change(move |md| sink.borrow_mut().push(md.to_string()));
        seen
    }

    fn visual(markdown: &str) -> EditingSession {
        let mut session = EditingSession::new(markdown);
        session.attach_surface(Box::new(DocumentSurface::new()));
        assert!(session.switch_mode(Mode::Visual));
        session
    }

    #[test]
    fn controls_disabled_until_surface_attached() {
        let mut session = EditingSession::new("text");
        assert_eq!(session.toolbar(), Toolbar::default());
        assert!(!session.switch_mode(Mode::Visual));
        assert!(!session.apply(FormatCommand::Bold));
        assert_eq!(session.mode(), Mode::Source);

        session.attach_surface(Box::new(DocumentSurface::new()));
        assert!(session.toolbar().visual_toggle);
        assert!(!session.toolbar().formatting);
        session.switch_mode(Mode::Visual);
        assert!(session.toolbar().formatting);
    }

    #[test]
    fn source_edits_notify_directly() {
        let mut session = EditingSession::new("");
        let seen = recorded(&mut session);
        session.edit_source("# a");
        session.edit_source("# a");
        assert_eq!(*seen.borrow(), vec!["# a", "# a"]);
    }

    #[test]
    fn external_update_does_not_notify() {
        let mut session = visual("one");
        let seen = recorded(&mut session);
        session.set_markdown("two");
        assert!(seen.borrow().is_empty());
        assert_eq!(session.markdown(), "two");
    }

    #[test]
    fn identical_external_update_does_not_reload() {
        let mut session = visual("# Ginger\n\nGinger is **warming**.");
        let surface = session.surface().map(|s| s.revision());
        session.set_markdown("# Ginger\n\nGinger is **warming**.");
        assert_eq!(session.surface().map(|s| s.revision()), surface);

        session.set_markdown("# Ginger\n\nGinger is *warming*.");
        assert!(session.surface().map(|s| s.revision()) > surface);
    }

    #[test]
    fn visual_roundtrip_keeps_markdown() {
        let mut session = visual("# Ginger\n\nGinger is **warming**.");
        let seen = recorded(&mut session);
        session.switch_mode(Mode::Source);
        assert_eq!(session.markdown(), "# Ginger\n\nGinger is **warming**.");
        assert!(seen.borrow().is_empty());
    }

    fn toggled(markdown: &str) -> String {
        let mut session = visual(markdown);
        session.switch_mode(Mode::Source);
        session.markdown().to_string()
    }

    fn assert_toggle_keeps_meaning(markdown: &str) {
        let converter = Converter::unsanitized();
        let back = toggled(markdown);
        assert_eq!(
            converter.render_to_html(&back),
            converter.render_to_html(markdown),
            "{markdown:?} came back as {back:?}"
        );
    }

    #[test]
    fn toggle_keeps_nested_and_quoted_lists() {
        assert_toggle_keeps_meaning("- a\n  - nested\n- b");
        assert_toggle_keeps_meaning("> - quoted item\n> - another");
        assert_toggle_keeps_meaning("- first para\n\n  second para\n- b");
        assert_toggle_keeps_meaning("- [x] done\n- [ ] open");
        assert_toggle_keeps_meaning("3. three\n4. four");
    }

    #[test]
    fn toggle_keeps_code_language_and_tables() {
        assert_eq!(
            toggled("```rust\nfn main() {}\n```"),
            "```rust\nfn main() {}\n```"
        );
        let table = "| a | b |\n|---|---|\n| 1 | 2 |";
        assert!(toggled(table).starts_with('|'));
        assert_toggle_keeps_meaning(table);
    }

    #[test]
    fn toggle_keeps_literal_syntax_characters() {
        assert_toggle_keeps_meaning(r"a \*not emphasis\* b");
        assert_toggle_keeps_meaning(r"1\. not a list");
        assert_toggle_keeps_meaning("~~gone~~ and kept");
    }

    #[test]
    fn typing_after_a_rule_starts_a_paragraph() {
        let mut session = visual("a\n\n---");
        session.select(Selection::caret(1, 0));
        assert!(session.type_text("typed"));
        assert_eq!(session.markdown(), "a\n\n---\n\ntyped");
    }

    #[test]
    fn formatting_is_a_transaction() {
        let mut session = visual("hello world");
        let seen = recorded(&mut session);
        session.select(Selection {
            block: 0,
            start: 0,
            end: 5,
        });
        assert!(session.apply(FormatCommand::Bold));
        assert_eq!(session.markdown(), "**hello** world");
        assert_eq!(*seen.borrow(), vec!["**hello** world"]);

        session.apply(FormatCommand::Heading(2));
        assert_eq!(session.markdown(), "## **hello** world");
    }

    #[test]
    fn sticky_color_survives_typing_until_selection_moves() {
        let mut session = visual("a");
        session.select(Selection::caret(0, 1));
        session.set_color("#ff0000");
        session.type_text("b");
        session.type_text("c");
        assert!(session
            .markdown()
            .contains(r#"<span style="color: #ff0000">bc</span>"#));

        session.select(Selection::caret(0, 0));
        assert!(session.sticky_style().is_none());
        session.type_text("z");
        assert!(session.markdown().starts_with('z'));
    }

    #[test]
    fn sticky_color_is_reapplied_after_composition() {
        let mut session = visual("a");
        session.select(Selection::caret(0, 1));
        session.set_color("#ff0000");
        assert!(session.compose("b"));
        assert!(session.compose("c"));
        assert!(session
            .markdown()
            .contains(r#"<span style="color: #ff0000">bc</span>"#));
        let stored = session.surface().and_then(|s| s.stored_style());
        assert_eq!(
            stored.and_then(|style| style.color).as_deref(),
            Some("#ff0000")
        );
    }

    #[test]
    fn differing_external_update_reloads_and_clamps_selection() {
        let mut session = visual("one\n\ntwo three");
        session.select(Selection {
            block: 1,
            start: 4,
            end: 9,
        });
        let before = session.surface().map(|s| s.revision());
        let seen = recorded(&mut session);

        session.set_markdown("x");
        assert!(session.surface().map(|s| s.revision()) > before);
        assert_eq!(
            session.surface().map(|s| s.selection()),
            Some(Selection::caret(0, 1))
        );
        assert_eq!(session.markdown(), "x");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn system_font_clears_pending_style() {
        let mut session = visual("a");
        session.set_font(FontChoice::Serif);
        assert!(session.sticky_style().is_some());
        session.set_font(FontChoice::System);
        assert!(session.sticky_style().is_none());
    }

    #[test]
    fn source_link_wraps_selection() {
        let mut session = EditingSession::new("see site now");
        session.set_source_selection(4, 8);
        assert!(session.insert_link(&mut Scripted::new(&[Some("https://a.org")])));
        assert_eq!(session.markdown(), "see [site](https://a.org) now");
        assert_eq!(session.source_selection(), (25, 25));
    }

    #[test]
    fn source_link_without_selection_defaults_text() {
        let mut session = EditingSession::new("x ");
        session.set_source_selection(2, 2);
        assert!(session.insert_link(&mut Scripted::new(&[None, Some("https://a.org")])));
        assert_eq!(session.markdown(), "x [länk](https://a.org)");
    }

    #[test]
    fn source_link_blank_url_aborts() {
        let mut session = EditingSession::new("x");
        let seen = recorded(&mut session);
        assert!(!session.insert_link(&mut Scripted::new(&[Some("t"), Some("  ")])));
        assert_eq!(session.markdown(), "x");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn visual_link_empty_url_removes_link() {
        let mut session = visual("[site](https://a.org)");
        session.select(Selection::caret(0, 2));
        session.insert_link(&mut Scripted::new(&[Some("")]));
        assert_eq!(session.markdown(), "site");
    }

    #[test]
    fn images_are_inserted_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.png");
        let second = dir.path().join("b.jpg");
        std::fs::write(&first, b"one").unwrap();
        std::fs::write(&second, b"two").unwrap();

        let mut session = EditingSession::new("");
        let uris = session.insert_images(&[first, second]).unwrap();
        assert_eq!(uris[0], "data:image/png;base64,b25l");
        assert_eq!(uris[1], "data:image/jpeg;base64,dHdv");
        assert_eq!(
            session.markdown(),
            "![bild](data:image/png;base64,b25l)\n![bild](data:image/jpeg;base64,dHdv)"
        );
    }

    #[test]
    fn missing_image_is_an_io_error() {
        let mut session = EditingSession::new("");
        let err = session
            .insert_images(&[PathBuf::from("/nonexistent/img.png")])
            .unwrap_err();
        assert!(matches!(err, GrimoireError::Io(_)));
    }
}
