//! HTML sanitization policy.
//!
//! Only structural and inline text elements survive. The `style` attribute is
//! allowed on purpose so that color and font-family spans produced by the visual
//! editor keep their look.
//!
//! The editor policy is wider: it is what the visual surface is loaded with, and
//! everything that survives it must make it back into Markdown. Tables, code
//! languages, strikethrough, task checkboxes and list start numbers are kept.

use ammonia::Builder;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

const ALLOWED_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre", "code", "em",
    "strong", "u", "span", "a", "img", "br", "hr",
];

const ALLOWED_ATTRIBUTES: &[&str] = &["href", "src", "alt", "title", "style"];

/// Removed together with everything inside them.
const STRIPPED_WITH_CONTENT: &[&str] = &["script", "style", "iframe", "object", "embed"];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto", "data"];

const EDITOR_EXTRA_TAGS: &[&str] = &[
    "table", "thead", "tbody", "tfoot", "tr", "th", "td", "del", "s", "input",
];

static SANITIZER: Lazy<Builder<'static>> = Lazy::new(display_policy);

fn display_policy() -> Builder<'static> {
    let mut builder = Builder::default();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect::<HashSet<_>>())
        .clean_content_tags(STRIPPED_WITH_CONTENT.iter().copied().collect::<HashSet<_>>())
        .tag_attributes(HashMap::new())
        .generic_attributes(ALLOWED_ATTRIBUTES.iter().copied().collect::<HashSet<_>>())
        .url_schemes(URL_SCHEMES.iter().copied().collect::<HashSet<_>>())
        .link_rel(None);
    builder
}

static EDITOR_SANITIZER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = display_policy();
    builder
        .add_tags(EDITOR_EXTRA_TAGS)
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("ol", &["start"])
        .add_tag_attributes("th", &["align"])
        .add_tag_attributes("td", &["align"])
        .add_tag_attributes("input", &["type", "checked", "disabled"]);
    builder
});

pub fn sanitize_html(html: &str) -> String {
    SANITIZER.clean(html).to_string()
}

/// Sanitizes HTML headed for the visual editor.
pub fn sanitize_for_editor(html: &str) -> String {
    EDITOR_SANITIZER.clean(html).to_string()
}
