//! Small helpers over the `scraper` tree shared by the HTML walkers.

use scraper::{ElementRef, Html, Node};

/// A child of an element that the walkers care about. Comments, doctypes and
/// processing instructions are skipped.
#[derive(Clone, Copy)]
pub enum Piece<'a> {
    Text(&'a str),
    Element(ElementRef<'a>),
}

pub fn pieces<'a>(parent: ElementRef<'a>) -> impl Iterator<Item = Piece<'a>> + 'a {
    parent.children().filter_map(|child| match child.value() {
        Node::Text(text) => Some(Piece::Text(&**text)),
        Node::Element(_) => ElementRef::wrap(child).map(Piece::Element),
        _ => None,
    })
}

pub fn parse_fragment(html: &str) -> Html {
    Html::parse_fragment(html)
}

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "dl",
    "div",
    "fieldset",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Containers that carry no meaning of their own; their children are walked
/// as if they sat in the parent.
const TRANSPARENT_TAGS: &[&str] = &[
    "article", "aside", "div", "footer", "header", "main", "nav", "section",
];

pub fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

pub fn is_transparent_tag(name: &str) -> bool {
    TRANSPARENT_TAGS.contains(&name)
}

pub fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Value of one CSS property in an inline `style` attribute.
pub fn style_property<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        (name.trim().eq_ignore_ascii_case(property)).then(|| value.trim())
    })
}

/// True when an inline style sets a text color or font family.
pub fn has_text_style(style: &str) -> bool {
    style_property(style, "color").is_some() || style_property(style, "font-family").is_some()
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Concatenated text of every descendant text node.
pub fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect()
}
