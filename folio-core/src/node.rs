//! Rendered content tree and plain-text flattening

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use std::fmt::Write as _;

/// A node of rendered content
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Literal text
    Text(String),
    /// Numeric leaf, rendered in its shortest decimal form
    Number(f64),
    /// Ordered run of sibling nodes
    Fragment(Vec<Node>),
    /// Markup element with children
    Element(Element),
    /// Content that carries no text (raw HTML, JSX, void markers)
    Empty,
}

/// A markup element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children,
        }
    }

    /// Look up an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any existing value
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Heading level for `h1`..`h6` tags
    pub fn heading_level(&self) -> Option<u8> {
        let digit = self.tag.strip_prefix('h')?;
        match digit {
            "1" | "2" | "3" | "4" | "5" | "6" => digit.parse().ok(),
            _ => None,
        }
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(Element::new(tag, children))
    }
}

/// Flatten a node into its text content, leaves concatenated in order
pub fn extract_text(node: &Node) -> String {
    let mut out = String::new();
    push_text(node, &mut out);
    out
}

/// Flatten a list of sibling nodes
pub fn extract_text_from(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        push_text(node, &mut out);
    }
    out
}

fn push_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Number(n) => push_number(*n, out),
        Node::Fragment(nodes) => nodes.iter().for_each(|n| push_text(n, out)),
        Node::Element(el) => el.children.iter().for_each(|n| push_text(n, out)),
        Node::Empty => {}
    }
}

fn push_number(n: f64, out: &mut String) {
    if n.is_infinite() {
        out.push_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        let _ = write!(out, "{}", n);
    }
}

/// Parse markdown into a content tree
///
/// Raw HTML and inline JSX carry no text and become [`Node::Empty`].
pub fn parse_markdown(src: &str) -> Vec<Node> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(src, options);

    // Open elements; the root frame collects top-level nodes
    let mut stack: Vec<Element> = vec![Element::default()];

    for event in parser {
        match event {
            Event::Start(tag) => stack.push(element_for(tag)),
            Event::End(_) => {
                if stack.len() < 2 {
                    continue;
                }
                if let Some(mut el) = stack.pop() {
                    if el.tag == "img" {
                        let alt = extract_text_from(&el.children);
                        el.set_attr("alt", alt);
                        el.children.clear();
                    }
                    push_child(&mut stack, Node::Element(el));
                }
            }
            Event::Text(text) => push_child(&mut stack, Node::text(text.to_string())),
            Event::Code(code) => {
                push_child(&mut stack, Node::element("code", vec![Node::text(code.to_string())]))
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                push_child(&mut stack, Node::text(math.to_string()))
            }
            Event::SoftBreak => push_child(&mut stack, Node::text("\n")),
            Event::HardBreak => push_child(&mut stack, Node::element("br", Vec::new())),
            Event::Rule => push_child(&mut stack, Node::element("hr", Vec::new())),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input", Vec::new());
                input.set_attr("type", "checkbox");
                input.set_attr("disabled", "");
                if checked {
                    input.set_attr("checked", "");
                }
                push_child(&mut stack, Node::Element(input));
            }
            // Html, InlineHtml, FootnoteReference
            _ => push_child(&mut stack, Node::Empty),
        }
    }

    // Unbalanced input cannot happen with pulldown-cmark, but fold leftovers anyway
    while stack.len() > 1 {
        if let Some(el) = stack.pop() {
            push_child(&mut stack, Node::Element(el));
        }
    }

    stack.pop().map(|root| root.children).unwrap_or_default()
}

fn push_child(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn element_for(tag: Tag<'_>) -> Element {
    match tag {
        Tag::Paragraph => Element::new("p", Vec::new()),
        Tag::Heading { level, .. } => Element::new(heading_tag(level), Vec::new()),
        Tag::BlockQuote(_) => Element::new("blockquote", Vec::new()),
        Tag::CodeBlock(kind) => {
            let mut el = Element::new("pre", Vec::new());
            if let CodeBlockKind::Fenced(lang) = kind {
                let lang = lang.split_whitespace().next().unwrap_or_default();
                if !lang.is_empty() {
                    el.set_attr("data-language", lang);
                }
            }
            el
        }
        Tag::List(Some(start)) => {
            let mut el = Element::new("ol", Vec::new());
            if start != 1 {
                el.set_attr("start", start.to_string());
            }
            el
        }
        Tag::List(None) => Element::new("ul", Vec::new()),
        Tag::Item => Element::new("li", Vec::new()),
        Tag::Table(_) => Element::new("table", Vec::new()),
        Tag::TableHead => Element::new("thead", Vec::new()),
        Tag::TableRow => Element::new("tr", Vec::new()),
        Tag::TableCell => Element::new("td", Vec::new()),
        Tag::Emphasis => Element::new("em", Vec::new()),
        Tag::Strong => Element::new("strong", Vec::new()),
        Tag::Strikethrough => Element::new("del", Vec::new()),
        Tag::Link { dest_url, title, .. } => {
            let mut el = Element::new("a", Vec::new());
            el.set_attr("href", dest_url.to_string());
            if !title.is_empty() {
                el.set_attr("title", title.to_string());
            }
            el
        }
        Tag::Image { dest_url, .. } => {
            let mut el = Element::new("img", Vec::new());
            el.set_attr("src", dest_url.to_string());
            el
        }
        _ => Element::new("div", Vec::new()),
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}
