//! HTML output for content trees and the TOC sidebar

use crate::node::{extract_text_from, Element, Node};
use crate::post::Post;
use crate::tracker::TocView;

const VOID_TAGS: [&str; 4] = ["br", "hr", "img", "input"];

/// Attributes written bare when their value is empty
const BOOLEAN_ATTRS: [&str; 6] = ["checked", "disabled", "hidden", "open", "readonly", "selected"];

/// Serialize a content tree
pub fn render(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => push_escaped(text, out),
        Node::Number(_) => push_escaped(&crate::node::extract_text(node), out),
        Node::Fragment(nodes) => nodes.iter().for_each(|n| write_node(n, out)),
        Node::Element(el) => write_element(el, out),
        Node::Empty => {}
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        if !(value.is_empty() && BOOLEAN_ATTRS.contains(&name.as_str())) {
            out.push_str("=\"");
            push_escaped(value, out);
            out.push('"');
        }
    }

    if VOID_TAGS.contains(&el.tag.as_str()) {
        out.push_str(" />");
        return;
    }

    out.push('>');
    for child in &el.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

/// Sidebar navigation; entries are in-page `#id` links
pub fn render_toc(view: &TocView) -> String {
    let mut out = String::from("<nav class=\"toc\" aria-label=\"Table of contents\"><ul>");
    for entry in &view.entries {
        out.push_str("<li class=\"toc-entry toc-indent-");
        out.push_str(&entry.indent.to_string());
        if entry.active {
            out.push_str(" active");
        }
        out.push_str("\"><a href=\"");
        push_escaped(&entry.href, &mut out);
        out.push('"');
        if entry.active {
            out.push_str(" aria-current=\"location\"");
        }
        out.push('>');
        push_escaped(&entry.text, &mut out);
        out.push_str("</a></li>");
    }
    out.push_str("</ul></nav>");
    out
}

/// Full article markup with an optional sidebar
pub fn render_post(post: &Post, content: &[Node], toc: Option<&TocView>) -> String {
    let mut out = String::from("<article class=\"post\"><header><h1>");
    push_escaped(post.title(), &mut out);
    out.push_str("</h1>");
    if let Some(date) = post.meta.date {
        out.push_str(&format!(
            "<time datetime=\"{}\">{}</time>",
            date.format("%Y-%m-%d"),
            date.format("%B %-d, %Y")
        ));
    }
    out.push_str("</header>");
    out.push_str(&render(without_title(content, post.title())));
    out.push_str("</article>");

    if let Some(view) = toc {
        out.push_str("<aside class=\"toc-sidebar\">");
        out.push_str(&render_toc(view));
        out.push_str("</aside>");
    }
    out
}

/// Content minus a leading `h1` that repeats the article title
fn without_title<'a>(content: &'a [Node], title: &str) -> &'a [Node] {
    let Some(idx) = content.iter().position(|n| !matches!(n, Node::Empty)) else {
        return content;
    };
    match &content[idx] {
        Node::Element(el) if el.tag == "h1" && extract_text_from(&el.children).trim() == title => {
            &content[idx + 1..]
        }
        _ => content,
    }
}

fn push_escaped(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
