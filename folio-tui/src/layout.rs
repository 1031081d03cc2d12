//! Post layout and render cache
//!
//! Lays a content tree out into styled terminal lines at a given width and
//! records where each anchored heading landed, in lines, so the TOC tracker
//! can watch it.

use folio_core::config::ThemeVariant;
use folio_core::node::{extract_text_from, Element, Node};
use folio_core::{ElementHandle, ElementRegistry};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use std::rc::Rc;
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Key for render cache
#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub struct RenderKey {
    pub post_rev: u64,
    pub width: u16,
    pub theme: ThemeVariant,
}

/// Laid out post
#[derive(Clone, Debug, Default)]
pub struct RenderedPost {
    pub lines: Vec<Line<'static>>,
    /// Anchored headings in document order, positions in lines
    pub anchors: Vec<ElementHandle>,
}

impl RenderedPost {
    pub fn registry(&self) -> ElementRegistry {
        ElementRegistry::from_handles(self.anchors.iter().cloned())
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// LRU cache for laid out posts
pub struct RendererCache {
    cache: lru::LruCache<RenderKey, Rc<RenderedPost>>,
}

impl RendererCache {
    pub fn new() -> Self {
        Self {
            cache: lru::LruCache::new(std::num::NonZeroUsize::MIN.saturating_add(15)),
        }
    }

    pub fn get(&mut self, key: &RenderKey) -> Option<Rc<RenderedPost>> {
        self.cache.get(key).cloned()
    }

    pub fn put(&mut self, key: RenderKey, post: Rc<RenderedPost>) {
        self.cache.put(key, post);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl Default for RendererCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Lay out a content tree at `width` columns
pub fn layout(nodes: &[Node], width: u16, theme: &Theme) -> RenderedPost {
    let mut builder = Builder {
        theme,
        width: usize::from(width.max(10)),
        lines: Vec::new(),
        anchors: Vec::new(),
    };
    for node in nodes {
        builder.block(node, "", theme.base);
    }
    // Drop the trailing separator
    while builder.lines.last().is_some_and(|l| l.width() == 0) {
        builder.lines.pop();
    }
    RenderedPost {
        lines: builder.lines,
        anchors: builder.anchors,
    }
}

enum Token {
    Piece(String, Style),
    Break,
}

struct Builder<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    anchors: Vec<ElementHandle>,
}

impl Builder<'_> {
    /// Blank separator line, never doubled
    fn gap(&mut self) {
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn block(&mut self, node: &Node, prefix: &str, style: Style) {
        match node {
            Node::Element(el) => self.element(el, prefix, style),
            Node::Fragment(nodes) => nodes.iter().for_each(|n| self.block(n, prefix, style)),
            Node::Text(_) | Node::Number(_) => {
                let mut tokens = Vec::new();
                self.inline(node, style, &mut tokens);
                self.wrap(tokens, prefix, prefix);
            }
            Node::Empty => {}
        }
    }

    fn element(&mut self, el: &Element, prefix: &str, style: Style) {
        if let Some(level) = el.heading_level() {
            self.heading(el, level, prefix);
            return;
        }

        match el.tag.as_str() {
            "p" => {
                self.gap();
                let mut tokens = Vec::new();
                el.children.iter().for_each(|n| self.inline(n, style, &mut tokens));
                self.wrap(tokens, prefix, prefix);
            }
            "blockquote" => {
                self.gap();
                let quoted = format!("{}│ ", prefix);
                for child in &el.children {
                    self.block(child, &quoted, self.theme.quote);
                }
            }
            "pre" => {
                self.gap();
                let code = extract_text_from(&el.children);
                for line in code.trim_end_matches('\n').lines() {
                    self.lines.push(Line::from(vec![
                        Span::raw(format!("{}    ", prefix)),
                        Span::styled(line.to_string(), self.theme.code),
                    ]));
                }
            }
            "ul" | "ol" => {
                self.gap();
                let start: usize = el.attr("start").and_then(|s| s.parse().ok()).unwrap_or(1);
                for (i, item) in el.children.iter().enumerate() {
                    let marker = if el.tag == "ol" {
                        format!("{}. ", start + i)
                    } else {
                        "• ".to_string()
                    };
                    self.list_item(item, prefix, &marker, style);
                }
            }
            "hr" => {
                self.gap();
                let rule = "─".repeat(self.width.saturating_sub(prefix.width()));
                self.lines.push(Line::from(vec![
                    Span::raw(prefix.to_string()),
                    Span::styled(rule, self.theme.rule),
                ]));
            }
            "table" => {
                self.gap();
                self.table(el, prefix, style);
            }
            _ => el.children.iter().for_each(|n| self.block(n, prefix, style)),
        }
    }

    fn heading(&mut self, el: &Element, level: u8, prefix: &str) {
        self.gap();
        let top = self.lines.len();
        let style = self.theme.heading_style(level);
        let marker = format!("{}{} ", prefix, "#".repeat(usize::from(level)));
        let mut tokens = Vec::new();
        el.children.iter().for_each(|n| self.inline(n, style, &mut tokens));
        let indent = " ".repeat(marker.width());
        self.wrap_styled(tokens, &marker, &indent, style);

        if let Some(id) = el.attr("id") {
            let height = (self.lines.len() - top) as f64;
            self.anchors.push(ElementHandle::new(id, top as f64, height));
        }
    }

    fn list_item(&mut self, item: &Node, prefix: &str, marker: &str, style: Style) {
        let children: &[Node] = match item {
            Node::Element(el) => &el.children,
            other => std::slice::from_ref(other),
        };
        let first = format!("{}{}", prefix, marker);
        let rest = format!("{}{}", prefix, " ".repeat(marker.width()));
        let mut pending = Vec::new();
        let mut first_line = true;

        for child in children {
            if is_block(child) {
                if !pending.is_empty() {
                    self.wrap(std::mem::take(&mut pending), if first_line { &first } else { &rest }, &rest);
                    first_line = false;
                }
                if first_line {
                    // Put the marker on the first line the block produced
                    let lead = self.lines.len();
                    self.block_tight(child, &rest, style);
                    let marker = Span::styled(first.clone(), self.theme.list_marker);
                    if let Some(line) = self.lines[lead..].iter_mut().find(|l| l.width() > 0) {
                        mark_line(line, &rest, marker);
                    }
                    first_line = false;
                } else {
                    self.block(child, &rest, style);
                }
            } else {
                self.inline(child, style, &mut pending);
            }
        }
        if !pending.is_empty() {
            self.wrap(pending, if first_line { &first } else { &rest }, &rest);
        }
    }

    /// Lay out a block without the leading gap
    fn block_tight(&mut self, node: &Node, prefix: &str, style: Style) {
        match node {
            Node::Element(el) if el.tag == "p" => {
                let mut tokens = Vec::new();
                el.children.iter().for_each(|n| self.inline(n, style, &mut tokens));
                self.wrap(tokens, prefix, prefix);
            }
            other => self.block(other, prefix, style),
        }
    }

    fn table(&mut self, table: &Element, prefix: &str, style: Style) {
        let mut rows: Vec<(Vec<String>, bool)> = Vec::new();
        collect_rows(table, false, &mut rows);

        let columns = rows.iter().map(|(cells, _)| cells.len()).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for (cells, _) in &rows {
            for (i, cell) in cells.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        for (cells, header) in rows {
            let cell_style = if header {
                style.add_modifier(Modifier::BOLD)
            } else {
                style
            };
            let mut spans = vec![Span::raw(prefix.to_string())];
            for (i, cell) in cells.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" │ ", self.theme.rule));
                }
                let pad = widths[i].saturating_sub(cell.width());
                spans.push(Span::styled(format!("{}{}", cell, " ".repeat(pad)), cell_style));
            }
            self.lines.push(Line::from(spans));
        }
    }

    fn inline(&self, node: &Node, style: Style, out: &mut Vec<Token>) {
        match node {
            Node::Text(text) => push_pieces(text, style, out),
            Node::Number(_) => push_pieces(&extract_text_from(std::slice::from_ref(node)), style, out),
            Node::Fragment(nodes) => nodes.iter().for_each(|n| self.inline(n, style, out)),
            Node::Element(el) => {
                let child_style = match el.tag.as_str() {
                    "em" => style.add_modifier(Modifier::ITALIC),
                    "strong" => style.add_modifier(Modifier::BOLD),
                    "del" => style.add_modifier(Modifier::CROSSED_OUT),
                    "code" => self.theme.code,
                    "a" => self.theme.link,
                    _ => style,
                };
                match el.tag.as_str() {
                    "br" => out.push(Token::Break),
                    "img" => {
                        let alt = el.attr("alt").unwrap_or("image");
                        push_pieces(&format!("[{}]", alt), self.theme.link, out);
                    }
                    "input" => {
                        let mark = if el.attr("checked").is_some() { "[x] " } else { "[ ] " };
                        push_pieces(mark, self.theme.list_marker, out);
                    }
                    _ => el.children.iter().for_each(|n| self.inline(n, child_style, out)),
                }
            }
            Node::Empty => {}
        }
    }

    fn wrap(&mut self, tokens: Vec<Token>, first: &str, rest: &str) {
        self.wrap_styled(tokens, first, rest, Style::default());
    }

    /// Greedy word wrap; pieces wider than the line are left for the widget to clip
    fn wrap_styled(&mut self, tokens: Vec<Token>, first: &str, rest: &str, prefix_style: Style) {
        let mut spans = vec![Span::styled(first.to_string(), prefix_style)];
        let mut used = first.width();
        let mut has_content = false;

        for token in tokens {
            match token {
                Token::Break => {
                    self.lines.push(finish_line(std::mem::take(&mut spans)));
                    spans.push(Span::styled(rest.to_string(), prefix_style));
                    used = rest.width();
                    has_content = false;
                }
                Token::Piece(text, style) => {
                    let visible = text.trim_end().width();
                    if has_content && used + visible > self.width {
                        self.lines.push(finish_line(std::mem::take(&mut spans)));
                        spans.push(Span::styled(rest.to_string(), prefix_style));
                        used = rest.width();
                        has_content = false;
                    }
                    let text = if has_content { text } else { text.trim_start().to_string() };
                    if text.is_empty() {
                        continue;
                    }
                    used += text.width();
                    has_content = true;
                    spans.push(Span::styled(text, style));
                }
            }
        }

        if has_content || spans.len() > 1 {
            self.lines.push(finish_line(spans));
        }
    }
}

/// Swap the continuation indent at the start of `line` for a list marker
fn mark_line(line: &mut Line<'static>, indent: &str, marker: Span<'static>) {
    let Some(span) = line.spans.first_mut() else {
        line.spans.push(marker);
        return;
    };
    match span.content.strip_prefix(indent).map(str::to_string) {
        Some(tail) if tail.is_empty() => *span = marker,
        Some(tail) => {
            span.content = tail.into();
            line.spans.insert(0, marker);
        }
        None => line.spans.insert(0, marker),
    }
}

fn finish_line(mut spans: Vec<Span<'static>>) -> Line<'static> {
    if let Some(last) = spans.last_mut() {
        let trimmed = last.content.trim_end();
        if trimmed.len() != last.content.len() {
            last.content = trimmed.to_string().into();
        }
    }
    Line::from(spans)
}

fn is_block(node: &Node) -> bool {
    match node {
        Node::Element(el) => matches!(
            el.tag.as_str(),
            "p" | "ul" | "ol" | "pre" | "blockquote" | "table" | "hr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        ),
        _ => false,
    }
}

fn collect_rows(el: &Element, header: bool, rows: &mut Vec<(Vec<String>, bool)>) {
    for child in &el.children {
        let Node::Element(child) = child else { continue };
        match child.tag.as_str() {
            "thead" => {
                // pulldown-cmark puts header cells straight under thead
                if child.children.iter().any(|c| matches!(c, Node::Element(e) if e.tag == "td")) {
                    rows.push((cell_texts(child), true));
                } else {
                    collect_rows(child, true, rows);
                }
            }
            "tr" => rows.push((cell_texts(child), header)),
            _ => collect_rows(child, header, rows),
        }
    }
}

fn cell_texts(row: &Element) -> Vec<String> {
    row.children
        .iter()
        .filter_map(|c| match c {
            Node::Element(cell) => Some(extract_text_from(&cell.children).trim().to_string()),
            _ => None,
        })
        .collect()
}

fn push_pieces(text: &str, style: Style, out: &mut Vec<Token>) {
    for piece in text.split_inclusive(char::is_whitespace) {
        out.push(Token::Piece(piece.replace('\n', " "), style));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::heading::anchor_headings;
    use folio_core::node::parse_markdown;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn render(src: &str, width: u16) -> RenderedPost {
        layout(&anchor_headings(parse_markdown(src)), width, &Theme::dark())
    }

    #[test]
    fn test_headings_are_anchored_by_line() {
        let post = render("# Title\n\nIntro text.\n\n## First\n\nBody.\n\n### Second\n", 80);
        let ids: Vec<(&str, f64)> = post.anchors.iter().map(|a| (a.id.as_str(), a.top)).collect();
        assert_eq!(ids, vec![("first", 4.0), ("second", 8.0)]);
        assert_eq!(plain(&post.lines[4]), "## First");
        assert_eq!(post.anchors[0].height, 1.0);
    }

    #[test]
    fn test_paragraph_wraps() {
        let post = render("one two three four five six seven eight nine ten\n", 20);
        let lines: Vec<String> = post.lines.iter().map(plain).collect();
        assert_eq!(lines, vec!["one two three four", "five six seven eight", "nine ten"]);
    }

    #[test]
    fn test_long_heading_height() {
        let post = render("## alpha beta gamma delta epsilon zeta\n", 20);
        assert_eq!(post.anchors[0].height, post.line_count() as f64);
        assert!(post.line_count() > 1);
        assert!(plain(&post.lines[1]).starts_with("   "));
    }

    #[test]
    fn test_lists_and_code() {
        let post = render("- apples\n- pears\n\n1. first\n2. second\n\n```\nlet x = 1;\n```\n", 40);
        let lines: Vec<String> = post.lines.iter().map(plain).collect();
        assert!(lines.contains(&"• apples".to_string()));
        assert!(lines.contains(&"2. second".to_string()));
        assert!(lines.contains(&"    let x = 1;".to_string()));
    }

    #[test]
    fn test_list_items_starting_with_blocks() {
        let quoted = render("- > a\n- > b\n", 60);
        let lines: Vec<String> = quoted.lines.iter().map(plain).collect();
        assert!(lines.contains(&"• │ a".to_string()));
        assert!(lines.contains(&"• │ b".to_string()));

        let headed = render("- one\n- ## Two\n", 60);
        let lines: Vec<String> = headed.lines.iter().map(plain).collect();
        assert!(lines.contains(&"• one".to_string()));
        assert!(lines.contains(&"• ## Two".to_string()));
        assert_eq!(headed.anchors.len(), 1);
        assert_eq!(headed.anchors[0].id, "two");
    }

    #[test]
    fn test_list_item_after_paragraph_keeps_marker() {
        let post = render("Intro.\n\n- > quoted\n", 60);
        let lines: Vec<String> = post.lines.iter().map(plain).collect();
        assert_eq!(lines.first().map(String::as_str), Some("Intro."));
        assert!(lines.contains(&"• │ quoted".to_string()));
    }

    #[test]
    fn test_blockquote_prefix() {
        let post = render("> quoted words\n", 40);
        assert_eq!(plain(&post.lines[0]), "│ quoted words");
    }

    #[test]
    fn test_table() {
        let post = render("| a | bb |\n|---|----|\n| ccc | d |\n", 40);
        let lines: Vec<String> = post.lines.iter().map(plain).collect();
        assert_eq!(lines, vec!["a   │ bb", "ccc │ d "]);
    }

    #[test]
    fn test_registry_from_layout() {
        let post = render("## Same\n\ntext\n\n## Same\n", 40);
        assert_eq!(post.anchors.len(), 2);
        let registry = post.registry();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("same").map(|h| h.top), Some(0.0));
    }

    #[test]
    fn test_cache() {
        let mut cache = RendererCache::new();
        let key = RenderKey {
            post_rev: 1,
            width: 80,
            theme: ThemeVariant::Dark,
        };
        assert!(cache.get(&key).is_none());
        cache.put(key.clone(), Rc::new(render("## x\n", 80)));
        assert_eq!(cache.get(&key).map(|p| p.anchors.len()), Some(1));
        cache.clear();
        assert!(cache.get(&key).is_none());
    }
}
