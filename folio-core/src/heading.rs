//! Anchored heading elements (h2-h6)
//!
//! Each rendered heading gets an `id` derived from its flattened text so that
//! `#<id>` links and the TOC sidebar can find it, plus a scroll margin that
//! keeps it clear of a fixed header after an anchor jump.

use crate::node::{extract_text_from, Element, Node};
use crate::slug::slugify;

/// Default scroll margin, matching the fixed header height
pub const DEFAULT_SCROLL_MARGIN: u32 = 80;

/// Heading levels that take part in the table of contents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadingLevel {
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    pub const ALL: [HeadingLevel; 5] = [
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    pub fn from_u8(level: u8) -> Option<Self> {
        match level {
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            4 => Some(HeadingLevel::H4),
            5 => Some(HeadingLevel::H5),
            6 => Some(HeadingLevel::H6),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }
    }
}

/// Renders heading elements with anchor ids
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadingRenderer {
    pub scroll_margin: u32,
}

impl Default for HeadingRenderer {
    fn default() -> Self {
        Self {
            scroll_margin: DEFAULT_SCROLL_MARGIN,
        }
    }
}

impl HeadingRenderer {
    pub fn new(scroll_margin: u32) -> Self {
        Self { scroll_margin }
    }

    /// Wrap rendered children in a heading element carrying its anchor id
    pub fn render(&self, level: HeadingLevel, children: Vec<Node>) -> Node {
        let id = slugify(&extract_text_from(&children));
        let mut el = Element::new(level.tag(), children);
        el.set_attr("id", id);
        el.set_attr("style", format!("scroll-margin-top: {}px", self.scroll_margin));
        Node::Element(el)
    }

    /// Anchor every h2-h6 element in a rendered tree; h1 and other elements pass through
    pub fn anchor(&self, tree: Vec<Node>) -> Vec<Node> {
        tree.into_iter().map(|node| self.anchor_node(node)).collect()
    }

    fn anchor_node(&self, node: Node) -> Node {
        match node {
            Node::Element(mut el) => {
                el.children = self.anchor(std::mem::take(&mut el.children));
                match el.heading_level().and_then(HeadingLevel::from_u8) {
                    Some(level) => self.render(level, el.children),
                    None => Node::Element(el),
                }
            }
            Node::Fragment(nodes) => Node::Fragment(self.anchor(nodes)),
            other => other,
        }
    }
}

/// Render a heading with the default scroll margin
pub fn render_heading(level: HeadingLevel, children: Vec<Node>) -> Node {
    HeadingRenderer::default().render(level, children)
}

/// Anchor the headings of a tree with the default scroll margin
pub fn anchor_headings(tree: Vec<Node>) -> Vec<Node> {
    HeadingRenderer::default().anchor(tree)
}

/// Ids of anchored headings in document order, with their levels
pub fn anchored_ids(tree: &[Node]) -> Vec<(u8, String)> {
    let mut ids = Vec::new();
    collect_ids(tree, &mut ids);
    ids
}

fn collect_ids(nodes: &[Node], ids: &mut Vec<(u8, String)>) {
    for node in nodes {
        match node {
            Node::Element(el) => {
                if let (Some(level), Some(id)) = (el.heading_level(), el.attr("id")) {
                    ids.push((level, id.to_string()));
                }
                collect_ids(&el.children, ids);
            }
            Node::Fragment(children) => collect_ids(children, ids),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::parse_markdown;
    use crate::toc::extract_headings;

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(el) => el,
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_render_sets_id_and_margin() {
        let node = render_heading(HeadingLevel::H3, vec![Node::text("Getting Started")]);
        let el = element(&node);
        assert_eq!(el.tag, "h3");
        assert_eq!(el.attr("id"), Some("getting-started"));
        assert_eq!(el.attr("style"), Some("scroll-margin-top: 80px"));
    }

    #[test]
    fn test_render_flattens_inline_markup() {
        let children = vec![
            Node::text("The "),
            Node::element("code", vec![Node::text("Rc<T>")]),
            Node::text(" type"),
        ];
        let node = render_heading(HeadingLevel::H2, children);
        assert_eq!(element(&node).attr("id"), Some("the-rct-type"));
    }

    #[test]
    fn test_empty_text_gives_empty_id() {
        let node = render_heading(HeadingLevel::H4, vec![Node::Empty]);
        assert_eq!(element(&node).attr("id"), Some(""));
    }

    #[test]
    fn test_custom_margin() {
        let node = HeadingRenderer::new(96).render(HeadingLevel::H5, vec![Node::text("x")]);
        assert_eq!(element(&node).attr("style"), Some("scroll-margin-top: 96px"));
    }

    #[test]
    fn test_level_conversions() {
        for level in HeadingLevel::ALL {
            assert_eq!(HeadingLevel::from_u8(level.as_u8()), Some(level));
        }
        assert_eq!(HeadingLevel::from_u8(1), None);
        assert_eq!(HeadingLevel::from_u8(7), None);
    }

    #[test]
    fn test_anchor_skips_h1_and_nests() {
        let tree = anchor_headings(parse_markdown("# Title\n\n## Intro\n\n> ### Quoted *part*\n"));
        let h1 = element(&tree[0]);
        assert_eq!(h1.tag, "h1");
        assert_eq!(h1.attr("id"), None);

        assert_eq!(
            anchored_ids(&tree),
            vec![(2, "intro".to_string()), (3, "quoted-part".to_string())]
        );
    }

    #[test]
    fn test_rendered_ids_match_source_ids() {
        let src = "## Install\n\ntext\n\n### Build & Test\n\n#### Step 2\n";
        let from_source: Vec<String> = extract_headings(src).into_iter().map(|h| h.id).collect();
        let from_tree: Vec<String> = anchored_ids(&anchor_headings(parse_markdown(src)))
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        assert_eq!(from_source, from_tree);
    }
}
