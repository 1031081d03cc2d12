//! Table of Contents extraction from Markdown

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::slug::slugify;

/// ATX headings of level 2 through 6; h1 is the page title and stays out of the TOC
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{2,6})[ \t]+(.+)$").expect("heading pattern is valid"));

/// A heading in the markdown document
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub id: String,
    pub text: String,
    pub level: u8,
}

impl Heading {
    /// Build a heading, deriving its id from the text
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        let text = text.into();
        Self {
            id: slugify(&text),
            text,
            level,
        }
    }

    /// In-page link target for this heading
    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }
}

/// Extract level 2-6 headings from raw markdown, in document order
pub fn extract_headings(content: &str) -> Vec<Heading> {
    content.lines().filter_map(parse_heading_line).collect()
}

fn parse_heading_line(line: &str) -> Option<Heading> {
    let caps = HEADING_RE.captures(line)?;
    let level = caps[1].len() as u8;
    let text = caps[2].trim();
    if text.is_empty() {
        return None;
    }
    Some(Heading::new(text, level))
}

/// Ids that more than one heading normalizes to, in order of first collision
pub fn duplicate_ids(headings: &[Heading]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut dupes: Vec<&str> = Vec::new();
    for heading in headings {
        if !seen.insert(heading.id.as_str()) && !dupes.contains(&heading.id.as_str()) {
            dupes.push(heading.id.as_str());
        }
    }
    dupes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(id: &str, text: &str, level: u8) -> Heading {
        Heading {
            id: id.to_string(),
            text: text.to_string(),
            level,
        }
    }

    #[test]
    fn test_extract_headings_empty() {
        assert!(extract_headings("").is_empty());
    }

    #[test]
    fn test_skips_level_one() {
        let headings = extract_headings("## Foo\n### Bar Baz\n# Skip\n#### Deep");
        assert_eq!(
            headings,
            vec![
                heading("foo", "Foo", 2),
                heading("bar-baz", "Bar Baz", 3),
                heading("deep", "Deep", 4),
            ]
        );
    }

    #[test]
    fn test_special_chars_stay_in_text() {
        let headings = extract_headings("## A & B!\n");
        assert_eq!(headings, vec![heading("a-b", "A & B!", 2)]);
    }

    #[test]
    fn test_all_levels() {
        let text = "# H1\n## H2\n### H3\n#### H4\n##### H5\n###### H6\n";
        let headings = extract_headings(text);

        assert_eq!(headings.len(), 5);
        for (i, heading) in headings.iter().enumerate() {
            assert_eq!(heading.level, (i + 2) as u8);
        }
    }

    #[test]
    fn test_seven_hashes_not_heading() {
        assert!(extract_headings("####### Not a heading\n").is_empty());
    }

    #[test]
    fn test_not_headings() {
        let text = "Not a ##heading\n##NoSpace\n  ## Indented\n##   \nJust text\n";
        assert!(extract_headings(text).is_empty());
    }

    #[test]
    fn test_document_order() {
        let text = "intro\n\n### Third level\n\nbody\n## Second\n\n##### Fifth\n";
        let headings = extract_headings(text);
        let texts: Vec<&str> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["Third level", "Second", "Fifth"]);
    }

    #[test]
    fn test_trims_and_handles_crlf() {
        let headings = extract_headings("##\tTabbed  \r\n## Windows\r\n");
        assert_eq!(
            headings,
            vec![heading("tabbed", "Tabbed", 2), heading("windows", "Windows", 2)]
        );
    }

    #[test]
    fn test_duplicate_ids() {
        let headings = extract_headings("## Setup\n## Usage\n### Setup!\n## Usage\n## Setup\n");
        assert_eq!(duplicate_ids(&headings), vec!["setup", "usage"]);
        assert!(duplicate_ids(&extract_headings("## One\n## Two\n")).is_empty());
    }

    #[test]
    fn test_href() {
        assert_eq!(Heading::new("Getting Started", 2).href(), "#getting-started");
    }
}
