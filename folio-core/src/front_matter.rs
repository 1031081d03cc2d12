//! Front matter detection and post metadata.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Types of front matter markers that folio recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterKind {
    Yaml,
    Toml,
}

impl FrontMatterKind {
    fn as_str(&self) -> &'static str {
        match self {
            FrontMatterKind::Yaml => "yaml",
            FrontMatterKind::Toml => "toml",
        }
    }
}

impl fmt::Display for FrontMatterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A front matter block split off the top of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    pub kind: FrontMatterKind,
    /// Text between the markers
    pub raw: &'a str,
    /// Line number of the closing marker
    pub end_line: usize,
}

impl FrontMatter<'_> {
    /// Inclusive range of line numbers covered by the block, markers included.
    pub fn line_range(&self) -> std::ops::RangeInclusive<usize> {
        0..=self.end_line
    }

    /// Deserialize the block into post metadata.
    pub fn parse_meta(&self) -> Result<PostMeta> {
        match self.kind {
            FrontMatterKind::Yaml => {
                if self.raw.trim().is_empty() {
                    return Ok(PostMeta::default());
                }
                serde_yaml::from_str(self.raw).context("Failed to parse YAML front matter")
            }
            FrontMatterKind::Toml => {
                toml::from_str(self.raw).context("Failed to parse TOML front matter")
            }
        }
    }
}

/// Metadata of a blog post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostMeta {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub draft: bool,
}

struct FrontMatterMarker {
    kind: FrontMatterKind,
    start: &'static str,
    end: &'static str,
}

const FRONT_MATTER_MARKERS: [FrontMatterMarker; 2] = [
    FrontMatterMarker {
        kind: FrontMatterKind::Yaml,
        start: "---",
        end: "---",
    },
    FrontMatterMarker {
        kind: FrontMatterKind::Toml,
        start: "+++",
        end: "+++",
    },
];

/// Detects front matter at the top of a document.
pub fn detect_front_matter(src: &str) -> Option<FrontMatter<'_>> {
    split_front_matter(src).0
}

/// Splits a document into its front matter, if any, and the remaining body.
///
/// An opening marker without a closing one is not front matter; the whole
/// input is returned as the body.
pub fn split_front_matter(src: &str) -> (Option<FrontMatter<'_>>, &str) {
    let mut lines = src.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (None, src);
    };

    let first_trimmed = normalize_line(first);
    let Some(marker) = FRONT_MATTER_MARKERS
        .iter()
        .find(|marker| first_trimmed == marker.start)
    else {
        return (None, src);
    };

    let raw_start = first.len();
    let mut offset = raw_start;
    for (idx, line) in lines.enumerate() {
        if normalize_line(line) == marker.end {
            let fm = FrontMatter {
                kind: marker.kind,
                raw: &src[raw_start..offset],
                end_line: idx + 1,
            };
            return (Some(fm), &src[offset + line.len()..]);
        }
        offset += line.len();
    }

    (None, src)
}

fn normalize_line(line: &str) -> &str {
    line.trim().trim_start_matches('\u{feff}')
}
