//! Blog post model

use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

use crate::front_matter::{split_front_matter, PostMeta};
use crate::heading::HeadingRenderer;
use crate::node::{parse_markdown, Node};
use crate::toc::{self, Heading};

const WORDS_PER_MINUTE: usize = 200;

/// A post loaded from a markdown/MDX source
#[derive(Clone, Debug)]
pub struct Post {
    pub path: Option<PathBuf>,
    pub slug: String,
    pub meta: PostMeta,
    /// Source with the front matter removed
    pub body: String,
    pub headings: Vec<Heading>,
    pub rev: u64,
}

impl Post {
    /// Load a post from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let abs_path = path
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize path: {}", path.display()))?;

        let content = fs::read_to_string(&abs_path)
            .with_context(|| format!("Failed to read file: {}", abs_path.display()))?;

        let mut post = Self::from_source(slug_for_path(&abs_path), &content)
            .with_context(|| format!("Failed to load post: {}", abs_path.display()))?;
        post.path = Some(abs_path);
        Ok(post)
    }

    /// Build a post from in-memory source
    pub fn from_source(slug: impl Into<String>, src: &str) -> Result<Self> {
        let (front_matter, body) = split_front_matter(src);
        let meta = match front_matter {
            Some(fm) => fm.parse_meta()?,
            None => PostMeta::default(),
        };
        let slug = slug.into();
        let headings = extract_checked(&slug, body);

        Ok(Self {
            path: None,
            slug,
            meta,
            body: body.to_string(),
            headings,
            rev: 1,
        })
    }

    /// Reload the post from disk
    pub fn reload(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            anyhow::bail!("Post {} was not loaded from a file", self.slug);
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to reload file: {}", path.display()))?;
        let (front_matter, body) = split_front_matter(&content);
        self.meta = match front_matter {
            Some(fm) => fm
                .parse_meta()
                .with_context(|| format!("Failed to reload post: {}", path.display()))?,
            None => PostMeta::default(),
        };
        self.headings = extract_checked(&self.slug, body);
        self.body = body.to_string();
        self.rev += 1;

        Ok(())
    }

    /// Title from metadata, then the first h1, then the slug
    pub fn title(&self) -> &str {
        if !self.meta.title.trim().is_empty() {
            return self.meta.title.trim();
        }
        self.body
            .lines()
            .find_map(|line| line.strip_prefix("# "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.slug.as_str())
    }

    /// Rendered content tree with anchored headings
    pub fn content_tree(&self, renderer: &HeadingRenderer) -> Vec<Node> {
        renderer.anchor(parse_markdown(&self.body))
    }

    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }

    /// Estimated reading time, never less than a minute
    pub fn reading_minutes(&self) -> usize {
        self.word_count().div_ceil(WORDS_PER_MINUTE).max(1)
    }

    pub fn is_draft(&self) -> bool {
        self.meta.draft
    }
}

fn extract_checked(slug: &str, body: &str) -> Vec<Heading> {
    let headings = toc::extract_headings(body);
    for id in toc::duplicate_ids(&headings) {
        warn!("post {}: several headings share the anchor #{}", slug, id);
    }
    headings
}

/// Slug for a post file: the file stem, or the directory name for `index` files
pub fn slug_for_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if stem == "index" {
        if let Some(dir) = path.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()) {
            return dir.to_string();
        }
    }
    stem.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const SAMPLE: &str = "---\ntitle: Sample\ndate: 2024-01-02\n---\n# Sample\n\n## Intro\n\nHello there.\n\n### Details\n";

    #[test]
    fn test_from_source() -> Result<()> {
        let post = Post::from_source("sample", SAMPLE)?;
        assert_eq!(post.slug, "sample");
        assert_eq!(post.title(), "Sample");
        assert!(post.body.starts_with("# Sample"));
        let ids: Vec<&str> = post.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "details"]);
        assert_eq!(post.rev, 1);
        Ok(())
    }

    #[test]
    fn test_front_matter_is_not_scanned() -> Result<()> {
        let post = Post::from_source("x", "---\ntitle: \"## not a heading\"\n---\n## Real\n")?;
        assert_eq!(post.headings.len(), 1);
        assert_eq!(post.headings[0].text, "Real");
        Ok(())
    }

    #[test]
    fn test_title_fallbacks() -> Result<()> {
        let post = Post::from_source("fallback", "# From Heading\n\ntext\n")?;
        assert_eq!(post.title(), "From Heading");

        let post = Post::from_source("fallback", "no headings here\n")?;
        assert_eq!(post.title(), "fallback");
        Ok(())
    }

    #[test]
    fn test_invalid_front_matter_is_error() {
        assert!(Post::from_source("bad", "---\ntags: [unclosed\n---\n").is_err());
    }

    #[test]
    fn test_reading_minutes() -> Result<()> {
        let short = Post::from_source("short", "a few words")?;
        assert_eq!(short.reading_minutes(), 1);

        let long_body = "word ".repeat(401);
        let long = Post::from_source("long", &long_body)?;
        assert_eq!(long.word_count(), 401);
        assert_eq!(long.reading_minutes(), 3);
        Ok(())
    }

    #[test]
    fn test_content_tree_is_anchored() -> Result<()> {
        let post = Post::from_source("sample", SAMPLE)?;
        let tree = post.content_tree(&HeadingRenderer::default());
        let ids: Vec<String> = crate::heading::anchored_ids(&tree)
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        assert_eq!(ids, vec!["intro", "details"]);
        Ok(())
    }

    #[test]
    fn test_load_and_reload() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"## First\n")?;
        file.flush()?;

        let mut post = Post::load(file.path())?;
        assert_eq!(post.rev, 1);
        assert_eq!(post.headings[0].id, "first");

        file.write_all(b"## Second\n")?;
        file.flush()?;

        post.reload()?;
        assert_eq!(post.rev, 2);
        assert_eq!(post.headings.len(), 2);
        assert_eq!(post.headings[1].id, "second");
        Ok(())
    }

    #[test]
    fn test_reload_without_path_fails() -> Result<()> {
        let mut post = Post::from_source("mem", "## x\n")?;
        assert!(post.reload().is_err());
        Ok(())
    }

    #[test]
    fn test_slug_for_path() -> Result<()> {
        let dir = TempDir::new()?;
        assert_eq!(slug_for_path(&dir.path().join("hello-world.mdx")), "hello-world");
        assert_eq!(
            slug_for_path(&dir.path().join("my-post").join("index.md")),
            "my-post"
        );
        Ok(())
    }
}
