//! Blog index: every post of a content directory, newest first

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::post::Post;

const POST_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Listing entry for a post
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub reading_minutes: usize,
    pub draft: bool,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title().to_string(),
            date: post.meta.date,
            description: post.meta.description.clone(),
            tags: post.meta.tags.clone(),
            reading_minutes: post.reading_minutes(),
            draft: post.meta.draft,
        }
    }
}

/// Posts sorted newest first; undated posts last, ties broken by slug
#[derive(Clone, Debug, Default)]
pub struct BlogIndex {
    posts: Vec<Post>,
}

impl BlogIndex {
    /// Load every post under `dir`
    ///
    /// Posts are `*.md`/`*.mdx` files directly in `dir`, or `index.md(x)`
    /// inside a subdirectory.
    pub fn load(dir: &Path, include_drafts: bool) -> Result<Self> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read content directory: {}", dir.display()))?;

        let mut posts = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to read entry in: {}", dir.display()))?;
            let Some(path) = post_file(&entry.path()) else {
                continue;
            };
            debug!("loading post {}", path.display());
            posts.push(Post::load(&path)?);
        }

        let index = Self::from_posts(posts, include_drafts);
        info!("indexed {} posts from {}", index.len(), dir.display());
        Ok(index)
    }

    pub fn from_posts(posts: Vec<Post>, include_drafts: bool) -> Self {
        let mut posts: Vec<Post> = posts
            .into_iter()
            .filter(|p| include_drafts || !p.is_draft())
            .collect();
        posts.sort_by(|a, b| {
            // None sorts below Some, so reversing puts undated posts last
            b.meta
                .date
                .cmp(&a.meta.date)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Self { posts }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn find(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    pub fn summaries(&self) -> Vec<PostSummary> {
        self.posts.iter().map(PostSummary::from).collect()
    }

    /// Tags with post counts, alphabetical
    pub fn tags(&self) -> BTreeMap<String, usize> {
        let mut tags = BTreeMap::new();
        for tag in self.posts.iter().flat_map(|p| &p.meta.tags) {
            *tags.entry(tag.clone()).or_insert(0) += 1;
        }
        tags
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Post> + 'a {
        self.posts
            .iter()
            .filter(move |p| p.meta.tags.iter().any(|t| t == tag))
    }
}

fn post_file(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        return POST_EXTENSIONS
            .iter()
            .map(|ext| path.join(format!("index.{}", ext)))
            .find(|p| p.is_file());
    }
    let ext = path.extension()?.to_str()?;
    POST_EXTENSIONS.contains(&ext).then(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn post(slug: &str, date: Option<&str>, tags: &[&str], draft: bool) -> Post {
        let mut src = String::from("---\n");
        src.push_str(&format!("title: {}\n", slug.to_uppercase()));
        if let Some(date) = date {
            src.push_str(&format!("date: {}\n", date));
        }
        src.push_str(&format!("tags: [{}]\n", tags.join(", ")));
        src.push_str(&format!("draft: {}\n---\n## Body\n", draft));
        Post::from_source(slug, &src).expect("valid post")
    }

    #[test]
    fn test_sorted_newest_first() {
        let index = BlogIndex::from_posts(
            vec![
                post("old", Some("2022-05-01"), &[], false),
                post("undated", None, &[], false),
                post("new", Some("2024-02-10"), &[], false),
                post("also-new", Some("2024-02-10"), &[], false),
            ],
            false,
        );
        let slugs: Vec<&str> = index.posts().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["also-new", "new", "old", "undated"]);
    }

    #[test]
    fn test_drafts_hidden_unless_requested() {
        let posts = vec![
            post("live", Some("2024-01-01"), &[], false),
            post("wip", Some("2024-06-01"), &[], true),
        ];
        assert_eq!(BlogIndex::from_posts(posts.clone(), false).len(), 1);

        let with_drafts = BlogIndex::from_posts(posts, true);
        assert_eq!(with_drafts.len(), 2);
        assert!(with_drafts.find("wip").is_some_and(Post::is_draft));
    }

    #[test]
    fn test_tags() {
        let index = BlogIndex::from_posts(
            vec![
                post("a", Some("2024-01-01"), &["rust", "web"], false),
                post("b", Some("2024-01-02"), &["rust"], false),
            ],
            false,
        );
        let tags: Vec<(String, usize)> = index.tags().into_iter().collect();
        assert_eq!(tags, vec![("rust".to_string(), 2), ("web".to_string(), 1)]);
        let web: Vec<&str> = index.with_tag("web").map(|p| p.slug.as_str()).collect();
        assert_eq!(web, vec!["a"]);
    }

    #[test]
    fn test_summary() {
        let summary = PostSummary::from(&post("hello", Some("2024-01-01"), &["x"], false));
        assert_eq!(summary.title, "HELLO");
        assert_eq!(summary.reading_minutes, 1);
        assert_eq!(summary.tags, vec!["x"]);
    }

    #[test]
    fn test_load_directory() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("first.md"),
            "---\ntitle: First\ndate: 2024-01-01\n---\n## One\n",
        )?;
        fs::write(
            dir.path().join("second.mdx"),
            "---\ntitle: Second\ndate: 2024-02-01\n---\n## Two\n",
        )?;
        fs::write(dir.path().join("notes.txt"), "## ignored\n")?;
        fs::create_dir(dir.path().join("bundle"))?;
        fs::write(
            dir.path().join("bundle").join("index.mdx"),
            "---\ntitle: Bundle\ndate: 2023-01-01\n---\n## Three\n",
        )?;

        let index = BlogIndex::load(dir.path(), false)?;
        let slugs: Vec<&str> = index.posts().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["second", "first", "bundle"]);
        assert_eq!(index.find("bundle").map(|p| p.title()), Some("Bundle"));
        Ok(())
    }

    #[test]
    fn test_load_missing_directory_is_error() {
        assert!(BlogIndex::load(Path::new("/definitely/not/here"), false).is_err());
    }
}
