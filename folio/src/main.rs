//! Folio - Blog posts with a live table of contents, in the terminal and as HTML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::{html, slugify, BlogIndex, Config, Post, TocTracker};
use folio_tui::App;
use log::debug;
use std::path::{Path, PathBuf};

/// Read blog posts with a table of contents that follows along
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Post to open in the reader
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a post in the terminal reader
    Read {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the table of contents of a post
    Toc {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Print headings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render a post to HTML with anchored headings
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Include the table of contents sidebar
        #[arg(long)]
        toc: bool,
    },
    /// List the posts of a content directory, newest first
    Index {
        /// Content directory; defaults to `content.dir` from the config
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Include draft posts
        #[arg(long)]
        drafts: bool,
        /// Only posts with this tag
        #[arg(long)]
        tag: Option<String>,
        /// Print summaries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the anchor id for a piece of heading text
    Slug {
        #[arg(value_name = "TEXT", required = true)]
        text: Vec<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Some(Command::Read { file }) => read(config, &file),
        Some(Command::Toc { file, json }) => print_toc(&file, json),
        Some(Command::Render { file, toc }) => print_html(&config, &file, toc),
        Some(Command::Index {
            dir,
            drafts,
            tag,
            json,
        }) => {
            let dir = dir.unwrap_or_else(|| config.content.dir.clone());
            print_index(&dir, drafts || config.content.include_drafts, tag.as_deref(), json)
        }
        Some(Command::Slug { text }) => {
            println!("{}", slugify(&text.join(" ")));
            Ok(())
        }
        None => match cli.file {
            Some(file) => read(config, &file),
            None => anyhow::bail!("No post given; run `folio --help` for usage"),
        },
    }
}

fn load_post(file: &Path) -> Result<Post> {
    Post::load(file).with_context(|| format!("Failed to load post: {}", file.display()))
}

fn read(config: Config, file: &Path) -> Result<()> {
    let post = load_post(file)?;
    debug!("opening {} with {} headings", post.slug, post.headings.len());

    let app = App::new(config, post);
    folio_tui::run(app).context("TUI application error")?;

    Ok(())
}

fn print_toc(file: &Path, json: bool) -> Result<()> {
    let post = load_post(file)?;

    if json {
        let out = serde_json::to_string_pretty(&post.headings)
            .context("Failed to serialize headings")?;
        println!("{}", out);
        return Ok(());
    }

    for heading in &post.headings {
        let indent = "  ".repeat(usize::from(heading.level.saturating_sub(2)));
        println!("{}- {} ({})", indent, heading.text, heading.href());
    }
    Ok(())
}

fn print_html(config: &Config, file: &Path, with_toc: bool) -> Result<()> {
    let post = load_post(file)?;
    let content = post.content_tree(&config.toc.heading_renderer());

    // A static page has no viewport, so the sidebar is built without a width cutoff
    let view = with_toc
        .then(|| TocTracker::new(config.toc.tracker_options()).view(&post.headings, f64::INFINITY))
        .flatten();

    println!("{}", html::render_post(&post, &content, view.as_ref()));
    Ok(())
}

fn print_index(dir: &Path, include_drafts: bool, tag: Option<&str>, json: bool) -> Result<()> {
    let index = BlogIndex::load(dir, include_drafts)?;

    let summaries: Vec<_> = match tag {
        Some(tag) => index.with_tag(tag).map(Into::into).collect(),
        None => index.summaries(),
    };

    if json {
        let out = serde_json::to_string_pretty(&summaries)
            .context("Failed to serialize post summaries")?;
        println!("{}", out);
        return Ok(());
    }

    for summary in &summaries {
        let date = summary
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "undated".to_string());
        let draft = if summary.draft { " [draft]" } else { "" };
        println!(
            "{}  {}  {} ({} min){}",
            date, summary.slug, summary.title, summary.reading_minutes, draft
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_file_only_opens_reader() {
        let cli = Cli::try_parse_from(["folio", "post.md"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.file, Some(PathBuf::from("post.md")));
    }

    #[test]
    fn test_cli_subcommands() {
        let cli = Cli::try_parse_from(["folio", "toc", "post.md", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Toc { json: true, .. })));

        let cli = Cli::try_parse_from(["folio", "index", "--drafts"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Index { dir: None, drafts: true, .. })
        ));
    }

    #[test]
    fn test_cli_slug_requires_text() {
        assert!(Cli::try_parse_from(["folio", "slug"]).is_err());
    }
}
