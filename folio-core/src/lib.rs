//! Folio Core - Post model, table of contents, and heading tracking
//!
//! This crate contains the content logic for folio, independent of any UI:
//! - Slug generation and heading extraction for the table of contents
//! - Rendered content trees, text flattening, and anchored headings
//! - Active-heading tracking against a scrolling viewport
//! - Posts, front matter, and the blog index
//! - Configuration management

pub mod blog;
pub mod config;
pub mod front_matter;
pub mod heading;
pub mod html;
pub mod node;
pub mod observer;
pub mod post;
pub mod registry;
pub mod scroll;
pub mod slug;
pub mod toc;
pub mod tracker;

// Re-export commonly used types
pub use blog::BlogIndex;
pub use config::Config;
pub use node::{extract_text, Node};
pub use post::Post;
pub use registry::{ElementHandle, ElementRegistry};
pub use slug::slugify;
pub use toc::{extract_headings, Heading};
pub use tracker::{TocTracker, TocView};
