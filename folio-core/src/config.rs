//! Configuration management for folio

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::heading::{HeadingRenderer, DEFAULT_SCROLL_MARGIN};
use crate::observer::ObserverOptions;
use crate::tracker::{TocOptions, DEFAULT_BREAKPOINT, DEFAULT_HEADER_OFFSET};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeVariant,
    pub toc: TocConfig,
    pub reader: ReaderConfig,
    pub watch: WatchConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeVariant {
    Dark,
    Light,
}

/// Sidebar and heading anchor settings for rendered pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    pub enabled: bool,
    pub header_offset: f64,
    pub scroll_margin: u32,
    pub breakpoint: f64,
    pub root_margin_top: f64,
    pub root_margin_bottom: f64,
}

/// Terminal reader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub toc_side: TocSide,
    pub toc_width: u16,
    /// Terminal width below which the sidebar is hidden
    pub breakpoint_columns: u16,
    /// Lines kept above a heading after a TOC jump
    pub header_offset_lines: u16,
    pub smooth_scroll_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TocSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub enabled: bool,
    pub auto_reload: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub dir: PathBuf,
    pub include_drafts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeVariant::Dark,
            toc: TocConfig::default(),
            reader: ReaderConfig::default(),
            watch: WatchConfig::default(),
            content: ContentConfig::default(),
        }
    }
}

impl Default for TocConfig {
    fn default() -> Self {
        let observer = ObserverOptions::default();
        Self {
            enabled: true,
            header_offset: DEFAULT_HEADER_OFFSET,
            scroll_margin: DEFAULT_SCROLL_MARGIN,
            breakpoint: DEFAULT_BREAKPOINT,
            root_margin_top: observer.root_margin_top,
            root_margin_bottom: observer.root_margin_bottom,
        }
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            toc_side: TocSide::Left,
            toc_width: 32,
            breakpoint_columns: 100,
            header_offset_lines: 2,
            smooth_scroll_ms: 200,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_reload: false,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("content/posts"),
            include_drafts: false,
        }
    }
}

impl TocConfig {
    fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin_top: self.root_margin_top,
            root_margin_bottom: self.root_margin_bottom,
            ..ObserverOptions::default()
        }
    }

    /// Tracker options for rendered pages
    pub fn tracker_options(&self) -> TocOptions {
        TocOptions {
            observer: self.observer_options(),
            header_offset: self.header_offset,
            breakpoint: self.breakpoint,
        }
    }

    pub fn heading_renderer(&self) -> HeadingRenderer {
        HeadingRenderer::new(self.scroll_margin)
    }
}

impl Config {
    /// Get the platform-specific config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "folio")
            .map(|proj_dirs| proj_dirs.config_dir().join("folio.toml"))
    }

    /// Tracker options for the terminal reader, in lines and columns
    pub fn reader_tracker_options(&self) -> TocOptions {
        TocOptions {
            observer: self.toc.observer_options(),
            header_offset: f64::from(self.reader.header_offset_lines),
            breakpoint: f64::from(self.reader.breakpoint_columns),
        }
    }

    /// Load configuration from file, falling back to defaults if missing
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => {
                info!("loading config from {}", path.display());
                Self::load_from(&path)
            }
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        // Check config file permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("Failed to stat config file: {}", path.display()))?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.toc.header_offset < 0.0 {
            anyhow::bail!("toc.header_offset must not be negative");
        }

        Ok(config)
    }
}
