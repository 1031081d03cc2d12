//! Application state

use anyhow::Result;
use folio_core::config::ThemeVariant;
use folio_core::observer::Viewport;
use folio_core::scroll::SmoothScroll;
use folio_core::{Config, ElementRegistry, Heading, Post, TocTracker, TocView};
use log::debug;
#[cfg(feature = "watch")]
use log::warn;
use ratatui::layout::Rect;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::layout::{layout, RenderKey, RenderedPost, RendererCache};
use crate::theme::Theme;

#[cfg(feature = "watch")]
use crate::watcher::PostWatcher;

/// Quiet period before an external edit is acted on
#[cfg(feature = "watch")]
const WATCH_DEBOUNCE: Duration = Duration::from_millis(250);

/// Terminal size in cells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TermSize {
    pub width: u16,
    pub height: u16,
}

struct Animation {
    scroll: SmoothScroll,
    started: Instant,
}

/// Main application state
pub struct App {
    pub config: Config,
    pub post: Post,
    pub theme: Theme,
    pub theme_variant: ThemeVariant,
    pub tracker: TocTracker,
    pub registry: ElementRegistry,
    pub rendered: Rc<RenderedPost>,
    pub scroll: usize,
    pub size: TermSize,
    pub show_toc: bool,
    pub toc_focus: bool,
    pub toc_selected: usize,
    /// Inner area of the sidebar from the last frame, for mouse hits
    pub toc_area: Option<Rect>,
    pub show_help: bool,
    pub should_quit: bool,
    pub dirty_on_disk: bool,
    pub status_message: Option<String>,
    #[cfg(feature = "watch")]
    pub watcher: Option<PostWatcher>,
    cache: RendererCache,
    layout_key: Option<RenderKey>,
    animation: Option<Animation>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, post: Post) -> Self {
        #[cfg(feature = "watch")]
        let watcher = match (&post.path, config.watch.enabled) {
            (Some(path), true) => PostWatcher::new(path)
                .map_err(|e| warn!("file watching disabled: {:#}", e))
                .ok(),
            _ => None,
        };

        Self {
            theme: Theme::for_variant(config.theme),
            theme_variant: config.theme,
            tracker: TocTracker::new(config.reader_tracker_options()),
            show_toc: config.toc.enabled,
            config,
            post,
            registry: ElementRegistry::new(),
            rendered: Rc::new(RenderedPost::default()),
            scroll: 0,
            size: TermSize::default(),
            toc_focus: false,
            toc_selected: 0,
            toc_area: None,
            show_help: false,
            should_quit: false,
            dirty_on_disk: false,
            status_message: None,
            #[cfg(feature = "watch")]
            watcher,
            cache: RendererCache::new(),
            layout_key: None,
            animation: None,
        }
    }

    /// Update terminal size, laying the post out again if the width changed
    pub fn resize(&mut self, width: u16, height: u16) {
        let size = TermSize { width, height };
        if size != self.size {
            self.size = size;
            self.relayout();
            self.scroll = self.scroll.min(self.max_scroll());
            self.sync_toc();
        }
    }

    /// Sidebar contents for the current terminal width
    pub fn toc_view(&self) -> Option<TocView> {
        if !self.show_toc {
            return None;
        }
        self.tracker.view(&self.post.headings, f64::from(self.size.width))
    }

    pub fn sidebar_visible(&self) -> bool {
        self.toc_view().is_some()
    }

    /// Text columns inside the content pane borders
    pub fn content_width(&self) -> u16 {
        let toc = if self.sidebar_visible() {
            self.config.reader.toc_width
        } else {
            0
        };
        self.size.width.saturating_sub(toc).saturating_sub(2)
    }

    /// Text rows inside the content pane borders, above the status bar
    pub fn content_height(&self) -> usize {
        usize::from(self.size.height.saturating_sub(3))
    }

    pub fn max_scroll(&self) -> usize {
        self.rendered.line_count().saturating_sub(self.content_height())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.scroll as f64,
            self.content_height() as f64,
            f64::from(self.size.width),
        )
    }

    /// Lay the post out for the current width and re-subscribe the tracker
    pub fn relayout(&mut self) {
        let key = RenderKey {
            post_rev: self.post.rev,
            width: self.content_width(),
            theme: self.theme_variant,
        };
        if self.layout_key.as_ref() == Some(&key) {
            return;
        }

        let rendered = match self.cache.get(&key) {
            Some(rendered) => rendered,
            None => {
                let tree = self.post.content_tree(&self.config.toc.heading_renderer());
                let rendered = Rc::new(layout(&tree, key.width, &self.theme));
                self.cache.put(key.clone(), Rc::clone(&rendered));
                rendered
            }
        };
        debug!(
            "laid out {} at width {}: {} lines, {} anchors",
            self.post.slug,
            key.width,
            rendered.line_count(),
            rendered.anchors.len()
        );

        // Only a new revision is a new document; a width change keeps the active heading
        let same_post = self
            .layout_key
            .as_ref()
            .is_some_and(|previous| previous.post_rev == key.post_rev);

        self.rendered = rendered;
        self.registry = self.rendered.registry();
        self.layout_key = Some(key);
        if same_post {
            self.tracker.resubscribe(&self.post.headings, &self.registry);
        } else {
            self.tracker.observe(&self.post.headings, &self.registry);
        }
        self.scroll = self.scroll.min(self.max_scroll());
        self.sync_toc();
    }

    /// Let the tracker see the current viewport
    pub fn sync_toc(&mut self) {
        let viewport = self.viewport();
        if self.tracker.sync(&viewport) && !self.toc_focus {
            if let Some(idx) = self.active_heading_index() {
                self.toc_selected = idx;
            }
        }
    }

    pub fn active_heading_index(&self) -> Option<usize> {
        let active = self.tracker.active_id()?;
        self.post.headings.iter().position(|h| h.id == active)
    }

    pub fn active_heading(&self) -> Option<&Heading> {
        self.active_heading_index().map(|idx| &self.post.headings[idx])
    }

    pub fn scroll_to(&mut self, line: usize) {
        self.animation = None;
        self.scroll = line.min(self.max_scroll());
        self.sync_toc();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let line = self.scroll.saturating_add_signed(delta);
        self.scroll_to(line);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = (self.content_height() / 2).max(1);
        self.scroll_to(self.scroll.saturating_add(half));
    }

    pub fn scroll_half_page_up(&mut self) {
        let half = (self.content_height() / 2).max(1);
        self.scroll_to(self.scroll.saturating_sub(half));
    }

    pub fn scroll_page_down(&mut self) {
        let page = self.content_height().max(1);
        self.scroll_to(self.scroll.saturating_add(page));
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_to(self.max_scroll());
    }

    /// Scroll to a heading the way a TOC click does
    pub fn jump_to_heading(&mut self, idx: usize) {
        let Some(heading) = self.post.headings.get(idx) else {
            return;
        };
        let Some(request) = self.tracker.click(&heading.id, &self.registry) else {
            self.set_status_message(format!("No anchor for #{}", heading.id));
            return;
        };

        let target = request.target.round().min(self.max_scroll() as f64);
        let duration = Duration::from_millis(self.config.reader.smooth_scroll_ms);
        if duration.is_zero() {
            self.scroll_to(target as usize);
            return;
        }

        let mut scroll = request.smooth_from(self.scroll as f64, duration);
        scroll.to = target;
        self.animation = Some(Animation {
            scroll,
            started: Instant::now(),
        });
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance a running smooth scroll; returns true while it is still running
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(animation) = &self.animation else {
            return false;
        };
        let elapsed = now.saturating_duration_since(animation.started);
        let position = animation.scroll.position_at(elapsed);
        let finished = animation.scroll.is_finished(elapsed);

        self.scroll = (position.max(0.0).round() as usize).min(self.max_scroll());
        if finished {
            self.animation = None;
        }
        self.sync_toc();
        !finished
    }

    /// Jump to the heading after the active one
    pub fn next_heading(&mut self) {
        let next = match self.active_heading_index() {
            Some(idx) => idx + 1,
            None => 0,
        };
        if next < self.post.headings.len() {
            self.jump_to_heading(next);
        }
    }

    /// Jump to the heading before the active one
    pub fn prev_heading(&mut self) {
        if let Some(idx) = self.active_heading_index() {
            self.jump_to_heading(idx.saturating_sub(1));
        }
    }

    pub fn toggle_toc(&mut self) {
        self.show_toc = !self.show_toc;
        if !self.show_toc {
            self.toc_focus = false;
        }
        self.relayout();
    }

    pub fn toggle_toc_focus(&mut self) {
        if self.sidebar_visible() {
            self.toc_focus = !self.toc_focus;
        } else {
            self.toc_focus = false;
            self.set_status_message("TOC hidden at this width");
        }
    }

    pub fn toc_move_down(&mut self) {
        if self.toc_selected + 1 < self.post.headings.len() {
            self.toc_selected += 1;
        }
    }

    pub fn toc_move_up(&mut self) {
        self.toc_selected = self.toc_selected.saturating_sub(1);
    }

    pub fn toc_jump_to_selected(&mut self) {
        self.jump_to_heading(self.toc_selected);
    }

    /// Heading index under a sidebar row from the last frame
    pub fn toc_entry_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.toc_area?;
        let inside = (area.x..area.x + area.width).contains(&column)
            && (area.y..area.y + area.height).contains(&row);
        if !inside {
            return None;
        }
        let offset = toc_scroll_offset(self.toc_selected, usize::from(area.height));
        let idx = offset + usize::from(row - area.y);
        (idx < self.post.headings.len()).then_some(idx)
    }

    pub fn toggle_theme(&mut self) {
        self.theme_variant = match self.theme_variant {
            ThemeVariant::Dark => ThemeVariant::Light,
            ThemeVariant::Light => ThemeVariant::Dark,
        };
        self.theme = Theme::for_variant(self.theme_variant);
        self.relayout();
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    /// Reload the post from disk; the tracker is re-subscribed for the new headings
    pub fn reload_post(&mut self) -> Result<()> {
        self.post.reload()?;
        self.dirty_on_disk = false;
        self.animation = None;
        self.cache.clear();
        self.layout_key = None;
        self.toc_selected = self.toc_selected.min(self.post.headings.len().saturating_sub(1));
        self.relayout();
        self.set_status_message("Reloaded");
        Ok(())
    }

    /// React to external edits of the post
    #[cfg(feature = "watch")]
    pub fn check_watcher(&mut self) {
        let changed = match self.watcher.as_mut() {
            Some(watcher) => watcher.poll_changed(WATCH_DEBOUNCE),
            None => false,
        };
        if !changed {
            return;
        }

        if self.config.watch.auto_reload {
            if let Err(e) = self.reload_post() {
                warn!("reload failed: {:#}", e);
                self.set_status_message(format!("Reload failed: {}", e));
            }
        } else {
            self.dirty_on_disk = true;
        }
    }

    /// Copy a link to the selected heading
    #[cfg(feature = "clipboard")]
    pub fn copy_selected_anchor(&mut self) {
        let Some(heading) = self.post.headings.get(self.toc_selected) else {
            return;
        };
        let link = format!("/blog/{}{}", self.post.slug, heading.href());
        let result = arboard::Clipboard::new().and_then(|mut cb| cb.set_text(link.clone()));
        match result {
            Ok(()) => self.set_status_message(format!("Copied {}", link)),
            Err(e) => self.set_status_message(format!("Clipboard error: {}", e)),
        }
    }
}

/// First visible sidebar row so that `selected` stays on screen
pub fn toc_scroll_offset(selected: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    selected.saturating_sub(height - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with(src: &str) -> App {
        let mut config = Config::default();
        config.watch.enabled = false;
        let post = Post::from_source("test", src).expect("valid post");
        App::new(config, post)
    }

    fn long_post() -> String {
        let mut src = String::new();
        for section in ["Alpha", "Beta", "Gamma"] {
            src.push_str(&format!("## {}\n\n", section));
            for i in 0..30 {
                src.push_str(&format!("{} paragraph {}.\n\n", section, i));
            }
        }
        src
    }

    #[test]
    fn test_resize_lays_out_and_subscribes() {
        let mut app = app_with(&long_post());
        assert!(!app.tracker.is_observing());

        app.resize(140, 40);
        assert!(app.tracker.is_observing());
        assert_eq!(app.registry.len(), 3);
        assert!(app.sidebar_visible());
        assert_eq!(app.content_width(), 140 - 32 - 2);
    }

    #[test]
    fn test_sidebar_hidden_when_narrow() {
        let mut app = app_with(&long_post());
        app.resize(80, 40);
        assert!(!app.sidebar_visible());
        assert_eq!(app.content_width(), 78);
    }

    #[test]
    fn test_no_headings_no_sidebar() {
        let mut app = app_with("just text\n");
        app.resize(200, 40);
        assert!(app.toc_view().is_none());
        assert!(!app.tracker.is_observing());
    }

    #[test]
    fn test_scrolling_moves_active_heading() {
        let mut app = app_with(&long_post());
        app.resize(140, 40);
        // The first heading sits above the trigger band at the top of the page
        assert_eq!(app.tracker.active_id(), None);

        let beta = app.registry.get("beta").map(|h| h.top as usize).expect("beta");
        app.scroll_to(beta.saturating_sub(10));
        assert_eq!(app.tracker.active_id(), Some("beta"));
        assert_eq!(app.toc_selected, 1);
    }

    #[test]
    fn test_width_change_keeps_active_heading() {
        let mut app = app_with(&long_post());
        app.resize(140, 40);
        let beta = app.registry.get("beta").map(|h| h.top as usize).expect("beta");
        app.scroll_to(beta.saturating_sub(10));
        assert_eq!(app.tracker.active_id(), Some("beta"));

        // Deep in the section no heading is in the band
        app.scroll_to(beta + 30);
        assert_eq!(app.tracker.active_id(), Some("beta"));

        app.resize(150, 40);
        assert_eq!(app.tracker.active_id(), Some("beta"));
        app.resize(90, 40);
        assert_eq!(app.tracker.active_id(), Some("beta"));
    }

    #[test]
    fn test_jump_animates_to_heading() {
        let mut app = app_with(&long_post());
        app.resize(140, 40);
        app.jump_to_heading(2);
        assert!(app.is_animating());

        let done = Instant::now() + Duration::from_secs(5);
        assert!(!app.tick(done));
        assert!(!app.is_animating());

        let gamma = app.registry.get("gamma").map(|h| h.top as usize).expect("gamma");
        let expected = gamma.saturating_sub(2).min(app.max_scroll());
        assert_eq!(app.scroll, expected);
    }

    #[test]
    fn test_jump_without_animation() {
        let mut app = app_with(&long_post());
        app.config.reader.smooth_scroll_ms = 0;
        app.resize(140, 40);
        app.jump_to_heading(1);
        assert!(!app.is_animating());
        let beta = app.registry.get("beta").map(|h| h.top as usize).expect("beta");
        assert_eq!(app.scroll, beta - 2);
    }

    #[test]
    fn test_jump_to_missing_index_is_noop() {
        let mut app = app_with(&long_post());
        app.resize(140, 40);
        app.jump_to_heading(99);
        assert!(!app.is_animating());
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_toc_selection_bounds() {
        let mut app = app_with(&long_post());
        app.resize(140, 40);
        app.toc_move_up();
        assert_eq!(app.toc_selected, 0);
        for _ in 0..10 {
            app.toc_move_down();
        }
        assert_eq!(app.toc_selected, 2);
    }

    #[test]
    fn test_toc_entry_at() {
        let mut app = app_with(&long_post());
        app.resize(140, 40);
        app.toc_area = Some(Rect::new(1, 1, 30, 10));
        assert_eq!(app.toc_entry_at(5, 1), Some(0));
        assert_eq!(app.toc_entry_at(5, 3), Some(2));
        assert_eq!(app.toc_entry_at(5, 4), None);
        assert_eq!(app.toc_entry_at(50, 1), None);
    }

    #[test]
    fn test_toggle_toc_relayouts() {
        let mut app = app_with(&long_post());
        app.resize(140, 40);
        let narrow = app.content_width();
        app.toggle_toc();
        assert!(!app.sidebar_visible());
        assert_eq!(app.content_width(), narrow + 32);
        assert!(app.tracker.is_observing());
    }

    #[test]
    fn test_toggle_theme() {
        let mut app = app_with("## x\n");
        app.resize(120, 30);
        app.toggle_theme();
        assert_eq!(app.theme_variant, ThemeVariant::Light);
    }

    #[test]
    fn test_toc_scroll_offset() {
        assert_eq!(toc_scroll_offset(0, 10), 0);
        assert_eq!(toc_scroll_offset(9, 10), 0);
        assert_eq!(toc_scroll_offset(12, 10), 3);
        assert_eq!(toc_scroll_offset(5, 0), 0);
    }
}
