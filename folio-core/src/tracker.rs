//! Table of contents tracking
//!
//! [`TocTracker`] owns the visibility subscription for the headings of the
//! current document and the single piece of state derived from it: the id of
//! the heading that last entered the trigger band. A new document always
//! releases the previous subscription before the next one is created, so an
//! observer built for one document can never report into another.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::observer::{IntersectionEntry, ObserverOptions, Viewport, VisibilityObserver};
use crate::registry::ElementRegistry;
use crate::scroll::SmoothScroll;
use crate::toc::Heading;

/// Space kept above a heading after a TOC jump
pub const DEFAULT_HEADER_OFFSET: f64 = 80.0;

/// Narrowest viewport that shows the sidebar
pub const DEFAULT_BREAKPOINT: f64 = 1024.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocOptions {
    pub observer: ObserverOptions,
    pub header_offset: f64,
    pub breakpoint: f64,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            observer: ObserverOptions::default(),
            header_offset: DEFAULT_HEADER_OFFSET,
            breakpoint: DEFAULT_BREAKPOINT,
        }
    }
}

/// Observation of one document's headings, released on drop
#[derive(Debug)]
pub struct Subscription {
    generation: u64,
    observer: VisibilityObserver,
}

impl Subscription {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn observed_ids(&self) -> impl Iterator<Item = &str> {
        self.observer.observed_ids()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(
            "releasing toc subscription #{} ({} elements)",
            self.generation,
            self.observer.len()
        );
        self.observer.disconnect();
    }
}

/// One sidebar entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub href: String,
    pub level: u8,
    /// Indent steps; level 2 is flush
    pub indent: usize,
    pub active: bool,
}

/// Sidebar contents for the current document
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocView {
    pub entries: Vec<TocEntry>,
}

impl TocView {
    pub fn active(&self) -> Option<&TocEntry> {
        self.entries.iter().find(|e| e.active)
    }
}

/// Where to scroll after a TOC entry is chosen
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollRequest {
    pub id: String,
    pub target: f64,
}

impl ScrollRequest {
    /// Animate from the current offset toward the target
    pub fn smooth_from(&self, current: f64, duration: Duration) -> SmoothScroll {
        SmoothScroll::new(current, self.target, duration)
    }
}

/// Tracks which heading is in view
#[derive(Debug, Default)]
pub struct TocTracker {
    options: TocOptions,
    active_id: Option<String>,
    subscription: Option<Subscription>,
    generation: u64,
}

impl TocTracker {
    pub fn new(options: TocOptions) -> Self {
        Self {
            options,
            active_id: None,
            subscription: None,
            generation: 0,
        }
    }

    pub fn options(&self) -> &TocOptions {
        &self.options
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    /// Watch the mounted elements of a new heading list
    ///
    /// Any previous subscription is released first. Headings with no mounted
    /// element are skipped.
    pub fn observe(&mut self, headings: &[Heading], registry: &ElementRegistry) {
        self.active_id = None;
        self.resubscribe(headings, registry);
    }

    /// Watch the same headings at new positions, keeping the active heading
    ///
    /// For layout changes of an unchanged document. The active id survives
    /// until an entry from the new subscription replaces it.
    pub fn resubscribe(&mut self, headings: &[Heading], registry: &ElementRegistry) {
        self.release();

        if headings.is_empty() {
            self.active_id = None;
            return;
        }

        self.generation += 1;
        let mut observer = VisibilityObserver::new(self.options.observer);
        for heading in headings {
            match registry.get(&heading.id) {
                Some(handle) => observer.observe(handle.clone()),
                None => trace!("heading {:?} has no mounted element", heading.id),
            }
        }

        debug!(
            "toc subscription #{} watching {} of {} headings",
            self.generation,
            observer.len(),
            headings.len()
        );
        self.subscription = Some(Subscription {
            generation: self.generation,
            observer,
        });
    }

    /// Drop the current subscription, if any
    pub fn release(&mut self) {
        // Drop runs to completion here, before any replacement is built
        self.subscription = None;
    }

    /// Apply observer entries; the last intersecting entry wins
    ///
    /// Returns true when the active id changed.
    pub fn handle_entries(&mut self, entries: &[IntersectionEntry]) -> bool {
        let before = self.active_id.clone();
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            self.active_id = Some(entry.id.clone());
        }
        before != self.active_id
    }

    /// Poll the subscription against the viewport and apply the entries
    pub fn sync(&mut self, viewport: &Viewport) -> bool {
        let entries = match self.subscription.as_mut() {
            Some(sub) => sub.observer.poll(viewport),
            None => return false,
        };
        self.handle_entries(&entries)
    }

    /// Sidebar for the headings, or None when there is nothing to show
    pub fn view(&self, headings: &[Heading], viewport_width: f64) -> Option<TocView> {
        if headings.is_empty() || viewport_width < self.options.breakpoint {
            return None;
        }

        let entries = headings
            .iter()
            .map(|h| TocEntry {
                id: h.id.clone(),
                text: h.text.clone(),
                href: h.href(),
                level: h.level,
                indent: usize::from(h.level.saturating_sub(2)),
                active: self.active_id.as_deref() == Some(h.id.as_str()),
            })
            .collect();

        Some(TocView { entries })
    }

    /// Scroll target for a clicked entry; None if its element is gone
    pub fn click(&self, id: &str, registry: &ElementRegistry) -> Option<ScrollRequest> {
        let handle = registry.get(id)?;
        let target = (handle.top - self.options.header_offset).max(0.0);
        Some(ScrollRequest {
            id: id.to_string(),
            target,
        })
    }
}
