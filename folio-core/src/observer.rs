//! Viewport intersection watching
//!
//! A [`VisibilityObserver`] tracks a set of elements and, each time it is
//! polled with the current viewport, reports the elements whose intersection
//! with the trigger band changed. The band is the viewport shrunk by the root
//! margins, so the default options only fire for elements crossing roughly
//! the middle of the screen.

use serde::{Deserialize, Serialize};

use crate::registry::ElementHandle;

/// Band and threshold configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverOptions {
    /// Top root margin as a fraction of viewport height (negative shrinks)
    pub root_margin_top: f64,
    /// Bottom root margin as a fraction of viewport height (negative shrinks)
    pub root_margin_bottom: f64,
    /// Minimum visible fraction of the element; 0 fires on any contact
    pub threshold: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin_top: -0.20,
            root_margin_bottom: -0.35,
            threshold: 0.0,
        }
    }
}

/// Visible region of the document
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub scroll_top: f64,
    pub height: f64,
    pub width: f64,
}

impl Viewport {
    pub fn new(scroll_top: f64, height: f64, width: f64) -> Self {
        Self {
            scroll_top,
            height,
            width,
        }
    }

    /// Trigger band `(top, bottom)` in document coordinates
    pub fn band(&self, options: &ObserverOptions) -> (f64, f64) {
        let top = self.scroll_top - options.root_margin_top * self.height;
        let bottom = self.scroll_top + self.height + options.root_margin_bottom * self.height;
        (top, bottom)
    }
}

/// A change in an element's intersection state
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub id: String,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    pub fn new(id: impl Into<String>, is_intersecting: bool) -> Self {
        Self {
            id: id.into(),
            is_intersecting,
            intersection_ratio: if is_intersecting { 1.0 } else { 0.0 },
        }
    }
}

#[derive(Debug)]
struct Target {
    handle: ElementHandle,
    // None until the first poll reports it
    intersecting: Option<bool>,
}

/// Watches elements against a viewport trigger band
#[derive(Debug)]
pub struct VisibilityObserver {
    options: ObserverOptions,
    targets: Vec<Target>,
}

impl VisibilityObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            targets: Vec::new(),
        }
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Start watching an element; watching the same id twice is a no-op
    pub fn observe(&mut self, handle: ElementHandle) {
        if self.targets.iter().any(|t| t.handle.id == handle.id) {
            return;
        }
        self.targets.push(Target {
            handle,
            intersecting: None,
        });
    }

    pub fn unobserve(&mut self, id: &str) {
        self.targets.retain(|t| t.handle.id != id);
    }

    /// Stop watching everything
    pub fn disconnect(&mut self) {
        self.targets.clear();
    }

    pub fn observed_ids(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.handle.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Entries for every watched element whose state changed since the last poll
    ///
    /// Newly observed elements are always reported once. Entries come back in
    /// observation order.
    pub fn poll(&mut self, viewport: &Viewport) -> Vec<IntersectionEntry> {
        let band = viewport.band(&self.options);
        let threshold = self.options.threshold;
        let mut entries = Vec::new();

        for target in &mut self.targets {
            let ratio = visible_ratio(&target.handle, band);
            let intersecting = match ratio {
                Some(r) => threshold <= 0.0 || r >= threshold,
                None => false,
            };
            if target.intersecting != Some(intersecting) {
                target.intersecting = Some(intersecting);
                entries.push(IntersectionEntry {
                    id: target.handle.id.clone(),
                    is_intersecting: intersecting,
                    intersection_ratio: ratio.unwrap_or(0.0),
                });
            }
        }

        entries
    }
}

/// Fraction of the element inside the band, or None when they do not touch
fn visible_ratio(handle: &ElementHandle, (band_top, band_bottom): (f64, f64)) -> Option<f64> {
    if band_bottom < band_top || handle.top > band_bottom || handle.bottom() < band_top {
        return None;
    }
    if handle.height <= 0.0 {
        return Some(1.0);
    }
    let overlap = handle.bottom().min(band_bottom) - handle.top.max(band_top);
    Some((overlap / handle.height).clamp(0.0, 1.0))
}
