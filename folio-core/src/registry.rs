//! Id to element lookup for mounted documents

use log::debug;
use std::collections::HashMap;

/// Position of a mounted element in document coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct ElementHandle {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Elements of the current document, keyed by anchor id
///
/// Populated when a document is mounted. When two elements share an id the
/// first one mounted wins, the same way `#id` navigation resolves.
#[derive(Clone, Debug, Default)]
pub struct ElementRegistry {
    elements: HashMap<String, ElementHandle>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from handles in document order
    pub fn from_handles(handles: impl IntoIterator<Item = ElementHandle>) -> Self {
        let mut registry = Self::new();
        for handle in handles {
            registry.mount(handle);
        }
        registry
    }

    /// Register an element; returns false if the id was already taken
    pub fn mount(&mut self, handle: ElementHandle) -> bool {
        if self.elements.contains_key(&handle.id) {
            debug!("duplicate anchor id {:?}, keeping first element", handle.id);
            return false;
        }
        self.elements.insert(handle.id.clone(), handle);
        true
    }

    pub fn get(&self, id: &str) -> Option<&ElementHandle> {
        self.elements.get(id)
    }

    /// Resolve a `#id` fragment; a bare `#` or empty id never resolves
    pub fn resolve_fragment(&self, fragment: &str) -> Option<&ElementHandle> {
        let id = fragment.strip_prefix('#').unwrap_or(fragment);
        if id.is_empty() {
            return None;
        }
        self.get(id)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
