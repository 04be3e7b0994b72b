// src/factory/cache.rs
//! Style-keyed cache holding the single live renderer per style.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::RenderStyle;
use crate::render::SpectrumRenderer;

/// Shared handle to one cached renderer.
pub type SharedRenderer = Arc<Mutex<Box<dyn SpectrumRenderer>>>;

/// The singleton-per-style renderer cache.
///
/// Not synchronized itself; the factory keeps it behind its own lock.
#[derive(Default)]
pub struct RendererCache {
    renderers: HashMap<RenderStyle, SharedRenderer>,
}

impl RendererCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached renderer for `style`, if one was created.
    pub fn get(&self, style: RenderStyle) -> Option<SharedRenderer> {
        self.renderers.get(&style).cloned()
    }

    /// Commits a freshly built renderer. Returns the shared handle.
    pub fn insert(&mut self, style: RenderStyle, renderer: Box<dyn SpectrumRenderer>) -> SharedRenderer {
        let shared: SharedRenderer = Arc::new(Mutex::new(renderer));
        self.renderers.insert(style, shared.clone());
        shared
    }

    /// Drops every cached renderer.
    pub fn clear(&mut self) {
        self.renderers.clear();
    }

    /// Visits every cached renderer under its lock.
    pub fn for_each(&self, mut f: impl FnMut(&mut dyn SpectrumRenderer)) {
        for shared in self.renderers.values() {
            let mut guard = shared.lock();
            f(guard.as_mut());
        }
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}
