// src/frame/cache.rs
//! Snapshot-and-reuse of the last rendered frame.

use tiny_skia::Pixmap;
use tracing::trace;

/// Cache of the last successfully rendered frame.
///
/// Replay is eligible only while the cache is clean and the canvas
/// dimensions still match; any style, quality, or dimension change marks
/// it dirty and forces the next paint through the live path.
pub struct FrameCache {
    snapshot: Option<Pixmap>,
    dirty: bool,
}

impl FrameCache {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            dirty: true,
        }
    }

    /// Whether the next paint must go through the live render path.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces the next paint through the live render path.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Stores a copy of `canvas` as the replayable frame.
    ///
    /// The backing buffer is reused between frames of the same size; a
    /// dimension change reallocates it.
    pub fn store(&mut self, canvas: &Pixmap) {
        let matches = self
            .snapshot
            .as_ref()
            .is_some_and(|s| s.width() == canvas.width() && s.height() == canvas.height());
        if matches {
            let snapshot = self.snapshot.as_mut().expect("dims just matched");
            snapshot.data_mut().copy_from_slice(canvas.data());
        } else {
            self.snapshot = Some(canvas.clone());
        }
        self.dirty = false;
    }

    /// Blits the cached frame onto `canvas` if eligible. Returns whether
    /// a replay happened; a dimension mismatch marks the cache dirty.
    pub fn replay(&mut self, canvas: &mut Pixmap) -> bool {
        if self.dirty {
            return false;
        }
        let Some(snapshot) = self.snapshot.as_ref() else {
            return false;
        };
        if snapshot.width() != canvas.width() || snapshot.height() != canvas.height() {
            trace!("cached frame dimensions stale; invalidating");
            self.dirty = true;
            return false;
        }
        canvas.data_mut().copy_from_slice(snapshot.data());
        true
    }

    /// Drops the snapshot entirely.
    pub fn clear(&mut self) {
        self.snapshot = None;
        self.dirty = true;
    }
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    #[test]
    fn starts_dirty_and_replays_after_store() {
        let mut cache = FrameCache::new();
        let mut canvas = Pixmap::new(8, 8).unwrap();
        assert!(!cache.replay(&mut canvas));

        canvas.fill(Color::from_rgba8(200, 10, 10, 255));
        cache.store(&canvas);

        let mut target = Pixmap::new(8, 8).unwrap();
        assert!(cache.replay(&mut target));
        assert_eq!(target.data(), canvas.data());
    }

    #[test]
    fn mark_dirty_blocks_replay() {
        let mut cache = FrameCache::new();
        let canvas = Pixmap::new(8, 8).unwrap();
        cache.store(&canvas);
        cache.mark_dirty();
        let mut target = Pixmap::new(8, 8).unwrap();
        assert!(!cache.replay(&mut target));
    }

    #[test]
    fn dimension_change_invalidates() {
        let mut cache = FrameCache::new();
        let canvas = Pixmap::new(8, 8).unwrap();
        cache.store(&canvas);

        let mut wider = Pixmap::new(16, 8).unwrap();
        assert!(!cache.replay(&mut wider));
        assert!(cache.is_dirty());
    }

    #[test]
    fn store_reuses_buffer_for_same_dims() {
        let mut cache = FrameCache::new();
        let mut canvas = Pixmap::new(8, 8).unwrap();
        cache.store(&canvas);
        canvas.fill(Color::from_rgba8(0, 255, 0, 255));
        cache.store(&canvas);

        let mut target = Pixmap::new(8, 8).unwrap();
        assert!(cache.replay(&mut target));
        assert_eq!(target.pixel(0, 0), canvas.pixel(0, 0));
    }
}
