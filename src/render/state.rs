// src/render/state.rs
//! Small per-renderer state-tracking value types.

use tiny_skia::Rect;

/// Peak value with hold-then-decay behavior for one bar or cell.
#[derive(Debug, Clone, Copy)]
pub struct PeakTracker {
    /// Current peak value in `0..=1`.
    pub value: f32,
    /// Remaining hold time in seconds before decay starts.
    timer: f32,
    /// Downward velocity accumulated after the hold expires.
    velocity: f32,
}

impl PeakTracker {
    pub fn new() -> Self {
        Self {
            value: 0.0,
            timer: 0.0,
            velocity: 0.0,
        }
    }

    /// Feeds the current magnitude; captures a new peak or decays the
    /// held one toward zero.
    pub fn update(&mut self, target: f32, dt: f32, hold: f32, gravity: f32) {
        if target >= self.value {
            self.value = target;
            self.timer = hold;
            self.velocity = 0.0;
            return;
        }
        if self.timer > 0.0 {
            self.timer -= dt;
            return;
        }
        self.velocity += gravity * dt;
        self.value = (self.value - self.velocity * dt).max(target).max(0.0);
    }
}

impl Default for PeakTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Array of peak trackers, reallocated wholesale when the count changes.
#[derive(Debug, Clone)]
pub struct PeakField {
    peaks: Vec<PeakTracker>,
    hold: f32,
    gravity: f32,
}

impl PeakField {
    /// Creates an empty field with the given hold time (seconds) and
    /// decay gravity (units per second squared).
    pub fn new(hold: f32, gravity: f32) -> Self {
        Self {
            peaks: Vec::new(),
            hold,
            gravity,
        }
    }

    /// Feeds one frame of magnitudes, resizing the field if needed.
    pub fn update(&mut self, targets: &[f32], dt: f32) {
        if self.peaks.len() != targets.len() {
            self.peaks = vec![PeakTracker::new(); targets.len()];
        }
        for (peak, &target) in self.peaks.iter_mut().zip(targets) {
            peak.update(target, dt, self.hold, self.gravity);
        }
    }

    /// Current peak value for bar `i`, 0 when out of range.
    pub fn value(&self, i: usize) -> f32 {
        self.peaks.get(i).map(|p| p.value).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }
}

/// Incrementally built bounding box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsBuilder {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
    any: bool,
}

impl BoundsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extends the bounds to include a point.
    pub fn include(&mut self, x: f32, y: f32) {
        if !self.any {
            self.min_x = x;
            self.max_x = x;
            self.min_y = y;
            self.max_y = y;
            self.any = true;
            return;
        }
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Extends the bounds to include a rect.
    pub fn include_rect(&mut self, rect: Rect) {
        self.include(rect.left(), rect.top());
        self.include(rect.right(), rect.bottom());
    }

    /// Finished bounds, or `None` if nothing was included or the box is
    /// degenerate.
    pub fn to_rect(&self) -> Option<Rect> {
        if !self.any {
            return None;
        }
        Rect::from_ltrb(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Detects canvas dimension changes between frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct DimCache {
    width: u32,
    height: u32,
}

impl DimCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the dimensions and reports whether they changed.
    pub fn changed(&mut self, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Phase/time accumulator for renderer animation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimState {
    /// Wrapped phase in `0..TAU`.
    pub phase: f32,
    /// Unwrapped elapsed time in seconds.
    pub time: f32,
}

impl AnimState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances by `dt` seconds at `rate` radians per second.
    pub fn advance(&mut self, dt: f32, rate: f32) {
        self.time += dt;
        self.phase = (self.phase + dt * rate) % std::f32::consts::TAU;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_captures_then_holds_then_decays() {
        let mut peak = PeakTracker::new();
        peak.update(0.8, 0.016, 0.1, 3.0);
        assert_eq!(peak.value, 0.8);

        // During the hold window the value stays put.
        peak.update(0.1, 0.05, 0.1, 3.0);
        assert_eq!(peak.value, 0.8);

        // After the hold expires it decays toward the target.
        for _ in 0..200 {
            peak.update(0.1, 0.05, 0.1, 3.0);
        }
        assert!(peak.value <= 0.1 + 1e-6);
        assert!(peak.value >= 0.0);
    }

    #[test]
    fn peak_field_resizes_wholesale() {
        let mut field = PeakField::new(0.2, 2.0);
        field.update(&[0.5, 0.6], 0.016);
        assert_eq!(field.len(), 2);
        field.update(&[0.1, 0.2, 0.3, 0.4], 0.016);
        assert_eq!(field.len(), 4);
        // Old values were discarded by the reallocation.
        assert!((field.value(0) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn bounds_builder_accumulates() {
        let mut bounds = BoundsBuilder::new();
        assert!(bounds.to_rect().is_none());
        bounds.include(10.0, 20.0);
        bounds.include(-5.0, 60.0);
        let rect = bounds.to_rect().unwrap();
        assert_eq!(rect.left(), -5.0);
        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 10.0);
        assert_eq!(rect.bottom(), 60.0);
    }

    #[test]
    fn dim_cache_detects_changes() {
        let mut dims = DimCache::new();
        assert!(dims.changed(800, 450));
        assert!(!dims.changed(800, 450));
        assert!(dims.changed(800, 451));
    }

    #[test]
    fn anim_phase_wraps() {
        let mut anim = AnimState::new();
        for _ in 0..1000 {
            anim.advance(0.016, 5.0);
        }
        assert!(anim.phase >= 0.0 && anim.phase < std::f32::consts::TAU);
        assert!(anim.time > 15.0);
    }
}
