// src/spectrum/smoothing.rs
//! Temporal smoothing of streaming spectral data.

/// Per-bucket exponential moving average with a persisted previous frame.
///
/// The buffer reallocates only when the bucket count changes, and the
/// first frame after a size change (or a reset) is seeded directly rather
/// than smoothed, so a reconfiguration never ramps in from zero.
#[derive(Debug, Clone)]
pub struct SmoothingBuffer {
    prev: Vec<f32>,
    factor: f32,
}

impl SmoothingBuffer {
    /// Creates a buffer with the given smoothing factor in `(0, 1]`.
    /// Larger factors respond faster.
    pub fn new(factor: f32) -> Self {
        Self {
            prev: Vec::new(),
            factor: factor.clamp(0.01, 1.0),
        }
    }

    /// Current smoothing factor.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Replaces the smoothing factor, keeping history intact.
    pub fn set_factor(&mut self, factor: f32) {
        self.factor = factor.clamp(0.01, 1.0);
    }

    /// Forgets history; the next frame seeds directly.
    pub fn reset(&mut self) {
        self.prev.clear();
    }

    /// Smooths `input` against the previous frame and returns the result.
    ///
    /// `out[i] = prev[i] * (1 - f) + input[i] * f`; a length change seeds
    /// the buffer from `input` unsmoothed.
    pub fn apply(&mut self, input: &[f32]) -> &[f32] {
        if self.prev.len() != input.len() {
            self.prev.clear();
            self.prev.extend_from_slice(input);
            return &self.prev;
        }
        let f = self.factor;
        for (prev, &new) in self.prev.iter_mut().zip(input) {
            *prev = *prev * (1.0 - f) + new * f;
        }
        &self.prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_seeds_directly() {
        let mut smoothing = SmoothingBuffer::new(0.2);
        let out = smoothing.apply(&[0.5, 0.8]);
        assert_eq!(out, &[0.5, 0.8]);
    }

    #[test]
    fn step_input_converges_monotonically() {
        let mut smoothing = SmoothingBuffer::new(0.3);
        smoothing.apply(&[0.0]);

        let mut last = 0.0;
        let mut frames = 0;
        loop {
            let out = smoothing.apply(&[1.0])[0];
            assert!(out >= last, "non-monotone step response");
            assert!(out <= 1.0);
            last = out;
            frames += 1;
            if (1.0 - out) < 1e-3 {
                break;
            }
            assert!(frames < 100, "failed to converge");
        }
    }

    #[test]
    fn size_change_reseeds_without_ramp() {
        let mut smoothing = SmoothingBuffer::new(0.1);
        smoothing.apply(&[0.0, 0.0, 0.0]);
        smoothing.apply(&[1.0, 1.0, 1.0]);
        // New bucket count: seeded, not smoothed toward history.
        let out = smoothing.apply(&[0.7, 0.7]);
        assert_eq!(out, &[0.7, 0.7]);
    }

    #[test]
    fn reset_forgets_history() {
        let mut smoothing = SmoothingBuffer::new(0.1);
        smoothing.apply(&[0.0, 0.0]);
        smoothing.reset();
        let out = smoothing.apply(&[0.9, 0.9]);
        assert_eq!(out, &[0.9, 0.9]);
    }
}
