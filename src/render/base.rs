// src/render/base.rs
//! Shared renderer state: resource pools, temporal smoothing, and the
//! configuration change gate.

use tiny_skia::PathBuilder;
use tracing::debug;

use crate::config::{CLEANUP_EVERY_FRAMES, QualitySettings, RenderQuality, RenderStyle};
use crate::pool::ObjectPool;
use crate::render::AppliedConfig;
use crate::spectrum::{SmoothingBuffer, resample_avg_into, resample_max_into};

/// How the input spectrum is mapped onto the bar count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleMode {
    /// Average proportional index ranges.
    #[default]
    Average,
    /// Keep block maxima (interpolating when upsampling).
    Max,
}

/// State shared by every renderer: pools, smoothing buffer, applied
/// configuration, and frame bookkeeping.
pub struct RendererCore {
    style: RenderStyle,
    initialized: bool,
    config: AppliedConfig,
    applied_count: u64,
    needs_redraw: bool,
    smoothing: SmoothingBuffer,
    resample_buf: Vec<f32>,
    path_pool: ObjectPool<PathBuilder>,
    scratch_pool: ObjectPool<Vec<f32>>,
    frame_counter: u64,
}

impl RendererCore {
    pub fn new(style: RenderStyle) -> Self {
        let config = AppliedConfig::default();
        let settings = QualitySettings::for_quality(config.quality);
        Self {
            style,
            initialized: false,
            config,
            applied_count: 0,
            needs_redraw: true,
            smoothing: SmoothingBuffer::new(settings.smoothing_base),
            resample_buf: Vec::new(),
            path_pool: ObjectPool::with_reset(8, PathBuilder::new, |pb| {
                pb.clear();
                true
            }),
            scratch_pool: ObjectPool::with_reset(8, Vec::new, |v: &mut Vec<f32>| {
                v.clear();
                true
            }),
            frame_counter: 0,
        }
    }

    /// Style this core belongs to.
    pub fn style(&self) -> RenderStyle {
        self.style
    }

    /// One-time setup; later calls are no-ops.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        debug!(style = %self.style, "renderer initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Applies overlay/quality state. Returns `true` when the pair
    /// actually changed; an identical pair mutates nothing.
    pub fn configure(&mut self, overlay_active: bool, quality: RenderQuality) -> bool {
        let next = AppliedConfig {
            overlay_active,
            quality,
            overlay_alpha: self.config.overlay_alpha,
        };
        if next == self.config {
            return false;
        }
        // Single value swap; a concurrent reader sees old or new, never
        // a mix.
        self.config = next;
        self.applied_count += 1;

        let settings = QualitySettings::for_quality(quality);
        let factor = if overlay_active {
            settings.smoothing_overlay
        } else {
            settings.smoothing_base
        };
        self.smoothing.set_factor(factor);
        self.smoothing.reset();
        self.needs_redraw = true;
        debug!(style = %self.style, ?quality, overlay_active, "renderer reconfigured");
        true
    }

    /// Updates the overlay compositing alpha; marks dirty on change.
    pub fn set_overlay_alpha(&mut self, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if (alpha - self.config.overlay_alpha).abs() > f32::EPSILON {
            self.config.overlay_alpha = alpha;
            self.needs_redraw = true;
        }
    }

    /// Configuration currently in force.
    pub fn config(&self) -> AppliedConfig {
        self.config
    }

    /// Number of configure calls that changed state.
    pub fn applied_count(&self) -> u64 {
        self.applied_count
    }

    /// Quality tuning for the current tier.
    pub fn quality_settings(&self) -> &'static QualitySettings {
        QualitySettings::for_quality(self.config.quality)
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    pub(crate) fn clear_redraw(&mut self) {
        self.needs_redraw = false;
    }

    /// Pool of reusable path builders for this renderer.
    pub fn paths(&self) -> &ObjectPool<PathBuilder> {
        &self.path_pool
    }

    /// Pool of reusable float scratch buffers.
    pub fn scratch(&self) -> &ObjectPool<Vec<f32>> {
        &self.scratch_pool
    }

    /// Resamples the input spectrum onto `buckets` values and applies
    /// temporal smoothing against the previous frame. The returned slice
    /// is valid until the next call.
    pub fn process_spectrum(
        &mut self,
        input: &[f32],
        buckets: usize,
        mode: ResampleMode,
    ) -> &[f32] {
        match mode {
            ResampleMode::Average => resample_avg_into(input, buckets, &mut self.resample_buf),
            ResampleMode::Max => resample_max_into(input, buckets, None, &mut self.resample_buf),
        }
        self.smoothing.apply(&self.resample_buf)
    }

    /// Per-frame bookkeeping; returns `true` when the periodic cleanup
    /// pass ran this frame.
    pub fn end_frame(&mut self) -> bool {
        self.frame_counter += 1;
        if self.frame_counter % CLEANUP_EVERY_FRAMES == 0 {
            self.path_pool.clear();
            self.scratch_pool.clear();
            return true;
        }
        false
    }

    /// Drops pooled resources early, e.g. on dispose.
    pub fn release_resources(&mut self) {
        self.path_pool.dispose();
        self.scratch_pool.dispose();
        self.smoothing.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_is_idempotent() {
        let mut core = RendererCore::new(RenderStyle::Bars);
        assert!(core.configure(true, RenderQuality::High));
        assert_eq!(core.applied_count(), 1);

        // Identical pair: nothing changes, no smoothing reset.
        core.process_spectrum(&[0.5; 8], 8, ResampleMode::Average);
        assert!(!core.configure(true, RenderQuality::High));
        assert_eq!(core.applied_count(), 1);
        let out = core.process_spectrum(&[1.0; 8], 8, ResampleMode::Average);
        // History survived, so the step was smoothed rather than seeded.
        assert!(out[0] < 1.0);
    }

    #[test]
    fn configure_change_resets_smoothing() {
        let mut core = RendererCore::new(RenderStyle::Bars);
        core.process_spectrum(&[0.2; 4], 4, ResampleMode::Average);
        core.configure(false, RenderQuality::High);
        let out = core.process_spectrum(&[0.9; 4], 4, ResampleMode::Average);
        // Seeded directly after the reset.
        assert_eq!(out, &[0.9; 4]);
    }

    #[test]
    fn overlay_uses_faster_smoothing() {
        let mut core = RendererCore::new(RenderStyle::Bars);
        core.configure(true, RenderQuality::Medium);
        let settings = QualitySettings::for_quality(RenderQuality::Medium);
        assert!(settings.smoothing_overlay > settings.smoothing_base);
    }

    #[test]
    fn initialize_once() {
        let mut core = RendererCore::new(RenderStyle::Wave);
        assert!(!core.is_initialized());
        core.initialize();
        core.initialize();
        assert!(core.is_initialized());
    }

    #[test]
    fn cleanup_runs_on_interval() {
        let mut core = RendererCore::new(RenderStyle::Bars);
        let mut cleanups = 0;
        for _ in 0..(CLEANUP_EVERY_FRAMES * 2) {
            if core.end_frame() {
                cleanups += 1;
            }
        }
        assert_eq!(cleanups, 2);
    }

    #[test]
    fn overlay_alpha_marks_dirty_only_on_change() {
        let mut core = RendererCore::new(RenderStyle::Bars);
        core.clear_redraw();
        core.set_overlay_alpha(core.config().overlay_alpha);
        assert!(!core.needs_redraw());
        core.set_overlay_alpha(0.25);
        assert!(core.needs_redraw());
    }
}
