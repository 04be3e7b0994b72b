// src/render/effect.rs
//! The render/validate/process/draw-with-overlay template shared by all
//! concrete effects.

use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};
use tracing::trace;

use crate::config::{RenderQuality, RenderStyle, TierTable};
use crate::error::{EngineError, Result};
use crate::pool::ObjectPool;
use crate::render::base::{RendererCore, ResampleMode};
use crate::render::params::{RenderParameters, compute_render_params};
use crate::render::{
    AppliedConfig, Brush, FrameInput, RenderOutcome, SkipReason, SpectrumRenderer,
};

/// Drawing context handed to a concrete effect.
pub struct Scene<'a> {
    /// Target surface: the real canvas, or the overlay layer when
    /// overlay compositing is active.
    pub canvas: &'a mut Pixmap,
    /// Palette for this frame.
    pub brush: &'a Brush,
    /// Whether paths should be anti-aliased at this tier.
    pub anti_alias: bool,
    /// Whether optional effects run at this tier.
    pub advanced_effects: bool,
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Reusable path builders; borrowed per shape, returned on drop.
    pub paths: ObjectPool<tiny_skia::PathBuilder>,
}

/// A concrete visual style. Implementations only draw; validation,
/// resampling, smoothing, and overlay compositing live in
/// [`EffectRenderer`].
pub trait Effect: Send {
    /// Quality-tiered settings for this effect.
    type Settings: Send + Sync + 'static;

    /// Style key this effect implements.
    fn style(&self) -> RenderStyle;

    /// The per-tier settings table.
    fn settings() -> &'static TierTable<Self::Settings>;

    /// How the spectrum maps onto bars.
    fn resample_mode(&self) -> ResampleMode {
        ResampleMode::Average
    }

    /// Fixed bar width, for styles that lay out at a constant width.
    fn fixed_bar_width(&self, _settings: &Self::Settings) -> Option<f32> {
        None
    }

    /// Number of processing buckets; defaults to the effective bar count.
    fn processing_bars(&self, params: &RenderParameters) -> usize {
        params.effective_bar_count
    }

    /// Draws one frame. `bars` holds resampled, smoothed magnitudes.
    fn draw(
        &mut self,
        scene: &mut Scene<'_>,
        bars: &[f32],
        params: &RenderParameters,
        settings: &Self::Settings,
    ) -> Result<()>;

    /// Hook run after a configuration change took effect.
    fn on_configured(&mut self, _config: &AppliedConfig) {}

    /// Hook run by the periodic cleanup pass.
    fn cleanup(&mut self) {}
}

/// Template renderer wrapping a concrete [`Effect`].
///
/// Each render call walks the standard gates in order; any failed gate
/// short-circuits to "skip drawing", and the performance-info callback
/// runs regardless of the outcome.
pub struct EffectRenderer<E: Effect> {
    core: RendererCore,
    effect: E,
    /// Overlay scratch layer, reused while dimensions match.
    layer: Option<Pixmap>,
}

impl<E: Effect> EffectRenderer<E> {
    pub fn new(effect: E) -> Self {
        let style = effect.style();
        Self {
            core: RendererCore::new(style),
            effect,
            layer: None,
        }
    }

    /// Boxes the renderer for the factory registry.
    pub fn boxed(effect: E) -> Box<dyn SpectrumRenderer>
    where
        E: 'static,
    {
        Box::new(Self::new(effect))
    }

    /// Shared core, exposed for tests.
    #[cfg(test)]
    pub fn core(&self) -> &RendererCore {
        &self.core
    }

    // Associated fn on the slot so the effect stays borrowable while the
    // layer is out.
    fn ensure_layer(slot: &mut Option<Pixmap>, width: u32, height: u32) -> Result<&mut Pixmap> {
        let matches = slot
            .as_ref()
            .is_some_and(|l| l.width() == width && l.height() == height);
        if !matches {
            *slot =
                Some(Pixmap::new(width, height).ok_or(EngineError::InvalidCanvas {
                    width,
                    height,
                })?);
        }
        Ok(slot.as_mut().expect("layer just ensured"))
    }

    fn render_inner(
        &mut self,
        canvas: &mut Pixmap,
        input: &FrameInput<'_>,
    ) -> Result<RenderOutcome> {
        // Gate 1: canvas and spectrum validity.
        if canvas.width() == 0 || canvas.height() == 0 {
            return Ok(RenderOutcome::Skipped(SkipReason::ZeroCanvas));
        }
        if input.spectrum.is_empty() {
            return Ok(RenderOutcome::Skipped(SkipReason::EmptySpectrum));
        }

        // Gate 2: tier settings. Falls back inside the table; an empty
        // table skips rather than erroring.
        let config = self.core.config();
        let Some(settings) = E::settings().resolve(config.quality) else {
            trace!(style = %self.core.style(), "no tier settings resolved; skipping");
            return Ok(RenderOutcome::Skipped(SkipReason::NoSettings));
        };

        // Gate 3: layout.
        let quality = self.core.quality_settings();
        let params = compute_render_params(
            canvas.width() as f32,
            input.bar_count,
            input.bar_spacing,
            self.effect.fixed_bar_width(settings),
            quality.max_bars,
        );
        if params.effective_bar_count == 0 || params.bar_width <= 0.0 {
            return Ok(RenderOutcome::Skipped(SkipReason::DegenerateLayout));
        }

        // Gate 4: resample + smooth into a pooled buffer so the core is
        // free again for the draw phase.
        let buckets = self.effect.processing_bars(&params);
        let mode = self.effect.resample_mode();
        let mut bars = self.core.scratch().get()?;
        {
            let smoothed = self.core.process_spectrum(input.spectrum, buckets, mode);
            bars.clear();
            bars.extend_from_slice(smoothed);
        }

        let paths = self.core.paths().clone();
        let overlay = config.overlay_active && config.overlay_alpha > 0.0;
        if overlay {
            // Draw into a transparent layer and composite once at the
            // overlay alpha.
            let (w, h) = (canvas.width(), canvas.height());
            let layer = Self::ensure_layer(&mut self.layer, w, h)?;
            layer.fill(Color::TRANSPARENT);
            let mut scene = Scene {
                canvas: layer,
                brush: &input.brush,
                anti_alias: quality.anti_alias,
                advanced_effects: quality.advanced_effects,
                dt: input.dt,
                paths,
            };
            self.effect.draw(&mut scene, &bars, &params, settings)?;
            let paint = PixmapPaint {
                opacity: config.overlay_alpha,
                ..PixmapPaint::default()
            };
            let layer = self.layer.as_ref().expect("layer just drawn");
            canvas.draw_pixmap(0, 0, layer.as_ref(), &paint, Transform::identity(), None);
        } else {
            let mut scene = Scene {
                canvas,
                brush: &input.brush,
                anti_alias: quality.anti_alias,
                advanced_effects: quality.advanced_effects,
                dt: input.dt,
                paths,
            };
            self.effect.draw(&mut scene, &bars, &params, settings)?;
        }

        self.core.clear_redraw();
        if self.core.end_frame() {
            self.effect.cleanup();
        }
        Ok(RenderOutcome::Drawn)
    }
}

impl<E: Effect> SpectrumRenderer for EffectRenderer<E> {
    fn style(&self) -> RenderStyle {
        self.core.style()
    }

    fn initialize(&mut self) {
        self.core.initialize();
    }

    fn configure(&mut self, overlay_active: bool, quality: RenderQuality) {
        if self.core.configure(overlay_active, quality) {
            let config = self.core.config();
            self.effect.on_configured(&config);
        }
    }

    fn set_overlay_alpha(&mut self, alpha: f32) {
        self.core.set_overlay_alpha(alpha);
    }

    fn render(
        &mut self,
        canvas: &mut Pixmap,
        input: &mut FrameInput<'_>,
    ) -> Result<RenderOutcome> {
        let result = self.render_inner(canvas, input);
        // The performance-info callback runs on success and early exit
        // alike.
        if let Some(callback) = input.perf_callback.as_mut() {
            callback(canvas);
        }
        result
    }

    fn requires_redraw(&self) -> bool {
        self.core.needs_redraw()
    }

    fn applied_config(&self) -> AppliedConfig {
        self.core.config()
    }

    fn applied_count(&self) -> u64 {
        self.core.applied_count()
    }
}

// Keep the pool type parameter readable at call sites.
pub type PathPool = ObjectPool<tiny_skia::PathBuilder>;
