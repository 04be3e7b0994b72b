// src/engine/mod.rs
//! Per-surface orchestrator: decides placeholder vs. cache replay vs.
//! live render on each paint event.

use std::sync::Arc;
use std::time::Instant;

use tiny_skia::{FillRule, PathBuilder, Pixmap, Rect, Transform};
use tracing::{debug, warn};

use crate::config::{RenderQuality, RenderStyle};
use crate::error::Result;
use crate::factory::{CancelFlag, RendererFactory};
use crate::frame::{FrameCache, PerfSnapshot, PerformanceMetrics, Placeholder};
use crate::render::draw::{solid_paint, with_alpha};
use crate::render::font::GlyphCache;
use crate::render::state::DimCache;
use crate::render::{Brush, FrameInput, RenderOutcome};
use crate::spectrum::SpectrumSource;

/// Read-only snapshot the orchestrator consumes each frame. Built fresh
/// by the host per paint event; the engine never holds onto it.
pub struct RenderContext<'a> {
    /// Whether audio capture is live. `false` shows the placeholder.
    pub is_recording: bool,
    /// Whether the overlay surface mode is active.
    pub is_overlay_active: bool,
    /// Whether to stamp the FPS/frame-time readout onto the canvas.
    pub show_performance_info: bool,
    /// Visual style to render with.
    pub style: RenderStyle,
    /// Quality tier for this surface.
    pub quality: RenderQuality,
    /// Requested bar count before quality clamping.
    pub bar_count: usize,
    /// Requested bar spacing in pixels.
    pub bar_spacing: f32,
    /// Named palette resolved through the surface's brush provider.
    pub palette: &'a str,
    /// Latest-spectrum provider; pull-based and non-blocking.
    pub source: &'a dyn SpectrumSource,
}

/// Resolves a palette name to concrete colors. The engine copies what it
/// receives and never mutates a shared palette in place.
pub trait BrushProvider: Send {
    fn brush(&self, name: &str) -> Brush;
}

/// Built-in palettes, falling back to the default for unknown names.
#[derive(Default)]
pub struct DefaultBrushes;

impl BrushProvider for DefaultBrushes {
    fn brush(&self, name: &str) -> Brush {
        use tiny_skia::Color;
        match name {
            "ember" => Brush {
                primary: Color::from_rgba8(255, 120, 40, 255),
                secondary: Color::from_rgba8(200, 30, 60, 255),
                background: Color::from_rgba8(18, 10, 8, 255),
            },
            "mono" => Brush {
                primary: Color::from_rgba8(235, 235, 235, 255),
                secondary: Color::from_rgba8(120, 120, 120, 255),
                background: Color::from_rgba8(10, 10, 10, 255),
            },
            _ => Brush::default(),
        }
    }
}

/// What a paint event produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameResult {
    /// Nothing rendered: disposed surface rules or an inactive overlay.
    Skipped,
    /// The idle animation (or its warmup clear) was drawn.
    Placeholder,
    /// The cached frame was blitted; no renderer ran.
    Replayed,
    /// A live frame was rendered and snapshotted.
    Rendered,
}

/// Per-surface driver owning presentation state for one canvas.
///
/// Renderer instances themselves live in the shared factory; the
/// surface only holds the machinery around them.
pub struct SurfaceRenderer {
    factory: Arc<RendererFactory>,
    brushes: Box<dyn BrushProvider>,
    placeholder: Placeholder,
    frame_cache: FrameCache,
    metrics: PerformanceMetrics,
    dims: DimCache,
    perf_glyphs: GlyphCache,
    cancel: CancelFlag,
    /// True when this surface is the overlay canvas; it renders nothing
    /// while overlay mode is off.
    overlay_surface: bool,
    last_style: Option<RenderStyle>,
    last_quality: Option<RenderQuality>,
    /// Timestamp of the spectrum behind the cached frame; replay is only
    /// valid while the provider still returns the same snapshot.
    last_rendered_at: Option<Instant>,
    last_tick: Option<Instant>,
}

impl SurfaceRenderer {
    pub fn new(factory: Arc<RendererFactory>) -> Self {
        Self::with_brushes(factory, Box::new(DefaultBrushes))
    }

    pub fn with_brushes(factory: Arc<RendererFactory>, brushes: Box<dyn BrushProvider>) -> Self {
        Self {
            factory,
            brushes,
            placeholder: Placeholder::new(),
            frame_cache: FrameCache::new(),
            metrics: PerformanceMetrics::new(),
            dims: DimCache::new(),
            perf_glyphs: GlyphCache::new(2.0),
            cancel: CancelFlag::new(),
            overlay_surface: false,
            last_style: None,
            last_quality: None,
            last_rendered_at: None,
            last_tick: None,
        }
    }

    /// Marks this surface as the overlay canvas.
    pub fn overlay_surface(mut self) -> Self {
        self.overlay_surface = true;
        self
    }

    /// Rolling performance statistics for this surface.
    pub fn perf_snapshot(&self) -> Option<PerfSnapshot> {
        self.metrics.snapshot()
    }

    /// Forces the next paint through the live render path.
    pub fn invalidate(&mut self) {
        self.frame_cache.mark_dirty();
    }

    /// Cancels any in-flight renderer creation for this surface.
    pub fn cancel_pending(&self) {
        self.cancel.cancel();
    }

    /// Drives one paint event.
    ///
    /// Per-frame failures (missing data, drawing-resource errors) are
    /// downgraded to the placeholder so the loop keeps running; renderer
    /// creation failures propagate, since a missing style is a caller
    /// bug rather than a transient condition.
    pub fn render_frame(&mut self, canvas: &mut Pixmap, ctx: &RenderContext<'_>) -> Result<FrameResult> {
        let start = Instant::now();
        let dt = self
            .last_tick
            .map(|t| start.duration_since(t).as_secs_f32().min(0.25))
            .unwrap_or(1.0 / 60.0);
        self.last_tick = Some(start);

        let brush = self.brushes.brush(ctx.palette);

        // Overlay surfaces render nothing while overlay mode is off.
        if self.overlay_surface && !ctx.is_overlay_active {
            canvas.fill(tiny_skia::Color::TRANSPARENT);
            return Ok(FrameResult::Skipped);
        }

        // Any style/quality/dimension change invalidates the cached frame.
        if self.dims.changed(canvas.width(), canvas.height())
            || self.last_style != Some(ctx.style)
            || self.last_quality != Some(ctx.quality)
        {
            self.frame_cache.mark_dirty();
        }
        self.last_style = Some(ctx.style);
        self.last_quality = Some(ctx.quality);

        if !ctx.is_recording {
            return Ok(self.show_placeholder(canvas, &brush, dt));
        }

        let Some(data) = ctx.source.latest().filter(|d| !d.is_empty()) else {
            // Recording but no completed spectrum yet: fall back rather
            // than freeze or replay stale content.
            debug!("no spectrum available; falling back to placeholder");
            return Ok(self.show_placeholder(canvas, &brush, dt));
        };

        // Replay while the provider still returns the snapshot we drew.
        if self.last_rendered_at == Some(data.timestamp) && self.frame_cache.replay(canvas) {
            return Ok(FrameResult::Replayed);
        }

        let shared = self.factory.create_renderer(
            ctx.style,
            ctx.is_overlay_active,
            Some(ctx.quality),
            &self.cancel,
        )?;

        canvas.fill(brush.background);
        let perf = ctx.show_performance_info.then(|| self.metrics.snapshot());
        let glyphs = &mut self.perf_glyphs;
        let mut perf_callback = move |canvas: &mut Pixmap| {
            if let Some(snapshot) = perf.flatten() {
                draw_perf_overlay(glyphs, canvas, &snapshot);
            }
        };
        let mut input = FrameInput {
            spectrum: &data.magnitudes,
            bar_count: ctx.bar_count,
            bar_spacing: ctx.bar_spacing,
            brush,
            dt,
            perf_callback: ctx
                .show_performance_info
                .then_some(&mut perf_callback as &mut dyn FnMut(&mut Pixmap)),
        };

        let outcome = { shared.lock().render(canvas, &mut input) };
        drop(input);

        match outcome {
            Ok(RenderOutcome::Drawn) => {
                self.frame_cache.store(canvas);
                self.last_rendered_at = Some(data.timestamp);
                self.metrics.record_frame(start.elapsed());
                self.placeholder.reset();
                Ok(FrameResult::Rendered)
            }
            Ok(RenderOutcome::Skipped(reason)) => {
                debug!(?reason, "renderer skipped the frame");
                self.frame_cache.mark_dirty();
                Ok(FrameResult::Skipped)
            }
            Err(err) => {
                // A bad frame must not kill the loop; the renderer stays
                // usable for the next paint.
                warn!(style = %ctx.style, error = %err, "render failed; showing placeholder");
                Ok(self.show_placeholder(canvas, &brush, dt))
            }
        }
    }

    fn show_placeholder(&mut self, canvas: &mut Pixmap, brush: &Brush, dt: f32) -> FrameResult {
        // A cached frame predating the outage must not replay after it.
        self.frame_cache.mark_dirty();
        self.last_rendered_at = None;
        self.placeholder.render(canvas, brush, dt);
        FrameResult::Placeholder
    }

    /// Suggested delay before the next tick while idling in placeholder
    /// state.
    pub fn placeholder_delay(&self) -> std::time::Duration {
        self.placeholder.next_delay()
    }
}

/// Stamps the FPS/frame-time/memory readout in the top-left corner.
fn draw_perf_overlay(glyphs: &mut GlyphCache, canvas: &mut Pixmap, snapshot: &PerfSnapshot) {
    let mut line = format!(
        "FPS {:.0} MS {:.1}-{:.1}",
        snapshot.fps, snapshot.avg_frame_ms, snapshot.worst_frame_ms
    );
    if let Some(mb) = snapshot.rss_mb {
        line.push_str(&format!(" MB {mb:.0}"));
    }

    glyphs.set_pixel_size(1.0);
    let pad = 3.0;
    let w = glyphs.text_width(&line) + pad * 2.0;
    let h = glyphs.line_height() + pad * 2.0;
    if let Some(rect) = Rect::from_xywh(2.0, 2.0, w, h) {
        let paint = solid_paint(with_alpha(tiny_skia::Color::BLACK, 0.6), false);
        let path = PathBuilder::from_rect(rect);
        canvas.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    glyphs.draw_text(canvas, &line, 2.0 + pad, 2.0 + pad, tiny_skia::Color::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{SharedSpectrum, SpectralData};

    fn context<'a>(source: &'a dyn SpectrumSource, recording: bool) -> RenderContext<'a> {
        RenderContext {
            is_recording: recording,
            is_overlay_active: false,
            show_performance_info: false,
            style: RenderStyle::Bars,
            quality: RenderQuality::Medium,
            bar_count: 32,
            bar_spacing: 2.0,
            palette: "default",
            source,
        }
    }

    #[test]
    fn not_recording_shows_placeholder() {
        let factory = Arc::new(RendererFactory::new());
        let mut surface = SurfaceRenderer::new(factory);
        let shared = SharedSpectrum::new();
        let mut canvas = Pixmap::new(160, 90).unwrap();

        let result = surface
            .render_frame(&mut canvas, &context(shared.as_ref(), false))
            .unwrap();
        assert_eq!(result, FrameResult::Placeholder);
    }

    #[test]
    fn live_data_renders_then_replays() {
        let factory = Arc::new(RendererFactory::new());
        let mut surface = SurfaceRenderer::new(factory.clone());
        let shared = SharedSpectrum::new();
        shared.publish(SpectralData::new(vec![0.6; 32]));
        let mut canvas = Pixmap::new(160, 90).unwrap();
        let ctx = context(shared.as_ref(), true);

        assert_eq!(
            surface.render_frame(&mut canvas, &ctx).unwrap(),
            FrameResult::Rendered
        );
        // The provider still returns the same snapshot, so the second
        // paint replays the cached frame without touching the renderer.
        assert_eq!(
            surface.render_frame(&mut canvas, &ctx).unwrap(),
            FrameResult::Replayed
        );

        // Fresh data goes back through the live path.
        shared.publish(SpectralData::new(vec![0.2; 32]));
        assert_eq!(
            surface.render_frame(&mut canvas, &ctx).unwrap(),
            FrameResult::Rendered
        );
        assert_eq!(factory.cached_count(), 1);
    }

    #[test]
    fn provider_outage_falls_back_without_replay() {
        let factory = Arc::new(RendererFactory::new());
        let mut surface = SurfaceRenderer::new(factory);
        let shared = SharedSpectrum::new();
        shared.publish(SpectralData::new(vec![0.6; 32]));
        let mut canvas = Pixmap::new(160, 90).unwrap();
        let ctx = context(shared.as_ref(), true);
        surface.render_frame(&mut canvas, &ctx).unwrap();

        // Five empty frames in a row: placeholder every time, never a
        // replay of the stale cached frame, no error.
        shared.invalidate();
        for _ in 0..5 {
            let result = surface.render_frame(&mut canvas, &ctx).unwrap();
            assert_eq!(result, FrameResult::Placeholder);
        }
    }

    #[test]
    fn unknown_style_propagates_to_caller() {
        let factory = Arc::new(RendererFactory::with_registry(
            std::collections::HashMap::new(),
        ));
        let mut surface = SurfaceRenderer::new(factory);
        let shared = SharedSpectrum::new();
        shared.publish(SpectralData::new(vec![0.6; 32]));
        let mut canvas = Pixmap::new(160, 90).unwrap();

        let err = surface
            .render_frame(&mut canvas, &context(shared.as_ref(), true))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::EngineError::UnknownStyle(RenderStyle::Bars)
        ));
    }

    #[test]
    fn inactive_overlay_surface_skips() {
        let factory = Arc::new(RendererFactory::new());
        let mut surface = SurfaceRenderer::new(factory).overlay_surface();
        let shared = SharedSpectrum::new();
        shared.publish(SpectralData::new(vec![0.6; 32]));
        let mut canvas = Pixmap::new(160, 90).unwrap();

        let result = surface
            .render_frame(&mut canvas, &context(shared.as_ref(), true))
            .unwrap();
        assert_eq!(result, FrameResult::Skipped);
    }

    #[test]
    fn style_change_invalidates_cached_frame() {
        let factory = Arc::new(RendererFactory::new());
        let mut surface = SurfaceRenderer::new(factory);
        let shared = SharedSpectrum::new();
        shared.publish(SpectralData::new(vec![0.6; 32]));
        let mut canvas = Pixmap::new(160, 90).unwrap();
        let mut ctx = context(shared.as_ref(), true);

        surface.render_frame(&mut canvas, &ctx).unwrap();
        ctx.style = RenderStyle::Wave;
        // Same spectrum snapshot, but the style change must force a live
        // render instead of replaying the bars frame.
        assert_eq!(
            surface.render_frame(&mut canvas, &ctx).unwrap(),
            FrameResult::Rendered
        );
    }
}
