// src/render/mod.rs
//! Renderer abstractions: the `SpectrumRenderer` trait, the shared
//! `RendererCore`, and the effect template all concrete styles build on.

pub mod base;
pub mod bars;
pub mod bitmap;
pub mod circular;
pub mod draw;
pub mod effect;
pub mod font;
pub mod grid;
pub mod params;
pub mod rotating;
pub mod state;
pub mod waveform;

pub use base::{RendererCore, ResampleMode};
pub use effect::{Effect, EffectRenderer, Scene};
pub use params::{RenderParameters, compute_render_params};

use tiny_skia::{Color, Pixmap};

use crate::config::{RenderQuality, RenderStyle};
use crate::error::Result;

/// Named visual palette resolved by the host; the engine clones what it
/// receives and never mutates a shared palette in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    /// Main foreground color.
    pub primary: Color,
    /// Secondary/gradient color.
    pub secondary: Color,
    /// Canvas clear color.
    pub background: Color,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            primary: Color::from_rgba8(0, 220, 160, 255),
            secondary: Color::from_rgba8(0, 110, 230, 255),
            background: Color::from_rgba8(12, 12, 16, 255),
        }
    }
}

/// Last-applied configuration; compared and swapped as one value so a
/// frame never observes a torn update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedConfig {
    /// Whether the renderer draws in the lighter overlay context.
    pub overlay_active: bool,
    /// Quality tier currently in force.
    pub quality: RenderQuality,
    /// Alpha used when compositing the overlay layer.
    pub overlay_alpha: f32,
}

impl Default for AppliedConfig {
    fn default() -> Self {
        Self {
            overlay_active: false,
            quality: RenderQuality::default(),
            overlay_alpha: 0.7,
        }
    }
}

/// Why a render call drew nothing. Expected conditions, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Canvas has no drawable area.
    ZeroCanvas,
    /// Spectrum slice was empty.
    EmptySpectrum,
    /// No quality-tier settings resolved.
    NoSettings,
    /// Layout collapsed to zero-width bars.
    DegenerateLayout,
}

/// Outcome of one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The effect drew a frame.
    Drawn,
    /// A validation gate short-circuited; nothing was drawn.
    Skipped(SkipReason),
}

/// Per-frame input handed to a renderer by the orchestrator.
pub struct FrameInput<'a> {
    /// Normalized magnitudes for this frame.
    pub spectrum: &'a [f32],
    /// Requested bar count before quality clamping.
    pub bar_count: usize,
    /// Requested bar spacing in pixels.
    pub bar_spacing: f32,
    /// Palette for this surface.
    pub brush: Brush,
    /// Seconds since the previous frame on this surface.
    pub dt: f32,
    /// Invoked with the canvas after every render call, drawn or skipped.
    pub perf_callback: Option<&'a mut dyn FnMut(&mut Pixmap)>,
}

/// A live renderer instance for one style.
///
/// Exactly one instance exists per [`RenderStyle`], owned by the factory
/// cache. Lifecycle: `initialize` once, `configure` on change only,
/// `render` once per paint event on the render thread.
pub trait SpectrumRenderer: Send {
    /// Style this renderer implements.
    fn style(&self) -> RenderStyle;

    /// One-time setup; later calls are no-ops.
    fn initialize(&mut self);

    /// Applies overlay/quality state. Idempotent: an unchanged pair
    /// mutates nothing and resets no smoothing state.
    fn configure(&mut self, overlay_active: bool, quality: RenderQuality);

    /// Sets the alpha used when compositing in overlay mode.
    fn set_overlay_alpha(&mut self, alpha: f32);

    /// Renders one frame onto `canvas`.
    fn render(&mut self, canvas: &mut Pixmap, input: &mut FrameInput<'_>)
    -> Result<RenderOutcome>;

    /// True when state changed since the last drawn frame.
    fn requires_redraw(&self) -> bool;

    /// Configuration currently in force; the configurator's change gate.
    fn applied_config(&self) -> AppliedConfig;

    /// Number of configure calls that actually changed state.
    fn applied_count(&self) -> u64;
}

impl std::fmt::Debug for dyn SpectrumRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumRenderer")
            .field("style", &self.style())
            .finish_non_exhaustive()
    }
}
