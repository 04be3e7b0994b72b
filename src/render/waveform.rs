// src/render/waveform.rs
//! Waveform renderer base: Catmull-Rom top/bottom/fill path building and
//! the wave style built on it.

use tiny_skia::{FillRule, Path, PathBuilder, Stroke, Transform};

use crate::config::{RenderStyle, TierTable};
use crate::error::{EngineError, Result};
use crate::render::draw::{catmull_rom, solid_paint, vertical_gradient, with_alpha};
use crate::render::effect::{Effect, Scene};
use crate::render::params::RenderParameters;

/// Top, mirrored bottom, and closed fill paths for a waveform band.
pub struct WavePaths {
    pub top: Path,
    pub bottom: Path,
    pub fill: Path,
}

/// Builds smooth waveform paths around a horizontal center line.
///
/// `levels[i]` maps to a vertical half-extent at `xs(i)`; the top edge is
/// a Catmull-Rom spline through the crests, the bottom edge its mirror,
/// and the fill closes the two into one region.
pub fn build_wave_paths(
    levels: &[f32],
    params: &RenderParameters,
    center_y: f32,
    half_extent: f32,
) -> Result<WavePaths> {
    if levels.len() < 2 {
        return Err(EngineError::resource("waveform needs at least two points"));
    }

    let x_at = |i: usize| params.bar_x(i) + params.bar_width / 2.0;
    let top_pts: Vec<(f32, f32)> = levels
        .iter()
        .enumerate()
        .map(|(i, &v)| (x_at(i), center_y - v.clamp(0.0, 1.0) * half_extent))
        .collect();
    let bottom_pts: Vec<(f32, f32)> = levels
        .iter()
        .enumerate()
        .map(|(i, &v)| (x_at(i), center_y + v.clamp(0.0, 1.0) * half_extent))
        .collect();

    let mut pb = PathBuilder::new();
    catmull_rom(&mut pb, &top_pts);
    let top = pb
        .finish()
        .ok_or_else(|| EngineError::resource("empty top path"))?;

    let mut pb = PathBuilder::new();
    catmull_rom(&mut pb, &bottom_pts);
    let bottom = pb
        .finish()
        .ok_or_else(|| EngineError::resource("empty bottom path"))?;

    // Fill: top spline forward, bottom spline reversed, closed.
    let mut pb = PathBuilder::new();
    catmull_rom(&mut pb, &top_pts);
    let reversed: Vec<(f32, f32)> = bottom_pts.iter().rev().copied().collect();
    pb.line_to(reversed[0].0, reversed[0].1);
    catmull_rom_continue(&mut pb, &reversed);
    pb.close();
    let fill = pb
        .finish()
        .ok_or_else(|| EngineError::resource("empty fill path"))?;

    Ok(WavePaths { top, bottom, fill })
}

/// Appends a Catmull-Rom spline continuing from the current point.
fn catmull_rom_continue(pb: &mut PathBuilder, points: &[(f32, f32)]) {
    if points.len() < 2 {
        return;
    }
    let n = points.len();
    for i in 0..n - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];
        let c1 = (p1.0 + (p2.0 - p0.0) / 6.0, p1.1 + (p2.1 - p0.1) / 6.0);
        let c2 = (p2.0 - (p3.0 - p1.0) / 6.0, p2.1 - (p3.1 - p1.1) / 6.0);
        pb.cubic_to(c1.0, c1.1, c2.0, c2.1, p2.0, p2.1);
    }
}

/// Tunables for the wave style.
#[derive(Debug, Clone, Copy)]
pub struct WaveSettings {
    /// Edge stroke width in pixels.
    pub stroke_width: f32,
    /// Fill alpha.
    pub fill_alpha: f32,
    /// Fraction of canvas height the band may span.
    pub span_frac: f32,
}

static SETTINGS: TierTable<WaveSettings> = TierTable::full(
    WaveSettings {
        stroke_width: 1.0,
        fill_alpha: 0.4,
        span_frac: 0.7,
    },
    WaveSettings {
        stroke_width: 1.5,
        fill_alpha: 0.5,
        span_frac: 0.8,
    },
    WaveSettings {
        stroke_width: 2.0,
        fill_alpha: 0.55,
        span_frac: 0.85,
    },
);

/// Symmetric spectral waveform around the canvas midline.
pub struct WaveEffect;

impl WaveEffect {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WaveEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for WaveEffect {
    type Settings = WaveSettings;

    fn style(&self) -> RenderStyle {
        RenderStyle::Wave
    }

    fn settings() -> &'static TierTable<WaveSettings> {
        &SETTINGS
    }

    fn draw(
        &mut self,
        scene: &mut Scene<'_>,
        bars: &[f32],
        params: &RenderParameters,
        settings: &WaveSettings,
    ) -> Result<()> {
        if bars.len() < 2 {
            return Ok(());
        }
        let height = scene.canvas.height() as f32;
        let center = height / 2.0;
        let half_extent = height * settings.span_frac / 2.0;

        let paths = build_wave_paths(bars, params, center, half_extent)?;

        // Fill first so the edges stay crisp on top.
        let mut fill_paint = solid_paint(
            with_alpha(scene.brush.primary, settings.fill_alpha),
            scene.anti_alias,
        );
        if scene.advanced_effects {
            if let Some(shader) = vertical_gradient(
                paths.fill.bounds(),
                with_alpha(scene.brush.primary, settings.fill_alpha),
                with_alpha(scene.brush.secondary, settings.fill_alpha),
            ) {
                fill_paint.shader = shader;
            }
        }
        scene.canvas.fill_path(
            &paths.fill,
            &fill_paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );

        let stroke = Stroke {
            width: settings.stroke_width,
            ..Stroke::default()
        };
        let edge_paint = solid_paint(scene.brush.primary, scene.anti_alias);
        scene
            .canvas
            .stroke_path(&paths.top, &edge_paint, &stroke, Transform::identity(), None);
        scene.canvas.stroke_path(
            &paths.bottom,
            &edge_paint,
            &stroke,
            Transform::identity(),
            None,
        );
        Ok(())
    }
}
