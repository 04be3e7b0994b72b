// src/render/bars.rs
//! Classic vertical bars with gradient fill and peak caps.

use tiny_skia::{FillRule, Rect, Transform};

use crate::config::{RenderStyle, TierTable};
use crate::error::Result;
use crate::render::draw::{solid_paint, vertical_gradient};
use crate::render::effect::{Effect, Scene};
use crate::render::params::RenderParameters;
use crate::render::state::PeakField;

/// Tunables for the bars style.
#[derive(Debug, Clone, Copy)]
pub struct BarsSettings {
    /// Corner radius as a fraction of bar width.
    pub corner_frac: f32,
    /// Peak cap height in pixels.
    pub cap_height: f32,
    /// Peak hold time in seconds.
    pub peak_hold: f32,
    /// Peak decay gravity.
    pub peak_gravity: f32,
    /// Whether bars are gradient-filled.
    pub gradient: bool,
}

static SETTINGS: TierTable<BarsSettings> = TierTable::full(
    BarsSettings {
        corner_frac: 0.0,
        cap_height: 2.0,
        peak_hold: 0.3,
        peak_gravity: 4.0,
        gradient: false,
    },
    BarsSettings {
        corner_frac: 0.25,
        cap_height: 2.0,
        peak_hold: 0.4,
        peak_gravity: 3.0,
        gradient: true,
    },
    BarsSettings {
        corner_frac: 0.35,
        cap_height: 3.0,
        peak_hold: 0.5,
        peak_gravity: 2.5,
        gradient: true,
    },
);

/// Bar-chart spectrum with hold-and-decay peak caps.
pub struct BarsEffect {
    peaks: PeakField,
}

impl BarsEffect {
    pub fn new() -> Self {
        Self {
            peaks: PeakField::new(0.4, 3.0),
        }
    }
}

impl Default for BarsEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for BarsEffect {
    type Settings = BarsSettings;

    fn style(&self) -> RenderStyle {
        RenderStyle::Bars
    }

    fn settings() -> &'static TierTable<BarsSettings> {
        &SETTINGS
    }

    fn draw(
        &mut self,
        scene: &mut Scene<'_>,
        bars: &[f32],
        params: &RenderParameters,
        settings: &BarsSettings,
    ) -> Result<()> {
        let height = scene.canvas.height() as f32;
        self.peaks.update(bars, scene.dt);

        let radius = params.bar_width * settings.corner_frac;
        let cap_paint = solid_paint(scene.brush.secondary, scene.anti_alias);

        for (i, &level) in bars.iter().enumerate() {
            let bar_h = (level.clamp(0.0, 1.0) * height).max(0.0);
            if bar_h < 0.5 {
                continue;
            }
            let x = params.bar_x(i);
            let Some(rect) = Rect::from_xywh(x, height - bar_h, params.bar_width, bar_h)
            else {
                continue;
            };

            let path = crate::render::draw::rounded_rect(rect, radius);
            let mut paint = solid_paint(scene.brush.primary, scene.anti_alias);
            if settings.gradient && scene.advanced_effects {
                if let Some(shader) =
                    vertical_gradient(rect, scene.brush.primary, scene.brush.secondary)
                {
                    paint.shader = shader;
                }
            }
            scene
                .canvas
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }

        // Peak caps ride above the bars and fall back down.
        for i in 0..bars.len() {
            let peak = self.peaks.value(i);
            if peak <= 0.0 {
                continue;
            }
            let y = height - peak * height - settings.cap_height;
            let Some(rect) = Rect::from_xywh(
                params.bar_x(i),
                y.max(0.0),
                params.bar_width,
                settings.cap_height,
            ) else {
                continue;
            };
            let path = tiny_skia::PathBuilder::from_rect(rect);
            scene.canvas.fill_path(
                &path,
                &cap_paint,
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Brush, FrameInput, RenderOutcome, SpectrumRenderer};
    use crate::render::effect::EffectRenderer;
    use tiny_skia::Pixmap;

    #[test]
    fn draws_pixels_for_nonzero_spectrum() {
        let mut renderer = EffectRenderer::new(BarsEffect::new());
        renderer.initialize();
        let mut canvas = Pixmap::new(200, 100).unwrap();
        let spectrum = vec![0.8f32; 64];
        let mut input = FrameInput {
            spectrum: &spectrum,
            bar_count: 32,
            bar_spacing: 2.0,
            brush: Brush::default(),
            dt: 0.016,
            perf_callback: None,
        };

        let outcome = renderer.render(&mut canvas, &mut input).unwrap();
        assert_eq!(outcome, RenderOutcome::Drawn);
        assert!(canvas.data().iter().any(|&b| b != 0));
    }
}
