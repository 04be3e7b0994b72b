// src/render/circular.rs
//! Circular renderer base: memoized unit-circle directions and the
//! radial spokes style built on it.

use tiny_skia::{LineCap, Stroke, Transform};

use crate::config::{RenderStyle, TierTable};
use crate::error::Result;
use crate::render::draw::{mix, solid_paint};
use crate::render::effect::{Effect, Scene};
use crate::render::params::RenderParameters;
use crate::render::state::AnimState;

/// Memoized N-point unit-circle direction vectors.
///
/// Rebuilt only when the requested point count changes, so circular
/// renderers do no trig in the steady state.
#[derive(Debug, Clone, Default)]
pub struct DirectionCache {
    dirs: Vec<(f32, f32)>,
}

impl DirectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit vectors for `count` evenly spaced angles, starting at twelve
    /// o'clock and running clockwise.
    pub fn directions(&mut self, count: usize) -> &[(f32, f32)] {
        if self.dirs.len() != count {
            self.dirs = (0..count)
                .map(|i| {
                    let angle = i as f32 / count.max(1) as f32 * std::f32::consts::TAU
                        - std::f32::consts::FRAC_PI_2;
                    (angle.cos(), angle.sin())
                })
                .collect();
        }
        &self.dirs
    }
}

/// Tunables for the radial style.
#[derive(Debug, Clone, Copy)]
pub struct RadialSettings {
    /// Hub radius as a fraction of the half-extent.
    pub inner_frac: f32,
    /// Spoke length range as a fraction of the half-extent.
    pub reach_frac: f32,
    /// Base rotation speed in radians per second.
    pub spin_rate: f32,
}

static SETTINGS: TierTable<RadialSettings> = TierTable::full(
    RadialSettings {
        inner_frac: 0.25,
        reach_frac: 0.65,
        spin_rate: 0.0,
    },
    RadialSettings {
        inner_frac: 0.22,
        reach_frac: 0.70,
        spin_rate: 0.15,
    },
    RadialSettings {
        inner_frac: 0.20,
        reach_frac: 0.75,
        spin_rate: 0.25,
    },
);

/// Spokes radiating from the canvas center, length driven by magnitude.
pub struct RadialEffect {
    dirs: DirectionCache,
    anim: AnimState,
}

impl RadialEffect {
    pub fn new() -> Self {
        Self {
            dirs: DirectionCache::new(),
            anim: AnimState::new(),
        }
    }
}

impl Default for RadialEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for RadialEffect {
    type Settings = RadialSettings;

    fn style(&self) -> RenderStyle {
        RenderStyle::Radial
    }

    fn settings() -> &'static TierTable<RadialSettings> {
        &SETTINGS
    }

    fn draw(
        &mut self,
        scene: &mut Scene<'_>,
        bars: &[f32],
        params: &RenderParameters,
        settings: &RadialSettings,
    ) -> Result<()> {
        let w = scene.canvas.width() as f32;
        let h = scene.canvas.height() as f32;
        let cx = w / 2.0;
        let cy = h / 2.0;
        let extent = w.min(h) / 2.0;

        self.anim.advance(scene.dt, settings.spin_rate);
        let (sin, cos) = self.anim.phase.sin_cos();

        let stroke = Stroke {
            width: params.bar_width.clamp(1.0, 6.0),
            line_cap: LineCap::Round,
            ..Stroke::default()
        };

        let dirs = self.dirs.directions(bars.len());
        let mut pb = scene.paths.get()?.detach();
        for (i, &level) in bars.iter().enumerate() {
            let (dx, dy) = dirs[i];
            // Rotate the cached direction by the accumulated phase.
            let (dx, dy) = (dx * cos - dy * sin, dx * sin + dy * cos);
            let inner = extent * settings.inner_frac;
            let outer = inner + extent * settings.reach_frac * level.clamp(0.0, 1.0);

            pb.clear();
            pb.move_to(cx + dx * inner, cy + dy * inner);
            pb.line_to(cx + dx * outer, cy + dy * outer);
            let builder = std::mem::replace(&mut pb, tiny_skia::PathBuilder::new());
            let Some(path) = builder.finish() else {
                continue;
            };

            let color = mix(scene.brush.secondary, scene.brush.primary, level);
            let paint = solid_paint(color, scene.anti_alias);
            scene
                .canvas
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            // Reuse the finished path's allocation for the next spoke.
            pb = path.clear();
        }
        scene.paths.put(pb);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_cache_memoizes_count() {
        let mut cache = DirectionCache::new();
        let first = cache.directions(8).as_ptr();
        let second = cache.directions(8).as_ptr();
        assert_eq!(first, second);
        assert_eq!(cache.directions(16).len(), 16);
    }

    #[test]
    fn directions_are_unit_length() {
        let mut cache = DirectionCache::new();
        for &(x, y) in cache.directions(32) {
            assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn first_direction_points_up() {
        let mut cache = DirectionCache::new();
        let (x, y) = cache.directions(4)[0];
        assert!(x.abs() < 1e-5);
        assert!((y + 1.0).abs() < 1e-5);
    }
}
