// src/render/rotating.rs
//! 3D-rotating renderer base: rotation accumulation driven by the low
//! end of the spectrum, and the orbit style built on it.

use tiny_skia::{FillRule, PathBuilder, Transform};

use crate::config::{RenderStyle, TierTable};
use crate::error::Result;
use crate::render::draw::{mix, solid_paint, with_alpha};
use crate::render::effect::{Effect, Scene};
use crate::render::params::RenderParameters;

/// Accumulated 3D rotation whose speed follows low-frequency energy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationState {
    /// Rotation around the vertical axis, radians.
    pub yaw: f32,
    /// Rotation around the horizontal axis, radians.
    pub pitch: f32,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances rotation; the first few spectrum bins act as a throttle
    /// so the scene spins faster on bass hits.
    pub fn advance(&mut self, spectrum: &[f32], dt: f32, base_rate: f32) {
        let low = spectrum.iter().take(4).copied().sum::<f32>()
            / spectrum.len().min(4).max(1) as f32;
        let rate = base_rate * (0.3 + low * 1.7);
        self.yaw = (self.yaw + rate * dt) % std::f32::consts::TAU;
        self.pitch = (self.pitch + rate * 0.37 * dt) % std::f32::consts::TAU;
    }

    /// Projects a point on the unit sphere scaled by `radius` onto the
    /// canvas with a simple perspective divide. Returns screen position
    /// and a depth factor in `0..=1` (1 = nearest).
    pub fn project(&self, p: [f32; 3], radius: f32, cx: f32, cy: f32) -> (f32, f32, f32) {
        let (sy, cy_) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();

        // Yaw around Y, then pitch around X.
        let x1 = p[0] * cy_ + p[2] * sy;
        let z1 = -p[0] * sy + p[2] * cy_;
        let y2 = p[1] * cp - z1 * sp;
        let z2 = p[1] * sp + z1 * cp;

        let camera = 3.0;
        let scale = camera / (camera - z2.clamp(-0.95, 0.95));
        let depth = (z2 + 1.0) / 2.0;
        (cx + x1 * radius * scale, cy + y2 * radius * scale, depth)
    }
}

/// Tunables for the orbit style.
#[derive(Debug, Clone, Copy)]
pub struct OrbitSettings {
    /// Orb radius range in pixels.
    pub orb_min: f32,
    pub orb_max: f32,
    /// Base spin rate in radians per second.
    pub spin_rate: f32,
    /// Number of stacked rings.
    pub rings: usize,
}

static SETTINGS: TierTable<OrbitSettings> = TierTable::full(
    OrbitSettings {
        orb_min: 1.5,
        orb_max: 4.0,
        spin_rate: 0.8,
        rings: 1,
    },
    OrbitSettings {
        orb_min: 1.5,
        orb_max: 6.0,
        spin_rate: 1.0,
        rings: 2,
    },
    OrbitSettings {
        orb_min: 2.0,
        orb_max: 8.0,
        spin_rate: 1.2,
        rings: 3,
    },
);

/// Rotating 3D rings of orbs, sized by per-band magnitude.
pub struct OrbitEffect {
    rotation: RotationState,
}

impl OrbitEffect {
    pub fn new() -> Self {
        Self {
            rotation: RotationState::new(),
        }
    }
}

impl Default for OrbitEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for OrbitEffect {
    type Settings = OrbitSettings;

    fn style(&self) -> RenderStyle {
        RenderStyle::Orbit
    }

    fn settings() -> &'static TierTable<OrbitSettings> {
        &SETTINGS
    }

    fn draw(
        &mut self,
        scene: &mut Scene<'_>,
        bars: &[f32],
        params: &RenderParameters,
        settings: &OrbitSettings,
    ) -> Result<()> {
        let _ = params;
        let w = scene.canvas.width() as f32;
        let h = scene.canvas.height() as f32;
        let (cx, cy) = (w / 2.0, h / 2.0);
        let radius = w.min(h) * 0.35;

        self.rotation.advance(bars, scene.dt, settings.spin_rate);

        let rings = if scene.advanced_effects {
            settings.rings
        } else {
            1
        };
        for ring in 0..rings {
            let tilt = (ring as f32 - (rings as f32 - 1.0) / 2.0) * 0.5;
            for (i, &level) in bars.iter().enumerate() {
                let angle = i as f32 / bars.len() as f32 * std::f32::consts::TAU;
                let point = [
                    angle.cos() * tilt.cos().abs().max(0.2),
                    tilt.sin() * 0.8,
                    angle.sin() * tilt.cos().abs().max(0.2),
                ];
                let (sx, sy, depth) = self.rotation.project(point, radius, cx, cy);

                let level = level.clamp(0.0, 1.0);
                let orb = settings.orb_min + (settings.orb_max - settings.orb_min) * level;
                let Some(circle) = PathBuilder::from_circle(sx, sy, orb * (0.5 + depth * 0.5))
                else {
                    continue;
                };
                let color = with_alpha(
                    mix(scene.brush.secondary, scene.brush.primary, level),
                    0.35 + depth * 0.65,
                );
                let paint = solid_paint(color, scene.anti_alias);
                scene.canvas.fill_path(
                    &circle,
                    &paint,
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bass_energy_spins_faster() {
        let mut quiet = RotationState::new();
        let mut loud = RotationState::new();
        for _ in 0..60 {
            quiet.advance(&[0.0; 16], 0.016, 1.0);
            loud.advance(&[1.0; 16], 0.016, 1.0);
        }
        assert!(loud.yaw > quiet.yaw);
    }

    #[test]
    fn projection_stays_finite() {
        let mut rot = RotationState::new();
        rot.advance(&[0.5; 8], 0.5, 2.0);
        for i in 0..32 {
            let a = i as f32 / 32.0 * std::f32::consts::TAU;
            let (x, y, depth) = rot.project([a.cos(), 0.0, a.sin()], 100.0, 200.0, 150.0);
            assert!(x.is_finite() && y.is_finite());
            assert!((0.0..=1.0).contains(&depth));
        }
    }
}
