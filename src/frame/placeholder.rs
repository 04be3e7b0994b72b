// src/frame/placeholder.rs
//! Idle-state animation shown while no spectrum is flowing.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tiny_skia::{FillRule, PathBuilder, Pixmap, Transform};

use crate::render::Brush;
use crate::render::draw::{solid_paint, with_alpha};
use crate::render::font::GlyphCache;
use crate::render::state::AnimState;

const MESSAGE: &str = "WAITING FOR AUDIO";
/// Frames to defer before the animation becomes eligible, so a brief
/// gap in the spectrum does not flash the placeholder.
const WARMUP_FRAMES: u32 = 3;
/// Tick rate the placeholder loop reschedules itself at.
const TICK: Duration = Duration::from_millis(33);

struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    /// Remaining lifetime in seconds.
    life: f32,
}

/// Bouncing, glowing idle message with particle bursts on wall hits.
///
/// Self-contained: owns its glyph cache, animation state, and RNG, and
/// carries no renderer or factory references.
pub struct Placeholder {
    glyphs: GlyphCache,
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    glow: AnimState,
    particles: Vec<Particle>,
    warmup: u32,
    rng: StdRng,
}

impl Placeholder {
    pub fn new() -> Self {
        Self {
            glyphs: GlyphCache::new(2.0),
            x: 20.0,
            y: 20.0,
            vx: 42.0,
            vy: 28.0,
            glow: AnimState::new(),
            particles: Vec::new(),
            warmup: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Re-enters the warmup window; called when a live frame flows.
    pub fn reset(&mut self) {
        self.warmup = 0;
    }

    /// Whether the warmup window has elapsed.
    pub fn is_warmed_up(&self) -> bool {
        self.warmup >= WARMUP_FRAMES
    }

    /// Delay before the placeholder loop should tick again. Only the
    /// placeholder path reschedules on this; a live frame stops the loop.
    pub fn next_delay(&self) -> Duration {
        TICK
    }

    #[cfg(test)]
    pub(crate) fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Advances and draws one placeholder tick. During warmup the canvas
    /// is cleared to the background and nothing else is drawn; returns
    /// whether the animation itself was drawn.
    pub fn render(&mut self, canvas: &mut Pixmap, brush: &Brush, dt: f32) -> bool {
        canvas.fill(brush.background);
        if self.warmup < WARMUP_FRAMES {
            self.warmup += 1;
            return false;
        }

        let w = canvas.width() as f32;
        let h = canvas.height() as f32;
        self.glow.advance(dt, 2.0);

        // Scale the message to roughly a third of the canvas width.
        let target_px = (w / (MESSAGE.len() as f32 * 18.0)).clamp(1.0, 4.0);
        self.glyphs.set_pixel_size(target_px);
        let text_w = self.glyphs.text_width(MESSAGE);
        let text_h = self.glyphs.line_height();

        // Bounce inside the canvas, bursting particles on wall hits.
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        let max_x = (w - text_w).max(0.0);
        let max_y = (h - text_h).max(0.0);
        let mut hit = false;
        if self.x <= 0.0 || self.x >= max_x {
            self.vx = -self.vx;
            self.x = self.x.clamp(0.0, max_x);
            hit = true;
        }
        if self.y <= 0.0 || self.y >= max_y {
            self.vy = -self.vy;
            self.y = self.y.clamp(0.0, max_y);
            hit = true;
        }
        if hit {
            self.burst(self.x + text_w / 2.0, self.y + text_h / 2.0);
        }

        self.step_particles(canvas, brush, dt);

        // Glow: oscillate the text alpha.
        let glow = 0.55 + 0.45 * self.glow.phase.sin().abs();
        let color = with_alpha(brush.primary, glow);
        self.glyphs.draw_text(canvas, MESSAGE, self.x, self.y, color);
        true
    }

    fn burst(&mut self, cx: f32, cy: f32) {
        for _ in 0..12 {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.gen_range(30.0..90.0);
            self.particles.push(Particle {
                x: cx,
                y: cy,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                life: self.rng.gen_range(0.4..0.9),
            });
        }
    }

    fn step_particles(&mut self, canvas: &mut Pixmap, brush: &Brush, dt: f32) {
        self.particles.retain_mut(|p| {
            p.life -= dt;
            if p.life <= 0.0 {
                return false;
            }
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            true
        });

        for p in &self.particles {
            let alpha = (p.life / 0.9).clamp(0.0, 1.0);
            let paint = solid_paint(with_alpha(brush.secondary, alpha), true);
            let mut pb = PathBuilder::new();
            pb.push_circle(p.x, p.y, 1.5);
            if let Some(path) = pb.finish() {
                canvas.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }
        }
    }
}

impl Default for Placeholder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_defers_the_animation() {
        let mut placeholder = Placeholder::new();
        let mut canvas = Pixmap::new(120, 60).unwrap();
        let brush = Brush::default();
        for _ in 0..WARMUP_FRAMES {
            assert!(!placeholder.render(&mut canvas, &brush, 0.033));
        }
        assert!(placeholder.render(&mut canvas, &brush, 0.033));
        assert!(placeholder.is_warmed_up());
    }

    #[test]
    fn reset_reenters_warmup() {
        let mut placeholder = Placeholder::new();
        let mut canvas = Pixmap::new(120, 60).unwrap();
        let brush = Brush::default();
        for _ in 0..=WARMUP_FRAMES {
            placeholder.render(&mut canvas, &brush, 0.033);
        }
        placeholder.reset();
        assert!(!placeholder.is_warmed_up());
        assert!(!placeholder.render(&mut canvas, &brush, 0.033));
    }

    #[test]
    fn wall_hits_burst_particles_that_expire() {
        let mut placeholder = Placeholder::new();
        let mut canvas = Pixmap::new(120, 60).unwrap();
        let brush = Brush::default();
        // Enough ticks on a small canvas to guarantee a wall hit.
        for _ in 0..200 {
            placeholder.render(&mut canvas, &brush, 0.05);
        }
        // Particles may or may not be alive right now, but the system
        // must never accumulate unboundedly.
        assert!(placeholder.particle_count() < 500);
    }

    #[test]
    fn placeholder_draws_visible_text() {
        let mut placeholder = Placeholder::new();
        let mut canvas = Pixmap::new(400, 200).unwrap();
        let brush = Brush::default();
        for _ in 0..=WARMUP_FRAMES {
            placeholder.render(&mut canvas, &brush, 0.033);
        }
        // At least one pixel differs from the background fill.
        let bg = canvas.pixel(0, 0).unwrap();
        let any_foreground = (0..canvas.height())
            .any(|y| (0..canvas.width()).any(|x| canvas.pixel(x, y).unwrap() != bg));
        assert!(any_foreground);
    }
}
