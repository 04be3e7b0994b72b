// src/render/bitmap.rs
//! Bitmap-buffered renderer base: format-matched offscreen pixmap reuse
//! and the afterglow style built on it.

use tiny_skia::{BlendMode, Color, FillRule, Pixmap, PixmapPaint, Rect, Transform};

use crate::config::{RenderStyle, TierTable};
use crate::error::{EngineError, Result};
use crate::render::draw::solid_paint;
use crate::render::effect::{Effect, Scene};
use crate::render::params::RenderParameters;

/// Offscreen pixmap reused across frames while dimensions match.
#[derive(Default)]
pub struct OffscreenBuffer {
    pixmap: Option<Pixmap>,
}

impl OffscreenBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the buffer, reallocating only on a dimension change. A
    /// fresh buffer starts fully transparent; `recreated` distinguishes
    /// the two cases so callers can skip fade passes on a new buffer.
    pub fn ensure(&mut self, width: u32, height: u32) -> Result<(&mut Pixmap, bool)> {
        let matches = self
            .pixmap
            .as_ref()
            .is_some_and(|p| p.width() == width && p.height() == height);
        if !matches {
            let pixmap = Pixmap::new(width, height)
                .ok_or(EngineError::InvalidCanvas { width, height })?;
            self.pixmap = Some(pixmap);
            return Ok((self.pixmap.as_mut().expect("just created"), true));
        }
        Ok((self.pixmap.as_mut().expect("checked above"), false))
    }

    /// Drops the backing pixmap.
    pub fn release(&mut self) {
        self.pixmap = None;
    }

    pub fn is_allocated(&self) -> bool {
        self.pixmap.is_some()
    }
}

/// Tunables for the afterglow style.
#[derive(Debug, Clone, Copy)]
pub struct AfterglowSettings {
    /// Per-frame trail retention in `0..1`; higher keeps trails longer.
    pub retention: f32,
    /// Fraction of canvas height the live bars reach.
    pub bar_frac: f32,
}

static SETTINGS: TierTable<AfterglowSettings> = TierTable::full(
    AfterglowSettings {
        retention: 0.75,
        bar_frac: 0.9,
    },
    AfterglowSettings {
        retention: 0.85,
        bar_frac: 0.95,
    },
    AfterglowSettings {
        retention: 0.90,
        bar_frac: 1.0,
    },
);

/// Bars that leave decaying trails in an offscreen accumulation buffer.
pub struct AfterglowEffect {
    buffer: OffscreenBuffer,
}

impl AfterglowEffect {
    pub fn new() -> Self {
        Self {
            buffer: OffscreenBuffer::new(),
        }
    }
}

impl Default for AfterglowEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for AfterglowEffect {
    type Settings = AfterglowSettings;

    fn style(&self) -> RenderStyle {
        RenderStyle::Afterglow
    }

    fn settings() -> &'static TierTable<AfterglowSettings> {
        &SETTINGS
    }

    fn draw(
        &mut self,
        scene: &mut Scene<'_>,
        bars: &[f32],
        params: &RenderParameters,
        settings: &AfterglowSettings,
    ) -> Result<()> {
        let (w, h) = (scene.canvas.width(), scene.canvas.height());
        let height = h as f32;
        let (buffer, recreated) = self.buffer.ensure(w, h)?;

        // Fade the accumulated trails by multiplying alpha down.
        if !recreated {
            let mut fade = tiny_skia::Paint::default();
            fade.set_color(
                Color::from_rgba(0.0, 0.0, 0.0, settings.retention).unwrap_or(Color::BLACK),
            );
            fade.blend_mode = BlendMode::DestinationIn;
            if let Some(full) = Rect::from_xywh(0.0, 0.0, w as f32, height) {
                buffer.fill_rect(full, &fade, Transform::identity(), None);
            }
        }

        // Stamp this frame's bars into the buffer.
        let paint = solid_paint(scene.brush.primary, scene.anti_alias);
        for (i, &level) in bars.iter().enumerate() {
            let bar_h = level.clamp(0.0, 1.0) * height * settings.bar_frac;
            if bar_h < 0.5 {
                continue;
            }
            let Some(rect) =
                Rect::from_xywh(params.bar_x(i), height - bar_h, params.bar_width, bar_h)
            else {
                continue;
            };
            let path = tiny_skia::PathBuilder::from_rect(rect);
            buffer.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }

        // Composite the buffer onto the frame canvas.
        scene.canvas.draw_pixmap(
            0,
            0,
            buffer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        Ok(())
    }

    fn cleanup(&mut self) {
        // Trails regenerate within a few frames; dropping the buffer on
        // the periodic pass keeps idle styles from pinning large bitmaps.
        self.buffer.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_reuses_until_dims_change() {
        let mut buffer = OffscreenBuffer::new();
        let (_, recreated) = buffer.ensure(64, 64).unwrap();
        assert!(recreated);
        let (_, recreated) = buffer.ensure(64, 64).unwrap();
        assert!(!recreated);
        let (_, recreated) = buffer.ensure(64, 32).unwrap();
        assert!(recreated);
    }

    #[test]
    fn zero_dims_fail_cleanly() {
        let mut buffer = OffscreenBuffer::new();
        assert!(buffer.ensure(0, 64).is_err());
        assert!(!buffer.is_allocated());
    }

    #[test]
    fn release_drops_allocation() {
        let mut buffer = OffscreenBuffer::new();
        buffer.ensure(32, 32).unwrap();
        buffer.release();
        assert!(!buffer.is_allocated());
    }
}
