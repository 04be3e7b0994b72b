// src/render/font.rs
//! Font-cached renderer base: a built-in 5x7 glyph face, a size-matched
//! glyph path cache, and the marquee style built on them.

use std::collections::HashMap;

use tiny_skia::{Color, FillRule, Path, PathBuilder, Pixmap, Rect, Transform};

use crate::config::{RenderStyle, TierTable};
use crate::error::Result;
use crate::render::draw::{mix, solid_paint};
use crate::render::effect::{Effect, Scene};
use crate::render::params::RenderParameters;
use crate::render::state::AnimState;

/// Columns per glyph cell, including one column of spacing.
pub const GLYPH_ADVANCE: f32 = 6.0;
/// Rows per glyph.
pub const GLYPH_ROWS: f32 = 7.0;

/// 5x7 bitmap pattern for a character; each row is a 5-bit mask.
fn glyph_rows(ch: char) -> Option<[u8; 7]> {
    let rows = match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b01010, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0, 0, 0, 0, 0, 0, 0b00100],
        ':' => [0, 0b00100, 0, 0, 0b00100, 0, 0],
        '-' => [0, 0, 0, 0b01110, 0, 0, 0],
        '%' => [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        _ => return None,
    };
    Some(rows)
}

/// Size-matched glyph path cache.
///
/// Paths are built once per (character, pixel size) and reused until the
/// size changes, at which point the whole cache is rebuilt lazily.
pub struct GlyphCache {
    pixel: f32,
    glyphs: HashMap<char, Option<Path>>,
}

impl GlyphCache {
    /// Creates a cache rendering glyphs from `pixel`-sized dots.
    pub fn new(pixel: f32) -> Self {
        Self {
            pixel: pixel.max(1.0),
            glyphs: HashMap::new(),
        }
    }

    /// Current dot size in pixels.
    pub fn pixel_size(&self) -> f32 {
        self.pixel
    }

    /// Changes the dot size, invalidating cached paths on change.
    pub fn set_pixel_size(&mut self, pixel: f32) {
        let pixel = pixel.max(1.0);
        if (pixel - self.pixel).abs() > f32::EPSILON {
            self.pixel = pixel;
            self.glyphs.clear();
        }
    }

    /// Advance width of one glyph cell.
    pub fn advance(&self) -> f32 {
        GLYPH_ADVANCE * self.pixel
    }

    /// Height of one glyph cell.
    pub fn line_height(&self) -> f32 {
        GLYPH_ROWS * self.pixel
    }

    /// Total width `text` occupies.
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance()
    }

    /// Number of glyphs currently cached.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    fn glyph(&mut self, ch: char) -> Option<&Path> {
        let pixel = self.pixel;
        self.glyphs
            .entry(ch.to_ascii_uppercase())
            .or_insert_with(|| {
                let rows = glyph_rows(ch)?;
                let mut pb = PathBuilder::new();
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..5u32 {
                        if (bits >> (4 - col)) & 1 == 1 {
                            if let Some(rect) = Rect::from_xywh(
                                col as f32 * pixel,
                                row as f32 * pixel,
                                pixel,
                                pixel,
                            ) {
                                pb.push_rect(rect);
                            }
                        }
                    }
                }
                pb.finish()
            })
            .as_ref()
    }

    /// Draws `text` with its top-left corner at `(x, y)`.
    pub fn draw_text(
        &mut self,
        canvas: &mut Pixmap,
        text: &str,
        x: f32,
        y: f32,
        color: Color,
    ) {
        // Sharp dots read better than anti-aliased ones at this size.
        let paint = solid_paint(color, false);
        let advance = self.advance();
        for (i, ch) in text.chars().enumerate() {
            if ch == ' ' {
                continue;
            }
            let Some(path) = self.glyph(ch) else {
                continue;
            };
            let transform = Transform::from_translate(x + i as f32 * advance, y);
            canvas.fill_path(path, &paint, FillRule::Winding, transform, None);
        }
    }
}

/// Tunables for the marquee style.
#[derive(Debug, Clone, Copy)]
pub struct MarqueeSettings {
    /// Glyph dot size in pixels.
    pub pixel: f32,
    /// Scroll speed in pixels per second.
    pub scroll_speed: f32,
}

static SETTINGS: TierTable<MarqueeSettings> = TierTable::full(
    MarqueeSettings {
        pixel: 2.0,
        scroll_speed: 20.0,
    },
    MarqueeSettings {
        pixel: 2.0,
        scroll_speed: 30.0,
    },
    MarqueeSettings {
        pixel: 3.0,
        scroll_speed: 40.0,
    },
);

/// Scrolling ticker of per-band level digits above a baseline of bars.
pub struct MarqueeEffect {
    glyphs: GlyphCache,
    anim: AnimState,
}

impl MarqueeEffect {
    pub fn new() -> Self {
        Self {
            glyphs: GlyphCache::new(2.0),
            anim: AnimState::new(),
        }
    }
}

impl Default for MarqueeEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for MarqueeEffect {
    type Settings = MarqueeSettings;

    fn style(&self) -> RenderStyle {
        RenderStyle::Marquee
    }

    fn settings() -> &'static TierTable<MarqueeSettings> {
        &SETTINGS
    }

    fn draw(
        &mut self,
        scene: &mut Scene<'_>,
        bars: &[f32],
        params: &RenderParameters,
        settings: &MarqueeSettings,
    ) -> Result<()> {
        let w = scene.canvas.width() as f32;
        let height = scene.canvas.height() as f32;
        self.glyphs.set_pixel_size(settings.pixel);
        self.anim.advance(scene.dt, 1.0);

        // Thin bars along the bottom as the baseline.
        let bar_zone = height * 0.35;
        let paint = solid_paint(scene.brush.secondary, scene.anti_alias);
        for (i, &level) in bars.iter().enumerate() {
            let bar_h = level.clamp(0.0, 1.0) * bar_zone;
            if bar_h < 0.5 {
                continue;
            }
            let Some(rect) =
                Rect::from_xywh(params.bar_x(i), height - bar_h, params.bar_width, bar_h)
            else {
                continue;
            };
            let path = PathBuilder::from_rect(rect);
            scene
                .canvas
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }

        // Scrolling digit ticker: one 0-9 digit per band.
        let advance = self.glyphs.advance();
        let line_y = (height - bar_zone - self.glyphs.line_height()) / 2.0;
        let ticker_width = bars.len() as f32 * advance;
        if ticker_width <= 0.0 {
            return Ok(());
        }
        let scroll = (self.anim.time * settings.scroll_speed) % ticker_width;

        for (i, &level) in bars.iter().enumerate() {
            let digit = (level.clamp(0.0, 1.0) * 9.0).round() as u32;
            let ch = char::from_digit(digit, 10).unwrap_or('0');
            let mut x = i as f32 * advance - scroll;
            if x < -advance {
                x += ticker_width;
            }
            if x > w {
                continue;
            }
            let color = mix(scene.brush.secondary, scene.brush.primary, level);
            let text = ch.to_string();
            self.glyphs.draw_text(scene.canvas, &text, x, line_y, color);
        }
        Ok(())
    }
}
