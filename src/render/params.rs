// src/render/params.rs
//! Bar layout math.

use crate::config::MIN_BAR_WIDTH;

/// Derived, immutable layout for one render call; the sole channel by
/// which layout decisions reach drawing code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParameters {
    /// Number of bars actually drawn; at least 1.
    pub effective_bar_count: usize,
    /// Width of one bar in pixels; never negative.
    pub bar_width: f32,
    /// Gap between adjacent bars in pixels.
    pub bar_spacing: f32,
    /// Horizontal offset of the first bar (centering in fixed-width mode).
    pub start_offset: f32,
}

impl RenderParameters {
    /// Total horizontal extent the layout consumes.
    pub fn total_width(&self) -> f32 {
        self.effective_bar_count as f32 * self.bar_width
            + self.effective_bar_count.saturating_sub(1) as f32 * self.bar_spacing
    }

    /// Left edge of bar `i`.
    pub fn bar_x(&self, i: usize) -> f32 {
        self.start_offset + i as f32 * (self.bar_width + self.bar_spacing)
    }
}

/// Computes bar layout for a canvas.
///
/// Pure function of its inputs: the bar count is clamped to
/// `[1, max_bars]`, spacing never exceeds the geometric maximum that
/// keeps bars at [`MIN_BAR_WIDTH`], and a non-positive available width
/// collapses bar width to 0 rather than going negative. With
/// `fixed_bar_width` the content is centered and the count shrinks until
/// the total fits.
pub fn compute_render_params(
    canvas_width: f32,
    requested_bars: usize,
    requested_spacing: f32,
    fixed_bar_width: Option<f32>,
    max_bars: usize,
) -> RenderParameters {
    let width = if canvas_width.is_finite() {
        canvas_width.max(0.0)
    } else {
        0.0
    };
    let mut count = requested_bars.max(1).min(max_bars.max(1));
    let spacing = requested_spacing.max(0.0);

    match fixed_bar_width {
        Some(fixed) => {
            let bar_width = fixed.max(0.0);
            let stride = bar_width + spacing;
            // Shrink the count until the fixed-width content fits.
            if stride > 0.0 {
                let fit = ((width + spacing) / stride).floor() as usize;
                count = count.min(fit.max(1));
            }
            let mut bar_width = bar_width;
            let mut total = count as f32 * bar_width + (count - 1) as f32 * spacing;
            if total > width {
                // Even one bar may be wider than the canvas; clamp it.
                bar_width = (width - (count - 1) as f32 * spacing).max(0.0) / count as f32;
                total = count as f32 * bar_width + (count - 1) as f32 * spacing;
            }
            let start_offset = ((width - total) / 2.0).max(0.0);
            RenderParameters {
                effective_bar_count: count,
                bar_width,
                bar_spacing: spacing,
                start_offset,
            }
        }
        None => {
            let bar_spacing = if count > 1 {
                let max_spacing =
                    ((width - count as f32 * MIN_BAR_WIDTH) / (count - 1) as f32).max(0.0);
                spacing.min(max_spacing)
            } else {
                0.0
            };
            let bar_width =
                ((width - (count - 1) as f32 * bar_spacing) / count as f32).max(0.0);
            RenderParameters {
                effective_bar_count: count,
                bar_width,
                bar_spacing,
                start_offset: 0.0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_never_exceeds_canvas() {
        for width in [0u32, 1, 7, 64, 333, 800, 1920, 4096] {
            for bars in [1usize, 2, 5, 64, 200, 1000] {
                for spacing in [0.0f32, 1.0, 4.0, 50.0] {
                    let p =
                        compute_render_params(width as f32, bars, spacing, None, 256);
                    assert!(p.effective_bar_count >= 1);
                    assert!(p.effective_bar_count <= 256);
                    assert!(p.bar_width >= 0.0);
                    assert!(p.bar_spacing >= 0.0);
                    if width > 0 {
                        assert!(
                            p.total_width() <= width as f32 + 1e-3,
                            "overflow at w={width} n={bars} s={spacing}: {p:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn same_inputs_yield_identical_params() {
        let a = compute_render_params(800.0, 64, 4.0, None, 256);
        let b = compute_render_params(800.0, 64, 4.0, None, 256);
        assert_eq!(a, b);
        assert_eq!(a.effective_bar_count, 64);
        // 64 bars, 63 gaps of 4px: width = (800 - 252) / 64
        assert!((a.bar_width - (800.0 - 63.0 * 4.0) / 64.0).abs() < 1e-6);
    }

    #[test]
    fn spacing_is_clamped_to_keep_bars_visible() {
        let p = compute_render_params(100.0, 50, 10.0, None, 256);
        // 50 one-pixel bars leave 50px for 49 gaps.
        assert!(p.bar_spacing <= 50.0 / 49.0 + 1e-6);
        assert!(p.bar_width >= MIN_BAR_WIDTH - 1e-6);
    }

    #[test]
    fn zero_width_collapses_bars() {
        let p = compute_render_params(0.0, 32, 2.0, None, 256);
        assert_eq!(p.effective_bar_count, 32);
        assert_eq!(p.bar_width, 0.0);
    }

    #[test]
    fn fixed_width_centers_content() {
        let p = compute_render_params(100.0, 4, 2.0, Some(10.0), 256);
        assert_eq!(p.effective_bar_count, 4);
        assert_eq!(p.bar_width, 10.0);
        // Content is 46px wide; offset centers it.
        assert!((p.start_offset - 27.0).abs() < 1e-6);
        assert!(p.bar_x(0) >= 0.0);
    }

    #[test]
    fn fixed_width_sheds_bars_to_fit() {
        let p = compute_render_params(50.0, 100, 2.0, Some(10.0), 256);
        assert!(p.total_width() <= 50.0 + 1e-3);
        assert!(p.effective_bar_count >= 1);
    }

    #[test]
    fn count_clamps_to_quality_ceiling() {
        let p = compute_render_params(800.0, 1000, 0.0, None, 64);
        assert_eq!(p.effective_bar_count, 64);
    }
}
