// src/render/draw.rs
//! Shared drawing helpers: paints, gradients, rounded rects, splines.

use tiny_skia::{
    Color, GradientStop, LinearGradient, Paint, Path, PathBuilder, Point, Rect, Shader,
    SpreadMode, Transform,
};

/// Solid-color paint with the given anti-alias setting.
pub fn solid_paint(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = anti_alias;
    paint
}

/// `color` with its alpha scaled by `alpha` in `0..=1`.
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    Color::from_rgba(
        color.red(),
        color.green(),
        color.blue(),
        (color.alpha() * alpha).clamp(0.0, 1.0),
    )
    .unwrap_or(color)
}

/// Linear interpolation between two colors.
pub fn mix(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    Color::from_rgba(
        a.red() + (b.red() - a.red()) * t,
        a.green() + (b.green() - a.green()) * t,
        a.blue() + (b.blue() - a.blue()) * t,
        a.alpha() + (b.alpha() - a.alpha()) * t,
    )
    .unwrap_or(a)
}

/// Vertical top-to-bottom gradient spanning `rect`.
pub fn vertical_gradient(rect: Rect, top: Color, bottom: Color) -> Option<Shader<'static>> {
    LinearGradient::new(
        Point::from_xy(rect.x(), rect.y()),
        Point::from_xy(rect.x(), rect.bottom()),
        vec![
            GradientStop::new(0.0, top),
            GradientStop::new(1.0, bottom),
        ],
        SpreadMode::Pad,
        Transform::identity(),
    )
}

/// Rounded-rectangle path; falls back to the plain rect when the radius
/// degenerates.
pub fn rounded_rect(rect: Rect, radius: f32) -> Path {
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0);
    if r <= 0.0 {
        return PathBuilder::from_rect(rect);
    }

    let (left, top) = (rect.x(), rect.y());
    let (right, bottom) = (rect.right(), rect.bottom());

    let mut pb = PathBuilder::new();
    pb.move_to(left + r, top);
    pb.line_to(right - r, top);
    pb.quad_to(right, top, right, top + r);
    pb.line_to(right, bottom - r);
    pb.quad_to(right, bottom, right - r, bottom);
    pb.line_to(left + r, bottom);
    pb.quad_to(left, bottom, left, bottom - r);
    pb.line_to(left, top + r);
    pb.quad_to(left, top, left + r, top);
    pb.close();

    pb.finish().unwrap_or_else(|| PathBuilder::from_rect(rect))
}

/// Appends a Catmull-Rom spline through `points` to `pb`.
///
/// Each segment between interior points becomes a cubic Bezier with the
/// standard uniform Catmull-Rom tangents; endpoints are clamped by
/// duplicating the first and last points.
pub fn catmull_rom(pb: &mut PathBuilder, points: &[(f32, f32)]) {
    match points {
        [] => {}
        [p] => {
            pb.move_to(p.0, p.1);
        }
        [a, b] => {
            pb.move_to(a.0, a.1);
            pb.line_to(b.0, b.1);
        }
        _ => {
            pb.move_to(points[0].0, points[0].1);
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_rect_degenerates_to_rect() {
        let rect = Rect::from_xywh(0.0, 0.0, 10.0, 10.0).unwrap();
        let path = rounded_rect(rect, 0.0);
        assert_eq!(path.bounds().width(), 10.0);
    }

    #[test]
    fn rounded_rect_stays_inside_bounds() {
        let rect = Rect::from_xywh(5.0, 5.0, 40.0, 20.0).unwrap();
        let path = rounded_rect(rect, 6.0);
        let bounds = path.bounds();
        assert!(bounds.left() >= rect.left() - 1e-3);
        assert!(bounds.right() <= rect.right() + 1e-3);
    }

    #[test]
    fn catmull_rom_passes_through_knots() {
        let mut pb = PathBuilder::new();
        let points = [(0.0, 0.0), (10.0, 5.0), (20.0, -5.0), (30.0, 0.0)];
        catmull_rom(&mut pb, &points);
        let path = pb.finish().unwrap();
        // The spline interpolates, so all knots lie within its bounds.
        let bounds = path.bounds();
        for (x, _) in points {
            assert!(x >= bounds.left() - 1e-3 && x <= bounds.right() + 1e-3);
        }
    }

    #[test]
    fn mix_endpoints() {
        let a = Color::from_rgba8(0, 0, 0, 255);
        let b = Color::from_rgba8(255, 255, 255, 255);
        assert_eq!(mix(a, b, 0.0).red(), 0.0);
        assert!((mix(a, b, 1.0).red() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn with_alpha_scales() {
        let c = Color::from_rgba8(10, 20, 30, 255);
        let faded = with_alpha(c, 0.5);
        assert!((faded.alpha() - 0.5).abs() < 1e-3);
    }
}
