// src/render/grid.rs
//! Grid renderer base: canvas-sized value/peak cell buffers and the LED
//! matrix style built on them.

use tiny_skia::{Rect, Transform};

use crate::config::{RenderStyle, TierTable};
use crate::error::Result;
use crate::render::draw::{mix, solid_paint, with_alpha};
use crate::render::effect::{Effect, Scene};
use crate::render::params::RenderParameters;
use crate::render::state::PeakField;

/// 2D cell buffers sized to the canvas, with row count derived from the
/// cell size. Reallocated wholesale when the geometry changes.
#[derive(Debug, Clone, Default)]
pub struct GridBuffers {
    cols: usize,
    rows: usize,
    cell: f32,
    values: Vec<f32>,
}

impl GridBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures the grid matches `cols` columns over a canvas of the given
    /// height with square cells of `cell` pixels. Returns `true` when the
    /// layout changed and the buffers were rebuilt.
    pub fn ensure(&mut self, cols: usize, canvas_height: f32, cell: f32) -> bool {
        let cell = cell.max(1.0);
        let rows = ((canvas_height / cell).floor() as usize).max(1);
        if self.cols == cols && self.rows == rows && (self.cell - cell).abs() < f32::EPSILON {
            return false;
        }
        self.cols = cols;
        self.rows = rows;
        self.cell = cell;
        self.values = vec![0.0; cols * rows];
        true
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell(&self) -> f32 {
        self.cell
    }

    /// Stored intensity for a cell.
    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.values
            .get(row * self.cols + col)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn set(&mut self, col: usize, row: usize, value: f32) {
        if let Some(slot) = self.values.get_mut(row * self.cols + col) {
            *slot = value;
        }
    }
}

/// Tunables for the matrix style.
#[derive(Debug, Clone, Copy)]
pub struct MatrixSettings {
    /// Cell edge length in pixels.
    pub cell: f32,
    /// Gap inside each cell.
    pub inset: f32,
    /// Alpha of unlit cells (0 disables the background lattice).
    pub idle_alpha: f32,
}

static SETTINGS: TierTable<MatrixSettings> = TierTable::full(
    MatrixSettings {
        cell: 12.0,
        inset: 2.0,
        idle_alpha: 0.0,
    },
    MatrixSettings {
        cell: 10.0,
        inset: 2.0,
        idle_alpha: 0.08,
    },
    MatrixSettings {
        cell: 8.0,
        inset: 1.5,
        idle_alpha: 0.10,
    },
);

/// LED-matrix columns with hold-and-decay peak cells.
pub struct MatrixEffect {
    grid: GridBuffers,
    peaks: PeakField,
}

impl MatrixEffect {
    pub fn new() -> Self {
        Self {
            grid: GridBuffers::new(),
            peaks: PeakField::new(0.5, 2.5),
        }
    }
}

impl Default for MatrixEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for MatrixEffect {
    type Settings = MatrixSettings;

    fn style(&self) -> RenderStyle {
        RenderStyle::Matrix
    }

    fn settings() -> &'static TierTable<MatrixSettings> {
        &SETTINGS
    }

    fn fixed_bar_width(&self, settings: &MatrixSettings) -> Option<f32> {
        Some(settings.cell)
    }

    fn draw(
        &mut self,
        scene: &mut Scene<'_>,
        bars: &[f32],
        params: &RenderParameters,
        settings: &MatrixSettings,
    ) -> Result<()> {
        let height = scene.canvas.height() as f32;
        self.grid
            .ensure(params.effective_bar_count, height, settings.cell);
        self.peaks.update(bars, scene.dt);

        let rows = self.grid.rows();
        let cell = self.grid.cell();
        let size = cell - settings.inset;
        let idle = with_alpha(scene.brush.secondary, settings.idle_alpha);

        for (col, &level) in bars.iter().enumerate() {
            let lit = (level.clamp(0.0, 1.0) * rows as f32).round() as usize;
            let peak_row = (self.peaks.value(col) * rows as f32).round() as usize;
            let x = params.bar_x(col);

            for row in 0..rows {
                // Row 0 is the bottom of the column.
                let y = height - (row + 1) as f32 * cell;
                let Some(rect) = Rect::from_xywh(x, y + settings.inset / 2.0, size, size)
                else {
                    continue;
                };

                let color = if row < lit {
                    let heat = row as f32 / rows.max(1) as f32;
                    mix(scene.brush.primary, scene.brush.secondary, heat)
                } else if row + 1 == peak_row && peak_row > lit {
                    scene.brush.secondary
                } else if settings.idle_alpha > 0.0 && scene.advanced_effects {
                    idle
                } else {
                    continue;
                };

                let paint = solid_paint(color, scene.anti_alias);
                let path = tiny_skia::PathBuilder::from_rect(rect);
                scene.canvas.fill_path(
                    &path,
                    &paint,
                    tiny_skia::FillRule::Winding,
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
    fn rows_derive_from_cell_size() {
        let mut grid = GridBuffers::new();
        assert!(grid.ensure(16, 100.0, 10.0));
        assert_eq!(grid.rows(), 10);
        assert_eq!(grid.cols(), 16);
    }

    #[test]
    fn ensure_is_stable_for_same_geometry() {
        let mut grid = GridBuffers::new();
        grid.ensure(8, 80.0, 8.0);
        grid.set(3, 2, 0.7);
        // Same geometry: no rebuild, values survive.
        assert!(!grid.ensure(8, 80.0, 8.0));
        assert!((grid.get(3, 2) - 0.7).abs() < 1e-6);
        // Geometry change rebuilds wholesale.
        assert!(grid.ensure(8, 80.0, 16.0));
        assert_eq!(grid.get(3, 2), 0.0);
    }

    #[test]
    fn out_of_range_cells_read_zero() {
        let mut grid = GridBuffers::new();
        grid.ensure(4, 40.0, 10.0);
        assert_eq!(grid.get(100, 100), 0.0);
    }
}
