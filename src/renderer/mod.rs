//! Renderer — the deterministic rasterizer.
//!
//! `CellCanvas` is a `Surface` that turns pixel-space draw calls into a grid
//! of styled terminal cells. `Renderer` turns successive grids into the
//! `Frame`s the player writes out.
//!
//! Neither knows anything about books, pages or time.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::engine::spread::BookGeometry;
use crate::surface::{Monospace, Surface, TextMeasure};
use crate::types::{Cell, CellChange, Color, Font, Frame, TerminalContract};

/// Pixel size of one terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellMetrics {
    pub width_px: f64,
    pub height_px: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        CellMetrics {
            width_px: 10.0,
            height_px: 24.0,
        }
    }
}

impl CellMetrics {
    /// Smallest grid that holds a surface of `geometry`'s canvas size.
    pub fn contract_for(&self, geometry: &BookGeometry) -> TerminalContract {
        let (w, h) = geometry.canvas_size();
        TerminalContract {
            width: (w / self.width_px).ceil() as u16,
            height: (h / self.height_px).ceil() as u16,
        }
    }
}

pub struct CellCanvas {
    contract: TerminalContract,
    metrics: CellMetrics,
    grid: Vec<Vec<Cell>>,
}

impl CellCanvas {
    pub fn new(contract: TerminalContract, metrics: CellMetrics) -> Self {
        let w = contract.width as usize;
        let h = contract.height as usize;
        CellCanvas {
            contract,
            metrics,
            grid: vec![vec![Cell::default(); w]; h],
        }
    }

    pub fn contract(&self) -> TerminalContract {
        self.contract
    }

    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.grid
    }

    fn cell_center(&self, col: usize, row: usize) -> Point {
        Point::new(
            (col as f64 + 0.5) * self.metrics.width_px,
            (row as f64 + 0.5) * self.metrics.height_px,
        )
    }

    fn cell_at(&self, p: Point) -> Option<(usize, usize)> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let col = (p.x / self.metrics.width_px).floor() as usize;
        let row = (p.y / self.metrics.height_px).floor() as usize;
        (col < self.contract.width as usize && row < self.contract.height as usize)
            .then_some((col, row))
    }

    /// Cells whose centres could land inside `rect` once transformed, with
    /// each centre mapped back into the rect's local space.
    fn candidates(&self, rect: Rect, transform: Affine) -> Vec<(usize, usize, Point)> {
        let bbox = transform.transform_rect_bbox(rect);
        let inverse = transform.inverse();
        let m = &self.metrics;

        let col0 = (bbox.x0 / m.width_px - 1.0).floor().max(0.0) as usize;
        let row0 = (bbox.y0 / m.height_px - 1.0).floor().max(0.0) as usize;
        let col1 = ((bbox.x1 / m.width_px + 1.0).ceil().max(0.0) as usize)
            .min(self.contract.width as usize);
        let row1 = ((bbox.y1 / m.height_px + 1.0).ceil().max(0.0) as usize)
            .min(self.contract.height as usize);

        let mut out = Vec::new();
        for row in row0..row1 {
            for col in col0..col1 {
                out.push((col, row, inverse * self.cell_center(col, row)));
            }
        }
        out
    }

    /// Half the extent of one cell, measured along the local axes of
    /// `transform`.
    fn local_half_cell(&self, transform: Affine) -> Vec2 {
        let [a, b, c, d, _, _] = transform.inverse().as_coeffs();
        let hw = self.metrics.width_px / 2.0;
        let hh = self.metrics.height_px / 2.0;
        Vec2::new(a.abs() * hw + c.abs() * hh, b.abs() * hw + d.abs() * hh)
    }
}

impl TextMeasure for CellCanvas {
    fn measure_text(&self, text: &str, font: Font) -> f64 {
        Monospace {
            advance: self.metrics.width_px,
        }
        .measure_text(text, font)
    }
}

impl Surface for CellCanvas {
    fn clear(&mut self) {
        for row in &mut self.grid {
            row.fill(Cell::default());
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, transform: Affine) {
        for (col, row, local) in self.candidates(rect, transform) {
            if rect.contains(local) {
                self.grid[row][col] = Cell {
                    ch: ' ',
                    fg: None,
                    bg: Some(color),
                };
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, transform: Affine) {
        let half = self.local_half_cell(transform);
        let horizontal = edge_glyph(linear(transform, Vec2::new(1.0, 0.0)));
        let vertical = edge_glyph(linear(transform, Vec2::new(0.0, 1.0)));
        let device_center = transform * rect.center();

        for (col, row, local) in self.candidates(rect, transform) {
            let within_x = local.x >= rect.x0 - half.x && local.x <= rect.x1 + half.x;
            let within_y = local.y >= rect.y0 - half.y && local.y <= rect.y1 + half.y;
            let on_h = within_x
                && ((local.y - rect.y0).abs() <= half.y || (local.y - rect.y1).abs() <= half.y);
            let on_v = within_y
                && ((local.x - rect.x0).abs() <= half.x || (local.x - rect.x1).abs() <= half.x);

            let ch = match (on_h, on_v) {
                (false, false) => continue,
                (true, false) => horizontal,
                (false, true) => vertical,
                (true, true) => {
                    corner_glyph(horizontal, vertical, self.cell_center(col, row), device_center)
                }
            };
            let cell = &mut self.grid[row][col];
            cell.ch = ch;
            cell.fg = Some(color);
        }
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: Font, color: Color, transform: Affine) {
        let advance = self.metrics.width_px;
        // Sample each glyph a little above the baseline, roughly mid x-height.
        let rise = font.size * 0.35;
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let local = Point::new(origin.x + (i as f64 + 0.5) * advance, origin.y - rise);
            if let Some((col, row)) = self.cell_at(transform * local) {
                let cell = &mut self.grid[row][col];
                cell.ch = ch;
                cell.fg = Some(color);
            }
        }
    }
}

/// `v` under the linear part of `t`, ignoring translation.
fn linear(t: Affine, v: Vec2) -> Vec2 {
    let [a, b, c, d, _, _] = t.as_coeffs();
    Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
}

fn edge_glyph(dir: Vec2) -> char {
    let (x, y) = (dir.x.abs(), dir.y.abs());
    if y <= x * 0.4 {
        '─'
    } else if x <= y * 0.4 {
        '│'
    } else if dir.x * dir.y > 0.0 {
        '\\'
    } else {
        '/'
    }
}

/// Box-drawing corner for a cell, picked by which side of it the rect lies
/// on. Falls back to `+` once the rect is tilted off the grid.
fn corner_glyph(horizontal: char, vertical: char, cell: Point, rect_center: Point) -> char {
    if horizontal != '─' || vertical != '│' {
        return '+';
    }
    match (rect_center.x > cell.x, rect_center.y > cell.y) {
        (true, true) => '┌',
        (false, true) => '┐',
        (true, false) => '└',
        (false, false) => '┘',
    }
}

pub struct Renderer;

impl Renderer {
    /// The frame that takes the screen from `prev` to `next`.
    ///
    /// Without a previous grid the frame is full. Otherwise it is a diff
    /// holding only the cells that changed.
    pub fn frame(prev: Option<&[Vec<Cell>]>, next: &[Vec<Cell>]) -> Frame {
        match prev {
            None => Frame::Full {
                cells: next.to_vec(),
            },
            Some(prev) => Frame::Diff {
                changes: Self::diff(prev, next),
            },
        }
    }

    /// Compute a cell-level diff between two grids.
    fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: *next_cell,
                    });
                }
            }
        }
        changes
    }

    /// Plain-text rendition of a grid, one line per row, trailing blanks
    /// trimmed.
    pub fn to_text(grid: &[Vec<Cell>]) -> String {
        let mut out = String::new();
        for row in grid {
            let line: String = row.iter().map(|c| c.ch).collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use pretty_assertions::assert_eq;

    use super::*;

    fn canvas(w: u16, h: u16) -> CellCanvas {
        CellCanvas::new(
            TerminalContract {
                width: w,
                height: h,
            },
            CellMetrics {
                width_px: 10.0,
                height_px: 10.0,
            },
        )
    }

    fn rows(canvas: &CellCanvas) -> Vec<String> {
        Renderer::to_text(canvas.grid())
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn default_book_fits_86_by_25() {
        let contract = CellMetrics::default().contract_for(&BookGeometry::default());
        assert_eq!(
            contract,
            TerminalContract {
                width: 86,
                height: 25
            }
        );
    }

    #[test]
    fn fill_covers_cells_whose_centres_are_inside() {
        let mut c = canvas(6, 4);
        c.fill_rect(Rect::new(10.0, 10.0, 40.0, 30.0), Color::WHITE, Affine::IDENTITY);
        let filled: Vec<(usize, usize)> = (0..4)
            .flat_map(|y| (0..6).map(move |x| (x, y)))
            .filter(|&(x, y)| c.grid()[y][x].bg == Some(Color::WHITE))
            .collect();
        assert_eq!(filled, vec![(1, 1), (2, 1), (3, 1), (1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn stroke_draws_box() {
        let mut c = canvas(6, 4);
        c.stroke_rect(Rect::new(5.0, 5.0, 45.0, 35.0), Color::BLACK, Affine::IDENTITY);
        assert_eq!(rows(&c), vec!["┌───┐", "│   │", "│   │", "└───┘"]);
    }

    #[test]
    fn half_turn_mirrors_text_about_pivot() {
        let mut c = canvas(10, 3);
        let t = Affine::translate((50.0, 15.0)) * Affine::rotate(PI) * Affine::translate((-50.0, -15.0));
        c.fill_text("ab", Point::new(60.0, 20.0), Font::px(10.0), Color::BLACK, Affine::IDENTITY);
        c.fill_text("ab", Point::new(60.0, 20.0), Font::px(10.0), Color::BLACK, t);
        assert_eq!(rows(&c), vec!["", "  ba  ab", ""]);
    }

    #[test]
    fn text_keeps_page_background() {
        let mut c = canvas(4, 2);
        c.fill_rect(Rect::new(0.0, 0.0, 40.0, 20.0), Color::WHITE, Affine::IDENTITY);
        c.fill_text("x", Point::new(0.0, 8.0), Font::px(10.0), Color::BLACK, Affine::IDENTITY);
        assert_eq!(
            c.grid()[0][0],
            Cell {
                ch: 'x',
                fg: Some(Color::BLACK),
                bg: Some(Color::WHITE)
            }
        );
    }

    #[test]
    fn first_frame_is_full_then_diffs() {
        let mut c = canvas(3, 1);
        let first = c.grid().to_vec();
        assert!(matches!(Renderer::frame(None, &first), Frame::Full { .. }));

        c.fill_text("z", Point::new(10.0, 8.0), Font::px(10.0), Color::BLACK, Affine::IDENTITY);
        let frame = Renderer::frame(Some(&first), c.grid());
        assert_eq!(
            frame,
            Frame::Diff {
                changes: vec![CellChange {
                    x: 1,
                    y: 0,
                    cell: Cell {
                        ch: 'z',
                        fg: Some(Color::BLACK),
                        bg: None
                    }
                }]
            }
        );
    }
}
