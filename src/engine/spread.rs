use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::surface::Surface;
use crate::types::{Color, Font};

use super::layout::{wrap_text, LaidLine};

/// Fixed placement of the book on the surface, in pixels.
///
/// Nothing here is derived from content; the same book always lands in the
/// same place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookGeometry {
    /// Top-left corner of the left page.
    pub book_x: f64,
    pub book_y: f64,
    pub page_width: f64,
    pub page_height: f64,
    /// Width of the spine strip between the pages.
    pub margin: f64,
    /// How far the closed cover reaches past the page slots on every side.
    pub cover_bleed: f64,
    pub text_inset: f64,
    /// Distance from the top of the text bounds to the first baseline.
    pub baseline_offset: f64,
    pub line_height: f64,
    pub body_font: f64,
    pub title_font: f64,
    pub author_font: f64,
    /// Title baseline, relative to the top-left of the left page.
    pub title_at: [f64; 2],
    pub author_at: [f64; 2],
}

impl Default for BookGeometry {
    fn default() -> Self {
        BookGeometry {
            book_x: 75.0,
            book_y: 50.0,
            page_width: 350.0,
            page_height: 500.0,
            margin: 10.0,
            cover_bleed: 20.0,
            text_inset: 20.0,
            baseline_offset: 20.0,
            line_height: 24.0,
            body_font: 16.0,
            title_font: 24.0,
            author_font: 16.0,
            title_at: [250.0, 40.0],
            author_at: [270.0, 70.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Left,
    Right,
}

impl BookGeometry {
    pub fn page(&self, face: Face) -> Rect {
        let x = match face {
            Face::Left => self.book_x,
            Face::Right => self.book_x + self.page_width + self.margin,
        };
        Rect::new(x, self.book_y, x + self.page_width, self.book_y + self.page_height)
    }

    pub fn spine(&self) -> Rect {
        let x = self.book_x + self.page_width;
        Rect::new(x, self.book_y, x + self.margin, self.book_y + self.page_height)
    }

    pub fn cover_panel(&self) -> Rect {
        let b = self.cover_bleed;
        Rect::new(
            self.book_x - b,
            self.book_y - b,
            self.book_x + 2.0 * self.page_width + self.margin + b,
            self.book_y + self.page_height + b,
        )
    }

    /// Midpoint of the spine; turning pages rotate about this point.
    pub fn spine_pivot(&self) -> Point {
        Point::new(
            self.book_x + self.page_width + self.margin / 2.0,
            self.book_y + self.page_height / 2.0,
        )
    }

    /// Interior text bounds of a page as `(x, y, max_width)`.
    pub fn text_bounds(&self, face: Face) -> (f64, f64, f64) {
        let page = self.page(face);
        (
            page.x0 + self.text_inset,
            page.y0 + self.text_inset,
            self.page_width - 2.0 * self.text_inset,
        )
    }

    /// Pixel size of a surface that holds the book with equal margins.
    pub fn canvas_size(&self) -> (f64, f64) {
        (
            2.0 * self.book_x + 2.0 * self.page_width + self.margin,
            2.0 * self.book_y + self.page_height,
        )
    }
}

/// Draws the static state of the book for one page index.
///
/// Rendering reads the book and the geometry only; it never touches
/// navigation state, so the same inputs always produce the same draw calls.
#[derive(Debug, Clone, Copy)]
pub struct SpreadRenderer {
    geometry: BookGeometry,
}

impl SpreadRenderer {
    pub fn new(geometry: BookGeometry) -> Self {
        SpreadRenderer { geometry }
    }

    pub fn geometry(&self) -> &BookGeometry {
        &self.geometry
    }

    /// Clear `surface` and draw the cover (index 0) or the open spread.
    pub fn render<S: Surface + ?Sized>(&self, book: &Book, page_index: usize, surface: &mut S) {
        let g = &self.geometry;
        surface.clear();

        if page_index == 0 {
            surface.fill_rect(g.cover_panel(), Color::COVER, Affine::IDENTITY);
        }

        for face in [Face::Left, Face::Right] {
            self.draw_page(face, Affine::IDENTITY, surface);
        }
        surface.fill_rect(g.spine(), Color::SPINE, Affine::IDENTITY);

        if page_index == 0 {
            self.draw_cover_text(book, surface);
        } else {
            for face in [Face::Left, Face::Right] {
                self.draw_text(book, page_index, face, Affine::IDENTITY, surface);
            }
        }
    }

    /// Draw one page of the spread at `page_index`, text included, under
    /// `transform`. Used for the face of a turning page.
    pub fn render_face<S: Surface + ?Sized>(
        &self,
        book: &Book,
        page_index: usize,
        face: Face,
        transform: Affine,
        surface: &mut S,
    ) {
        self.draw_page(face, transform, surface);
        self.draw_text(book, page_index, face, transform, surface);
    }

    fn draw_page<S: Surface + ?Sized>(&self, face: Face, transform: Affine, surface: &mut S) {
        let page = self.geometry.page(face);
        surface.fill_rect(page, Color::WHITE, transform);
        surface.stroke_rect(page, Color::BLACK, transform);
    }

    fn draw_cover_text<S: Surface + ?Sized>(&self, book: &Book, surface: &mut S) {
        let g = &self.geometry;
        let lines = [
            (&book.cover.title, g.title_at, g.title_font),
            (&book.cover.author, g.author_at, g.author_font),
        ];
        for (text, [dx, dy], size) in lines {
            surface.fill_text(
                text,
                Point::new(g.book_x + dx, g.book_y + dy),
                Font::px(size),
                Color::COVER,
                Affine::IDENTITY,
            );
        }
    }

    fn draw_text<S: Surface + ?Sized>(
        &self,
        book: &Book,
        page_index: usize,
        face: Face,
        transform: Affine,
        surface: &mut S,
    ) {
        let Some(spread) = book.spread(page_index) else {
            return;
        };
        let text = match face {
            Face::Left => &spread.left,
            Face::Right => &spread.right,
        };

        let g = &self.geometry;
        let font = Font::px(g.body_font);
        let (x, top, max_width) = g.text_bounds(face);
        let lines: Vec<LaidLine> = wrap_text(
            text,
            x,
            top + g.baseline_offset,
            max_width,
            g.line_height,
            |s| surface.measure_text(s, font),
        )
        .collect();

        for line in lines {
            surface.fill_text(&line.text, Point::new(line.x, line.y), font, Color::BLACK, transform);
        }
    }
}
