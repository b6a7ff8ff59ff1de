//! The drawing-surface capability the engine is written against.
//!
//! Every call takes the transform it should be drawn under. There is no
//! ambient save/restore stack: a caller that wants a rotated face passes the
//! rotation, everything else passes `Affine::IDENTITY`.

use kurbo::{Affine, Point, Rect};

use crate::types::{Color, DrawOp, Font};

/// Width of a run of text, in surface pixels.
pub trait TextMeasure {
    fn measure_text(&self, text: &str, font: Font) -> f64;
}

pub trait Surface: TextMeasure {
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Color, transform: Affine);
    fn stroke_rect(&mut self, rect: Rect, color: Color, transform: Affine);
    fn fill_text(&mut self, text: &str, origin: Point, font: Font, color: Color, transform: Affine);
}

/// Fixed-advance metrics: every char is `advance` pixels wide, whatever the
/// font size. This is what a terminal cell grid gives us.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monospace {
    pub advance: f64,
}

impl TextMeasure for Monospace {
    fn measure_text(&self, text: &str, _font: Font) -> f64 {
        text.chars().count() as f64 * self.advance
    }
}

/// A surface that records draw calls instead of executing them.
///
/// The recorded ops can be replayed onto any other surface with [`replay`],
/// or serialized as-is.
#[derive(Debug, Clone)]
pub struct Recorder {
    metrics: Monospace,
    ops: Vec<DrawOp>,
}

impl Recorder {
    pub fn new(metrics: Monospace) -> Self {
        Recorder {
            metrics,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    /// Strings drawn with `FillText`, in call order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::FillText { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl TextMeasure for Recorder {
    fn measure_text(&self, text: &str, font: Font) -> f64 {
        self.metrics.measure_text(text, font)
    }
}

impl Surface for Recorder {
    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, transform: Affine) {
        self.ops.push(DrawOp::FillRect {
            rect,
            color,
            transform,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, transform: Affine) {
        self.ops.push(DrawOp::StrokeRect {
            rect,
            color,
            transform,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: Font, color: Color, transform: Affine) {
        self.ops.push(DrawOp::FillText {
            text: text.to_owned(),
            origin,
            font,
            color,
            transform,
        });
    }
}

/// Execute recorded ops against `surface`, in order.
pub fn replay<S: Surface + ?Sized>(ops: &[DrawOp], surface: &mut S) {
    for op in ops {
        match op {
            DrawOp::Clear => surface.clear(),
            DrawOp::FillRect {
                rect,
                color,
                transform,
            } => surface.fill_rect(*rect, *color, *transform),
            DrawOp::StrokeRect {
                rect,
                color,
                transform,
            } => surface.stroke_rect(*rect, *color, *transform),
            DrawOp::FillText {
                text,
                origin,
                font,
                color,
                transform,
            } => surface.fill_text(text, *origin, *font, *color, *transform),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_ignores_font_size() {
        let m = Monospace { advance: 10.0 };
        assert_eq!(m.measure_text("abc ", Font::px(16.0)), 40.0);
        assert_eq!(m.measure_text("abc ", Font::px(24.0)), 40.0);
        assert_eq!(m.measure_text("", Font::px(16.0)), 0.0);
    }

    #[test]
    fn replay_reproduces_recording() {
        let mut first = Recorder::new(Monospace { advance: 8.0 });
        first.clear();
        first.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE, Affine::IDENTITY);
        first.fill_text(
            "hi",
            Point::new(1.0, 2.0),
            Font::px(16.0),
            Color::BLACK,
            Affine::rotate(1.0),
        );

        let mut second = Recorder::new(Monospace { advance: 8.0 });
        replay(first.ops(), &mut second);
        assert_eq!(first.ops(), second.ops());
        assert_eq!(second.texts().collect::<Vec<_>>(), vec!["hi"]);
    }
}
