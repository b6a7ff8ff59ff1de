//! Shared boundary types for the flipbook reader.
//!
//! This module defines the two key data contracts:
//! - Engine → Surface (in-memory or recorded): `DrawOp`s in pixel space,
//!   each carrying the explicit transform it was issued under
//! - Renderer → Player (terminal): `Frame`s of styled cells

use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    White,
}

impl Color {
    pub const BLACK: Color = Color::Named(NamedColor::Black);
    pub const WHITE: Color = Color::Named(NamedColor::White);
    /// Leather brown of the closed cover.
    pub const COVER: Color = Color::rgb(0xb5, 0x65, 0x1d);
    /// Light grey of the spine strip.
    pub const SPINE: Color = Color::rgb(0xd3, 0xd3, 0xd3);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }
}

/// Font request. The surface decides how a size maps to glyph advances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub size: f64,
}

impl Font {
    pub const fn px(size: f64) -> Self {
        Font { size }
    }
}

// ---------------------------------------------------------------------------
// Engine → Surface boundary
// ---------------------------------------------------------------------------

/// A single drawing call in book pixel space.
///
/// `transform` maps the op's local coordinates to surface coordinates. It is
/// the identity for everything except the face of a turning page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Clear,
    FillRect {
        rect: Rect,
        color: Color,
        transform: Affine,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        transform: Affine,
    },
    FillText {
        text: String,
        origin: Point,
        font: Font,
        color: Color,
        transform: Affine,
    },
}

impl DrawOp {
    pub fn transform(&self) -> Affine {
        match self {
            DrawOp::Clear => Affine::IDENTITY,
            DrawOp::FillRect { transform, .. }
            | DrawOp::StrokeRect { transform, .. }
            | DrawOp::FillText { transform, .. } => *transform,
        }
    }
}

// ---------------------------------------------------------------------------
// Renderer → Player boundary
// ---------------------------------------------------------------------------

/// Size, in cells, of the canvas the player drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalContract {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            fg: None,
            bg: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Full { cells: Vec<Vec<Cell>> },
    Diff { changes: Vec<CellChange> },
}
