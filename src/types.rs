//! Shared value types for the tweening engine.
//!
//! This module defines the two families of plain data the rest of the
//! crate passes around:
//! - Geometry: `Point`, `Size`, `BoundingBox`
//! - Color: `Color` (serializable, named or RGB), `Rgb`, `Rgba`, and the
//!   terminal `Cell` a `CellSurface` is made of

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    /// Largest side a scaled size may have, in cells.
    pub const MAX_SIDE: u32 = 1024;

    pub const fn new(w: u32, h: u32) -> Self {
        Size { w, h }
    }

    /// Uniformly scale, rounding each side to the nearest whole cell. Each
    /// side is clamped to `0..=MAX_SIDE`.
    pub fn scaled(self, factor: f64) -> Size {
        let side = |v: u32| {
            let scaled = (v as f64 * factor).round();
            if scaled.is_nan() {
                0
            } else {
                scaled.clamp(0.0, Self::MAX_SIDE as f64) as u32
            }
        };
        Size {
            w: side(self.w),
            h: side(self.h),
        }
    }

    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Where an animatable sits on screen: its center and its current size.
///
/// The center is fractional so trajectories never lose precision between
/// frames; compositing rounds the top-left corner once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub center: Point,
    pub size: Size,
}

impl BoundingBox {
    pub fn new(center: Point, size: Size) -> Self {
        BoundingBox { center, size }
    }

    pub fn left(&self) -> f64 {
        self.center.x - self.size.w as f64 / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center.y - self.size.h as f64 / 2.0
    }

    /// Integer top-left corner used when blitting.
    pub fn top_left(&self) -> (i32, i32) {
        (self.left().round() as i32, self.top().round() as i32)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const fn with_alpha(self, a: u8) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    /// Alpha-composite `top` over `self` with `alpha` in 0..=255.
    pub fn blend(self, top: Rgb, alpha: u8) -> Rgb {
        let a = alpha as u16;
        let mix = |under: u8, over: u8| -> u8 {
            ((over as u16 * a + under as u16 * (255 - a) + 127) / 255) as u8
        };
        Rgb {
            r: mix(self.r, top.r),
            g: mix(self.g, top.g),
            b: mix(self.b, top.b),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// Author-facing color: either a terminal color name or explicit RGB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    pub fn to_rgb(&self) -> Rgb {
        match self {
            Color::Named(n) => match n {
                NamedColor::Black => Rgb::new(0, 0, 0),
                NamedColor::Red => Rgb::new(205, 49, 49),
                NamedColor::Green => Rgb::new(13, 188, 121),
                NamedColor::Yellow => Rgb::new(229, 229, 16),
                NamedColor::Blue => Rgb::new(36, 114, 200),
                NamedColor::Magenta => Rgb::new(188, 63, 188),
                NamedColor::Cyan => Rgb::new(17, 168, 205),
                NamedColor::White => Rgb::new(229, 229, 229),
            },
            Color::Rgb { r, g, b } => Rgb::new(*r, *g, *b),
        }
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

// ---------------------------------------------------------------------------
// Terminal cell
// ---------------------------------------------------------------------------

/// One character cell of a `CellSurface`.
///
/// A cell with neither a glyph nor a background is transparent and is
/// skipped when blitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub bold: bool,
}

impl Cell {
    pub const fn glyph(ch: char, fg: Option<Rgb>, bg: Option<Rgb>) -> Self {
        Cell {
            ch,
            fg,
            bg,
            bold: false,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.ch == ' ' && self.bg.is_none()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}
