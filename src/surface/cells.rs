use crate::types::{Cell, Rgb, Rgba, Size};

use super::Surface;

/// A rectangular grid of terminal cells.
///
/// Resizing and rotation are nearest-neighbour; cells that are blank and
/// have no background are transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSurface {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    alpha: u8,
}

impl CellSurface {
    /// A fully transparent surface.
    pub fn new(size: Size) -> Self {
        let (width, height, len) = match (size.w as usize).checked_mul(size.h as usize) {
            Some(len) => (size.w, size.h, len),
            None => (0, 0, 0),
        };
        CellSurface {
            width,
            height,
            cells: vec![Cell::default(); len],
            alpha: 255,
        }
    }

    /// A surface painted with a single background color.
    pub fn solid(size: Size, color: Rgb) -> Self {
        let mut surface = Self::new(size);
        surface.fill(color.with_alpha(255));
        surface
    }

    /// Render `text` line by line. The surface is as wide as the longest
    /// line; shorter lines are padded with `bg`.
    pub fn from_text(text: &str, fg: Option<Rgb>, bg: Option<Rgb>) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
        let mut surface = Self::new(Size::new(width, lines.len() as u32));
        for (y, line) in lines.iter().enumerate() {
            let mut chars = line.chars();
            for x in 0..width as usize {
                let ch = chars.next().unwrap_or(' ');
                surface.cells[y * width as usize + x] = Cell::glyph(ch, fg, bg);
            }
        }
        surface
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(self.index(x, y))
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u32, y: u32, cell: Cell) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.cells[index] = cell;
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// The glyphs of one row, for debugging and tests.
    pub fn row_text(&self, y: u32) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|c| c.ch)
            .collect()
    }
}

impl Surface for CellSurface {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn resized(&self, size: Size) -> Self {
        if size == self.size() {
            return self.clone();
        }
        let mut out = CellSurface::new(size);
        out.alpha = self.alpha;
        if self.size().is_empty() {
            return out;
        }
        for y in 0..size.h {
            let sy = ((y as f64 + 0.5) * self.height as f64 / size.h as f64) as u32;
            for x in 0..size.w {
                let sx = ((x as f64 + 0.5) * self.width as f64 / size.w as f64) as u32;
                if let Some(cell) = self.get(sx.min(self.width - 1), sy.min(self.height - 1)) {
                    out.set(x, y, *cell);
                }
            }
        }
        out
    }

    fn rotated(&self, degrees: f64) -> Self {
        let turn = degrees.rem_euclid(360.0);
        if turn.abs() < 1e-9 || (360.0 - turn).abs() < 1e-9 || self.size().is_empty() {
            return self.clone();
        }
        let (sin, cos) = turn.to_radians().sin_cos();
        let (w, h) = (self.width as f64, self.height as f64);
        // Trim float noise so right angles don't grow by a cell.
        let out_w = ((w * cos.abs() + h * sin.abs()) - 1e-6).ceil().max(1.0) as u32;
        let out_h = ((w * sin.abs() + h * cos.abs()) - 1e-6).ceil().max(1.0) as u32;

        let mut out = CellSurface::new(Size::new(out_w, out_h));
        out.alpha = self.alpha;
        let (src_cx, src_cy) = (w / 2.0, h / 2.0);
        let (dst_cx, dst_cy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);
        for y in 0..out_h {
            let dy = y as f64 + 0.5 - dst_cy;
            for x in 0..out_w {
                let dx = x as f64 + 0.5 - dst_cx;
                // Inverse rotation: screen y grows downward, so a visually
                // counter-clockwise turn maps back through -degrees.
                let sx = dx * cos - dy * sin + src_cx;
                let sy = dx * sin + dy * cos + src_cy;
                if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                    if let Some(cell) = self.get(sx as u32, sy as u32) {
                        out.set(x, y, *cell);
                    }
                }
            }
        }
        out
    }

    fn fill(&mut self, color: Rgba) {
        let rgb = color.rgb();
        if color.a == 255 {
            for cell in &mut self.cells {
                *cell = Cell::glyph(' ', None, Some(rgb));
            }
            return;
        }
        if color.a == 0 {
            return;
        }
        for cell in self.cells.iter_mut().filter(|c| !c.is_transparent()) {
            cell.bg = cell.bg.map(|bg| bg.blend(rgb, color.a));
            cell.fg = Some(cell.fg.unwrap_or(Rgb::WHITE).blend(rgb, color.a));
        }
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }

    fn blit(&mut self, src: &Self, at: (i32, i32)) {
        if src.alpha == 0 {
            return;
        }
        for sy in 0..src.height {
            let dy = at.1 + sy as i32;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width {
                let dx = at.0 + sx as i32;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let Some(top) = src.get(sx, sy).copied() else {
                    continue;
                };
                if top.is_transparent() {
                    continue;
                }
                let idx = self.index(dx as u32, dy as u32);
                let under = self.cells[idx];
                self.cells[idx] = if src.alpha == 255 {
                    Cell {
                        bg: top.bg.or(under.bg),
                        ..top
                    }
                } else {
                    blend_cell(under, top, src.alpha)
                };
            }
        }
    }
}

fn blend_cell(under: Cell, top: Cell, alpha: u8) -> Cell {
    let base = under.bg.unwrap_or(Rgb::BLACK);
    let bg = match top.bg {
        Some(bg) => Some(base.blend(bg, alpha)),
        None => under.bg,
    };
    if top.ch != ' ' && alpha >= 128 {
        let fg_base = under.fg.unwrap_or(base);
        Cell {
            ch: top.ch,
            fg: Some(fg_base.blend(top.fg.unwrap_or(Rgb::WHITE), alpha)),
            bg,
            bold: top.bold,
        }
    } else {
        Cell { bg, ..under }
    }
}
