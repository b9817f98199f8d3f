//! Drawable surfaces.
//!
//! The engine never rasterizes anything itself. Everything it needs from a
//! rendering backend is the handful of primitives on the `Surface` trait:
//! copy (`Clone`), resize, rotate, fill, alpha and blit. `CellSurface` is
//! the terminal backend shipped with the crate.

mod cells;

pub use cells::CellSurface;

use crate::types::{Rgba, Size};

pub trait Surface: Clone {
    fn size(&self) -> Size;

    /// A copy stretched or shrunk to exactly `size`.
    fn resized(&self, size: Size) -> Self;

    /// A copy rotated counter-clockwise by `degrees`. The result grows to
    /// the rotated bounding box, so its size may differ from `self`.
    fn rotated(&self, degrees: f64) -> Self;

    /// Cover every visible cell with `color`. Alpha 255 replaces the
    /// content outright; lower alpha tints it.
    fn fill(&mut self, color: Rgba);

    /// Whole-surface opacity applied when this surface is blitted.
    fn set_alpha(&mut self, alpha: u8);

    /// Draw `src` with its top-left corner at `at`, clipping to `self`.
    fn blit(&mut self, src: &Self, at: (i32, i32));
}
