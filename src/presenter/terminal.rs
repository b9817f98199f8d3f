use std::io::{self, Write};

use crossterm::{cursor, execute, queue, style, terminal};

use crate::error::TweenResult;
use crate::surface::CellSurface;
use crate::types::{Cell, Rgb};

use super::Presenter;

/// Draws `CellSurface` frames to a terminal.
///
/// The first frame (and any frame whose size changed) is drawn in full;
/// after that only the cells that differ from the previous frame are sent.
pub struct TerminalPresenter<W: Write = io::Stdout> {
    out: W,
    previous: Option<CellSurface>,
    row_offset: u16,
    active: bool,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout(row_offset: u16) -> Self {
        Self::new(io::stdout(), row_offset)
    }
}

impl<W: Write> TerminalPresenter<W> {
    /// Frames are drawn starting `row_offset` rows below the top of the
    /// screen, leaving room for a header line.
    pub fn new(out: W, row_offset: u16) -> Self {
        TerminalPresenter {
            out,
            previous: None,
            row_offset,
            active: false,
        }
    }

    /// Switch to raw mode on the alternate screen.
    pub fn enter(&mut self) -> TweenResult<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;
        self.active = true;
        self.previous = None;
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn leave(&mut self) {
        if !self.active {
            return;
        }
        let _ = execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        self.active = false;
    }

    /// Print a dim status line on row `row` (absolute).
    pub fn status(&mut self, row: u16, text: &str) -> TweenResult<()> {
        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);
        queue!(
            self.out,
            cursor::MoveTo(0, row),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, text)),
        )?;
        self.out.flush()?;
        Ok(())
    }

    /// Forget the previous frame so the next one is drawn in full.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    fn draw_full(&mut self, frame: &CellSurface) -> io::Result<()> {
        for (y, row) in frame.rows().enumerate() {
            queue!(self.out, cursor::MoveTo(0, y as u16 + self.row_offset))?;
            for cell in row {
                queue!(
                    self.out,
                    style::PrintStyledContent(style::StyledContent::new(content_style(cell), cell.ch))
                )?;
            }
        }
        Ok(())
    }

    fn draw_diff(&mut self, previous: &CellSurface, frame: &CellSurface) -> io::Result<()> {
        for (x, y, cell) in changed_cells(previous, frame) {
            queue!(
                self.out,
                cursor::MoveTo(x as u16, y as u16 + self.row_offset),
                style::PrintStyledContent(style::StyledContent::new(content_style(&cell), cell.ch)),
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Presenter<CellSurface> for TerminalPresenter<W> {
    fn present(&mut self, frame: &CellSurface) -> TweenResult<()> {
        match self.previous.take() {
            Some(previous) if previous.width() == frame.width() && previous.height() == frame.height() => {
                self.draw_diff(&previous, frame)?
            }
            _ => self.draw_full(frame)?,
        }
        self.out.flush()?;
        self.previous = Some(frame.clone());
        Ok(())
    }
}

impl<W: Write> Drop for TerminalPresenter<W> {
    fn drop(&mut self) {
        self.leave();
    }
}

/// Cells of `next` that differ from `prev`, as `(x, y, cell)`.
fn changed_cells(prev: &CellSurface, next: &CellSurface) -> Vec<(usize, usize, Cell)> {
    let mut changes = Vec::new();
    for (y, (prev_row, next_row)) in prev.rows().zip(next.rows()).enumerate() {
        for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
            if prev_cell != next_cell {
                changes.push((x, y, *next_cell));
            }
        }
    }
    changes
}

fn content_style(cell: &Cell) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = cell.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = cell.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if cell.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    cs
}

fn to_ct_color(c: Rgb) -> style::Color {
    style::Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use crate::types::Size;

    #[test]
    fn diff_reports_only_changed_cells() {
        let before = CellSurface::solid(Size::new(3, 2), Rgb::BLACK);
        let mut after = before.clone();
        after.blit(&CellSurface::from_text("x", Some(Rgb::WHITE), None), (2, 1));
        let changes = changed_cells(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!((changes[0].0, changes[0].1, changes[0].2.ch), (2, 1, 'x'));
    }

    #[test]
    fn second_identical_frame_writes_nothing() {
        let frame = CellSurface::from_text("ab", Some(Rgb::WHITE), Some(Rgb::BLACK));
        let mut presenter = TerminalPresenter::new(Vec::new(), 0);
        presenter.present(&frame).unwrap();
        let after_first = presenter.out.len();
        assert!(after_first > 0);
        presenter.present(&frame).unwrap();
        assert_eq!(presenter.out.len(), after_first);
    }
}
