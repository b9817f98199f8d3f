//! Player: plays a cue sheet live in the terminal.
//!
//! Owns a scene, a cue runner and a terminal presenter, and runs the host
//! loop around them: poll input, fire cues, advance one frame. The player
//! never computes motion itself; everything on screen comes from the scene.

use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};
use crossterm::{event, terminal};
use log::info;

use crate::config::StageConfig;
use crate::presenter::TerminalPresenter;
use crate::scene::Scene;
use crate::script::{CueRunner, CueSheet};

/// Rows reserved above the canvas for the header line.
const CANVAS_OFFSET: u16 = 1;

pub struct Player {
    scene: Scene,
    runner: CueRunner,
    paused: bool,
}

impl Player {
    pub fn new(sheet: CueSheet, config: StageConfig) -> Result<Self> {
        let mut scene = Scene::with_config(config)?;
        let runner = CueRunner::new(sheet, &mut scene)?;
        Ok(Self {
            scene,
            runner,
            paused: false,
        })
    }

    /// Play the sheet in the terminal until it ends or the user quits.
    ///
    /// The terminal is restored on exit, even on error.
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        let need_w = self.scene.config().width;
        let need_h = self.scene.config().height;
        // +2: one row for the header, one for the status line
        if term_w < need_w || term_h < need_h + 2 {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                need_w,
                need_h + 2,
                term_w,
                term_h,
            );
        }

        let mut presenter = TerminalPresenter::stdout(CANVAS_OFFSET);
        presenter.enter()?;
        info!(
            "playing '{}' at {} fps",
            self.runner.sheet().title.as_deref().unwrap_or("untitled"),
            self.scene.config().fps
        );

        let result = self.run_loop(&mut presenter);

        presenter.leave();
        info!("stopped after {} frames", self.scene.frame_number());
        result
    }

    fn run_loop(&mut self, presenter: &mut TerminalPresenter) -> Result<()> {
        let title = self.runner.sheet().title.clone().unwrap_or_default();
        presenter.status(0, &format!(" {title}  [q] quit  [space] pause"))?;
        let status_row = self.scene.config().height + CANVAS_OFFSET;

        loop {
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    event::Event::Key(key) => {
                        use event::KeyCode::*;
                        match key.code {
                            Char('q') | Esc => return Ok(()),
                            Char(' ') => self.paused = !self.paused,
                            _ => {}
                        }
                    }
                    event::Event::Resize(_, _) => presenter.invalidate(),
                    _ => {}
                }
            }

            if self.paused {
                presenter.status(status_row, " paused ")?;
                thread::sleep(self.scene.config().frame_interval());
                continue;
            }

            self.runner.fire(&mut self.scene)?;
            self.scene.advance_frame(presenter)?;
            presenter.status(
                status_row,
                &format!(" frame {} ", self.scene.frame_number()),
            )?;

            if self.runner.is_done(&self.scene) {
                return Ok(());
            }
        }
    }
}
