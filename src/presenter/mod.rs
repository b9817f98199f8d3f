//! Presenters: where a composed frame goes once the scene is done with it,
//! plus the clock that keeps frames at a fixed rate.

mod terminal;

pub use terminal::TerminalPresenter;

use std::thread;
use std::time::{Duration, Instant};

use crate::error::TweenResult;

pub trait Presenter<S> {
    fn present(&mut self, frame: &S) -> TweenResult<()>;
}

/// Keeps every composed frame in memory. Used for headless runs and tests.
#[derive(Debug)]
pub struct RecordingPresenter<S> {
    frames: Vec<S>,
}

impl<S> Default for RecordingPresenter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> RecordingPresenter<S> {
    pub fn new() -> Self {
        RecordingPresenter { frames: Vec::new() }
    }

    pub fn frames(&self) -> &[S] {
        &self.frames
    }

    pub fn last(&self) -> Option<&S> {
        self.frames.last()
    }

    pub fn into_frames(self) -> Vec<S> {
        self.frames
    }
}

impl<S: Clone> Presenter<S> for RecordingPresenter<S> {
    fn present(&mut self, frame: &S) -> TweenResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// Fixed-timestep pacing: `tick` blocks until one interval has passed since
/// the previous tick. A zero interval never blocks.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        FrameClock { interval, last: None }
    }

    /// A clock that never sleeps, for headless runs.
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep out the rest of the current frame. Returns how long the frame
    /// actually took, sleep included.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let Some(last) = self.last else {
            self.last = Some(now);
            return Duration::ZERO;
        };
        let elapsed = now.duration_since(last);
        if elapsed < self.interval {
            thread::sleep(self.interval - elapsed);
        }
        let end = Instant::now();
        self.last = Some(end);
        end.duration_since(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_waits_out_the_interval() {
        let mut clock = FrameClock::new(Duration::from_millis(15));
        clock.tick();
        let frame = clock.tick();
        assert!(frame >= Duration::from_millis(15));
    }

    #[test]
    fn recorder_keeps_frames_in_order() {
        let mut recorder = RecordingPresenter::new();
        recorder.present(&1).unwrap();
        recorder.present(&2).unwrap();
        assert_eq!(recorder.frames(), &[1, 2]);
    }
}
