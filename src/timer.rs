//! Countdown timer: the one piece of the engine that runs on its own
//! thread.
//!
//! The thread never touches an animatable. It only sends `TimerEvent`s
//! down a channel; the scene drains that channel once per frame on the
//! scheduler thread and applies the updates there. Only one countdown runs
//! at a time: starting a second one while the first is live is ignored.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use log::debug;

use crate::surface::CellSurface;
use crate::types::{Color, NamedColor, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One more second has elapsed; `remaining` seconds are left.
    Tick { remaining: u32 },
    /// The countdown reached zero.
    Finished,
}

pub struct Countdown {
    tick: Duration,
    running: Arc<AtomicBool>,
    stop: Option<Sender<()>>,
    events: Option<Receiver<TimerEvent>>,
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::with_tick(Duration::from_secs(1))
    }

    /// A countdown whose "seconds" last `tick` instead.
    pub fn with_tick(tick: Duration) -> Self {
        Countdown {
            tick,
            running: Arc::new(AtomicBool::new(false)),
            stop: None,
            events: None,
            handle: None,
        }
    }

    /// Start counting down from `seconds`. Returns `false` and does
    /// nothing if a countdown is already running.
    pub fn start(&mut self, seconds: u32) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("countdown already running, ignoring start({seconds})");
            return false;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let (event_tx, event_rx) = unbounded();
        let running = Arc::clone(&self.running);
        let tick = self.tick;

        self.handle = Some(thread::spawn(move || {
            run_countdown(seconds, tick, &stop_rx, &event_tx);
            running.store(false, Ordering::Release);
        }));
        self.stop = Some(stop_tx);
        self.events = Some(event_rx);
        debug!("countdown started from {seconds}");
        true
    }

    /// Ask the countdown thread to stop at its next wake-up. Events it
    /// already sent are discarded.
    pub fn cancel(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.try_send(());
        }
        self.events = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Every event sent since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<TimerEvent> {
        match &self.events {
            Some(events) => events.try_iter().collect(),
            None => Vec::new(),
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run_countdown(seconds: u32, tick: Duration, stop: &Receiver<()>, events: &Sender<TimerEvent>) {
    let mut remaining = seconds;
    while remaining > 0 {
        match stop.recv_timeout(tick) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
        remaining -= 1;
        if events.send(TimerEvent::Tick { remaining }).is_err() {
            return;
        }
    }
    let _ = events.send(TimerEvent::Finished);
}

/// The stock countdown face: the number of seconds left, turning red for
/// the last ten.
pub fn countdown_face(remaining: u32) -> CellSurface {
    let fg = if remaining <= 10 {
        Color::Named(NamedColor::Red).to_rgb()
    } else {
        Rgb::WHITE
    };
    CellSurface::from_text(&format!(" {remaining} "), Some(fg), None)
}
