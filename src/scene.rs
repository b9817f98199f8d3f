//! Scene: the frame scheduler and the collections it drives.
//!
//! A `Scene` replaces the global "everything on screen" lists: it owns the
//! tracked animatables, the disposable registry, the background, the frame
//! clock and the countdown timer. Hosts create one, fill it, and call
//! `advance_frame` once per loop iteration.
//!
//! Draw order is fixed: tracked animatables in insertion order, then
//! disposables in insertion order, so disposables always land on top.

use std::time::Duration;

use log::debug;

use crate::animatable::{Animatable, AnimatableId};
use crate::config::StageConfig;
use crate::error::{TweenError, TweenResult};
use crate::presenter::{FrameClock, Presenter};
use crate::registry::DisposableRegistry;
use crate::surface::{CellSurface, Surface};
use crate::timer::{Countdown, TimerEvent};
use crate::types::{BoundingBox, Size};

/// Builds the countdown face for a number of seconds left.
pub type FaceFn<S> = Box<dyn FnMut(u32) -> S>;

struct CountdownDisplay<S> {
    target: AnimatableId,
    face: FaceFn<S>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

pub struct Scene<S: Surface = CellSurface> {
    config: StageConfig,
    background: S,
    canvas: S,
    tracked: Vec<Animatable<S>>,
    disposables: DisposableRegistry<Animatable<S>>,
    clock: FrameClock,
    countdown: Countdown,
    countdown_display: Option<CountdownDisplay<S>>,
    frame: u64,
}

impl Scene<CellSurface> {
    /// A scene whose background is the config's size and color.
    pub fn with_config(config: StageConfig) -> TweenResult<Self> {
        let background = CellSurface::solid(
            Size::new(config.width as u32, config.height as u32),
            config.background.to_rgb(),
        );
        Self::new(config, background)
    }
}

impl<S: Surface> Scene<S> {
    pub fn new(config: StageConfig, background: S) -> TweenResult<Self> {
        config.validate()?;
        Ok(Scene {
            clock: FrameClock::new(config.frame_interval()),
            disposables: DisposableRegistry::new(config.disposable_capacity),
            canvas: background.clone(),
            background,
            config,
            tracked: Vec::new(),
            countdown: Countdown::new(),
            countdown_display: None,
            frame: 0,
        })
    }

    /// Skip frame pacing; `advance_frame` returns as soon as the frame is
    /// presented.
    pub fn unpaced(mut self) -> Self {
        self.clock = FrameClock::unpaced();
        self
    }

    /// Make countdown "seconds" last `tick` instead.
    pub fn with_countdown_tick(mut self, tick: Duration) -> Self {
        self.countdown = Countdown::with_tick(tick);
        self
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Number of frames advanced so far.
    pub fn frame_number(&self) -> u64 {
        self.frame
    }

    pub fn set_background(&mut self, background: S) {
        self.background = background;
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    /// A new animatable sampled at this scene's frame rate. It is not drawn
    /// until it is tracked or disposed.
    pub fn spawn(&self, surface: S, x: f64, y: f64, hidden: bool, chain_movements: bool) -> Animatable<S> {
        Animatable::new(surface, x, y, hidden, chain_movements).with_fps(self.config.fps)
    }

    /// Draw `animatable` every frame, above everything tracked before it.
    /// From here on its trajectories are sampled at this scene's frame rate.
    pub fn track(&mut self, mut animatable: Animatable<S>) -> AnimatableId {
        animatable.set_fps(self.config.fps);
        let id = animatable.id();
        self.tracked.push(animatable);
        id
    }

    /// Stop drawing `id` and hand it back.
    pub fn untrack(&mut self, id: AnimatableId) -> TweenResult<Animatable<S>> {
        let index = self.tracked_index(id)?;
        Ok(self.tracked.remove(index))
    }

    /// Move `id` to the top of the tracked z-order.
    pub fn bring_to_front(&mut self, id: AnimatableId) -> TweenResult<()> {
        let index = self.tracked_index(id)?;
        let animatable = self.tracked.remove(index);
        self.tracked.push(animatable);
        Ok(())
    }

    /// Draw `animatable` as a disposable: on top of every tracked
    /// animatable, and evicted once enough newer disposables arrive.
    pub fn dispose(&mut self, mut animatable: Animatable<S>) -> AnimatableId {
        animatable.set_fps(self.config.fps);
        let id = animatable.id();
        self.disposables.append(animatable);
        id
    }

    pub fn remove_disposable(&mut self, id: AnimatableId) -> Option<Animatable<S>> {
        self.disposables.remove_first(|a| a.id() == id)
    }

    /// Call `hook` with every disposable the registry evicts.
    pub fn on_disposable_evicted(&mut self, hook: impl FnMut(Animatable<S>) + 'static) {
        self.disposables.set_eviction_hook(hook);
    }

    /// Drop every tracked and disposable animatable.
    pub fn clear(&mut self) {
        self.tracked.clear();
        self.disposables.clear();
    }

    pub fn get(&self, id: AnimatableId) -> Option<&Animatable<S>> {
        self.tracked
            .iter()
            .find(|a| a.id() == id)
            .or_else(|| self.disposables.find(|a| a.id() == id))
    }

    pub fn get_mut(&mut self, id: AnimatableId) -> Option<&mut Animatable<S>> {
        match self.tracked.iter_mut().find(|a| a.id() == id) {
            Some(a) => Some(a),
            None => self.disposables.find_mut(|a| a.id() == id),
        }
    }

    /// Like `get_mut`, but a missing id is an error.
    pub fn animatable(&mut self, id: AnimatableId) -> TweenResult<&mut Animatable<S>> {
        self.get_mut(id).ok_or(TweenError::NotFound(id))
    }

    pub fn contains(&self, id: AnimatableId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_tracked(&self, id: AnimatableId) -> bool {
        self.tracked.iter().any(|a| a.id() == id)
    }

    /// Tracked animatables in draw order.
    pub fn tracked(&self) -> impl Iterator<Item = &Animatable<S>> {
        self.tracked.iter()
    }

    pub fn disposables(&self) -> &DisposableRegistry<Animatable<S>> {
        &self.disposables
    }

    /// True when nothing in the scene has anything left to play.
    pub fn is_idle(&self) -> bool {
        self.tracked.iter().all(Animatable::is_idle) && self.disposables.iter().all(Animatable::is_idle)
    }

    fn tracked_index(&self, id: AnimatableId) -> TweenResult<usize> {
        self.tracked
            .iter()
            .position(|a| a.id() == id)
            .ok_or(TweenError::NotFound(id))
    }

    // -----------------------------------------------------------------------
    // Countdown
    // -----------------------------------------------------------------------

    /// Show a countdown from `seconds` centered at `(x, y)`, redrawn with
    /// `face` every second. When it reaches zero the countdown is untracked
    /// and `on_complete` runs on the scheduler thread.
    ///
    /// Returns `None` without doing anything if a countdown is already
    /// running.
    pub fn start_countdown(
        &mut self,
        seconds: u32,
        x: f64,
        y: f64,
        mut face: impl FnMut(u32) -> S + 'static,
        on_complete: Option<Box<dyn FnOnce()>>,
    ) -> Option<AnimatableId> {
        if self.countdown.is_running() {
            debug!("countdown already running, ignoring start({seconds})");
            return None;
        }
        self.finish_countdown_display();
        let display = self.spawn(face(seconds), x, y, false, false);
        let target = self.track(display);
        if !self.countdown.start(seconds) {
            let _ = self.untrack(target);
            return None;
        }
        self.countdown_display = Some(CountdownDisplay {
            target,
            face: Box::new(face),
            on_complete,
        });
        Some(target)
    }

    /// Stop the running countdown, if any, and remove its display. The
    /// completion callback does not run.
    pub fn cancel_countdown(&mut self) {
        self.countdown.cancel();
        if let Some(display) = self.countdown_display.take() {
            let _ = self.untrack(display.target);
        }
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    fn drain_countdown(&mut self) {
        for event in self.countdown.drain() {
            match event {
                TimerEvent::Tick { remaining } => {
                    if let Some(display) = self.countdown_display.as_mut() {
                        let surface = (display.face)(remaining);
                        let target = display.target;
                        if let Some(animatable) = self.get_mut(target) {
                            animatable.set_face(surface);
                        }
                    }
                }
                TimerEvent::Finished => self.finish_countdown_display(),
            }
        }
    }

    fn finish_countdown_display(&mut self) {
        if let Some(display) = self.countdown_display.take() {
            let _ = self.untrack(display.target);
            if let Some(on_complete) = display.on_complete {
                on_complete();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Frame
    // -----------------------------------------------------------------------

    /// Advance every animatable by one tick and composite the result onto
    /// a fresh copy of the background, without presenting or pacing.
    pub fn compose_frame(&mut self) -> &S {
        self.drain_countdown();
        self.canvas.clone_from(&self.background);

        let frames: Vec<(&S, BoundingBox)> = self
            .tracked
            .iter_mut()
            .filter_map(|a| a.get_frame())
            .chain(self.disposables.iter_mut().filter_map(|a| a.get_frame()))
            .collect();
        for (surface, bbox) in frames {
            self.canvas.blit(surface, bbox.top_left());
        }

        self.frame += 1;
        &self.canvas
    }

    /// One full tick: compose, hand the frame to `presenter`, then wait out
    /// the rest of the frame interval.
    pub fn advance_frame<P: Presenter<S>>(&mut self, presenter: &mut P) -> TweenResult<()> {
        self.compose_frame();
        presenter.present(&self.canvas)?;
        self.clock.tick();
        Ok(())
    }
}
