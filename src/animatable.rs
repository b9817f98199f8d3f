//! Animatable: one tracked visual entity and everything that moves it.
//!
//! An animatable owns its pristine face (`original`) and a handful of
//! independent transform parameters: target size, angle, flash overlay,
//! persistent fill and tint. Verbs never touch pixels; they push
//! trajectories into one of three slots:
//!
//! - **rotozoom**: size and angle trajectories, applied immediately
//! - **color**: flash and fade trajectories, applied immediately
//! - **position**: a two-level queue of lazy motion requests feeding
//!   concrete waypoints
//!
//! `get_frame` advances the slots once (rotozoom, then color, then
//! position) and recomposes the drawable from `original` whenever a
//! parameter changed, so overlapping effects never erase each other.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_FPS;
use crate::error::TweenResult;
use crate::surface::{CellSurface, Surface};
use crate::trajectory::{
    Easing, Trajectory, check_duration, circle_path, fade_path, flash_path, frame_count,
    freeze_path, move_path, rotate_path, rotoscale_path, scale_path,
};
use crate::types::{BoundingBox, Point, Rgb, Rgba, Size};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an animatable, stable for its whole life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimatableId(u64);

impl AnimatableId {
    fn next() -> Self {
        AnimatableId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnimatableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Animatable({})", self.0)
    }
}

/// Whether a new rotozoom trajectory clears the slot or runs alongside
/// whatever is already in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    Replace,
    #[default]
    Compose,
}

/// A movement waiting in the animation queue. Its waypoints are computed
/// from wherever the animatable is when the request reaches the front.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionRequest {
    Move {
        target: Point,
        duration: f64,
        easing: Easing,
    },
    Circle {
        center: Point,
        degrees: f64,
        duration: f64,
    },
    Freeze {
        duration: f64,
    },
}

impl MotionRequest {
    pub fn materialize(&self, from: Point, fps: u32) -> Vec<Point> {
        match *self {
            MotionRequest::Move {
                target,
                duration,
                easing,
            } => move_path(from, target, frame_count(duration, fps), easing),
            MotionRequest::Circle {
                center,
                degrees,
                duration,
            } => circle_path(from, center, degrees, frame_count(duration, fps)),
            MotionRequest::Freeze { duration } => freeze_path(from, frame_count(duration, fps)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RotozoomStep {
    /// Scale factor applied to whatever the face is at that tick.
    Resize(f64),
    Turn(f64),
    TurnAndScale { angle: f64, scale: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColorStep {
    Flash { color: Rgb, intensity: f64 },
    Fade { color: Rgb, alpha: u8 },
}

pub struct Animatable<S: Surface = CellSurface> {
    id: AnimatableId,
    original: S,
    current: S,
    bbox: BoundingBox,
    hidden: bool,
    chain_movements: bool,
    current_scale: f64,
    fps: u32,

    // Transform parameters; `current` is always `original` run through
    // these, in this order.
    size: Size,
    fill: Option<(Rgb, u8)>,
    tint: Option<Rgba>,
    flash: Option<(Rgb, f64)>,
    angle: f64,
    dirty: bool,

    animation_queue: VecDeque<MotionRequest>,
    position_queue: VecDeque<Point>,
    rotozoom: Vec<Trajectory<RotozoomStep>>,
    color: Vec<Trajectory<ColorStep>>,
}

impl<S: Surface> Animatable<S> {
    /// Wrap `surface` with its center at `(x, y)`.
    ///
    /// With `chain_movements` off, every new movement verb interrupts the
    /// queued ones; with it on, movements play one after another.
    pub fn new(surface: S, x: f64, y: f64, hidden: bool, chain_movements: bool) -> Self {
        let size = surface.size();
        Animatable {
            id: AnimatableId::next(),
            current: surface.clone(),
            original: surface,
            bbox: BoundingBox::new(Point::new(x, y), size),
            hidden,
            chain_movements,
            current_scale: 1.0,
            fps: DEFAULT_FPS,
            size,
            fill: None,
            tint: None,
            flash: None,
            angle: 0.0,
            dirty: false,
            animation_queue: VecDeque::new(),
            position_queue: VecDeque::new(),
            rotozoom: Vec::new(),
            color: Vec::new(),
        }
    }

    /// Shorthand for a shown, interrupting animatable.
    pub fn visible(surface: S, x: f64, y: f64) -> Self {
        Self::new(surface, x, y, false, false)
    }

    /// Sample trajectories at `fps` instead of the default rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.set_fps(fps);
        self
    }

    pub(crate) fn set_fps(&mut self, fps: u32) {
        self.fps = fps.max(1);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn id(&self) -> AnimatableId {
        self.id
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn center(&self) -> Point {
        self.bbox.center
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn chains_movements(&self) -> bool {
        self.chain_movements
    }

    pub fn current_scale(&self) -> f64 {
        self.current_scale
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn original_surface(&self) -> &S {
        &self.original
    }

    pub fn current_surface(&self) -> &S {
        &self.current
    }

    /// Waypoints already materialized and waiting to be consumed.
    pub fn pending_waypoints(&self) -> impl Iterator<Item = &Point> {
        self.position_queue.iter()
    }

    /// Movement requests not yet materialized.
    pub fn queued_motions(&self) -> impl Iterator<Item = &MotionRequest> {
        self.animation_queue.iter()
    }

    /// True when no trajectory of any category is left to play.
    pub fn is_idle(&self) -> bool {
        self.animation_queue.is_empty()
            && self.position_queue.is_empty()
            && self.rotozoom.is_empty()
            && self.color.is_empty()
    }

    // -----------------------------------------------------------------------
    // Frame
    // -----------------------------------------------------------------------

    /// Advance every slot by one tick and return what to draw, if shown.
    pub fn get_frame(&mut self) -> Option<(&S, BoundingBox)> {
        self.advance_rotozoom();
        self.advance_color();
        self.advance_position();
        self.refresh();

        if self.hidden {
            None
        } else {
            Some((&self.current, self.bbox))
        }
    }

    fn advance_rotozoom(&mut self) {
        let mut steps = Vec::with_capacity(self.rotozoom.len());
        for trajectory in &mut self.rotozoom {
            steps.extend(trajectory.advance());
        }
        self.rotozoom.retain(|t| !t.is_finished());

        for step in steps {
            match step {
                RotozoomStep::Resize(scale) => self.set_size(self.original.size().scaled(scale)),
                RotozoomStep::Turn(angle) => self.set_angle(angle),
                RotozoomStep::TurnAndScale { angle, scale } => {
                    self.set_angle(angle);
                    self.set_size(self.original.size().scaled(scale));
                }
            }
        }
    }

    fn advance_color(&mut self) {
        let mut steps = Vec::with_capacity(self.color.len());
        for trajectory in &mut self.color {
            steps.extend(trajectory.advance());
        }
        self.color.retain(|t| !t.is_finished());

        for step in steps {
            match step {
                ColorStep::Flash { color, intensity } => {
                    let flash = (intensity > 0.0).then_some((color, intensity));
                    if flash != self.flash {
                        self.flash = flash;
                        self.dirty = true;
                    }
                }
                ColorStep::Fade { color, alpha } => {
                    if self.fill != Some((color, alpha)) {
                        self.fill = Some((color, alpha));
                        self.dirty = true;
                    }
                }
            }
        }
    }

    fn advance_position(&mut self) {
        if let Some(waypoint) = self.position_queue.pop_front() {
            self.bbox.center = waypoint;
        } else if let Some(request) = self.animation_queue.pop_front() {
            let path = request.materialize(self.bbox.center, self.fps);
            debug!("{} materialized {} waypoints", self.id, path.len());
            self.position_queue.extend(path);
        }
    }

    fn set_size(&mut self, size: Size) {
        if size != self.size {
            self.size = size;
            self.dirty = true;
        }
    }

    fn set_angle(&mut self, angle: f64) {
        if angle != self.angle {
            self.angle = angle;
            self.dirty = true;
        }
    }

    /// Recompose `current` from `original` if any parameter changed.
    fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let mut surface = self.original.resized(self.size);
        if let Some((color, alpha)) = self.fill {
            surface.fill(color.with_alpha(255));
            surface.set_alpha(alpha);
        }
        if let Some(tint) = self.tint {
            surface.fill(tint);
        }
        if let Some((color, intensity)) = self.flash {
            surface.fill(color.with_alpha(intensity_to_alpha(intensity)));
        }
        if self.angle.rem_euclid(360.0) != 0.0 {
            surface = surface.rotated(self.angle);
        }
        self.bbox.size = surface.size();
        self.current = surface;
    }

    // -----------------------------------------------------------------------
    // Visibility and instant verbs
    // -----------------------------------------------------------------------

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn show(&mut self) {
        self.hidden = false;
    }

    pub fn instant_move(&mut self, x: f64, y: f64) {
        self.bbox.center = Point::new(x, y);
    }

    /// Resize to `scale` times the original face, keeping the center.
    pub fn instant_scale(&mut self, scale: f64) {
        self.set_size(self.original.size().scaled(scale));
        self.current_scale = scale;
        self.refresh();
    }

    /// Turn by `degrees` on top of the current angle.
    pub fn instant_rotate(&mut self, degrees: f64) {
        self.set_angle(self.angle + degrees);
        self.refresh();
    }

    /// Lay a persistent translucent `color` over the face.
    pub fn instant_color(&mut self, color: Rgba) {
        self.tint = Some(color);
        self.dirty = true;
        self.refresh();
    }

    /// Swap the pristine face, e.g. to flip a card, keeping the current
    /// scale and every other transform parameter.
    pub fn set_face(&mut self, surface: S) {
        self.size = surface.size().scaled(self.current_scale);
        self.original = surface;
        self.dirty = true;
        self.refresh();
    }

    // -----------------------------------------------------------------------
    // Rotozoom verbs
    // -----------------------------------------------------------------------

    /// Grow or shrink from `from` to `to` times the original size. With
    /// `pulse`, reach `to` halfway and come back to `from`. Replaces any
    /// rotozoom trajectory still playing.
    pub fn scale(&mut self, from: f64, to: f64, duration: f64, pulse: bool) -> TweenResult<()> {
        self.scale_with(from, to, duration, pulse, SlotPolicy::Replace)
    }

    pub fn scale_with(
        &mut self,
        from: f64,
        to: f64,
        duration: f64,
        pulse: bool,
        policy: SlotPolicy,
    ) -> TweenResult<()> {
        check_duration("scale", duration)?;
        let frames = frame_count(duration, self.fps);
        let steps = scale_path(from, to, frames, pulse)
            .into_iter()
            .map(RotozoomStep::Resize)
            .collect();
        self.push_rotozoom(Trajectory::new(steps), policy);
        self.current_scale = if pulse { from } else { to };
        Ok(())
    }

    /// Turn by `degrees` (positive is counter-clockwise) starting from the
    /// current angle. Runs alongside other rotozoom trajectories.
    pub fn rotate(&mut self, degrees: f64, duration: f64) -> TweenResult<()> {
        self.rotate_with(degrees, duration, SlotPolicy::Compose)
    }

    pub fn rotate_with(&mut self, degrees: f64, duration: f64, policy: SlotPolicy) -> TweenResult<()> {
        check_duration("rotate", duration)?;
        let frames = frame_count(duration, self.fps);
        let steps = rotate_path(self.angle, degrees, frames)
            .into_iter()
            .map(RotozoomStep::Turn)
            .collect();
        self.push_rotozoom(Trajectory::new(steps), policy);
        Ok(())
    }

    /// Turn and scale together in one trajectory.
    pub fn rotoscale(&mut self, from: f64, to: f64, degrees: f64, duration: f64) -> TweenResult<()> {
        self.rotoscale_with(from, to, degrees, duration, SlotPolicy::Compose)
    }

    pub fn rotoscale_with(
        &mut self,
        from: f64,
        to: f64,
        degrees: f64,
        duration: f64,
        policy: SlotPolicy,
    ) -> TweenResult<()> {
        check_duration("rotoscale", duration)?;
        let frames = frame_count(duration, self.fps);
        let steps = rotoscale_path(self.angle, degrees, from, to, frames)
            .into_iter()
            .map(|(angle, scale)| RotozoomStep::TurnAndScale { angle, scale })
            .collect();
        self.push_rotozoom(Trajectory::new(steps), policy);
        self.current_scale = to;
        Ok(())
    }

    fn push_rotozoom(&mut self, trajectory: Trajectory<RotozoomStep>, policy: SlotPolicy) {
        if policy == SlotPolicy::Replace {
            self.rotozoom.clear();
        }
        self.rotozoom.push(trajectory);
    }

    // -----------------------------------------------------------------------
    // Color verbs
    // -----------------------------------------------------------------------

    /// Briefly wash the face with `color`, peaking at `intensity`
    /// (0 = nothing, 100 = solid) halfway through.
    pub fn flash(&mut self, color: Rgb, duration: f64, intensity: f64) -> TweenResult<()> {
        check_duration("flash", duration)?;
        let frames = frame_count(duration, self.fps);
        let steps = flash_path(intensity.clamp(0.0, 100.0), frames)
            .into_iter()
            .map(|intensity| ColorStep::Flash { color, intensity })
            .collect();
        self.color.push(Trajectory::new(steps));
        Ok(())
    }

    /// Paint the face solid `color` and ramp its opacity from `from_alpha`
    /// to `to_alpha`. The color stays after the fade finishes.
    pub fn fade_to_color(
        &mut self,
        color: Rgb,
        from_alpha: u8,
        to_alpha: u8,
        duration: f64,
    ) -> TweenResult<()> {
        check_duration("fade_to_color", duration)?;
        let frames = frame_count(duration, self.fps);
        let steps = fade_path(from_alpha, to_alpha, frames)
            .into_iter()
            .map(|alpha| ColorStep::Fade { color, alpha })
            .collect();
        self.color.push(Trajectory::new(steps));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Movement verbs
    // -----------------------------------------------------------------------

    /// Travel to `(x, y)`. `steady` moves at constant speed; otherwise the
    /// move decelerates into the target. Moving to where the animatable
    /// already is does nothing.
    pub fn move_to(&mut self, x: f64, y: f64, duration: f64, steady: bool) -> TweenResult<()> {
        check_duration("move", duration)?;
        let target = Point::new(x, y);
        if target == self.bbox.center {
            return Ok(());
        }
        self.push_motion(MotionRequest::Move {
            target,
            duration,
            easing: Easing::from_steady(steady),
        });
        Ok(())
    }

    /// Sweep `degrees` around `(cx, cy)`.
    pub fn circle(&mut self, cx: f64, cy: f64, degrees: f64, duration: f64) -> TweenResult<()> {
        check_duration("circle", duration)?;
        self.push_motion(MotionRequest::Circle {
            center: Point::new(cx, cy),
            degrees,
            duration,
        });
        Ok(())
    }

    /// Hold still for `duration`, delaying whatever is chained after.
    pub fn freeze(&mut self, duration: f64) -> TweenResult<()> {
        if duration == 0.0 {
            return Ok(());
        }
        check_duration("freeze", duration)?;
        self.push_motion(MotionRequest::Freeze { duration });
        Ok(())
    }

    fn push_motion(&mut self, request: MotionRequest) {
        if !self.chain_movements && !self.animation_queue.is_empty() {
            debug!(
                "{} dropped {} queued movement(s)",
                self.id,
                self.animation_queue.len()
            );
            self.animation_queue.clear();
        }
        self.animation_queue.push_back(request);
    }
}

impl<S: Surface + fmt::Debug> fmt::Debug for Animatable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animatable")
            .field("id", &self.id)
            .field("bbox", &self.bbox)
            .field("hidden", &self.hidden)
            .field("chain_movements", &self.chain_movements)
            .field("current_scale", &self.current_scale)
            .field("angle", &self.angle)
            .field("queued_motions", &self.animation_queue.len())
            .field("pending_waypoints", &self.position_queue.len())
            .finish_non_exhaustive()
    }
}

/// Flash intensity (0..=100) as an overlay alpha.
fn intensity_to_alpha(intensity: f64) -> u8 {
    (intensity * 2.55).round().clamp(0.0, 255.0) as u8
}
