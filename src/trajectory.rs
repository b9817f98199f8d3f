//! Trajectory generation: the pure math behind every animated verb.
//!
//! Each generator turns a request (start, target, duration in frames,
//! easing) into the complete list of per-frame values up front. Nothing in
//! here knows about surfaces, queues or scenes; the `Animatable` decides
//! when a trajectory is built and consumes it one step per tick.
//!
//! Every generator forces its last sample to the exact target so floating
//! error never leaves an object a fraction of a cell short.

use crate::error::{TweenError, TweenResult};
use crate::types::Point;

/// Precomputed per-frame values plus a cursor.
///
/// Not restartable: once `advance` returns `None` the trajectory is spent
/// and the verb that produced it has to be issued again.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<T> {
    steps: Vec<T>,
    cursor: usize,
}

impl<T: Clone> Trajectory<T> {
    pub fn new(steps: Vec<T>) -> Self {
        Trajectory { steps, cursor: 0 }
    }

    /// The next step, or `None` once every step has been handed out.
    pub fn advance(&mut self) -> Option<T> {
        let step = self.steps.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(step)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub fn remaining(&self) -> usize {
        self.steps.len().saturating_sub(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[T] {
        &self.steps
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Reject durations a sampling verb cannot turn into frames.
pub fn check_duration(verb: &'static str, duration: f64) -> TweenResult<()> {
    if duration.is_finite() && duration > 0.0 {
        Ok(())
    } else {
        Err(TweenError::InvalidDuration { verb, duration })
    }
}

/// `floor(duration * fps)`, tolerant of products like `0.7 * 30` landing a
/// hair under the whole number.
pub fn frame_count(duration: f64, fps: u32) -> usize {
    (duration * fps as f64 + 1e-9).floor().max(0.0) as usize
}

/// Velocity profile of a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed: `f(t) = 1 - t`.
    Linear,
    /// Quadratic, decelerating into the target: `f(t) = 1 - t²`.
    #[default]
    EaseOut,
}

impl Easing {
    pub fn from_steady(steady: bool) -> Self {
        if steady { Easing::Linear } else { Easing::EaseOut }
    }

    /// Fraction of the path covered when `t` of the normalized time is
    /// still left to go.
    pub fn progress(self, t: f64) -> f64 {
        match self {
            Easing::Linear => 1.0 - t,
            Easing::EaseOut => 1.0 - t * t,
        }
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Waypoints from `start` to `end` over `frames` ticks.
///
/// Waypoint `i` covers `easing.progress(1 - (i + 1) / frames)` of the
/// distance, so the first waypoint is one step away from `start` and the
/// last is `end` itself. A zero-length path yields nothing.
pub fn move_path(start: Point, end: Point, frames: usize, easing: Easing) -> Vec<Point> {
    if start == end {
        return Vec::new();
    }
    if frames == 0 {
        return vec![end];
    }
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let n = frames as f64;
    let mut path: Vec<Point> = (0..frames)
        .map(|i| {
            let p = easing.progress(1.0 - (i + 1) as f64 / n);
            Point::new(start.x + dx * p, start.y + dy * p)
        })
        .collect();
    if let Some(last) = path.last_mut() {
        *last = end;
    }
    path
}

/// Rotate `point` about `center` by `degrees` (counter-clockwise in
/// mathematical orientation).
pub fn rotate_about(point: Point, center: Point, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let x0 = point.x - center.x;
    let y0 = point.y - center.y;
    Point::new(
        x0 * cos - y0 * sin + center.x,
        y0 * cos + x0 * sin + center.y,
    )
}

/// Waypoints along an arc of `degrees` around `center`, starting from
/// `start`. The sweep is linear in the angle; the final waypoint sits at
/// exactly `degrees`.
pub fn circle_path(start: Point, center: Point, degrees: f64, frames: usize) -> Vec<Point> {
    let n = frames as f64;
    (0..frames)
        .map(|k| degrees * k as f64 / n)
        .chain(std::iter::once(degrees))
        .map(|theta| rotate_about(start, center, theta))
        .collect()
}

/// A hold: `frames` copies of the same point.
pub fn freeze_path(at: Point, frames: usize) -> Vec<Point> {
    vec![at; frames]
}

// ---------------------------------------------------------------------------
// Rotozoom
// ---------------------------------------------------------------------------

/// Scale factor at normalized time `t`.
///
/// Plain: `(from - to)(t - 1)² + to`, easing out into `to`.
/// Pulse: `(4from - 4to)(t - 0.5)² + to`, reaching `to` halfway and
/// coming back to `from`.
pub fn scale_curve(from: f64, to: f64, pulse: bool, t: f64) -> f64 {
    if pulse {
        (4.0 * from - 4.0 * to) * (t - 0.5).powi(2) + to
    } else {
        (from - to) * (t - 1.0).powi(2) + to
    }
}

/// Scale factors for each frame of a scale animation, relative to the
/// face the animatable shows when the step is applied.
pub fn scale_path(from: f64, to: f64, frames: usize, pulse: bool) -> Vec<f64> {
    let n = frames as f64;
    let end = if pulse { from } else { to };
    (0..frames)
        .map(|k| scale_curve(from, to, pulse, k as f64 / n))
        .chain(std::iter::once(end))
        .collect()
}

/// Absolute angles for a linear turn of `degrees` starting at `base`.
pub fn rotate_path(base: f64, degrees: f64, frames: usize) -> Vec<f64> {
    let n = frames as f64;
    (0..frames)
        .map(|k| base + degrees * k as f64 / n)
        .chain(std::iter::once(base + degrees))
        .collect()
}

/// Paired `(angle, scale)` samples: a linear turn and an eased scale.
pub fn rotoscale_path(
    base: f64,
    degrees: f64,
    from: f64,
    to: f64,
    frames: usize,
) -> Vec<(f64, f64)> {
    let n = frames as f64;
    (0..frames)
        .map(|k| {
            let t = k as f64 / n;
            (base + degrees * t, scale_curve(from, to, false, t))
        })
        .chain(std::iter::once((base + degrees, to)))
        .collect()
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Flash envelope: `intensity * (1 - (2t - 1)²)`, peaking halfway and
/// ending at exactly zero.
pub fn flash_path(intensity: f64, frames: usize) -> Vec<f64> {
    let n = frames as f64;
    (0..frames)
        .map(|k| {
            let t = k as f64 / n;
            intensity * (1.0 - (2.0 * t - 1.0).powi(2))
        })
        .chain(std::iter::once(0.0))
        .collect()
}

/// Linear alpha ramp between two bounds, in either direction, ending at
/// exactly `to`.
pub fn fade_path(from: u8, to: u8, frames: usize) -> Vec<u8> {
    let n = frames as f64;
    let span = to as f64 - from as f64;
    (0..frames)
        .map(|k| (from as f64 + span * k as f64 / n).round().clamp(0.0, 255.0) as u8)
        .chain(std::iter::once(to))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;

    const FPS: u32 = 30;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn trajectory_hands_out_each_step_once() {
        let mut t = Trajectory::new(vec![1, 2]);
        assert_eq!(t.advance(), Some(1));
        assert_eq!(t.remaining(), 1);
        assert_eq!(t.advance(), Some(2));
        assert!(t.is_finished());
        assert_eq!(t.advance(), None);
    }

    #[test]
    fn durations_must_be_positive_and_finite() {
        assert!(check_duration("move", 0.5).is_ok());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_duration("move", bad),
                Err(TweenError::InvalidDuration { verb: "move", .. })
            ));
        }
    }

    #[test]
    fn frame_count_floors_without_float_loss() {
        assert_eq!(frame_count(1.0, FPS), 30);
        assert_eq!(frame_count(0.7, FPS), 21);
        assert_eq!(frame_count(0.15, FPS), 4);
        assert_eq!(frame_count(0.01, FPS), 0);
    }

    #[test]
    fn steady_move_covers_equal_steps() {
        let path = move_path(
            Point::new(100.0, 100.0),
            Point::new(200.0, 100.0),
            frame_count(1.0, FPS),
            Easing::Linear,
        );
        assert_eq!(path.len(), 30);
        assert!(close(path[0].x, 100.0 + 100.0 / 30.0));
        assert!(close(path[0].y, 100.0));
        assert_eq!(path[29], Point::new(200.0, 100.0));
    }

    #[test]
    fn steady_move_is_affine() {
        let path = move_path(Point::new(0.0, 0.0), Point::new(90.0, 45.0), 9, Easing::Linear);
        for pair in path.windows(2) {
            assert!(close(pair[1].x - pair[0].x, 10.0));
            assert!(close(pair[1].y - pair[0].y, 5.0));
        }
    }

    #[test]
    fn eased_move_decelerates_into_target() {
        let end = Point::new(300.0, -40.0);
        let path = move_path(Point::new(0.0, 0.0), end, 15, Easing::EaseOut);
        assert_eq!(path.len(), 15);
        assert_eq!(*path.last().unwrap(), end);
        let spacing: Vec<f64> = path.windows(2).map(|w| w[0].distance(w[1])).collect();
        for pair in spacing.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        let first = Point::new(0.0, 0.0).distance(path[0]);
        let linear_first = Point::new(0.0, 0.0).distance(end) / 15.0;
        assert!(first > linear_first);
    }

    #[test]
    fn zero_length_move_is_empty_and_short_move_lands() {
        let p = Point::new(3.0, 4.0);
        assert!(move_path(p, p, 10, Easing::Linear).is_empty());
        assert_eq!(move_path(p, Point::new(0.0, 0.0), 0, Easing::EaseOut), vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn circle_ends_on_exact_rotation() {
        let start = Point::new(150.0, 100.0);
        let center = Point::new(100.0, 100.0);
        let path = circle_path(start, center, 90.0, 10);
        assert_eq!(path.len(), 11);
        assert_eq!(path[0], rotate_about(start, center, 0.0));
        assert_eq!(*path.last().unwrap(), rotate_about(start, center, 90.0));
        let end = path.last().unwrap();
        assert!((end.x - 100.0).abs() < 1e-9);
        assert!((end.y - 150.0).abs() < 1e-9);
        for p in &path {
            assert!((p.distance(center) - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn freeze_holds_position() {
        let at = Point::new(5.0, 6.0);
        assert_eq!(freeze_path(at, 15), vec![at; 15]);
    }

    #[test]
    fn scale_converges_monotonically() {
        let original = Size::new(100, 60);
        let dims: Vec<Size> = scale_path(1.0, 0.5, 15, false)
            .into_iter()
            .map(|f| original.scaled(f))
            .collect();
        assert_eq!(dims.len(), 16);
        assert_eq!(dims[0], original);
        assert_eq!(*dims.last().unwrap(), Size::new(50, 30));
        for pair in dims.windows(2) {
            assert!(pair[1].w <= pair[0].w && pair[1].h <= pair[0].h);
        }
    }

    #[test]
    fn pulse_returns_to_start_scale() {
        let original = Size::new(40, 20);
        let dims: Vec<Size> = scale_path(1.0, 1.5, 10, true)
            .into_iter()
            .map(|f| original.scaled(f))
            .collect();
        assert_eq!(*dims.last().unwrap(), Size::new(40, 20));
        assert_eq!(dims[5], Size::new(60, 30));
    }

    #[test]
    fn rotation_ramp_is_linear_from_base() {
        let angles = rotate_path(10.0, -90.0, 3);
        assert_eq!(angles, vec![10.0, -20.0, -50.0, -80.0]);
    }

    #[test]
    fn rotoscale_pairs_end_on_target() {
        let pairs = rotoscale_path(0.0, 45.0, 1.0, 2.0, 4);
        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[0], (0.0, 1.0));
        assert_eq!(*pairs.last().unwrap(), (45.0, 2.0));
    }

    #[test]
    fn flash_peaks_halfway_and_ends_dark() {
        let levels = flash_path(80.0, 10);
        assert_eq!(levels.len(), 11);
        assert!(close(levels[0], 0.0));
        assert!(close(levels[5], 80.0));
        assert_eq!(*levels.last().unwrap(), 0.0);
    }

    #[test]
    fn fade_runs_in_both_directions() {
        assert_eq!(fade_path(0, 255, 5), vec![0, 51, 102, 153, 204, 255]);
        assert_eq!(fade_path(200, 100, 4), vec![200, 175, 150, 125, 100]);
    }
}
