//! ASCII Tween: a frame-stepped tweening engine.
//!
//! Hosts wrap drawable surfaces in [`Animatable`]s, issue declarative verbs
//! on them ("move here over half a second", "flash red"), and add them to a
//! [`Scene`]. Every call to [`Scene::advance_frame`] advances each
//! animatable by exactly one precomputed step and composites the results.

pub mod animatable;
pub mod config;
pub mod error;
pub mod player;
pub mod presenter;
pub mod registry;
pub mod scene;
pub mod script;
pub mod surface;
pub mod timer;
pub mod trajectory;
pub mod types;

pub use animatable::{Animatable, AnimatableId, MotionRequest, SlotPolicy};
pub use config::StageConfig;
pub use error::{TweenError, TweenResult};
pub use presenter::{FrameClock, Presenter, RecordingPresenter, TerminalPresenter};
pub use registry::DisposableRegistry;
pub use scene::Scene;
pub use surface::{CellSurface, Surface};
pub use trajectory::{Easing, Trajectory};
pub use types::{BoundingBox, Point, Rgb, Rgba, Size};
