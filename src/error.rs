use thiserror::Error;

use crate::animatable::AnimatableId;

pub type TweenResult<T> = Result<T, TweenError>;

#[derive(Debug, Error)]
pub enum TweenError {
    /// A sampling verb was given a duration that is not a positive, finite
    /// number of seconds.
    #[error("{verb}: duration must be a positive number of seconds, got {duration}")]
    InvalidDuration { verb: &'static str, duration: f64 },
    #[error("{0} is not in this scene")]
    NotFound(AnimatableId),
    #[error("invalid stage config: {0}")]
    InvalidConfig(String),
    #[error("cue sheet error: {0}")]
    Script(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
