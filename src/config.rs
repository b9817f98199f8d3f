use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{TweenError, TweenResult};
use crate::types::{Color, NamedColor};

/// Frame rate every trajectory is sampled at unless the host says otherwise.
pub const DEFAULT_FPS: u32 = 30;

/// How many disposable animatables a scene keeps before evicting the oldest.
pub const DEFAULT_DISPOSABLE_CAPACITY: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_disposable_capacity")]
    pub disposable_capacity: usize,
    #[serde(default = "default_width")]
    pub width: u16,
    #[serde(default = "default_height")]
    pub height: u16,
    #[serde(default = "default_background")]
    pub background: Color,
}

fn default_fps() -> u32 { DEFAULT_FPS }
fn default_disposable_capacity() -> usize { DEFAULT_DISPOSABLE_CAPACITY }
fn default_width() -> u16 { 80 }
fn default_height() -> u16 { 24 }
fn default_background() -> Color { Color::Rgb { r: 0, g: 80, b: 40 } }

impl Default for StageConfig {
    fn default() -> Self {
        StageConfig {
            fps: default_fps(),
            disposable_capacity: default_disposable_capacity(),
            width: default_width(),
            height: default_height(),
            background: default_background(),
        }
    }
}

impl StageConfig {
    /// Load from `path`, or from the user config file when `path` is
    /// `None`. A missing file means defaults; a broken one is reported and
    /// also falls back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => config,
                Err(e) => {
                    warn!("invalid stage config {} ({e}), using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> TweenResult<Self> {
        let config: StageConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TweenResult<()> {
        if self.fps == 0 {
            return Err(TweenError::InvalidConfig("fps must be at least 1".into()));
        }
        if self.disposable_capacity == 0 {
            return Err(TweenError::InvalidConfig(
                "disposable_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Wall-clock time one frame is allowed to take.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    pub fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("ascii-tween");
        path.push("stage.json");
        path
    }

    /// A config for headless use: black background, defaults elsewhere.
    pub fn headless(width: u16, height: u16) -> Self {
        StageConfig {
            width,
            height,
            background: Color::Named(NamedColor::Black),
            ..Self::default()
        }
    }
}
