//! Cue sheets: a small JSON choreography format for driving a scene.
//!
//! A sheet names a cast of text actors and a list of cues. Each cue fires
//! one verb on one actor at a given frame. The engine itself never reads
//! these; they exist so the bundled player (and tests) can exercise a scene
//! without writing host code.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animatable::{AnimatableId, SlotPolicy};
use crate::error::{TweenError, TweenResult};
use crate::scene::Scene;
use crate::surface::CellSurface;
use crate::types::Color;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueSheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub cues: Vec<Cue>,
    /// Stop after this many frames. When absent the sheet ends once the
    /// last cue has fired and the scene has gone idle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub chain: bool,
    /// Put the actor in the disposable registry instead of the tracked list.
    #[serde(default)]
    pub disposable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cue {
    pub frame: u64,
    pub actor: String,
    #[serde(flatten)]
    pub action: Action,
}

fn default_duration() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "snake_case")]
pub enum Action {
    Move {
        x: f64,
        y: f64,
        #[serde(default = "default_duration")]
        duration: f64,
        #[serde(default)]
        steady: bool,
    },
    Circle {
        cx: f64,
        cy: f64,
        degrees: f64,
        #[serde(default = "default_duration")]
        duration: f64,
    },
    Freeze {
        #[serde(default = "default_duration")]
        duration: f64,
    },
    Scale {
        from: f64,
        to: f64,
        #[serde(default = "default_duration")]
        duration: f64,
        #[serde(default)]
        pulse: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        policy: Option<SlotPolicy>,
    },
    Rotate {
        degrees: f64,
        #[serde(default = "default_duration")]
        duration: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        policy: Option<SlotPolicy>,
    },
    Rotoscale {
        from: f64,
        to: f64,
        degrees: f64,
        #[serde(default = "default_duration")]
        duration: f64,
    },
    Flash {
        color: Color,
        #[serde(default = "default_duration")]
        duration: f64,
        intensity: f64,
    },
    FadeToColor {
        color: Color,
        from_alpha: u8,
        to_alpha: u8,
        #[serde(default = "default_duration")]
        duration: f64,
    },
    InstantMove {
        x: f64,
        y: f64,
    },
    InstantScale {
        scale: f64,
    },
    InstantRotate {
        degrees: f64,
    },
    InstantColor {
        color: Color,
        alpha: u8,
    },
    Hide,
    Show,
    BringToFront,
}

impl CueSheet {
    pub fn from_json(json: &str) -> TweenResult<Self> {
        let sheet: CueSheet = serde_json::from_str(json)?;
        sheet.validate()?;
        Ok(sheet)
    }

    pub fn load(path: &Path) -> TweenResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Every cue must name a declared actor, and actor names must be unique.
    pub fn validate(&self) -> TweenResult<()> {
        let mut seen = HashSet::new();
        for actor in &self.actors {
            if !seen.insert(actor.name.as_str()) {
                return Err(TweenError::Script(format!("duplicate actor '{}'", actor.name)));
            }
        }
        for cue in &self.cues {
            if !seen.contains(cue.actor.as_str()) {
                return Err(TweenError::Script(format!(
                    "cue at frame {} names unknown actor '{}'",
                    cue.frame, cue.actor
                )));
            }
        }
        Ok(())
    }

    /// Frame of the last cue, if there are any cues.
    pub fn last_cue_frame(&self) -> Option<u64> {
        self.cues.iter().map(|c| c.frame).max()
    }
}

/// Plays a `CueSheet` into a scene one frame at a time.
#[derive(Debug)]
pub struct CueRunner {
    sheet: CueSheet,
    cast: HashMap<String, AnimatableId>,
    frame: u64,
}

impl CueRunner {
    /// Create every actor in `scene` and get ready to fire frame 0.
    pub fn new(sheet: CueSheet, scene: &mut Scene<CellSurface>) -> TweenResult<Self> {
        sheet.validate()?;
        let mut cast = HashMap::new();
        for actor in &sheet.actors {
            let face = CellSurface::from_text(
                &actor.text,
                actor.fg.as_ref().map(Color::to_rgb),
                actor.bg.as_ref().map(Color::to_rgb),
            );
            let animatable = scene.spawn(face, actor.x, actor.y, actor.hidden, actor.chain);
            let id = if actor.disposable {
                scene.dispose(animatable)
            } else {
                scene.track(animatable)
            };
            cast.insert(actor.name.clone(), id);
        }
        Ok(CueRunner {
            sheet,
            cast,
            frame: 0,
        })
    }

    pub fn sheet(&self) -> &CueSheet {
        &self.sheet
    }

    pub fn actor(&self, name: &str) -> Option<AnimatableId> {
        self.cast.get(name).copied()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Fire this frame's cues in sheet order, then move to the next frame.
    pub fn fire(&mut self, scene: &mut Scene<CellSurface>) -> TweenResult<()> {
        for cue in self.sheet.cues.iter().filter(|c| c.frame == self.frame) {
            let id = self
                .cast
                .get(&cue.actor)
                .copied()
                .ok_or_else(|| TweenError::Script(format!("unknown actor '{}'", cue.actor)))?;
            apply(&cue.action, id, scene)?;
        }
        self.frame += 1;
        Ok(())
    }

    /// True once the frame limit is reached, or, without a limit, once
    /// every cue has fired and the scene has nothing left to play.
    pub fn is_done(&self, scene: &Scene<CellSurface>) -> bool {
        match self.sheet.frame_count {
            Some(limit) => self.frame >= limit,
            None => {
                let cues_done = self.sheet.last_cue_frame().is_none_or(|last| self.frame > last);
                cues_done && scene.is_idle()
            }
        }
    }
}

fn apply(action: &Action, id: AnimatableId, scene: &mut Scene<CellSurface>) -> TweenResult<()> {
    if let Action::BringToFront = action {
        return scene.bring_to_front(id);
    }
    let a = scene.animatable(id)?;
    match action {
        Action::Move { x, y, duration, steady } => a.move_to(*x, *y, *duration, *steady)?,
        Action::Circle { cx, cy, degrees, duration } => a.circle(*cx, *cy, *degrees, *duration)?,
        Action::Freeze { duration } => a.freeze(*duration)?,
        Action::Scale { from, to, duration, pulse, policy } => {
            a.scale_with(*from, *to, *duration, *pulse, policy.unwrap_or(SlotPolicy::Replace))?
        }
        Action::Rotate { degrees, duration, policy } => {
            a.rotate_with(*degrees, *duration, policy.unwrap_or(SlotPolicy::Compose))?
        }
        Action::Rotoscale { from, to, degrees, duration } => {
            a.rotoscale(*from, *to, *degrees, *duration)?
        }
        Action::Flash { color, duration, intensity } => {
            a.flash(color.to_rgb(), *duration, *intensity)?
        }
        Action::FadeToColor { color, from_alpha, to_alpha, duration } => {
            a.fade_to_color(color.to_rgb(), *from_alpha, *to_alpha, *duration)?
        }
        Action::InstantMove { x, y } => a.instant_move(*x, *y),
        Action::InstantScale { scale } => a.instant_scale(*scale),
        Action::InstantRotate { degrees } => a.instant_rotate(*degrees),
        Action::InstantColor { color, alpha } => a.instant_color(color.to_rgb().with_alpha(*alpha)),
        Action::Hide => a.hide(),
        Action::Show => a.show(),
        Action::BringToFront => {}
    }
    Ok(())
}
